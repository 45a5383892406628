//! Catalog fetching: YApi-shaped project/category/interface records, the
//! reqwest-backed [`HttpCatalogApi`], and the per-run [`CatalogCache`].
//!
//! # Caching
//! Every fetch is memoised by [`CatalogKey`] (server URL + token) for the
//! lifetime of one cache. Each key owns a `tokio::sync::OnceCell`, so callers
//! that ask for the same key while a fetch is in flight wait for that fetch
//! instead of starting their own.
//!
//! # Derived fields
//! The cache fills in browse URLs, normalises the project base path and
//! prefixes it onto every interface path. Nothing downstream recomputes them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::contract::CatalogApi;
use crate::error::{GenerateError, Result};

/// Identity of one catalog: the same server and token always see the same data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CatalogKey {
    pub server_url: String,
    pub token: String,
}

impl CatalogKey {
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEnv {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub basepath: String,
    pub env: Vec<ProjectEnv>,
    /// Browse URL on the backend, filled in by the cache.
    #[serde(rename = "_url")]
    pub url: String,
}

impl Project {
    /// Domain of the named environment, or an empty string.
    pub fn env_domain(&self, name: &str) -> String {
        self.env
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.domain.clone())
            .unwrap_or_default()
    }
}

/// One entry of the project's category menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMenuEntry {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub desc: String,
}

/// A named request/query/path/form parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Param {
    pub name: String,
    /// `"1"` when required, as YApi stores it.
    pub required: String,
    pub desc: String,
    pub example: String,
    /// Form field kind: `text` or `file`.
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Param {
    pub fn is_required(&self) -> bool {
        self.required == "1"
    }
}

/// Category metadata without its interface list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInfo {
    pub id: i64,
    pub name: String,
    pub desc: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    #[serde(rename = "_id")]
    pub id: i64,
    pub title: String,
    pub path: String,
    pub method: String,
    pub catid: i64,
    pub project_id: i64,
    pub tag: Vec<String>,
    pub up_time: i64,
    pub status: String,
    pub desc: String,
    pub req_query: Vec<Param>,
    pub req_params: Vec<Param>,
    pub req_headers: Vec<Param>,
    pub req_body_type: Option<String>,
    pub req_body_form: Vec<Param>,
    pub req_body_other: Option<String>,
    pub req_body_is_json_schema: bool,
    pub res_body_type: Option<String>,
    pub res_body: Option<String>,
    pub res_body_is_json_schema: bool,
    #[serde(rename = "_url")]
    pub url: String,
    #[serde(skip)]
    pub category: Option<Arc<CategoryInfo>>,
    #[serde(skip)]
    pub project: Option<Arc<Project>>,
}

/// A category as it comes out of the export endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCategory {
    pub name: String,
    pub desc: String,
    pub list: Vec<Interface>,
}

#[derive(Debug, Clone)]
pub struct Category {
    pub info: Arc<CategoryInfo>,
    pub interfaces: Vec<Interface>,
}

/// `/a//b/` → `/a/b`, `/` → ``.
pub fn normalize_base_path(basepath: &str) -> String {
    let joined = basepath
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        String::new()
    } else {
        format!("/{joined}")
    }
}

struct Memo<V> {
    cells: Mutex<HashMap<CatalogKey, Arc<OnceCell<V>>>>,
}

impl<V: Clone> Memo<V> {
    fn new() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }

    fn cell(&self, key: &CatalogKey) -> Arc<OnceCell<V>> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(key.clone()).or_default().clone()
    }

    async fn get_or_try_init<F, Fut>(&self, key: &CatalogKey, init: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>>,
    {
        let cell = self.cell(key);
        cell.get_or_try_init(init).await.cloned()
    }
}

/// Memoised catalog access for one generator run.
pub struct CatalogCache<A: CatalogApi> {
    api: A,
    projects: Memo<Arc<Project>>,
    menus: Memo<Arc<Vec<CategoryMenuEntry>>>,
    exports: Memo<Arc<Vec<Category>>>,
}

impl<A: CatalogApi> CatalogCache<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            projects: Memo::new(),
            menus: Memo::new(),
            exports: Memo::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn project(&self, key: &CatalogKey) -> Result<Arc<Project>> {
        self.projects
            .get_or_try_init(key, move || async move {
                info!(server_url = %key.server_url, "[FETCH] Fetching project metadata");
                let mut project = self.api.fetch_project(key).await?;
                project.basepath = normalize_base_path(&project.basepath);
                project.url = format!(
                    "{}/project/{}/interface/api",
                    key.server_url, project.id
                );
                debug!(project_id = project.id, basepath = %project.basepath, "[FETCH] Project metadata ready");
                Ok(Arc::new(project))
            })
            .await
    }

    pub async fn category_menu(&self, key: &CatalogKey) -> Result<Arc<Vec<CategoryMenuEntry>>> {
        self.menus
            .get_or_try_init(key, move || async move {
                let project = self.project(key).await?;
                info!(project_id = project.id, "[FETCH] Fetching category menu");
                let menu = self.api.fetch_category_menu(key, project.id).await?;
                Ok(Arc::new(menu))
            })
            .await
    }

    pub async fn export(&self, key: &CatalogKey) -> Result<Arc<Vec<Category>>> {
        self.exports
            .get_or_try_init(key, move || async move {
                let project = self.project(key).await?;
                info!(project_id = project.id, "[FETCH] Fetching full interface export");
                let raw = self.api.fetch_export(key).await?;
                let categories = raw
                    .into_iter()
                    .map(|cat| finish_category(&key.server_url, &project, cat))
                    .collect::<Vec<_>>();
                info!(
                    project_id = project.id,
                    categories = categories.len(),
                    interfaces = categories.iter().map(|c| c.interfaces.len()).sum::<usize>(),
                    "[FETCH] Export ready"
                );
                Ok(Arc::new(categories))
            })
            .await
    }

    /// Interfaces of one category in catalog order; empty if the category is gone.
    pub async fn category_interfaces(
        &self,
        key: &CatalogKey,
        category_id: i64,
    ) -> Result<Vec<Interface>> {
        let export = self.export(key).await?;
        Ok(export
            .iter()
            .find(|c| !c.interfaces.is_empty() && c.info.id == category_id)
            .map(|c| c.interfaces.clone())
            .unwrap_or_default())
    }
}

fn finish_category(server_url: &str, project: &Project, raw: RawCategory) -> Category {
    let project_id = raw.list.first().map(|i| i.project_id).unwrap_or(0);
    let category_id = raw.list.first().map(|i| i.catid).unwrap_or(0);
    let info = Arc::new(CategoryInfo {
        id: category_id,
        name: raw.name,
        desc: raw.desc,
        url: format!("{server_url}/project/{project_id}/interface/api/cat_{category_id}"),
    });
    let interfaces = raw
        .list
        .into_iter()
        .map(|mut item| {
            item.url = format!("{server_url}/project/{project_id}/interface/api/{}", item.id);
            item.path = format!("{}{}", project.basepath, item.path);
            item.category = Some(info.clone());
            item
        })
        .collect();
    Category { info, interfaces }
}

/// [`CatalogApi`] over HTTP against a YApi-compatible server.
#[derive(Debug, Clone, Default)]
pub struct HttpCatalogApi {
    client: reqwest::Client,
}

impl HttpCatalogApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn get_api<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(url = %url, "[FETCH] GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "[FETCH][ERROR] Request failed");
                GenerateError::Http {
                    url: url.to_string(),
                    source: e,
                }
            })?;
        let body: Value = response.json().await.map_err(|e| {
            error!(error = ?e, url = %url, "[FETCH][ERROR] Response is not JSON");
            GenerateError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            }
        })?;

        if body.get("errcode").is_some_and(is_truthy) {
            let message = match body.get("errmsg") {
                Some(Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => "unknown error".to_string(),
            };
            error!(url = %url, errmsg = %message, "[FETCH][ERROR] Backend returned an error code");
            return Err(GenerateError::Upstream {
                url: url.to_string(),
                query: describe_query(query),
                message,
            });
        }

        let data = match body.get("data") {
            Some(data) if is_truthy(data) => data.clone(),
            _ => body,
        };
        serde_json::from_value(data).map_err(|e| GenerateError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_project(&self, key: &CatalogKey) -> Result<Project> {
        let url = format!("{}/api/project/get", key.server_url);
        self.get_api(&url, &[("token", key.token.clone())]).await
    }

    async fn fetch_category_menu(
        &self,
        key: &CatalogKey,
        project_id: i64,
    ) -> Result<Vec<CategoryMenuEntry>> {
        let url = format!("{}/api/interface/getCatMenu", key.server_url);
        self.get_api(
            &url,
            &[
                ("token", key.token.clone()),
                ("project_id", project_id.to_string()),
            ],
        )
        .await
    }

    async fn fetch_export(&self, key: &CatalogKey) -> Result<Vec<RawCategory>> {
        let url = format!("{}/api/plugin/export", key.server_url);
        self.get_api(
            &url,
            &[
                ("type", "json".to_string()),
                ("status", "all".to_string()),
                ("isWiki", "false".to_string()),
                ("token", key.token.clone()),
            ],
        )
        .await
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn describe_query(query: &[(&str, String)]) -> String {
    query
        .iter()
        .map(|(k, v)| {
            if *k == "token" {
                format!("{k}=***")
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}
