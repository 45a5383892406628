//! Generator configuration as written by users, plus the effective
//! per-category view ([`SyntheticalConfig`]) the pipeline works with.
//!
//! Settings cascade server → project → category; a value set at a deeper level
//! overrides the shallower one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GenerateError, Result};

/// A value that may be written either as a scalar or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(vs) => vs.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    #[default]
    Yapi,
    Swagger,
    Apifox,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactHooksConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub request_hook_maker_file_path: Option<String>,
}

/// Which parts of the generated doc comment are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub enabled: bool,
    pub title: bool,
    pub category: bool,
    pub tag: bool,
    pub request_header: bool,
    pub update_time: bool,
    pub link: bool,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: true,
            category: true,
            tag: true,
            request_header: true,
            update_time: true,
            link: true,
        }
    }
}

/// Settings that may appear at server, project or category level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_function_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_env_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_env_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react_hooks: Option<ReactHooksConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<CommentConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_type_mapping: Option<BTreeMap<String, String>>,
}

impl SharedConfig {
    /// Returns `self` with every field that `deeper` sets replaced.
    pub fn overlay(&self, deeper: &SharedConfig) -> SharedConfig {
        fn pick<T: Clone>(shallow: &Option<T>, deep: &Option<T>) -> Option<T> {
            deep.clone().or_else(|| shallow.clone())
        }
        SharedConfig {
            types_only: pick(&self.types_only, &deeper.types_only),
            output_file_path: pick(&self.output_file_path, &deeper.output_file_path),
            request_function_file_path: pick(
                &self.request_function_file_path,
                &deeper.request_function_file_path,
            ),
            data_key: pick(&self.data_key, &deeper.data_key),
            dev_env_name: pick(&self.dev_env_name, &deeper.dev_env_name),
            prod_env_name: pick(&self.prod_env_name, &deeper.prod_env_name),
            react_hooks: pick(&self.react_hooks, &deeper.react_hooks),
            comment: pick(&self.comment, &deeper.comment),
            custom_type_mapping: pick(&self.custom_type_mapping, &deeper.custom_type_mapping),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Literal ids, `0` for every category, negative ids to exclude.
    pub id: OneOrMany<i64>,
    #[serde(flatten)]
    pub shared: SharedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub token: OneOrMany<String>,
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
    #[serde(flatten)]
    pub shared: SharedConfig,
}

impl ProjectConfig {
    /// One sibling config per token; each token is its own identity.
    pub fn expand_tokens(&self) -> Vec<ProjectConfig> {
        self.token
            .to_vec()
            .into_iter()
            .map(|token| ProjectConfig {
                token: OneOrMany::One(token),
                ..self.clone()
            })
            .collect()
    }

    /// The single token of an expanded config (first token otherwise).
    pub fn primary_token(&self) -> &str {
        match &self.token {
            OneOrMany::One(t) => t,
            OneOrMany::Many(ts) => ts.first().map(String::as_str).unwrap_or(""),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub server_url: String,
    #[serde(default)]
    pub server_type: ServerType,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(flatten)]
    pub shared: SharedConfig,
}

impl ServerConfig {
    pub fn expanded_projects(&self) -> Vec<ProjectConfig> {
        self.projects
            .iter()
            .flat_map(ProjectConfig::expand_tokens)
            .collect()
    }

    pub fn trace_loaded(&self) {
        info!(
            server_url = %self.server_url,
            server_type = ?self.server_type,
            projects_count = self.projects.len(),
            "Loaded server config"
        );
        debug!(?self, "Server config loaded (full debug)");
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub servers: Vec<ServerConfig>,
}

impl GeneratorConfig {
    /// Rejects configurations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.servers.is_empty() {
            return Err(GenerateError::Config("no servers configured".into()));
        }
        for server in &self.servers {
            if server.server_url.trim().is_empty() {
                return Err(GenerateError::Config("server_url must not be empty".into()));
            }
            if server.projects.is_empty() {
                return Err(GenerateError::Config(format!(
                    "server {} has no projects",
                    server.server_url
                )));
            }
            for project in &server.projects {
                if project.token.to_vec().is_empty() {
                    return Err(GenerateError::Config(format!(
                        "a project of server {} has no token",
                        server.server_url
                    )));
                }
                for category in &project.categories {
                    if category.id.to_vec().is_empty() {
                        return Err(GenerateError::Config(format!(
                            "a category selector of server {} is an empty list",
                            server.server_url
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Effective settings for one resolved category of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntheticalConfig {
    pub server_url: String,
    pub server_type: ServerType,
    pub token: String,
    pub category_id: i64,
    pub mock_url: String,
    pub dev_url: String,
    pub prod_url: String,
    pub types_only: bool,
    pub output_file_path: Option<String>,
    pub request_function_file_path: Option<String>,
    pub data_key: Option<String>,
    pub react_hooks: ReactHooksConfig,
    pub comment: CommentConfig,
    pub custom_type_mapping: BTreeMap<String, String>,
}

impl SyntheticalConfig {
    pub fn new(
        server: &ServerConfig,
        project: &ProjectConfig,
        category: &CategoryConfig,
        category_id: i64,
        project_info: &crate::catalog::Project,
    ) -> Self {
        let shared = server
            .shared
            .overlay(&project.shared)
            .overlay(&category.shared);
        let dev_url = shared
            .dev_env_name
            .as_deref()
            .map(|name| project_info.env_domain(name))
            .unwrap_or_default();
        let prod_url = shared
            .prod_env_name
            .as_deref()
            .map(|name| project_info.env_domain(name))
            .unwrap_or_default();
        SyntheticalConfig {
            server_url: server.server_url.clone(),
            server_type: server.server_type,
            token: project.primary_token().to_string(),
            category_id,
            mock_url: format!("{}/mock/{}", server.server_url, project_info.id),
            dev_url,
            prod_url,
            types_only: shared.types_only.unwrap_or(false),
            output_file_path: shared.output_file_path,
            request_function_file_path: shared.request_function_file_path,
            data_key: shared.data_key,
            react_hooks: shared.react_hooks.unwrap_or_default(),
            comment: shared.comment.unwrap_or_default(),
            custom_type_mapping: shared.custom_type_mapping.unwrap_or_default(),
        }
    }
}
