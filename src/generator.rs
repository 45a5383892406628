//! Pipeline orchestrator: servers → projects → categories → interfaces, each
//! level fanned out with `try_join_all` and merged by the aggregator.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{debug, error, info, warn};

use crate::aggregate::{aggregate, Fragment, OutputFileList};
use crate::catalog::{CatalogCache, CatalogKey};
use crate::config::{GeneratorConfig, ProjectConfig, ServerConfig, ServerType, SyntheticalConfig};
use crate::contract::{
    AdapterRegistry, BackendAdapter, CatalogApi, DefaultHooks, InterfaceHooks, NoAdapters,
    TypeSynthesizer,
};
use crate::error::{GenerateError, Result};
use crate::preprocess::{CategoryBatch, TransformStage};
use crate::resolve::resolve_category_ids;
use crate::typegen::JsonSchemaToTypeScript;

struct StartedAdapter {
    server_url: String,
    adapter: Box<dyn BackendAdapter>,
}

pub struct Generator<A: CatalogApi> {
    servers: Vec<ServerConfig>,
    cwd: PathBuf,
    cache: CatalogCache<A>,
    hooks: Arc<dyn InterfaceHooks>,
    synthesizer: Arc<dyn TypeSynthesizer>,
    adapters: Arc<dyn AdapterRegistry>,
    started: Vec<StartedAdapter>,
}

impl<A: CatalogApi> Generator<A> {
    /// A generator with default hooks, the built-in type synthesizer and no
    /// backend adapters.
    pub fn new(config: GeneratorConfig, cwd: impl Into<PathBuf>, api: A) -> Self {
        Self {
            servers: config.servers,
            cwd: cwd.into(),
            cache: CatalogCache::new(api),
            hooks: Arc::new(DefaultHooks),
            synthesizer: Arc::new(JsonSchemaToTypeScript),
            adapters: Arc::new(NoAdapters),
            started: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn InterfaceHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn TypeSynthesizer>) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_adapters(mut self, adapters: Arc<dyn AdapterRegistry>) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Starts backend adapters and normalises server URLs.
    ///
    /// Every server is attempted; adapters that did start are kept for
    /// [`Generator::destroy`] even when a sibling fails.
    pub async fn prepare(&mut self) -> Result<()> {
        let adapters = self.adapters.as_ref();
        let outcomes = join_all(
            self.servers
                .iter()
                .map(|server| start_server(adapters, server)),
        )
        .await;

        let mut first_error = None;
        for (server, outcome) in self.servers.iter_mut().zip(outcomes) {
            match outcome {
                Ok((adapter, base_url)) => {
                    if let Some(adapter) = adapter {
                        self.started.push(StartedAdapter {
                            server_url: server.server_url.clone(),
                            adapter,
                        });
                    }
                    server.server_url = base_url.trim_end_matches('/').to_string();
                    debug!(server_url = %server.server_url, "[GEN] Server ready");
                }
                Err(e) => {
                    error!(error = %e, "[GEN][ERROR] Server preparation failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Fetches, transforms and aggregates everything configured.
    pub async fn generate(&self) -> Result<OutputFileList> {
        info!(servers = self.servers.len(), "[GEN] Generation started");
        let per_server = try_join_all(
            self.servers
                .iter()
                .enumerate()
                .map(|(index, server)| self.generate_server(index, server)),
        )
        .await?;
        let fragments: Vec<Fragment> = per_server.into_iter().flatten().collect();
        let files = aggregate(fragments)?;
        info!(files = files.len(), "[GEN] Generation finished");
        Ok(files)
    }

    async fn generate_server(&self, server_index: usize, server: &ServerConfig) -> Result<Vec<Fragment>> {
        let projects = server.expanded_projects();
        debug!(server_url = %server.server_url, projects = projects.len(), "[GEN] Expanded project tokens");
        let per_project = try_join_all(
            projects
                .iter()
                .enumerate()
                .map(|(project_index, project)| {
                    self.generate_project(server_index, project_index, server, project)
                }),
        )
        .await?;
        Ok(per_project.into_iter().flatten().collect())
    }

    async fn generate_project(
        &self,
        server_index: usize,
        project_index: usize,
        server: &ServerConfig,
        project: &ProjectConfig,
    ) -> Result<Vec<Fragment>> {
        let key = CatalogKey::new(server.server_url.clone(), project.primary_token());
        let (project_info, menu) =
            futures::try_join!(self.cache.project(&key), self.cache.category_menu(&key))?;
        let available: BTreeSet<i64> = menu.iter().map(|entry| entry.id).collect();

        let mut jobs = Vec::new();
        for category in &project.categories {
            for category_id in resolve_category_ids(&category.id.to_vec(), &available) {
                jobs.push((jobs.len(), category, category_id));
            }
        }
        if jobs.is_empty() {
            warn!(project_id = project_info.id, "[GEN] No categories resolved for project");
            return Ok(Vec::new());
        }

        let stage = TransformStage {
            cwd: &self.cwd,
            hooks: self.hooks.as_ref(),
            synthesizer: self.synthesizer.as_ref(),
        };
        let (key, project_info, stage) = (&key, &project_info, &stage);
        let per_category = try_join_all(jobs.into_iter().map(|(ordinal, category, category_id)| async move {
            let interfaces = self.cache.category_interfaces(key, category_id).await?;
            let config = SyntheticalConfig::new(server, project, category, category_id, project_info);
            stage
                .transform(CategoryBatch {
                    config,
                    project: project_info.clone(),
                    interfaces,
                    server_index,
                    project_index,
                    category_ordinal: ordinal,
                })
                .await
        }))
        .await?;
        Ok(per_category.into_iter().flatten().collect())
    }

    /// Stops every started adapter. All are attempted; the first failure is
    /// returned.
    pub async fn destroy(&mut self) -> Result<()> {
        let started = std::mem::take(&mut self.started);
        let outcomes = join_all(started.iter().map(|s| async move {
            info!(server_url = %s.server_url, "[GEN] Stopping backend adapter");
            s.adapter.stop().await.map_err(|e| {
                error!(server_url = %s.server_url, error = %e, "[GEN][ERROR] Adapter failed to stop");
                GenerateError::Adapter {
                    server_url: s.server_url.clone(),
                    message: e.to_string(),
                }
            })
        }))
        .await;
        outcomes.into_iter().collect::<Result<Vec<()>>>().map(|_| ())
    }

    /// `prepare` → `generate` → `destroy`; adapters are torn down on every path.
    pub async fn run(&mut self) -> Result<OutputFileList> {
        let result = match self.prepare().await {
            Ok(()) => self.generate().await,
            Err(e) => Err(e),
        };
        let teardown = self.destroy().await;
        let files = result?;
        teardown?;
        Ok(files)
    }
}

async fn start_server(
    adapters: &dyn AdapterRegistry,
    server: &ServerConfig,
) -> Result<(Option<Box<dyn BackendAdapter>>, String)> {
    if server.server_type == ServerType::Yapi {
        return Ok((None, server.server_url.clone()));
    }
    let Some(adapter) = adapters.adapter_for(server) else {
        error!(server_url = %server.server_url, server_type = ?server.server_type, "[GEN][ERROR] No adapter for server type");
        return Err(GenerateError::Config(format!(
            "server {} has type {:?} but no backend adapter is available",
            server.server_url, server.server_type
        )));
    };
    info!(server_url = %server.server_url, "[GEN] Starting backend adapter");
    let base_url = adapter.start().await.map_err(|e| GenerateError::Adapter {
        server_url: server.server_url.clone(),
        message: e.to_string(),
    })?;
    Ok((Some(adapter), base_url))
}
