//! Interface transform stage: runs user pre-processing over one resolved
//! category, orders the survivors, and turns each into a weighted [`Fragment`].

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::aggregate::{Fragment, GroupSettings, WeightVector};
use crate::case::ChangeCase;
use crate::catalog::{Interface, Project};
use crate::codegen::{default_output_file_path, generate_fragment};
use crate::config::SyntheticalConfig;
use crate::contract::{InterfaceHooks, TypeSynthesizer};
use crate::error::{GenerateError, Result};

/// Everything needed to transform the interfaces of one resolved category.
#[derive(Debug, Clone)]
pub struct CategoryBatch {
    pub config: SyntheticalConfig,
    pub project: Arc<Project>,
    pub interfaces: Vec<Interface>,
    pub server_index: usize,
    pub project_index: usize,
    /// Project-wide ordinal of (category config, resolved id).
    pub category_ordinal: usize,
}

pub struct TransformStage<'a> {
    pub cwd: &'a Path,
    pub hooks: &'a dyn InterfaceHooks,
    pub synthesizer: &'a dyn TypeSynthesizer,
}

impl TransformStage<'_> {
    pub async fn transform(&self, batch: CategoryBatch) -> Result<Vec<Fragment>> {
        let case = ChangeCase;
        let config = &batch.config;
        info!(
            category_id = config.category_id,
            interfaces = batch.interfaces.len(),
            "[GEN] Transforming category"
        );

        let prepared = try_join_all(batch.interfaces.iter().map(|interface| {
            let mut owned = interface.clone();
            owned.project = Some(batch.project.clone());
            async move {
                self.hooks
                    .preprocess_interface(owned, &case, config)
                    .await
                    .map_err(|e| GenerateError::hook("preprocess_interface", e))
            }
        }))
        .await?;

        let mut survivors: Vec<Interface> = prepared.into_iter().flatten().collect();
        let dropped = batch.interfaces.len() - survivors.len();
        if dropped > 0 {
            debug!(category_id = config.category_id, dropped, "[GEN] Interfaces dropped by preprocess hook");
        }
        survivors.sort_by_key(|i| i.id);

        let fragments = try_join_all(survivors.iter().enumerate().map(|(index, interface)| {
            let weight = WeightVector::new(
                batch.server_index,
                batch.project_index,
                batch.category_ordinal,
                index,
            );
            self.fragment(interface, config, weight)
        }))
        .await?;
        Ok(fragments)
    }

    async fn fragment(
        &self,
        interface: &Interface,
        config: &SyntheticalConfig,
        weight: WeightVector,
    ) -> Result<Fragment> {
        let case = ChangeCase;
        let raw_path = match self
            .hooks
            .output_file_path(interface, &case)
            .await
            .map_err(|e| GenerateError::hook("output_file_path", e))?
        {
            Some(path) => path,
            None => config
                .output_file_path
                .clone()
                .unwrap_or_else(|| default_output_file_path(interface, &case)),
        };
        let output_path = resolve_path(self.cwd, &raw_path);
        let code = generate_fragment(interface, config, self.hooks, self.synthesizer).await?;
        let settings = group_settings(self.cwd, &output_path, config);
        Ok(Fragment {
            output_path,
            code,
            weight,
            settings,
        })
    }
}

fn group_settings(cwd: &Path, output_path: &Path, config: &SyntheticalConfig) -> GroupSettings {
    let output_dir = output_path.parent().unwrap_or(cwd);
    let request_function_file_path = match &config.request_function_file_path {
        Some(path) => resolve_path(cwd, path),
        None => output_dir.join("request.ts"),
    };
    let request_hook_maker_file_path = config.react_hooks.enabled.then(|| {
        match &config.react_hooks.request_hook_maker_file_path {
            Some(path) => resolve_path(cwd, path),
            None => output_dir.join("makeRequestHook.ts"),
        }
    });
    GroupSettings {
        types_only: config.types_only,
        request_function_file_path,
        request_hook_maker_file_path,
    }
}

/// Joins `path` onto `cwd` (absolute paths win) and normalises it lexically.
pub fn resolve_path(cwd: &Path, path: &str) -> PathBuf {
    normalize_path(&cwd.join(path))
}

/// Removes `.` and folds `..` without touching the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dot_segments() {
        assert_eq!(
            resolve_path(Path::new("/work/app"), "./src/../api//user.ts"),
            PathBuf::from("/work/app/api/user.ts")
        );
        assert_eq!(
            resolve_path(Path::new("/work"), "/abs/./x.ts"),
            PathBuf::from("/abs/x.ts")
        );
        assert_eq!(normalize_path(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize_path(Path::new("../a/../b")), PathBuf::from("../b"));
    }
}
