//! Fan-in: groups generated fragments by output file and merges each group in
//! weight order, whatever order the fragments were produced in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{GenerateError, Result};

/// Ordering key of one interface: `(server, project, category, interface)`,
/// compared lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WeightVector {
    pub server: usize,
    pub project: usize,
    pub category: usize,
    pub interface: usize,
}

impl WeightVector {
    pub fn new(server: usize, project: usize, category: usize, interface: usize) -> Self {
        Self {
            server,
            project,
            category,
            interface,
        }
    }
}

/// Per-file settings every fragment of a group must agree on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupSettings {
    pub types_only: bool,
    pub request_function_file_path: PathBuf,
    pub request_hook_maker_file_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    pub output_path: PathBuf,
    pub code: String,
    pub weight: WeightVector,
    pub settings: GroupSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputGroup {
    pub settings: GroupSettings,
    /// Ascending by weight.
    pub fragments: Vec<Fragment>,
}

impl OutputGroup {
    pub fn content(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.code.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub type OutputFileList = BTreeMap<PathBuf, OutputGroup>;

pub fn aggregate(mut fragments: Vec<Fragment>) -> Result<OutputFileList> {
    fragments.sort_by_key(|f| f.weight);

    let mut files = OutputFileList::new();
    for fragment in fragments {
        match files.get_mut(&fragment.output_path) {
            Some(group) => {
                check_settings(&fragment.output_path, &group.settings, &fragment.settings)?;
                group.fragments.push(fragment);
            }
            None => {
                files.insert(
                    fragment.output_path.clone(),
                    OutputGroup {
                        settings: fragment.settings.clone(),
                        fragments: vec![fragment],
                    },
                );
            }
        }
    }

    debug!(files = files.len(), "[GEN] Aggregated fragments");
    Ok(files)
}

fn check_settings(path: &Path, first: &GroupSettings, next: &GroupSettings) -> Result<()> {
    let conflict = if first.types_only != next.types_only {
        Some((
            "types_only",
            first.types_only.to_string(),
            next.types_only.to_string(),
        ))
    } else if first.request_function_file_path != next.request_function_file_path {
        Some((
            "request_function_file_path",
            first.request_function_file_path.display().to_string(),
            next.request_function_file_path.display().to_string(),
        ))
    } else if first.request_hook_maker_file_path != next.request_hook_maker_file_path {
        let show = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".to_string())
        };
        Some((
            "request_hook_maker_file_path",
            show(&first.request_hook_maker_file_path),
            show(&next.request_hook_maker_file_path),
        ))
    } else {
        None
    };

    match conflict {
        Some((setting, first, second)) => {
            error!(path = %path.display(), setting, %first, %second, "[GEN][ERROR] Conflicting output file settings");
            Err(GenerateError::ConflictingSetting {
                path: path.to_path_buf(),
                setting,
                first,
                second,
            })
        }
        None => Ok(()),
    }
}
