use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::config::{GeneratorConfig, OneOrMany};

/// Prefix marking a token that is read from the environment instead of the file.
pub const ENV_TOKEN_PREFIX: &str = "env:";

/// Loads a YAML generator config, resolves `env:NAME` tokens and validates it.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GeneratorConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!("Failed to read config file {:?}: {}", path_ref, e));
        }
    };

    let mut config: GeneratorConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    for server in &mut config.servers {
        for project in &mut server.projects {
            project.token = match &project.token {
                OneOrMany::One(token) => OneOrMany::One(resolve_token(token)?),
                OneOrMany::Many(tokens) => OneOrMany::Many(
                    tokens
                        .iter()
                        .map(|t| resolve_token(t))
                        .collect::<Result<Vec<_>>>()?,
                ),
            };
        }
        server.trace_loaded();
    }

    if let Err(e) = config.validate() {
        error!(error = %e, config_path = ?path_ref, "Config failed validation");
        return Err(anyhow::anyhow!("Invalid config {:?}: {e}", path_ref));
    }

    info!(
        servers = config.servers.len(),
        projects = config.servers.iter().map(|s| s.projects.len()).sum::<usize>(),
        "Config loaded and validated successfully"
    );
    Ok(config)
}

fn resolve_token(token: &str) -> Result<String> {
    let Some(var) = token.strip_prefix(ENV_TOKEN_PREFIX) else {
        return Ok(token.to_string());
    };
    match std::env::var(var) {
        Ok(value) => {
            info!(var = %var, "Token resolved from environment");
            Ok(value)
        }
        Err(e) => {
            error!(error = ?e, var = %var, "Token environment variable not set");
            Err(anyhow::anyhow!("{var} environment variable not set: {e}"))
        }
    }
}
