use std::env;
use std::fs::write;

use serial_test::serial;
use tempfile::NamedTempFile;

use api_power::config::{OneOrMany, ServerType};
use api_power::load_config::load_config;

fn config_file(yaml: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("temp file");
    write(file.path(), yaml).expect("write config");
    file
}

/// Tokens given as `env:NAME` are read from the environment at load time.
#[tokio::test]
#[serial]
async fn test_load_config_resolves_env_tokens_and_cascade_fields() {
    let file = config_file(
        r#"
servers:
  - server_url: "http://yapi.example.com/"
    types_only: false
    comment:
      link: false
    projects:
      - token: ["env:API_POWER_TEST_TOKEN", "plain-token"]
        dev_env_name: dev
        categories:
          - id: [0, -3]
            output_file_path: src/api/index.ts
          - id: 7
            types_only: true
"#,
    );
    env::set_var("API_POWER_TEST_TOKEN", "from-env");

    let config = load_config(file.path()).expect("Config should load");

    let server = &config.servers[0];
    assert_eq!(server.server_type, ServerType::Yapi);
    assert_eq!(server.shared.comment.as_ref().map(|c| c.link), Some(false));
    assert_eq!(server.shared.comment.as_ref().map(|c| c.title), Some(true));

    let project = &server.projects[0];
    assert_eq!(
        project.token,
        OneOrMany::Many(vec!["from-env".to_string(), "plain-token".to_string()])
    );
    assert_eq!(project.shared.dev_env_name.as_deref(), Some("dev"));
    assert_eq!(project.categories[0].id.to_vec(), vec![0, -3]);
    assert_eq!(project.categories[1].id, OneOrMany::One(7));
    assert_eq!(project.categories[1].shared.types_only, Some(true));
    assert_eq!(server.expanded_projects().len(), 2);

    env::remove_var("API_POWER_TEST_TOKEN");
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_env_token() {
    env::remove_var("API_POWER_MISSING_TOKEN");
    let file = config_file(
        r#"
servers:
  - server_url: "http://yapi.example.com"
    projects:
      - token: "env:API_POWER_MISSING_TOKEN"
        categories:
          - id: 0
"#,
    );
    let err = load_config(file.path()).expect_err("missing env var must fail");
    assert!(err.to_string().contains("API_POWER_MISSING_TOKEN"));
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_empty_selector_list() {
    let file = config_file(
        r#"
servers:
  - server_url: "http://yapi.example.com"
    projects:
      - token: abc
        categories:
          - id: []
"#,
    );
    let err = load_config(file.path()).expect_err("empty selector list must fail");
    assert!(err.to_string().contains("Invalid config"));
}

#[tokio::test]
#[serial]
async fn test_load_config_rejects_unknown_server_type() {
    let file = config_file(
        r#"
servers:
  - server_url: "http://yapi.example.com"
    server_type: graphql
    projects:
      - token: abc
"#,
    );
    assert!(load_config(file.path()).is_err());
}

#[tokio::test]
#[serial]
async fn test_load_config_errors_on_missing_file() {
    let err = load_config("/definitely/not/here.yaml").expect_err("must fail");
    assert!(err.to_string().contains("Failed to read config file"));
}
