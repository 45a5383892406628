use std::fs::write;
use std::sync::{Arc, Mutex};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

#[test]
fn help_lists_the_generate_command() {
    let mut cmd = Command::cargo_bin("api-power").expect("Binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("generate"));
}

#[test]
fn generate_fails_for_missing_config() {
    let mut cmd = Command::cargo_bin("api-power").expect("Binary exists");
    cmd.arg("generate")
        .arg("--config")
        .arg("/definitely/not/here.yaml");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn generate_fails_for_invalid_config() {
    let config = NamedTempFile::new().expect("Creating temp config file failed");
    write(config.path(), b"servers: []\n").expect("Writing temp config failed");

    let mut cmd = Command::cargo_bin("api-power").expect("Binary exists");
    cmd.arg("generate").arg("--config").arg(config.path()).arg("--dry-run");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no servers configured"));
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use api_power::cli::{run, Cli, Commands};

    let cli = Cli {
        command: Commands::Generate {
            config: std::path::PathBuf::from("dummy.yaml"),
            cwd: None,
            dry_run: true,
        },
    };

    let _ = run(cli).await;

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
