use async_trait::async_trait;
use strategos_core::{HistoryKind, PlaybookRunner, RunnerInvocation, RunnerOutcome};
use tokio::process::Command;

/// Default runner: shells out to the ansible binaries and captures output.
///
/// The inventory's name is handed to `-i`; deployments name inventories
/// after the inventory sources ansible should read. Anything richer plugs
/// in behind the `PlaybookRunner` trait.
pub struct CommandRunner {
    playbook_bin: String,
    module_bin: String,
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            playbook_bin: "ansible-playbook".to_string(),
            module_bin: "ansible".to_string(),
        }
    }

    pub fn with_binaries(playbook_bin: String, module_bin: String) -> Self {
        Self {
            playbook_bin,
            module_bin,
        }
    }
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaybookRunner for CommandRunner {
    async fn run(&self, invocation: RunnerInvocation) -> strategos_core::Result<RunnerOutcome> {
        let mut command = match invocation.kind {
            HistoryKind::Playbook => {
                let mut command = Command::new(&self.playbook_bin);
                command.arg(&invocation.target);
                command
            }
            HistoryKind::Module => {
                let mut command = Command::new(&self.module_bin);
                command.arg("all").arg("-m").arg(&invocation.target);
                command
            }
        };

        command.arg("-i").arg(&invocation.inventory.name);

        for (key, value) in &invocation.options.extra {
            command.arg(format!("--{}", key));
            match value {
                serde_json::Value::String(s) => {
                    command.arg(s);
                }
                serde_json::Value::Bool(true) | serde_json::Value::Null => {}
                other => {
                    command.arg(other.to_string());
                }
            }
        }

        command.current_dir(&invocation.project_path);

        tracing::debug!(
            "Spawning {} for '{}' in {:?}",
            invocation.kind.as_str(),
            invocation.target,
            invocation.project_path
        );

        let output = command.output().await?;

        let mut stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        stdout.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(RunnerOutcome {
            ok: output.status.success(),
            stdout,
        })
    }
}
