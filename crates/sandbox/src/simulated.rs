//! In-memory runtime for dry runs and tests

use async_trait::async_trait;
use repro_errors::SandboxError;
use repro_platform::CommandOutput;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::runtime::SandboxRuntime;

const SOURCES_LIST: &str = "/etc/apt/sources.list";

/// What `sha256sum <artifact>` answers in a simulated sandbox
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestBehaviour {
    /// Digest registered for the artifact with
    /// [`SimulatedRuntime::register_artifact`], or a missing file
    Registered,
    /// The same digest for every artifact
    Fixed(String),
    /// Every artifact is missing
    Missing,
}

#[derive(Default)]
struct State {
    next_id: u64,
    images: HashSet<String>,
    instances: HashSet<String>,
    sources: HashMap<String, Vec<String>>,
    artifacts: HashMap<String, String>,
    history: Vec<String>,
}

/// Runtime that executes nothing and records every call
pub struct SimulatedRuntime {
    digest: DigestBehaviour,
    fail_commands: bool,
    state: Mutex<State>,
}

impl Default for SimulatedRuntime {
    fn default() -> Self {
        Self::new(DigestBehaviour::Registered)
    }
}

impl SimulatedRuntime {
    #[must_use]
    pub fn new(digest: DigestBehaviour) -> Self {
        Self {
            digest,
            fail_commands: false,
            state: Mutex::new(State::default()),
        }
    }

    /// Every command run inside an instance fails to execute
    #[must_use]
    pub fn failing_commands(mut self) -> Self {
        self.fail_commands = true;
        self
    }

    /// Pretend `image` has already been built
    #[must_use]
    pub fn with_image(self, image: &str) -> Self {
        self.state().images.insert(image.to_string());
        self
    }

    /// Make `sha256sum <artifact>` print `digest`
    pub fn register_artifact(&self, artifact: &str, digest: &str) {
        self.state()
            .artifacts
            .insert(artifact.to_string(), digest.to_string());
    }

    /// Calls made so far, one line each (`exec <name> <command>` etc.)
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().history.clone()
    }

    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.state().instances.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hash(&self, state: &State, artifact: &str) -> CommandOutput {
        let digest = match &self.digest {
            DigestBehaviour::Registered => state.artifacts.get(artifact).cloned(),
            DigestBehaviour::Fixed(digest) => Some(digest.clone()),
            DigestBehaviour::Missing => None,
        };

        match digest {
            Some(digest) => CommandOutput {
                exit_code: Some(0),
                stdout: format!("{digest}  {artifact}\n").into_bytes(),
                stderr: Vec::new(),
            },
            None => CommandOutput {
                exit_code: Some(1),
                stdout: Vec::new(),
                stderr: format!("sha256sum: {artifact}: No such file or directory\n")
                    .into_bytes(),
            },
        }
    }
}

/// Undo [`crate::shell_quote`] for words without embedded quotes
fn unquote(word: &str) -> &str {
    word.strip_prefix('\'')
        .and_then(|w| w.strip_suffix('\''))
        .unwrap_or(word)
}

fn ok(stdout: String) -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        stdout: stdout.into_bytes(),
        stderr: Vec::new(),
    }
}

#[async_trait]
impl SandboxRuntime for SimulatedRuntime {
    async fn image_exists(&self, image: &str) -> Result<bool, SandboxError> {
        let mut state = self.state();
        state.history.push(format!("images {image}"));
        Ok(state.images.contains(image))
    }

    async fn build_image(&self, tag: &str, context: &Path) -> Result<(), SandboxError> {
        let mut state = self.state();
        state
            .history
            .push(format!("build {tag} {}", context.display()));
        state.images.insert(tag.to_string());
        Ok(())
    }

    async fn create_named_instance(
        &self,
        name: &str,
        image: &str,
        init_command: &str,
    ) -> Result<String, SandboxError> {
        let mut state = self.state();
        state
            .history
            .push(format!("run {name} {image} {init_command}"));

        if !state.images.contains(image) {
            return Err(SandboxError::StartFailed {
                sandbox: name.to_string(),
                message: format!("no such image: {image}"),
            });
        }
        if !state.instances.insert(name.to_string()) {
            return Err(SandboxError::StartFailed {
                sandbox: name.to_string(),
                message: "name already in use".to_string(),
            });
        }

        state.next_id += 1;
        Ok(format!("sim{:060x}", state.next_id))
    }

    async fn exec_in_instance(
        &self,
        name: &str,
        command: &str,
        _timeout: Option<Duration>,
    ) -> Result<CommandOutput, SandboxError> {
        let mut state = self.state();
        state.history.push(format!("exec {name} {command}"));

        if self.fail_commands || !state.instances.contains(name) {
            return Err(SandboxError::CommandFailed {
                sandbox: name.to_string(),
                command: command.to_string(),
                message: "simulated command failure".to_string(),
            });
        }

        if let Some(artifact) = command.strip_prefix("sha256sum -- ") {
            return Ok(self.hash(&state, unquote(artifact.trim())));
        }

        if let Some(line) = command
            .strip_prefix("echo ")
            .and_then(|rest| rest.strip_suffix(&format!(" >> {SOURCES_LIST}")))
        {
            state
                .sources
                .entry(name.to_string())
                .or_default()
                .push(unquote(line).to_string());
            return Ok(ok(String::new()));
        }

        if command == format!("cat {SOURCES_LIST}") {
            let listing = state
                .sources
                .get(name)
                .map(|lines| lines.iter().map(|l| format!("{l}\n")).collect::<String>())
                .unwrap_or_default();
            return Ok(ok(listing));
        }

        Ok(ok(String::new()))
    }

    async fn remove_instance(&self, name: &str) -> Result<(), SandboxError> {
        let mut state = self.state();
        state.history.push(format!("rm {name}"));
        state.sources.remove(name);

        if state.instances.remove(name) {
            Ok(())
        } else {
            Err(SandboxError::TeardownFailed {
                sandbox: name.to_string(),
                message: format!("no such container: {name}"),
            })
        }
    }
}
