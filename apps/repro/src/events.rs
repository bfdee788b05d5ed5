//! Event handling and progress display

use console::{style, Term};
use repro_events::{
    AppEvent, BuildEvent, EventMessage, GeneralEvent, SandboxEvent, SnapshotEvent,
    VerificationEvent,
};
use repro_types::Outcome;

use crate::logging::log_event_with_tracing;

/// Turns pipeline events into status lines on stderr
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    debug_enabled: bool,
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            debug_enabled,
            quiet: false,
        }
    }

    /// Log events without printing status lines
    #[must_use]
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::Verification(event) => self.handle_verification(event),
            AppEvent::Snapshot(event) => self.handle_snapshot(event),
            AppEvent::Sandbox(event) => self.handle_sandbox(event),
            AppEvent::Build(event) => self.handle_build(event),
            AppEvent::General(event) => self.handle_general(event),
        }
    }

    fn handle_verification(&self, event: VerificationEvent) {
        match event {
            VerificationEvent::RunStarted {
                selection,
                packages,
            } => {
                let noun = if packages.len() == 1 { "package" } else { "packages" };
                self.show_status(&format!("Verifying {} {noun} ({selection})", packages.len()));
            }
            VerificationEvent::PackageStarted {
                package,
                index,
                total,
            } => {
                let line = format!("[{index}/{total}] {package}");
                self.show_status(&self.bold(&line));
            }
            VerificationEvent::Classified {
                package, outcome, ..
            } => {
                let verdict = match outcome {
                    Outcome::Match => self.paint_green("reproducible"),
                    Outcome::Mismatch => self.paint_yellow("not reproducible"),
                    Outcome::Failed => self.paint_red("build failed"),
                };
                self.show_status(&format!("  {package}: {verdict}"));
            }
            VerificationEvent::PackageAbandoned { package, reason } => {
                self.show_warning(&format!("{package} abandoned: {reason}"));
            }
            VerificationEvent::ResultsWritten { path, rows } => {
                self.show_status(&format!("Wrote {rows} rows to {}", path.display()));
            }
        }
    }

    fn handle_snapshot(&self, event: SnapshotEvent) {
        match event {
            SnapshotEvent::Resolved { snapshots, .. } => {
                self.show_status(&format!("  snapshots: {}", snapshots.join(", ")));
            }
            SnapshotEvent::Insufficient { package, found } => {
                self.show_warning(&format!(
                    "only {found} snapshot(s) found for {package}, building anyway"
                ));
            }
            SnapshotEvent::Resolving { .. } | SnapshotEvent::MonthListed { .. } => {}
        }
    }

    fn handle_sandbox(&self, event: SandboxEvent) {
        match event {
            SandboxEvent::ImageBuilding { image } => {
                self.show_status(&format!("Building sandbox image {image}"));
            }
            SandboxEvent::Provisioned { sandbox, .. } => {
                self.show_status(&format!("  sandbox {sandbox} started"));
            }
            SandboxEvent::CommandStarted { sandbox, command } if self.debug_enabled => {
                self.show_status(&format!("  {sandbox} > {command}"));
            }
            SandboxEvent::CommandFailed {
                command, failure, ..
            } => {
                self.show_error(&format!("{command}: {}", failure.message));
            }
            SandboxEvent::TeardownFailed { sandbox, failure } => {
                self.show_warning(&format!("could not remove {sandbox}: {}", failure.message));
            }
            SandboxEvent::CommandStarted { .. }
            | SandboxEvent::SourcesConfigured { .. }
            | SandboxEvent::TornDown { .. } => {}
        }
    }

    fn handle_build(&self, event: BuildEvent) {
        match event {
            BuildEvent::StepStarted { step, .. } => {
                self.show_status(&format!("  {}", step.as_str()));
            }
            BuildEvent::StepAborted { step, error, .. } => {
                self.show_error(&format!("{} aborted: {error}", step.as_str()));
            }
            BuildEvent::Completed {
                wall_time,
                user_time,
                system_time,
                ..
            } => {
                self.show_status(&format!(
                    "  took {wall_time:.3}s (user {user_time:.3}s, system {system_time:.3}s)"
                ));
            }
            BuildEvent::Started { .. } | BuildEvent::DigestComputed { .. } => {}
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => match context {
                Some(context) => self.show_warning(&format!("{message}: {context}")),
                None => self.show_warning(&message),
            },
            GeneralEvent::Debug { message } if self.debug_enabled => {
                self.show_status(&format!("debug: {message}"));
            }
            GeneralEvent::Debug { .. } => {}
        }
    }

    fn show_status(&self, line: &str) {
        let _ = self.term.write_line(line);
    }

    fn show_warning(&self, line: &str) {
        let prefix = if self.colors_enabled {
            style("warning:").yellow().bold().to_string()
        } else {
            "warning:".to_string()
        };
        self.show_status(&format!("{prefix} {line}"));
    }

    fn show_error(&self, line: &str) {
        let prefix = if self.colors_enabled {
            style("error:").red().bold().to_string()
        } else {
            "error:".to_string()
        };
        self.show_status(&format!("{prefix} {line}"));
    }

    fn bold(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_green(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).green().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_yellow(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).yellow().to_string()
        } else {
            text.to_string()
        }
    }

    fn paint_red(&self, text: &str) -> String {
        if self.colors_enabled {
            style(text).red().to_string()
        } else {
            text.to_string()
        }
    }
}
