//! Structured logging integration for events
//!
//! Every event drained from the pipeline channel is also written to the
//! tracing subscriber with structured fields, so `--debug` log files carry
//! the full history of a run.

use repro_events::{
    AppEvent, BuildEvent, EventMessage, GeneralEvent, SandboxEvent, SnapshotEvent,
    VerificationEvent,
};
use tracing::{debug, error, info, warn};

/// Log an event with structured fields
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Snapshot(snapshot_event) => match snapshot_event {
            SnapshotEvent::Resolving {
                package,
                build_time,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    build_time = %build_time,
                    "Resolving snapshots"
                );
            }
            SnapshotEvent::MonthListed { year, month, count } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    year = year,
                    month = month,
                    count = count,
                    "Snapshot month listed"
                );
            }
            SnapshotEvent::Resolved { package, snapshots } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    snapshots = ?snapshots,
                    "Snapshots resolved"
                );
            }
            SnapshotEvent::Insufficient { package, found } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    found = found,
                    "Fewer snapshots than wanted, continuing"
                );
            }
        },

        AppEvent::Sandbox(sandbox_event) => match sandbox_event {
            SandboxEvent::ImageBuilding { image } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    image = %image,
                    "Building sandbox image"
                );
            }
            SandboxEvent::Provisioned {
                package,
                sandbox,
                instance_id,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    sandbox = %sandbox,
                    instance_id = %instance_id,
                    "Sandbox provisioned"
                );
            }
            SandboxEvent::SourcesConfigured { sandbox, sources } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    sandbox = %sandbox,
                    sources = sources,
                    "Package sources configured"
                );
            }
            SandboxEvent::CommandStarted { sandbox, command } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    sandbox = %sandbox,
                    command = %command,
                    "Sandbox command"
                );
            }
            SandboxEvent::CommandFailed {
                sandbox,
                command,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    sandbox = %sandbox,
                    command = %command,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Sandbox command failed"
                );
            }
            SandboxEvent::TornDown { sandbox } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    sandbox = %sandbox,
                    "Sandbox removed"
                );
            }
            SandboxEvent::TeardownFailed { sandbox, failure } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    sandbox = %sandbox,
                    code = ?failure.code,
                    message = %failure.message,
                    "Sandbox teardown failed"
                );
            }
        },

        AppEvent::Build(build_event) => match build_event {
            BuildEvent::Started { package, version } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    version = %version,
                    "Build started"
                );
            }
            BuildEvent::StepStarted { package, step } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    package = %package,
                    step = step.as_str(),
                    "Build step started"
                );
            }
            BuildEvent::StepAborted {
                package,
                step,
                error,
            } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    step = step.as_str(),
                    error = %error,
                    "Build aborted"
                );
            }
            BuildEvent::Completed {
                package,
                wall_time,
                user_time,
                system_time,
                cpu_source,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    wall_time = wall_time,
                    user_time = user_time,
                    system_time = system_time,
                    cpu_source = ?cpu_source,
                    "Build finished"
                );
            }
            BuildEvent::DigestComputed {
                package,
                artifact,
                digest,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    package = %package,
                    artifact = %artifact,
                    digest = %digest,
                    "Artifact hashed"
                );
            }
        },

        AppEvent::Verification(verification_event) => match verification_event {
            VerificationEvent::RunStarted {
                selection,
                packages,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    selection = %selection,
                    count = packages.len(),
                    packages = ?packages,
                    "Verification run started"
                );
            }
            VerificationEvent::PackageStarted {
                package,
                index,
                total,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    index = index,
                    total = total,
                    "Verifying package"
                );
            }
            VerificationEvent::Classified {
                package,
                outcome,
                expected,
                computed,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    outcome = %outcome,
                    expected = %expected,
                    computed = %computed,
                    "Package classified"
                );
            }
            VerificationEvent::PackageAbandoned { package, reason } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    package = %package,
                    reason = %reason,
                    "Package abandoned"
                );
            }
            VerificationEvent::ResultsWritten { path, rows } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    path = %path.display(),
                    rows = rows,
                    "Results written"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::Debug { message } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    scope = ?meta.package,
                    message = %message,
                    "Debug"
                );
            }
        },
    }
}
