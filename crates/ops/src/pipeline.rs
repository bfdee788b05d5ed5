//! Per-package verification pipeline

use repro_buildinfo::parse;
use repro_errors::{Error, SnapshotError};
use repro_events::{AppEvent, EventEmitter, SnapshotEvent, VerificationEvent};
use repro_sandbox::BuildLog;
use repro_types::{BuildMeasurement, BuildResult, PackageSet, PackageTarget, SnapshotRef};
use std::time::Instant;

use crate::context::OpsCtx;
use crate::results::{build_result, ResultSet};
use crate::RunReport;
use crate::selection::select_packages;

/// Verify every package of `set` in turn and persist the result table.
///
/// Packages are processed one at a time; a package whose metadata cannot be
/// fetched is recorded as failed and the run moves on.
///
/// # Errors
///
/// Returns an error if the package list cannot be determined or the result
/// table cannot be written.
pub async fn run(ctx: &OpsCtx, set: &PackageSet) -> Result<RunReport, Error> {
    let start = Instant::now();
    let packages = select_packages(set, ctx.reports.as_ref(), ctx.config.report.sample_size).await?;
    let total = packages.len();
    ctx.emit(AppEvent::Verification(VerificationEvent::RunStarted {
        selection: set.to_string(),
        packages: packages.clone(),
    }));

    let mut results = ResultSet::new();
    for (index, package) in packages.iter().enumerate() {
        ctx.emit(AppEvent::Verification(VerificationEvent::PackageStarted {
            package: package.clone(),
            index: index + 1,
            total,
        }));
        results.push(verify_package(ctx, package).await);
    }

    let csv_path = ctx.config.results_csv();
    let rows = results.write_csv(&csv_path).await?;
    ctx.emit(AppEvent::Verification(VerificationEvent::ResultsWritten {
        path: csv_path.clone(),
        rows,
    }));

    Ok(RunReport {
        selection: set.to_string(),
        results,
        csv_path,
        duration_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
    })
}

/// Run the whole pipeline for one package. Never fails; anything that
/// prevents a build yields a `failed` result.
pub async fn verify_package(ctx: &OpsCtx, package: &str) -> BuildResult {
    let mut target = PackageTarget::new(package);

    let snapshots = match prepare(ctx, &mut target).await {
        Ok(snapshots) => snapshots,
        Err(e) => {
            ctx.emit(AppEvent::Verification(VerificationEvent::PackageAbandoned {
                package: package.to_string(),
                reason: e.to_string(),
            }));
            return classify(ctx, &target, &BuildMeasurement::failed());
        }
    };

    let measurement = build(ctx, &target, &snapshots).await;
    classify(ctx, &target, &measurement)
}

/// Resolve snapshots and fill `target` from its build report
async fn prepare(ctx: &OpsCtx, target: &mut PackageTarget) -> Result<Vec<SnapshotRef>, Error> {
    let page = ctx.reports.package_page(&target.name).await?;

    let selection = ctx.resolver.resolve(&target.name, page.build_time).await?;
    if let Err(SnapshotError::InsufficientSnapshots { package, found }) =
        selection.ensure_complete()
    {
        ctx.emit(AppEvent::Snapshot(SnapshotEvent::Insufficient { package, found }));
    }

    let report = ctx.reports.build_report(&page).await?;
    let info = parse(&report, &target.name);
    if let Err(e) = info.validate() {
        ctx.emit_warning_with_context("build report incomplete", e.to_string());
    }
    info.apply_to(target);

    Ok(selection.into_refs())
}

/// Provision a sandbox, build in it and tear it down
async fn build(ctx: &OpsCtx, target: &PackageTarget, snapshots: &[SnapshotRef]) -> BuildMeasurement {
    let handle = match ctx.sandbox.provision(&target.name).await {
        Ok(handle) => handle,
        Err(e) => {
            ctx.emit(AppEvent::Verification(VerificationEvent::PackageAbandoned {
                package: target.name.clone(),
                reason: e.to_string(),
            }));
            return BuildMeasurement::failed();
        }
    };

    let mut log = match BuildLog::open(&ctx.config.logs_dir(), &target.name).await {
        Ok(log) => log,
        Err(e) => {
            ctx.emit_warning_with_context("build log unavailable", e.to_string());
            BuildLog::discard()
        }
    };

    if let Err(e) = ctx
        .sandbox
        .configure_sources(&handle, snapshots, &mut log)
        .await
    {
        ctx.emit_warning_with_context(
            format!("could not configure package sources for {}", target.name),
            e.to_string(),
        );
    }

    if let Some(simulated) = &ctx.simulated {
        if ctx.config.sandbox.simulate_success {
            simulated.register_artifact(&target.binary_filename, &target.expected_checksum);
        }
    }

    let measurement = ctx
        .executor
        .build(&ctx.sandbox, &handle, target, &mut log)
        .await;

    if let Err(e) = log.close().await {
        ctx.emit_warning_with_context("build log not flushed", e.to_string());
    }
    ctx.sandbox.teardown(handle).await;

    measurement
}

fn classify(ctx: &OpsCtx, target: &PackageTarget, measurement: &BuildMeasurement) -> BuildResult {
    let result = build_result(target, measurement);
    ctx.emit(AppEvent::Verification(VerificationEvent::Classified {
        package: result.package.clone(),
        outcome: result.outcome,
        expected: target.expected_checksum.clone(),
        computed: result.digest.clone(),
    }));
    result
}
