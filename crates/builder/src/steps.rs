//! Commands making up a package rebuild

use repro_events::BuildStep;
use repro_sandbox::shell_quote;
use repro_types::PackageTarget;

/// Install-and-build sequence for `target`, in execution order
#[must_use]
pub fn build_commands(target: &PackageTarget, jobs: usize) -> Vec<(BuildStep, String)> {
    let spec = target.pinned_spec();
    vec![
        (
            BuildStep::InstallDependencies,
            install_command(&target.build_depends),
        ),
        (BuildStep::FetchSource, format!("apt-get source {spec}")),
        (
            BuildStep::InstallBuildDependencies,
            format!("apt-get build-dep -y --force-yes {spec}"),
        ),
        (
            BuildStep::Compile,
            format!(
                "cd {}; dpkg-buildpackage -us -uc -tc -j{}",
                target.source_build_dir(),
                jobs.max(1)
            ),
        ),
    ]
}

/// `sha256sum` invocation for the target's artifact; `None` when the report
/// named no artifact
#[must_use]
pub fn hash_command(target: &PackageTarget) -> Option<String> {
    if target.binary_filename.trim().is_empty() {
        return None;
    }
    Some(format!(
        "sha256sum -- {}",
        shell_quote(&target.binary_filename)
    ))
}

fn install_command(dependencies: &[String]) -> String {
    let mut command = String::from("apt-get install -y");
    for dependency in dependencies {
        command.push(' ');
        command.push_str(dependency);
    }
    command
}
