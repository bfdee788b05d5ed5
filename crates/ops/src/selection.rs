//! Package selection for a run

use rand::seq::index;
use rand::Rng;
use repro_buildinfo::ReportService;
use repro_errors::{Error, OpsError};
use repro_types::PackageSet;

/// Pick `count` names from `names` at random, keeping their listing order
pub fn sample_packages<R: Rng + ?Sized>(names: &[String], count: usize, rng: &mut R) -> Vec<String> {
    let amount = count.min(names.len());
    let mut picked = index::sample(rng, names.len(), amount).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| names[i].clone()).collect()
}

/// Packages to verify for `set`.
///
/// Fixed selections are returned as-is; `random-fresh` samples
/// `sample_size` names from the live index of reproducible packages.
///
/// # Errors
///
/// Returns an error if the index cannot be fetched or yields no packages.
pub async fn select_packages(
    set: &PackageSet,
    reports: &dyn ReportService,
    sample_size: usize,
) -> Result<Vec<String>, Error> {
    if let Some(packages) = set.fixed_packages() {
        return Ok(packages);
    }

    let names = reports.reproducible_packages().await?;
    let picked = sample_packages(&names, sample_size, &mut rand::rng());
    if picked.is_empty() {
        return Err(OpsError::NoPackagesSpecified.into());
    }

    tracing::debug!(available = names.len(), picked = ?picked, "sampled packages");
    Ok(picked)
}
