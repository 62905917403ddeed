//! Validation of desired references against the live eligible set

use std::collections::BTreeSet;

use tracing::debug;

use super::HierarchyError;
use crate::client::PortfoliosResponse;
use crate::types::PortfolioKey;

/// Build the set of portfolios eligible to be referenced under `parent`.
///
/// The server's `api/views/portfolios` listing includes the parent itself;
/// a portfolio cannot reference itself, so the parent key is dropped here
/// before any validation runs.
pub fn candidate_references(
    parent: &PortfolioKey,
    response: &PortfoliosResponse,
) -> BTreeSet<PortfolioKey> {
    response
        .portfolios
        .iter()
        .map(|entry| entry.key.clone())
        .filter(|key| key != parent)
        .collect()
}

/// Check that every desired reference is in the eligible set.
///
/// Fails fast: the first desired reference (in input order) missing from
/// `eligible` is reported and the rest are not inspected. Callers must pass
/// a freshly fetched eligible set; validating against stale data defeats the
/// check.
pub fn validate_references(
    desired: &[PortfolioKey],
    eligible: &BTreeSet<PortfolioKey>,
) -> Result<(), HierarchyError> {
    for reference in desired {
        if !eligible.contains(reference) {
            return Err(HierarchyError::InvalidReference {
                reference: reference.clone(),
            });
        }
    }
    debug!(count = desired.len(), "All desired references are eligible");
    Ok(())
}
