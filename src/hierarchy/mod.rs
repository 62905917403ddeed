//! Portfolio hierarchy reconciliation
//!
//! Brings the child references of a SonarQube portfolio in line with a
//! desired set: validation against the live eligible set, set diffing, and
//! the ordered add/remove calls of the Create/Read/Update/Delete lifecycle.

mod diff;
mod reconciler;
mod validate;

pub use diff::diff_references;
pub use reconciler::{HierarchyReconciler, ResourceState};
pub use validate::{candidate_references, validate_references};

use crate::client::ApiError;
use crate::types::PortfolioKey;

/// Errors surfaced by the hierarchy lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// Transport, status, or decode failure from the API client, propagated
    /// verbatim.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A desired child reference is not in the eligible set. Raised before
    /// any mutating call, so the whole operation is safe to retry after
    /// fixing the input.
    #[error("reference {reference} is not an eligible portfolio")]
    InvalidReference { reference: PortfolioKey },

    /// The portfolio does not exist on the server. Distinct from other
    /// failures so callers can treat it as "externally deleted" and drop the
    /// resource from their state.
    #[error("portfolio {key} not found")]
    NotFound { key: PortfolioKey },
}
