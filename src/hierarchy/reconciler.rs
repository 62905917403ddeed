//! Lifecycle orchestration for one portfolio hierarchy resource

use tracing::{debug, info};

use super::{candidate_references, diff_references, validate_references, HierarchyError};
use crate::client::{ApiError, SonarClient};
use crate::types::{resource_id, PortfolioHierarchy, PortfolioKey};

/// The externally visible state of a reconciled hierarchy resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceState {
    /// Deterministic identity, derived from the parent key via
    /// [`resource_id`]; never taken from server-assigned data.
    pub id: String,
    pub hierarchy: PortfolioHierarchy,
}

/// Reconciles the child references of one portfolio with a desired set.
///
/// Each operation runs to completion or first failure, issuing one network
/// call per reference with no batching, no retries, and no caching of
/// responses across operations. Multi-call operations are not transactional:
/// when a later call fails, calls already issued are not compensated, so the
/// server may be left with a mix of old and new references. The caller sees
/// the error and can re-run the operation after fixing the cause.
pub struct HierarchyReconciler<'a> {
    client: &'a SonarClient,
}

impl<'a> HierarchyReconciler<'a> {
    pub fn new(client: &'a SonarClient) -> Self {
        Self { client }
    }

    /// Create the hierarchy: validate the desired references against the
    /// live eligible set, add each one in input order, then read back.
    ///
    /// Validation happens before any mutation, so an invalid reference
    /// leaves the server untouched. A failure partway through the add loop
    /// leaves the hierarchy partially applied.
    pub async fn create(
        &self,
        desired: &PortfolioHierarchy,
    ) -> Result<ResourceState, HierarchyError> {
        info!(key = %desired.key, refs = desired.references.len(), "Creating portfolio hierarchy");

        self.check_references(desired).await?;

        for child in &desired.references {
            self.client.add_reference(&desired.key, child).await?;
        }

        let id = resource_id(&desired.key);
        let hierarchy = self.read(&desired.key).await?;
        Ok(ResourceState { id, hierarchy })
    }

    /// Read the current hierarchy for `key` from the server.
    ///
    /// An absent portfolio surfaces as [`HierarchyError::NotFound`] so the
    /// caller can drop the resource from its state instead of failing the
    /// whole apply.
    pub async fn read(&self, key: &PortfolioKey) -> Result<PortfolioHierarchy, HierarchyError> {
        info!(key = %key, "Reading portfolio hierarchy");

        let show = match self.client.show(key).await {
            Ok(show) => show,
            Err(ApiError::NotFound { .. }) => {
                return Err(HierarchyError::NotFound { key: key.clone() })
            }
            Err(err) => return Err(err.into()),
        };

        let references = show.sub_views.into_iter().map(|view| view.key).collect();
        Ok(PortfolioHierarchy {
            key: show.key,
            references,
        })
    }

    /// Reconcile from `old` to `new`.
    ///
    /// The desired references are always re-validated against a freshly
    /// fetched eligible set for the target key; stale eligibility data is
    /// never reused.
    ///
    /// A key change is a structural rename: the API has no rename primitive
    /// for hierarchy membership, so every old reference is removed under the
    /// old key and the hierarchy is created from scratch under the new one
    /// (which re-validates on its own fetch). A pure reference change issues
    /// removes for dropped keys first, then adds for new keys; removing
    /// before adding avoids transient duplicate membership.
    pub async fn update(
        &self,
        old: &PortfolioHierarchy,
        new: &PortfolioHierarchy,
    ) -> Result<ResourceState, HierarchyError> {
        info!(old_key = %old.key, new_key = %new.key, "Updating portfolio hierarchy");

        self.check_references(new).await?;

        if old.key != new.key {
            for child in &old.references {
                self.client.remove_reference(&old.key, child).await?;
            }
            return self.create(new).await;
        }

        let delta = diff_references(&old.references, &new.references);
        debug!(
            add = delta.to_add.len(),
            remove = delta.to_remove.len(),
            "Computed reference delta"
        );

        for child in &delta.to_remove {
            self.client.remove_reference(&new.key, child).await?;
        }
        for child in &delta.to_add {
            self.client.add_reference(&new.key, child).await?;
        }

        Ok(ResourceState {
            id: resource_id(&new.key),
            hierarchy: new.clone(),
        })
    }

    /// Tear down the hierarchy by removing every last-known reference.
    ///
    /// Works from the references the caller holds, not a fresh listing, so
    /// references added out-of-band since the last read are not removed.
    /// A reference the server no longer knows about is skipped, which makes
    /// delete idempotent.
    pub async fn delete(&self, current: &PortfolioHierarchy) -> Result<(), HierarchyError> {
        info!(key = %current.key, refs = current.references.len(), "Deleting portfolio hierarchy");

        for child in &current.references {
            match self.client.remove_reference(&current.key, child).await {
                Ok(()) => {}
                Err(ApiError::NotFound { .. }) => {
                    debug!(key = %current.key, child = %child, "Reference already absent, skipping");
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Fetch the current eligible set for the parent and validate the
    /// desired references against it. Called immediately before every
    /// mutating operation.
    async fn check_references(&self, desired: &PortfolioHierarchy) -> Result<(), HierarchyError> {
        let listed = self.client.list_referenceable(&desired.key).await?;
        let eligible = candidate_references(&desired.key, &listed);
        validate_references(&desired.references, &eligible)
    }
}
