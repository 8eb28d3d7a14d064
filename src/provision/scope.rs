//! Scope-set maintenance on aggregation views.

use std::collections::BTreeSet;

use crate::gateway::{PlatformGateway, QueryFilter};
use crate::models::{strip_id_prefix, Entity, EntityId};

use super::error::ProvisionError;

/// Union `members` into a view's scope set and write the view back.
///
/// Scope membership is a set keyed by the bare ID form; the same logical ID
/// may arrive prefixed or bare and must not be double-counted. Membership
/// only grows here, never shrinks.
///
/// One read-modify-write round trip, not atomic. Concurrent merges on the
/// same view can lose one side's additions; callers are expected to merge
/// one view at a time.
pub async fn merge_scope(
    gateway: &dyn PlatformGateway,
    view_id: &EntityId,
    members: &[EntityId],
) -> Result<Entity, ProvisionError> {
    let mut view = gateway.get_entity(view_id).await?;

    let mut scope: BTreeSet<String> = view
        .scope_ids
        .iter()
        .map(|raw| strip_id_prefix(raw).to_string())
        .collect();
    for member in members {
        scope.insert(member.bare().to_string());
    }

    view.scope_ids = scope.into_iter().collect();
    let updated = gateway.update_entity(&view).await?;
    tracing::debug!(view = %view_id, scope = updated.scope_ids.len(), "merged view scope");
    Ok(updated)
}

/// Issue a trivial query against a view to encourage an eager index rebuild.
///
/// The platform refreshes view indexes asynchronously after a scope change;
/// this is a documented workaround, not a consistency guarantee.
pub async fn touch_view(
    gateway: &dyn PlatformGateway,
    view_id: &EntityId,
) -> Result<(), ProvisionError> {
    gateway.query(view_id, &QueryFilter::new().limit(1)).await?;
    Ok(())
}
