//! Find-or-create resolution for remote entities.

use crate::gateway::{GatewayError, PlatformGateway};
use crate::models::{Entity, EntityDraft};

use super::error::ProvisionError;

/// Resolve a draft to an entity, creating it if absent.
///
/// Creation is attempted unconditionally with overwrite disabled; a name
/// conflict is the expected signal that a prior run (or a concurrent one)
/// got there first, and resolves through a child lookup instead. The found
/// entity must carry the draft's type; a mismatch is a data-integrity error.
///
/// Two calls with the same (parent, name) yield the same entity ID, absent
/// a concurrent conflicting writer.
pub async fn find_or_create(
    gateway: &dyn PlatformGateway,
    draft: &EntityDraft,
) -> Result<Entity, ProvisionError> {
    match gateway.create_entity(draft, false).await {
        Ok(entity) => {
            tracing::debug!(id = %entity.id, name = %entity.name, "created entity");
            Ok(entity)
        }
        Err(GatewayError::Conflict(_)) => {
            tracing::debug!(name = %draft.name, "entity exists, resolving by lookup");
            let id = gateway.find_child(draft.parent_id.as_ref(), &draft.name).await?;
            let existing = gateway.get_entity(&id).await?;
            if existing.entity_type != draft.entity_type {
                return Err(ProvisionError::TypeMismatch {
                    id: existing.id,
                    expected: draft.entity_type,
                    found: existing.entity_type,
                });
            }
            Ok(existing)
        }
        Err(source) => Err(ProvisionError::Creation {
            name: draft.name.clone(),
            source,
        }),
    }
}
