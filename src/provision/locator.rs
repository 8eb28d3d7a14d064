//! Locating entities in the virtual hierarchy and in aggregation views.

use crate::gateway::{PlatformGateway, QueryFilter};
use crate::models::{keys, Entity, EntityId};

use super::error::ProvisionError;

/// Depth-first, pre-order search over the annotation-linked hierarchy.
///
/// Any entity carrying a `children` annotation that names an aggregation
/// view is a traversable node; its children are the view's query results,
/// visited in result order. A node without the annotation is a leaf. The
/// first node satisfying `predicate` is returned immediately and nothing
/// past it is fetched; each visited node costs one gateway round trip.
pub async fn find_in_hierarchy<P>(
    gateway: &dyn PlatformGateway,
    root: &EntityId,
    predicate: P,
) -> Result<Option<Entity>, ProvisionError>
where
    P: Fn(&Entity) -> bool,
{
    let mut stack = vec![root.clone()];

    while let Some(id) = stack.pop() {
        let node = gateway.get_entity(&id).await?;
        if predicate(&node) {
            return Ok(Some(node));
        }
        if let Some(view_id) = node.annotations.get(keys::CHILDREN).and_then(|v| v.as_str()) {
            let children = gateway
                .query(&EntityId::from(view_id), &QueryFilter::new())
                .await?;
            // Reverse so the stack pops children in query result order.
            for child in children.ids.into_iter().rev() {
                stack.push(child);
            }
        }
    }

    Ok(None)
}

/// Resolve an identity filter against a view, demanding at most one match.
///
/// More than one match means two entities claim the same identity, which
/// indicates upstream data corruption and is fatal rather than auto-resolved.
pub async fn find_unique(
    gateway: &dyn PlatformGateway,
    view_id: &EntityId,
    filter: &QueryFilter,
    what: &str,
) -> Result<Option<Entity>, ProvisionError> {
    let result = gateway.query(view_id, filter).await?;
    match result.ids.as_slice() {
        [] => Ok(None),
        [id] => Ok(Some(gateway.get_entity(id).await?)),
        ids => Err(ProvisionError::DuplicateEntity {
            what: what.to_string(),
            count: ids.len(),
        }),
    }
}
