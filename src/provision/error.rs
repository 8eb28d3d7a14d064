use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::{EntityId, EntityType, WorkspaceParseError};

/// Errors surfaced by the reconciliation core.
///
/// Expected gateway conditions (conflict, not-found) never appear here; they
/// are converted into control flow at the point of occurrence. Everything in
/// this enum is fatal to the current step. Prior steps are not rolled back;
/// a re-run repairs the partially-provisioned state through the same
/// idempotent sequence.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// An entity with the desired name exists under the parent but with a
    /// different type. Operator data-integrity problem; never coerced.
    #[error("entity {id} already exists as a {found}, expected a {expected}")]
    TypeMismatch {
        id: EntityId,
        expected: EntityType,
        found: EntityType,
    },

    /// More than one entity matched a supposedly-unique identity.
    #[error("found {count} {what} entries matching a unique identity")]
    DuplicateEntity { what: String, count: usize },

    /// A sprint was requested under a rally that does not exist.
    #[error("no rally {rally} exists; create it before its sprints")]
    MissingParent { rally: u32 },

    /// Creation failed for a reason other than a name conflict.
    #[error("failed to create {name:?}: {source}")]
    Creation {
        name: String,
        #[source]
        source: GatewayError,
    },

    /// A permission grant was rejected.
    #[error("failed to grant access to principal {principal}: {source}")]
    Permission {
        principal: String,
        #[source]
        source: GatewayError,
    },

    /// A folder spec entry referenced a parent path that was never
    /// materialized; parents must precede children in the spec.
    #[error("folder spec entry {path:?} has no materialized parent")]
    UnrootedFolder { path: String },

    #[error(transparent)]
    InvalidWorkspace(#[from] WorkspaceParseError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}
