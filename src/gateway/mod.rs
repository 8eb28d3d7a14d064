//! The narrow interface to the remote collaboration platform.
//!
//! Everything the provisioner knows about the platform goes through
//! [`PlatformGateway`]: entity get/create/update, child lookup, permission
//! grants, tabular view queries, team and ACL management, wikis, and forums.
//! Components take a gateway handle as an explicit argument; session
//! lifecycle (login, token refresh) belongs to the composition root.
//!
//! Two implementations:
//! - [`RestGateway`]: reqwest client against the platform's REST API.
//! - [`MemoryGateway`]: in-process store with the same conflict and
//!   not-found semantics, for exercising the reconciliation logic without
//!   a platform.

mod memory;
mod query;
mod rest;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryGateway;
pub use query::{quote_literal, QueryFilter, QueryResult};
pub use rest::RestGateway;

use crate::models::{
    AccessLevel, Entity, EntityDraft, EntityId, Forum, MembershipStatus, Team, TeamAcl, TeamDraft,
    ThreadDraft, Wiki, WikiDraft,
};

/// Errors surfaced by gateway implementations.
///
/// `Conflict` and `NotFound` are expected conditions that the reconciliation
/// core converts into control flow (fallback lookup, create branch). The
/// rest are surfaced to the caller.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// A name collision on create with overwrite disabled.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A filter could not be rendered into the platform's query dialect.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Any other platform-reported failure.
    #[error("platform error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced a platform response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The remote platform, as consumed by the provisioner.
///
/// All operations are single synchronous round trips with no retry or
/// locking; read-modify-write callers (scope merges, ACL updates) own the
/// resulting race windows.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    async fn get_entity(&self, id: &EntityId) -> Result<Entity, GatewayError>;

    /// Create an entity. With `overwrite` disabled the platform rejects a
    /// (parent, name) collision with [`GatewayError::Conflict`].
    async fn create_entity(
        &self,
        draft: &EntityDraft,
        overwrite: bool,
    ) -> Result<Entity, GatewayError>;

    /// Replace an entity's stored representation in full.
    async fn update_entity(&self, entity: &Entity) -> Result<Entity, GatewayError>;

    /// Look up a direct child by name. `None` parent means top level.
    async fn find_child(
        &self,
        parent_id: Option<&EntityId>,
        name: &str,
    ) -> Result<EntityId, GatewayError>;

    async fn set_permissions(
        &self,
        entity_id: &EntityId,
        principal_id: &str,
        access: &[AccessLevel],
    ) -> Result<(), GatewayError>;

    /// Run a filtered ID query against an aggregation view or table.
    ///
    /// Results may lag behind recent scope mutations; the backing index is
    /// rebuilt asynchronously and a trivial query encourages a refresh.
    async fn query(
        &self,
        view_id: &EntityId,
        filter: &QueryFilter,
    ) -> Result<QueryResult, GatewayError>;

    async fn get_team(&self, team_id: &str) -> Result<Team, GatewayError>;

    /// Fetch a team by exact name. `NotFound` is the normal "absent" signal.
    async fn get_team_by_name(&self, name: &str) -> Result<Team, GatewayError>;

    async fn create_team(&self, draft: &TeamDraft) -> Result<Team, GatewayError>;

    async fn membership_status(
        &self,
        team_id: &str,
        principal_id: &str,
    ) -> Result<MembershipStatus, GatewayError>;

    async fn create_invitation(
        &self,
        team_id: &str,
        invitee_id: &str,
    ) -> Result<(), GatewayError>;

    async fn get_team_acl(&self, team_id: &str) -> Result<TeamAcl, GatewayError>;

    /// Whole-document ACL replacement.
    async fn put_team_acl(&self, acl: &TeamAcl) -> Result<TeamAcl, GatewayError>;

    async fn get_wiki(&self, owner_id: &EntityId) -> Result<Wiki, GatewayError>;

    /// Fetch the raw markdown body of a wiki template entity.
    async fn get_wiki_markdown(&self, template_id: &EntityId) -> Result<String, GatewayError>;

    async fn create_wiki(&self, draft: &WikiDraft) -> Result<Wiki, GatewayError>;

    async fn update_wiki(&self, wiki: &Wiki) -> Result<Wiki, GatewayError>;

    async fn get_forum(&self, project_id: &EntityId) -> Result<Forum, GatewayError>;

    async fn create_thread(&self, draft: &ThreadDraft) -> Result<(), GatewayError>;
}
