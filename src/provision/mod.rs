//! The idempotent reconciliation core.
//!
//! Building blocks first, orchestration on top:
//!
//! - [`find_or_create`]: resolve a draft to an entity, tolerating the
//!   already-exists collision with a fallback lookup.
//! - [`merge_scope`] / [`touch_view`]: duplicate-free membership maintenance
//!   on aggregation views.
//! - [`find_in_hierarchy`] / [`find_unique`]: locating workspaces via the
//!   annotation-linked hierarchy or a view identity query.
//! - [`ensure_team`] / [`invite`]: idempotent team provisioning.
//! - [`materialize`]: folder-tree creation under a root container.
//! - [`create_rally`] / [`create_sprint`] and their getters: the workspace
//!   orchestrators.
//!
//! Every step checks for prior existence before creating, so re-running any
//! orchestration after a partial failure converges without duplicates.

mod error;
mod folders;
mod locator;
mod rally;
mod resolver;
mod scope;
mod sprint;
mod team;
mod wiki;

pub use error::ProvisionError;
pub use folders::materialize;
pub use locator::{find_in_hierarchy, find_unique};
pub use rally::{create_rally, get_rallies, get_rally};
pub use resolver::find_or_create;
pub use scope::{merge_scope, touch_view};
pub use sprint::{create_sprint, get_sprint, get_sprints};
pub use team::{ensure_team, ensure_team_with_members, invite};
