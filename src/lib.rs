//! Idempotent provisioning of rally and sprint workspaces on a hosted
//! collaboration platform.
//!
//! A *rally* is a top-level recurring workspace; a *sprint* is a time-boxed
//! child workspace nested under a rally. Provisioning one means creating a
//! whole constellation of remote objects (an access-control team, a project
//! with identity annotations, permission grants, a wiki instantiated from a
//! template, a folder tree, seeded discussion posts) and registering the new
//! container in the aggregation views that index the hierarchy.
//!
//! The remote platform offers only weak idempotency, so every step here is
//! written as find-or-create: a re-run after a partial failure converges to
//! the same end state without duplicating teams, projects, folders, or
//! view-scope entries.
//!
//! - [`gateway`]: the narrow interface to the remote platform (HTTP and
//!   in-memory implementations).
//! - [`models`]: wire and domain types (entities, teams, workspaces, specs).
//! - [`provision`]: the reconciliation core and the rally/sprint
//!   orchestrators.
//! - [`config`]: static provisioning configuration (view IDs, teams,
//!   templates, folder layout, seed posts).

pub mod config;
pub mod gateway;
pub mod models;
pub mod provision;
