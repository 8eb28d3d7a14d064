//! In-process gateway with the same observable semantics as the REST
//! implementation: conflicts on duplicate (parent, name) creation, not-found
//! as the absent signal, structural filter evaluation over view scopes.
//!
//! Counters expose how many objects were actually created and read so
//! idempotence can be asserted exactly.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::query::{QueryFilter, QueryResult};
use super::{GatewayError, PlatformGateway};
use crate::models::*;

#[derive(Default)]
struct Store {
    entities: BTreeMap<String, Entity>,
    /// (parent id or "", name) -> child id. The cooperative uniqueness index.
    children: BTreeMap<(String, String), EntityId>,
    entity_grants: BTreeMap<(String, String), Vec<AccessLevel>>,
    teams: BTreeMap<String, Team>,
    team_acls: BTreeMap<String, TeamAcl>,
    members: BTreeSet<(String, String)>,
    invitations: Vec<(String, String)>,
    wikis: BTreeMap<String, Wiki>,
    markdown_files: BTreeMap<String, String>,
    forums: BTreeMap<String, Forum>,
    threads: Vec<ThreadDraft>,
    next_entity: u64,
    next_team: u64,
    next_forum: u64,
    created_entities: usize,
    created_teams: usize,
    entity_reads: usize,
}

/// In-memory [`PlatformGateway`].
#[derive(Default)]
pub struct MemoryGateway {
    inner: Mutex<Store>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities actually created (conflicting attempts excluded).
    pub fn created_entities(&self) -> usize {
        self.lock().created_entities
    }

    /// Number of teams actually created.
    pub fn created_teams(&self) -> usize {
        self.lock().created_teams
    }

    /// Number of entity fetches served, for traversal-cost assertions.
    pub fn entity_reads(&self) -> usize {
        self.lock().entity_reads
    }

    pub fn thread_count(&self) -> usize {
        self.lock().threads.len()
    }

    pub fn threads(&self) -> Vec<ThreadDraft> {
        self.lock().threads.clone()
    }

    pub fn invitations(&self) -> Vec<(String, String)> {
        self.lock().invitations.clone()
    }

    pub fn is_member(&self, team_id: &str, principal_id: &str) -> bool {
        self.lock()
            .members
            .contains(&(team_id.to_string(), principal_id.to_string()))
    }

    /// The access levels granted to a principal on an entity, if any.
    pub fn grants_for(&self, entity_id: &EntityId, principal_id: &str) -> Option<Vec<AccessLevel>> {
        self.lock()
            .entity_grants
            .get(&(entity_id.as_str().to_string(), principal_id.to_string()))
            .cloned()
    }

    /// Store raw markdown for a template entity, so wiki instantiation can
    /// fetch it the way it would fetch a real template file.
    pub fn stash_markdown(&self, template_id: &EntityId, markdown: &str) {
        self.lock()
            .markdown_files
            .insert(template_id.as_str().to_string(), markdown.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.inner.lock().expect("gateway lock poisoned")
    }
}

fn parent_key(parent_id: Option<&EntityId>) -> String {
    parent_id.map(|p| p.as_str().to_string()).unwrap_or_default()
}

fn matches(entity: &Entity, filter: &QueryFilter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|(column, value)| entity.annotations.get(column) == Some(value))
}

#[async_trait]
impl PlatformGateway for MemoryGateway {
    async fn get_entity(&self, id: &EntityId) -> Result<Entity, GatewayError> {
        let mut store = self.lock();
        store.entity_reads += 1;
        store
            .entities
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("entity {id}")))
    }

    async fn create_entity(
        &self,
        draft: &EntityDraft,
        overwrite: bool,
    ) -> Result<Entity, GatewayError> {
        let mut store = self.lock();
        let key = (parent_key(draft.parent_id.as_ref()), draft.name.clone());

        if let Some(existing_id) = store.children.get(&key).cloned() {
            if !overwrite {
                return Err(GatewayError::Conflict(format!(
                    "an entity named {:?} already exists under {:?}",
                    draft.name, key.0
                )));
            }
            let now = Utc::now();
            let entity = store
                .entities
                .get_mut(existing_id.as_str())
                .expect("child index points at a stored entity");
            entity.annotations = draft.annotations.clone();
            entity.scope_ids = draft.scope_ids.clone();
            entity.column_ids = draft.column_ids.clone();
            entity.modified_at = now;
            return Ok(entity.clone());
        }

        store.next_entity += 1;
        let id = EntityId::new(format!("{ID_PREFIX}{}", 1000 + store.next_entity));
        let now = Utc::now();
        let entity = Entity {
            id: id.clone(),
            name: draft.name.clone(),
            parent_id: draft.parent_id.clone(),
            entity_type: draft.entity_type,
            annotations: draft.annotations.clone(),
            scope_ids: draft.scope_ids.clone(),
            column_ids: draft.column_ids.clone(),
            created_at: now,
            modified_at: now,
        };
        store.entities.insert(id.as_str().to_string(), entity.clone());
        store.children.insert(key, id);
        store.created_entities += 1;
        Ok(entity)
    }

    async fn update_entity(&self, entity: &Entity) -> Result<Entity, GatewayError> {
        let mut store = self.lock();
        let stored = store
            .entities
            .get_mut(entity.id.as_str())
            .ok_or_else(|| GatewayError::NotFound(format!("entity {}", entity.id)))?;
        let created_at = stored.created_at;
        *stored = entity.clone();
        stored.created_at = created_at;
        stored.modified_at = Utc::now();
        Ok(stored.clone())
    }

    async fn find_child(
        &self,
        parent_id: Option<&EntityId>,
        name: &str,
    ) -> Result<EntityId, GatewayError> {
        let store = self.lock();
        store
            .children
            .get(&(parent_key(parent_id), name.to_string()))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("no child named {name:?}")))
    }

    async fn set_permissions(
        &self,
        entity_id: &EntityId,
        principal_id: &str,
        access: &[AccessLevel],
    ) -> Result<(), GatewayError> {
        let mut store = self.lock();
        if !store.entities.contains_key(entity_id.as_str()) {
            return Err(GatewayError::NotFound(format!("entity {entity_id}")));
        }
        store.entity_grants.insert(
            (entity_id.as_str().to_string(), principal_id.to_string()),
            access.to_vec(),
        );
        Ok(())
    }

    async fn query(
        &self,
        view_id: &EntityId,
        filter: &QueryFilter,
    ) -> Result<QueryResult, GatewayError> {
        // Exercise the SQL rendering path so invalid filters fail here the
        // same way they would against the real platform.
        filter.to_sql(view_id)?;

        let store = self.lock();
        let view = store
            .entities
            .get(view_id.as_str())
            .ok_or_else(|| GatewayError::NotFound(format!("view {view_id}")))?;

        let mut ids = Vec::new();
        for raw in &view.scope_ids {
            let key = format!("{ID_PREFIX}{}", strip_id_prefix(raw));
            if let Some(entity) = store.entities.get(&key) {
                if matches(entity, filter) {
                    ids.push(entity.id.clone());
                }
            }
        }
        if let Some(limit) = filter.row_limit() {
            ids.truncate(limit as usize);
        }
        Ok(QueryResult { ids })
    }

    async fn get_team(&self, team_id: &str) -> Result<Team, GatewayError> {
        self.lock()
            .teams
            .get(team_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("team {team_id}")))
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Team, GatewayError> {
        self.lock()
            .teams
            .values()
            .find(|team| team.name == name)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("team named {name:?}")))
    }

    async fn create_team(&self, draft: &TeamDraft) -> Result<Team, GatewayError> {
        let mut store = self.lock();
        store.next_team += 1;
        let id = (3_000_000 + store.next_team).to_string();
        let team = Team {
            id: id.clone(),
            name: draft.name.clone(),
            can_public_join: draft.can_public_join,
        };
        store.teams.insert(id.clone(), team.clone());
        store.team_acls.insert(
            id.clone(),
            TeamAcl {
                id,
                resource_access: Vec::new(),
                etag: None,
            },
        );
        store.created_teams += 1;
        Ok(team)
    }

    async fn membership_status(
        &self,
        team_id: &str,
        principal_id: &str,
    ) -> Result<MembershipStatus, GatewayError> {
        let store = self.lock();
        if !store.teams.contains_key(team_id) {
            return Err(GatewayError::NotFound(format!("team {team_id}")));
        }
        Ok(MembershipStatus {
            team_id: team_id.to_string(),
            principal_id: principal_id.to_string(),
            is_member: store
                .members
                .contains(&(team_id.to_string(), principal_id.to_string())),
        })
    }

    async fn create_invitation(
        &self,
        team_id: &str,
        invitee_id: &str,
    ) -> Result<(), GatewayError> {
        let mut store = self.lock();
        if !store.teams.contains_key(team_id) {
            return Err(GatewayError::NotFound(format!("team {team_id}")));
        }
        store
            .invitations
            .push((team_id.to_string(), invitee_id.to_string()));
        // Invitations auto-accept; the fake keeps no pending state.
        store
            .members
            .insert((team_id.to_string(), invitee_id.to_string()));
        Ok(())
    }

    async fn get_team_acl(&self, team_id: &str) -> Result<TeamAcl, GatewayError> {
        self.lock()
            .team_acls
            .get(team_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("acl for team {team_id}")))
    }

    async fn put_team_acl(&self, acl: &TeamAcl) -> Result<TeamAcl, GatewayError> {
        let mut store = self.lock();
        if !store.team_acls.contains_key(&acl.id) {
            return Err(GatewayError::NotFound(format!("acl for team {}", acl.id)));
        }
        store.team_acls.insert(acl.id.clone(), acl.clone());
        Ok(acl.clone())
    }

    async fn get_wiki(&self, owner_id: &EntityId) -> Result<Wiki, GatewayError> {
        self.lock()
            .wikis
            .get(owner_id.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("wiki for {owner_id}")))
    }

    async fn get_wiki_markdown(&self, template_id: &EntityId) -> Result<String, GatewayError> {
        self.lock()
            .markdown_files
            .get(template_id.as_str())
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("markdown for {template_id}")))
    }

    async fn create_wiki(&self, draft: &WikiDraft) -> Result<Wiki, GatewayError> {
        let mut store = self.lock();
        let owner = draft.owner_id.as_str().to_string();
        if store.wikis.contains_key(&owner) {
            return Err(GatewayError::Conflict(format!(
                "{} already has a root wiki",
                draft.owner_id
            )));
        }
        let wiki = Wiki {
            id: format!("w{}", store.wikis.len() + 1),
            owner_id: draft.owner_id.clone(),
            title: draft.title.clone(),
            markdown: draft.markdown.clone(),
            parent_wiki_id: draft.parent_wiki_id.clone(),
        };
        store.wikis.insert(owner, wiki.clone());
        Ok(wiki)
    }

    async fn update_wiki(&self, wiki: &Wiki) -> Result<Wiki, GatewayError> {
        let mut store = self.lock();
        let owner = wiki.owner_id.as_str().to_string();
        if !store.wikis.contains_key(&owner) {
            return Err(GatewayError::NotFound(format!("wiki for {}", wiki.owner_id)));
        }
        store.wikis.insert(owner, wiki.clone());
        Ok(wiki.clone())
    }

    async fn get_forum(&self, project_id: &EntityId) -> Result<Forum, GatewayError> {
        let mut store = self.lock();
        if !store.entities.contains_key(project_id.as_str()) {
            return Err(GatewayError::NotFound(format!("project {project_id}")));
        }
        if let Some(forum) = store.forums.get(project_id.as_str()) {
            return Ok(forum.clone());
        }
        // The platform provisions a forum lazily with its project.
        store.next_forum += 1;
        let forum = Forum {
            id: format!("f{}", store.next_forum),
            project_id: project_id.clone(),
        };
        store
            .forums
            .insert(project_id.as_str().to_string(), forum.clone());
        Ok(forum)
    }

    async fn create_thread(&self, draft: &ThreadDraft) -> Result<(), GatewayError> {
        let mut store = self.lock();
        if !store.forums.values().any(|forum| forum.id == draft.forum_id) {
            return Err(GatewayError::NotFound(format!("forum {}", draft.forum_id)));
        }
        store.threads.push(draft.clone());
        Ok(())
    }
}
