use thiserror::Error;

use super::entity::{Entity, EntityId};

/// Annotation keys the provisioner treats as the de facto workspace index.
pub mod keys {
    /// Integer rally number on both rally and sprint projects.
    pub const RALLY: &str = "rally";
    /// Entity ID of the parent rally project, on sprint projects.
    pub const RALLY_ID: &str = "rallyId";
    /// Principal ID of the rally team.
    pub const RALLY_TEAM: &str = "rallyTeam";
    pub const RALLY_START: &str = "rallyStart";
    pub const RALLY_END: &str = "rallyEnd";
    /// Combined label like `"9A"`, on sprint projects.
    pub const SPRINT_NUMBER: &str = "sprintNumber";
    pub const SPRINT_LETTER: &str = "sprintLetter";
    pub const SPRINT_TITLE: &str = "sprintTitle";
    pub const SPRINT_START: &str = "sprintStart";
    pub const SPRINT_END: &str = "sprintEnd";
    pub const CONSORTIUM: &str = "consortium";
    /// Entity ID of an aggregation view listing a container's children.
    /// Any entity carrying this annotation is a traversable hierarchy node.
    pub const CHILDREN: &str = "children";
}

/// A required identity annotation was missing or malformed.
#[derive(Debug, Error)]
#[error("entity {id} is not a valid {kind} workspace: bad or missing `{key}` annotation")]
pub struct WorkspaceParseError {
    pub id: EntityId,
    pub kind: &'static str,
    pub key: &'static str,
}

/// A top-level recurring workspace, parsed from a project entity's identity
/// annotations.
#[derive(Debug, Clone)]
pub struct Rally {
    pub project: Entity,
    pub number: u32,
    /// Principal ID of the rally team, when the annotation is present.
    pub team_id: Option<String>,
}

impl Rally {
    pub fn from_entity(project: Entity) -> Result<Self, WorkspaceParseError> {
        let number = project
            .annotations
            .get(keys::RALLY)
            .and_then(|v| v.as_i64())
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| WorkspaceParseError {
                id: project.id.clone(),
                kind: "rally",
                key: keys::RALLY,
            })?;

        let team_id = project
            .annotations
            .get(keys::RALLY_TEAM)
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Self {
            project,
            number,
            team_id,
        })
    }

    pub fn id(&self) -> &EntityId {
        &self.project.id
    }
}

/// A time-boxed child workspace nested under a rally.
#[derive(Debug, Clone)]
pub struct Sprint {
    pub project: Entity,
    pub number: u32,
    pub letter: String,
    /// Combined label like `"9A"`.
    pub label: String,
    pub rally_id: EntityId,
    pub team_id: Option<String>,
}

impl Sprint {
    pub fn from_entity(project: Entity) -> Result<Self, WorkspaceParseError> {
        let bad = |key: &'static str| WorkspaceParseError {
            id: project.id.clone(),
            kind: "sprint",
            key,
        };

        let label = project
            .annotations
            .get(keys::SPRINT_NUMBER)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| bad(keys::SPRINT_NUMBER))?;

        let number = project
            .annotations
            .get(keys::RALLY)
            .and_then(|v| v.as_i64())
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| bad(keys::RALLY))?;

        let rally_id = project
            .annotations
            .get(keys::RALLY_ID)
            .and_then(|v| v.as_str())
            .map(EntityId::from)
            .ok_or_else(|| bad(keys::RALLY_ID))?;

        // The letter annotation is newer than the label; derive it when absent.
        let letter = project
            .annotations
            .get(keys::SPRINT_LETTER)
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| label.trim_start_matches(|c: char| c.is_ascii_digit()).to_string());

        let team_id = project
            .annotations
            .get(keys::RALLY_TEAM)
            .and_then(|v| v.as_str())
            .map(str::to_string);

        Ok(Self {
            project,
            number,
            letter,
            label,
            rally_id,
            team_id,
        })
    }

    pub fn id(&self) -> &EntityId {
        &self.project.id
    }
}
