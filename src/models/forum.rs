use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// The discussion forum attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forum {
    pub id: String,
    pub project_id: EntityId,
}

/// Input for creating a discussion thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadDraft {
    pub forum_id: String,
    pub title: String,
    pub message_markdown: String,
}

/// A configured seed post, instantiated into each new sprint's forum.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostTemplate {
    pub title: String,
    pub message_markdown: String,
}
