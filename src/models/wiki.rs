use serde::{Deserialize, Serialize};

use super::entity::EntityId;

/// A wiki page attached to an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wiki {
    pub id: String,
    pub owner_id: EntityId,
    #[serde(default)]
    pub title: String,
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_wiki_id: Option<String>,
}

/// Input for creating a wiki page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiDraft {
    pub owner_id: EntityId,
    pub title: String,
    pub markdown: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_wiki_id: Option<String>,
}

/// Placeholder tokens expected in the remote wiki templates.
///
/// Templates link to the workspace teams and number; the orchestrators swap
/// these tokens for the real IDs at instantiation time.
pub const RALLY_NUMBER_TOKEN: &str = "RALLY_NUMBER";
pub const RALLY_TEAM_TOKEN: &str = "RALLY_TEAM_ID";
pub const SPRINT_TEAM_TOKEN: &str = "SPRINT_TEAM_ID";

/// Instantiate a rally wiki template.
pub fn fill_rally_template(markdown: &str, rally_number: u32, rally_team_id: &str) -> String {
    markdown
        .replace(RALLY_NUMBER_TOKEN, &rally_number.to_string())
        .replace(RALLY_TEAM_TOKEN, rally_team_id)
}

/// Instantiate a sprint wiki template.
pub fn fill_sprint_template(markdown: &str, rally_team_id: &str, sprint_team_id: &str) -> String {
    markdown
        .replace(RALLY_TEAM_TOKEN, rally_team_id)
        .replace(SPRINT_TEAM_TOKEN, sprint_team_id)
}
