//! Static provisioning configuration.
//!
//! Everything the orchestrators need to know about the target deployment:
//! where the admin views live, which team administers rallies, who gets
//! invited by default, which templates seed wikis, and the sprint folder
//! layout. Loaded from a JSON file; the permission tiers are fixed.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::AccessLevel::{self, *};
use crate::models::{EntityId, FolderEntry, PostTemplate};

const CONFIG_FILE: &str = "config.json";

/// Grants for a team manager on the team resource itself.
pub const MANAGER_PERMISSIONS: &[AccessLevel] =
    &[SendMessage, Read, Update, TeamMembershipUpdate, Delete];

/// Grants for ordinary workspace members.
pub const DEFAULT_PERMISSIONS: &[AccessLevel] = &[Download, Read, Update, Create];

/// Grants for power users (members plus delete).
pub const POWER_USER_PERMISSIONS: &[AccessLevel] = &[Download, Read, Update, Create, Delete];

/// Read-only grants for data consumers.
pub const DATA_USER_PERMISSIONS: &[AccessLevel] = &[Download, Read];

/// Full administrative grants.
pub const ADMIN_PERMISSIONS: &[AccessLevel] = &[
    Download,
    ChangePermissions,
    ChangeSettings,
    Moderate,
    Read,
    Update,
    Delete,
    Create,
];

/// Deployment-specific provisioning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionConfig {
    /// Workspace consortium label, stamped into identity annotations.
    #[serde(default)]
    pub consortium: Option<String>,
    /// The admin project at the top of the workspace hierarchy.
    pub root_project_id: EntityId,
    /// Aggregation view listing all rally projects.
    pub rally_view_id: EntityId,
    /// Aggregation view listing all sprint projects.
    pub sprint_view_id: EntityId,
    /// File view aggregating every rally and sprint container.
    pub all_files_view_id: EntityId,
    /// Principal ID of the administrators' team.
    pub admin_team_id: String,
    #[serde(default = "default_admin_permissions")]
    pub admin_team_permissions: Vec<AccessLevel>,
    #[serde(default)]
    pub default_rally_members: Vec<String>,
    #[serde(default)]
    pub default_power_user_members: Vec<String>,
    #[serde(default)]
    pub default_data_members: Vec<String>,
    /// Template entity whose markdown seeds each rally wiki.
    pub rally_wiki_template_id: EntityId,
    /// Template entity whose markdown seeds each sprint wiki.
    pub sprint_wiki_template_id: EntityId,
    /// Folder tree to materialize inside each new sprint.
    #[serde(default = "default_sprint_folders")]
    pub sprint_folders: Vec<FolderEntry>,
    /// Discussion posts seeded into each new sprint's forum.
    #[serde(default = "default_posts")]
    pub posts: Vec<PostTemplate>,
}

fn default_admin_permissions() -> Vec<AccessLevel> {
    ADMIN_PERMISSIONS.to_vec()
}

fn default_sprint_folders() -> Vec<FolderEntry> {
    vec![
        FolderEntry::new(
            ".",
            &[
                "Timeline",
                "Results",
                "Research Questions",
                "Report Out",
                "Planning",
                "Data",
            ],
        ),
        FolderEntry::new("./Data", &["Auxiliary", "Documentation"]),
    ]
}

fn default_posts() -> Vec<PostTemplate> {
    vec![PostTemplate {
        title: "Daily Discussion".to_string(),
        message_markdown: concat!(
            "Use this post for a daily checkin. ",
            "Here is the template for the daily discussion thread:\n\n",
            "a) What did I accomplish yesterday?\n",
            "b) Any blockers limiting my ability to move forward?\n",
            "c) What will I do tomorrow?"
        )
        .to_string(),
    }]
}

impl ProvisionConfig {
    /// Load configuration from `path`, or from the default location in the
    /// user's config directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => default_config_path()?,
        };
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }
}

fn default_config_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "rallyman")
        .context("could not determine config directory")?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}
