use serde::{Deserialize, Serialize};

/// A named group of individual accounts, the unit of access-control grants.
///
/// Teams live in their own store keyed by a numeric principal ID, separate
/// from the entity store. Name uniqueness is enforced by lookup-before-create
/// in the provisioner, not by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub can_public_join: bool,
}

/// Input for creating a new team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDraft {
    pub name: String,
    #[serde(default)]
    pub can_public_join: bool,
}

/// Whether a principal currently belongs to a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipStatus {
    pub team_id: String,
    pub principal_id: String,
    pub is_member: bool,
}

/// A single grant on a team's access-control list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAccess {
    pub principal_id: String,
    pub access_type: Vec<AccessLevel>,
}

/// A team's full access-control list.
///
/// The platform only supports whole-document replacement of this resource.
/// Callers must re-fetch immediately before mutating; a concurrent grant made
/// between the read and the write is silently clobbered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamAcl {
    pub id: String,
    pub resource_access: Vec<ResourceAccess>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

/// An individual access grant recognized by the platform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    Read,
    Download,
    Update,
    Create,
    Delete,
    ChangePermissions,
    ChangeSettings,
    Moderate,
    SendMessage,
    TeamMembershipUpdate,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Download => "DOWNLOAD",
            Self::Update => "UPDATE",
            Self::Create => "CREATE",
            Self::Delete => "DELETE",
            Self::ChangePermissions => "CHANGE_PERMISSIONS",
            Self::ChangeSettings => "CHANGE_SETTINGS",
            Self::Moderate => "MODERATE",
            Self::SendMessage => "SEND_MESSAGE",
            Self::TeamMembershipUpdate => "TEAM_MEMBERSHIP_UPDATE",
        }
    }
}
