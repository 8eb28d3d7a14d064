//! Idempotent team provisioning and invitations.

use crate::config::MANAGER_PERMISSIONS;
use crate::gateway::{GatewayError, PlatformGateway};
use crate::models::{ResourceAccess, Team, TeamDraft};

use super::error::ProvisionError;

/// Fetch a team by name, creating it if absent.
///
/// Team creation is not idempotent at the platform level, so the lookup
/// failure is treated as the normal "not found" signal rather than an error.
/// New teams are created with public join disabled.
pub async fn ensure_team(
    gateway: &dyn PlatformGateway,
    name: &str,
) -> Result<Team, ProvisionError> {
    match gateway.get_team_by_name(name).await {
        Ok(team) => Ok(team),
        Err(GatewayError::NotFound(_)) => {
            tracing::info!(team = name, "team not found, creating it");
            let team = gateway
                .create_team(&TeamDraft {
                    name: name.to_string(),
                    can_public_join: false,
                })
                .await?;
            Ok(team)
        }
        Err(err) => Err(err.into()),
    }
}

/// Invite an individual into a team, no-op if already a member.
///
/// With `as_manager`, the team's ACL is re-fetched, a manager-level grant is
/// appended, and the whole document is written back. The replace is not a
/// patch: a grant made between the fetch and the write is clobbered.
pub async fn invite(
    gateway: &dyn PlatformGateway,
    team_id: &str,
    principal_id: &str,
    as_manager: bool,
) -> Result<(), ProvisionError> {
    let status = gateway.membership_status(team_id, principal_id).await?;
    if status.is_member {
        tracing::debug!(team = team_id, principal = principal_id, "already a member");
        return Ok(());
    }

    gateway.create_invitation(team_id, principal_id).await?;

    if as_manager {
        let mut acl = gateway.get_team_acl(team_id).await?;
        acl.resource_access.push(ResourceAccess {
            principal_id: principal_id.to_string(),
            access_type: MANAGER_PERMISSIONS.to_vec(),
        });
        gateway.put_team_acl(&acl).await?;
    }

    Ok(())
}

/// Ensure a team exists and its default members are invited as managers.
pub async fn ensure_team_with_members(
    gateway: &dyn PlatformGateway,
    name: &str,
    members: &[String],
) -> Result<Team, ProvisionError> {
    let team = ensure_team(gateway, name).await?;
    for principal_id in members {
        invite(gateway, &team.id, principal_id, true).await?;
    }
    tracing::debug!(team = name, invited = members.len(), "team ready");
    Ok(team)
}
