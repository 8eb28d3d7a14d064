//! Rally orchestration.
//!
//! A rally is provisioned in a fixed order, every step individually
//! idempotent: team, project, permission grants, wiki, view registration.
//! A re-run after a partial failure skips what already exists and finishes
//! the rest.

use crate::config::{ProvisionConfig, DEFAULT_PERMISSIONS, POWER_USER_PERMISSIONS};
use crate::gateway::{PlatformGateway, QueryFilter};
use crate::models::{
    fill_rally_template, keys, AccessLevel, AnnotationValue, Annotations, EntityDraft, EntityType,
    Rally,
};

use super::error::ProvisionError;
use super::{locator, resolver, scope, team, wiki};

/// Fetch a rally by number from the admin rally view.
///
/// Two matches for one number means the identity index is corrupt; that is
/// fatal, not auto-resolved.
pub async fn get_rally(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    number: u32,
) -> Result<Option<Rally>, ProvisionError> {
    let filter = QueryFilter::new().eq(keys::RALLY, number);
    match locator::find_unique(gateway, &config.rally_view_id, &filter, "rally project").await? {
        Some(entity) => Ok(Some(Rally::from_entity(entity)?)),
        None => Ok(None),
    }
}

/// List every rally registered in the admin rally view.
pub async fn get_rallies(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
) -> Result<Vec<Rally>, ProvisionError> {
    let result = gateway
        .query(&config.rally_view_id, &QueryFilter::new())
        .await?;
    let mut rallies = Vec::with_capacity(result.ids.len());
    for id in &result.ids {
        rallies.push(Rally::from_entity(gateway.get_entity(id).await?)?);
    }
    Ok(rallies)
}

/// Create a rally, or return it unchanged if it already exists.
pub async fn create_rally(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    number: u32,
    title: Option<String>,
) -> Result<Rally, ProvisionError> {
    if let Some(existing) = get_rally(gateway, config, number).await? {
        tracing::info!(rally = number, id = %existing.id(), "rally already exists");
        return Ok(existing);
    }

    let title = title.unwrap_or_else(|| format!("Rally {number}"));
    let team_name = format!("Rally {number}");

    let rally_team =
        team::ensure_team_with_members(gateway, &team_name, &config.default_rally_members).await?;
    let power_team = team::ensure_team_with_members(
        gateway,
        &format!("{team_name} Power Users"),
        &config.default_power_user_members,
    )
    .await?;

    let mut annotations = Annotations::new();
    annotations.insert(keys::RALLY.to_string(), AnnotationValue::from(number));
    annotations.insert(
        keys::RALLY_TEAM.to_string(),
        AnnotationValue::from(rally_team.id.clone()),
    );
    if let Some(consortium) = &config.consortium {
        annotations.insert(
            keys::CONSORTIUM.to_string(),
            AnnotationValue::from(consortium.clone()),
        );
    }

    let project = resolver::find_or_create(
        gateway,
        &EntityDraft::new(&title, EntityType::Project).with_annotations(annotations),
    )
    .await?;
    tracing::info!(rally = number, id = %project.id, "rally project ready");

    let grants: [(&str, &[AccessLevel]); 3] = [
        (
            config.admin_team_id.as_str(),
            config.admin_team_permissions.as_slice(),
        ),
        (rally_team.id.as_str(), DEFAULT_PERMISSIONS),
        (power_team.id.as_str(), POWER_USER_PERMISSIONS),
    ];
    for (principal, access) in grants {
        gateway
            .set_permissions(&project.id, principal, access)
            .await
            .map_err(|source| ProvisionError::Permission {
                principal: principal.to_string(),
                source,
            })?;
    }

    wiki::ensure_wiki(
        gateway,
        &project.id,
        &title,
        &config.rally_wiki_template_id,
        |template| fill_rally_template(template, number, &rally_team.id),
    )
    .await?;

    scope::merge_scope(
        gateway,
        &config.rally_view_id,
        std::slice::from_ref(&project.id),
    )
    .await?;
    scope::touch_view(gateway, &config.rally_view_id).await?;
    tracing::info!(rally = number, "registered rally in the admin view");

    Ok(Rally::from_entity(gateway.get_entity(&project.id).await?)?)
}
