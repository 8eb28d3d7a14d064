//! Sprint orchestration.
//!
//! A sprint requires its parent rally to exist already; it is never
//! auto-created here. Provisioning follows the rally sequence plus the
//! sprint-only steps: folder tree materialization, forum seeding, and
//! registration in both the sprint view and the all-files view.

use crate::config::{
    ProvisionConfig, DATA_USER_PERMISSIONS, DEFAULT_PERMISSIONS, POWER_USER_PERMISSIONS,
};
use crate::gateway::{PlatformGateway, QueryFilter};
use crate::models::{
    fill_sprint_template, keys, AccessLevel, AnnotationValue, Annotations, EntityDraft, EntityId,
    EntityType, Sprint, ThreadDraft, WorkspaceParseError,
};

use super::error::ProvisionError;
use super::rally::get_rally;
use super::{folders, locator, resolver, scope, team, wiki};

/// Fetch a sprint by rally number and letter from the admin sprint view.
pub async fn get_sprint(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    number: u32,
    letter: char,
) -> Result<Option<Sprint>, ProvisionError> {
    let label = format!("{number}{letter}");
    let filter = QueryFilter::new().eq(keys::SPRINT_NUMBER, label);
    match locator::find_unique(gateway, &config.sprint_view_id, &filter, "sprint project").await? {
        Some(entity) => Ok(Some(Sprint::from_entity(entity)?)),
        None => Ok(None),
    }
}

/// List sprints registered in the admin sprint view, optionally restricted
/// to one rally.
pub async fn get_sprints(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    rally_number: Option<u32>,
) -> Result<Vec<Sprint>, ProvisionError> {
    let result = gateway
        .query(&config.sprint_view_id, &QueryFilter::new())
        .await?;
    let mut sprints = Vec::new();
    for id in &result.ids {
        let sprint = Sprint::from_entity(gateway.get_entity(id).await?)?;
        if rally_number.map_or(true, |n| sprint.number == n) {
            sprints.push(sprint);
        }
    }
    Ok(sprints)
}

/// Create a sprint under an existing rally, or return it unchanged if it
/// already exists.
///
/// Fails with [`ProvisionError::MissingParent`] when the rally is absent.
/// Forum seeding is best-effort: a failed post is logged and skipped, and
/// the sprint creation still succeeds.
pub async fn create_sprint(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    number: u32,
    letter: char,
    title: Option<String>,
) -> Result<Sprint, ProvisionError> {
    let rally = get_rally(gateway, config, number)
        .await?
        .ok_or(ProvisionError::MissingParent { rally: number })?;

    let label = format!("{number}{letter}");
    if let Some(existing) = get_sprint(gateway, config, number, letter).await? {
        tracing::info!(sprint = %label, id = %existing.id(), "sprint already exists");
        return Ok(existing);
    }

    let rally_team_id = rally.team_id.clone().ok_or_else(|| WorkspaceParseError {
        id: rally.id().clone(),
        kind: "rally",
        key: keys::RALLY_TEAM,
    })?;
    let rally_team = gateway.get_team(&rally_team_id).await?;

    let title = title.unwrap_or_else(|| format!("Sprint {label}"));
    tracing::info!(sprint = %label, "creating a new sprint");

    let mut annotations = Annotations::new();
    annotations.insert(
        keys::SPRINT_TITLE.to_string(),
        AnnotationValue::from(title.clone()),
    );
    annotations.insert(
        keys::SPRINT_NUMBER.to_string(),
        AnnotationValue::from(label.clone()),
    );
    annotations.insert(
        keys::SPRINT_LETTER.to_string(),
        AnnotationValue::from(letter.to_string()),
    );
    annotations.insert(keys::RALLY.to_string(), AnnotationValue::from(number));
    annotations.insert(
        keys::RALLY_ID.to_string(),
        AnnotationValue::from(rally.id().as_str()),
    );
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
    tracing::info!(sprint = %label, id = %project.id, "sprint project ready");

    let prefix = format!("Sprint {label}");
    let sprint_team =
        team::ensure_team_with_members(gateway, &prefix, &config.default_rally_members).await?;
    let power_team = team::ensure_team_with_members(
        gateway,
        &format!("{prefix} Power Users"),
        &config.default_power_user_members,
    )
    .await?;
    let data_team = team::ensure_team_with_members(
        gateway,
        &format!("{prefix} Data Users"),
        &config.default_data_members,
    )
    .await?;

    let grants: [(&str, &[AccessLevel]); 4] = [
        (sprint_team.id.as_str(), DEFAULT_PERMISSIONS),
        (power_team.id.as_str(), POWER_USER_PERMISSIONS),
        (data_team.id.as_str(), DATA_USER_PERMISSIONS),
        (
            config.admin_team_id.as_str(),
            config.admin_team_permissions.as_slice(),
        ),
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
        &config.sprint_wiki_template_id,
        |template| fill_sprint_template(template, &rally_team.id, &sprint_team.id),
    )
    .await?;

    let tree = folders::materialize(gateway, &project.id, &config.sprint_folders).await?;
    tracing::info!(sprint = %label, folders = tree.len() - 1, "materialized sprint folder tree");

    seed_forum(gateway, config, &project.id, &sprint_team.name).await?;

    scope::merge_scope(
        gateway,
        &config.sprint_view_id,
        std::slice::from_ref(&project.id),
    )
    .await?;
    scope::merge_scope(
        gateway,
        &config.all_files_view_id,
        &[rally.id().clone(), project.id.clone()],
    )
    .await?;
    scope::touch_view(gateway, &config.sprint_view_id).await?;
    scope::touch_view(gateway, &config.all_files_view_id).await?;
    tracing::info!(sprint = %label, "registered sprint in the admin views");

    Ok(Sprint::from_entity(gateway.get_entity(&project.id).await?)?)
}

/// Seed the configured discussion posts into a new sprint's forum.
async fn seed_forum(
    gateway: &dyn PlatformGateway,
    config: &ProvisionConfig,
    project_id: &EntityId,
    team_name: &str,
) -> Result<(), ProvisionError> {
    let forum = gateway.get_forum(project_id).await?;
    for post in &config.posts {
        let draft = ThreadDraft {
            forum_id: forum.id.clone(),
            title: post.title.clone(),
            message_markdown: format!(
                "{}\n\nDon't forget to tag `@{team_name}` in your posts!",
                post.message_markdown
            ),
        };
        if let Err(err) = gateway.create_thread(&draft).await {
            tracing::error!(title = %post.title, error = %err, "failed to seed discussion post");
        }
    }
    Ok(())
}
