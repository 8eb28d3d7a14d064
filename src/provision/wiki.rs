//! Wiki instantiation from remote templates.

use crate::gateway::{GatewayError, PlatformGateway};
use crate::models::{EntityId, WikiDraft};

use super::error::ProvisionError;

/// Create the owner's root wiki from a template, unless one already exists.
///
/// `fill` maps the raw template markdown to the instantiated page (token
/// substitution happens there, before anything is written).
pub(super) async fn ensure_wiki<F>(
    gateway: &dyn PlatformGateway,
    owner_id: &EntityId,
    title: &str,
    template_id: &EntityId,
    fill: F,
) -> Result<(), ProvisionError>
where
    F: FnOnce(&str) -> String,
{
    match gateway.get_wiki(owner_id).await {
        Ok(_) => {
            tracing::debug!(owner = %owner_id, "wiki already set");
            Ok(())
        }
        Err(GatewayError::NotFound(_)) => {
            let template = gateway.get_wiki_markdown(template_id).await?;
            gateway
                .create_wiki(&WikiDraft {
                    owner_id: owner_id.clone(),
                    title: title.to_string(),
                    markdown: fill(&template),
                    parent_wiki_id: None,
                })
                .await?;
            tracing::info!(owner = %owner_id, template = %template_id, "wiki set from template");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
