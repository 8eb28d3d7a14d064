//! HTTP implementation of the platform gateway.
//!
//! Configuration is via explicit arguments or environment variables:
//! - `RALLYMAN_PLATFORM_URL` - Base URL (default: `http://localhost:9431/repo/v1`)
//! - `RALLYMAN_ACCESS_TOKEN` - Bearer token (optional against a local stack)

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::query::{QueryFilter, QueryResult};
use super::{GatewayError, PlatformGateway};
use crate::models::*;

/// Default URL for a local platform stack.
const DEFAULT_URL: &str = "http://localhost:9431/repo/v1";

/// reqwest-backed gateway against the platform's REST API.
#[derive(Debug, Clone)]
pub struct RestGateway {
    base_url: String,
    token: Option<String>,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ChildLookup<'a> {
    parent_id: Option<&'a EntityId>,
    entity_name: &'a str,
}

#[derive(Deserialize)]
struct ChildLookupResponse {
    id: EntityId,
}

#[derive(Serialize)]
struct TableQuery {
    sql: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionGrant<'a> {
    principal_id: &'a str,
    access_type: &'a [AccessLevel],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Invitation<'a> {
    team_id: &'a str,
    invitee_id: &'a str,
}

impl RestGateway {
    /// Create a gateway from environment variables.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("RALLYMAN_PLATFORM_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
        let token = std::env::var("RALLYMAN_ACCESS_TOKEN").ok();
        Self::new(base_url, token)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token,
            client: Client::new(),
        }
    }

    /// Build a request with optional auth header.
    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        req
    }

    fn error_for(status: StatusCode, body: String) -> GatewayError {
        match status {
            StatusCode::NOT_FOUND => GatewayError::NotFound(body),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => GatewayError::Conflict(body),
            _ => GatewayError::Api {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    /// Handle a response, converting HTTP errors to [`GatewayError`].
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, body))
        }
    }

    /// Handle a response that may return an empty body (204 No Content).
    async fn handle_empty_response(
        &self,
        response: reqwest::Response,
    ) -> Result<(), GatewayError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, body))
        }
    }
}

#[async_trait]
impl PlatformGateway for RestGateway {
    async fn get_entity(&self, id: &EntityId) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/entity/{id}"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_entity(
        &self,
        draft: &EntityDraft,
        overwrite: bool,
    ) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::POST, "/entity")
            .query(&[("overwrite", overwrite)])
            .json(draft)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn update_entity(&self, entity: &Entity) -> Result<Entity, GatewayError> {
        let response = self
            .request(Method::PUT, &format!("/entity/{}", entity.id))
            .json(entity)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn find_child(
        &self,
        parent_id: Option<&EntityId>,
        name: &str,
    ) -> Result<EntityId, GatewayError> {
        let response = self
            .request(Method::POST, "/entity/child")
            .json(&ChildLookup {
                parent_id,
                entity_name: name,
            })
            .send()
            .await?;
        let found: ChildLookupResponse = self.handle_response(response).await?;
        Ok(found.id)
    }

    async fn set_permissions(
        &self,
        entity_id: &EntityId,
        principal_id: &str,
        access: &[AccessLevel],
    ) -> Result<(), GatewayError> {
        let response = self
            .request(Method::PUT, &format!("/entity/{entity_id}/acl"))
            .json(&PermissionGrant {
                principal_id,
                access_type: access,
            })
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn query(
        &self,
        view_id: &EntityId,
        filter: &QueryFilter,
    ) -> Result<QueryResult, GatewayError> {
        let sql = filter.to_sql(view_id)?;
        let response = self
            .request(Method::POST, &format!("/entity/{view_id}/table/query"))
            .json(&TableQuery { sql })
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_team(&self, team_id: &str) -> Result<Team, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/team/{team_id}"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_team_by_name(&self, name: &str) -> Result<Team, GatewayError> {
        let response = self
            .request(Method::GET, "/team")
            .query(&[("name", name)])
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_team(&self, draft: &TeamDraft) -> Result<Team, GatewayError> {
        let response = self
            .request(Method::POST, "/team")
            .json(draft)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn membership_status(
        &self,
        team_id: &str,
        principal_id: &str,
    ) -> Result<MembershipStatus, GatewayError> {
        let response = self
            .request(
                Method::GET,
                &format!("/team/{team_id}/member/{principal_id}/membershipStatus"),
            )
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_invitation(
        &self,
        team_id: &str,
        invitee_id: &str,
    ) -> Result<(), GatewayError> {
        let response = self
            .request(Method::POST, "/membershipInvitation")
            .json(&Invitation {
                team_id,
                invitee_id,
            })
            .send()
            .await?;
        self.handle_empty_response(response).await
    }

    async fn get_team_acl(&self, team_id: &str) -> Result<TeamAcl, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/team/{team_id}/acl"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn put_team_acl(&self, acl: &TeamAcl) -> Result<TeamAcl, GatewayError> {
        let response = self
            .request(Method::PUT, "/team/acl")
            .json(acl)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_wiki(&self, owner_id: &EntityId) -> Result<Wiki, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/entity/{owner_id}/wiki"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_wiki_markdown(&self, template_id: &EntityId) -> Result<String, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/entity/{template_id}/file"))
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Self::error_for(status, body))
        }
    }

    async fn create_wiki(&self, draft: &WikiDraft) -> Result<Wiki, GatewayError> {
        let response = self
            .request(Method::POST, &format!("/entity/{}/wiki", draft.owner_id))
            .json(draft)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn update_wiki(&self, wiki: &Wiki) -> Result<Wiki, GatewayError> {
        let response = self
            .request(
                Method::PUT,
                &format!("/entity/{}/wiki/{}", wiki.owner_id, wiki.id),
            )
            .json(wiki)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn get_forum(&self, project_id: &EntityId) -> Result<Forum, GatewayError> {
        let response = self
            .request(Method::GET, &format!("/project/{project_id}/forum"))
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn create_thread(&self, draft: &ThreadDraft) -> Result<(), GatewayError> {
        let response = self
            .request(Method::POST, "/thread")
            .json(draft)
            .send()
            .await?;
        self.handle_empty_response(response).await
    }
}
