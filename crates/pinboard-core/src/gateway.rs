//! Remote gateway: thin request/response mapping to the Pinboard API.
//!
//! Used only while the availability probe reports the remote service
//! reachable. Authorization decisions on this path belong to the server;
//! the gateway's job is faithful status mapping.

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::normalize_api_url;
use crate::error::{Error, Result};
use crate::models::{AuthContext, Notification, Pin, User};
use crate::util::compact_text;

/// Successful auth response from the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

/// An image payload for pin creation.
///
/// Remote mode ships it as a multipart part; local mode embeds the bytes
/// as a data URL.
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadImage {
    /// Wrap in-memory bytes, guessing the content type from the file name.
    #[must_use]
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an image file from disk. This is the only suspension point on
    /// the local create path.
    pub async fn read(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self::from_bytes(file_name, bytes))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// HTTP client for the remote Pinboard API.
#[derive(Debug, Clone)]
pub struct RemoteGateway {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteGateway {
    /// Build a gateway for the given API base URL.
    pub fn new(api_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_api_url(api_url.as_ref())?,
            client: reqwest::Client::builder().build()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let payload = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/auth/register", self.base_url))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::BAD_REQUEST => Err(Error::DuplicateEmail),
            status => Err(api_error(status, response).await),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(Error::InvalidCredentials),
            status => Err(api_error(status, response).await),
        }
    }

    pub async fn list_pins(&self) -> Result<Vec<Pin>> {
        let response = self
            .client
            .get(format!("{}/pins", self.base_url))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            status => Err(api_error(status, response).await),
        }
    }

    /// Create a pin from a multipart payload carrying title, image bytes,
    /// and author, with the acting user's identity as trust headers.
    pub async fn create_pin(&self, title: &str, image: UploadImage, ctx: &AuthContext) -> Result<Pin> {
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .text("title", title.to_string())
            .text("author", ctx.username.clone())
            .part("image", part);

        let response = self
            .identity_headers(self.client.post(format!("{}/pins", self.base_url)), ctx)
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            status => Err(api_error(status, response).await),
        }
    }

    pub async fn update_pin(&self, pin_id: &str, title: &str, ctx: &AuthContext) -> Result<Pin> {
        let response = self
            .identity_headers(
                self.client
                    .put(format!("{}/pins/{pin_id}", self.base_url))
                    .json(&serde_json::json!({ "title": title })),
                ctx,
            )
            .send()
            .await?;

        self.pin_response(response, pin_id).await
    }

    pub async fn delete_pin(&self, pin_id: &str, ctx: &AuthContext) -> Result<()> {
        let response = self
            .identity_headers(
                self.client.delete(format!("{}/pins/{pin_id}", self.base_url)),
                ctx,
            )
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::FORBIDDEN => Err(Error::Unauthorized),
            StatusCode::NOT_FOUND => Err(Error::NotFound(pin_id.to_string())),
            status => Err(api_error(status, response).await),
        }
    }

    pub async fn toggle_like(&self, pin_id: &str, ctx: &AuthContext) -> Result<Pin> {
        let response = self
            .identity_headers(
                self.client
                    .post(format!("{}/pins/{pin_id}/like", self.base_url)),
                ctx,
            )
            .header("x-user-name", &ctx.username)
            .send()
            .await?;

        self.pin_response(response, pin_id).await
    }

    pub async fn notifications(&self, ctx: &AuthContext) -> Result<Vec<Notification>> {
        let response = self
            .client
            .get(format!("{}/notifications", self.base_url))
            .header("x-user-id", &ctx.user_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status => Err(api_error(status, response).await),
        }
    }

    pub async fn mark_notifications_read(&self, ctx: &AuthContext) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/notifications/mark-read", self.base_url))
            .header("x-user-id", &ctx.user_id)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized),
            status => Err(api_error(status, response).await),
        }
    }

    fn identity_headers(
        &self,
        request: reqwest::RequestBuilder,
        ctx: &AuthContext,
    ) -> reqwest::RequestBuilder {
        request
            .header("x-user-id", &ctx.user_id)
            .header("x-user-role", ctx.role.as_str())
    }

    async fn pin_response(&self, response: reqwest::Response, pin_id: &str) -> Result<Pin> {
        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::Unauthorized),
            StatusCode::NOT_FOUND => Err(Error::NotFound(pin_id.to_string())),
            status => Err(api_error(status, response).await),
        }
    }
}

async fn api_error(status: StatusCode, response: reqwest::Response) -> Error {
    let body = response.text().await.unwrap_or_default();
    Error::Api(parse_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact_text(trimmed), status.as_u16())
    }
}
