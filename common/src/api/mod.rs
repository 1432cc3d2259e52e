//! Typed calls against the storefront's REST data service.

mod auth;
mod bets;
mod matches;
mod users;

#[cfg(test)]
pub(crate) mod fake;

use serde::de::DeserializeOwned;
use std::rc::Rc;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::network::{self, HttpTransport, Request, Response, Transport};
use crate::session::{KeyValueStore, AUTH_TOKEN_KEY};

pub const GENERIC_ERROR: &str = "Something went wrong. Try again later";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("a user with this email already exists")]
    EmailExists,

    #[error("invalid credentials")]
    AuthFailed,

    #[error("user not found")]
    UserNotFound,

    #[error("current password is incorrect")]
    WrongPassword,

    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    #[error("malformed json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::EmailExists => Some(409),
            ApiError::AuthFailed => Some(401),
            ApiError::UserNotFound => Some(404),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::EmailExists => "EMAIL_EXISTS",
            ApiError::AuthFailed => "AUTH_FAILED",
            ApiError::UserNotFound => "USER_NOT_FOUND",
            ApiError::WrongPassword => "WRONG_PASSWORD",
            ApiError::Status { .. } => "HTTP_ERROR",
            ApiError::Decode(_) => "BAD_RESPONSE",
            ApiError::Transport(_) => "NETWORK_ERROR",
        }
    }

    /// What a form shows for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::EmailExists => "A user with this email already exists",
            ApiError::AuthFailed => "Invalid email or password",
            ApiError::UserNotFound => "User not found",
            ApiError::WrongPassword => "Current password is incorrect",
            _ => GENERIC_ERROR,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub struct ApiClient<T = HttpTransport> {
    transport: T,
    config: ApiConfig,
    tokens: Option<Rc<dyn KeyValueStore>>,
}

impl ApiClient<HttpTransport> {
    pub fn connect(config: ApiConfig) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(&config)?;
        tracing::info!(base_url = %config.base_url, mock = config.use_mock, "api client ready");
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(transport: T, config: ApiConfig) -> Self {
        Self {
            transport,
            config,
            tokens: None,
        }
    }

    /// Where the bearer token is read from before each request to the real service.
    pub fn with_token_store(mut self, tokens: Rc<dyn KeyValueStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn send(&self, request: Request) -> ApiResult<Response> {
        if self.config.request_delay_ms > 0 {
            network::sleep(self.config.request_delay()).await;
        }
        let request = if self.config.use_mock {
            request
        } else {
            let token = self.tokens.as_ref().and_then(|tokens| tokens.get(AUTH_TOKEN_KEY));
            request.with_bearer(token)
        };

        let method = request.method.as_str();
        let path = request.path.clone();
        let response = self.transport.send(request).await.map_err(|err| {
            tracing::warn!("{method} {path} failed: {err:#}");
            ApiError::Transport(err)
        })?;
        tracing::debug!(status = response.status, "{method} {path}");
        Ok(response)
    }

    async fn fetch<R: DeserializeOwned>(&self, request: Request) -> ApiResult<R> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response.json()?)
    }
}
