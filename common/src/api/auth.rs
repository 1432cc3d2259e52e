use chrono::Utc;

use super::{ApiClient, ApiError, ApiResult};
use crate::network::{Request, Transport};
use crate::{LoginRequest, NewUser, RegisterRequest, UserData};

impl<T: Transport> ApiClient<T> {
    /// Whether some account already uses `email`. Lookup failures count as "no".
    pub async fn email_exists(&self, email: &str) -> bool {
        let request = Request::get("users").with_query("email", email);
        match self.fetch::<Vec<serde_json::Value>>(request).await {
            Ok(users) => !users.is_empty(),
            Err(err) => {
                tracing::warn!("error checking email: {err}");
                false
            }
        }
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<UserData> {
        if self.email_exists(&request.email).await {
            return Err(ApiError::EmailExists);
        }
        let user = NewUser::register(request, Utc::now());
        let created = self
            .fetch(Request::post("users", serde_json::to_value(&user)?))
            .await?;
        tracing::info!(login = %request.login, "registered new user");
        Ok(created)
    }

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<UserData> {
        let lookup = Request::get("users")
            .with_query("email", request.email.as_str())
            .with_query("password", request.password.as_str());
        let users: Vec<UserData> = self.fetch(lookup).await?;
        users.into_iter().next().ok_or(ApiError::AuthFailed)
    }
}
