use serde_json::{json, Value};

use super::{ApiClient, ApiError, ApiResult};
use crate::network::{Request, Transport};
use crate::UserData;

impl<T: Transport> ApiClient<T> {
    async fn user_record(&self, user_id: &str) -> ApiResult<Value> {
        let response = self.send(Request::get(format!("users/{user_id}"))).await?;
        if response.status == 404 {
            return Err(ApiError::UserNotFound);
        }
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
                body: response.body,
            });
        }
        match response.json::<Value>()? {
            Value::Object(record) if !record.is_empty() => Ok(Value::Object(record)),
            _ => Err(ApiError::UserNotFound),
        }
    }

    async fn patch_user(&self, user_id: &str, changes: Value) -> ApiResult<UserData> {
        self.fetch(Request::patch(format!("users/{user_id}"), changes))
            .await
    }

    pub async fn get_user(&self, user_id: &str) -> ApiResult<UserData> {
        Ok(serde_json::from_value(self.user_record(user_id).await?)?)
    }

    /// Adds `amount` (negative to withdraw) to the balance the service holds now.
    pub async fn update_balance(&self, user_id: &str, amount: f64) -> ApiResult<UserData> {
        let user = self.get_user(user_id).await?;
        let balance = user.balance + amount;
        tracing::info!(user = user_id, amount, balance, "updating balance");
        self.patch_user(user_id, json!({ "balance": balance })).await
    }

    pub async fn update_login(&self, user_id: &str, login: &str) -> ApiResult<UserData> {
        self.patch_user(user_id, json!({ "login": login })).await
    }

    /// Changes the email unless another account already holds it.
    pub async fn update_email(&self, user_id: &str, email: &str) -> ApiResult<UserData> {
        let holders: Vec<UserData> = self
            .fetch(Request::get("users").with_query("email", email))
            .await?;
        if holders.iter().any(|holder| holder.id != user_id) {
            return Err(ApiError::EmailExists);
        }
        self.patch_user(user_id, json!({ "email": email })).await
    }

    pub async fn update_password(
        &self,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> ApiResult<UserData> {
        let record = self.user_record(user_id).await?;
        if record.get("password").and_then(Value::as_str) != Some(current_password) {
            return Err(ApiError::WrongPassword);
        }
        self.patch_user(user_id, json!({ "password": new_password }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fake::FakeBackend;
    use super::*;
    use crate::config::ApiConfig;

    fn client() -> ApiClient<FakeBackend> {
        let backend = FakeBackend::new();
        for (id, email) in [("u1", "one@example.com"), ("u2", "two@example.com")] {
            backend.seed(
                "users",
                json!({
                    "id": id,
                    "login": id,
                    "email": email,
                    "password": "hunter22",
                    "balance": 1000,
                    "role": "USER",
                    "status": "ACTIVE"
                }),
            );
        }
        ApiClient::with_transport(backend, ApiConfig::real("/api"))
    }

    #[tokio::test]
    async fn missing_users_are_not_found() {
        let err = client().get_user("nobody").await.unwrap_err();
        assert!(matches!(err, ApiError::UserNotFound));
    }

    #[tokio::test]
    async fn balance_updates_build_on_the_stored_value() {
        let client = client();
        let user = client.update_balance("u1", 250.0).await.unwrap();
        assert_eq!(user.balance, 1250.0);
        let user = client.update_balance("u1", -1000.0).await.unwrap();
        assert_eq!(user.balance, 250.0);

        let patches: Vec<_> = client
            .transport()
            .requests()
            .into_iter()
            .filter_map(|request| request.body)
            .collect();
        assert_eq!(patches, vec![json!({ "balance": 1250.0 }), json!({ "balance": 250.0 })]);
    }

    #[tokio::test]
    async fn email_must_stay_unique_across_accounts() {
        let client = client();
        let err = client.update_email("u1", "two@example.com").await.unwrap_err();
        assert!(matches!(err, ApiError::EmailExists));

        let same = client.update_email("u1", "one@example.com").await.unwrap();
        assert_eq!(same.email, "one@example.com");
        let moved = client.update_email("u1", "uno@example.com").await.unwrap();
        assert_eq!(moved.email, "uno@example.com");
    }

    #[tokio::test]
    async fn password_change_checks_the_current_password() {
        let client = client();
        let err = client
            .update_password("u2", "guess", "newsecret")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::WrongPassword));

        client
            .update_password("u2", "hunter22", "newsecret")
            .await
            .unwrap();
        assert_eq!(client.transport().records("users")[1]["password"], "newsecret");
    }

    #[tokio::test]
    async fn login_changes_are_patched() {
        let user = client().update_login("u2", "renamed").await.unwrap();
        assert_eq!(user.login, "renamed");
    }
}
