/**
 * REST API Client
 *
 * Typed wrapper over the `/api/auth` and `/api/tasks` routes. `register` and
 * `login` store the returned token; every protected call sends it as
 * `Authorization: Bearer <token>`.
 *
 * Failed calls carry the server's `{error}` message in `ClientError::Api`.
 */
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::client::config::ClientConfig;
use crate::client::error::ClientError;
use crate::shared::auth::{
    AuthResponse, ErrorBody, LoginRequest, MessageResponse, RegisterRequest, VerifyResponse,
};
use crate::shared::task::{NewTask, Task, TaskUpdate};

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    client: Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn token(&self) -> Option<&str> {
        self.config.token()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.config.set_token(token);
    }

    pub fn logout(&mut self) {
        self.config.clear_token();
    }

    pub async fn register(
        &mut self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, ClientError> {
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        let response: AuthResponse = self
            .send(self.client.post(self.config.api_url("/api/auth/register")).json(&request))
            .await?;
        self.config.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: AuthResponse = self
            .send(self.client.post(self.config.api_url("/api/auth/login")).json(&request))
            .await?;
        self.config.set_token(Some(response.token.clone()));
        Ok(response)
    }

    pub async fn verify(&self) -> Result<VerifyResponse, ClientError> {
        let request = self.authorized(self.client.get(self.config.api_url("/api/auth/verify")))?;
        self.send(request).await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let request = self.authorized(self.client.get(self.config.api_url("/api/tasks")))?;
        self.send(request).await
    }

    pub async fn get_task(&self, id: i64) -> Result<Task, ClientError> {
        let request = self.authorized(self.client.get(self.task_url(id)))?;
        self.send(request).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        let request =
            self.authorized(self.client.post(self.config.api_url("/api/tasks")).json(task))?;
        self.send(request).await
    }

    pub async fn update_task(&self, id: i64, changes: &TaskUpdate) -> Result<Task, ClientError> {
        let request = self.authorized(self.client.put(self.task_url(id)).json(changes))?;
        self.send(request).await
    }

    pub async fn delete_task(&self, id: i64) -> Result<MessageResponse, ClientError> {
        let request = self.authorized(self.client.delete(self.task_url(id)))?;
        self.send(request).await
    }

    fn task_url(&self, id: i64) -> String {
        self.config.api_url(&format!("/api/tasks/{id}"))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.config.token().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        return Err(ClientError::Api {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}
