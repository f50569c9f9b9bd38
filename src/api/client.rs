use std::env;
use std::sync::{Arc, Mutex};

use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use super::error::{self, ApiError};
use super::ExpenseApi;
use crate::models::{
    Analytics, AuthResponse, CreateExpense, Expense, ExpenseFilters, LoginRequest,
    RegisterRequest, UpdateExpenseStatus, User,
};

/// Default base path, matching the local backend's dev setup.
const DEFAULT_BASE_URL: &str = "http://localhost:3001/api";

/// Env var overriding the backend base path.
pub const BASE_URL_ENV: &str = "OUTLAY_API_URL";

/// Shared bearer-token slot. The session store writes it on login/logout;
/// the HTTP client reads it when building each request. Token presence
/// here is the only thing that makes a request authenticated.
#[derive(Debug, Default)]
pub struct AuthToken {
    token: Mutex<Option<String>>,
}

impl AuthToken {
    pub fn set(&self, token: impl Into<String>) {
        *self.token.lock().unwrap() = Some(token.into());
    }

    pub fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }

    pub fn get(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }
}

/// reqwest-backed implementation of [`ExpenseApi`]: JSON bodies, bearer
/// auth when a token is present, every failure normalized to [`ApiError`].
pub struct HttpApi {
    client: Client,
    base_url: String,
    token: Arc<AuthToken>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, token: Arc<AuthToken>) -> Result<Self, ApiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Base URL from `OUTLAY_API_URL`, defaulting to the local backend.
    pub fn from_env(token: Arc<AuthToken>) -> Result<Self, ApiError> {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("request failed with status {}: {}", status, body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error::server_message(&body),
            });
        }
        Ok(response.json::<T>().await?)
    }
}

impl ExpenseApi for HttpApi {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.execute(self.client.post(self.url("/auth/login")).json(req))
            .await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.execute(self.client.post(self.url("/auth/register")).json(req))
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.execute(self.client.get(self.url("/auth/users"))).await
    }

    async fn list_expenses(&self, filters: &ExpenseFilters) -> Result<Vec<Expense>, ApiError> {
        self.execute(
            self.client
                .get(self.url("/expenses"))
                .query(&filters.to_query()),
        )
        .await
    }

    async fn get_expense(&self, id: Uuid) -> Result<Expense, ApiError> {
        self.execute(self.client.get(self.url(&format!("/expenses/{}", id))))
            .await
    }

    async fn create_expense(&self, req: &CreateExpense) -> Result<Expense, ApiError> {
        self.execute(self.client.post(self.url("/expenses")).json(req))
            .await
    }

    async fn update_expense_status(
        &self,
        id: Uuid,
        req: &UpdateExpenseStatus,
    ) -> Result<Expense, ApiError> {
        self.execute(
            self.client
                .patch(self.url(&format!("/expenses/{}/status", id)))
                .json(req),
        )
        .await
    }

    async fn pending_expenses(&self) -> Result<Vec<Expense>, ApiError> {
        self.execute(self.client.get(self.url("/expenses/pending")))
            .await
    }

    async fn analytics(&self) -> Result<Analytics, ApiError> {
        self.execute(self.client.get(self.url("/expenses/analytics")))
            .await
    }
}
