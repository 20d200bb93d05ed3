use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;
use vetanemia_core::{
    AiStats, DashboardSummary, LoginRequest, LoginResponse, NewCase, PredictionRequest,
    ProfileUpdate, ProfileUpdateResponse, RawCase, RawPrediction, RecentCase, ResultList,
    SessionUser, Suggestion, SuggestionRequest, SuggestionResponse,
};

use crate::error::{ClientError, Result};

/// Client for the prediction backend.
///
/// Endpoints under `/api/` and `/auth/me/`, `/auth/profile/` send the bearer
/// token set with [`with_token`](Self::with_token); calling them without one
/// fails with [`ClientError::Unauthenticated`] before any request is made.
#[derive(Debug, Clone)]
pub struct VetClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl VetClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url)?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Accept", "application/json")
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.token.as_deref().ok_or(ClientError::Unauthenticated)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let resp = req.send().await?;
        handle_response(resp).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!(path, "GET");
        self.send(self.authed(Method::GET, path)?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(path, "POST");
        self.send(self.authed(Method::POST, path)?.json(body)).await
    }

    /// `POST /auth/login/`, returning the issued token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self
            .send(self.request(Method::POST, "/auth/login/").json(&body))
            .await?;
        Ok(resp.token)
    }

    /// `GET /auth/me/` for an explicit token.
    pub async fn fetch_current_user(&self, token: &str) -> Result<SessionUser> {
        self.send(self.request(Method::GET, "/auth/me/").bearer_auth(token))
            .await
    }

    /// `PUT /auth/profile/`, returning the updated record.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<SessionUser> {
        tracing::debug!("PUT /auth/profile/");
        let resp: ProfileUpdateResponse = self
            .send(self.authed(Method::PUT, "/auth/profile/")?.json(update))
            .await?;
        Ok(resp.user)
    }

    /// `POST /api/predict/`. The backend accepts this without a token, so
    /// one is attached only when available.
    pub async fn predict(&self, request: &PredictionRequest) -> Result<RawPrediction> {
        let mut req = self.request(Method::POST, "/api/predict/").json(request);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        self.send(req).await
    }

    pub async fn suggestions(&self, request: &SuggestionRequest) -> Result<Vec<Suggestion>> {
        let resp: SuggestionResponse = self.post("/api/ai/suggestions/", request).await?;
        Ok(resp.suggestions)
    }

    pub async fn ai_stats(&self) -> Result<AiStats> {
        self.get("/api/ai/stats/").await
    }

    pub async fn cases(&self) -> Result<Vec<RawCase>> {
        let list: ResultList<RawCase> = self.get("/api/cases/").await?;
        Ok(list.results)
    }

    /// `POST /api/cases/create/`. The response body is passed through as-is.
    pub async fn create_case(&self, case: &NewCase) -> Result<Value> {
        self.post("/api/cases/create/", case).await
    }

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary> {
        self.get("/api/dashboard/summary/").await
    }

    pub async fn dashboard_recent(&self) -> Result<Vec<RecentCase>> {
        let list: ResultList<RecentCase> = self.get("/api/dashboard/recent/").await?;
        Ok(list.results)
    }
}

async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T> {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    if !status.is_success() {
        let detail = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("detail")?.as_str().map(str::to_string));
        tracing::debug!(status = status.as_u16(), ?detail, "backend returned an error");
        return Err(ClientError::Http {
            status: status.as_u16(),
            detail,
        });
    }

    if body.is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }

    Ok(serde_json::from_str(&body)?)
}
