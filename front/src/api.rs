use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    RequestBuilder, Response,
};
use serde::{de::DeserializeOwned, Serialize};
use todoman_api::v1::{
    routes, AuthResponse, ErrorBody, FederatedLoginRequest, LoginRequest, NewTask,
    RegisterRequest, Task, TaskPatch,
};

use crate::ApiError;

/// Client for the todo backend.
///
/// Once a token is known it is attached to every request through the
/// client's default headers.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    authorized: bool,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();

        Self {
            http: reqwest::Client::new(),
            base_url,
            authorized: false,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    pub fn authorize(&mut self, token: &str) -> Result<(), ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::InvalidToken)?;
        value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, value);

        self.http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        self.authorized = true;

        Ok(())
    }

    pub fn deauthorize(&mut self) {
        self.http = reqwest::Client::new();
        self.authorized = false;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post(routes::LOGIN, request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post(routes::REGISTER, request).await
    }

    pub async fn login_federated(
        &self,
        request: &FederatedLoginRequest,
    ) -> Result<AuthResponse, ApiError> {
        self.post(routes::GOOGLE, request).await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ApiError> {
        let request = self.http.get(self.url(routes::TODOS));
        json(send(request).await?).await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<Task, ApiError> {
        self.post(routes::TODOS, task).await
    }

    pub async fn update_task(&self, id: &str, patch: &TaskPatch) -> Result<Task, ApiError> {
        let request = self.http.patch(self.url(&routes::todo(id))).json(patch);
        json(send(request).await?).await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let request = self.http.delete(self.url(&routes::todo(id)));
        send(request).await?;

        Ok(())
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.post(self.url(path)).json(body);
        json(send(request).await?).await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => Some(body.detail),
        Err(_) => None,
    };

    Err(ApiError::Status { status, detail })
}

async fn json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    Ok(response.json().await?)
}
