use crate::core::errors::ApiError;
use crate::core::kernel::envelope;
use crate::core::kernel::token::TokenStore;
use async_trait::async_trait;
use reqwest::{header, multipart, Client, Method, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, trace};

/// REST client trait for making HTTP requests against the backend.
///
/// This trait provides a unified interface for HTTP operations so that the
/// typed client modules stay generic over the transport. Every response is
/// pushed through the envelope normalizer; the returned value is always the
/// canonical payload, never a wire wrapper.
///
/// `authenticated` controls whether the stored session token is attached as
/// a Bearer credential. The token is attached when present; operations that
/// must not carry one (login, registration, public info) pass `false`.
#[async_trait]
pub trait RestClient: Send + Sync {
    /// Make a GET request
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Make a GET request with strongly-typed response
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<T, ApiError>;

    /// Make a POST request with a JSON body (`Value::Null` sends no body)
    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Make a POST request with strongly-typed response
    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ApiError>;

    /// Make a PUT request with a JSON body (`Value::Null` sends no body)
    async fn put(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Make a PUT request with strongly-typed response
    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ApiError>;

    /// Make a PATCH request with a JSON body
    async fn patch(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Make a DELETE request
    async fn delete(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Make a POST request with URL-encoded form fields (OAuth2-style login)
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError>;

    /// Upload a file as a multipart form with a single `file` field.
    ///
    /// The multipart boundary content type is supplied by the HTTP client;
    /// no JSON content type is forced here.
    async fn post_multipart(
        &self,
        endpoint: &str,
        file_name: &str,
        bytes: Vec<u8>,
        authenticated: bool,
    ) -> Result<Value, ApiError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the backend
    pub base_url: String,
    /// Service name for logging and tracing
    pub service_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, service_name: String) -> Self {
        Self {
            base_url,
            service_name,
            timeout_seconds: 30,
            user_agent: "tradebridge/0.1".to_string(),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Set the user agent string
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }
}

/// Builder for creating REST client instances
pub struct RestClientBuilder {
    config: RestClientConfig,
    tokens: Option<Arc<TokenStore>>,
}

impl RestClientBuilder {
    pub fn new(config: RestClientConfig) -> Self {
        Self {
            config,
            tokens: None,
        }
    }

    /// Set the token store used for Bearer authentication
    pub fn with_token_store(mut self, tokens: Arc<TokenStore>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Build the REST client
    pub fn build(self) -> Result<ReqwestRest, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(self.config.timeout_seconds))
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ApiError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ReqwestRest {
            client,
            config: self.config,
            tokens: self
                .tokens
                .unwrap_or_else(|| Arc::new(TokenStore::from_cache_path(None))),
        })
    }
}

/// Implementation of `RestClient` using reqwest
#[derive(Clone)]
pub struct ReqwestRest {
    client: Client,
    config: RestClientConfig,
    tokens: Arc<TokenStore>,
}

impl std::fmt::Debug for ReqwestRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestRest")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ReqwestRest {
    /// Token store backing this client's Bearer authentication.
    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Build the full URL for an endpoint
    fn build_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.config.base_url, endpoint)
    }

    fn attach_auth(&self, request: reqwest::RequestBuilder, authenticated: bool) -> reqwest::RequestBuilder {
        if !authenticated {
            return request;
        }
        match self.tokens.get() {
            Some(token) => request.header(header::AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Handle the response and extract the canonical payload
    #[instrument(skip(self, response), fields(service = %self.config.service_name, status = %response.status()))]
    async fn handle_response(&self, response: Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        let response_text = response.text().await?;

        trace!("Response body: {}", response_text);

        envelope::normalize(&response_text, status)
    }

    /// Make a request with the given parameters
    #[instrument(skip(self, body), fields(service = %self.config.service_name, method = %method, endpoint = %endpoint))]
    async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        query_params: &[(&str, &str)],
        body: Option<&Value>,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.request(method, &url);

        for (key, value) in query_params {
            request = request.query(&[(key, value)]);
        }

        request = self.attach_auth(request, authenticated);

        if let Some(body) = body {
            if !body.is_null() {
                request = request.json(body);
            }
        }

        let response = request.send().await?;

        self.handle_response(response).await
    }
}

#[async_trait]
impl RestClient for ReqwestRest {
    async fn get(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        self.make_request(Method::GET, endpoint, query_params, None, authenticated)
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<T, ApiError> {
        self.make_request(Method::GET, endpoint, query_params, None, authenticated)
            .await
            .and_then(envelope::decode)
    }

    async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        self.make_request(Method::POST, endpoint, &[], Some(body), authenticated)
            .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        self.make_request(Method::POST, endpoint, &[], Some(body), authenticated)
            .await
            .and_then(envelope::decode)
    }

    async fn put(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        self.make_request(Method::PUT, endpoint, &[], Some(body), authenticated)
            .await
    }

    async fn put_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<T, ApiError> {
        self.make_request(Method::PUT, endpoint, &[], Some(body), authenticated)
            .await
            .and_then(envelope::decode)
    }

    async fn patch(
        &self,
        endpoint: &str,
        body: &Value,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        self.make_request(Method::PATCH, endpoint, &[], Some(body), authenticated)
            .await
    }

    async fn delete(
        &self,
        endpoint: &str,
        query_params: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        self.make_request(Method::DELETE, endpoint, query_params, None, authenticated)
            .await
    }

    #[instrument(skip(self, form), fields(service = %self.config.service_name, endpoint = %endpoint))]
    async fn post_form(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint);
        let mut request = self.client.post(&url).form(form);
        request = self.attach_auth(request, authenticated);

        let response = request.send().await?;

        self.handle_response(response).await
    }

    #[instrument(skip(self, bytes), fields(service = %self.config.service_name, endpoint = %endpoint, file = %file_name, size = bytes.len()))]
    async fn post_multipart(
        &self,
        endpoint: &str,
        file_name: &str,
        bytes: Vec<u8>,
        authenticated: bool,
    ) -> Result<Value, ApiError> {
        let url = self.build_url(endpoint);
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);

        let mut request = self.client.post(&url).multipart(form);
        request = self.attach_auth(request, authenticated);

        let response = request.send().await?;

        self.handle_response(response).await
    }
}
