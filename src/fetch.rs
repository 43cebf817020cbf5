//! HTTP client abstraction for making requests to the catalog backend

use convert_case::{Case, Casing};
use reqwest::{header::{HeaderMap, HeaderValue}, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::error::Error;

/// Header carrying the unpaginated record count of a list query
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    client: &'a Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    fallback_message: Option<String>,
}

impl<'a> FetchBuilder<'a> {
    /// Create a new FetchBuilder
    pub fn new(client: &'a Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: Vec::new(),
            body: None,
            fallback_message: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add query parameters to the request, keeping their order
    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(body)?;
        self.body = Some(json);
        Ok(self)
    }

    /// Message reported when the backend fails without saying why
    pub fn fallback_message(mut self, message: &str) -> Self {
        self.fallback_message = Some(message.to_string());
        self
    }

    /// Build the request
    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        debug!(method = %self.method, url = %url, "sending request");

        let mut req = self.client.request(self.method.clone(), url.as_str());
        req = req.headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }

        Ok(req)
    }

    /// Send the request and turn non-success statuses into `Error::Api`
    async fn send(&self) -> Result<Response, Error> {
        let response = self.build()?.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
            .or_else(|| self.fallback_message.clone())
            .unwrap_or_else(|| format!("Request failed: {}", text));
        debug!(%status, %message, "request failed");
        Err(Error::Api { status, message })
    }

    /// Execute the request and parse the camelCased response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        decode_body(response).await
    }

    /// Execute a list request and also return the `X-Total-Count` header.
    /// A missing or unparseable header counts as zero.
    pub async fn execute_with_total<T: DeserializeOwned>(&self) -> Result<(T, u64), Error> {
        let response = self.send().await?;
        let total = total_count(response.headers());
        let data = decode_body(response).await?;
        Ok((data, total))
    }

    /// Execute the request, ignoring the response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.send().await?;
        Ok(())
    }
}

async fn decode_body<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let text = response.text().await?;
    let value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str::<Value>(&text)?
    };
    Ok(serde_json::from_value(camelcase_keys(value))?)
}

fn total_count(headers: &HeaderMap) -> u64 {
    headers
        .get(TOTAL_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(0)
}

/// Recursively rewrites every object key to camelCase.
pub fn camelcase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_case(Case::Camel), camelcase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelcase_keys).collect()),
        other => other,
    }
}

/// Helper for creating HTTP requests
pub struct Fetch;

impl Fetch {
    /// Create a GET request
    pub fn get<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::GET)
    }

    /// Create a POST request
    pub fn post<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::POST)
    }

    /// Create a PATCH request
    pub fn patch<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::PATCH)
    }

    /// Create a DELETE request
    pub fn delete<'a>(client: &'a Client, url: &str) -> FetchBuilder<'a> {
        FetchBuilder::new(client, url, Method::DELETE)
    }
}
