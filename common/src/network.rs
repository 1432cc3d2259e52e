use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::ApiConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

/// A JSON request against a path relative to the configured base url.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

impl Request {
    fn new(method: Method, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    pub fn patch(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Patch, path, Some(body))
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_str(&self.body)
    }
}

/// Anything that can carry a `Request` to the data service.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: Request) -> anyhow::Result<Response>;
}

pub struct HttpTransport {
    base_url: String,
    #[cfg(not(target_arch = "wasm32"))]
    backend: not_wasm::ReqwestBackend,
    #[cfg(target_arch = "wasm32")]
    backend: wasm::FetchBackend,
}

impl HttpTransport {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            backend: not_wasm::ReqwestBackend::new(config.timeout())?,
        })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: config.base_url.clone(),
            backend: wasm::FetchBackend::new(config.timeout()),
        })
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> anyhow::Result<Response> {
        let url = self.url(&request.path);
        self.backend.execute(&url, &request).await
    }
}

pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

pub async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;

    #[cfg(target_arch = "wasm32")]
    gloo::timers::future::sleep(duration).await;
}

trait HttpBackend {
    async fn execute<'a>(&'a self, url: &'a str, request: &'a Request) -> anyhow::Result<Response>;
}

#[cfg(not(target_arch = "wasm32"))]
mod not_wasm {
    use std::time::Duration;

    use crate::network::{HttpBackend, Method, Request, Response};

    pub struct ReqwestBackend {
        client: reqwest::Client,
    }

    impl ReqwestBackend {
        pub fn new(timeout: Duration) -> anyhow::Result<Self> {
            let client = reqwest::Client::builder().timeout(timeout).build()?;
            Ok(Self { client })
        }
    }

    impl HttpBackend for ReqwestBackend {
        async fn execute<'a>(&'a self, url: &'a str, request: &'a Request) -> anyhow::Result<Response> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Patch => reqwest::Method::PATCH,
            };
            let mut builder = self.client.request(method, url);
            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            if let Some(token) = &request.bearer {
                builder = builder.bearer_auth(token);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(Response { status, body })
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::time::Duration;

    use anyhow::anyhow;
    use futures::future::{select, Either};
    use gloo::net::http::{Request as FetchRequest, RequestBuilder};
    use gloo::timers::future::TimeoutFuture;

    use crate::network::{HttpBackend, Method, Request, Response};

    pub struct FetchBackend {
        timeout: Duration,
    }

    impl FetchBackend {
        pub fn new(timeout: Duration) -> Self {
            Self { timeout }
        }

        fn builder(url: &str, request: &Request) -> RequestBuilder {
            let mut builder = match request.method {
                Method::Get => FetchRequest::get(url),
                Method::Post => FetchRequest::post(url),
                Method::Patch => FetchRequest::patch(url),
            };
            if !request.query.is_empty() {
                builder = builder.query(
                    request
                        .query
                        .iter()
                        .map(|(key, value)| (key.as_str(), value.as_str())),
                );
            }
            if let Some(token) = &request.bearer {
                builder = builder.header("Authorization", &format!("Bearer {token}"));
            }
            builder
        }
    }

    impl HttpBackend for FetchBackend {
        async fn execute<'a>(&'a self, url: &'a str, request: &'a Request) -> anyhow::Result<Response> {
            let builder = Self::builder(url, request);
            let prepared = match &request.body {
                Some(body) => builder.json(body)?,
                None => builder.build()?,
            };

            let timeout = TimeoutFuture::new(self.timeout.as_millis() as u32);
            let response = match select(Box::pin(prepared.send()), timeout).await {
                Either::Left((response, _)) => response?,
                Either::Right(_) => {
                    return Err(anyhow!(
                        "{} {url} timed out after {:?}",
                        request.method.as_str(),
                        self.timeout
                    ))
                }
            };

            let status = response.status();
            let body = response.text().await?;
            Ok(Response { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_doubled_slashes() {
        assert_eq!(join_url("http://localhost:3001/api/", "/users"), "http://localhost:3001/api/users");
        assert_eq!(join_url("/api", "matches/7"), "/api/matches/7");
        assert_eq!(join_url("/api", ""), "/api");
    }

    #[test]
    fn requests_collect_query_and_bearer() {
        let request = Request::get("users")
            .with_query("email", "a@b.c")
            .with_query_pairs([("password".to_string(), "x".to_string())])
            .with_bearer(Some("token".into()));
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.bearer.as_deref(), Some("token"));
        assert!(request.body.is_none());
    }

    #[test]
    fn success_covers_the_2xx_range() {
        let ok = Response { status: 201, body: "{\"id\":1}".into() };
        assert!(ok.is_success());
        assert_eq!(ok.json::<serde_json::Value>().unwrap()["id"], 1);
        assert!(!Response { status: 404, body: String::new() }.is_success());
    }
}
