#![allow(dead_code)]

use std::net::Ipv4Addr;

use anyhow::{Context, Result};
use barangay_care_bff::{app, config::AppConfig, AppState};
use reqwest::{redirect::Policy, RequestBuilder};
use wiremock::MockServer;

/// Upstream address nothing listens on, for "upstream unreachable" cases
pub const UNREACHABLE_UPSTREAM: &str = "http://127.0.0.1:1/api";

pub struct TestApp {
    pub base_url: String,
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Development config pointed at a fresh mock upstream
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(AppConfig::development()).await
    }

    pub async fn spawn_with(config: AppConfig) -> Result<Self> {
        let upstream = MockServer::start().await;
        let config = config.with_upstream(&format!("{}/api", upstream.uri()));
        let base_url = serve(config).await?;
        Ok(Self {
            base_url,
            upstream,
            client: client(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_session(self.client.get(self.url(path)), token)
    }

    pub fn post(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_session(self.client.post(self.url(path)), token)
    }

    pub fn put(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_session(self.client.put(self.url(path)), token)
    }

    pub fn patch(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_session(self.client.patch(self.url(path)), token)
    }

    pub fn delete(&self, path: &str, token: Option<&str>) -> RequestBuilder {
        with_session(self.client.delete(self.url(path)), token)
    }

    /// Query string of the single request the upstream saw
    pub async fn last_upstream_query(&self) -> Option<String> {
        let requests = self.upstream.received_requests().await?;
        requests.last().map(|r| r.url.query().unwrap_or_default().to_string())
    }
}

/// Serve the router on an ephemeral port and return its base URL
pub async fn serve(config: AppConfig) -> Result<String> {
    let state = AppState::new(config).context("failed to build app state")?;
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app(state)).await;
    });

    Ok(format!("http://{addr}"))
}

/// Client that reports redirects instead of following them
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("failed to build test client")
}

pub fn with_session(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.header("Cookie", format!("auth_token={token}")),
        None => builder,
    }
}

pub fn location(res: &reqwest::Response) -> String {
    res.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn set_cookie(res: &reqwest::Response) -> String {
    res.headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("auth_token="))
        .unwrap_or_default()
        .to_string()
}
