use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use reqwest::{Client, Proxy, RequestBuilder};
use serde_json::json;
use tracing::{debug, trace};

use super::classify::{interpret, parse_ack, parse_balance, parse_missions, transport_failure};
use super::{ClientFactory, Mission, Outcome, RemoteClient};
use crate::account::Account;
use crate::config::RemoteConfig;
use crate::error::{FleetError, Result};

const SITE_ORIGIN: &str = "https://nodepay.ai";

/// reqwest-backed session. Owns its own connection pool, which is released
/// when the last handle is dropped.
pub struct HttpRemoteClient {
    http: Client,
    config: Arc<RemoteConfig>,
    account_index: usize,
    credential: String,
}

impl HttpRemoteClient {
    pub fn connect(account: &Account, config: Arc<RemoteConfig>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(ORIGIN, HeaderValue::from_static(SITE_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static("https://nodepay.ai/"));

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent_for(account.index))
            .default_headers(headers);

        if let Some(route) = account.proxy() {
            let proxy = Proxy::all(route).map_err(|_| FleetError::InvalidProxy {
                index: account.index,
                proxy: account.masked_proxy().unwrap_or_default(),
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder.build().map_err(|e| FleetError::Session {
            index: account.index,
            message: e.to_string(),
        })?;

        debug!(
            account = account.index,
            proxied = account.proxy().is_some(),
            "Opened HTTP session"
        );

        Ok(Self {
            http,
            config,
            account_index: account.index,
            credential: account.credential().to_string(),
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn exchange<T>(
        &self,
        request: RequestBuilder,
        parse: impl FnOnce(&str) -> std::result::Result<T, String>,
    ) -> Outcome<T> {
        let response = match request.bearer_auth(&self.credential).send().await {
            Ok(r) => r,
            Err(e) => return transport_failure(&e.to_string(), e.is_timeout()),
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(b) => b,
            Err(e) => return transport_failure(&e.to_string(), e.is_timeout()),
        };

        trace!(account = self.account_index, status, "Response received");
        interpret(status, &body, parse)
    }
}

#[async_trait]
impl RemoteClient for HttpRemoteClient {
    async fn fetch_balance(&self) -> Outcome<f64> {
        let request = self.http.get(self.api("earn/info"));
        self.exchange(request, parse_balance).await
    }

    async fn list_missions(&self) -> Outcome<Vec<Mission>> {
        let request = self
            .http
            .get(self.api("mission"))
            .query(&[("platform", self.config.platform.as_str())]);
        self.exchange(request, parse_missions).await
    }

    async fn claim_mission(&self, mission_id: &str) -> Outcome<bool> {
        let request = self
            .http
            .post(self.api("mission/complete-mission"))
            .json(&json!({
                "missionId": mission_id,
                "platform": self.config.platform,
            }));
        self.exchange(request, parse_ack).await
    }

    async fn send_ping(&self) -> Outcome<bool> {
        let request = self.http.post(&self.config.ping_url).json(&json!({}));
        self.exchange(request, parse_ack).await
    }

    async fn validate_credential(&self) -> Outcome<bool> {
        // Any parseable earn/info answer means the token was accepted.
        let request = self.http.get(self.api("earn/info"));
        self.exchange(request, |body| parse_balance(body).map(|_| true))
            .await
    }

    async fn claim_daily_reward(&self) -> Outcome<bool> {
        let request = self.http.post(self.api("earn/claim"));
        self.exchange(request, parse_ack).await
    }
}

/// Opens one `HttpRemoteClient` per account.
#[derive(Clone)]
pub struct HttpClientFactory {
    config: Arc<RemoteConfig>,
}

impl HttpClientFactory {
    pub fn new(config: RemoteConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

impl ClientFactory for HttpClientFactory {
    fn open(&self, account: &Account) -> Result<Arc<dyn RemoteClient>> {
        Ok(Arc::new(HttpRemoteClient::connect(
            account,
            Arc::clone(&self.config),
        )?))
    }
}
