//! Session token manager with a one-shot refresh-and-retry on 401.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{RequestOptions, Tokens};
use crate::error::Error;
use crate::store::{KeyValueStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Path of the refresh endpoint, relative to the API base URL.
pub const REFRESH_PATH: &str = "auth/refresh-tokens";

/// Which refresh token the manager hands to `refresh` when a request needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshSource {
    /// Internal refreshes pass no token and therefore never reach the network.
    /// Expired sessions are only recovered by an explicit `refresh(Some(..))`,
    /// e.g. on start-up. This is how deployed clients behave today.
    #[default]
    Explicit,
    /// Internal refreshes pass the stored refresh token. Concurrent refreshes
    /// are coalesced so a rotated refresh token is only spent once.
    Stored,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Owns the persisted credential pair and mediates every authenticated request.
///
/// In [`RefreshSource::Explicit`] mode there is no coordination between concurrent
/// requests: two callers hitting a 401 at the same time each run their own refresh
/// and the last write to the store wins.
pub struct Manager {
    client: Client,
    base_url: String,
    store: Arc<dyn KeyValueStore>,
    refresh_source: RefreshSource,
    refresh_lock: Mutex<()>,
}

impl Manager {
    /// Create a manager for the API rooted at `base_url`.
    pub fn new(
        client: Client,
        base_url: &str,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, Error> {
        url::Url::parse(base_url)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            refresh_source: RefreshSource::default(),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Choose where internal refreshes take their refresh token from.
    pub fn with_refresh_source(mut self, refresh_source: RefreshSource) -> Self {
        self.refresh_source = refresh_source;
        self
    }

    pub fn refresh_source(&self) -> RefreshSource {
        self.refresh_source
    }

    /// The plain HTTP client, for unauthenticated calls such as login.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Absolute URL for `path` under the API base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Read the stored access token.
    pub async fn get_token(&self) -> Result<Option<String>, Error> {
        self.store.get(ACCESS_TOKEN_KEY).await
    }

    /// Read the stored refresh token.
    pub async fn get_refresh_token(&self) -> Result<Option<String>, Error> {
        self.store.get(REFRESH_TOKEN_KEY).await
    }

    pub async fn set_token(&self, token: &str) -> Result<(), Error> {
        self.store.set(ACCESS_TOKEN_KEY, token).await
    }

    pub async fn set_refresh_token(&self, token: &str) -> Result<(), Error> {
        self.store.set(REFRESH_TOKEN_KEY, token).await
    }

    /// Persist whichever halves of `tokens` are present.
    pub async fn store_tokens(&self, tokens: &Tokens) -> Result<(), Error> {
        if let Some(access) = tokens.access_token() {
            self.set_token(access).await?;
        }
        if let Some(refresh) = tokens.refresh_token() {
            self.set_refresh_token(refresh).await?;
        }
        Ok(())
    }

    /// Remove both tokens (logout).
    pub async fn clear_tokens(&self) -> Result<(), Error> {
        self.store.delete(ACCESS_TOKEN_KEY).await?;
        self.store.delete(REFRESH_TOKEN_KEY).await
    }

    /// True iff a non-empty access token is stored. The token itself is not validated.
    pub async fn is_authenticated(&self) -> Result<bool, Error> {
        Ok(self.get_token().await?.is_some_and(|t| !t.is_empty()))
    }

    /// Exchange `refresh_token` for a new pair and persist it.
    ///
    /// Returns `false` without touching the network when no token is given. Any
    /// failure (non-2xx, transport error, body that is not JSON) also yields `false`.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> bool {
        let Some(refresh_token) = refresh_token.filter(|t| !t.is_empty()) else {
            debug!("No refresh token supplied, skipping refresh");
            return false;
        };

        match self.exchange_refresh_token(refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                warn!("Error refreshing auth token: {}", e);
                false
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<bool, Error> {
        let response = self
            .client
            .post(self.endpoint(REFRESH_PATH))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("Refresh endpoint rejected token with status {}", status);
            return Ok(false);
        }

        let body: Value = response.json().await?;
        let tokens = Tokens::from_token_pair(&body);
        self.store_tokens(&tokens).await?;

        debug!("Token refreshed successfully");
        Ok(true)
    }

    /// Send a request carrying the stored bearer token.
    ///
    /// A missing token triggers one refresh attempt before sending. A 401 triggers one
    /// refresh attempt and, if it succeeds, exactly one resend. If the response after
    /// the 401 handling is still not a success, both tokens are cleared.
    ///
    /// The final response is returned whatever its status. Transport errors on the
    /// send or the resend are returned as errors.
    pub async fn authenticated_request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        let mut token = self.get_token().await?.filter(|t| !t.is_empty());
        if token.is_none() && self.refresh_for_request(None).await {
            token = self.get_token().await?;
        }

        let mut response = self.send(url, &options, token.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            debug!("Received 401 from {}, attempting token refresh", url);

            if self.refresh_for_request(token.as_deref()).await {
                let new_token = self.get_token().await?;
                response = self.send(url, &options, new_token.as_deref()).await?;
            }

            if !response.status().is_success() {
                warn!(
                    "Request to {} still failing with {}, clearing session tokens",
                    url,
                    response.status()
                );
                if let Err(e) = self.clear_tokens().await {
                    warn!("Failed to clear session tokens: {}", e);
                }
            }
        }

        Ok(response)
    }

    /// Refresh on behalf of `authenticated_request`. `stale_token` is the access
    /// token the failed request was sent with.
    async fn refresh_for_request(&self, stale_token: Option<&str>) -> bool {
        match self.refresh_source {
            RefreshSource::Explicit => self.refresh(None).await,
            RefreshSource::Stored => {
                let _guard = self.refresh_lock.lock().await;

                match self.get_token().await {
                    Ok(Some(current)) if !current.is_empty() && Some(current.as_str()) != stale_token => {
                        debug!("Token was refreshed by another request");
                        return true;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Failed to read access token before refresh: {}", e);
                        return false;
                    }
                }

                match self.get_refresh_token().await {
                    Ok(refresh_token) => self.refresh(refresh_token.as_deref()).await,
                    Err(e) => {
                        warn!("Failed to read refresh token: {}", e);
                        false
                    }
                }
            }
        }
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
        token: Option<&str>,
    ) -> Result<Response, Error> {
        let headers = options.build_headers(token)?;
        let mut request = self
            .client
            .request(options.method.clone(), url)
            .headers(headers);
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        Ok(request.send().await?)
    }
}
