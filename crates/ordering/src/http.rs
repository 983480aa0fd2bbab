//! HTTP plumbing for upstream sessions.
//!
//! Each session owns one [`UpstreamClient`]: a `reqwest::Client` backed by a
//! `cookie_store` jar. The upstream keys all server-side state (location, cart,
//! checkout) on the `SESSION` cookie, so the jar is the only thing that must
//! survive between steps. Nothing is cached; every step fetches a fresh page.
//!
//! The jar checks `Domain` attributes against the public suffix list bundled in
//! `data/public_suffix_list.dat`, so a response cannot plant a cookie on a
//! registry domain such as `com` or `co.uk`.

use std::sync::{Arc, LazyLock, PoisonError};

use cookie_store::CookieStore;
use publicsuffix::List;
use reqwest_cookie_store::CookieStoreMutex;
use tracing::debug;
use url::Url;

use crate::config::OrderingConfig;
use crate::error::{OrderingError, Result};

/// Name of the upstream's session cookie.
pub const SESSION_COOKIE: &str = "SESSION";

/// A session's cookie jar.
pub type Jar = CookieStoreMutex;

/// Endpoint paths, relative to the configured base URL.
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOCATION_RESULTS: &str = "/locations/results";
    pub const ORDER: &str = "/order";
    pub const TRIPLE_DIPPER: &str = "/menu/appetizers/triple-dipper";
    pub const PICKUP: &str = "/order/pickup";
    pub const DELIVERY_ESTIMATE: &str = "/order/delivery/estimate";
    pub const PAYMENT: &str = "/order/payment";
}

static PUBLIC_SUFFIXES: LazyLock<std::result::Result<List, publicsuffix::Error>> =
    LazyLock::new(|| include_str!("../data/public_suffix_list.dat").parse());

/// An empty cookie jar restricted by public suffix rules.
///
/// # Errors
///
/// Returns [`OrderingError::PublicSuffix`] if the bundled list does not parse.
pub fn create_jar() -> Result<Arc<Jar>> {
    let list = PUBLIC_SUFFIXES.as_ref().map_err(Clone::clone)?;
    let store = CookieStore::new_with_public_suffix(Some(list.clone()));
    Ok(Arc::new(CookieStoreMutex::new(store)))
}

/// Build a client for `config`, optionally seeding its jar with a session id.
///
/// # Errors
///
/// Returns [`OrderingError::Cookie`] if the session cookie cannot be stored
/// for the base URL, or [`OrderingError::Http`] if the client cannot be built.
pub fn create_client(
    config: &OrderingConfig,
    session: Option<&str>,
) -> Result<(reqwest::Client, Arc<Jar>)> {
    let jar = create_jar()?;
    if let Some(id) = session {
        jar.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .parse(&format!("{SESSION_COOKIE}={id}; Path=/"), &config.base_url)?;
    }
    let client = reqwest::Client::builder()
        .cookie_provider(Arc::clone(&jar))
        .timeout(config.request_timeout)
        .user_agent(config.user_agent.as_str())
        .build()?;
    Ok((client, jar))
}

/// Value of the `SESSION` cookie the jar would send to `base_url`.
///
/// # Errors
///
/// Returns [`OrderingError::SessionCookieMissing`] if the jar holds none.
pub fn session_id(jar: &Jar, base_url: &Url) -> Result<String> {
    jar.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_request_values(base_url)
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_owned())
        .ok_or(OrderingError::SessionCookieMissing)
}

/// A session's connection to the upstream.
pub struct UpstreamClient {
    client: reqwest::Client,
    jar: Arc<Jar>,
    base_url: Url,
}

impl UpstreamClient {
    /// Create a client, seeding the jar with `session` if given.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Http`] if the client cannot be built.
    pub fn new(config: &OrderingConfig, session: Option<&str>) -> Result<Self> {
        let (client, jar) = create_client(config, session)?;
        Ok(Self {
            client,
            jar,
            base_url: config.base_url.clone(),
        })
    }

    /// Absolute URL for an endpoint path.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Url`] if the path cannot be joined.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// The current session id, as held in the jar.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::SessionCookieMissing`] if none is set.
    pub fn session_id(&self) -> Result<String> {
        session_id(&self.jar, &self.base_url)
    }

    /// GET `path` with the given query pairs and return the body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let mut url = self.endpoint(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        read_body(response).await
    }

    /// POST `form` url-encoded to `path` and return the body.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or a non-success status.
    pub async fn post_form(&self, path: &str, form: &[(String, String)]) -> Result<String> {
        let url = self.endpoint(path)?;
        debug!(%url, fields = form.len(), "POST");
        let response = self.client.post(url).form(form).send().await?;
        read_body(response).await
    }
}

async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await?;
    debug!(%url, status = status.as_u16(), bytes = body.len(), "response");
    if !status.is_success() {
        return Err(OrderingError::Upstream(format!("{url} returned {status}")));
    }
    Ok(body)
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
