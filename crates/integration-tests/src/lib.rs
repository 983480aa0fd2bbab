//! Integration tests for the Godipper ordering engine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p dipper-integration-tests
//! ```
//!
//! # Architecture
//!
//! The tests drive real `dipper_ordering::Session`s against
//! [`FakeUpstream`], an axum server on `127.0.0.1:0` that imitates the
//! restaurant site's pages and form endpoints. It serves the same fixture
//! pages the ordering crate's unit tests parse, checks the session cookie and
//! CSRF tokens the way the real site does, and records every request so tests
//! can assert on the exact protocol.

use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Form, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use url::Url;

/// Session id the fake hands out.
pub const SESSION_ID: &str = "fake-session-1";

pub const TRIPLE_DIPPER_PAGE: &str = include_str!("../../ordering/testdata/triple_dipper.html");
pub const PICKUP_PAGE: &str = include_str!("../../ordering/testdata/pickup.html");
pub const PAYMENT_PAGE: &str = include_str!("../../ordering/testdata/payment.html");
pub const CONFIRMATION_PAGE: &str = include_str!("../../ordering/testdata/confirmation.html");
pub const LOCATIONS_PAGE: &str = include_str!("../../ordering/testdata/locations.html");
pub const LOCATIONS_EMPTY_PAGE: &str = include_str!("../../ordering/testdata/locations_empty.html");
pub const LOCATIONS_CLOSED_PAGE: &str =
    include_str!("../../ordering/testdata/locations_closed.html");
pub const LOCATIONS_NO_DELIVERY_PAGE: &str =
    include_str!("../../ordering/testdata/locations_no_delivery.html");

/// CSRF tokens embedded in the fixture pages.
pub mod csrf {
    pub const MENU: &str = "5d1b3c1e-dipper-csrf";
    pub const CHECKOUT: &str = "8f0a77c2-checkout-csrf";
    pub const PAYMENT: &str = "c3e1d0b9-payment-csrf";
}

const HOME_PAGE: &str = "<!DOCTYPE html><html><body><h1>Welcome</h1></body></html>";

/// How the fake upstream behaves.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Whether `GET /` sets the session cookie.
    pub set_session_cookie: bool,
    /// Page served for location searches.
    pub locations_page: &'static str,
    /// Body returned by the add-to-cart endpoint on a valid request.
    pub cart_body: &'static str,
    /// Body returned by the delivery estimate endpoint on a valid request.
    pub estimate_body: &'static str,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            set_session_cookie: true,
            locations_page: LOCATIONS_PAGE,
            cart_body: r#"{"cartCount":1,"subtotal":"$40.47"}"#,
            estimate_body: r#"{"delivery_time":"2021-03-03T21:42:26.730000Z"}"#,
        }
    }
}

/// One request as the fake received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: Method,
    pub path: &'static str,
    pub query: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
    pub session: Option<String>,
}

impl Recorded {
    /// All values of `key` in the form body, in order.
    #[must_use]
    pub fn form_values(&self, key: &str) -> Vec<&str> {
        self.form
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The single value of `key` in the form body.
    #[must_use]
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct Upstream {
    scenario: Arc<Scenario>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl Upstream {
    fn record(
        &self,
        method: Method,
        path: &'static str,
        headers: &HeaderMap,
        query: Vec<(String, String)>,
        form: Vec<(String, String)>,
    ) -> Option<String> {
        let session = session_cookie(headers);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Recorded {
                method,
                path,
                query,
                form,
                session: session.clone(),
            });
        session.filter(|id| id == SESSION_ID)
    }
}

fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "SESSION")
        .map(|(_, value)| value.to_owned())
}

fn has_csrf(form: &[(String, String)], expected: &str) -> bool {
    form.iter()
        .any(|(key, value)| key == "_csrf" && value == expected)
}

fn no_session() -> Response {
    (StatusCode::FORBIDDEN, "missing session").into_response()
}

fn bad_csrf() -> Response {
    (StatusCode::FORBIDDEN, "invalid CSRF token").into_response()
}

async fn home(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
    upstream.record(Method::GET, "/", &headers, Vec::new(), Vec::new());
    if upstream.scenario.set_session_cookie {
        (
            [(SET_COOKIE, format!("SESSION={SESSION_ID}; Path=/; HttpOnly"))],
            Html(HOME_PAGE),
        )
            .into_response()
    } else {
        Html(HOME_PAGE).into_response()
    }
}

async fn locations(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    // Location search is public
    upstream.record(Method::GET, "/locations/results", &headers, query, Vec::new());
    Html(upstream.scenario.locations_page).into_response()
}

async fn select_location(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    if upstream
        .record(Method::GET, "/order", &headers, query, Vec::new())
        .is_none()
    {
        return no_session();
    }
    Html("<html><body><h1>Menu</h1></body></html>").into_response()
}

async fn menu(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
    let path = "/menu/appetizers/triple-dipper";
    if upstream
        .record(Method::GET, path, &headers, Vec::new(), Vec::new())
        .is_none()
    {
        return no_session();
    }
    Html(TRIPLE_DIPPER_PAGE).into_response()
}

async fn add_to_cart(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let path = "/menu/appetizers/triple-dipper";
    let valid = has_csrf(&form, csrf::MENU);
    if upstream
        .record(Method::POST, path, &headers, Vec::new(), form)
        .is_none()
    {
        return no_session();
    }
    if !valid {
        return r#"{"error":"invalid csrf"}"#.into_response();
    }
    upstream.scenario.cart_body.into_response()
}

async fn pickup(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
    if upstream
        .record(Method::GET, "/order/pickup", &headers, Vec::new(), Vec::new())
        .is_none()
    {
        return no_session();
    }
    Html(PICKUP_PAGE).into_response()
}

async fn submit_checkout(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let valid = has_csrf(&form, csrf::CHECKOUT);
    if upstream
        .record(Method::POST, "/order/pickup", &headers, Vec::new(), form)
        .is_none()
    {
        return no_session();
    }
    if !valid {
        return bad_csrf();
    }
    Html("<html><body><h1>Payment</h1></body></html>").into_response()
}

async fn estimate(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let valid = has_csrf(&form, csrf::CHECKOUT);
    if upstream
        .record(Method::POST, "/order/delivery/estimate", &headers, Vec::new(), form)
        .is_none()
    {
        return no_session();
    }
    if !valid {
        return bad_csrf();
    }
    upstream.scenario.estimate_body.into_response()
}

async fn payment_page(State(upstream): State<Upstream>, headers: HeaderMap) -> Response {
    if upstream
        .record(Method::GET, "/order/payment", &headers, Vec::new(), Vec::new())
        .is_none()
    {
        return no_session();
    }
    Html(PAYMENT_PAGE).into_response()
}

async fn submit_payment(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Form(form): Form<Vec<(String, String)>>,
) -> Response {
    let valid = has_csrf(&form, csrf::PAYMENT);
    if upstream
        .record(Method::POST, "/order/payment", &headers, Vec::new(), form)
        .is_none()
    {
        return no_session();
    }
    if !valid {
        return bad_csrf();
    }
    Html(CONFIRMATION_PAGE).into_response()
}

/// A running fake upstream.
pub struct FakeUpstream {
    base_url: Url,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    /// Serve `scenario` on an ephemeral local port.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be bound.
    pub async fn spawn(scenario: Scenario) -> std::io::Result<Self> {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/", get(home))
            .route("/locations/results", get(locations))
            .route("/order", get(select_location))
            .route("/menu/appetizers/triple-dipper", get(menu).post(add_to_cart))
            .route("/order/pickup", get(pickup).post(submit_checkout))
            .route("/order/delivery/estimate", post(estimate))
            .route("/order/payment", get(payment_page).post(submit_payment))
            .with_state(Upstream {
                scenario: Arc::new(scenario),
                requests: Arc::clone(&requests),
            });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let base_url = Url::parse(&format!("http://{addr}"))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
        Ok(Self { base_url, requests })
    }

    /// Origin to point an `OrderingConfig` at.
    #[must_use]
    pub fn base_url(&self) -> Url {
        self.base_url.clone()
    }

    /// Every request received so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `(method, path)` of every request received so far.
    #[must_use]
    pub fn trace(&self) -> Vec<(Method, &'static str)> {
        self.requests()
            .into_iter()
            .map(|r| (r.method, r.path))
            .collect()
    }
}
