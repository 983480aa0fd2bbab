//! Error taxonomy for the ordering engine.
//!
//! Every failure falls into one of three kinds (see [`ErrorKind`]):
//! client-invalid input, an upstream business-rule refusal, or a transient /
//! structural failure such as a network error or drifted markup. Session
//! operations wrap lower-level errors in [`OrderingError::Step`] to say which
//! step failed; the kind is always that of the innermost error.

use dipper_core::{BadRequest, Forbidden, ForbiddenReason, PaymentError};
use thiserror::Error;

/// Errors that can occur while driving an order.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// Locally detectable bad input.
    #[error(transparent)]
    BadRequest(#[from] BadRequest),

    /// The upstream refused a well-formed request.
    #[error(transparent)]
    Forbidden(#[from] Forbidden),

    /// Payment method could not be validated or formatted.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Expected markup was missing from a page.
    #[error("no matching elements found: {0}")]
    NotFound(String),

    /// A query could not be compiled into a CSS selector.
    #[error("invalid selector {selector}: {message}")]
    Selector { selector: String, message: String },

    /// HTTP request failed or timed out.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body was not the JSON we expected.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// The upstream reported an error in an otherwise valid response.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// A displayed amount could not be parsed.
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),

    /// A cookie was refused by the jar.
    #[error("cookie rejected: {0}")]
    Cookie(#[from] cookie_store::CookieError),

    /// The bundled public suffix list could not be loaded.
    #[error("public suffix list error: {0}")]
    PublicSuffix(#[from] publicsuffix::Error),

    /// The upstream never set a session cookie.
    #[error("failed to find session cookie")]
    SessionCookieMissing,

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The session already placed its order.
    #[error("session has already placed an order")]
    SessionClosed,

    /// A session step failed.
    #[error("{step}: {source}")]
    Step {
        step: &'static str,
        source: Box<OrderingError>,
    },
}

/// Coarse classification of an [`OrderingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid caller input; never worth retrying unchanged.
    BadRequest,
    /// Refused by upstream business rules.
    Forbidden,
    /// Network, markup, JSON, or protocol failure.
    Transient,
}

impl OrderingError {
    /// Wrap `self` with the name of the step that failed.
    #[must_use]
    pub fn in_step(self, step: &'static str) -> Self {
        Self::Step {
            step,
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through [`Step`](Self::Step) wrappers.
    #[must_use]
    pub fn root(&self) -> &Self {
        let mut err = self;
        while let Self::Step { source, .. } = err {
            err = source.as_ref();
        }
        err
    }

    /// Classify the error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Step { source, .. } => source.kind(),
            Self::BadRequest(_) | Self::Payment(PaymentError::Invalid(_)) | Self::EmptyCart => {
                ErrorKind::BadRequest
            }
            Self::Forbidden(_) => ErrorKind::Forbidden,
            _ => ErrorKind::Transient,
        }
    }

    /// The offending field name, for client-invalid errors.
    #[must_use]
    pub fn bad_request(&self) -> Option<&BadRequest> {
        match self.root() {
            Self::BadRequest(err) | Self::Payment(PaymentError::Invalid(err)) => Some(err),
            _ => None,
        }
    }

    /// The refusal reason, for upstream-forbidden errors.
    #[must_use]
    pub fn forbidden(&self) -> Option<ForbiddenReason> {
        match self.root() {
            Self::Forbidden(err) => Some(err.reason),
            _ => None,
        }
    }
}

impl From<ForbiddenReason> for OrderingError {
    fn from(reason: ForbiddenReason) -> Self {
        Self::Forbidden(reason.into())
    }
}

/// Extension for tagging errors with the session step they came from.
pub(crate) trait StepExt<T> {
    fn step(self, step: &'static str) -> Result<T>;
}

impl<T, E: Into<OrderingError>> StepExt<T> for std::result::Result<T, E> {
    fn step(self, step: &'static str) -> Result<T> {
        self.map_err(|e| Into::<OrderingError>::into(e).in_step(step))
    }
}

/// Result type alias for `OrderingError`.
pub type Result<T> = std::result::Result<T, OrderingError>;
