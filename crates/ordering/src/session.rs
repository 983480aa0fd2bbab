//! Session protocol driver.
//!
//! A [`Session`] walks the upstream's ordering flow one page at a time:
//!
//! ```text
//! Anonymous ──set_location──▶ LocationSet ──cart──▶ Carted(n) ──checkout──▶ CheckedOut ──place──▶ Placed
//!                                               ▲      │
//!                                               └cart──┘
//! ```
//!
//! Sessions rebuilt from an id with [`Session::resume`] start in `Resumed`,
//! since the upstream remembers how far they got but we do not.
//!
//! # Architecture
//!
//! Each operation fetches a page, scrapes the tokens it needs, posts a form
//! built from them, and checks the response. Operations take `&mut self`, so a
//! session never has two requests in flight; the upstream drops or corrupts
//! state when one cookie issues concurrent requests. Independent sessions
//! share nothing and may run concurrently.
//!
//! Pages are parsed in synchronous helpers that return owned values, so no
//! parsed document is held across an `.await`.
//!
//! Nothing is retried. A failed operation leaves the upstream wherever the last
//! successful request left it and returns an [`OrderingError::Step`] naming
//! what failed.

use dipper_core::{Address, Customer, Location, OrderInfo, PaymentMethod, TripleDipper};
use tracing::{info, instrument, warn};

use crate::config::OrderingConfig;
use crate::error::{OrderingError, Result, StepExt};
use crate::forms::{self, CheckoutTokens, Form};
use crate::html;
use crate::http::{UpstreamClient, paths};
use crate::tokens::{self, Totals};

/// Where a session is in the ordering flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Fresh session, no location bound yet.
    Anonymous,
    /// Rebuilt from an id; upstream state unknown locally.
    Resumed,
    /// A delivery location is bound.
    LocationSet,
    /// This many triple dippers have been carted.
    Carted(usize),
    /// Customer and delivery details were submitted.
    CheckedOut,
    /// The order was placed. Terminal.
    Placed,
}

/// One upstream ordering session.
#[derive(Debug)]
pub struct Session {
    id: String,
    client: UpstreamClient,
    state: SessionState,
    carted: usize,
}

impl Session {
    /// Open a new anonymous session.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::SessionCookieMissing`] if the upstream never
    /// sets its session cookie, or a transport error.
    #[instrument(skip_all, fields(base_url = %config.base_url))]
    pub async fn start(config: &OrderingConfig) -> Result<Self> {
        let client = UpstreamClient::new(config, None).step("starting session")?;
        client
            .get(paths::HOME, &[])
            .await
            .step("starting session")?;
        let id = client.session_id().step("starting session")?;
        info!(session = %id, "session started");
        Ok(Self {
            id,
            client,
            state: SessionState::Anonymous,
            carted: 0,
        })
    }

    /// Rebuild a session from an id obtained earlier. Makes no request.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Http`] if the client cannot be built.
    pub fn resume(config: &OrderingConfig, id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        let client = UpstreamClient::new(config, Some(&id)).step("resuming session")?;
        Ok(Self {
            id,
            client,
            state: SessionState::Resumed,
            carted: 0,
        })
    }

    /// The upstream session id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Triple dippers carted through this handle.
    #[must_use]
    pub const fn carted(&self) -> usize {
        self.carted
    }

    /// Bind the nearest delivering location to the session.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Forbidden`] (inside a step) when there is no
    /// location nearby, it does not take online orders, or it does not
    /// deliver.
    #[instrument(skip_all, fields(session = %self.id))]
    ///
    /// The upstream keeps one cart per location, so binding a location empties
    /// the local cart count.
    pub async fn set_location(&mut self, address: &Address) -> Result<()> {
        self.bind_location(address)
            .await
            .inspect_err(log_refusal)
            .step("setting location")?;
        self.carted = 0;
        self.state = SessionState::LocationSet;
        info!("location set");
        Ok(())
    }

    async fn bind_location(&self, address: &Address) -> Result<()> {
        self.ensure_open()?;
        let page = search_locations(&self.client, address).await?;
        let location_id =
            tokens::nearest_location_id(&html::parse(&page)).step("finding nearest location")?;
        self.client
            .get(paths::ORDER, &[("rid", location_id.as_str())])
            .await
            .step("selecting location")?;
        Ok(())
    }

    /// Add one triple dipper to the cart.
    ///
    /// All three dippers are checked against the catalog before any request.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::BadRequest`] naming the first bad dipper,
    /// [`OrderingError::NotFound`] if an option is missing from the menu page,
    /// or [`OrderingError::Upstream`] if the upstream rejects the cart.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn cart(&mut self, order: &TripleDipper) -> Result<()> {
        self.add_to_cart(order).await.step("adding to cart")?;
        self.carted += 1;
        self.state = SessionState::Carted(self.carted);
        info!(carted = self.carted, "triple dipper carted");
        Ok(())
    }

    async fn add_to_cart(&self, order: &TripleDipper) -> Result<()> {
        self.ensure_open()?;
        order.check()?;
        let page = self
            .client
            .get(paths::TRIPLE_DIPPER, &[])
            .await
            .step("fetching menu")?;
        let form = selection_form(&page, order).step("selecting options")?;
        let body = self
            .client
            .post_form(paths::TRIPLE_DIPPER, &form)
            .await
            .step("posting cart")?;
        tokens::cart_confirmation(&body)
    }

    /// Submit customer and delivery details and return the order totals.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::EmptyCart`] without any request if nothing was
    /// carted through this handle, [`OrderingError::BadRequest`] for a bad
    /// phone or email, and [`OrderingError::Forbidden`] if the address is out
    /// of delivery range.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn checkout(&mut self, customer: &Customer, address: &Address) -> Result<OrderInfo> {
        let info = self
            .submit_checkout(customer, address)
            .await
            .inspect_err(log_refusal)
            .step("checking out")?;
        self.state = SessionState::CheckedOut;
        info!(
            subtotal = %info.subtotal,
            total = %info.total(),
            delivery_time = %info.delivery_time,
            "checked out"
        );
        Ok(info)
    }

    async fn submit_checkout(&self, customer: &Customer, address: &Address) -> Result<OrderInfo> {
        self.ensure_open()?;
        if self.carted == 0 {
            return Err(OrderingError::EmptyCart);
        }
        customer.validate()?;

        let page = self
            .client
            .get(paths::PICKUP, &[])
            .await
            .step("fetching checkout page")?;
        let (totals, scraped) = checkout_page(&page).step("reading checkout page")?;

        // The estimate and the checkout submission share one CSRF token.
        let estimate = self
            .client
            .post_form(
                paths::DELIVERY_ESTIMATE,
                &forms::estimate_form(&scraped.csrf, address),
            )
            .await
            .step("estimating delivery")?;
        let delivery_time = tokens::delivery_estimate(&estimate).step("estimating delivery")?;

        self.client
            .post_form(
                paths::PICKUP,
                &forms::checkout_form(customer, address, &scraped),
            )
            .await
            .step("submitting checkout")?;

        Ok(totals.with_delivery_time(delivery_time))
    }

    /// Pay and place the order, returning the fulfilling location.
    ///
    /// Validates `payment` first, which records its card network. On failure
    /// the session stays usable, so the caller may retry with another card.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::Payment`] for an invalid card, or
    /// [`OrderingError::NotFound`] if the confirmation page has no location.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn place(&mut self, payment: &mut PaymentMethod) -> Result<Location> {
        let location = self.pay(payment).await.step("placing order")?;
        self.state = SessionState::Placed;
        info!(location = %location.name, "order placed");
        Ok(location)
    }

    async fn pay(&self, payment: &mut PaymentMethod) -> Result<Location> {
        self.ensure_open()?;
        payment.validate()?;

        let page = self
            .client
            .get(paths::PAYMENT, &[])
            .await
            .step("fetching payment page")?;
        let csrf = tokens::csrf_token(&html::parse(&page)).step("reading payment page")?;
        let form = forms::payment_form(payment, &csrf)?;
        let body = self
            .client
            .post_form(paths::PAYMENT, &form)
            .await
            .step("submitting payment")?;
        tokens::placed_location(&html::parse(&body)).step("reading confirmation")
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state == SessionState::Placed {
            return Err(OrderingError::SessionClosed);
        }
        Ok(())
    }
}

/// List the locations near `address`, nearest first, without a session.
///
/// Nothing is bound upstream. Locations that are closed to online orders or do
/// not deliver are included with [`Location::delivery`] reporting the latter.
///
/// # Errors
///
/// Returns a transport error, or [`OrderingError::NotFound`] if a listed
/// location has no name.
#[instrument(skip_all, fields(base_url = %config.base_url))]
pub async fn find_locations(
    config: &OrderingConfig,
    address: &Address,
) -> Result<Vec<Location>> {
    let client = UpstreamClient::new(config, None).step("finding locations")?;
    let page = search_locations(&client, address)
        .await
        .step("finding locations")?;
    let found = tokens::locations(&html::parse(&page)).step("finding locations")?;
    info!(count = found.len(), "locations found");
    Ok(found)
}

async fn search_locations(client: &UpstreamClient, address: &Address) -> Result<String> {
    client
        .get(
            paths::LOCATION_RESULTS,
            &[("query", address.search_query().as_str())],
        )
        .await
        .step("searching locations")
}

fn log_refusal(err: &OrderingError) {
    if let Some(reason) = err.forbidden() {
        warn!(%reason, "upstream refused");
    }
}

/// Build the add-to-cart form from the triple dipper page.
///
/// Dipper `n` fills selection `n`; each item id is followed by its extras'.
fn selection_form(page: &str, order: &TripleDipper) -> Result<Form> {
    let doc = html::parse(page);
    let csrf = tokens::csrf_token(&doc)?;
    let mut selected = Vec::new();
    for (index, dipper) in order.dippers.iter().enumerate() {
        let item_id = tokens::item_id(&doc, dipper.item, index)?;
        let extra_ids = dipper
            .extras
            .iter()
            .map(|extra| tokens::extra_id(&doc, *extra, &item_id))
            .collect::<Result<Vec<_>>>()?;
        selected.push(item_id);
        selected.extend(extra_ids);
    }
    Ok(forms::cart_form(&csrf, &selected))
}

/// Read the totals and checkout tokens from the checkout page.
fn checkout_page(page: &str) -> Result<(Totals, CheckoutTokens)> {
    let doc = html::parse(page);
    let totals = tokens::order_info(&doc)?;
    let scraped = CheckoutTokens {
        csrf: tokens::csrf_token(&doc)?,
        asap: tokens::asap_date_time(&doc)?,
        transaction_id: tokens::transaction_id(&doc)?,
    };
    Ok((totals, scraped))
}
