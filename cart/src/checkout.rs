//! Order submission.
//!
//! [`Checkout`] turns the current cart into a [`CreateOrderPayload`], hands
//! it to an [`OrderGateway`] and clears the cart only once the gateway
//! accepted the order. A failed submission leaves the cart untouched so the
//! user can retry.

use crate::store::CartStore;
use crate::types::{Cart, DishId, RestaurantId};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use thiserror::Error;

#[allow(clippy::expect_used)] // literal pattern
static MAPS_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^https?://(www\.)?(google\.[a-z.]+/maps|maps\.google\.[a-z.]+|goo\.gl/maps|maps\.app\.goo\.gl)\S*",
    )
    .expect("maps link pattern compiles")
});

/// Whether `url` (after trimming) looks like a Google Maps link
#[must_use]
pub fn is_valid_maps_link(url: &str) -> bool {
    MAPS_LINK.is_match(url.trim())
}

/// Errors from placing an order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// There is nothing to order
    #[error("cart is empty")]
    EmptyCart,

    /// The delivery link is not a maps link
    #[error("invalid Google Maps link: {0}")]
    InvalidMapsLink(String),

    /// The backend refused the order
    #[error("{0}")]
    Rejected(String),

    /// The backend could not be reached
    #[error("order service unavailable: {0}")]
    Unavailable(String),
}

/// GPS coordinates
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryLocation {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

/// Where to deliver; exactly one per order
#[derive(Clone, Debug, PartialEq)]
pub enum DeliveryTarget {
    /// Device location
    Location(DeliveryLocation),
    /// Link pasted by the user
    MapsLink(String),
}

/// One ordered line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Ordered dish
    pub dish_id: DishId,
    /// Portions
    pub quantity: u32,
}

/// Body of a create-order request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    /// Restaurant of the cart
    pub restaurant_id: RestaurantId,
    /// Lines in cart order
    pub items: Vec<OrderItem>,
    /// Set for [`DeliveryTarget::Location`]
    pub delivery_location: Option<DeliveryLocation>,
    /// Set for [`DeliveryTarget::MapsLink`], trimmed
    pub google_maps_url: Option<String>,
    /// Trimmed comment, absent when blank
    pub comment: Option<String>,
}

impl CreateOrderPayload {
    /// Builds a payload from a cart snapshot
    #[must_use]
    pub fn from_cart(cart: &Cart, delivery: &DeliveryTarget, comment: &str) -> Self {
        let (delivery_location, google_maps_url) = match delivery {
            DeliveryTarget::Location(location) => (Some(*location), None),
            DeliveryTarget::MapsLink(url) => (None, Some(url.trim().to_string())),
        };
        let comment = comment.trim();

        Self {
            restaurant_id: cart.restaurant_id.clone(),
            items: cart
                .items
                .iter()
                .map(|item| OrderItem {
                    dish_id: item.dish_id.clone(),
                    quantity: item.quantity,
                })
                .collect(),
            delivery_location,
            google_maps_url,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        }
    }
}

/// Response of an accepted order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    /// Backend order id
    pub order_id: String,
    /// Backend order status
    pub status: String,
}

/// Boxed future returned by [`OrderGateway::create_order`]
pub type OrderFuture<'a> = Pin<Box<dyn Future<Output = Result<OrderReceipt, OrderError>> + Send + 'a>>;

/// The order backend
pub trait OrderGateway: Send + Sync {
    /// Submits an order
    fn create_order(&self, payload: CreateOrderPayload) -> OrderFuture<'_>;
}

/// Gateway that records payloads instead of calling a backend
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    submitted: Mutex<Vec<CreateOrderPayload>>,
    next_id: AtomicU64,
    failure: Mutex<Option<OrderError>>,
}

impl InMemoryOrderGateway {
    /// Creates a gateway that accepts every order
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent orders fail with `error` (or succeed again with `None`)
    pub fn fail_with(&self, error: Option<OrderError>) {
        *self.failure.lock() = error;
    }

    /// Payloads accepted so far
    #[must_use]
    pub fn submitted(&self) -> Vec<CreateOrderPayload> {
        self.submitted.lock().clone()
    }
}

impl OrderGateway for InMemoryOrderGateway {
    fn create_order(&self, payload: CreateOrderPayload) -> OrderFuture<'_> {
        Box::pin(async move {
            let failure = self.failure.lock().clone();
            if let Some(error) = failure {
                return Err(error);
            }
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            self.submitted.lock().push(payload);
            Ok(OrderReceipt {
                order_id: format!("order-{id}"),
                status: "pending".to_string(),
            })
        })
    }
}

/// Places orders for the cart in `store`
pub struct Checkout<G: OrderGateway + ?Sized> {
    store: CartStore,
    gateway: Arc<G>,
}

impl<G: OrderGateway + ?Sized> Checkout<G> {
    /// Creates a checkout over `store` and `gateway`
    #[must_use]
    pub const fn new(store: CartStore, gateway: Arc<G>) -> Self {
        Self { store, gateway }
    }

    /// Submits the current cart
    ///
    /// The cart is cleared only after the gateway accepted the order.
    ///
    /// # Errors
    ///
    /// - [`OrderError::EmptyCart`] when there is no cart
    /// - [`OrderError::InvalidMapsLink`] for a link that is not a maps link
    /// - whatever the gateway returned; the cart is kept in that case
    pub async fn place_order(
        &self,
        delivery: DeliveryTarget,
        comment: &str,
    ) -> Result<OrderReceipt, OrderError> {
        let cart = self
            .store
            .cart()
            .filter(|cart| !cart.is_empty())
            .ok_or(OrderError::EmptyCart)?;

        if let DeliveryTarget::MapsLink(url) = &delivery {
            if !is_valid_maps_link(url) {
                return Err(OrderError::InvalidMapsLink(url.trim().to_string()));
            }
        }

        let payload = CreateOrderPayload::from_cart(&cart, &delivery, comment);
        tracing::info!(
            restaurant_id = %cart.restaurant_id,
            item_count = cart.items.len(),
            "checkout_submit"
        );

        match self.gateway.create_order(payload).await {
            Ok(receipt) => {
                tracing::info!(order_id = %receipt.order_id, "checkout_success");
                self.store.clear_cart();
                Ok(receipt)
            },
            Err(e) => {
                tracing::warn!(error = %e, "checkout_failure");
                Err(e)
            },
        }
    }
}
