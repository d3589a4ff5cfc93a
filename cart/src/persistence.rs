//! Persistence adapter for the cart.
//!
//! Stores exactly one cart-or-absence value under [`CART_STORAGE_KEY`],
//! wrapped in a `{ "cart": ... }` envelope. Both directions are best-effort:
//! unreadable or corrupt data loads as "no cart", and failed writes are
//! logged and dropped. The in-memory store stays authoritative either way.

use crate::reducer::CartState;
use crate::storage::KeyValueStorage;
use crate::types::Cart;
use food_order_core::persistence::StatePersistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage key holding the persisted cart
pub const CART_STORAGE_KEY: &str = "food-order-cart";

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    cart: Option<Cart>,
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    cart: Option<&'a Cart>,
}

/// Loads and saves the cart through a [`KeyValueStorage`]
#[derive(Clone)]
pub struct CartPersistence {
    storage: Arc<dyn KeyValueStorage>,
}

impl CartPersistence {
    /// Creates an adapter over `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Reads the persisted cart
    ///
    /// Returns `None` when the key is missing, the backend fails, the value
    /// does not parse, or the stored cart has no items.
    #[must_use]
    pub fn load(&self) -> Option<Cart> {
        let raw = match self.storage.get(CART_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read persisted cart");
                return None;
            },
        };

        match serde_json::from_str::<Envelope>(&raw) {
            Ok(Envelope { cart }) => cart.filter(|cart| !cart.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt persisted cart");
                None
            },
        }
    }

    /// Overwrites the persisted cart with `cart`
    pub fn save(&self, cart: Option<&Cart>) {
        let json = match serde_json::to_string(&EnvelopeRef { cart }) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize cart");
                return;
            },
        };

        if let Err(e) = self.storage.set(CART_STORAGE_KEY, &json) {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }
}

impl StatePersistence<CartState> for CartPersistence {
    fn restore(&self) -> CartState {
        let cart = self.load();
        tracing::debug!(restored = cart.is_some(), "Cart restored from storage");
        CartState::new(cart)
    }

    fn persist(&self, state: &CartState) {
        self.save(state.cart.as_ref());
    }
}
