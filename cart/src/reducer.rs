//! Reducer logic for the cart.
//!
//! The reducer enforces the single-restaurant rule and the "empty cart is no
//! cart" rule. Every effective mutation ends with a write-through (persist,
//! then notify); refused or unmatched actions produce no effects at all.

use crate::types::{Cart, CartItem, Dish, DishId, RestaurantId};
use chrono::{DateTime, Utc};
use food_order_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Effects returned by the cart reducer
type CartEffects = SmallVec<[Effect<CartAction>; 4]>;

/// State owned by the cart store: the cart, or its absence
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// The active cart; `None` whenever there are no items
    pub cart: Option<Cart>,
}

impl CartState {
    /// Creates a state holding `cart`
    #[must_use]
    pub const fn new(cart: Option<Cart>) -> Self {
        Self { cart }
    }

    /// Sum of quantities across all items, 0 without a cart
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.cart.as_ref().map_or(0, Cart::total_items)
    }

    /// Sum of `price × quantity` across all items, 0 without a cart
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.cart.as_ref().map_or(0.0, Cart::total_price)
    }

    /// Quantity of `dish_id` in the cart, 0 if absent
    #[must_use]
    pub fn item_quantity(&self, dish_id: &DishId) -> u32 {
        self.cart.as_ref().map_or(0, |cart| cart.quantity_of(dish_id))
    }

    /// Whether adding a dish of `restaurant_id` would mix restaurants
    ///
    /// `false` when there is no cart (or it has no items); otherwise `true`
    /// iff the cart belongs to another restaurant.
    #[must_use]
    pub fn is_different_restaurant(&self, restaurant_id: &RestaurantId) -> bool {
        self.cart
            .as_ref()
            .is_some_and(|cart| !cart.is_empty() && &cart.restaurant_id != restaurant_id)
    }
}

/// Actions the cart reducer accepts
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    /// Add one portion of `dish`, creating the cart if needed
    AddItem {
        /// Catalog record to snapshot
        dish: Dish,
        /// Restaurant name used only when this creates the cart
        restaurant_name: String,
    },

    /// Add one portion of a dish already in the cart
    IncrementItem {
        /// Dish to increment
        dish_id: DishId,
    },

    /// Remove one portion; the last portion removes the line
    DecrementItem {
        /// Dish to decrement
        dish_id: DishId,
    },

    /// Remove a line entirely
    RemoveItem {
        /// Dish to remove
        dish_id: DishId,
    },

    /// Drop the cart
    ClearCart,
}

/// Environment dependencies for the cart reducer
#[derive(Clone)]
pub struct CartEnvironment {
    /// Clock for `updated_at` timestamps
    pub clock: Arc<dyn Clock>,
}

impl CartEnvironment {
    /// Creates a new `CartEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

/// Reducer for the cart
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn add_item(
        state: &mut CartState,
        dish: &Dish,
        restaurant_name: String,
        now: DateTime<Utc>,
    ) -> CartEffects {
        if state.is_different_restaurant(&dish.restaurant_id) {
            tracing::warn!(
                cart_restaurant_id = ?state.cart.as_ref().map(|c| c.restaurant_id.as_str()),
                dish_restaurant_id = %dish.restaurant_id,
                "Attempted to add dish from a different restaurant without clearing cart"
            );
            return SmallVec::new();
        }

        if !dish.price.is_finite() {
            tracing::warn!(
                dish_id = %dish.id,
                price = dish.price,
                "Refusing dish with non-finite price"
            );
            return SmallVec::new();
        }

        match state.cart.as_mut().filter(|cart| !cart.is_empty()) {
            Some(cart) => {
                match cart.item_mut(&dish.id) {
                    Some(item) => item.quantity = item.quantity.saturating_add(1),
                    None => cart.items.push(CartItem::snapshot(dish)),
                }
                cart.updated_at = now;
            },
            None => {
                state.cart = Some(Cart::new(
                    dish.restaurant_id.clone(),
                    restaurant_name,
                    CartItem::snapshot(dish),
                    now,
                ));
            },
        }

        tracing::info!(dish_id = %dish.id, name = %dish.name, "dish_added");
        smallvec![Effect::write_through()]
    }

    fn increment_item(state: &mut CartState, dish_id: &DishId, now: DateTime<Utc>) -> CartEffects {
        let Some(cart) = state.cart.as_mut() else {
            tracing::debug!(%dish_id, "Increment ignored, no cart");
            return SmallVec::new();
        };
        let Some(item) = cart.item_mut(dish_id) else {
            tracing::debug!(%dish_id, "Increment ignored, dish not in cart");
            return SmallVec::new();
        };

        item.quantity = item.quantity.saturating_add(1);
        cart.updated_at = now;
        smallvec![Effect::write_through()]
    }

    fn decrement_item(state: &mut CartState, dish_id: DishId, now: DateTime<Utc>) -> CartEffects {
        let Some(cart) = state.cart.as_mut() else {
            tracing::debug!(%dish_id, "Decrement ignored, no cart");
            return SmallVec::new();
        };
        let Some(item) = cart.item_mut(&dish_id) else {
            tracing::debug!(%dish_id, "Decrement ignored, dish not in cart");
            return SmallVec::new();
        };

        if item.quantity <= 1 {
            return smallvec![Effect::dispatch(CartAction::RemoveItem { dish_id })];
        }

        item.quantity -= 1;
        cart.updated_at = now;
        smallvec![Effect::write_through()]
    }

    fn remove_item(state: &mut CartState, dish_id: &DishId, now: DateTime<Utc>) -> CartEffects {
        let Some(cart) = state.cart.as_mut() else {
            tracing::debug!(%dish_id, "Remove ignored, no cart");
            return SmallVec::new();
        };

        let before = cart.items.len();
        cart.items.retain(|item| &item.dish_id != dish_id);
        if cart.items.len() == before {
            tracing::debug!(%dish_id, "Remove ignored, dish not in cart");
            return SmallVec::new();
        }

        if cart.items.is_empty() {
            state.cart = None;
        } else {
            cart.updated_at = now;
        }

        tracing::info!(%dish_id, "dish_removed");
        smallvec![Effect::write_through()]
    }
}

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Environment = CartEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> CartEffects {
        match action {
            CartAction::AddItem {
                dish,
                restaurant_name,
            } => Self::add_item(state, &dish, restaurant_name, env.clock.now()),
            CartAction::IncrementItem { dish_id } => {
                Self::increment_item(state, &dish_id, env.clock.now())
            },
            CartAction::DecrementItem { dish_id } => {
                Self::decrement_item(state, dish_id, env.clock.now())
            },
            CartAction::RemoveItem { dish_id } => {
                Self::remove_item(state, &dish_id, env.clock.now())
            },
            CartAction::ClearCart => {
                state.cart = None;
                tracing::info!("cart_cleared");
                smallvec![Effect::write_through()]
            },
        }
    }
}
