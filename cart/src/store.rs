//! The cart store: one shared, persisted cart behind a synchronous API.
//!
//! [`CartStore`] owns a runtime [`Store`] running the [`CartReducer`]. Every
//! mutation is applied under the store's lock, written through to storage,
//! then published to subscribers, so observers see a total order consistent
//! with call order.

use crate::persistence::CartPersistence;
use crate::reducer::{CartAction, CartEnvironment, CartReducer, CartState};
use crate::storage::KeyValueStorage;
use crate::types::{Cart, Dish, DishId, RestaurantId};
use food_order_core::environment::Clock;
use food_order_core::persistence::StatePersistence;
use food_order_runtime::{Store, StoreConfig};
use std::sync::Arc;
use tokio::sync::broadcast;

type Inner = Store<CartState, CartAction, CartEnvironment, CartReducer>;

/// Shared handle to the cart
///
/// Cloning is cheap; all clones operate on the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Inner,
}

impl CartStore {
    /// Creates a store backed by `storage`, loading any persisted cart
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(storage, clock, StoreConfig::default())
    }

    /// Creates a store with a custom runtime configuration
    #[must_use]
    pub fn with_config(
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        Self::from_persistence(Arc::new(CartPersistence::new(storage)), clock, config)
    }

    /// Creates a store over any state persistence
    ///
    /// A `max_dispatch_depth` below 1 is raised to 1.
    #[must_use]
    pub fn from_persistence(
        persistence: Arc<dyn StatePersistence<CartState>>,
        clock: Arc<dyn Clock>,
        config: StoreConfig,
    ) -> Self {
        // Decrementing the last portion removes the line through one follow-up
        let config = config.with_max_dispatch_depth(config.max_dispatch_depth.max(1));
        let inner = Store::with_config(
            CartReducer::new(),
            CartEnvironment::new(clock),
            persistence,
            config,
        );
        Self { inner }
    }

    /// Snapshot of the current cart
    #[must_use]
    pub fn cart(&self) -> Option<Cart> {
        self.inner.state(|s| s.cart.clone())
    }

    /// Sum of quantities, 0 without a cart
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.inner.state(CartState::total_items)
    }

    /// Sum of `price × quantity`, 0 without a cart
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.inner.state(CartState::total_price)
    }

    /// Quantity of `dish_id`, 0 if absent
    #[must_use]
    pub fn item_quantity(&self, dish_id: &DishId) -> u32 {
        self.inner.state(|s| s.item_quantity(dish_id))
    }

    /// Whether adding a dish of `restaurant_id` would mix restaurants
    ///
    /// Callers check this before [`add_item`](Self::add_item) and ask the
    /// user to clear the cart first; `add_item` itself refuses silently.
    #[must_use]
    pub fn is_different_restaurant(&self, restaurant_id: &RestaurantId) -> bool {
        self.inner.state(|s| s.is_different_restaurant(restaurant_id))
    }

    /// Adds one portion of `dish`
    ///
    /// `restaurant_name` names the cart only if this call creates it.
    pub fn add_item(&self, dish: &Dish, restaurant_name: &str) {
        self.dispatch(CartAction::AddItem {
            dish: dish.clone(),
            restaurant_name: restaurant_name.to_string(),
        });
    }

    /// Adds one portion of a dish already in the cart
    pub fn increment_item(&self, dish_id: &DishId) {
        self.dispatch(CartAction::IncrementItem {
            dish_id: dish_id.clone(),
        });
    }

    /// Removes one portion, dropping the line at zero
    pub fn decrement_item(&self, dish_id: &DishId) {
        self.dispatch(CartAction::DecrementItem {
            dish_id: dish_id.clone(),
        });
    }

    /// Removes a line
    pub fn remove_item(&self, dish_id: &DishId) {
        self.dispatch(CartAction::RemoveItem {
            dish_id: dish_id.clone(),
        });
    }

    /// Drops the cart
    pub fn clear_cart(&self) {
        self.dispatch(CartAction::ClearCart);
    }

    /// Receives a [`CartState`] after every effective mutation
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartState> {
        self.inner.subscribe()
    }

    fn dispatch(&self, action: CartAction) {
        // The cart reducer dispatches at most one follow-up, so this only
        // fires on a misconfigured depth limit.
        if let Err(e) = self.inner.send(action) {
            tracing::error!(error = %e, "Cart action failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::CategoryId;
    use food_order_testing::test_clock;

    fn dish(id: &str) -> Dish {
        Dish {
            id: DishId::from(id),
            restaurant_id: RestaurantId::from("r1"),
            category_id: CategoryId::from("c1"),
            name: id.to_string(),
            description: String::new(),
            image_url: String::new(),
            price: 3.0,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn clones_share_the_same_cart() {
        let store = CartStore::new(Arc::new(MemoryStorage::new()), Arc::new(test_clock()));
        let other = store.clone();

        store.add_item(&dish("d1"), "Cafe");
        other.increment_item(&DishId::from("d1"));

        assert_eq!(store.item_quantity(&DishId::from("d1")), 2);
        assert!((store.total_price() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn store_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CartStore>();
    }
}
