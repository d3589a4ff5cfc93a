//! # Food Order Cart
//!
//! A single-restaurant shopping cart that survives restarts.
//!
//! The cart is driven by a [`CartReducer`] running inside the synchronous
//! runtime store. Every effective mutation is written through to a
//! [`KeyValueStorage`] under [`CART_STORAGE_KEY`] and then published to
//! subscribers. The store refuses to mix dishes from two restaurants;
//! callers ask [`CartStore::is_different_restaurant`] first and clear the
//! cart with the user's consent.
//!
//! ## Example
//!
//! ```ignore
//! use food_order_cart::{CartStore, MemoryStorage};
//! use food_order_core::environment::SystemClock;
//! use std::sync::Arc;
//!
//! let store = CartStore::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock));
//!
//! if store.is_different_restaurant(&dish.restaurant_id) {
//!     // confirm with the user, then
//!     store.clear_cart();
//! }
//! store.add_item(&dish, &restaurant.name);
//! assert_eq!(store.item_quantity(&dish.id), 1);
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod persistence;
pub mod reducer;
pub mod storage;
pub mod store;
pub mod types;

pub use catalog::{Catalog, CatalogError, InMemoryCatalog};
pub use checkout::{
    Checkout, CreateOrderPayload, DeliveryLocation, DeliveryTarget, InMemoryOrderGateway,
    OrderError, OrderGateway, OrderItem, OrderReceipt,
};
pub use config::{CartConfig, StorageBackend};
pub use persistence::{CART_STORAGE_KEY, CartPersistence};
pub use reducer::{CartAction, CartEnvironment, CartReducer, CartState};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::CartStore;
pub use types::{Cart, CartItem, Category, CategoryId, Dish, DishId, Restaurant, RestaurantId};
