//! Catalog source: restaurants, categories and dishes.
//!
//! The catalog is a read-only collaborator. The cart never calls it; the
//! presentation layer fetches dishes here and hands them to
//! [`CartStore::add_item`](crate::store::CartStore::add_item).

use crate::types::{Category, CategoryId, Dish, Restaurant, RestaurantId};
use parking_lot::RwLock;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors from a catalog source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Restaurant does not exist
    #[error("restaurant not found: {0}")]
    RestaurantNotFound(RestaurantId),

    /// Source could not be reached
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Boxed future returned by [`Catalog`] methods
pub type CatalogFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CatalogError>> + Send + 'a>>;

/// Read-only access to the restaurant catalog
pub trait Catalog: Send + Sync {
    /// All restaurants
    fn fetch_restaurants(&self) -> CatalogFuture<'_, Vec<Restaurant>>;

    /// Categories of one restaurant
    fn fetch_categories(&self, restaurant_id: &RestaurantId) -> CatalogFuture<'_, Vec<Category>>;

    /// Dishes of one category
    fn fetch_dishes(
        &self,
        restaurant_id: &RestaurantId,
        category_id: &CategoryId,
    ) -> CatalogFuture<'_, Vec<Dish>>;
}

#[derive(Debug, Default)]
struct CatalogData {
    restaurants: Vec<Restaurant>,
    categories: Vec<Category>,
    dishes: Vec<Dish>,
}

/// Catalog held in memory
///
/// Clones share the same data, so a test can update a dish after the
/// presentation layer fetched it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    data: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a restaurant
    #[must_use]
    pub fn with_restaurant(self, restaurant: Restaurant) -> Self {
        self.data.write().restaurants.push(restaurant);
        self
    }

    /// Adds a category
    #[must_use]
    pub fn with_category(self, category: Category) -> Self {
        self.data.write().categories.push(category);
        self
    }

    /// Adds a dish
    #[must_use]
    pub fn with_dish(self, dish: Dish) -> Self {
        self.upsert_dish(dish);
        self
    }

    /// Inserts `dish`, replacing any dish with the same id
    pub fn upsert_dish(&self, dish: Dish) {
        let mut data = self.data.write();
        match data.dishes.iter_mut().find(|d| d.id == dish.id) {
            Some(existing) => *existing = dish,
            None => data.dishes.push(dish),
        }
    }

    fn ensure_restaurant(&self, restaurant_id: &RestaurantId) -> Result<(), CatalogError> {
        if self.data.read().restaurants.iter().any(|r| &r.id == restaurant_id) {
            Ok(())
        } else {
            Err(CatalogError::RestaurantNotFound(restaurant_id.clone()))
        }
    }
}

impl Catalog for InMemoryCatalog {
    fn fetch_restaurants(&self) -> CatalogFuture<'_, Vec<Restaurant>> {
        let restaurants = self.data.read().restaurants.clone();
        Box::pin(async move { Ok(restaurants) })
    }

    fn fetch_categories(&self, restaurant_id: &RestaurantId) -> CatalogFuture<'_, Vec<Category>> {
        let result = self.ensure_restaurant(restaurant_id).map(|()| {
            self.data
                .read()
                .categories
                .iter()
                .filter(|c| &c.restaurant_id == restaurant_id)
                .cloned()
                .collect()
        });
        Box::pin(async move { result })
    }

    fn fetch_dishes(
        &self,
        restaurant_id: &RestaurantId,
        category_id: &CategoryId,
    ) -> CatalogFuture<'_, Vec<Dish>> {
        let result = self.ensure_restaurant(restaurant_id).map(|()| {
            self.data
                .read()
                .dishes
                .iter()
                .filter(|d| &d.restaurant_id == restaurant_id && &d.category_id == category_id)
                .cloned()
                .collect()
        });
        Box::pin(async move { result })
    }
}
