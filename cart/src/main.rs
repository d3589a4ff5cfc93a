//! Food order cart demo.
//!
//! Walks through a browse → add → checkout session against an in-memory
//! catalog and order gateway, persisting the cart with the configured
//! storage backend.
//!
//! # Usage
//!
//! ```bash
//! # Persist to ./.food-order/food-order-cart.json
//! cargo run --bin food-order-cart
//!
//! # Keep everything in memory, with runtime traces
//! FOOD_ORDER_STORAGE=memory RUST_LOG=debug cargo run --bin food-order-cart
//! ```

use anyhow::Context;
use food_order_cart::{
    CartConfig, CartStore, Catalog, Category, Checkout, DeliveryTarget, Dish, InMemoryCatalog,
    InMemoryOrderGateway, Restaurant,
};
use food_order_core::environment::SystemClock;
use food_order_runtime::metrics::register_metrics;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn demo_catalog() -> InMemoryCatalog {
    let restaurant = |id: &str, name: &str| Restaurant {
        id: id.into(),
        name: name.to_string(),
        description: None,
        image_url: None,
        tags: vec![],
    };
    let dish = |id: &str, restaurant: &str, category: &str, name: &str, price: f64| Dish {
        id: id.into(),
        restaurant_id: restaurant.into(),
        category_id: category.into(),
        name: name.to_string(),
        description: String::new(),
        image_url: format!("https://img.example/{id}.png"),
        price,
        currency: "USD".to_string(),
    };

    InMemoryCatalog::new()
        .with_restaurant(restaurant("r1", "Pizza Place"))
        .with_restaurant(restaurant("r2", "Sushi Bar"))
        .with_category(Category {
            id: "pizza".into(),
            restaurant_id: "r1".into(),
            name: "Pizza".to_string(),
            description: None,
            image_url: None,
        })
        .with_category(Category {
            id: "rolls".into(),
            restaurant_id: "r2".into(),
            name: "Rolls".to_string(),
            description: None,
            image_url: None,
        })
        .with_dish(dish("margherita", "r1", "pizza", "Margherita", 9.5))
        .with_dish(dish("diavola", "r1", "pizza", "Diavola", 11.0))
        .with_dish(dish("california", "r2", "rolls", "California Roll", 7.0))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "food_order_cart=info,food_order_runtime=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    register_metrics();

    let config = CartConfig::from_env();
    info!(?config, "Starting food order cart");

    let storage = config
        .build_storage()
        .context("failed to open cart storage")?;
    let store = CartStore::with_config(storage, Arc::new(SystemClock), config.store_config());
    info!(
        items = store.total_items(),
        "Restored cart from previous session"
    );

    let mut changes = store.subscribe();
    let observer = tokio::spawn(async move {
        loop {
            match changes.recv().await {
                Ok(state) => info!(
                    items = state.total_items(),
                    total = state.total_price(),
                    "Cart changed"
                ),
                Err(RecvError::Lagged(skipped)) => info!(skipped, "Observer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let catalog = demo_catalog();
    let restaurants = catalog.fetch_restaurants().await?;
    let pizza_place = restaurants
        .iter()
        .find(|r| r.id.as_str() == "r1")
        .context("demo restaurant missing")?;
    let pizzas = catalog
        .fetch_dishes(&pizza_place.id, &"pizza".into())
        .await?;

    store.clear_cart();
    for pizza in &pizzas {
        store.add_item(pizza, &pizza_place.name);
    }
    if let Some(first) = pizzas.first() {
        store.increment_item(&first.id);
    }

    let sushi = catalog
        .fetch_dishes(&"r2".into(), &"rolls".into())
        .await?;
    if let Some(roll) = sushi.first() {
        if store.is_different_restaurant(&roll.restaurant_id) {
            info!(dish = %roll.name, "Dish is from another restaurant, keeping current cart");
        }
    }

    info!(
        items = store.total_items(),
        total = store.total_price(),
        "Ready to check out"
    );

    let gateway = Arc::new(InMemoryOrderGateway::new());
    let checkout = Checkout::new(store.clone(), gateway);
    let receipt = checkout
        .place_order(
            DeliveryTarget::MapsLink("https://maps.app.goo.gl/demo".to_string()),
            "Please ring twice",
        )
        .await?;
    info!(order_id = %receipt.order_id, status = %receipt.status, "Order placed");

    drop(checkout);
    drop(store);
    observer.await?;

    Ok(())
}
