//! Domain types for the food-order cart.
//!
//! The catalog types ([`Restaurant`], [`Category`], [`Dish`]) are read-only
//! records handed to us by the catalog source. The cart types ([`Cart`],
//! [`CartItem`]) are owned by the cart store; a `CartItem` keeps a snapshot of
//! the dish as it was when it was first added, so a later catalog refetch
//! never changes what the user already committed to.
//!
//! All types serialize with camelCase field names, which is the shape the
//! catalog API and the persisted cart use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier from any string-like value
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the inner string value
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Unique identifier for a restaurant
    RestaurantId
);

string_id!(
    /// Unique identifier for a menu category within a restaurant
    CategoryId
);

string_id!(
    /// Unique identifier for a dish
    DishId
);

/// A restaurant listed in the catalog
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    /// Restaurant identifier
    pub id: RestaurantId,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Cover image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Cuisine tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A menu category of one restaurant
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier
    pub id: CategoryId,
    /// Owning restaurant
    pub restaurant_id: RestaurantId,
    /// Display name
    pub name: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Category image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A dish as served by the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    /// Dish identifier
    pub id: DishId,
    /// Owning restaurant
    pub restaurant_id: RestaurantId,
    /// Owning category
    pub category_id: CategoryId,
    /// Display name
    pub name: String,
    /// Description shown on the dish card
    pub description: String,
    /// Dish image
    pub image_url: String,
    /// Unit price
    pub price: f64,
    /// ISO 4217 currency code
    pub currency: String,
}

/// One dish line in the cart
///
/// Everything except `dish_id` and `quantity` is a snapshot taken when the
/// dish was first added and is never refreshed from the catalog.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Dish this line refers to (unique within a cart)
    pub dish_id: DishId,
    /// Number of portions, always at least 1
    pub quantity: u32,
    /// Dish name at add-time
    pub name: String,
    /// Unit price at add-time
    pub price: f64,
    /// Currency at add-time
    pub currency: String,
    /// Dish image at add-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Dish description at add-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CartItem {
    /// Snapshots `dish` into a new line with quantity 1
    #[must_use]
    pub fn snapshot(dish: &Dish) -> Self {
        Self {
            dish_id: dish.id.clone(),
            quantity: 1,
            name: dish.name.clone(),
            price: dish.price,
            currency: dish.currency.clone(),
            image_url: Some(dish.image_url.clone()),
            description: Some(dish.description.clone()),
        }
    }

    /// `price × quantity`
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// The single active shopping cart
///
/// Every item belongs to `restaurant_id`. A cart always has at least one
/// item; "no items" is represented by the absence of a cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Restaurant every item belongs to
    pub restaurant_id: RestaurantId,
    /// Restaurant display name captured when the cart was created
    pub restaurant_name: String,
    /// Lines in insertion order
    pub items: Vec<CartItem>,
    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a cart holding a single line
    #[must_use]
    pub fn new(
        restaurant_id: RestaurantId,
        restaurant_name: String,
        first_item: CartItem,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            restaurant_id,
            restaurant_name,
            items: vec![first_item],
            updated_at,
        }
    }

    /// Sum of all quantities
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of `price × quantity` over all lines
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// The line for `dish_id`, if any
    #[must_use]
    pub fn item(&self, dish_id: &DishId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.dish_id == dish_id)
    }

    /// Mutable access to the line for `dish_id`
    pub fn item_mut(&mut self, dish_id: &DishId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| &item.dish_id == dish_id)
    }

    /// Quantity of `dish_id`, or 0
    #[must_use]
    pub fn quantity_of(&self, dish_id: &DishId) -> u32 {
        self.item(dish_id).map_or(0, |item| item.quantity)
    }

    /// Whether the cart has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency of the first line, used to format totals
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.items.first().map(|item| item.currency.as_str())
    }
}
