//! Event catalog models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Money, deserialize_id};

/// Price category selected by default when an event offers it
pub const STANDARD_CATEGORY: &str = "standard";

/// Event category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Media attached to an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMedia {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    pub original_url: String,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// One purchasable price category of an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPrice {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub category: String,
    #[serde(default)]
    pub event_id: Option<i64>,
}

impl EventPrice {
    pub fn money(&self) -> Money {
        Money::new(self.amount, self.currency.clone())
    }

    pub fn is_standard(&self) -> bool {
        self.category.trim().eq_ignore_ascii_case(STANDARD_CATEGORY)
    }
}

/// Promotion code attached to an event price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPromo {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub promo_type: Option<String>,
    #[serde(default)]
    pub active: i64,
}

/// Catalog event. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time_start: Option<String>,
    #[serde(default)]
    pub time_end: Option<String>,
    #[serde(default)]
    pub max_ticket: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_picture: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub media: Vec<EventMedia>,
    #[serde(default)]
    pub prices: Vec<EventPrice>,
    #[serde(default)]
    pub promos: Vec<EventPromo>,
}

impl Event {
    /// Price preselected for a booking: the first standard category, else
    /// the first listed price
    pub fn default_price(&self) -> Option<&EventPrice> {
        self.prices
            .iter()
            .find(|price| price.is_standard())
            .or_else(|| self.prices.first())
    }

    pub fn price(&self, price_id: i64) -> Option<&EventPrice> {
        self.prices.iter().find(|price| price.id == price_id)
    }

    /// Calendar date of the event, when the backend sent a parseable one
    pub fn starts_on(&self) -> Option<NaiveDate> {
        let date = self.date.as_deref()?;
        // Some endpoints send a full timestamp
        let day = date.get(..10).unwrap_or(date);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    /// Image to show on cards: the first media item, else the legacy image
    pub fn cover_url(&self) -> Option<&str> {
        self.media
            .first()
            .map(|media| media.original_url.as_str())
            .or(self.image.as_deref())
    }

    /// Effective category id, whether sent flat or nested
    pub fn category_key(&self) -> Option<i64> {
        self.category_id
            .or_else(|| self.category.as_ref().map(|category| category.id))
    }
}
