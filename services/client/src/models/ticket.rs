//! Ticket model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Event, Money, deserialize_id};
use crate::ticket_status::{self, TicketStatus};

/// Ticket purchase record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default)]
    pub reference: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub unit_amount: Decimal,
    #[serde(default)]
    pub total_amount: Decimal,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub type_ticket: Option<String>,
    /// QR code image path, rendered as-is
    #[serde(default)]
    pub qrcode: Option<String>,
    #[serde(default)]
    pub is_refunded: Option<i64>,
    #[serde(default)]
    pub scanned_by: Option<String>,
    #[serde(default)]
    pub used_at: Option<String>,
    /// Payment outcome: null while pending, 1 paid, 0 failed
    #[serde(default)]
    pub success: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub event: Option<Event>,
}

fn one() -> u32 {
    1
}

impl Ticket {
    pub fn status(&self) -> TicketStatus {
        ticket_status::resolve(self.success, self.used_at.as_deref())
    }

    pub fn total(&self) -> Money {
        Money::new(self.total_amount, self.currency.clone())
    }

    pub fn is_refunded(&self) -> bool {
        self.is_refunded.unwrap_or(0) != 0
    }

    /// Absolute URL of the QR code image
    pub fn qr_code_url(&self, app_url: &str) -> Option<String> {
        let path = self.qrcode.as_deref()?.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        Some(format!(
            "{}/{}",
            app_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}
