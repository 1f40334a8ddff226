//! Payment request and response payloads

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::deserialize_id;

/// How the user pays for a ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Hosted card checkout, completed in an embedded browser
    Card,
    /// Mobile money, confirmed on the payer's phone
    Mobile,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Mobile => "mobile",
        }
    }
}

/// Body of `POST /payTicket`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRequest {
    pub event_id: i64,
    pub price_id: i64,
    /// Amount to charge: unit price times `quantity`, not the unit price
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub currency: String,
    pub quantity: u32,
    pub method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// `data` of a successful payment submission
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentReceipt {
    /// Pending ticket created for this payment
    #[serde(deserialize_with = "deserialize_id")]
    pub ticket_id: i64,
    /// Hosted checkout page, card payments only
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// `data` of `GET /token`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentToken {
    #[serde(default)]
    pub success: bool,
    pub token: String,
}
