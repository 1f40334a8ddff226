//! Ticket purchase flow
//!
//! `PaymentFlow` holds the booking choices for one event (price category,
//! quantity, payment method) and drives the purchase:
//!
//! ```text
//! Selecting -> Submitting -> AwaitingExternalCheckout (card)
//!                         -> Confirmed (mobile money)
//! AwaitingExternalCheckout -> Completed (approved | cancelled | declined)
//! ```
//!
//! Every terminal outcome navigates to the created ticket. The outcome only
//! changes the notification.

use std::sync::Arc;

use reqwest::Url;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};
use crate::models::{Event, EventPrice, Money, PaymentMethod, PaymentRequest};
use crate::navigation::{Navigator, Notification, Route};
use crate::repositories::PaymentRepository;
use crate::validation;

/// Smallest number of tickets per booking
pub const MIN_QUANTITY: u32 = 1;
/// Largest number of tickets per booking
pub const MAX_QUANTITY: u32 = 10;

/// How a hosted checkout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Approved,
    Cancelled,
    Declined,
}

impl CheckoutOutcome {
    /// Detect the outcome from a checkout navigation URL
    ///
    /// Only path segments are inspected, so a query parameter such as
    /// `?return=/cancel` does not end the checkout.
    pub fn from_url(url: &str) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        let segments = url.path_segments()?;

        segments.filter(|segment| !segment.is_empty()).find_map(|segment| {
            match segment.to_ascii_lowercase().as_str() {
                "approve" | "approved" => Some(CheckoutOutcome::Approved),
                "cancel" | "cancelled" | "canceled" => Some(CheckoutOutcome::Cancelled),
                "decline" | "declined" => Some(CheckoutOutcome::Declined),
                _ => None,
            }
        })
    }

    pub fn notification(&self) -> Notification {
        match self {
            CheckoutOutcome::Approved => Notification::success("Payment approved"),
            CheckoutOutcome::Cancelled => Notification::warning("Payment cancelled"),
            CheckoutOutcome::Declined => Notification::error("Payment declined"),
        }
    }
}

/// Where the purchase stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentPhase {
    /// Choosing price, quantity and method
    Selecting,
    /// Request in flight
    Submitting,
    /// Card payment waiting on the hosted checkout page
    AwaitingExternalCheckout { ticket_id: i64, checkout_url: String },
    /// Mobile-money payment created; confirmation happens on the phone
    Confirmed { ticket_id: i64 },
    /// Hosted checkout finished
    Completed {
        ticket_id: i64,
        outcome: CheckoutOutcome,
    },
}

/// Purchase flow for one event
pub struct PaymentFlow {
    event: Event,
    price_id: Option<i64>,
    quantity: u32,
    method: PaymentMethod,
    phone: String,
    phase: PaymentPhase,
    payments: PaymentRepository,
    navigator: Arc<dyn Navigator>,
}

impl PaymentFlow {
    /// Start a purchase with the default price preselected
    pub fn new(event: Event, payments: PaymentRepository, navigator: Arc<dyn Navigator>) -> Self {
        let price_id = event.default_price().map(|price| price.id);

        Self {
            event,
            price_id,
            quantity: MIN_QUANTITY,
            method: PaymentMethod::Card,
            phone: String::new(),
            phase: PaymentPhase::Selecting,
            payments,
            navigator,
        }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn phase(&self) -> &PaymentPhase {
        &self.phase
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn selected_price(&self) -> Option<&EventPrice> {
        self.price_id.and_then(|id| self.event.price(id))
    }

    /// Select a price category of the event
    pub fn select_price(&mut self, price_id: i64) -> ClientResult<()> {
        if self.event.price(price_id).is_none() {
            return Err(ClientError::Validation(
                "Selected price is not available".to_string(),
            ));
        }

        self.price_id = Some(price_id);
        Ok(())
    }

    pub fn increment(&mut self) -> u32 {
        self.set_quantity(self.quantity.saturating_add(1))
    }

    pub fn decrement(&mut self) -> u32 {
        self.set_quantity(self.quantity.saturating_sub(1))
    }

    /// Set the ticket count, clamped to the allowed range
    pub fn set_quantity(&mut self, quantity: u32) -> u32 {
        self.quantity = quantity.clamp(MIN_QUANTITY, MAX_QUANTITY);
        self.quantity
    }

    pub fn select_method(&mut self, method: PaymentMethod) {
        self.method = method;
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    /// Selected price times quantity, in the price's currency
    pub fn total(&self) -> Option<Money> {
        self.selected_price()
            .map(|price| price.money().times(self.quantity))
    }

    /// Build the payment request from the current choices
    pub fn build_request(&self) -> ClientResult<PaymentRequest> {
        let price = self
            .selected_price()
            .ok_or_else(|| ClientError::Validation("Please select a ticket price".to_string()))?;

        let phone = match self.method {
            PaymentMethod::Mobile => {
                validation::validate_phone(&self.phone)?;
                Some(self.phone.trim().to_string())
            }
            PaymentMethod::Card => None,
        };

        let total = price.money().times(self.quantity);
        Ok(PaymentRequest {
            event_id: self.event.id,
            price_id: price.id,
            amount: total.amount,
            currency: total.currency,
            quantity: self.quantity,
            method: self.method,
            phone,
        })
    }

    /// Submit the payment
    ///
    /// A card payment moves to `AwaitingExternalCheckout` with the hosted
    /// checkout URL. A mobile-money payment (or a card payment the backend
    /// settled without a checkout page) moves to `Confirmed` and navigates
    /// to the ticket. On error the flow returns to `Selecting`.
    pub async fn submit(&mut self) -> ClientResult<&PaymentPhase> {
        if self.phase != PaymentPhase::Selecting {
            return Err(ClientError::Validation(
                "Payment already submitted".to_string(),
            ));
        }

        let request = self.build_request()?;
        self.phase = PaymentPhase::Submitting;

        let receipt = match self.payments.pay(&request).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Payment submission failed: {}", e);
                self.phase = PaymentPhase::Selecting;
                return Err(e);
            }
        };

        self.phase = match (self.method, receipt.redirect_url) {
            (PaymentMethod::Card, Some(checkout_url)) => {
                info!("Opening hosted checkout for ticket {}", receipt.ticket_id);
                PaymentPhase::AwaitingExternalCheckout {
                    ticket_id: receipt.ticket_id,
                    checkout_url,
                }
            }
            _ => {
                self.navigator.navigate(Route::TicketDetail {
                    ticket_id: receipt.ticket_id,
                });
                PaymentPhase::Confirmed {
                    ticket_id: receipt.ticket_id,
                }
            }
        };

        Ok(&self.phase)
    }

    /// Feed a navigation event from the hosted checkout page
    ///
    /// Returns the notification to show when the URL ends the checkout.
    /// Other URLs, or calls outside the checkout phase, return `None`.
    pub fn on_checkout_navigation(&mut self, url: &str) -> Option<Notification> {
        let PaymentPhase::AwaitingExternalCheckout { ticket_id, .. } = self.phase else {
            return None;
        };
        let outcome = CheckoutOutcome::from_url(url)?;

        info!("Checkout for ticket {} ended: {:?}", ticket_id, outcome);
        self.phase = PaymentPhase::Completed { ticket_id, outcome };
        self.navigator.navigate(Route::TicketDetail { ticket_id });

        Some(outcome.notification())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::models::EventPrice;
    use crate::navigation::ChannelNavigator;
    use common::config::ClientConfig;
    use rust_decimal::Decimal;

    fn event() -> Event {
        serde_json::from_value(serde_json::json!({
            "id": 5,
            "title": "Jazz Night",
            "prices": [
                {"id": 1, "amount": 80.0, "currency": "USD", "category": "VIP"},
                {"id": 2, "amount": 25.5, "currency": "USD", "category": "Standard"}
            ]
        }))
        .unwrap()
    }

    fn flow() -> (PaymentFlow, tokio::sync::mpsc::UnboundedReceiver<Route>) {
        let config = ClientConfig::with_api_url("http://127.0.0.1:9").unwrap();
        let payments = PaymentRepository::new(ApiClient::builder(&config).build());
        let (navigator, routes) = ChannelNavigator::new();
        (PaymentFlow::new(event(), payments, Arc::new(navigator)), routes)
    }

    #[test]
    fn test_new_flow_preselects_standard_price() {
        let (flow, _) = flow();
        assert_eq!(flow.selected_price().map(|price: &EventPrice| price.id), Some(2));
        assert_eq!(flow.quantity(), 1);
        assert_eq!(flow.phase(), &PaymentPhase::Selecting);
    }

    #[test]
    fn test_quantity_is_clamped() {
        let (mut flow, _) = flow();
        assert_eq!(flow.decrement(), 1);
        assert_eq!(flow.set_quantity(42), MAX_QUANTITY);
        assert_eq!(flow.increment(), MAX_QUANTITY);
        assert_eq!(flow.set_quantity(0), MIN_QUANTITY);
    }

    #[test]
    fn test_total_follows_selection() {
        let (mut flow, _) = flow();
        flow.set_quantity(3);
        assert_eq!(flow.total().unwrap().amount, Decimal::new(7650, 2));

        flow.select_price(1).unwrap();
        assert_eq!(flow.total().unwrap().to_string(), "240.00 USD");
        assert!(flow.select_price(99).is_err());
    }

    #[test]
    fn test_mobile_request_requires_phone() {
        let (mut flow, _) = flow();
        flow.select_method(PaymentMethod::Mobile);
        assert!(matches!(
            flow.build_request(),
            Err(ClientError::Validation(_))
        ));

        flow.set_phone("+243 812 345 678");
        let request = flow.build_request().unwrap();
        assert_eq!(request.phone.as_deref(), Some("+243 812 345 678"));
        assert_eq!(request.method, PaymentMethod::Mobile);
    }

    #[test]
    fn test_outcome_from_url_uses_path_segments() {
        assert_eq!(
            CheckoutOutcome::from_url("https://pay.example/checkout/approve?token=1"),
            Some(CheckoutOutcome::Approved)
        );
        assert_eq!(
            CheckoutOutcome::from_url("https://pay.example/checkout/Declined"),
            Some(CheckoutOutcome::Declined)
        );
        assert_eq!(
            CheckoutOutcome::from_url("https://pay.example/checkout?next=/cancel"),
            None
        );
        assert_eq!(CheckoutOutcome::from_url("not a url"), None);
    }

    #[test]
    fn test_navigation_outside_checkout_is_ignored() {
        let (mut flow, mut routes) = flow();
        assert_eq!(
            flow.on_checkout_navigation("https://pay.example/approve"),
            None
        );
        assert!(routes.try_recv().is_err());
    }

    #[test]
    fn test_request_amount_is_line_total() {
        let (mut flow, _) = flow();
        flow.set_quantity(3);

        let request = flow.build_request().unwrap();

        assert_eq!(request.quantity, 3);
        assert_eq!(request.amount, Decimal::new(7650, 2));
        assert_eq!(request.currency, "USD");
        assert_eq!(request.price_id, 2);
    }
}
