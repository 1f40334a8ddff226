//! Payment submission

use tracing::info;

use crate::api::{ApiClient, ApiRequest};
use crate::error::{ClientError, ClientResult};
use crate::models::{Envelope, PaymentReceipt, PaymentRequest, PaymentToken};

/// Payment repository
#[derive(Clone)]
pub struct PaymentRepository {
    api: ApiClient,
}

impl PaymentRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Submit a payment, creating a pending ticket
    pub async fn pay(&self, request: &PaymentRequest) -> ClientResult<PaymentReceipt> {
        info!(
            "Submitting {} payment for event {} (price {}, quantity {})",
            request.method.as_str(),
            request.event_id,
            request.price_id,
            request.quantity
        );

        let envelope: Envelope<PaymentReceipt> = self
            .api
            .send(
                ApiRequest::post("/payTicket")
                    .fallback("Payment failed")
                    .json(request)?,
            )
            .await?;

        let receipt = envelope.into_data("Payment failed", || {
            ClientError::Decode("payment response has no ticket".to_string())
        })?;
        info!("Payment accepted, pending ticket {}", receipt.ticket_id);

        Ok(receipt)
    }

    /// Fetch a token for the payment gateway
    pub async fn payment_token(&self) -> ClientResult<PaymentToken> {
        let envelope: Envelope<PaymentToken> = self
            .api
            .send(ApiRequest::get("/token").fallback("Failed to get payment token"))
            .await?;

        envelope.into_data("Failed to get payment token", || {
            ClientError::Decode("payment token response has no data".to_string())
        })
    }
}
