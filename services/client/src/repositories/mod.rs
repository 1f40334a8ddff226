//! Typed access to backend resources

use serde::de::DeserializeOwned;

use crate::api::{ApiClient, ApiRequest};
use crate::error::{ClientError, ClientResult};
use crate::models::{Envelope, Paginated};

pub mod events;
pub mod membership;
pub mod payments;
pub mod tickets;

pub use events::EventRepository;
pub use membership::{FavoritesRepository, MembershipRepository, WishlistRepository};
pub use payments::PaymentRepository;
pub use tickets::TicketRepository;

/// Fetch a `{data: {data: [...]}}` list
async fn fetch_page<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
    fallback: &'static str,
) -> ClientResult<Vec<T>> {
    let envelope: Envelope<Paginated<T>> = api
        .send(ApiRequest::get(path).fallback(fallback))
        .await?;

    // An empty account comes back without a page at all
    Ok(envelope
        .into_optional(fallback)?
        .map(|page| page.data)
        .unwrap_or_default())
}

/// Fetch a `{data: ...}` record, mapping null data to `NotFound`
async fn fetch_one<T: DeserializeOwned>(
    api: &ApiClient,
    path: &str,
    fallback: &'static str,
    not_found: &'static str,
) -> ClientResult<T> {
    let envelope: Envelope<T> = api
        .send(ApiRequest::get(path).fallback(fallback))
        .await?;

    envelope.into_data(fallback, || ClientError::NotFound(not_found.to_string()))
}
