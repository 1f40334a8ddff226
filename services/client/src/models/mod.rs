//! Client models for API payloads

pub mod envelope;
pub mod event;
pub mod money;
pub mod payment;
pub mod ticket;
pub mod user;

// Re-export for convenience
pub use envelope::{Envelope, Paginated};
pub use event::{Category, Event, EventMedia, EventPrice, EventPromo};
pub use money::Money;
pub use payment::{PaymentMethod, PaymentReceipt, PaymentRequest, PaymentToken};
pub use ticket::Ticket;
pub use user::{PictureUpload, Profile, ProfileUpdate, User};

/// Deserialize an identifier sent either as a JSON number or a numeric string
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Number(id) => Ok(id),
        RawId::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
