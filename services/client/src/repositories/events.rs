//! Event catalog access

use tracing::debug;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ClientResult;
use crate::models::envelope::{Categories, RecentEvents};
use crate::models::{Category, Envelope, Event};

/// Event repository
#[derive(Clone)]
pub struct EventRepository {
    api: ApiClient,
}

impl EventRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Most recently published events
    pub async fn recent(&self) -> ClientResult<Vec<Event>> {
        let body: RecentEvents = self
            .api
            .send(ApiRequest::get("/event/recents").fallback("Failed to load recent events"))
            .await?;

        debug!("Loaded {} recent events", body.recent_events.len());
        Ok(body.recent_events)
    }

    /// Events with the most favorites
    pub async fn popular(&self) -> ClientResult<Vec<Event>> {
        let envelope: Envelope<Vec<Event>> = self
            .api
            .send(ApiRequest::get("/favorites/popular").fallback("Failed to load popular events"))
            .await?;

        Ok(envelope
            .into_optional("Failed to load popular events")?
            .unwrap_or_default())
    }

    /// Find an event by id
    pub async fn get_by_id(&self, id: i64) -> ClientResult<Event> {
        super::fetch_one(
            &self.api,
            &format!("/events/{}", id),
            "Failed to load event",
            "Event not found",
        )
        .await
    }

    /// All event categories
    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        let body: Categories = self
            .api
            .send(ApiRequest::get("/categories").fallback("Failed to load categories"))
            .await?;

        Ok(body.categories)
    }
}
