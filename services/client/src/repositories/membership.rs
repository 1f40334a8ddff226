//! Favorites and wishlist
//!
//! Both are per-user sets of events with the same add/remove/list shape,
//! so they share one repository parameterized by their endpoints.

use tracing::info;

use crate::api::{ApiClient, ApiRequest};
use crate::error::ClientResult;
use crate::models::{Envelope, Event};

/// Endpoints of one event set
#[derive(Debug, Clone, Copy)]
struct Endpoints {
    label: &'static str,
    list: &'static str,
    add: &'static str,
    remove: &'static str,
}

const FAVORITES: Endpoints = Endpoints {
    label: "favorites",
    list: "/favorites/list",
    add: "/favorites/add",
    remove: "/favorites/remove",
};

const WISHLIST: Endpoints = Endpoints {
    label: "wishlist",
    list: "/wishlist/events",
    add: "/wishlist/add",
    remove: "/wishlist/remove",
};

/// A per-user set of events
#[derive(Clone)]
pub struct MembershipRepository {
    api: ApiClient,
    endpoints: Endpoints,
}

/// The user's favorite events
pub type FavoritesRepository = MembershipRepository;
/// Events the user plans to attend
pub type WishlistRepository = MembershipRepository;

impl MembershipRepository {
    pub fn favorites(api: ApiClient) -> FavoritesRepository {
        Self {
            api,
            endpoints: FAVORITES,
        }
    }

    pub fn wishlist(api: ApiClient) -> WishlistRepository {
        Self {
            api,
            endpoints: WISHLIST,
        }
    }

    /// Events currently in the set
    pub async fn list(&self) -> ClientResult<Vec<Event>> {
        super::fetch_page(&self.api, self.endpoints.list, "Failed to load events").await
    }

    pub async fn add(&self, event_id: i64) -> ClientResult<()> {
        info!("Adding event {} to {}", event_id, self.endpoints.label);
        self.post(self.endpoints.add, event_id, "Failed to add event").await
    }

    pub async fn remove(&self, event_id: i64) -> ClientResult<()> {
        info!("Removing event {} from {}", event_id, self.endpoints.label);
        self.post(self.endpoints.remove, event_id, "Failed to remove event")
            .await
    }

    /// Flip membership using the caller's view of it
    ///
    /// Issues exactly one call: `remove` when `currently_member`, `add`
    /// otherwise. Returns the new membership.
    pub async fn toggle(&self, event_id: i64, currently_member: bool) -> ClientResult<bool> {
        if currently_member {
            self.remove(event_id).await?;
        } else {
            self.add(event_id).await?;
        }

        Ok(!currently_member)
    }

    async fn post(&self, base: &str, event_id: i64, fallback: &'static str) -> ClientResult<()> {
        let envelope: Envelope<serde_json::Value> = self
            .api
            .send(ApiRequest::post(format!("{}/{}", base, event_id)).fallback(fallback))
            .await?;

        envelope.into_optional(fallback)?;
        Ok(())
    }
}
