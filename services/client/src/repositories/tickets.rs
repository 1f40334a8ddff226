//! Ticket access

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::Ticket;

/// Ticket repository
#[derive(Clone)]
pub struct TicketRepository {
    api: ApiClient,
}

impl TicketRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Tickets bought by the signed-in user
    pub async fn list(&self) -> ClientResult<Vec<Ticket>> {
        super::fetch_page(&self.api, "/tickets", "Failed to load tickets").await
    }

    /// Find a ticket by id
    pub async fn get_by_id(&self, id: i64) -> ClientResult<Ticket> {
        super::fetch_one(
            &self.api,
            &format!("/tickets/{}", id),
            "Failed to load ticket",
            "Ticket not found",
        )
        .await
    }
}
