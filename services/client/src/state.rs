//! Application state shared across screens

use std::sync::Arc;

use common::config::ClientConfig;
use common::storage::KeyValueStore;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::models::Event;
use crate::navigation::Navigator;
use crate::payment::PaymentFlow;
use crate::repositories::{
    EventRepository, FavoritesRepository, MembershipRepository, PaymentRepository,
    TicketRepository, WishlistRepository,
};
use crate::session::SessionState;

/// Application state shared across screens
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub session: SessionState,
    pub api: ApiClient,
    pub navigator: Arc<dyn Navigator>,
    pub auth: AuthService,
    pub events: EventRepository,
    pub favorites: FavoritesRepository,
    pub wishlist: WishlistRepository,
    pub tickets: TicketRepository,
    pub payments: PaymentRepository,
}

impl AppState {
    /// Restore the stored session and wire the API client to it
    pub async fn init(
        config: ClientConfig,
        store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let session = SessionState::new(store);
        session.restore().await;

        let api = ApiClient::builder(&config)
            .session_interceptors(&session, Arc::clone(&navigator))
            .build();
        info!("API client ready for {}", api.base_url());

        Self {
            auth: AuthService::new(api.clone(), session.clone()),
            events: EventRepository::new(api.clone()),
            favorites: MembershipRepository::favorites(api.clone()),
            wishlist: MembershipRepository::wishlist(api.clone()),
            tickets: TicketRepository::new(api.clone()),
            payments: PaymentRepository::new(api.clone()),
            config,
            session,
            api,
            navigator,
        }
    }

    /// Ping the API, logging the outcome
    ///
    /// Never fails: an unreachable backend only means remote calls will
    /// error, while local operations keep working.
    pub async fn api_reachable(&self) -> bool {
        match self.api.health_check().await {
            Ok(true) => {
                info!("API at {} is reachable", self.api.base_url());
                true
            }
            Ok(false) => {
                warn!("API at {} reports a server error", self.api.base_url());
                false
            }
            Err(e) => {
                warn!("API at {} is unreachable: {}", self.api.base_url(), e);
                false
            }
        }
    }

    /// Start a purchase for an event
    pub fn payment_flow(&self, event: Event) -> PaymentFlow {
        PaymentFlow::new(event, self.payments.clone(), Arc::clone(&self.navigator))
    }
}
