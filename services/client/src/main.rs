use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use client::navigation::LogNavigator;
use client::state::AppState;
use common::config::ClientConfig;
use common::storage::{FileStore, KeyValueStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting B-Ticket client");

    let config = ClientConfig::from_env()?;
    let store = Arc::new(FileStore::new(&config.storage_path));
    let storage: Arc<dyn KeyValueStore> = store.clone();

    // Restoring repairs an unreadable store, so check it afterwards
    let app = AppState::init(config, storage, Arc::new(LogNavigator)).await;

    match store.health_check().await {
        Ok(_) => info!("Session storage at {} is usable", store.path().display()),
        Err(e) => warn!("Session storage at {} is not usable: {}", store.path().display(), e),
    }

    // Offline is not fatal; local commands such as logout still run
    app.api_reachable().await;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["login", email, password] => {
            let session = app.auth.login(email, password).await?;
            if let Some(user) = session.user {
                info!("Signed in as {} <{}>", user.name, user.email);
            }
        }
        ["logout"] => {
            let report = app.auth.logout().await?;
            match report.backend_error {
                Some(e) => warn!("Signed out locally; backend said: {}", e),
                None => info!("Signed out"),
            }
        }
        ["tickets"] => {
            for ticket in app.tickets.list().await? {
                let title = ticket
                    .event
                    .as_ref()
                    .map(|event| event.title.as_str())
                    .unwrap_or("Unknown event");
                info!(
                    "#{} {} x{} {} [{}]",
                    ticket.id,
                    title,
                    ticket.quantity,
                    ticket.total(),
                    ticket.status().presentation().label
                );
            }
        }
        ["events"] | [] => {
            let events = app.events.recent().await?;
            info!("{} recent events", events.len());
            for event in events {
                let price = event
                    .default_price()
                    .map(|price| price.money().to_string())
                    .unwrap_or_else(|| "no price".to_string());
                info!(
                    "#{} {} ({}) from {}",
                    event.id, event.title, event.location, price
                );
            }
        }
        other => {
            anyhow::bail!(
                "Unknown command {:?}; expected one of: events, tickets, login <email> <password>, logout",
                other
            );
        }
    }

    Ok(())
}
