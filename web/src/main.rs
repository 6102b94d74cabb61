//! EventEase HTTP server binary.

use eventease_core::event::{CategoryInventory, Event, TicketInventory};
use eventease_core::store::{MemoryRepository, PostgresRepository, TicketingRepository};
use eventease_core::types::TicketCategory;
use eventease_core::user::{User, UserRole};
use eventease_web::auth::{Identity, StaticTokenSessions};
use eventease_web::{build_router, AppState, Config};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventease=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EventEase HTTP server");

    let config = Config::from_env();

    let sessions = StaticTokenSessions::from_spec(&config.auth.static_tokens);

    let repository: Arc<dyn TicketingRepository> = match &config.store.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL store...");
            let store = PostgresRepository::connect(url).await?;
            store.migrate().await?;
            info!("PostgreSQL store ready");
            Arc::new(store)
        }
        None => {
            info!("No DATABASE_URL set, using in-memory store");
            let store = Arc::new(MemoryRepository::new());
            if config.store.seed_demo {
                seed_demo_data(store.as_ref(), &sessions).await?;
            }
            store
        }
    };

    let state = AppState::new(repository, Arc::new(sessions));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Seeds a fresh in-memory store with a demo event, an admin and a user,
/// and registers `admin-token` / `user-token` static sessions for them.
async fn seed_demo_data(
    repository: &MemoryRepository,
    sessions: &StaticTokenSessions,
) -> anyhow::Result<()> {
    let admin = User::new(
        eventease_core::types::UserId::new(),
        "Demo Admin",
        "admin@eventease.local",
    )
    .with_role(UserRole::Admin);
    let user = User::new(
        eventease_core::types::UserId::new(),
        "Demo User",
        "user@eventease.local",
    )
    .with_wallet(100_000);

    sessions.register(
        "admin-token",
        Identity {
            user_id: admin.id,
            role: UserRole::Admin,
        },
    );
    sessions.register(
        "user-token",
        Identity {
            user_id: user.id,
            role: UserRole::User,
        },
    );

    let event = Event {
        id: eventease_core::types::EventId::new(),
        name: "EventEase Launch Party".to_string(),
        description: "Demo event seeded on startup".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap_or_default(),
        time: "20:00".to_string(),
        location: "Grand Arena".to_string(),
        image_url: None,
        inventory: demo_inventory(),
        created_at: Utc::now(),
    };

    info!(
        event_id = %event.id,
        admin_id = %admin.id,
        user_id = %user.id,
        "Seeding demo data (tokens: admin-token, user-token)"
    );

    repository.insert_user(&admin).await?;
    repository.insert_user(&user).await?;
    repository.insert_event(&event).await?;
    Ok(())
}

fn demo_inventory() -> TicketInventory {
    let mut inventory = TicketInventory::default();
    for (category, remaining, price) in [
        (TicketCategory::Vvip, 10, 50_000),
        (TicketCategory::Vip, 50, 20_000),
        (TicketCategory::Standard, 200, 5_000),
    ] {
        *inventory.category_mut(category) = CategoryInventory {
            remaining,
            issued: 0,
            price,
        };
    }
    inventory
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}
