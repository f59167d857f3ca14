//! Application Startup
//!
//! Two-phase construction: every collaborator is built first, then wired
//! into the pipeline and the shared application state. No component
//! reaches for another through ambient/static access.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{ModerationGate, ProfanityFilter};
use crate::config::Settings;
use crate::domain::{IdentityProvider, UserLogRepository};
use crate::infrastructure::auth::JwtIdentityProvider;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgBanRepository, PgChatRepository, PgMessageRepository, PgUserLogRepository,
};
use crate::presentation::http::routes;
use crate::presentation::middleware::{create_cors_layer, create_trace_layer};
use crate::presentation::websocket::{Broadcaster, MessagePipeline, SessionRegistry};
use crate::shared::crypto::EncryptionAdapter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub settings: Arc<Settings>,
    pub registry: Arc<SessionRegistry>,
    pub identity: Arc<dyn IdentityProvider>,
    pub audit: Arc<dyn UserLogRepository>,
    pub pipeline: Arc<MessagePipeline>,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        // Create database pool and bring the schema up to date
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");
        database::run_migrations(&db).await?;
        tracing::info!("Database migrations applied");

        // Immutable-after-startup components
        let crypto = Arc::new(EncryptionAdapter::new(&settings.crypto.secret));
        let filter = Arc::new(ProfanityFilter::load(
            Path::new(&settings.profanity.dir),
            &settings.profanity.languages,
        ));

        // Collaborators
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(JwtIdentityProvider::new(&settings.jwt.secret));
        let audit: Arc<dyn UserLogRepository> = Arc::new(PgUserLogRepository::new(db.clone()));
        let bans = Arc::new(PgBanRepository::new(db.clone()));
        let chats = Arc::new(PgChatRepository::new(db.clone()));
        let messages = Arc::new(PgMessageRepository::new(db.clone()));

        // Chat core: registry first, then everything that fans out
        // through it
        let registry = Arc::new(SessionRegistry::new());
        let pipeline = Arc::new(MessagePipeline::new(
            ModerationGate::new(bans),
            filter,
            crypto,
            messages,
            chats,
            Broadcaster::new(registry.clone()),
        ));

        let state = AppState {
            db,
            settings: Arc::new(settings.clone()),
            registry,
            identity,
            audit,
            pipeline,
        };

        // Build router with middleware
        let router = routes::create_router(state)
            .layer(create_trace_layer())
            .layer(create_cors_layer(&settings.cors));

        // Bind to address
        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
