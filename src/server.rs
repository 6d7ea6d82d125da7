//! Server setup: adapter wiring, route registration and startup.

use std::error::Error;
use std::sync::Arc;

use axum::{extract::FromRef, middleware, Router};
use http::{header, HeaderName, HeaderValue, Method};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::adapters::auth::JwtSessionValidator;
use crate::adapters::http::middleware::{auth_middleware, AuthState, ACCESS_KEY_HEADER};
use crate::adapters::http::{
    bot_routes, health_routes, session_routes, widget_routes, BotHandlers, SessionHandlers,
    WidgetHandlers,
};
use crate::adapters::memory::{
    InMemoryBotConfigurationRepository, InMemoryMessageLog, InMemorySessionRegistry,
    InMemoryTenantDirectory,
};
use crate::adapters::postgres::{
    PostgresBotConfigurationRepository, PostgresMessageLog, PostgresSessionRegistry,
    PostgresTenantDirectory,
};
use crate::adapters::websocket::{websocket_router, RealtimeRouter, WebSocketState};
use crate::application::handlers::bot::{
    BotEngine, GetBotConfigurationHandler, GetWidgetBotHandler, UpdateBotConfigurationHandler,
};
use crate::application::handlers::conversation::{ConversationCoordinator, CoordinatorOptions};
use crate::application::handlers::session::{
    CloseSessionHandler, ListMessagesHandler, ListSessionsHandler, OpenWidgetSessionHandler,
};
use crate::config::{AppConfig, DatabaseConfig, ServerConfig};
use crate::ports::{
    BotConfigurationRepository, MessageLog, SessionRegistry, SessionValidator, TenantDirectory,
};

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Storage ports, backed by PostgreSQL or by memory.
#[derive(Clone)]
pub struct Ports {
    pub tenants: Arc<dyn TenantDirectory>,
    pub sessions: Arc<dyn SessionRegistry>,
    pub messages: Arc<dyn MessageLog>,
    pub bots: Arc<dyn BotConfigurationRepository>,
}

impl Ports {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            tenants: Arc::new(PostgresTenantDirectory::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRegistry::new(pool.clone())),
            messages: Arc::new(PostgresMessageLog::new(pool.clone())),
            bots: Arc::new(PostgresBotConfigurationRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            tenants: Arc::new(InMemoryTenantDirectory::new()),
            sessions: Arc::new(InMemorySessionRegistry::new()),
            messages: Arc::new(InMemoryMessageLog::new()),
            bots: Arc::new(InMemoryBotConfigurationRepository::new()),
        }
    }
}

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub ports: Ports,
    pub auth: AuthState,
    pub realtime: Arc<RealtimeRouter>,
    pub coordinator: Arc<ConversationCoordinator>,
    pub max_frame_bytes: usize,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl AppState {
    pub fn new(
        ports: Ports,
        validator: Arc<dyn SessionValidator>,
        queue_capacity: usize,
        max_frame_bytes: usize,
        options: CoordinatorOptions,
    ) -> Self {
        let realtime = Arc::new(RealtimeRouter::new(queue_capacity));
        let coordinator = ConversationCoordinator::new(
            ports.sessions.clone(),
            ports.messages.clone(),
            BotEngine::new(ports.bots.clone()),
            realtime.clone(),
            options,
        );

        Self {
            auth: AuthState::new(validator, ports.tenants.clone()),
            realtime,
            coordinator: Arc::new(coordinator),
            max_frame_bytes,
            ports,
        }
    }

    /// Wire state from loaded configuration.
    pub fn from_config(
        ports: Ports,
        validator: Arc<dyn SessionValidator>,
        config: &AppConfig,
    ) -> Self {
        Self::new(
            ports,
            validator,
            config.realtime.connection_queue_capacity,
            config.realtime.max_frame_bytes,
            config.bot.coordinator_options(),
        )
    }

    fn session_handlers(&self) -> SessionHandlers {
        let sessions = self.ports.sessions.clone();
        let messages = self.ports.messages.clone();
        SessionHandlers::new(
            Arc::new(ListSessionsHandler::new(sessions.clone(), messages.clone())),
            Arc::new(ListMessagesHandler::new(sessions.clone(), messages)),
            Arc::new(CloseSessionHandler::new(sessions)),
            self.coordinator.clone(),
        )
    }

    fn bot_handlers(&self) -> BotHandlers {
        BotHandlers::new(
            Arc::new(GetBotConfigurationHandler::new(self.ports.bots.clone())),
            Arc::new(UpdateBotConfigurationHandler::new(self.ports.bots.clone())),
        )
    }

    fn widget_handlers(&self) -> WidgetHandlers {
        WidgetHandlers::new(
            Arc::new(OpenWidgetSessionHandler::new(self.ports.sessions.clone())),
            Arc::new(GetWidgetBotHandler::new(self.ports.bots.clone())),
        )
    }

    fn websocket_state(&self) -> WebSocketState {
        WebSocketState {
            router: self.realtime.clone(),
            coordinator: self.coordinator.clone(),
            sessions: self.ports.sessions.clone(),
            auth: self.auth.clone(),
            max_frame_bytes: self.max_frame_bytes,
        }
    }
}

/// Assemble the full router.
///
/// - `GET /health` and `GET /ws` sit outside the auth middleware
/// - everything under `/api` resolves credentials first
pub fn build_router(state: &AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .nest("/sessions", session_routes(state.session_handlers()))
        .nest("/bot", bot_routes(state.bot_handlers()))
        .nest("/widget", widget_routes(state.widget_handlers()))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health_routes())
        .merge(websocket_router(state.websocket_state()))
        .nest("/api", api)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(cors_layer(server))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-access-key"),
        ]);

    if server.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

/// Build the connection pool, applying migrations when configured.
pub async fn connect_database(config: &DatabaseConfig) -> Result<PgPool, BoxError> {
    let pool = config.pool_options().connect(&config.url).await?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}

/// Wire adapters from configuration and serve until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<(), BoxError> {
    let ports = match &config.database {
        Some(database) => Ports::postgres(connect_database(database).await?),
        None => {
            tracing::warn!("No database configured, keeping all state in memory");
            Ports::in_memory()
        }
    };

    let validator = Arc::new(JwtSessionValidator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.as_deref(),
        config.auth.leeway_secs,
    ));
    let state = AppState::from_config(ports, validator, &config);
    let app = build_router(&state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, access_key_header = ACCESS_KEY_HEADER, "Live chat listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
