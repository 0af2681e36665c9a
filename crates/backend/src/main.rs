use axum::http::{header, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod db;
mod directory;
pub mod error;
mod handlers;
mod routes;
mod schema;
#[cfg(test)]
mod testing;

use crate::auth::types::AuthConfig;
use crate::auth::{CredentialVerifier, GoogleVerifier, RequestAuthorizer, SessionIssuer};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::directory::PgTenantDirectory;

/// Shared, read-only application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub auth_config: Arc<AuthConfig>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub issuer: Arc<SessionIssuer>,
    pub authorizer: RequestAuthorizer,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let AppConfig {
        database_url,
        port,
        cors_allowed_origins,
        auth: auth_config,
    } = AppConfig::from_env()?;
    let auth_config = Arc::new(auth_config);

    // Establish database connection pool
    let pool = db::establish_connection_pool(&database_url)?;

    // Wire the auth boundary explicitly
    let verifier = GoogleVerifier::new(&auth_config)?;
    let directory = PgTenantDirectory::new(pool.clone());
    let state = AppState {
        pool,
        auth_config: auth_config.clone(),
        verifier: Arc::new(verifier),
        issuer: Arc::new(SessionIssuer::new(
            auth_config.clone(),
            Arc::new(directory),
        )),
        authorizer: RequestAuthorizer::new(auth_config.clone()),
    };

    tracing::info!(
        "Sessions signed with {:?}, valid for {:?}",
        auth_config.algorithm,
        auth_config.token_ttl
    );

    let app = routes::api_routes(state)
        .layer(build_cors_layer(cors_allowed_origins))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build CORS layer based on configuration.
///
/// If CORS_ALLOWED_ORIGINS is set, only those origins are allowed.
/// If not set, defaults to permissive CORS (for development only).
fn build_cors_layer(allowed_origins: Option<Vec<String>>) -> CorsLayer {
    match allowed_origins {
        Some(origins) => {
            let origins: Vec<_> = origins.iter().filter_map(|s| s.parse().ok()).collect();

            if origins.is_empty() {
                tracing::warn!(
                    "CORS_ALLOWED_ORIGINS is set but empty, using permissive CORS (not recommended for production)"
                );
                CorsLayer::permissive()
            } else {
                tracing::info!("CORS configured for origins: {:?}", origins);
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                    .allow_credentials(true)
            }
        }
        None => {
            tracing::warn!(
                "CORS_ALLOWED_ORIGINS not set, using permissive CORS (not recommended for production)"
            );
            CorsLayer::permissive()
        }
    }
}
