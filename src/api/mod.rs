use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::registry::ConnectionRegistry;
use crate::common::state::AppState;
use crate::models::ParticipantKind;
use crate::models::sessions::Session;
use crate::settings::AppSettings;
use crate::usecases::sessions;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::routing::get;
use sqlx::{MySql, Pool};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub mod chat;
pub mod v1;

pub struct RequestContext {
    pub db: Pool<MySql>,
    pub registry: Arc<ConnectionRegistry>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/ws/chat", get(chat::handler))
        .nest("/api/v1", v1::router())
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let app = router().with_state(state);

    let addr = SocketAddr::from((settings.app_host, settings.app_port));
    let listener = TcpListener::bind(addr).await?;
    info!("goshop-chat-service listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> &'static str {
    "Running goshop-chat-service v0.1"
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            db: state.db.clone(),
            registry: state.registry.clone(),
        })
    }
}

impl Context for RequestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }
}

/// Authenticated REST caller. The synchronous API carries the same handshake
/// triple the socket carries: a bearer token plus the identity pair in
/// `X-User-Id` / `X-User-Type`.
pub struct Principal(pub Session);

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::SessionsInvalidToken)?;
        let participant_id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| i64::from_str(value).ok())
            .ok_or(AppError::DecodingRequestFailed)?;
        let kind = parts
            .headers
            .get("x-user-type")
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::DecodingRequestFailed)?;
        let kind = ParticipantKind::try_from(kind)?;

        let session = sessions::authenticate(&ctx, token, participant_id, kind).await?;
        Ok(Principal(session))
    }
}
