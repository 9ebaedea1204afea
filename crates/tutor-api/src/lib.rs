//! # tutor-api
//!
//! axum HTTP server for the tutoring backend: notification CRUD and the
//! generation status contract polled by `tutor-poller`.
//!
//! All routes live under `/api/v1`; `/health` sits at the root.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tutor_core::{GenerationStatusRepository, NotificationRepository};
use tutor_db::{Database, MemoryGenerationStatusRepository, MemoryNotificationRepository};

pub use config::ApiConfig;
pub use error::ApiError;
pub use services::{GenerationService, NotificationService};

use handlers::{generation, notifications};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub notifications: NotificationService,
    pub generation: GenerationService,
}

impl AppState {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        generation: Arc<dyn GenerationStatusRepository>,
    ) -> Self {
        Self {
            notifications: NotificationService::new(notifications),
            generation: GenerationService::new(generation),
        }
    }

    pub fn from_database(db: &Database) -> Self {
        Self::new(
            Arc::new(db.notifications.clone()),
            Arc::new(db.generation.clone()),
        )
    }

    /// State backed by in-memory repositories.
    pub fn in_memory(
        notifications: MemoryNotificationRepository,
        generation: MemoryGenerationStatusRepository,
    ) -> Self {
        Self::new(Arc::new(notifications), Arc::new(generation))
    }
}

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Routes without middleware.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/notifications", post(notifications::create_notification))
        .route("/notifications/:id", delete(notifications::delete_notification))
        .route("/notifications/:id/read", patch(notifications::mark_read))
        .route(
            "/users/:user_id/notifications",
            get(notifications::list_notifications),
        )
        .route(
            "/users/:user_id/notifications/unread-count",
            get(notifications::count_unread),
        )
        .route(
            "/users/:user_id/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/users/:user_id/generation",
            get(generation::list_statuses).post(generation::start_all_generation),
        )
        .route(
            "/users/:user_id/subjects/:subject_id/generation",
            get(generation::get_status)
                .post(generation::start_generation)
                .patch(generation::update_status)
                .delete(generation::reset_generation),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api)
        .with_state(state)
}

/// Full application: routes plus tracing, request ids and CORS.
pub fn app(state: AppState, config: &ApiConfig) -> Router {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    router(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .max_age(Duration::from_secs(3600)),
        )
}
