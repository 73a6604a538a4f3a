use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::{AppConfig, Environment};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if matches!(config.environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let allowed = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

fn user_routes() -> Router<AppState> {
    use protected::{applications, attachments, messages, notifications, preferences, skills, users};

    Router::new()
        .route("/api/users", delete(users::delete))
        .route("/api/users/register", post(users::register))
        .route("/api/users/:user_id", get(users::get).put(users::update))
        .route("/api/users/:user_id/apply", post(applications::apply))
        .route("/api/users/:user_id/applied-for", get(applications::list))
        .route("/api/users/:user_id/applied-for/:job_id", get(applications::entry))
        .route(
            "/api/users/:user_id/applied-for/:job_id/status",
            put(applications::update_status),
        )
        .route("/api/users/:user_id/conversations", get(messages::list))
        .route(
            "/api/users/:user_id/conversations/:peer_id/messages",
            get(messages::history).post(messages::send),
        )
        .route("/api/users/:user_id/skills", get(skills::for_user))
        .route("/api/users/:user_id/profile", get(attachments::get_profile))
        .route("/api/users/:user_id/notifications", get(notifications::list))
        .route("/api/users/:user_id/preferences", get(preferences::list))
        .route("/api/jobs/:job_id/applicants", get(applications::applicants))
}

fn resource_routes() -> Router<AppState> {
    use protected::{attachments, notifications, preferences, skills};

    Router::new()
        // Skills
        .route("/api/skills", post(skills::create).get(skills::list_all))
        .route("/api/skills/match", post(skills::match_job))
        .route("/api/skills/:id", put(skills::update).delete(skills::delete))
        // Resumes and portfolio links
        .route("/api/attachments", post(attachments::upload))
        .route(
            "/api/attachments/portfolio/:id",
            put(attachments::update_portfolio).delete(attachments::delete_portfolio),
        )
        .route("/api/attachments/resume/:id", delete(attachments::delete_resume))
        // Notifications
        .route("/api/notifications", post(notifications::create))
        .route("/api/notifications/read-all", patch(notifications::mark_all_read))
        .route("/api/notifications/:id", delete(notifications::delete))
        .route("/api/notifications/:id/read", patch(notifications::mark_read))
        // Preferences
        .route("/api/preferences", post(preferences::create))
        .route(
            "/api/preferences/:id",
            put(preferences::update).delete(preferences::clear_field),
        )
}

/// Full application router: public routes, session-protected `/api` routes
/// and the global layers.
pub fn app(state: AppState) -> Router {
    let protected = user_routes()
        .merge(resource_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health))
        .route("/api/attachments/:id/download", get(public::attachments::download))
        // Protected
        .merge(protected)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.server.max_request_size_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}
