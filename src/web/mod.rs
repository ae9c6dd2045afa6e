use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{CACHE_CONTROL, WWW_AUTHENTICATE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, get_service, post, put},
    Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::state::AppState;

pub mod extract;
pub mod middleware;
pub mod routes;

use self::middleware::{auth as auth_middleware, error_details};
use self::routes::{account, activities, follow, photos, profiles};

const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    // Everything except login/register needs a bearer token.
    let protected_routes = Router::new()
        .route(
            "/activities",
            get(activities::list_activities_handler).post(activities::create_activity_handler),
        )
        .route(
            "/activities/:id",
            get(activities::activity_details_handler)
                .put(activities::edit_activity_handler)
                .delete(activities::delete_activity_handler),
        )
        .route(
            "/activities/:id/attend",
            post(activities::attend_activity_handler),
        )
        .route("/account", get(account::current_user_handler))
        .route("/profiles", put(profiles::edit_profile_handler))
        .route("/profiles/:username", get(profiles::profile_handler))
        .route(
            "/profiles/:username/activities",
            get(profiles::profile_activities_handler),
        )
        .route(
            "/photos",
            post(photos::add_photo_handler).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        .route("/photos/:id/setMain", post(photos::set_main_photo_handler))
        .route("/photos/:id", axum::routing::delete(photos::delete_photo_handler))
        .route(
            "/follow/:username",
            get(follow::list_followings_handler)
                .post(follow::follow_handler)
                .delete(follow::unfollow_handler),
        )
        .layer(from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    let public_routes = Router::new()
        .route("/account/login", post(account::login_handler))
        .route("/account/register", post(account::register_handler));

    let uploads = get_service(ServeDir::new(&state.config.upload_dir));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .nest_service("/uploads", uploads)
        .layer(from_fn_with_state(
            state.clone(),
            error_details::expose_error_details,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.client_origin.as_deref() {
        Some(raw) => match HeaderValue::from_str(raw) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                warn!(origin = %raw, error = %e, "invalid CLIENT_ORIGIN, allowing any origin");
                AllowOrigin::any()
            }
        },
        None => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .expose_headers([WWW_AUTHENTICATE, activities::PAGINATION])
}
