use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware, routing::get};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

use crate::docs::ApiDoc;
use crate::logging::logging_middleware;
use crate::metrics::metrics_middleware;
use crate::modules::auth::router::init_auth_router;
use crate::modules::classes::router::init_classes_router;
use crate::modules::students::router::init_students_router;
use crate::modules::system::router::init_system_router;
use crate::state::{AppState, UPLOADS_URL_PREFIX};

pub fn init_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let api_v1 = Router::new()
        .nest("/auth", init_auth_router(&state))
        .merge(init_classes_router())
        .merge(init_students_router(state.upload_config.max_file_size));

    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .merge(init_system_router())
        .nest("/api/v1", api_v1)
        .nest_service(
            UPLOADS_URL_PREFIX,
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ))
                .service(ServeDir::new(&state.upload_config.upload_dir)),
        );

    if let Some(handle) = metrics_handle {
        router = router.route(
            "/metrics",
            get(move || std::future::ready(handle.render())),
        );
    }

    router
        .with_state(state.clone())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(logging_middleware))
                .layer(middleware::from_fn(metrics_middleware))
                .layer(cors_layer(&state)),
        )
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = state
        .cors_config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}
