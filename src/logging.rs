use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use schoolbook_config::AppConfig;
use std::path::Path;
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Reuses the caller's `x-request-id` when it is a sane token, otherwise mints one.
fn request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 64)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Logs every request inside an `http_request` span carrying the request id,
/// and echoes the id back in the response headers.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = request_id(&req);

    let span = info_span!("http_request", request_id = %request_id, method = %method, path = %path);
    let mut response = next.run(req).instrument(span.clone()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();
    span.in_scope(|| match status {
        500..=599 => error!(status, latency_ms, "Server error"),
        400..=499 => warn!(status, latency_ms, "Client error"),
        _ => info!(status, latency_ms, "Request completed"),
    });

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Splits `LOG_FILE` into the directory and file-name prefix for the rolling appender.
fn log_file_parts(log_file: &str) -> (&Path, String) {
    let path = Path::new(log_file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app.log".to_string());
    (dir, name)
}

/// Installs the console and daily-rolling file subscribers.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init_tracing(config: &AppConfig) -> anyhow::Result<WorkerGuard> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    let default_directive = format!(
        "{krate}={level},schoolbook_core={level},tower_http=warn,sqlx=warn",
        krate = env!("CARGO_CRATE_NAME"),
        level = config.log_level
    );

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&default_directive));

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(config.debug)
        .with_line_number(config.debug)
        .compact()
        .with_filter(console_filter);

    let (log_dir, file_name) = log_file_parts(&config.log_file);
    std::fs::create_dir_all(log_dir)?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, log_dir, file_name));

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_current_span(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new(&default_directive));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()?;

    info!(log_file = %config.log_file, level = %config.log_level, "Tracing initialized");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    #[test]
    fn test_request_id_reuses_incoming_header() {
        let req = http::Request::builder()
            .header(REQUEST_ID_HEADER, "abc-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&req), "abc-123");
    }

    #[test]
    fn test_request_id_generated_when_missing() {
        let req = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id(&req).len(), 36);
    }

    #[test]
    fn test_log_file_parts_with_directory() {
        let (dir, name) = log_file_parts("logs/app.log");
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "app.log");
    }

    #[test]
    fn test_log_file_parts_bare_name() {
        let (dir, name) = log_file_parts("app.log");
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "app.log");
    }
}
