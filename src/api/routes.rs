use crate::api::api_error::APIError;
use crate::api::server::AppState;
use crate::content_type;
use crate::error::Error;
use crate::static_files::StaticFile;
use axum::body::{boxed, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::WithRejection;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const WELCOME: &str = "Welcome. You got served.";
const ECHO_PREFIX: &str = "/echo";
const DYN_ROOT: &str = "/dyn/";

pub(super) fn new(state: AppState) -> Router {
    let body_limit = match state.config.max_body_bytes {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };
    Router::new()
        .route("/", get(welcome).fallback(not_found))
        .route("/file/:path", get(static_file).fallback(not_found))
        .route(
            "/dyn/*path",
            post(create_endpoint)
                .get(read_endpoint)
                .put(update_endpoint)
                .fallback(not_found),
        )
        .fallback(fallback)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn welcome() -> &'static str {
    WELCOME
}

#[allow(clippy::unused_async)]
async fn not_found(uri: Uri) -> APIError {
    tracing::info!("cannot find: {}", uri.path());
    Error::RouteNotFound(uri.path().to_string()).into()
}

async fn static_file(
    State(state): State<AppState>,
    Path(segment): Path<String>,
) -> Result<Response, APIError> {
    let file = StaticFile::open(&state.config, &segment).await?;
    let headers = [
        (header::CONTENT_TYPE, file.content_type().to_string()),
        (header::CONTENT_LENGTH, file.len().to_string()),
    ];
    Ok((headers, boxed(file.into_body())).into_response())
}

async fn create_endpoint(
    State(state): State<AppState>,
    uri: Uri,
    WithRejection(body, _): WithRejection<Bytes, APIError>,
) -> Result<StatusCode, APIError> {
    Ok(create(&state, uri.path(), &body).await?)
}

async fn read_endpoint(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, APIError> {
    Ok(read(&state, uri.path()).await?)
}

async fn update_endpoint(
    State(state): State<AppState>,
    uri: Uri,
    WithRejection(body, _): WithRejection<Bytes, APIError>,
) -> Result<StatusCode, APIError> {
    Ok(update(&state, uri.path(), &body).await?)
}

async fn create(state: &AppState, url_path: &str, body: &[u8]) -> Result<StatusCode, Error> {
    state.registry.create(url_path, body).await?;
    tracing::info!("created endpoint for path: {url_path}");
    Ok(StatusCode::OK)
}

async fn read(state: &AppState, url_path: &str) -> Result<Response, Error> {
    let contents = state.registry.read(url_path).await?;
    Ok((
        [(header::CONTENT_TYPE, content_type::for_path(url_path))],
        contents,
    )
        .into_response())
}

async fn update(state: &AppState, url_path: &str, body: &[u8]) -> Result<StatusCode, Error> {
    state.registry.update(url_path, body).await?;
    tracing::info!("updated endpoint for path: {url_path}");
    Ok(StatusCode::OK)
}

/// Handles what the route table can't express. `/dyn/` itself is a dynamic endpoint path, but
/// `/dyn/*path` needs a non-empty tail. Anything under the `/echo` prefix (including e.g.
/// `/echoes`) echoes `POST`, `PUT` and `PATCH` bodies. All other requests are not found.
async fn fallback(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, APIError> {
    let url_path = uri.path();
    if url_path == DYN_ROOT {
        let response = match method {
            Method::POST => create(&state, url_path, &read_body(body)?).await?.into_response(),
            Method::GET | Method::HEAD => read(&state, url_path).await?,
            Method::PUT => update(&state, url_path, &read_body(body)?).await?.into_response(),
            _ => return Err(not_found(uri).await),
        };
        return Ok(response);
    }

    let is_echo = url_path.starts_with(ECHO_PREFIX)
        && matches!(method, Method::POST | Method::PUT | Method::PATCH);
    if !is_echo {
        return Err(not_found(uri).await);
    }
    Ok(echo(&read_body(body)?)?.into_response())
}

fn read_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, Error> {
    body.map_err(|err| {
        tracing::warn!("error reading body: {err}");
        Error::BodyRejection(err)
    })
}

fn echo(body: &[u8]) -> Result<impl IntoResponse, Error> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let mut pretty = serde_json::to_string_pretty(&value)?;
    pretty.push('\n');
    Ok(([(header::CONTENT_TYPE, "application/json")], pretty))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echoed(body: &[u8]) -> Result<String, Error> {
        let response = echo(body)?.into_response();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        Ok(String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn echo_indents() {
        assert_eq!(echoed(br#"{"a":1}"#).await.unwrap(), "{\n  \"a\": 1\n}\n");
        assert_eq!(echoed(b"[1, 2]").await.unwrap(), "[\n  1,\n  2\n]\n");
        assert_eq!(echoed(b" \"str\" ").await.unwrap(), "\"str\"\n");
    }

    #[tokio::test]
    async fn echo_rejects_malformed() {
        assert!(matches!(echoed(b"{").await, Err(Error::InvalidJSON(_))));
        assert!(matches!(echoed(b"").await, Err(Error::InvalidJSON(_))));
    }
}
