use crate::error::Error;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub(crate) struct APIError(anyhow::Error);

impl APIError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<Error>() {
            Some(
                Error::FileNotFound | Error::EndpointNotFound(_) | Error::RouteNotFound(_),
            ) => StatusCode::NOT_FOUND,
            Some(Error::EndpointExists(_)) => StatusCode::METHOD_NOT_ALLOWED,
            Some(Error::InvalidJSON(_)) => StatusCode::BAD_REQUEST,
            Some(Error::BodyRejection(rejection)) => rejection.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        // Extractor rejections arrive unwrapped via `WithRejection`.
        let this = match self.0.downcast::<BytesRejection>() {
            Ok(rejection) => Self(Error::BodyRejection(rejection).into()),
            Err(any_err) => Self(any_err),
        };
        let status = this.status();
        let any_err = this.0;
        if status.is_server_error() {
            tracing::error!("{any_err:#}");
        }
        let body = match any_err.downcast_ref::<Error>() {
            Some(Error::RouteNotFound(_)) => format!("{any_err}"),
            Some(_) => format!("{any_err}\n"),
            None => "internal error\n".to_string(),
        };
        (status, body).into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: Error) -> (StatusCode, String) {
        let response = APIError::from(err).into_response();
        let status = response.status();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn statuses_and_bodies() {
        assert_eq!(
            render(Error::FileNotFound).await,
            (StatusCode::NOT_FOUND, "File Not Found\n".to_string())
        );
        assert_eq!(
            render(Error::RouteNotFound("/nope".into())).await,
            (StatusCode::NOT_FOUND, "404 File Not Found!".to_string())
        );
        assert_eq!(
            render(Error::EndpointExists("/dyn/x".into())).await,
            (
                StatusCode::METHOD_NOT_ALLOWED,
                "Cannot POST to same URL twice\n".to_string()
            )
        );
        let invalid = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(render(Error::InvalidJSON(invalid)).await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn storage_errors_hide_details() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "/tmp/secret/path");
        let (status, body) = render(Error::Storage(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, "could not allocate backing store\n");
    }
}
