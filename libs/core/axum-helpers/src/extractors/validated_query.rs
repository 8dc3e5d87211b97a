//! Query-string extractor with validation and structured rejections.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// Like [`axum::extract::Query`], but validates the parsed value and
/// reports both kinds of failure as a 400 [`crate::ErrorResponse`].
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        value
            .validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedQuery(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Page {
        #[validate(range(min = 1, max = 100))]
        limit: Option<i64>,
    }

    async fn handler(ValidatedQuery(page): ValidatedQuery<Page>) -> String {
        format!("{:?}", page.limit)
    }

    async fn status_for(uri: &str) -> StatusCode {
        let app = Router::new().route("/", get(handler));
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_query_validation() {
        assert_eq!(status_for("/").await, StatusCode::OK);
        assert_eq!(status_for("/?limit=10").await, StatusCode::OK);
        assert_eq!(status_for("/?limit=0").await, StatusCode::BAD_REQUEST);
        assert_eq!(status_for("/?limit=ten").await, StatusCode::BAD_REQUEST);
    }
}
