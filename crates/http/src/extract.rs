//! Request extractors that report failures through [`AppError`].

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use validator::{Validate, ValidationErrors};

use crate::error::AppError;

/// JSON body that has been deserialized and then checked with [`Validate`].
///
/// Missing or mistyped fields and failed field rules all become
/// `422 validation_error`; unparsable JSON is `400`, a missing JSON content
/// type is `415`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate().map_err(|errors| {
            AppError::validation(validation_details(&errors), "invalid request body")
        })?;

        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    match rejection {
        JsonRejection::JsonDataError(err) => AppError::validation(
            vec![json!({ "error": err.body_text() })],
            "request body does not match the expected schema",
        ),
        JsonRejection::JsonSyntaxError(err) => AppError::bad_request(err.body_text()),
        JsonRejection::MissingJsonContentType(err) => {
            AppError::unsupported_media_type(err.body_text())
        }
        other => AppError::bad_request(other.body_text()),
    }
}

/// Query string deserialized into `T`; a malformed query is `400 bad_request`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryParams<T>(pub T);

impl<T, S> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Path parameters deserialized into `T`.
///
/// Segments that cannot be decoded (bad percent-encoding, wrong type) are
/// `400 bad_request`. A route without the expected parameters is a wiring
/// bug and surfaces as `500`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathParams<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection_to_error)?;
        Ok(Self(value))
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> AppError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(err) => AppError::bad_request(err.body_text()),
        other => AppError::Internal(anyhow::anyhow!(other.body_text())),
    }
}

/// Flatten field errors into `{"field": .., "error": ..}` entries, sorted by field.
pub fn validation_details(errors: &ValidationErrors) -> Vec<serde_json::Value> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            let field = field.to_string();
            errors.iter().map(move |error| {
                let mut detail = json!({ "field": field, "error": error.code.to_string() });
                if let Some(message) = &error.message {
                    detail["message"] = json!(message.to_string());
                }
                detail
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Note {
        #[validate(length(min = 1, max = 5))]
        title: String,
    }

    fn json_request(body: &str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let request = json_request(r#"{"title":"hey"}"#);
        let ValidatedJson(note) = ValidatedJson::<Note>::from_request(request, &())
            .await
            .unwrap();
        assert_eq!(note.title, "hey");
    }

    #[tokio::test]
    async fn missing_field_is_validation_error() {
        let error = ValidatedJson::<Note>::from_request(json_request("{}"), &())
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn rule_violation_reports_field() {
        let request = json_request(r#"{"title":"too long"}"#);
        let error = ValidatedJson::<Note>::from_request(request, &())
            .await
            .unwrap_err();

        match error {
            AppError::Validation { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0]["field"], "title");
                assert_eq!(details[0]["error"], "length");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let error = ValidatedJson::<Note>::from_request(json_request("{\"title\":"), &())
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
    }

    #[derive(Debug, Deserialize)]
    struct Search {
        title: Option<String>,
    }

    fn parts(uri: &str) -> Parts {
        axum::http::Request::builder()
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn query_params_accepts_optional_fields() {
        let QueryParams(search) =
            QueryParams::<Search>::from_request_parts(&mut parts("/?title=rust"), &())
                .await
                .unwrap();
        assert_eq!(search.title.as_deref(), Some("rust"));

        let QueryParams(search) = QueryParams::<Search>::from_request_parts(&mut parts("/"), &())
            .await
            .unwrap();
        assert!(search.title.is_none());
    }

    #[tokio::test]
    async fn repeated_query_field_is_bad_request() {
        let error = QueryParams::<Search>::from_request_parts(&mut parts("/?title=a&title=b"), &())
            .await
            .unwrap_err();

        match error {
            AppError::BadRequest { code, message } => {
                assert_eq!(code, "bad_request");
                assert!(message.contains("title"));
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_path_segment_is_bad_request() {
        use tower::ServiceExt;

        let app = axum::Router::new().route(
            "/{id}",
            axum::routing::get(|PathParams(id): PathParams<String>| async move { id }),
        );

        let response = app.clone().oneshot(get_request("/%FF%FE")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app.oneshot(get_request("/abc")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn missing_path_params_is_internal() {
        let error = path_rejection_to_error(PathRejection::MissingPathParams(
            axum::extract::rejection::MissingPathParams::default(),
        ));
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn get_request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn missing_content_type_is_unsupported() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"title":"hey"}"#))
            .unwrap();

        let error = ValidatedJson::<Note>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(error.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
