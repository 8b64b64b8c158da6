// ==========================================
// Shared HTTP helpers: error mapping, request context, blocking calls
// ==========================================

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::app::state::AppState;
use crate::domain::types::{Actor, Role};
use crate::i18n;

pub type SharedState = Arc<AppState>;

pub const ACTOR_HEADER: &str = "x-actor";
pub const ROLE_HEADER: &str = "x-role";

// ==========================================
// Error response
// ==========================================

/// Body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code, see ApiError::code
    pub code: String,

    /// Localized summary
    pub message: String,

    /// Untranslated detail from the failing layer
    pub details: String,
}

/// ApiError bound to the locale of the request that produced it
pub(super) struct HttpError {
    err: ApiError,
    locale: &'static str,
}

pub(super) type HttpResult<T> = Result<Json<T>, HttpError>;

pub(super) fn status_for(err: &ApiError) -> StatusCode {
    match err {
        ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        ApiError::BusinessRuleViolation(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = status_for(&self.err);
        if status.is_server_error() {
            tracing::error!(code = self.err.code(), error = %self.err, "request failed");
        } else {
            tracing::debug!(code = self.err.code(), error = %self.err, "request rejected");
        }

        let code = self.err.code();
        let body = ErrorResponse {
            code: code.to_string(),
            message: i18n::t_in(self.locale, &format!("error.{}", code)),
            details: self.err.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Success acknowledgement for deletes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deleted {
    pub id: i64,
    pub message: String,
}

impl Deleted {
    pub(super) fn new(id: i64, ctx: &RequestContext) -> Self {
        Self {
            id,
            message: i18n::t_in(ctx.locale, "common.success"),
        }
    }
}

/// Run a synchronous service call off the async runtime
///
/// Repository calls hold a std Mutex over the SQLite connection.
pub(super) async fn blocking<T, F>(f: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::InternalError(format!("blocking task failed: {}", e)))?
}

// ==========================================
// RequestContext - actor and locale of a request
// ==========================================

#[derive(Debug, Clone)]
pub(super) struct RequestContext {
    pub actor: Actor,
    pub locale: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

impl RequestContext {
    pub(super) fn json<T>(&self, result: ApiResult<T>) -> HttpResult<T> {
        result.map(Json).map_err(|err| self.error(err))
    }

    pub(super) fn error(&self, err: ApiError) -> HttpError {
        HttpError {
            err,
            locale: self.locale,
        }
    }
}

#[async_trait]
impl FromRequestParts<SharedState> for RequestContext {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let lang = Query::<LangQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|q| q.0.lang);
        Ok(Self {
            actor: actor_from_headers(&parts.headers),
            locale: locale_for(lang.as_deref(), &parts.headers, state.default_locale),
        })
    }
}

/// X-Actor names the user, X-Role their role; no X-Actor means anonymous viewer
pub(super) fn actor_from_headers(headers: &HeaderMap) -> Actor {
    let name = headers
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    match name {
        Some(name) => {
            let role = headers
                .get(ROLE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(Role::from_str_or_viewer)
                .unwrap_or(Role::Viewer);
            Actor::new(name, role)
        }
        None => Actor::anonymous(),
    }
}

/// `lang` query parameter, then Accept-Language, then the server default
pub(super) fn locale_for(
    lang: Option<&str>,
    headers: &HeaderMap,
    default_locale: &'static str,
) -> &'static str {
    if let Some(lang) = lang.filter(|l| !l.trim().is_empty()) {
        return i18n::resolve_locale(lang);
    }
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(i18n::resolve_locale)
        .unwrap_or(default_locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ApiError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ApiError::PermissionDenied("x".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_for(&ApiError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&ApiError::BusinessRuleViolation("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&ApiError::DatabaseError("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_actor_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(actor_from_headers(&headers), Actor::anonymous());

        headers.insert(ACTOR_HEADER, HeaderValue::from_static("amal"));
        headers.insert(ROLE_HEADER, HeaderValue::from_static("Supervisor"));
        assert_eq!(
            actor_from_headers(&headers),
            Actor::new("amal", Role::Supervisor)
        );

        headers.insert(ROLE_HEADER, HeaderValue::from_static("root"));
        assert_eq!(actor_from_headers(&headers).role, Role::Viewer);
    }

    #[test]
    fn test_locale_precedence() {
        let mut headers = HeaderMap::new();
        assert_eq!(locale_for(None, &headers, "ar"), "ar");

        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("ar-EG,ar;q=0.9,en;q=0.8"),
        );
        assert_eq!(locale_for(None, &headers, "en"), "ar");
        assert_eq!(locale_for(Some("en"), &headers, "ar"), "en");
        assert_eq!(locale_for(Some(" "), &headers, "en"), "ar");
    }
}
