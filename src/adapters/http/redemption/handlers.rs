//! HTTP handlers for redemption endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::{RedeemCodeCommand, RedeemCodeHandler};
use crate::domain::foundation::UserId;
use crate::domain::redemption::RedeemError;
use crate::ports::TransactionProvider;

use super::dto::{ErrorResponse, RedeemRequest, RedeemResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for redemption endpoints.
pub struct RedemptionAppState<P: TransactionProvider> {
    pub redeem_handler: Arc<RedeemCodeHandler<P>>,
}

impl<P: TransactionProvider> RedemptionAppState<P> {
    pub fn new(redeem_handler: RedeemCodeHandler<P>) -> Self {
        Self {
            redeem_handler: Arc::new(redeem_handler),
        }
    }
}

impl<P: TransactionProvider> Clone for RedemptionAppState<P> {
    fn clone(&self) -> Self {
        Self {
            redeem_handler: Arc::clone(&self.redeem_handler),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// The gateway in front of this service authenticates the caller and
/// forwards the resolved id in `X-User-Id`.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/redemptions/redeem - Redeem a code for the current user
pub async fn redeem<P: TransactionProvider + 'static>(
    State(state): State<RedemptionAppState<P>>,
    user: AuthenticatedUser,
    Json(request): Json<RedeemRequest>,
) -> Result<impl IntoResponse, RedemptionApiError> {
    let cmd = RedeemCodeCommand {
        key: request.key,
        user_id: user.user_id,
    };

    let result = state.redeem_handler.handle(cmd).await?;

    Ok(Json(RedeemResponse::from(result)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that maps redemption errors to HTTP responses.
#[derive(Debug)]
pub struct RedemptionApiError(RedeemError);

impl From<RedeemError> for RedemptionApiError {
    fn from(err: RedeemError) -> Self {
        Self(err)
    }
}

impl IntoResponse for RedemptionApiError {
    fn into_response(self) -> axum::response::Response {
        let status = if self.0.is_business() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let error = ErrorResponse::new(self.0.code().to_string(), self.0.user_message());
        (status, Json(error)).into_response()
    }
}
