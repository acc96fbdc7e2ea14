//! Axum router configuration for redemption endpoints.

use axum::{routing::post, Router};

use crate::ports::TransactionProvider;

use super::handlers::{redeem, RedemptionAppState};

/// Create the redemption API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /redeem` - Redeem a code for the current user
pub fn redemption_routes<P: TransactionProvider + 'static>() -> Router<RedemptionAppState<P>> {
    Router::new().route("/redeem", post(redeem::<P>))
}

/// Create the complete redemption module router, mounted under `/api`.
///
/// # Example
///
/// ```ignore
/// let app = redemption_router().with_state(RedemptionAppState::new(handler));
/// ```
pub fn redemption_router<P: TransactionProvider + 'static>() -> Router<RedemptionAppState<P>> {
    Router::new().nest("/api/redemptions", redemption_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::http::redemption::{ErrorResponse, RedeemResponse};
    use crate::adapters::memory::{
        InMemoryAuditLog, InMemoryGroupCache, InMemoryQuotaLedger, InMemoryRedemptionStore,
        InMemorySubscriptionProvisioner,
    };
    use crate::application::RedeemCodeHandler;
    use crate::domain::foundation::UserId;
    use crate::domain::redemption::{NewRedemption, RedemptionKey};
    use crate::ports::RedemptionRepository;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    async fn app_with_code(key: &str, quota: i64) -> (Router, InMemoryRedemptionStore) {
        let store = InMemoryRedemptionStore::new();
        store.insert_user(UserId::new(1).unwrap(), 100);
        store
            .create(&NewRedemption::new(RedemptionKey::new(key).unwrap(), "http", quota, None, None).unwrap())
            .await
            .unwrap();

        let handler = RedeemCodeHandler::new(
            Arc::new(store.clone()),
            Arc::new(InMemorySubscriptionProvisioner::new()),
            Arc::new(InMemoryQuotaLedger::new()),
            Arc::new(InMemoryGroupCache::new()),
            Arc::new(InMemoryAuditLog::new()),
        )
        .with_max_jitter(Duration::ZERO);

        let app = redemption_router().with_state(RedemptionAppState::new(handler));
        (app, store)
    }

    fn redeem_request(key: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/redemptions/redeem")
            .header("content-type", "application/json");
        if let Some(user) = user {
            builder = builder.header("X-User-Id", user);
        }
        builder
            .body(Body::from(serde_json::json!({ "key": key }).to_string()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Route Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn redeem_returns_granted_quota() {
        let (app, store) = app_with_code("http-0001", 500).await;

        let response = app.oneshot(redeem_request("http-0001", Some("1"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: RedeemResponse = json_body(response).await;
        assert_eq!(
            body,
            RedeemResponse {
                quota: 500,
                plan_id: 0,
                plan_title: String::new(),
            }
        );
        assert_eq!(store.user_quota(UserId::new(1).unwrap()), Some(600));
    }

    #[tokio::test]
    async fn unknown_code_is_bad_request() {
        let (app, _store) = app_with_code("http-0002", 500).await;

        let response = app.oneshot(redeem_request("nope", Some("1"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error_code, "INVALID_REDEMPTION_CODE");
    }

    #[tokio::test]
    async fn reused_code_is_bad_request() {
        let (app, _store) = app_with_code("http-0003", 500).await;

        let first = app
            .clone()
            .oneshot(redeem_request("http-0003", Some("1")))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.oneshot(redeem_request("http-0003", Some("1"))).await.unwrap();
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = json_body(second).await;
        assert_eq!(body.error_code, "REDEMPTION_ALREADY_USED");
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let (app, store) = app_with_code("http-0004", 500).await;

        let response = app.oneshot(redeem_request("http-0004", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(store.user_quota(UserId::new(1).unwrap()), Some(100));
    }

    #[tokio::test]
    async fn non_positive_user_is_unauthorized() {
        let (app, _store) = app_with_code("http-0005", 500).await;

        let response = app.oneshot(redeem_request("http-0005", Some("0"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn system_fault_is_generic_internal_error() {
        let (app, _store) = app_with_code("http-0006", 500).await;

        // User 2 has no account, so crediting fails inside the transaction
        let response = app.oneshot(redeem_request("http-0006", Some("2"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = json_body(response).await;
        assert_eq!(body.error_code, "REDEMPTION_FAILED");
        assert_eq!(body.message, "Redemption failed, please try again later");
    }
}
