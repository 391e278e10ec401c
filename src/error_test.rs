use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::*;
use crate::upstream::types::UpstreamError;

#[test]
fn codes_and_statuses_map_per_taxonomy() {
    let cases: Vec<(ApiError, &str, StatusCode, bool)> = vec![
        (ApiError::InvalidJson("eof".into()), "E_INVALID_JSON", StatusCode::BAD_REQUEST, false),
        (ApiError::InvalidRequest("empty".into()), "E_INVALID_REQUEST", StatusCode::BAD_REQUEST, false),
        (ApiError::MissingCredential, "E_MISSING_CREDENTIAL", StatusCode::UNAUTHORIZED, false),
        (ApiError::InvalidCredential, "E_INVALID_CREDENTIAL", StatusCode::UNAUTHORIZED, false),
        (
            ApiError::Entitlement(EntitlementError::MembershipMissing(Uuid::nil())),
            "E_MEMBERSHIP_MISSING",
            StatusCode::FORBIDDEN,
            false,
        ),
        (
            ApiError::Entitlement(EntitlementError::TeamMissing(Uuid::nil())),
            "E_TEAM_MISSING",
            StatusCode::FORBIDDEN,
            false,
        ),
        (
            ApiError::Entitlement(EntitlementError::SubscriptionInactive(Uuid::nil())),
            "E_SUBSCRIPTION_INACTIVE",
            StatusCode::FORBIDDEN,
            false,
        ),
        (
            ApiError::Entitlement(EntitlementError::SeatLimitReached {
                team_id: Uuid::nil(),
                seats_used: 2,
                seats_allowed: 2,
            }),
            "E_SEAT_LIMIT",
            StatusCode::FORBIDDEN,
            false,
        ),
        (
            ApiError::Entitlement(EntitlementError::Store(StoreError::Unavailable("down".into()))),
            "E_STORE",
            StatusCode::SERVICE_UNAVAILABLE,
            true,
        ),
        (ApiError::RateLimited { retry_after_secs: 12 }, "E_RATE_LIMITED", StatusCode::TOO_MANY_REQUESTS, true),
        (
            ApiError::Upstream(UpstreamError::Timeout { timeout_secs: 30 }),
            "E_UPSTREAM_TIMEOUT",
            StatusCode::GATEWAY_TIMEOUT,
            true,
        ),
        (
            ApiError::Upstream(UpstreamError::Api { status: 500, body: "boom".into() }),
            "E_UPSTREAM",
            StatusCode::BAD_GATEWAY,
            true,
        ),
        (ApiError::Upstream(UpstreamError::EmptyReply), "E_EMPTY_REPLY", StatusCode::BAD_GATEWAY, true),
        (
            ApiError::Store(StoreError::Unavailable("down".into())),
            "E_STORE",
            StatusCode::SERVICE_UNAVAILABLE,
            true,
        ),
    ];

    for (error, code, status, retryable) in cases {
        assert_eq!(error.code(), code);
        assert_eq!(error.status(), status, "{code}");
        assert_eq!(error.retryable(), retryable, "{code}");
    }
}

#[test]
fn rate_limited_response_carries_retry_after_header() {
    let response = ApiError::RateLimited { retry_after_secs: 12 }.into_response();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        response.headers().get(axum::http::header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
        Some("12")
    );
}

#[test]
fn non_throttle_responses_have_no_retry_after() {
    let response = ApiError::MissingCredential.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(axum::http::header::RETRY_AFTER).is_none());
}
