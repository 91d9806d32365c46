use crate::app::response::{log_failure, ApiError};
use crate::app::AppState;
use crate::domain::views::{ConfigureLoyaltyRequest, CreateLoyaltyCardRequest};
use crate::utils::error::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use std::future::Future;

pub const USER_ID_HEADER: &str = "X-User-ID";

const MSG_INVALID_USER_ID: &str = "userId query parameter is missing or not an integer";
const MSG_INVALID_COMPANY_ID: &str = "companyId is missing or not an integer";
const MSG_INVALID_QUERY: &str = "query string could not be parsed";
const MSG_INVALID_BODY: &str = "request body is not valid JSON for this endpoint";
const MSG_MISSING_USER_HEADER: &str = "X-User-ID header is missing or not an integer";

#[derive(Debug, Deserialize)]
pub struct CardQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "companyId")]
    pub company_id: Option<String>,
}

fn parse_id(raw: Option<&str>, message: &str) -> std::result::Result<i64, ApiError> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<i64>().ok())
        .ok_or_else(|| ApiError::bad_request(message))
}

/// Runs an orchestrator call under the request timeout. On expiry the call is dropped.
async fn run_with_timeout<T, Fut>(
    state: &AppState,
    route: &str,
    operation: Fut,
) -> std::result::Result<T, ApiError>
where
    Fut: Future<Output = Result<T>>,
{
    match tokio::time::timeout(state.request_timeout, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => {
            log_failure(route, &err);
            Err(ApiError::from(&err))
        }
        Err(_) => {
            tracing::error!(
                "{} - timed out after {:?}",
                route,
                state.request_timeout
            );
            Err(ApiError::timeout())
        }
    }
}

/// GET /api/v1/loyalty-cards?userId={userId}&companyId={companyId}
pub async fn read_card(
    State(state): State<AppState>,
    query: std::result::Result<Query<CardQuery>, QueryRejection>,
) -> Response {
    const ROUTE: &str = "GET /loyalty-cards";

    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            tracing::warn!("{} - invalid query string: {}", ROUTE, rejection.body_text());
            return ApiError::bad_request(MSG_INVALID_QUERY).into_response();
        }
    };

    let user_id = match parse_id(query.user_id.as_deref(), MSG_INVALID_USER_ID) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("{} - invalid userId: {:?}", ROUTE, query.user_id);
            return e.into_response();
        }
    };
    let company_id = match parse_id(query.company_id.as_deref(), MSG_INVALID_COMPANY_ID) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("{} - invalid companyId: {:?}", ROUTE, query.company_id);
            return e.into_response();
        }
    };

    match run_with_timeout(&state, ROUTE, state.service.read_card(user_id, company_id)).await {
        Ok(card) => {
            tracing::info!(
                "{} - card retrieved: user_id={}, company_id={}, card_id={}",
                ROUTE,
                user_id,
                company_id,
                card.card_id
            );
            (StatusCode::OK, Json(card)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/v1/loyalty-cards
pub async fn create_card(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateLoyaltyCardRequest>, JsonRejection>,
) -> Response {
    const ROUTE: &str = "POST /loyalty-cards";

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("{} - invalid request body: {}", ROUTE, rejection.body_text());
            return ApiError::bad_request(MSG_INVALID_BODY).into_response();
        }
    };

    match run_with_timeout(&state, ROUTE, state.service.create_card(&request)).await {
        Ok(card) => {
            tracing::info!(
                "{} - card created: user_id={}, company_id={}, card_id={}",
                ROUTE,
                request.user_id,
                request.company_id,
                card.card_id
            );
            (StatusCode::CREATED, Json(card)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /api/v1/companies/{companyId}/loyalty-config
pub async fn configure_program(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    headers: HeaderMap,
    payload: std::result::Result<Json<ConfigureLoyaltyRequest>, JsonRejection>,
) -> Response {
    const ROUTE: &str = "POST /companies/{companyId}/loyalty-config";

    let user_id = match headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
    {
        Some(id) => id,
        None => {
            tracing::warn!("{} - missing or invalid {} header", ROUTE, USER_ID_HEADER);
            return ApiError::unauthorized(MSG_MISSING_USER_HEADER).into_response();
        }
    };

    let company_id = match parse_id(Some(&company_id), MSG_INVALID_COMPANY_ID) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("{} - invalid companyId: {}", ROUTE, company_id);
            return e.into_response();
        }
    };

    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("{} - invalid request body: {}", ROUTE, rejection.body_text());
            return ApiError::bad_request(MSG_INVALID_BODY).into_response();
        }
    };

    match run_with_timeout(
        &state,
        ROUTE,
        state
            .service
            .configure_program(company_id, user_id, &request),
    )
    .await
    {
        Ok(config) => {
            tracing::info!(
                "{} - loyalty configured: user_id={}, company_id={}, enabled={}",
                ROUTE,
                user_id,
                company_id,
                config.is_enabled
            );
            (StatusCode::OK, Json(config)).into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}
