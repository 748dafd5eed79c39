//! Direct lead directory operations, outside of any run.

use crate::api::AppState;
use crate::config::PAGE_CAP;
use crate::error::{ApiError, Error, Result, ValidationErrors};
use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

/// Query of `GET /api/search/people`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Offset of the first lead (default: 0)
    #[serde(default)]
    pub start: u32,
    /// Page size, 1 to 100 (default: 25)
    #[serde(default = "default_count")]
    pub count: u32,
    /// Lead list to search
    #[serde(default)]
    pub lead_list_id: Option<String>,
}

fn default_count() -> u32 {
    25
}

/// Body of `POST /api/connect`
#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    /// Person identifier or sales profile URN
    #[serde(default)]
    pub member: String,
    /// Invitation note
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /api/remove`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    /// Lead list to remove from
    #[serde(default)]
    pub lead_list_id: String,
    /// Sales profile URN of the lead
    #[serde(default)]
    pub entity_urn: String,
}

fn bad_request(code: &str, message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(code, message))).into_response()
}

/// GET /api/search/people - One page of a lead list
pub async fn search_people(
    State(state): State<AppState>,
    query: std::result::Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return bad_request("invalid_query", rejection.body_text()),
    };

    let mut errors = ValidationErrors::default();
    if query.count < 1 || query.count > PAGE_CAP {
        errors.push("count", format!("Count must be between 1 and {}", PAGE_CAP));
    }
    let lead_list_id = query.lead_list_id.unwrap_or_default();
    if lead_list_id.is_empty() {
        errors.push("leadListId", "Lead list ID is required");
    }
    if let Err(errors) = errors.into_result() {
        return Error::from(errors).into_response();
    }

    tracing::info!(start = query.start, count = query.count, lead_list_id = %lead_list_id, "searching lead list");
    match state
        .runner
        .directory()
        .search(query.start, query.count, &lead_list_id)
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "lead search failed");
            Error::from(e).into_response()
        }
    }
}

/// POST /api/connect - Send one connection request
pub async fn connect(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ConnectRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request("invalid_body", rejection.body_text()),
    };
    if let Err(e) = validate_connect(&request) {
        return e.into_response();
    }

    tracing::info!(
        member = %request.member,
        message_len = request.message.len(),
        "sending connection request"
    );
    match state
        .runner
        .directory()
        .contact(&request.member, &request.message)
        .await
    {
        Ok(ack) => Json(json!({
            "success": true,
            "message": "Connection request sent successfully",
            "data": ack.body,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!(member = %request.member, error = %e, "connection request failed");
            Error::from(e).into_response()
        }
    }
}

fn validate_connect(request: &ConnectRequest) -> Result<()> {
    let mut errors = ValidationErrors::default();
    if request.member.is_empty() {
        errors.push("member", "Member ID is required");
    }
    if request.message.is_empty() {
        errors.push("message", "Message is required");
    }
    Ok(errors.into_result()?)
}

/// POST /api/remove - Remove a lead from a lead list
pub async fn remove_from_list(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RemoveRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request("invalid_body", rejection.body_text()),
    };

    let mut errors = ValidationErrors::default();
    if request.lead_list_id.is_empty() {
        errors.push("leadListId", "Lead list ID is required");
    }
    if request.entity_urn.is_empty() {
        errors.push("entityUrn", "Entity URN is required");
    }
    if let Err(errors) = errors.into_result() {
        return Error::from(errors).into_response();
    }

    match state
        .runner
        .directory()
        .remove(&request.lead_list_id, &request.entity_urn)
        .await
    {
        Ok(_) => {
            tracing::info!(entity_urn = %request.entity_urn, "removed lead from list");
            Json(json!({
                "success": true,
                "message": "Person successfully removed from lead list",
                "removedEntity": request.entity_urn,
            }))
            .into_response()
        }
        Err(e) => {
            tracing::error!(entity_urn = %request.entity_urn, error = %e, "lead removal failed");
            Error::from(e).into_response()
        }
    }
}
