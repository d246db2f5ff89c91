//! Contact REST handlers.
//!
//! Each handler unwraps its inputs, calls [`ContactService`](crate::services::ContactService)
//! and wraps the result in the `{ success: true, ... }` envelope.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use contact_book_core::ContactId;

use crate::error::{AppError, ContactAction, NOT_FOUND_MESSAGE, Result};
use crate::models::{Contact, ContactInput};
use crate::services::{ContactError, ContactStats, ListQuery};
use crate::state::AppState;

/// Raw listing parameters. Everything stays a string so that malformed
/// numbers fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    fn to_query(&self) -> ListQuery {
        ListQuery::from_params(
            self.search.as_deref(),
            self.sort_by.as_deref(),
            self.order.as_deref(),
            self.page.as_deref(),
            self.limit.as_deref(),
        )
    }
}

/// Envelope for a page of contacts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    /// Number of contacts on this page.
    pub count: usize,
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub data: Vec<Contact>,
}

/// Envelope for a single payload, with an optional confirmation message.
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub data: T,
}

impl<T> DataResponse<T> {
    const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    const fn with_message(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}

fn fail(state: &AppState, action: ContactAction) -> impl FnOnce(ContactError) -> AppError {
    let expose_detail = state.exposes_error_detail();
    move |err| AppError::from_contact(err, action, expose_detail)
}

/// A path id that is not a UUID cannot name a stored contact.
fn parse_id(raw: &str) -> Result<ContactId> {
    raw.parse()
        .map_err(|_| AppError::NotFound(NOT_FOUND_MESSAGE.to_owned()))
}

fn parse_body(body: std::result::Result<Json<ContactInput>, JsonRejection>) -> Result<ContactInput> {
    body.map(|Json(input)| input).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    })
}

/// `GET /api/contacts`
pub async fn index(
    State(state): State<AppState>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>> {
    let Query(params) = params.map_err(|rejection| {
        AppError::BadRequest(format!("Invalid query string: {}", rejection.body_text()))
    })?;

    let page = state
        .contacts()
        .list(&params.to_query())
        .await
        .map_err(fail(&state, ContactAction::List))?;

    Ok(Json(ListResponse {
        success: true,
        count: page.contacts.len(),
        total_count: page.total_count,
        total_pages: page.total_pages,
        current_page: page.page.page(),
        data: page.contacts,
    }))
}

/// `GET /api/contacts/stats`
pub async fn stats(State(state): State<AppState>) -> Result<Json<DataResponse<ContactStats>>> {
    let stats = state
        .contacts()
        .stats()
        .await
        .map_err(fail(&state, ContactAction::Stats))?;
    Ok(Json(DataResponse::ok(stats)))
}

/// `GET /api/contacts/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Contact>>> {
    let id = parse_id(&id)?;
    let contact = state
        .contacts()
        .get(id)
        .await
        .map_err(fail(&state, ContactAction::Get))?;
    Ok(Json(DataResponse::ok(contact)))
}

/// `POST /api/contacts`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<ContactInput>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Contact>>)> {
    let input = parse_body(body)?;
    let contact = state
        .contacts()
        .create(input)
        .await
        .map_err(fail(&state, ContactAction::Create))?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            "Contact created successfully",
            contact,
        )),
    ))
}

/// `PUT /api/contacts/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: std::result::Result<Json<ContactInput>, JsonRejection>,
) -> Result<Json<DataResponse<Contact>>> {
    let id = parse_id(&id)?;
    let input = parse_body(body)?;
    let contact = state
        .contacts()
        .update(id, input)
        .await
        .map_err(fail(&state, ContactAction::Update))?;

    Ok(Json(DataResponse::with_message(
        "Contact updated successfully",
        contact,
    )))
}

/// `DELETE /api/contacts/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Contact>>> {
    let id = parse_id(&id)?;
    let contact = state
        .contacts()
        .delete(id)
        .await
        .map_err(fail(&state, ContactAction::Delete))?;

    Ok(Json(DataResponse::with_message(
        "Contact deleted successfully",
        contact,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contact_book_core::{PageRequest, SortField, SortOrder};

    #[test]
    fn test_list_params_deserialize_camel_case_sort() {
        let params: ListParams =
            serde_json::from_value(serde_json::json!({ "sortBy": "name", "order": "asc" }))
                .unwrap_or_default();
        let query = params.to_query();
        assert_eq!(query.sort.field, SortField::Name);
        assert_eq!(query.sort.order, SortOrder::Asc);
        assert_eq!(query.page, PageRequest::default());
    }

    #[test]
    fn test_parse_id_rejects_non_uuid_as_not_found() {
        assert!(matches!(parse_id("abc"), Err(AppError::NotFound(ref m)) if m == NOT_FOUND_MESSAGE));
        assert!(parse_id(&ContactId::generate().to_string()).is_ok());
    }

    #[test]
    fn test_data_response_omits_missing_message() {
        let body = serde_json::to_value(DataResponse::ok(1)).unwrap_or_default();
        assert_eq!(body, serde_json::json!({ "success": true, "data": 1 }));

        let body = serde_json::to_value(DataResponse::with_message("done", 1)).unwrap_or_default();
        assert_eq!(body["message"], "done");
    }
}
