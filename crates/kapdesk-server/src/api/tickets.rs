//! Ticket endpoint handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use surrealdb::Connection;
use uuid::Uuid;

use kapdesk_core::error::KapdeskError;
use kapdesk_core::models::ticket::{
    AssignmentStatus, CreateTicket, Party, PartySide, Priority, Ticket, TicketStatus, TicketType,
};
use kapdesk_core::models::transfer::{
    Decision, NewTransferRequest, TransferKind, TransferRequest, TransferTarget,
};
use kapdesk_core::models::user::UserRole;
use kapdesk_service::{TicketDetailView, TicketListRow};

use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::state::AppState;

/// Wire shape of the creation body: flat references, as the frontend
/// sends them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateTicketRequest {
    request: String,
    description: Option<String>,
    ticket_type: TicketType,
    scheduled_date: Option<DateTime<Utc>>,
    requestor: Uuid,
    requestor_department: Uuid,
    operator: Uuid,
    operator_department: Uuid,
    creator: Uuid,
    priority: Priority,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListTicketsQuery {
    user_id: Uuid,
    role: String,
    org_id: Option<Uuid>,
    department_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum ActionType {
    AddNote,
    AddProgress,
    UpdateStatus,
    Assign,
    OpenTransfer,
    ResolveTransfer,
}

/// PATCH dispatch body: the action type selects how `data` is read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct PatchTicketRequest {
    action_type: ActionType,
    user_id: Uuid,
    data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddNoteData {
    text: String,
    target_org: Option<PartySide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddProgressData {
    percentage: u8,
    observation: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusData {
    status: String,
    end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignData {
    role: PartySide,
    user_id: Uuid,
    status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenTransferData {
    #[serde(rename = "type")]
    kind: TransferKind,
    organization_id: Uuid,
    current_department_id: Uuid,
    reason: String,
    target: TransferTarget,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolveTransferData {
    request_id: Uuid,
    approval: Decision,
    acceptance: Decision,
    status: String,
}

fn parse_data<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| {
        ApiError::from(KapdeskError::Validation {
            message: e.to_string(),
        })
    })
}

pub(super) async fn create_ticket<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), ApiError> {
    let ticket = state
        .tickets
        .create(CreateTicket {
            request: body.request,
            description: body.description,
            ticket_type: body.ticket_type,
            scheduled_date: body.scheduled_date,
            priority: body.priority,
            requestor: Party {
                organization_id: body.requestor,
                department_id: body.requestor_department,
            },
            operator: Party {
                organization_id: body.operator,
                department_id: body.operator_department,
            },
            created_by: body.creator,
        })
        .await?;

    Ok(ApiResponse::created("Ticket created successfully", ticket))
}

pub(super) async fn list_tickets<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<ListTicketsQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TicketListRow>>>), ApiError> {
    let role: UserRole = query.role.parse()?;
    let rows = state
        .views
        .list_for(role, query.user_id, query.org_id, query.department_id)
        .await?;

    Ok(ApiResponse::ok("Tickets fetched successfully", rows))
}

pub(super) async fn get_ticket<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<TicketDetailView>>), ApiError> {
    let view = state.views.get_detail(id).await.map_err(ApiError::lookup)?;

    Ok(ApiResponse::ok("Ticket fetched successfully", view))
}

pub(super) async fn patch_ticket<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
    Json(body): Json<PatchTicketRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Ticket>>), ApiError> {
    let ticket = match body.action_type {
        ActionType::AddNote => {
            let data: AddNoteData = parse_data(body.data)?;
            state
                .tickets
                .add_note(id, data.text, body.user_id, data.target_org)
                .await?
        }
        ActionType::AddProgress => {
            let data: AddProgressData = parse_data(body.data)?;
            state
                .tickets
                .update_progress(id, data.percentage, data.observation, body.user_id)
                .await?
        }
        ActionType::UpdateStatus => {
            let data: UpdateStatusData = parse_data(body.data)?;
            let status: TicketStatus = data.status.parse()?;
            state
                .tickets
                .update_status(id, status, data.end_date)
                .await?
        }
        ActionType::Assign => {
            let data: AssignData = parse_data(body.data)?;
            let status: AssignmentStatus = data.status.parse()?;
            state
                .tickets
                .assign(id, data.role, data.user_id, status)
                .await?
        }
        ActionType::OpenTransfer => {
            let data: OpenTransferData = parse_data(body.data)?;
            state
                .tickets
                .open_transfer(NewTransferRequest {
                    ticket_id: id,
                    kind: data.kind,
                    requested_by: body.user_id,
                    organization_id: data.organization_id,
                    current_department_id: data.current_department_id,
                    reason: data.reason,
                    target: data.target,
                })
                .await?
        }
        ActionType::ResolveTransfer => {
            let data: ResolveTransferData = parse_data(body.data)?;
            let status: TicketStatus = data.status.parse()?;
            state
                .tickets
                .resolve_transfer(data.request_id, data.approval, data.acceptance, status)
                .await?
        }
    };

    Ok(ApiResponse::ok("Ticket updated successfully", ticket))
}

pub(super) async fn delete_ticket<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Uuid>>), ApiError> {
    state.tickets.delete(id).await?;

    Ok(ApiResponse::ok("Ticket deleted successfully", id))
}

pub(super) async fn list_ticket_transfers<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<TransferRequest>>>), ApiError> {
    let requests = state.tickets.transfers_for(id).await?;

    Ok(ApiResponse::ok(
        "Transfer requests fetched successfully",
        requests,
    ))
}
