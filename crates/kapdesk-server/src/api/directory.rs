//! Directory endpoint handlers: organizations, departments, users,
//! and login.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use surrealdb::Connection;
use uuid::Uuid;

use kapdesk_core::models::department::{CreateDepartment, Department};
use kapdesk_core::models::organization::CreateOrganization;
use kapdesk_core::models::user::CreateUser;
use kapdesk_core::repository::Pagination;
use kapdesk_service::{OrganizationView, UserView};

use crate::api::envelope::ApiResponse;
use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub(super) struct PageQuery {
    offset: Option<u64>,
    limit: Option<u64>,
}

impl PageQuery {
    fn pagination(&self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            offset: self.offset.unwrap_or(defaults.offset),
            limit: self.limit.unwrap_or(defaults.limit),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct DepartmentsQuery {
    org_id: Uuid,
    offset: Option<u64>,
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginRequest {
    username: String,
    password: String,
}

pub(super) async fn create_organization<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<CreateOrganization>,
) -> Result<(StatusCode, Json<ApiResponse<OrganizationView>>), ApiError> {
    let org = state.directory.create_organization(body).await?;

    Ok(ApiResponse::created(
        "Organization created successfully",
        org,
    ))
}

pub(super) async fn list_organizations<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<OrganizationView>>>), ApiError> {
    let result = state
        .directory
        .list_organizations(query.pagination())
        .await?;

    Ok(ApiResponse::ok(
        "Organizations fetched successfully",
        result.items,
    ))
}

pub(super) async fn create_department<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<CreateDepartment>,
) -> Result<(StatusCode, Json<ApiResponse<Department>>), ApiError> {
    let department = state.directory.create_department(body).await?;

    Ok(ApiResponse::created(
        "Department created successfully",
        department,
    ))
}

pub(super) async fn list_departments<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<DepartmentsQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<Department>>>), ApiError> {
    let pagination = Pagination {
        offset: query.offset.unwrap_or(0),
        limit: query.limit.unwrap_or(Pagination::default().limit),
    };
    let result = state
        .directory
        .list_departments(query.org_id, pagination)
        .await?;

    Ok(ApiResponse::ok(
        "Departments fetched successfully",
        result.items,
    ))
}

pub(super) async fn create_user<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<CreateUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    let user = state.directory.create_user(body).await?;

    Ok(ApiResponse::created("User created successfully", user))
}

pub(super) async fn list_users<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<PageQuery>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<UserView>>>), ApiError> {
    let result = state.directory.list_users(query.pagination()).await?;

    Ok(ApiResponse::ok("Users fetched successfully", result.items))
}

pub(super) async fn login<C: Connection>(
    State(state): State<AppState<C>>,
    Json(body): Json<LoginRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    let user = state.directory.login(&body.username, &body.password).await?;

    Ok(ApiResponse::ok("Login successful", user))
}
