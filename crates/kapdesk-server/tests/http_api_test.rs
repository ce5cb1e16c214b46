//! End-to-end tests for the HTTP surface, driving the router against
//! an in-memory database.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;

use kapdesk_server::AppState;
use kapdesk_server::api;

async fn app() -> Router {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    kapdesk_db::run_migrations(&db).await.unwrap();
    api::router(AppState::new(db))
}

async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Seed one government org + department, one company org + department,
/// and a KAP employee. Returns
/// `(gov_org, gov_dept, company_org, company_dept, kap_user)` ids.
async fn seed(app: &Router) -> (String, String, String, String, String) {
    let (status, body) = request(
        app,
        "POST",
        "/organizations",
        Some(json!({
            "name": "City Hall",
            "orgType": "GOVERNMENT",
            "username": "city-hall",
            "mobile": "5550001",
            "password": "org-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let gov_org = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        "POST",
        "/departments",
        Some(json!({"organizationId": gov_org, "name": "Utilities"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let gov_dept = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        "POST",
        "/organizations",
        Some(json!({
            "name": "PipeWorks",
            "orgType": "COMPANY",
            "username": "pipeworks",
            "mobile": "5550002",
            "password": "org-password-123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let company_org = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        "POST",
        "/departments",
        Some(json!({"organizationId": company_org, "name": "Field Ops"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let company_dept = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        app,
        "POST",
        "/users",
        Some(json!({
            "name": "Dana",
            "username": "dana",
            "password": "user-password-123",
            "role": "KAP_EMPLOYEE",
            "kapRole": "COORDINATOR",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let kap_user = body["data"]["id"].as_str().unwrap().to_string();

    (gov_org, gov_dept, company_org, company_dept, kap_user)
}

async fn create_ticket(
    app: &Router,
    gov_org: &str,
    gov_dept: &str,
    company_org: &str,
    company_dept: &str,
    kap_user: &str,
) -> Value {
    let (status, body) = request(
        app,
        "POST",
        "/tickets",
        Some(json!({
            "request": "Restore the water supply",
            "ticketType": "INSTANT",
            "priority": "HIGH",
            "requestor": gov_org,
            "requestorDepartment": gov_dept,
            "operator": company_org,
            "operatorDepartment": company_dept,
            "creator": kap_user,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body
}

#[tokio::test]
async fn create_ticket_returns_the_envelope_and_created_status() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;

    let body = create_ticket(&app, &gov_org, &gov_dept, &company_org, &company_dept, &kap_user)
        .await;

    assert_eq!(body["success"], json!(true));
    assert!(body["message"].is_string());
    assert_eq!(body["data"]["status"], json!("CREATED"));

    let number = body["data"]["ticketNumber"].as_str().unwrap();
    let (day, seq) = number.split_once('-').unwrap();
    assert_eq!(day.len(), 6);
    assert_eq!(seq.len(), 4);
    assert!(day.chars().all(|c| c.is_ascii_digit()));
    assert!(seq.chars().all(|c| c.is_ascii_digit()));
}

#[tokio::test]
async fn scheduled_ticket_without_date_is_a_400() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/tickets",
        Some(json!({
            "request": "Planned maintenance",
            "ticketType": "SCHEDULED",
            "priority": "LOW",
            "requestor": gov_org,
            "requestorDepartment": gov_dept,
            "operator": company_org,
            "operatorDepartment": company_dept,
            "creator": kap_user,
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
    assert!(
        body["message"].as_str().unwrap().contains("scheduled date"),
        "{body}"
    );
}

#[tokio::test]
async fn listing_is_scoped_by_role_and_side() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;
    create_ticket(&app, &gov_org, &gov_dept, &company_org, &company_dept, &kap_user).await;

    // The requestor-side manager sees the ticket.
    let uri = format!(
        "/tickets?userId={}&role=GOV_MANAGER&orgId={gov_org}&departmentId={gov_dept}",
        uuid::Uuid::new_v4()
    );
    let (status, body) = request(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["data"][0]["requestor"]["organizationName"],
        json!("City Hall")
    );

    // An operator-side manager scoped to the requestor's org does not.
    let uri = format!(
        "/tickets?userId={}&role=OP_MANAGER&orgId={gov_org}",
        uuid::Uuid::new_v4()
    );
    let (status, body) = request(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    // An unrecognized role is rejected.
    let uri = format!("/tickets?userId={}&role=SUPERVISOR", uuid::Uuid::new_v4());
    let (status, body) = request(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["message"].as_str().unwrap().contains("Invalid role"));
}

#[tokio::test]
async fn patch_dispatches_by_action_type() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;
    let ticket = create_ticket(&app, &gov_org, &gov_dept, &company_org, &company_dept, &kap_user)
        .await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    // A KAP author's note lands in kapNotes, targeted at the
    // requestor's organization.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "ADD_NOTE",
            "userId": kap_user,
            "data": {"text": "Please expedite", "targetOrg": "requestor"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["kapNotes"].as_array().unwrap().len(), 1);
    assert_eq!(
        body["data"]["kapNotes"][0]["targetOrganizationId"],
        json!(gov_org)
    );
    assert_eq!(body["data"]["orgNotes"].as_array().unwrap().len(), 0);

    // Progress within range appends.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "ADD_PROGRESS",
            "userId": kap_user,
            "data": {"percentage": 40, "observation": "Excavation done"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["progress"][0]["percentage"], json!(40));

    // Progress below 20 is rejected.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "ADD_PROGRESS",
            "userId": kap_user,
            "data": {"percentage": 10, "observation": "Too low"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    // A valid status value is accepted from any state.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "UPDATE_STATUS",
            "userId": kap_user,
            "data": {"status": "CLOSED"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("CLOSED"));

    // A value outside the enum fails with the invalid-status message.
    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "UPDATE_STATUS",
            "userId": kap_user,
            "data": {"status": "ARCHIVED"},
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("Invalid status"),
        "{body}"
    );
}

#[tokio::test]
async fn transfer_flow_over_http() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;
    let ticket = create_ticket(&app, &gov_org, &gov_dept, &company_org, &company_dept, &kap_user)
        .await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "OPEN_TRANSFER",
            "userId": kap_user,
            "data": {
                "type": "DEPARTMENT",
                "organizationId": gov_org,
                "currentDepartmentId": gov_dept,
                "reason": "Wrong department",
                "target": {"kind": "DEPARTMENT", "id": uuid::Uuid::new_v4()},
            },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("TRANSFER_REQUESTED"));

    let (status, body) =
        request(&app, "GET", &format!("/tickets/{ticket_id}/transfers"), None).await;
    assert_eq!(status, StatusCode::OK);
    let requests = body["data"].as_array().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["approval"], json!("PENDING"));
    let request_id = requests[0]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "PATCH",
        &format!("/tickets/{ticket_id}"),
        Some(json!({
            "actionType": "RESOLVE_TRANSFER",
            "userId": kap_user,
            "data": {
                "requestId": request_id,
                "approval": "APPROVED",
                "acceptance": "APPROVED",
                "status": "IN_PROGRESS",
            },
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], json!("IN_PROGRESS"));
}

#[tokio::test]
async fn detail_view_is_404_for_missing_tickets() {
    let app = app().await;

    let (status, body) = request(
        &app,
        "GET",
        &format!("/tickets/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["data"], Value::Null);
}

#[tokio::test]
async fn delete_is_400_for_missing_tickets() {
    let app = app().await;
    let (gov_org, gov_dept, company_org, company_dept, kap_user) = seed(&app).await;
    let ticket = create_ticket(&app, &gov_org, &gov_dept, &company_org, &company_dept, &kap_user)
        .await;
    let ticket_id = ticket["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = request(
        &app,
        "DELETE",
        &format!("/tickets/{}", uuid::Uuid::new_v4()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    // The existing ticket is untouched, then deleted for real.
    let (status, _) = request(&app, "DELETE", &format!("/tickets/{ticket_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request(&app, "GET", &format!("/tickets/{ticket_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_round_trip() {
    let app = app().await;
    seed(&app).await;

    let (status, body) = request(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"username": "dana", "password": "user-password-123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["username"], json!("dana"));
    assert!(body["data"].get("passwordHash").is_none());

    let (status, body) = request(
        &app,
        "POST",
        "/auth/login",
        Some(json!({"username": "dana", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}
