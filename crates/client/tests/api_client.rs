//! Integration tests for `TimetablerApi` against a local axum stand-in for
//! the backend.

use assert_matches::assert_matches;
use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use timetabler_client::api::{ApiError, TimetablerApi};
use timetabler_core::error::CoreError;
use timetabler_core::models::{
    AcademicHalf, CreateTimetable, Lecturer, Room, StudentGroup, Timetable, UpdateStudentGroup,
};
use timetabler_core::roles::Role;
use timetabler_core::session::Session;
use tokio::net::TcpListener;

const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn timetable_json(id: i64, is_active: bool) -> Value {
    json!({
        "id": id,
        "name": "2026 Semester 1",
        "semester": "First",
        "year": 2026,
        "academic_half": "first_half",
        "is_active": is_active,
        "generation_metadata": null,
    })
}

async fn list_timetables(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!([timetable_json(1, true), timetable_json(2, false)])))
}

async fn create_timetable(Json(body): Json<Value>) -> Json<Value> {
    let mut created = body;
    created["id"] = json!(42);
    created["is_active"] = json!(false);
    created["generation_metadata"] = Value::Null;
    Json(created)
}

async fn activate_timetable(Path(id): Path<i64>) -> Json<Value> {
    Json(timetable_json(id, true))
}

async fn timetable_detail(Path(id): Path<i64>) -> Json<Value> {
    let mut detail = timetable_json(id, false);
    detail["generation_metadata"] = json!({
        "generated": true,
        "generated_at": "2026-03-01T09:00:00",
        "levels_processed": [5, 4, 3, 2],
    });
    detail["slots"] = json!([{
        "id": 1,
        "timetable_id": id,
        "course_id": 10,
        "lecturer_id": 20,
        "room_id": 30,
        "group_id": 40,
        "day_of_week": 0,
        "start_time": "08:00:00",
        "end_time": "10:00:00",
        "session_type": "lecture",
    }]);
    Json(detail)
}

async fn delete_timetable(Path(_id): Path<i64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn list_rooms() -> Json<Value> {
    // `capacity` is missing.
    Json(json!([{ "id": 1, "name": "LT1", "building": "Main", "room_type": "lecture_hall" }]))
}

async fn get_lecturer(Path(id): Path<i64>) -> (StatusCode, String) {
    (
        StatusCode::NOT_FOUND,
        format!(r#"{{"detail":"Lecturer {id} not found"}}"#),
    )
}

async fn update_group(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "id": id,
        "name": "CS L3 A",
        "level": 3,
        "department_id": 1,
        "size": body["size"],
    }))
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    if body["username"] != "coordinator" {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({ "access_token": TOKEN, "token_type": "bearer" })))
}

async fn me(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "id": 1,
        "email": "coordinator@uni.example",
        "username": "coordinator",
        "full_name": "Ada Coordinator",
        "role": "coordinator",
        "department_id": null,
        "is_active": true,
    })))
}

async fn bulk_upload_courses(mut multipart: Multipart) -> Json<Value> {
    let mut errors = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        if name != "file" || file_name != "courses.csv" || content_type != "text/csv" {
            errors.push(format!("unexpected part {name} {file_name} {content_type}"));
        }
        if bytes.is_empty() {
            errors.push("empty file".to_string());
        }
    }
    errors.push("Row 3: duplicate code CS101".to_string());
    Json(json!({ "status": "success", "created": 2, "skipped": 1, "errors": errors }))
}

async fn bulk_upload_rooms(mut multipart: Multipart) -> Json<Value> {
    while multipart.next_field().await.unwrap().is_some() {}
    Json(json!({ "status": "success", "created": 1, "updated": 12, "skipped": 0, "errors": null }))
}

async fn spawn_backend() -> TimetablerApi {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/timetables/", get(list_timetables).post(create_timetable))
        .route(
            "/api/timetables/{id}",
            get(timetable_detail).delete(delete_timetable),
        )
        .route("/api/timetables/{id}/activate", post(activate_timetable))
        .route("/api/rooms/", get(list_rooms))
        .route("/api/lecturers/{id}", get(get_lecturer))
        .route("/api/groups/{id}", put(update_group))
        .route("/api/courses/bulk-upload", post(bulk_upload_courses))
        .route("/api/rooms/bulk-upload", post(bulk_upload_rooms));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TimetablerApi::new(format!("http://{addr}/"))
}

fn session() -> Session {
    Session::with_token(TOKEN)
}

// ---------------------------------------------------------------------------
// Timetables
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_timetables_sends_bearer_token() {
    let api = spawn_backend().await;

    let timetables = api.list::<Timetable>(&session()).await.unwrap();

    assert_eq!(timetables.len(), 2);
    assert!(timetables[0].is_active);
    assert_eq!(timetables[1].id, 2);
    assert!(!timetables[1].is_generated());
}

#[tokio::test]
async fn wrong_token_surfaces_status() {
    let api = spawn_backend().await;

    let err = api
        .list::<Timetable>(&Session::with_token("stale"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn create_timetable_returns_typed_row() {
    let api = spawn_backend().await;
    let payload = CreateTimetable {
        name: "2026 Semester 2".to_string(),
        semester: "Second".to_string(),
        year: 2026,
        academic_half: AcademicHalf::SecondHalf,
    };

    let created: Timetable = api.create(&session(), &payload).await.unwrap();

    assert_eq!(created.id, 42);
    assert_eq!(created.name, "2026 Semester 2");
    assert_eq!(created.academic_half, AcademicHalf::SecondHalf);
    assert!(!created.is_generated());
}

#[tokio::test]
async fn invalid_create_payload_is_rejected_before_sending() {
    let api = spawn_backend().await;
    let payload = CreateTimetable {
        name: String::new(),
        semester: "First".to_string(),
        year: 2026,
        academic_half: AcademicHalf::FirstHalf,
    };

    let err = api
        .create::<Timetable>(&session(), &payload)
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Core(CoreError::Validation(_)));
}

#[tokio::test]
async fn activate_and_delete_timetable() {
    let api = spawn_backend().await;

    let activated = api.activate_timetable(&session(), 2).await.unwrap();
    assert_eq!(activated.id, 2);
    assert!(activated.is_active);

    api.delete::<Timetable>(&session(), 2).await.unwrap();
}

#[tokio::test]
async fn timetable_detail_includes_slots() {
    let api = spawn_backend().await;

    let detail = api.timetable_detail(&session(), 42).await.unwrap();

    assert_eq!(detail.timetable.id, 42);
    assert!(detail.timetable.is_generated());
    assert_eq!(detail.slots.len(), 1);
    assert_eq!(detail.slots[0].start_time, "08:00:00");
}

// ---------------------------------------------------------------------------
// Typed contracts and errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn contract_mismatch_is_a_decode_error() {
    let api = spawn_backend().await;

    let err = api.list::<Room>(&session()).await.unwrap_err();

    assert_matches!(err, ApiError::Decode { ref endpoint, .. } if endpoint.ends_with("/api/rooms/"));
}

#[tokio::test]
async fn not_found_carries_body() {
    let api = spawn_backend().await;

    let err = api.get::<Lecturer>(&session(), 9).await.unwrap_err();

    assert_matches!(err, ApiError::Status { status: 404, ref body } if body.contains("Lecturer 9"));
}

#[tokio::test]
async fn missing_token_never_reaches_backend() {
    let api = spawn_backend().await;

    let err = api.list::<Timetable>(&Session::new()).await.unwrap_err();

    assert_matches!(err, ApiError::Core(CoreError::Unauthorized(_)));
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let api = spawn_backend().await;
    let update = UpdateStudentGroup {
        size: Some(85),
        ..Default::default()
    };

    let group: StudentGroup = api.update(&session(), 7, &update).await.unwrap();

    assert_eq!(group.id, 7);
    assert_eq!(group.size, 85);
}

// ---------------------------------------------------------------------------
// Auth and uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_populates_session() {
    let api = spawn_backend().await;

    let session = api.login("coordinator").await.unwrap();

    assert_eq!(session.token(), Some(TOKEN));
    assert!(session.is_coordinator());
    assert_eq!(session.role(), Some(Role::Coordinator));
    assert_eq!(session.user().unwrap().full_name, "Ada Coordinator");
}

#[tokio::test]
async fn unknown_user_cannot_log_in() {
    let api = spawn_backend().await;

    let err = api.login("nobody").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn bulk_upload_posts_multipart_csv() {
    let api = spawn_backend().await;
    let csv = b"code,name,level\nCS101,Intro,1\n".to_vec();

    let report = api
        .bulk_upload::<timetabler_core::models::Course>(&session(), "courses.csv", csv)
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.errors.as_deref(),
        Some(&["Row 3: duplicate code CS101".to_string()][..])
    );
}

#[tokio::test]
async fn rooms_bulk_upload_reports_updated_rows() {
    let api = spawn_backend().await;
    let xlsx = vec![0x50, 0x4b, 0x03, 0x04];

    let report = api
        .bulk_upload::<Room>(&session(), "rooms.xlsx", xlsx)
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.updated, 12);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.error_count(), 0);
}

#[tokio::test]
async fn bulk_upload_rejects_unknown_extension_locally() {
    let api = spawn_backend().await;

    let err = api
        .bulk_upload::<Room>(&session(), "rooms.json", b"[]".to_vec())
        .await
        .unwrap_err();

    assert_matches!(err, ApiError::Core(CoreError::Validation(_)));
}
