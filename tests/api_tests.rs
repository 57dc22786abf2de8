use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use habitarr::config::Config;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    // A single pooled connection keeps every query on the same in-memory database
    config.general.max_db_connections = 1;
    config.general.min_db_connections = 1;

    let state = habitarr::api::create_app_state(config, None)
        .await
        .expect("Failed to create app state");
    habitarr::api::router(state).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", mime::APPLICATION_JSON.as_ref())
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send_get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn register_user(app: &Router, username: &str) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/users",
        &json!({"username": username, "password": "hunter22"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    i32::try_from(body["id"].as_i64().unwrap()).unwrap()
}

async fn create_habit(app: &Router, user_id: i32, name: &str) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/habits",
        &json!({"user_id": user_id, "habit_name": name}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    i32::try_from(body["id"].as_i64().unwrap()).unwrap()
}

async fn log_progress(app: &Router, habit_id: i32, date: &str, status_flag: bool) -> i32 {
    let (status, body) = send_json(
        app,
        "POST",
        "/progress",
        &json!({"habit_id": habit_id, "date": date, "status": status_flag}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    i32::try_from(body["id"].as_i64().unwrap()).unwrap()
}

#[tokio::test]
async fn test_register_returns_created_user() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/users",
        &json!({"username": "alice", "password": "secret123"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body["id"].as_i64().unwrap() > 0);
    // The password digest must never appear in a response
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_blank_username() {
    let app = spawn_app().await;

    for username in ["", "   "] {
        let (status, body) = send_json(
            &app,
            "POST",
            "/users",
            &json!({"username": username, "password": "secret123"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Username cannot be empty.");
    }
}

#[tokio::test]
async fn test_register_password_length_boundary() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/users",
        &json!({"username": "bob", "password": "12345"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters long.");

    // Exactly six characters is accepted, and login is unaffected by length
    let (status, _) = send_json(
        &app,
        "POST",
        "/users",
        &json!({"username": "bob", "password": "123456"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        &json!({"username": "bob", "password": "123456"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "bob");
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = spawn_app().await;
    register_user(&app, "carol").await;

    // Same username, different password: still a conflict
    let (status, body) = send_json(
        &app,
        "POST",
        "/users",
        &json!({"username": "carol", "password": "completely-different"}),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Username already taken. Please choose a different one."
    );
}

#[tokio::test]
async fn test_login_roundtrip() {
    let app = spawn_app().await;
    let id = register_user(&app, "dave").await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        &json!({"username": "dave", "password": "hunter22"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), i64::from(id));
    assert_eq!(body["username"], "dave");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = spawn_app().await;
    register_user(&app, "erin").await;

    let (wrong_pw_status, wrong_pw_body) = send_json(
        &app,
        "POST",
        "/login",
        &json!({"username": "erin", "password": "not-the-password"}),
    )
    .await;

    let (no_user_status, no_user_body) = send_json(
        &app,
        "POST",
        "/login",
        &json!({"username": "nobody", "password": "whatever1"}),
    )
    .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(no_user_status, StatusCode::UNAUTHORIZED);
    // Identical bodies: the endpoint must not leak which field was wrong
    assert_eq!(wrong_pw_body, no_user_body);
    assert_eq!(wrong_pw_body["message"], "Invalid username or password.");
}

#[tokio::test]
async fn test_login_requires_password() {
    let app = spawn_app().await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/login",
        &json!({"username": "frank", "password": ""}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password is required.");
}

#[tokio::test]
async fn test_lookup_user() {
    let app = spawn_app().await;
    let id = register_user(&app, "grace").await;

    let (status, body) = send_get(&app, "/users").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username query parameter is required.");

    let (status, body) = send_get(&app, "/users?username=nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found.");

    let (status, body) = send_get(&app, "/users?username=grace").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"].as_i64().unwrap(), i64::from(id));
    assert_eq!(body["username"], "grace");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_username_lookup_is_case_sensitive() {
    let app = spawn_app().await;
    register_user(&app, "Heidi").await;

    let (status, _) = send_get(&app, "/users?username=heidi").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_get(&app, "/users?username=Heidi").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_create_habit_validation() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "ivan").await;

    for name in ["", "   "] {
        let (status, body) = send_json(
            &app,
            "POST",
            "/habits",
            &json!({"user_id": user_id, "habit_name": name}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Habit name is required.");
    }

    let (status, _) = send_json(
        &app,
        "POST",
        "/habits",
        &json!({"user_id": 0, "habit_name": "Read"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_habit_round_trip_preserves_optional_fields() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "judy").await;

    let (status, created) = send_json(
        &app,
        "POST",
        "/habits",
        &json!({
            "user_id": user_id,
            "habit_name": "Morning run",
            "category": "Health",
            "description": "x"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["category"], "Health");
    assert_eq!(created["description"], "x");
    assert!(created["created_at"].is_string());

    // Omitted optional fields come back as null, not empty strings
    let (status, bare) = send_json(
        &app,
        "POST",
        "/habits",
        &json!({"user_id": user_id, "habit_name": "Floss"}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(bare["category"].is_null());
    assert!(bare["description"].is_null());

    let (status, listed) = send_get(&app, &format!("/habits?user_id={user_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let habits = listed.as_array().unwrap();
    assert_eq!(habits.len(), 2);
    assert_eq!(habits[0]["habit_name"], "Morning run");
    assert_eq!(habits[0]["category"], "Health");
    assert_eq!(habits[0]["description"], "x");
    assert!(habits[1]["category"].is_null());
    assert!(habits[1]["description"].is_null());
}

#[tokio::test]
async fn test_list_habits_requires_user_id() {
    let app = spawn_app().await;

    let (status, body) = send_get(&app, "/habits").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User ID is required.");
}

#[tokio::test]
async fn test_update_habit_is_ownership_scoped() {
    let app = spawn_app().await;
    let owner = register_user(&app, "kim").await;
    let other = register_user(&app, "leo").await;
    let habit_id = create_habit(&app, owner, "Stretch").await;

    // Foreign owner: zero rows matched
    let (status, foreign_body) = send_json(
        &app,
        "PUT",
        &format!("/habits/{habit_id}"),
        &json!({"habit_name": "Hijacked", "user_id": other}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nonexistent habit: indistinguishable from the foreign-owner case
    let (status, missing_body) = send_json(
        &app,
        "PUT",
        "/habits/9999",
        &json!({"habit_name": "Ghost", "user_id": owner}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, missing_body);
    assert_eq!(missing_body["message"], "Habit not found or unauthorized.");

    // Rightful owner succeeds
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/habits/{habit_id}"),
        &json!({"habit_name": "Stretch more", "category": "Health", "user_id": owner}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Habit updated successfully.");

    let (_, listed) = send_get(&app, &format!("/habits?user_id={owner}")).await;
    assert_eq!(listed[0]["habit_name"], "Stretch more");
    assert_eq!(listed[0]["category"], "Health");
}

#[tokio::test]
async fn test_update_habit_rejects_empty_name() {
    let app = spawn_app().await;
    let owner = register_user(&app, "mallory").await;
    let habit_id = create_habit(&app, owner, "Journal").await;

    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/habits/{habit_id}"),
        &json!({"habit_name": "  ", "user_id": owner}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Habit name is required.");
}

#[tokio::test]
async fn test_delete_habit_is_ownership_scoped() {
    let app = spawn_app().await;
    let owner = register_user(&app, "nina").await;
    let other = register_user(&app, "oscar").await;
    let habit_id = create_habit(&app, owner, "Meditate").await;

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}"),
        &json!({"user_id": other}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}"),
        &json!({"user_id": owner}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Habit deleted successfully.");

    let (_, listed) = send_get(&app, &format!("/habits?user_id={owner}")).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_log_progress_duplicate_date_is_conflict() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "peggy").await;
    let habit_id = create_habit(&app, user_id, "Hydrate").await;

    log_progress(&app, habit_id, "2026-08-01", true).await;

    // Same (habit, date) pair, even with a different status: conflict, not upsert
    let (status, body) = send_json(
        &app,
        "POST",
        "/progress",
        &json!({"habit_id": habit_id, "date": "2026-08-01", "status": false}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "Progress for this habit already logged for this date."
    );

    // A different date is fine
    let (status, _) = send_json(
        &app,
        "POST",
        "/progress",
        &json!({"habit_id": habit_id, "date": "2026-08-02", "status": false}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_log_progress_rejects_invalid_date() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "quinn").await;
    let habit_id = create_habit(&app, user_id, "Sleep early").await;

    for date in ["01-08-2026", "2026-13-40", "yesterday"] {
        let (status, _) = send_json(
            &app,
            "POST",
            "/progress",
            &json!({"habit_id": habit_id, "date": date, "status": true}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "date {date} should fail");
    }
}

#[tokio::test]
async fn test_update_progress_scoping_and_collision() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "rupert").await;
    let habit_id = create_habit(&app, user_id, "Pushups").await;
    let other_habit = create_habit(&app, user_id, "Situps").await;

    let first = log_progress(&app, habit_id, "2026-08-01", true).await;
    let second = log_progress(&app, habit_id, "2026-08-02", false).await;

    // Mismatched habit id: zero rows matched
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/progress/{second}"),
        &json!({"date": "2026-08-03", "status": true, "habit_id": other_habit}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Progress entry not found or unauthorized.");

    // Moving the second entry onto the first entry's date collides
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/progress/{second}"),
        &json!({"date": "2026-08-01", "status": true, "habit_id": habit_id}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["message"],
        "A progress entry for this habit already exists on this date."
    );

    // Updating in place (same date, flipped status) succeeds
    let (status, body) = send_json(
        &app,
        "PUT",
        &format!("/progress/{first}"),
        &json!({"date": "2026-08-01", "status": false, "habit_id": habit_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Progress updated successfully.");

    let (_, listed) = send_get(&app, &format!("/progress?habit_id={habit_id}")).await;
    let entries = listed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["status"], false);
}

#[tokio::test]
async fn test_delete_habit_cascades_to_progress() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "sybil").await;
    let habit_id = create_habit(&app, user_id, "Walk").await;

    let entry_a = log_progress(&app, habit_id, "2026-08-01", true).await;
    let entry_b = log_progress(&app, habit_id, "2026-08-02", false).await;

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/habits/{habit_id}"),
        &json!({"user_id": user_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Cascade removed the entries
    let (status, listed) = send_get(&app, &format!("/progress?habit_id={habit_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(listed.as_array().unwrap().is_empty());

    // And the orphaned ids are gone for update/delete alike
    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/progress/{entry_a}"),
        &json!({"date": "2026-08-05", "status": true, "habit_id": habit_id}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/progress/{entry_b}"),
        &json!({"habit_id": habit_id}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_progress() {
    let app = spawn_app().await;
    let user_id = register_user(&app, "trent").await;
    let habit_id = create_habit(&app, user_id, "Code").await;
    let entry = log_progress(&app, habit_id, "2026-08-01", true).await;

    // Mismatched habit id first
    let (status, _) = send_json(
        &app,
        "DELETE",
        &format!("/progress/{entry}"),
        &json!({"habit_id": habit_id + 1}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(
        &app,
        "DELETE",
        &format!("/progress/{entry}"),
        &json!({"habit_id": habit_id}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Progress deleted successfully.");

    // Same date can be logged again after deletion
    log_progress(&app, habit_id, "2026-08-01", false).await;
}

#[tokio::test]
async fn test_list_progress_requires_habit_id() {
    let app = spawn_app().await;

    let (status, body) = send_get(&app, "/progress").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Habit ID is required.");
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = spawn_app().await;

    let (status, body) = send_get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}
