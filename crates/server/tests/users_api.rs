use std::path::PathBuf;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    router: Router,
    dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

impl TestApp {
    fn data_file(&self) -> PathBuf {
        self.dir.join("users.json")
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send_raw(req).await
    }

    async fn send_raw(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    async fn create(&self, name: &str, email: &str) -> Value {
        let (status, body) = self.send("POST", "/api/users", Some(json!({"name": name, "email": email}))).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

fn app_with_file(dir: PathBuf, data_file: PathBuf) -> TestApp {
    let mut cfg = configs::AppConfig::default();
    cfg.storage.data_file = data_file;
    TestApp { router: server::startup::build_app(&cfg), dir }
}

fn app() -> TestApp {
    let dir = std::env::temp_dir().join(format!("users_api_{}", Uuid::new_v4()));
    let file = dir.join("users.json");
    app_with_file(dir, file)
}

#[tokio::test]
async fn health_ok() {
    let app = app();
    let (status, body) = app.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn scenario_create_conflict_and_paging() {
    let app = app();

    let (status, body) = app.send("POST", "/api/users", Some(json!({"name": "Ann", "email": "ANN@X.com"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "User created successfully");
    assert_eq!(body["data"]["email"], "ann@x.com");
    assert_eq!(body["data"]["phone"], "");
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"].get("updatedAt").is_none());

    let (status, body) = app.send("POST", "/api/users", Some(json!({"name": "Bob", "email": "ann@x.com"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"success": false, "message": "User with this email already exists"}));

    let (status, body) = app.send("GET", "/api/users?limit=1&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"], json!({"page": 2, "limit": 1, "total": 1, "pages": 1}));
}

#[tokio::test]
async fn create_validation_failures() {
    let app = app();
    let (status, body) = app.send("POST", "/api/users", Some(json!({"name": "Ann"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and email are required");

    let (status, body) = app.send("POST", "/api/users", Some(json!({"name": "Ann", "email": "nope"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email format");

    let req = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let (status, body) = app.send_raw(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "message": "Invalid JSON body"}));

    let (_, body) = app.send("GET", "/api/users", None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn get_update_delete_lifecycle() {
    let app = app();
    let ann = app.create("Ann", "ann@x.com").await;
    let id = ann["id"].as_str().unwrap().to_string();
    let uri = format!("/api/users/{id}");

    let (status, body) = app.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], ann);
    assert!(body.get("message").is_none());

    let (status, body) = app
        .send("PUT", &uri, Some(json!({"name": " Ann Lee ", "email": "ANN@x.com", "phone": " 555 "})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User updated successfully");
    assert_eq!(body["data"]["id"], ann["id"]);
    assert_eq!(body["data"]["createdAt"], ann["createdAt"]);
    assert_eq!(body["data"]["name"], "Ann Lee");
    assert_eq!(body["data"]["phone"], "555");
    assert!(body["data"]["updatedAt"].is_string());

    let (status, body) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");
    assert_eq!(body["data"]["name"], "Ann Lee");

    let (status, body) = app.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "User not found"}));
    let (status, _) = app.send("DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_missing_user_is_404_whatever_the_body() {
    let app = app();
    let uri = format!("/api/users/{}", Uuid::new_v4());
    let (status, _) = app.send("PUT", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("PUT", &uri, Some(json!({"name": "A", "email": "bad"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let req = Request::builder()
        .method("PUT")
        .uri(&uri)
        .header("content-type", "application/json")
        .body(Body::from("garbage"))
        .unwrap();
    let (status, _) = app.send_raw(req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.send("GET", "/api/users/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_conflict_with_other_user() {
    let app = app();
    let ann = app.create("Ann", "ann@x.com").await;
    app.create("Bob", "bob@x.com").await;
    let uri = format!("/api/users/{}", ann["id"].as_str().unwrap());
    let (status, body) = app.send("PUT", &uri, Some(json!({"name": "Ann", "email": "Bob@X.com"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    let (status, _) = app.send("PUT", &uri, Some(json!({"name": "", "email": "ann@x.com"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_search_sort_and_defaults() {
    let app = app();
    app.create("Charlie", "charlie@corp.io").await;
    app.create("alice", "alice@home.net").await;
    app.create("Bob", "bob@corp.io").await;

    let (_, body) = app.send("GET", "/api/users?search=CORP", None).await;
    assert_eq!(body["pagination"], json!({"page": 1, "limit": 10, "total": 2, "pages": 1}));

    let (_, body) = app.send("GET", "/api/users?sortBy=name", None).await;
    let names: Vec<&str> = body["data"].as_array().unwrap().iter().map(|u| u["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["alice", "Bob", "Charlie"]);

    let (_, body) = app.send("GET", "/api/users?sortBy=email&order=desc&limit=2", None).await;
    let emails: Vec<&str> = body["data"].as_array().unwrap().iter().map(|u| u["email"].as_str().unwrap()).collect();
    assert_eq!(emails, ["charlie@corp.io", "bob@corp.io"]);
    assert_eq!(body["pagination"]["pages"], 2);

    let (status, body) = app.send("GET", "/api/users?page=abc&limit=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 10);
}

#[tokio::test]
async fn last_page_is_partial() {
    let app = app();
    for i in 0..7 {
        app.create(&format!("user{i}"), &format!("user{i}@x.io")).await;
    }
    let mut seen = Vec::new();
    for page in 1..=3 {
        let (status, body) = app.send("GET", &format!("/api/users?limit=3&page={page}&sortBy=name"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"], json!({"page": page, "limit": 3, "total": 7, "pages": 3}));
        let names: Vec<String> = body["data"].as_array().unwrap().iter().map(|u| u["name"].as_str().unwrap().to_string()).collect();
        assert_eq!(names.len(), if page < 3 { 3 } else { 1 });
        seen.extend(names);
    }
    assert_eq!(seen, (0..7).map(|i| format!("user{i}")).collect::<Vec<_>>());

    let (_, body) = app.send("GET", "/api/users?limit=3&page=4", None).await;
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["pagination"]["pages"], 3);
}

#[tokio::test]
async fn limit_above_one_hundred_is_honoured() {
    let dir = std::env::temp_dir().join(format!("users_api_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("users.json");
    let seeded: Vec<Value> = (0..150)
        .map(|i| json!({
            "id": Uuid::new_v4(),
            "name": format!("user{i}"),
            "email": format!("user{i}@x.io"),
            "createdAt": "2024-05-01T10:00:00.000Z"
        }))
        .collect();
    std::fs::write(&file, serde_json::to_vec(&seeded).unwrap()).unwrap();
    let app = app_with_file(dir, file);

    let (status, body) = app.send("GET", "/api/users?limit=150", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 150);
    assert_eq!(body["pagination"], json!({"page": 1, "limit": 150, "total": 150, "pages": 1}));
}

#[tokio::test]
async fn search_keeps_whitespace() {
    let app = app();
    app.create("Ann Lee", "ann@x.io").await;
    app.create("Johnny", "johnny@x.io").await;

    let (_, body) = app.send("GET", "/api/users?search=%20", None).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Ann Lee");

    let (_, body) = app.send("GET", "/api/users?search=john%20", None).await;
    assert_eq!(body["pagination"]["total"], 0);
}

#[tokio::test]
async fn updated_user_survives_a_new_app_instance() {
    let app = app();
    let ann = app.create("Ann", "ann@x.com").await;
    let uri = format!("/api/users/{}", ann["id"].as_str().unwrap());
    let (status, body) = app.send("PUT", &uri, Some(json!({"name": "Ann Lee", "email": "ann@x.com", "address": "2 High St"}))).await;
    assert_eq!(status, StatusCode::OK);
    let updated = body["data"].clone();
    let stamp = updated["updatedAt"].as_str().unwrap();
    // millisecond ISO-8601, e.g. 2024-05-01T10:00:00.123Z
    assert_eq!(stamp.len(), 24);
    assert!(stamp.ends_with('Z'));

    let stored: Value = serde_json::from_str(&std::fs::read_to_string(app.data_file()).unwrap()).unwrap();
    assert_eq!(stored, json!([updated.clone()]));

    let again = app_with_file(app.dir.clone(), app.data_file());
    let (status, body) = again.send("GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], updated);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = app();
    let (status, body) = app.send("GET", "/api/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Route not found"}));
}

#[tokio::test]
async fn storage_failure_is_opaque_500() {
    let dir = std::env::temp_dir().join(format!("users_api_{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    // the data file path is a directory, so reads fail
    let app = app_with_file(dir.clone(), dir.clone());
    let (status, body) = app.send("GET", "/api/users", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"success": false, "message": "Internal server error"}));
}

#[tokio::test]
async fn data_survives_a_new_app_instance() {
    let app = app();
    let ann = app.create("Ann", "ann@x.com").await;
    let raw = std::fs::read_to_string(app.data_file()).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, json!([ann.clone()]));

    let again = app_with_file(app.dir.clone(), app.data_file());
    let (status, body) = again.send("GET", &format!("/api/users/{}", ann["id"].as_str().unwrap()), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], ann);
}
