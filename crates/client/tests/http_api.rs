//! End-to-end tests of `ApiClient` over `HttpTransport` against an
//! in-process axum server bound to an ephemeral port.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use ranch_client::{ApiClient, ApiError, Endpoints, HttpTransport};
use ranch_forms::{FieldValue, Fields, FlowDefinition, MediaAttachment, RecordBuilder};
use serde_json::{json, Value};

/// One request as the mock server saw it.
#[derive(Debug, Clone)]
struct Captured {
    authorization: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

type Log = Arc<Mutex<Vec<Captured>>>;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn client(base_url: &str, timeout: Duration) -> ApiClient {
    ApiClient::new(
        Arc::new(HttpTransport::with_timeout(base_url, timeout)),
        Endpoints::default(),
    )
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn capture(State(log): State<Log>, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    log.lock().unwrap().push(Captured {
        authorization: header(&headers, "authorization"),
        content_type: header(&headers, "content-type"),
        body: body.to_vec(),
    });
    (StatusCode::CREATED, Json(json!({"status": "success", "message": "Saved"})))
}

fn owner_record(attachments: Vec<MediaAttachment>) -> ranch_forms::MergedRecord {
    let flow = FlowDefinition::owner();
    let mut fields = Fields::new();
    for (k, v) in [
        ("surname", "Bello"),
        ("other_names", "Musa"),
        ("gender", "MALE"),
        ("dob", "1979-11-02"),
        ("phone_number", "08031234567"),
        ("email_address", "musa@farm.ng"),
        ("nin", "12345678901"),
        ("state", "20"),
        ("lga", "301"),
        ("address1", "Gate 4, Kano"),
        ("ownership_type", "INDIVIDUAL"),
        ("next_of_kin", "Aisha Bello"),
        ("next_of_kin_number", "08030000000"),
        ("id_doc_type", "Voter card"),
        ("prof_id_doc", "VC-88"),
        ("farm_location", "Kano"),
    ] {
        fields.insert(k.to_string(), FieldValue::text(v));
    }
    fields.insert("livestock_keeper".into(), FieldValue::Flag(true));
    let mut builder = RecordBuilder::new(&flow);
    builder.add_fields(fields);
    builder.build(Some(&json!({"username": "enum01"})), attachments)
}

// ──────────────────────────────────────────────
// Login and reference data
// ──────────────────────────────────────────────

#[tokio::test]
async fn login_returns_token_and_profile() {
    let app = Router::new().route(
        "/api/auth",
        post(|Json(body): Json<Value>| async move {
            if body["useremail"] == "ade@farm.ng" && body["password"] == "secret" && body["type"] == "ENUMERATOR" {
                (StatusCode::OK, Json(json!({"token": "tok-1", "user": {"name": "Ade"}})))
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({"message": "Wrong password"})))
            }
        }),
    );
    let base = spawn(app).await;
    let api = client(&base, Duration::from_secs(5));

    let ok = api.login("ade@farm.ng", "secret").await.unwrap();
    assert_eq!(ok.token, "tok-1");
    assert_eq!(ok.user["name"], "Ade");

    let err = api.login("ade@farm.ng", "guess").await.unwrap_err();
    assert_eq!(err.user_message(), "Wrong password");
}

#[tokio::test]
async fn login_without_token_uses_generic_message() {
    let app = Router::new().route("/api/auth", post(|| async { Json(json!({"status": "ok"})) }));
    let base = spawn(app).await;
    let err = client(&base, Duration::from_secs(5))
        .login("a@b.ng", "x")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid login credentials");
}

#[tokio::test]
async fn state_locals_builds_catalog() {
    let app = Router::new().route(
        "/api/state_locals",
        get(|| async {
            Json(json!({"data": [
                {"state_id": 25, "name": "Lagos", "locals": [{"id": 1, "name": "Ikeja"}]}
            ]}))
        }),
    );
    let base = spawn(app).await;
    let catalog = client(&base, Duration::from_secs(5))
        .state_locals(Some("tok-1"))
        .await
        .unwrap();
    assert_eq!(catalog.locals_for("25").unwrap()[0].label, "Ikeja");
}

#[tokio::test]
async fn state_locals_rejects_bad_shape() {
    let app = Router::new().route("/api/state_locals", get(|| async { Json(json!({"data": 3})) }));
    let base = spawn(app).await;
    let err = client(&base, Duration::from_secs(5))
        .state_locals(None)
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid states data received from server");
}

// ──────────────────────────────────────────────
// Submission bodies
// ──────────────────────────────────────────────

#[tokio::test]
async fn record_without_attachment_is_sent_as_json() {
    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/enumerator/add_livestock_owner", post(capture))
        .with_state(log.clone());
    let base = spawn(app).await;

    client(&base, Duration::from_secs(5))
        .submit(&owner_record(vec![]), "tok-1")
        .await
        .unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer tok-1"));
    assert!(seen[0].content_type.as_deref().unwrap().starts_with("application/json"));
    let body: Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(body["email"], "musa@farm.ng");
    assert_eq!(body["livestock_keeper"], "1");
    assert_eq!(body["captured_by"], "enum01");
    assert!(body.get("email_address").is_none());
}

#[tokio::test]
async fn record_with_attachment_is_sent_as_multipart() {
    let dir = tempfile::TempDir::new().unwrap();
    let photo = dir.path().join("owner.jpg");
    std::fs::write(&photo, b"\xFF\xD8\xFF\xE0fake-jpeg").unwrap();

    let log: Log = Arc::default();
    let app = Router::new()
        .route("/api/enumerator/add_livestock_owner", post(capture))
        .with_state(log.clone());
    let base = spawn(app).await;

    let image = MediaAttachment::new("image", &format!("file://{}", photo.display()));
    client(&base, Duration::from_secs(5))
        .submit(&owner_record(vec![image]), "tok-1")
        .await
        .unwrap();

    let seen = log.lock().unwrap().clone();
    let content_type = seen[0].content_type.clone().unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
    let text = String::from_utf8_lossy(&seen[0].body);
    assert!(text.contains("name=\"date_of_birth\"\r\n\r\n1979-11-02"));
    assert!(text.contains("name=\"image\"; filename=\"profile.jpg\""));
    assert!(text.contains("fake-jpeg"));
}

// ──────────────────────────────────────────────
// Failure classification
// ──────────────────────────────────────────────

#[tokio::test]
async fn validation_failure_is_expanded() {
    let app = Router::new().route(
        "/api/enumerator/add_livestock_owner",
        post(|| async {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"message": "The given data was invalid.", "errors": {"email": ["validation.unique"]}})),
            )
        }),
    );
    let base = spawn(app).await;
    let err = client(&base, Duration::from_secs(5))
        .submit(&owner_record(vec![]), "tok-1")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 422,
            message: "email is already in use".into()
        }
    );
}

#[tokio::test]
async fn expired_token_is_reported_as_auth_expiry() {
    let app = Router::new().route(
        "/api/enumerator/add_livestock_owner",
        post(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token has expired"}))) }),
    );
    let base = spawn(app).await;
    let err = client(&base, Duration::from_secs(5))
        .submit(&owner_record(vec![]), "tok-1")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::AuthExpired);
}

#[tokio::test]
async fn slow_server_times_out() {
    let app = Router::new().route(
        "/api/enumerator/add_livestock_owner",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"status": "success"}))
        }),
    );
    let base = spawn(app).await;
    let err = client(&base, Duration::from_millis(300))
        .submit(&owner_record(vec![]), "tok-1")
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Timeout);
    assert_eq!(
        err.user_message(),
        "The request took too long. Your internet connection might be slow or unstable."
    );
}

// ──────────────────────────────────────────────
// Dashboard sources
// ──────────────────────────────────────────────

#[tokio::test]
async fn dashboard_sources_accept_every_list_shape() {
    let app = Router::new()
        .route(
            "/api/enumerator/get_livestock_owners",
            get(|| async { Json(json!({"owners": [{"created_at": "2025-01-01"}]})) }),
        )
        .route(
            "/api/enumerator/get_livestock_keepers",
            get(|| async { Json(json!({"record": {"data": [{}, {}]}})) }),
        )
        .route(
            "/api/dashboard/all_tagged_livestock",
            get(|| async { Json(json!({"status": "Failed", "message": "No tagged livestock"})) }),
        );
    let base = spawn(app).await;
    let sources = client(&base, Duration::from_secs(5))
        .dashboard_sources("tok-1")
        .await
        .unwrap();
    assert_eq!(sources.owners.len(), 1);
    assert_eq!(sources.keepers.len(), 2);
    assert!(sources.tagged.is_empty());
}

#[tokio::test]
async fn one_failing_dashboard_source_fails_the_join() {
    let app = Router::new()
        .route("/api/enumerator/get_livestock_owners", get(|| async { Json(json!([])) }))
        .route("/api/enumerator/get_livestock_keepers", get(|| async { Json(json!([])) }))
        .route(
            "/api/dashboard/all_tagged_livestock",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, Json(json!({}))) }),
        );
    let base = spawn(app).await;
    let err = client(&base, Duration::from_secs(5))
        .dashboard_sources("tok-1")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 503, .. }), "{err:?}");
}
