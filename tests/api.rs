use std::num::NonZeroUsize;
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;
use uuid::Uuid;

use eventboard::config::Config;
use eventboard::handlers::AppState;
use eventboard::routes::create_routes;
use eventboard::store::{HttpBackend, MemoryBackend, Mirror};
use eventboard::{
    EditSession, Event, EventBackend, EventDraft, EventError, EventField, EventStatus, EventStore,
    Pager, Source, StoreError,
};

fn app() -> Router {
    let state = AppState::new(Arc::new(MemoryBackend::new()));
    create_routes(state, &Config::default())
}

fn music_fest() -> Value {
    json!({
        "title": "Music Fest",
        "date": "2025-09-01",
        "location": "LA",
        "contactNumber": "123",
        "organizerName": "Jane",
        "description": "Fun"
    })
}

fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: "Fun".to_string(),
        date: "2025-09-01".to_string(),
        location: "LA".to_string(),
        contact_number: "123".to_string(),
        organizer_name: "Jane".to_string(),
        status: None,
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request");

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn spawn_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app()).await.expect("serve");
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_reports_ok_with_security_headers() {
    let app = app();
    let request = Request::get("/health").body(Body::empty()).expect("request");
    let response = app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().get("strict-transport-security").is_none());
}

#[tokio::test]
async fn create_returns_pending_event() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/events", Some(music_fest())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "PENDING");
    assert_eq!(body["data"]["title"], "Music Fest");
    assert!(body["data"]["id"].as_str().unwrap().parse::<Uuid>().is_ok());
}

#[tokio::test]
async fn create_ignores_requested_status() {
    let app = app();
    let mut payload = music_fest();
    payload["status"] = json!("APPROVED");

    let (status, body) = send(&app, Method::POST, "/api/events", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "PENDING");
}

#[tokio::test]
async fn create_rejects_missing_field_with_detail() {
    let app = app();
    let mut payload = music_fest();
    payload["contactNumber"] = json!("");

    let (status, body) = send(&app, Method::POST, "/api/events", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "contactNumber");
}

#[tokio::test]
async fn create_with_duplicate_id_conflicts() {
    let app = app();
    let mut payload = music_fest();
    payload["id"] = json!(Uuid::new_v4());

    let (first, _) = send(&app, Method::POST, "/api/events", Some(payload.clone())).await;
    let (second, body) = send(&app, Method::POST, "/api/events", Some(payload)).await;
    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn update_applies_lifecycle_rules() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/events", Some(music_fest())).await;
    let uri = format!("/api/events/{}", created["data"]["id"].as_str().unwrap());

    let mut approve = music_fest();
    approve["status"] = json!("APPROVED");
    let (status, body) = send(&app, Method::PUT, &uri, Some(approve)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "APPROVED");

    let mut reject = music_fest();
    reject["status"] = json!("REJECTED");
    let (status, body) = send(&app, Method::PUT, &uri, Some(reject)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ILLEGAL_TRANSITION");

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["status"], "APPROVED");
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app();
    let (_, created) = send(&app, Method::POST, "/api/events", Some(music_fest())).await;
    let uri = format!("/api/events/{}", created["data"]["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, Method::GET, "/api/events", None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn store_over_http_end_to_end() {
    let base_url = spawn_server().await;
    let dir = tempfile::tempdir().expect("tempdir");
    let store = EventStore::new(HttpBackend::new(&base_url)).with_mirror(Mirror::in_dir(dir.path()));

    let created = store.create(&draft("Music Fest")).await.expect("create");
    assert_eq!(created.status, EventStatus::Pending);
    assert_eq!(store.get(created.id).await.expect("get"), created);

    store.approve(created.id).await.expect("approve");
    let listing = store.list().await.expect("list");
    assert_eq!(listing.source, Source::Backend);
    let listed = listing.events.iter().find(|e| e.id == created.id).expect("listed");
    assert_eq!(listed.status, EventStatus::Approved);

    assert!(matches!(
        store.reject(created.id).await,
        Err(EventError::IllegalTransition { .. })
    ));

    store.delete(created.id).await.expect("delete");
    assert!(matches!(store.delete(created.id).await, Err(EventError::NotFound(_))));
    let listing = store.list().await.expect("list");
    assert!(listing.events.iter().all(|e| e.id != created.id));

    let mirrored = Mirror::in_dir(dir.path()).load().await.expect("mirror");
    assert_eq!(mirrored, Some(listing.events));
}

#[tokio::test]
async fn paging_and_inline_edit_over_http() {
    let base_url = spawn_server().await;
    let store = EventStore::new(HttpBackend::new(&base_url));
    for n in 1..=5 {
        store.create(&draft(&format!("event {}", n))).await.expect("create");
    }

    let events = store.list().await.expect("list").events;
    let mut pager = Pager::new(NonZeroUsize::new(4).unwrap());
    assert_eq!(pager.page(&events).slice.len(), 4);
    assert!(pager.next());
    let last = pager.page(&events).slice.to_vec();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].details.title, "event 5");

    let mut session = EditSession::new();
    session.begin(&events[0]);
    session.begin(&last[0]);
    session.set_field(EventField::Title, "event 5, edited").expect("edit");
    store.delete(last[0].id).await.expect("delete");
    assert!(matches!(session.save(&store).await, Err(EventError::NotFound(_))));
    assert!(!session.is_editing());

    let events = store.list().await.expect("list").events;
    let view = pager.page(&events);
    assert_eq!(view.page_index, 1);
    assert_eq!(view.total_pages, 1);
    assert_eq!(events[0].details.title, "event 1");
}

#[tokio::test]
async fn mirror_serves_listing_when_server_is_gone() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base_url = spawn_server().await;
    let online = EventStore::new(HttpBackend::new(&base_url)).with_mirror(Mirror::in_dir(dir.path()));
    let created = online.create(&draft("cached")).await.expect("create");

    let offline = EventStore::new(HttpBackend::new("http://127.0.0.1:9"))
        .with_mirror(Mirror::in_dir(dir.path()));
    let listing = offline.list().await.expect("fallback listing");
    assert_eq!(listing.source, Source::Mirror);
    assert_eq!(listing.events, vec![created]);

    assert!(matches!(
        offline.create(&draft("never written")).await,
        Err(EventError::Store(StoreError::Http(_)))
    ));
    let mirrored = Mirror::in_dir(dir.path()).load().await.expect("mirror");
    assert_eq!(mirrored.map(|events| events.len()), Some(1));
}

#[tokio::test]
async fn stale_reject_from_second_session_is_illegal_transition() {
    let base_url = spawn_server().await;
    let first = EventStore::new(HttpBackend::new(&base_url));
    let second = EventStore::new(HttpBackend::new(&base_url));

    let created = first.create(&draft("shared")).await.expect("create");
    let seen = second.list().await.expect("list").events;
    assert_eq!(seen[0].status, EventStatus::Pending);

    first.approve(created.id).await.expect("approve");
    match second.reject(created.id).await {
        Err(EventError::IllegalTransition { from, to }) => {
            assert_eq!(from, Some(EventStatus::Approved));
            assert_eq!(to, EventStatus::Rejected);
        }
        other => panic!("expected illegal transition, got {:?}", other),
    }
}

#[tokio::test]
async fn server_rejections_keep_their_kind() {
    let base_url = spawn_server().await;
    let store = EventStore::new(HttpBackend::new(&base_url));
    let backend = HttpBackend::new(&base_url);

    let pending = store.create(&draft("shared")).await.expect("create");
    store.approve(pending.id).await.expect("approve");

    // Replace built from a copy read before the approval.
    let stale = Event {
        status: EventStatus::Rejected,
        ..pending.clone()
    };
    let err = backend.replace(&stale).await.expect_err("stale replace");
    assert!(matches!(err, StoreError::Rejected { ref code, .. } if code == "ILLEGAL_TRANSITION"));
    assert!(matches!(
        EventError::from(err),
        EventError::IllegalTransition {
            from: Some(EventStatus::Approved),
            to: EventStatus::Rejected
        }
    ));

    let mut invalid = pending.clone();
    invalid.id = Uuid::new_v4();
    invalid.details.title = String::new();
    let err = backend.insert(&invalid).await.expect_err("invalid insert");
    match EventError::from(err) {
        EventError::Validation { field, .. } => assert_eq!(field, EventField::Title),
        other => panic!("expected validation error, got {:?}", other),
    }
}
