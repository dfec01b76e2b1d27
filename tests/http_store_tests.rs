//! HTTP gateway tests against a stub table-store server.
//!
//! The stub records each request so the tests can assert the wire details:
//! auth headers, user scoping filters, ordering params, and the
//! return=representation insert contract.

use std::sync::{Arc, Mutex};

use axum::extract::RawQuery;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use tasksync::auth::Session;
use tasksync::error::StoreError;
use tasksync::model::{NewTask, Priority, Status};
use tasksync::store::{HttpStore, Store, StoreConfig};

#[derive(Debug, Clone, Default)]
struct Recorded {
    query: String,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn record(log: &Log, query: Option<String>, headers: &HeaderMap, body: Option<Value>) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
    };
    log.lock().unwrap().push(Recorded {
        query: query.unwrap_or_default(),
        apikey: header("apikey"),
        authorization: header("authorization"),
        prefer: header("prefer"),
        body,
    });
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn store_for(base_url: String) -> HttpStore {
    HttpStore::new(StoreConfig {
        base_url,
        api_key: "test-key".to_string(),
    })
    .unwrap()
}

fn session() -> Session {
    Session {
        user_id: Uuid::new_v4(),
        access_token: "token-abc".to_string(),
    }
}

fn task_row(user_id: Uuid, title: &str, created_at: &str) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "title": title,
        "priority": "medium",
        "status": "pending",
        "user_id": user_id,
        "created_at": created_at,
    })
}

#[tokio::test]
async fn test_list_tasks_sends_scope_and_order() {
    let log: Log = Arc::default();
    let s = session();
    let rows = json!([
        task_row(s.user_id, "Newer", "2026-02-01T00:00:00Z"),
        task_row(s.user_id, "Older", "2026-01-01T00:00:00Z"),
    ]);

    let l = Arc::clone(&log);
    let router = Router::new().route(
        "/rest/v1/tasks",
        get(move |RawQuery(query): RawQuery, headers: HeaderMap| {
            let l = Arc::clone(&l);
            let rows = rows.clone();
            async move {
                record(&l, query, &headers, None);
                Json(rows)
            }
        }),
    );

    let store = store_for(spawn_stub(router).await);
    let tasks = store.list_tasks(&s).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Newer");
    assert_eq!(tasks[0].priority, Priority::Medium);

    let recorded = log.lock().unwrap()[0].clone();
    assert!(recorded.query.contains(&format!("user_id=eq.{}", s.user_id)));
    assert!(recorded.query.contains("order=created_at.desc"));
    assert_eq!(recorded.apikey.as_deref(), Some("test-key"));
    assert_eq!(recorded.authorization.as_deref(), Some("Bearer token-abc"));
}

#[tokio::test]
async fn test_list_subtasks_orders_oldest_first() {
    let log: Log = Arc::default();
    let s = session();

    let l = Arc::clone(&log);
    let router = Router::new().route(
        "/rest/v1/subtasks",
        get(move |RawQuery(query): RawQuery, headers: HeaderMap| {
            let l = Arc::clone(&l);
            async move {
                record(&l, query, &headers, None);
                Json(json!([]))
            }
        }),
    );

    let store = store_for(spawn_stub(router).await);
    assert!(store.list_subtasks(&s).await.unwrap().is_empty());

    let recorded = log.lock().unwrap()[0].clone();
    assert!(recorded.query.contains("order=created_at.asc"));
}

#[tokio::test]
async fn test_insert_task_requests_representation() {
    let log: Log = Arc::default();
    let s = session();
    let stored = task_row(s.user_id, "Finish report", "2026-02-01T00:00:00Z");

    let l = Arc::clone(&log);
    let response_row = stored.clone();
    let router = Router::new().route(
        "/rest/v1/tasks",
        post(move |headers: HeaderMap, Json(body): Json<Value>| {
            let l = Arc::clone(&l);
            let row = response_row.clone();
            async move {
                record(&l, None, &headers, Some(body));
                (StatusCode::CREATED, Json(json!([row])))
            }
        }),
    );

    let store = store_for(spawn_stub(router).await);
    let new = NewTask {
        title: "Finish report".to_string(),
        priority: Priority::High,
        status: Status::Pending,
        user_id: s.user_id,
    };
    let task = store.insert_task(&s, &new).await.unwrap();
    assert_eq!(task.title, "Finish report");

    let recorded = log.lock().unwrap()[0].clone();
    assert_eq!(recorded.prefer.as_deref(), Some("return=representation"));
    let body = recorded.body.unwrap();
    assert_eq!(body["title"], "Finish report");
    assert_eq!(body["priority"], "high");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["user_id"], s.user_id.to_string());
}

#[tokio::test]
async fn test_insert_without_representation_is_an_error() {
    let router = Router::new().route(
        "/rest/v1/tasks",
        post(|| async { (StatusCode::CREATED, Json(json!([]))) }),
    );

    let store = store_for(spawn_stub(router).await);
    let s = session();
    let new = NewTask {
        title: "Ghost".to_string(),
        priority: Priority::Low,
        status: Status::Pending,
        user_id: s.user_id,
    };

    let result = store.insert_task(&s, &new).await;
    assert!(matches!(result, Err(StoreError::EmptyInsert)));
}

#[tokio::test]
async fn test_update_status_patches_by_id() {
    let log: Log = Arc::default();
    let s = session();
    let id = Uuid::new_v4();

    let l = Arc::clone(&log);
    let router = Router::new().route(
        "/rest/v1/tasks",
        patch(
            move |RawQuery(query): RawQuery, headers: HeaderMap, Json(body): Json<Value>| {
                let l = Arc::clone(&l);
                async move {
                    record(&l, query, &headers, Some(body));
                    StatusCode::NO_CONTENT
                }
            },
        ),
    );

    let store = store_for(spawn_stub(router).await);
    store
        .update_task_status(&s, id, Status::InProgress)
        .await
        .unwrap();

    let recorded = log.lock().unwrap()[0].clone();
    assert!(recorded.query.contains(&format!("id=eq.{}", id)));
    assert!(recorded.query.contains(&format!("user_id=eq.{}", s.user_id)));
    assert_eq!(recorded.body.unwrap()["status"], "in-progress");
}

#[tokio::test]
async fn test_delete_subtask_scopes_by_id_and_user() {
    let log: Log = Arc::default();
    let s = session();
    let id = Uuid::new_v4();

    let l = Arc::clone(&log);
    let router = Router::new().route(
        "/rest/v1/subtasks",
        delete(move |RawQuery(query): RawQuery, headers: HeaderMap| {
            let l = Arc::clone(&l);
            async move {
                record(&l, query, &headers, None);
                StatusCode::NO_CONTENT
            }
        }),
    );

    let store = store_for(spawn_stub(router).await);
    store.delete_subtask(&s, id).await.unwrap();

    let recorded = log.lock().unwrap()[0].clone();
    assert!(recorded.query.contains(&format!("id=eq.{}", id)));
    assert!(recorded.query.contains(&format!("user_id=eq.{}", s.user_id)));
}

#[tokio::test]
async fn test_non_success_status_maps_to_rejected() {
    let router = Router::new().route(
        "/rest/v1/tasks",
        get(|| async { (StatusCode::FORBIDDEN, "permission denied") }),
    );

    let store = store_for(spawn_stub(router).await);
    let result = store.list_tasks(&session()).await;

    match result {
        Err(StoreError::Rejected { status, body }) => {
            assert_eq!(status, 403);
            assert_eq!(body, "permission denied");
        },
        other => panic!("expected Rejected, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_malformed_response_maps_to_decode() {
    let router = Router::new().route(
        "/rest/v1/tasks",
        get(|| async { Json(json!({"not": "an array"})) }),
    );

    let store = store_for(spawn_stub(router).await);
    let result = store.list_tasks(&session()).await;
    assert!(matches!(result, Err(StoreError::Decode(_))));
}
