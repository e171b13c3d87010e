//! End-to-end dispatch tests against stub Confluence/Jira backends.
//!
//! Each test spins an axum server on an ephemeral port, points a registry at
//! it and drives tool calls through the catalog, asserting on the exact
//! response envelopes and on what reached the wire.

use atlassian_tools::Error;
use atlassian_tools::catalog::ToolCatalog;
use atlassian_tools::config::BackendConfig;
use atlassian_tools::registry::ClientRegistry;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::routing::{delete, get, post};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

struct StubHandle {
    base_url: String,
    shutdown_tx: oneshot::Sender<()>,
    server_handle: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl StubHandle {
    async fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.server_handle
            .await
            .expect("server task join")
            .expect("server result");
    }
}

async fn start_stub(app: Router) -> StubHandle {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    let base_url = format!("http://{addr}");

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = shutdown_rx.await;
    });
    let server_handle = tokio::spawn(async move { server.await });

    StubHandle {
        base_url,
        shutdown_tx,
        server_handle,
    }
}

fn registry_for(base_url: &str) -> ClientRegistry {
    let cfg = BackendConfig::new(base_url, "bot", "t0ken").expect("config");
    ClientRegistry::with_configs(cfg.clone(), cfg, Duration::from_secs(5))
}

fn args(entries: Value) -> Map<String, Value> {
    entries.as_object().expect("object literal").clone()
}

#[tokio::test]
async fn confluence_search_envelope_matches_contract() {
    let upstream = json!({
        "results": [{
            "id": "1",
            "title": "T",
            "space": { "key": "ENG" },
            "version": { "number": 3 },
            "status": "current",
            "type": "page"
        }],
        "size": 1,
        "limit": 25
    });
    let payload = upstream.clone();
    let app = Router::new().route(
        "/rest/api/content/search",
        get(move || {
            let payload = payload.clone();
            async move { axum::Json(payload) }
        }),
    );
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let result = catalog
        .call(
            &registry,
            "confluence_search_pages",
            args(json!({ "cql": "type = \"page\"" })),
        )
        .await
        .expect("search succeeds");

    assert_eq!(
        result,
        json!({
            "size": 1,
            "limit": 25,
            "results": [{
                "id": "1",
                "title": "T",
                "space": "ENG",
                "version": 3,
                "status": "current",
                "type": "page",
                "url": null
            }],
            "raw": upstream,
        })
    );

    stub.stop().await;
}

#[tokio::test]
async fn missing_page_yields_not_found_naming_the_id() {
    let app = Router::new().fallback(|| async {
        (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "message": "no content with that id" })),
        )
    });
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let err = catalog
        .call(
            &registry,
            "confluence_get_page",
            args(json!({ "page_id": "MISSING-1" })),
        )
        .await
        .unwrap_err();

    let Error::Operation { operation, source } = &err else {
        panic!("expected Operation, got {err:?}");
    };
    assert_eq!(operation, "confluence_get_page");
    assert!(matches!(**source, Error::NotFound(_)));
    assert!(err.to_string().contains("MISSING-1"));

    stub.stop().await;
}

#[tokio::test]
async fn repeated_create_calls_return_distinct_pages() {
    let counter = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/rest/api/content",
            post(
                |State(counter): State<Arc<AtomicUsize>>, axum::Json(body): axum::Json<Value>| async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    axum::Json(json!({
                        "id": n.to_string(),
                        "title": body["title"],
                        "space": body["space"],
                        "status": "current",
                        "_links": { "self": format!("/content/{n}") }
                    }))
                },
            ),
        )
        .with_state(Arc::clone(&counter));
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let create_args = json!({
        "space_key": "ENG",
        "title": "Runbook",
        "body_storage": "<p>hello</p>"
    });

    let first = catalog
        .call(&registry, "confluence_create_page", args(create_args.clone()))
        .await
        .expect("first create");
    let second = catalog
        .call(&registry, "confluence_create_page", args(create_args))
        .await
        .expect("second create");

    // Creation is not idempotent: the same arguments yield a new page.
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert_eq!(first["id"], json!("1"));
    assert_eq!(second["id"], json!("2"));
    assert_ne!(first["raw"], second["raw"]);

    stub.stop().await;
}

#[tokio::test]
async fn validation_failure_never_contacts_backend() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .fallback(|State(hits): State<Arc<AtomicUsize>>| async move {
            hits.fetch_add(1, Ordering::SeqCst);
            axum::Json(json!({}))
        })
        .with_state(Arc::clone(&hits));
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);

    // Missing required `cql`.
    let err = catalog
        .call(&registry, "confluence_search_pages", Map::new())
        .await
        .unwrap_err();
    assert!(err.is_validation());

    // Oversized page-size argument.
    let err = catalog
        .call(
            &registry,
            "confluence_search_pages",
            args(json!({ "cql": "type = page", "limit": 100_000 })),
        )
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(hits.load(Ordering::SeqCst), 0);

    stub.stop().await;
}

#[tokio::test]
async fn limit_zero_is_passed_through_and_yields_empty_results() {
    let query = Arc::new(parking_lot::Mutex::new(String::new()));
    let app = Router::new()
        .route(
            "/rest/api/content/search",
            get(
                |State(query): State<Arc<parking_lot::Mutex<String>>>, uri: Uri| async move {
                    *query.lock() = uri.query().unwrap_or("").to_string();
                    axum::Json(json!({ "results": [], "size": 0, "limit": 0 }))
                },
            ),
        )
        .with_state(Arc::clone(&query));
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let result = catalog
        .call(
            &registry,
            "confluence_search_pages",
            args(json!({ "cql": "type = page", "limit": 0 })),
        )
        .await
        .expect("limit zero is valid");

    assert_eq!(result["results"], json!([]));
    assert_eq!(result["size"], json!(0));
    assert!(query.lock().contains("limit=0"));

    stub.stop().await;
}

#[tokio::test]
async fn requests_carry_basic_auth_and_the_api_prefix() {
    type Seen = Arc<parking_lot::Mutex<Option<(String, Option<String>, Option<String>)>>>;
    let seen: Seen = Arc::new(parking_lot::Mutex::new(None));
    let app = Router::new()
        .fallback(
            |State(seen): State<Seen>, uri: Uri, headers: HeaderMap| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let accept = headers
                    .get("accept")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                *seen.lock() = Some((uri.path().to_string(), auth, accept));
                axum::Json(json!({
                    "key": "ENG-1",
                    "id": "10001",
                    "fields": { "summary": "s" }
                }))
            },
        )
        .with_state(Arc::clone(&seen));
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    catalog
        .call(&registry, "jira_get_issue", args(json!({ "issue_key": "ENG-1" })))
        .await
        .expect("get issue");

    let (path, auth, accept) = seen.lock().clone().expect("request observed");
    assert_eq!(path, "/rest/api/2/issue/ENG-1");
    assert!(auth.expect("authorization header").starts_with("Basic "));
    assert_eq!(accept.as_deref(), Some("application/json"));

    stub.stop().await;
}

#[tokio::test]
async fn jira_search_posts_the_jql_body() {
    let body_seen = Arc::new(parking_lot::Mutex::new(Value::Null));
    let app = Router::new()
        .route(
            "/rest/api/2/search",
            post(
                |State(seen): State<Arc<parking_lot::Mutex<Value>>>,
                 axum::Json(body): axum::Json<Value>| async move {
                    *seen.lock() = body;
                    axum::Json(json!({
                        "total": 0,
                        "maxResults": 50,
                        "startAt": 0,
                        "issues": []
                    }))
                },
            ),
        )
        .with_state(Arc::clone(&body_seen));
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let result = catalog
        .call(
            &registry,
            "jira_search_issues",
            args(json!({ "jql": "project = ENG ORDER BY created DESC" })),
        )
        .await
        .expect("search succeeds");

    assert_eq!(
        *body_seen.lock(),
        json!({
            "jql": "project = ENG ORDER BY created DESC",
            "maxResults": 50,
            "startAt": 0
        })
    );
    assert_eq!(result["total"], json!(0));
    assert_eq!(result["max_results"], json!(50));
    assert_eq!(result["start_at"], json!(0));
    assert_eq!(result["issues"], json!([]));

    stub.stop().await;
}

#[tokio::test]
async fn delete_issue_acknowledges_with_null_raw() {
    let app = Router::new().route(
        "/rest/api/2/issue/{key}",
        delete(|| async { StatusCode::NO_CONTENT }),
    );
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let result = catalog
        .call(&registry, "jira_delete_issue", args(json!({ "issue_key": "ENG-1" })))
        .await
        .expect("delete succeeds");

    assert_eq!(
        result,
        json!({
            "key": "ENG-1",
            "deleted": true,
            "delete_subtasks": false,
            "raw": null
        })
    );

    stub.stop().await;
}

#[tokio::test]
async fn backend_auth_rejection_surfaces_as_auth_error() {
    let app = Router::new().fallback(|| async {
        (
            StatusCode::UNAUTHORIZED,
            axum::Json(json!({ "message": "bad credentials" })),
        )
    });
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let err = catalog
        .call(
            &registry,
            "jira_search_issues",
            args(json!({ "jql": "project = ENG" })),
        )
        .await
        .unwrap_err();

    let Error::Operation { source, .. } = &err else {
        panic!("expected Operation, got {err:?}");
    };
    assert!(matches!(**source, Error::Auth(_)));

    stub.stop().await;
}

#[tokio::test]
async fn non_json_error_body_is_preserved_in_the_message() {
    let app = Router::new()
        .fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "proxy meltdown") });
    let stub = start_stub(app).await;

    let catalog = ToolCatalog::new().expect("catalog");
    let registry = registry_for(&stub.base_url);
    let err = catalog
        .call(
            &registry,
            "confluence_get_spaces",
            Map::new(),
        )
        .await
        .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("500"));
    assert!(msg.contains("proxy meltdown"));

    stub.stop().await;
}
