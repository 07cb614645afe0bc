//! Mock Bot API server for handler and outbound tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::{StatusCode, Uri},
        routing::post,
    },
    serde_json::{Value, json},
    tokio::{sync::oneshot, task::JoinHandle},
};

#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    /// Bot API method as teloxide names it, e.g. `SendMessage`.
    pub method: String,
    /// JSON or multipart body, verbatim.
    pub raw_body: String,
}

#[derive(Clone, Default)]
pub(crate) struct MockTelegramApi {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    failures: Arc<Mutex<HashMap<String, VecDeque<Value>>>>,
}

pub(crate) struct MockServer {
    pub bot: teloxide::Bot,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        self.handle.await.expect("server join");
    }
}

impl MockTelegramApi {
    /// Answer the next call to `method` with `response` instead of success.
    pub fn fail_next(&self, method: &str, response: Value) {
        self.failures
            .lock()
            .expect("failures lock")
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Raw bodies of every call to `method`, in order.
    pub fn calls(&self, method: &str) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .map(|r| r.raw_body)
            .collect()
    }

    pub async fn start(self) -> MockServer {
        let app = Router::new()
            .route("/{*path}", post(telegram_api_handler))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        let api_url = reqwest::Url::parse(&format!("http://{addr}/")).expect("parse api url");
        let bot = teloxide::Bot::new("test-token").set_api_url(api_url);
        MockServer {
            bot,
            shutdown,
            handle,
        }
    }
}

async fn telegram_api_handler(
    State(state): State<MockTelegramApi>,
    uri: Uri,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let method = uri.path().rsplit('/').next().unwrap_or_default().to_string();
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(CapturedRequest {
            method: method.clone(),
            raw_body: String::from_utf8_lossy(&body).to_string(),
        });

    let failure = state
        .failures
        .lock()
        .expect("failures lock")
        .get_mut(&method)
        .and_then(VecDeque::pop_front);
    if let Some(response) = failure {
        let status = response["error_code"]
            .as_u64()
            .and_then(|c| u16::try_from(c).ok())
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        return (status, Json(response));
    }

    let result = if method.starts_with("Send") {
        json!({
            "message_id": 1,
            "date": 0,
            "chat": { "id": 42, "type": "private" },
            "text": "ok"
        })
    } else if method == "GetMe" {
        json!({
            "id": 999,
            "is_bot": true,
            "first_name": "Relay",
            "username": "relay_bot",
            "can_join_groups": true,
            "can_read_all_group_messages": true,
            "supports_inline_queries": false,
            "can_connect_to_business": false,
            "has_main_web_app": false
        })
    } else if method == "GetUpdates" {
        json!([])
    } else {
        json!(true)
    };
    (StatusCode::OK, Json(json!({ "ok": true, "result": result })))
}
