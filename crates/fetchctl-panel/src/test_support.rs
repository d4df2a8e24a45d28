//! Scripted in-memory [`TorrentApi`] for timing tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fetchctl_api_models::{AddTorrentRequest, TorrentListResponse, TorrentRecord};
use serde_json::{Value, json};
use tokio::time::Instant;

use crate::api::TorrentApi;
use crate::error::{ApiError, ApiResult};

struct Scripted<T> {
    delay: Duration,
    reply: Result<T, String>,
}

#[derive(Default)]
struct State {
    adds: VecDeque<Scripted<Value>>,
    lists: VecDeque<Scripted<TorrentListResponse>>,
    last_list: Option<Result<TorrentListResponse, String>>,
    add_requests: Vec<AddTorrentRequest>,
    list_calls: Vec<Instant>,
}

/// Replies are consumed in push order. The final list reply repeats once the
/// queue is drained; an unscripted add fails.
#[derive(Default)]
pub(crate) struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn push_add_ok(&self, body: Value, delay: Duration) {
        self.lock().adds.push_back(Scripted {
            delay,
            reply: Ok(body),
        });
    }

    pub(crate) fn push_add_err(&self, message: &str, delay: Duration) {
        self.lock().adds.push_back(Scripted {
            delay,
            reply: Err(message.to_string()),
        });
    }

    pub(crate) fn push_list(&self, hashes: &[&str]) {
        self.lock().lists.push_back(Scripted {
            delay: Duration::ZERO,
            reply: Ok(snapshot(hashes)),
        });
    }

    pub(crate) fn push_list_err(&self) {
        self.lock().lists.push_back(Scripted {
            delay: Duration::ZERO,
            reply: Err("connector unavailable".to_string()),
        });
    }

    pub(crate) fn add_requests(&self) -> Vec<AddTorrentRequest> {
        self.lock().add_requests.clone()
    }

    pub(crate) fn list_calls(&self) -> Vec<Instant> {
        self.lock().list_calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("fake api state")
    }
}

pub(crate) fn snapshot(hashes: &[&str]) -> TorrentListResponse {
    TorrentListResponse {
        total_items: hashes.len(),
        items: hashes
            .iter()
            .map(|hash| TorrentRecord::new(*hash, format!("Torrent {hash}")))
            .collect(),
    }
}

fn failure(message: String) -> ApiError {
    ApiError::Status {
        status: 500,
        message,
    }
}

#[async_trait]
impl TorrentApi for FakeApi {
    async fn add_torrent(&self, request: &AddTorrentRequest) -> ApiResult<Value> {
        let scripted = {
            let mut state = self.lock();
            state.add_requests.push(request.clone());
            state.adds.pop_front()
        };
        let Some(scripted) = scripted else {
            return Err(failure("unscripted add".to_string()));
        };
        tokio::time::sleep(scripted.delay).await;
        scripted.reply.map_err(failure)
    }

    async fn list_torrents(&self) -> ApiResult<TorrentListResponse> {
        let (delay, reply) = {
            let mut state = self.lock();
            state.list_calls.push(Instant::now());
            match state.lists.pop_front() {
                Some(scripted) => {
                    state.last_list = Some(scripted.reply.clone());
                    (scripted.delay, scripted.reply)
                }
                None => (
                    Duration::ZERO,
                    state
                        .last_list
                        .clone()
                        .unwrap_or_else(|| Ok(TorrentListResponse::default())),
                ),
            }
        };
        tokio::time::sleep(delay).await;
        reply.map_err(failure)
    }

    async fn health(&self) -> ApiResult<Value> {
        Ok(json!({"status": "ok"}))
    }

    async fn ready(&self) -> ApiResult<Value> {
        Ok(json!({"ready": true}))
    }
}
