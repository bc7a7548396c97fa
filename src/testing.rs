use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::error::ApiError;
use crate::tmdb::{Query, TmdbClient, Transport};

const TEST_BASE_URL: &str = "http://catalog.test/3";

type Reply = Result<Value, ApiError>;

#[derive(Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    gates: HashMap<String, VecDeque<Arc<Notify>>>,
    calls: Vec<(String, Query)>,
}

/// Replies are queued per endpoint path. The last queued reply for a path is
/// sticky and answers every further call.
#[derive(Clone, Default)]
pub struct FakeTransport {
    script: Arc<Mutex<Script>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> TmdbClient {
        TmdbClient::new(
            String::from("test-key"),
            String::from("en-US"),
            Arc::new(self.clone()),
        )
        .with_base_url(TEST_BASE_URL)
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.push(path, Ok(body));
    }

    pub fn fail(&self, path: &str, error: ApiError) {
        self.push(path, Err(error));
    }

    fn push(&self, path: &str, reply: Reply) {
        let mut script = self.script.lock().unwrap();
        script
            .replies
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Holds the next call to `path` until the returned handle is notified.
    pub fn hold(&self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        let mut script = self.script.lock().unwrap();
        script
            .gates
            .entry(path.to_string())
            .or_default()
            .push_back(gate.clone());
        gate
    }

    pub fn calls(&self, path: &str) -> Vec<Query> {
        let script = self.script.lock().unwrap();
        script
            .calls
            .iter()
            .filter(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .collect()
    }

    pub fn call_count(&self, path: &str) -> usize {
        self.calls(path).len()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let path = url.strip_prefix(TEST_BASE_URL).unwrap_or(url).to_string();
        let (reply, gate) = {
            let mut script = self.script.lock().unwrap();
            script.calls.push((path.clone(), query.to_vec()));
            let reply = match script.replies.get_mut(&path) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            };
            let gate = script.gates.get_mut(&path).and_then(VecDeque::pop_front);
            (reply, gate)
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        reply.unwrap_or_else(|| Err(ApiError::Network(format!("no scripted reply for {}", path))))
    }
}

pub fn page_json(page: u32, total_pages: u32, ids: &[u64]) -> Value {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Movie {}", id),
                "poster_path": format!("/{}.jpg", id),
                "vote_average": 6.5,
                "release_date": "2023-05-01",
                "overview": ""
            })
        })
        .collect();
    json!({
        "page": page,
        "results": results,
        "total_pages": total_pages,
        "total_results": total_pages as usize * ids.len()
    })
}
