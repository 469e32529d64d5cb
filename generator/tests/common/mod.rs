//! Shared fixtures for generator integration tests

#![allow(dead_code)]

use generator::{GeneratorConfig, HttpOracle, MemoryRecipeStore};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PAIR_PATH: &str = "/api/infinite-craft/pair";

/// Config pointed at the mock server, fast enough not to slow tests down
pub fn config_for(server: &MockServer) -> GeneratorConfig {
    GeneratorConfig {
        oracle_url: format!("{}{}", server.uri(), PAIR_PATH),
        rate_per_second: 50.0,
        burst: 5,
        request_timeout_ms: 5_000,
        ..Default::default()
    }
}

pub fn oracle_for(config: &GeneratorConfig) -> HttpOracle {
    HttpOracle::from_config(config).unwrap()
}

pub async fn store_with(items: &[&str]) -> MemoryRecipeStore {
    let store = MemoryRecipeStore::new();
    store.insert_items(items.iter().copied()).await;
    store
}

/// Answer `first + second` with `result`, expecting exactly `times` queries
pub async fn mount_pair(server: &MockServer, first: &str, second: &str, result: &str, is_new: bool, times: u64) {
    Mock::given(method("GET"))
        .and(path(PAIR_PATH))
        .and(query_param("first", first))
        .and(query_param("second", second))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": result,
            "emoji": "",
            "isNew": is_new
        })))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map(|r| r.len()).unwrap_or(0)
}
