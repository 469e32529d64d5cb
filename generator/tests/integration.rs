//! Integration tests for the generator
//!
//! These run the full pipeline against a local mock oracle and the in-memory
//! recipe store.

mod common;

use std::time::{Duration, Instant};

use generator::{FailurePolicy, Generator, GeneratorConfig, GeneratorError, Recipe, RecipeStore, RecipeTree};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;

#[tokio::test]
async fn test_two_seeds_one_discovery() {
    let server = MockServer::start().await;
    mount_pair(&server, "Fire", "Water", "Steam", true, 1).await;

    let config = config_for(&server);
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire"]).await;
    let generator = Generator::new(config, store, oracle).unwrap();

    let output = generator
        .generate(["Water", "Fire"], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.recipes, vec![Recipe::new("Fire", "Water", "Steam")]);
    assert_eq!(output.discoveries.iter().collect::<Vec<_>>(), vec!["Steam"]);
    assert!(output.failures.is_empty());
    assert_eq!(output.summary.tasks, 1);
    assert_eq!(output.summary.pairs_queried, 1);
}

#[tokio::test]
async fn test_known_pairs_are_never_queried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire", "Earth"]).await;
    store
        .import_recipes([
            Recipe::new("Water", "Fire", "Steam"),
            Recipe::new("Earth", "Water", "Mud"),
            Recipe::new("Fire", "Earth", "Lava"),
        ])
        .await;
    let generator = Generator::new(config, store, oracle).unwrap();

    let output = generator
        .generate(["Water", "Fire", "Earth"], &CancellationToken::new())
        .await
        .unwrap();

    assert!(output.recipes.is_empty());
    assert!(output.discoveries.is_empty());
    assert_eq!(output.summary.pairs_known, 3);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_persisted_recipes_skip_on_next_run() {
    let server = MockServer::start().await;
    mount_pair(&server, "Earth", "Fire", "Lava", false, 1).await;
    mount_pair(&server, "Earth", "Water", "Mud", false, 1).await;
    mount_pair(&server, "Fire", "Water", "Steam", true, 1).await;

    let config = GeneratorConfig {
        persist_recipes: true,
        workers: 2,
        ..config_for(&server)
    };
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire", "Earth"]).await;
    let generator = Generator::new(config, store, oracle).unwrap();
    let seeds = ["Water", "Fire", "Earth"];

    let first = generator.generate(seeds, &CancellationToken::new()).await.unwrap();
    assert_eq!(first.recipes.len(), 3);
    assert_eq!(generator.store().recipe_count().await, 3);
    assert_eq!(generator.store().result_of("Water", "Earth").await, Some("Mud".to_string()));
    assert_eq!(generator.store().item_count().await, 6);

    let mud = generator.store().recipe_tree("Mud").await.unwrap();
    assert_eq!(
        mud,
        RecipeTree::node("Mud", RecipeTree::leaf("Earth"), RecipeTree::leaf("Water"))
    );

    // Everything is on record now, the mocks would fail on a second query
    let second = generator.generate(seeds, &CancellationToken::new()).await.unwrap();
    assert!(second.recipes.is_empty());
    assert_eq!(second.summary.pairs_known, 3);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_malformed_response_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire"]).await;
    let generator = Generator::new(config, store, oracle).unwrap();

    let err = generator
        .generate(["Water", "Fire"], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, GeneratorError::OracleMalformedResponse { .. }));
}

#[tokio::test]
async fn test_isolate_policy_reports_failed_pairs() {
    let server = MockServer::start().await;
    mount_pair(&server, "Fire", "Water", "Steam", false, 1).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = GeneratorConfig {
        failure_policy: FailurePolicy::Isolate,
        ..config_for(&server)
    };
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire", "Wind"]).await;
    let generator = Generator::new(config, store, oracle).unwrap();

    let output = generator
        .generate(["Water", "Fire", "Wind"], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(output.recipes, vec![Recipe::new("Fire", "Water", "Steam")]);
    assert_eq!(output.failures.len(), 2);
    assert!(output.failures.iter().all(|f| f.retryable && f.right.is_some()));
}

#[tokio::test]
async fn test_cancellation_stops_waiting_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": "Something",
            "isNew": false
        })))
        .mount(&server)
        .await;

    // One token up front, the next only after two seconds
    let config = GeneratorConfig {
        rate_per_second: 0.5,
        burst: 1,
        ..config_for(&server)
    };
    let oracle = oracle_for(&config);
    let store = store_with(&["Water", "Fire", "Wind"]).await;
    let generator = Generator::new(config, store, oracle).unwrap();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = generator.generate(["Water", "Fire", "Wind"], &cancel).await;

    assert!(matches!(result, Err(GeneratorError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(request_count(&server).await, 1);
}
