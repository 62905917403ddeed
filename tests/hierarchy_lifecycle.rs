//! Lifecycle tests for the hierarchy reconciler against a mock SonarQube

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use sonar_portfolio::client::SonarClient;
use sonar_portfolio::hierarchy::{HierarchyError, HierarchyReconciler};
use sonar_portfolio::types::{PortfolioHierarchy, PortfolioKey};

fn client_for(server: &MockServer) -> SonarClient {
    SonarClient::new(Url::parse(&server.uri()).unwrap(), None)
}

fn keys(raw: &[&str]) -> Vec<PortfolioKey> {
    raw.iter().map(|k| PortfolioKey::from(*k)).collect()
}

fn portfolios_body(keys: &[&str]) -> serde_json::Value {
    json!({
        "portfolios": keys
            .iter()
            .map(|k| json!({"key": k, "name": k.to_uppercase(), "disabled": false}))
            .collect::<Vec<_>>()
    })
}

async fn mock_portfolios(server: &MockServer, parent: &str, eligible: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/api/views/portfolios"))
        .and(query_param("portfolio", parent))
        .respond_with(ResponseTemplate::new(200).set_body_json(portfolios_body(eligible)))
        .mount(server)
        .await;
}

fn reference_param(request: &Request) -> Option<String> {
    request
        .url
        .query_pairs()
        .find(|(name, _)| name == "reference")
        .map(|(_, value)| value.into_owned())
}

#[tokio::test]
async fn create_then_read_round_trips_references() {
    let server = MockServer::start().await;

    // The server listing still contains the parent; the client must drop it.
    mock_portfolios(&server, "p", &["p", "a", "b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .and(query_param("portfolio", "p"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/views/show"))
        .and(query_param("key", "p"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "p",
            "subViews": [
                {"key": "a", "name": "A"},
                {"key": "b", "name": "B"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let desired = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    let state = reconciler.create(&desired).await.unwrap();

    assert_eq!(state.id, "p-parent");
    assert_eq!(state.hierarchy.key.as_str(), "p");
    assert_eq!(
        state.hierarchy.reference_set(),
        desired.reference_set(),
        "read-back references should match the created set"
    );
}

#[tokio::test]
async fn create_with_invalid_reference_issues_no_mutations() {
    let server = MockServer::start().await;

    mock_portfolios(&server, "p", &["b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let desired = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    let err = reconciler.create(&desired).await.unwrap_err();

    match err {
        HierarchyError::InvalidReference { reference } => {
            assert_eq!(reference.as_str(), "a", "first offending reference is reported");
        }
        other => panic!("expected InvalidReference, got {other:?}"),
    }
}

#[tokio::test]
async fn create_cannot_reference_the_parent_itself() {
    let server = MockServer::start().await;

    mock_portfolios(&server, "p", &["p", "a"]).await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let desired = PortfolioHierarchy::new("p", keys(&["p"]));
    let err = reconciler.create(&desired).await.unwrap_err();

    assert!(matches!(
        err,
        HierarchyError::InvalidReference { ref reference } if reference.as_str() == "p"
    ));
}

#[tokio::test]
async fn update_removes_before_adding() {
    let server = MockServer::start().await;

    mock_portfolios(&server, "p", &["a", "b", "c"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let old = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    let new = PortfolioHierarchy::new("p", keys(&["b", "c"]));
    let state = reconciler.update(&old, &new).await.unwrap();

    assert_eq!(state.id, "p-parent");

    let requests = server.received_requests().await.unwrap();
    let mutations: Vec<&Request> = requests
        .iter()
        .filter(|r| r.url.path().ends_with("_portfolio"))
        .collect();

    assert_eq!(mutations.len(), 2);
    assert_eq!(mutations[0].url.path(), "/api/views/remove_portfolio");
    assert_eq!(reference_param(mutations[0]).as_deref(), Some("a"));
    assert_eq!(mutations[1].url.path(), "/api/views/add_portfolio");
    assert_eq!(reference_param(mutations[1]).as_deref(), Some("c"));
}

#[tokio::test]
async fn update_with_key_change_is_a_structural_rename() {
    let server = MockServer::start().await;

    // Validation and the nested create both fetch the eligible set for the
    // new key.
    mock_portfolios(&server, "q", &["a", "p"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .and(query_param("portfolio", "p"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .and(query_param("portfolio", "q"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/views/show"))
        .and(query_param("key", "q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "key": "q",
            "subViews": [{"key": "a", "name": "A"}]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let old = PortfolioHierarchy::new("p", keys(&["a"]));
    let new = PortfolioHierarchy::new("q", keys(&["a"]));
    let state = reconciler.update(&old, &new).await.unwrap();

    assert_eq!(state.id, "q-parent", "identity follows the new key");

    let requests = server.received_requests().await.unwrap();

    // Old-key teardown happens before new-key build-up.
    let remove_at = requests
        .iter()
        .position(|r| r.url.path() == "/api/views/remove_portfolio")
        .unwrap();
    let add_at = requests
        .iter()
        .position(|r| r.url.path() == "/api/views/add_portfolio")
        .unwrap();
    assert!(remove_at < add_at);

    // The eligible set is fetched once for the update validation and once
    // again inside the nested create.
    let listings = requests
        .iter()
        .filter(|r| r.url.path() == "/api/views/portfolios")
        .count();
    assert_eq!(listings, 2);
}

#[tokio::test]
async fn update_with_no_changes_issues_no_mutations() {
    let server = MockServer::start().await;

    mock_portfolios(&server, "p", &["a", "b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let hierarchy = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    reconciler.update(&hierarchy, &hierarchy).await.unwrap();
}

#[tokio::test]
async fn delete_tolerates_already_removed_references() {
    let server = MockServer::start().await;

    // One reference still present, one already gone on the server.
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .and(query_param("reference", "b"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let current = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    reconciler.delete(&current).await.unwrap();
}

#[tokio::test]
async fn delete_twice_is_idempotent() {
    let server = MockServer::start().await;

    // First pass removes the reference; afterwards the server answers 404.
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(204))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let current = PortfolioHierarchy::new("p", keys(&["a"]));
    reconciler.delete(&current).await.unwrap();
    reconciler.delete(&current).await.unwrap();
}

#[tokio::test]
async fn read_missing_portfolio_surfaces_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/views/show"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let err = reconciler.read(&PortfolioKey::from("gone")).await.unwrap_err();
    assert!(matches!(
        err,
        HierarchyError::NotFound { ref key } if key.as_str() == "gone"
    ));
}

#[tokio::test]
async fn create_aborts_on_first_failed_add_without_rollback() {
    let server = MockServer::start().await;

    mock_portfolios(&server, "p", &["a", "b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .and(query_param("reference", "a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/views/add_portfolio"))
        .and(query_param("reference", "b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    // No compensation: the successful add of "a" is never undone.
    Mock::given(method("POST"))
        .and(path("/api/views/remove_portfolio"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let reconciler = HierarchyReconciler::new(&client);

    let desired = PortfolioHierarchy::new("p", keys(&["a", "b"]));
    let err = reconciler.create(&desired).await.unwrap_err();
    assert!(matches!(err, HierarchyError::Api(_)));
}
