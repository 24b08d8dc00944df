//! Rounds relayed through the controller API over real sockets

mod common;

use federated_onehot::api::{router, StatusResponse, DESTINATION_HEADER};
use federated_onehot::error::Result as FederationResult;
use federated_onehot::round::{Phase, RoundReport, RoundRunner, StatusHandle};
use federated_onehot::testing::NodeDir;
use federated_onehot::transport::ControllerTransport;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

struct ServedNode {
    base: String,
    round: JoinHandle<FederationResult<RoundReport>>,
}

async fn serve(node: &NodeDir) -> ServedNode {
    let transport = ControllerTransport::new();
    let status = StatusHandle::new();
    let mut runner = RoundRunner::with_status(transport.clone(), node.host(), status.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(transport, status)).await.unwrap();
    });
    let round = tokio::spawn(async move { runner.run_round().await });

    ServedNode {
        base: format!("http://{}", addr),
        round,
    }
}

async fn status(client: &Client, base: &str) -> StatusResponse {
    client
        .get(format!("{}/api/status", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

/// Forward outgoing payloads between nodes until every node reports finished
async fn relay(client: &Client, ids: &[&str], bases: &[String]) {
    loop {
        let mut all_finished = true;
        for (i, base) in bases.iter().enumerate() {
            let response = client
                .get(format!("{}/api/data", base))
                .send()
                .await
                .unwrap();
            if response.status() == StatusCode::OK {
                let destination = response
                    .headers()
                    .get(DESTINATION_HEADER)
                    .map(|v| v.to_str().unwrap().to_string());
                let payload = response.bytes().await.unwrap();
                let targets: Vec<usize> = match destination {
                    Some(id) => vec![ids.iter().position(|n| *n == id).unwrap()],
                    None => (0..bases.len()).filter(|j| *j != i).collect(),
                };
                for j in targets {
                    client
                        .post(format!("{}/api/data", bases[j]))
                        .body(payload.clone())
                        .send()
                        .await
                        .unwrap();
                }
            }
            let current = status(client, base).await;
            all_finished &= current.finished;
        }
        if all_finished {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

async fn setup_all(client: &Client, ids: &[&str], bases: &[String]) {
    for (i, base) in bases.iter().enumerate() {
        let response = client
            .post(format!("{}/api/setup", base))
            .json(&json!({
                "id": ids[i],
                "coordinator": i == 0,
                "clients": ids,
                "coordinator_id": ids[0]
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_round_over_controller_api() {
    let cluster = common::three_site_cluster();
    let ids = ["site-a", "site-b", "site-c"];
    let mut nodes = Vec::new();
    for i in 0..cluster.len() {
        nodes.push(serve(cluster.node(i)).await);
    }
    let bases: Vec<String> = nodes.iter().map(|n| n.base.clone()).collect();
    let client = Client::new();

    setup_all(&client, &ids, &bases).await;
    tokio::time::timeout(Duration::from_secs(10), relay(&client, &ids, &bases))
        .await
        .unwrap();

    for node in nodes {
        let report = node.round.await.unwrap().unwrap();
        assert_eq!(report.output_columns, vec!["id", "b=low", "b=mid", "score"]);
    }
    for base in &bases {
        let current = status(&client, base).await;
        assert!(current.finished);
        assert!(!current.available);
        assert_eq!(current.phase, Phase::Terminal);
        assert_eq!(current.message, "finished.");
    }
    assert_eq!(
        cluster.node(1).output().unwrap(),
        "id,b=low,b=mid,score\n3,0.0,1.0,2.5\n"
    );
}

#[tokio::test]
async fn test_status_and_data_before_setup() {
    let cluster = common::three_site_cluster();
    let node = serve(cluster.node(0)).await;
    let client = Client::new();

    let health = client
        .get(format!("{}/api/health", node.base))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);

    let current = status(&client, &node.base).await;
    assert_eq!(current.phase, Phase::Initializing);
    assert!(!current.available);
    assert!(!current.finished);

    let data = client
        .get(format!("{}/api/data", node.base))
        .send()
        .await
        .unwrap();
    assert_eq!(data.status(), StatusCode::NO_CONTENT);
    node.round.abort();
}

#[tokio::test]
async fn test_setup_rejects_node_missing_from_clients() {
    let cluster = common::three_site_cluster();
    let node = serve(cluster.node(0)).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/setup", node.base))
        .json(&json!({ "id": "z", "coordinator": true, "clients": ["a", "b"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    node.round.abort();
}

#[tokio::test]
async fn test_participant_sends_mode_to_coordinator() {
    let cluster = common::three_site_cluster();
    let node = serve(cluster.node(1)).await;
    let client = Client::new();

    client
        .post(format!("{}/api/setup", node.base))
        .json(&json!({
            "id": "b",
            "coordinator": false,
            "clients": ["a", "b"],
            "coordinator_id": "a"
        }))
        .send()
        .await
        .unwrap();

    let current = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let current = status(&client, &node.base).await;
            if current.available {
                return current;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(current.destination.as_deref(), Some("a"));

    let data = client
        .get(format!("{}/api/data", node.base))
        .send()
        .await
        .unwrap();
    assert_eq!(data.status(), StatusCode::OK);
    assert_eq!(
        data.headers().get(DESTINATION_HEADER).unwrap().to_str().unwrap(),
        "a"
    );
    node.round.abort();
}
