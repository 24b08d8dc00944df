//! Full rounds over node directories on disk

mod common;

use federated_onehot::config::CONFIG_FILE_NAME;
use federated_onehot::error::ErrorCode;
use federated_onehot::round::run_local_cluster;
use federated_onehot::testing::{ConfigBuilder, TestCluster};

#[tokio::test]
async fn test_auto_round_writes_aligned_outputs() {
    let cluster = common::three_site_cluster();
    let results = run_local_cluster(cluster.hosts()).await;

    for result in &results {
        let report = result.as_ref().unwrap();
        assert_eq!(report.output_columns, vec!["id", "b=low", "b=mid", "score"]);
    }
    assert_eq!(
        cluster.node(0).output().unwrap(),
        "id,b=low,b=mid,score\n1,1.0,0.0,0.5\n2,0.0,0.0,1.5\n"
    );
    assert_eq!(
        cluster.node(1).output().unwrap(),
        "id,b=low,b=mid,score\n3,0.0,1.0,2.5\n"
    );
    assert_eq!(
        cluster.node(2).output().unwrap(),
        "id,b=low,b=mid,score\n4,1.0,0.0,\n5,,,3.5\n"
    );
}

#[tokio::test]
async fn test_config_is_copied_to_output() {
    let cluster = common::three_site_cluster();
    for result in run_local_cluster(cluster.hosts()).await {
        result.unwrap();
    }
    for i in 0..cluster.len() {
        assert!(cluster.node(i).output_dir().join(CONFIG_FILE_NAME).exists());
    }
}

#[tokio::test]
async fn test_predefined_levels_drop_unknown_values() {
    let coordinator = ConfigBuilder::new()
        .with_mode("predefined")
        .with_levels("b", "['low', 'high']")
        .build();
    let participant = ConfigBuilder::new().with_mode("predefined").build();
    let cluster = TestCluster::new(&[
        (&coordinator, "id,b\n1,low\n2,high\n"),
        (&participant, "id,b\n3,mid\n4,low\n"),
    ])
    .unwrap();

    let results = run_local_cluster(cluster.hosts()).await;
    for result in &results {
        assert_eq!(result.as_ref().unwrap().output_columns, vec!["id", "b=low"]);
    }
    assert_eq!(cluster.node(0).output().unwrap(), "id,b=low\n1,1.0\n2,0.0\n");
    // "mid" is outside the agreed levels, so its row goes
    assert_eq!(cluster.node(1).output().unwrap(), "id,b=low\n4,1.0\n");
    assert_eq!(results[1].as_ref().unwrap().input_rows, 2);
    assert_eq!(results[1].as_ref().unwrap().output_rows, 1);
}

#[tokio::test]
async fn test_integer_column_marked_categorical() {
    let yaml = ConfigBuilder::new().with_categorical_column("grade").build();
    let cluster = TestCluster::uniform(&yaml, &["grade\n1\n2\n", "grade\n3\n1\n"]).unwrap();

    for result in run_local_cluster(cluster.hosts()).await {
        assert_eq!(result.unwrap().output_columns, vec!["grade=2", "grade=3"]);
    }
    assert_eq!(
        cluster.node(1).output().unwrap(),
        "grade=2,grade=3\n0.0,1.0\n0.0,0.0\n"
    );
}

#[tokio::test]
async fn test_mode_disagreement_writes_nothing() {
    let cluster = TestCluster::new(&[
        (&ConfigBuilder::new().build(), "b\nx\n"),
        (&ConfigBuilder::new().with_mode("predefined").build(), "b\ny\n"),
    ])
    .unwrap();

    for result in run_local_cluster(cluster.hosts()).await {
        assert_eq!(result.unwrap_err().code(), ErrorCode::AGREEMENT_MODE_MISMATCH);
    }
    assert!(cluster.node(0).output().is_err());
    assert!(cluster.node(1).output().is_err());
}

#[tokio::test]
async fn test_predefined_coordinator_without_directive_fails_alone() {
    let yaml = ConfigBuilder::new().with_mode("predefined").build();
    let cluster = TestCluster::uniform(&yaml, &["b\nx\n"]).unwrap();

    let results = run_local_cluster(cluster.hosts()).await;
    assert_eq!(
        results[0].as_ref().unwrap_err().code(),
        ErrorCode::CONFIG_MISSING_REQUIRED
    );
}
