//! Common test utilities and helpers

use federated_onehot::testing::{ConfigBuilder, TestCluster};

/// Three sites sharing a categorical column `b` with partly disjoint values
pub fn three_site_cluster() -> TestCluster {
    TestCluster::uniform(
        &ConfigBuilder::new().build(),
        &[
            "id,b,score\n1,low,0.5\n2,high,1.5\n",
            "id,b,score\n3,mid,2.5\n",
            "id,b,score\n4,low,\n5,,3.5\n",
        ],
    )
    .unwrap()
}
