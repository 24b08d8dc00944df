//! `simulate`: a whole round over local directories

use crate::host::FsHost;
use crate::round::run_local_cluster;
use crate::transport::local::node_name;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub async fn run(node_dirs: Vec<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let hosts: Vec<FsHost> = node_dirs
        .iter()
        .enumerate()
        .map(|(i, dir)| FsHost::new(dir, output_dir.join(node_name(i))))
        .collect();
    info!("Simulating a round over {} node(s)", hosts.len());

    let mut first_error = None;
    for (i, result) in run_local_cluster(hosts).await.into_iter().enumerate() {
        match result {
            Ok(report) => println!(
                "{}: {} of {} row(s) kept, columns: {}",
                node_name(i),
                report.output_rows,
                report.input_rows,
                report.output_columns.join(", ")
            ),
            Err(e) => {
                println!("{}: failed: {}", node_name(i), e.user_message());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    match first_error {
        Some(e) => Err(e).context("simulated round failed"),
        None => Ok(()),
    }
}
