//! `serve`: one node behind the controller API

use crate::api::ApiServer;
use crate::host::FsHost;
use crate::round::{RoundRunner, StatusHandle};
use crate::transport::ControllerTransport;
use anyhow::Result;
use std::path::PathBuf;
use tracing::{error, info};

pub async fn run(port: u16, input_dir: PathBuf, output_dir: PathBuf) -> Result<()> {
    let transport = ControllerTransport::new();
    let status = StatusHandle::new();
    let host = FsHost::new(input_dir, output_dir);
    let mut runner = RoundRunner::with_status(transport.clone(), host, status.clone());

    // the round blocks in initializing until the controller calls setup
    tokio::spawn(async move {
        match runner.run_round().await {
            Ok(report) => info!(
                "Encoded {} row(s) into {} column(s)",
                report.output_rows,
                report.output_columns.len()
            ),
            Err(e) => error!("Round failed: {}", e.user_message()),
        }
    });

    ApiServer::new(transport, status, port).start().await
}
