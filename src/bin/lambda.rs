//! AWS Lambda entry point for stac-ingest
//!
//! Deploy with `cargo lambda build --release`.

#![recursion_limit = "256"]

use lambda_runtime::{Error as LambdaError, service_fn};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stac_ingest::lambda::handler;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("stac-ingest Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}
