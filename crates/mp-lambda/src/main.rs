use tracing_subscriber::EnvFilter;

use mp_lambda::config::Config;
use mp_lambda::state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = AppState::from_config(Config::from_env())?;

    lambda_http::run(mp_lambda::app(state))
        .await
        .map_err(|e| eyre::eyre!(e))
}
