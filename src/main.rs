use std::path::PathBuf;

const STORE_ENV: &str = "LOAN_DESK_STORE";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    loan_desk::infra::logging::init_logger();

    let store_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var(STORE_ENV).ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("loan-desk.json"));

    tracing::info!(store = %store_path.display(), "starting loan desk");
    loan_desk::interface::mcp::run(store_path).await
}
