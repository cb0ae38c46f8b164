use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    critique_cli::main_entry().await
}
