mod cli;
mod config;
mod logging;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cli::run().await
}
