mod config;
mod server;
mod worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    worker::run().await
}
