#[cfg(feature = "server")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    owncars::server::run().await
}
