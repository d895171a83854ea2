#[tokio::main]
async fn main() -> anyhow::Result<()> {
    loginrelay::app::run().await
}
