#[tokio::main]
async fn main() -> anyhow::Result<()> {
    relay::start_server().await
}
