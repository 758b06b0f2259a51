#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vault::start_server().await
}
