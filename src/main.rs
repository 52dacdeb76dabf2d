#[tokio::main]
async fn main() -> std::io::Result<()> {
    scout_map::run_with_config().await
}
