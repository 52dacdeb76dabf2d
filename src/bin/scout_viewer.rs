#[tokio::main]
async fn main() {
    scout_map::run_viewer_with_config().await
}
