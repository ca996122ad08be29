#[tokio::main]
async fn main() {
    memeverse::start_server().await;
}
