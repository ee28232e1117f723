#[tokio::main]
async fn main() {
    mgnrega::start_server().await;
}
