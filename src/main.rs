#[tokio::main]
async fn main() {
    if let Err(e) = shopsense::run().await {
        eprintln!("shopsense: {e}");
        std::process::exit(1);
    }
}
