#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() {
    if let Err(error) = portfolio_site::backend::run().await {
        eprintln!("server failed: {error}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    portfolio_site::frontend::run();
}
