#[tokio::main]
async fn main() {
    if let Err(err) = pica_toolkit::mcp::server::run_stdio().await {
        eprintln!("pica-toolkit: {}", err);
        std::process::exit(1);
    }
}
