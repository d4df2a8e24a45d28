//! Thin entrypoint for the `fetchctl` binary.

#[tokio::main]
async fn main() {
    let code = fetchctl_cli::run().await;
    std::process::exit(code);
}
