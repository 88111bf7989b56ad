use std::path::Path;

// This main function is the entry point when running `cargo run -p web-server`.
// The root `clinic` binary offers the same server through `clinic serve`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let settings = configuration::load_settings(Path::new(configuration::DEFAULT_CONFIG_FILE))?;
    web_server::run_server(&settings).await
}
