//! `tutoragent serve` — Start the HTTP API server.

use std::path::PathBuf;

pub async fn run(
    config_path: Option<PathBuf>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config =
        super::load_config(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("📚 TutorAgent");
    println!(
        "   Listening: {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Model: {}", config.model);

    tutoragent_gateway::start(config).await?;

    Ok(())
}
