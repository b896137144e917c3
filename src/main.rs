use anyhow::{Context, Result};
use callroute::{routing::RoutingPolicy, secrets::Secrets, CONFIG};
use std::net::SocketAddr;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment and logger
    dotenv::dotenv().ok();
    env_logger::init();

    // Load and validate the secrets
    let secrets = Secrets::from_env().context("Invalid Twilio configuration")?;
    if secrets.twilio_auth_token.is_none() {
        log::warn!("TWILIO_AUTH_TOKEN is not set, webhook signatures will not be verified");
    }

    let policy = RoutingPolicy::from_config();
    log::info!("Routing calls with {:?}", policy);

    // Initialize the TCP listener
    log::info!(
        "Connecting to the server at {}",
        CONFIG.settings.local_address
    );
    let tcp = TcpListener::bind(CONFIG.settings.local_address)
        .await
        .context("Failed to bind the server address")?;

    log::info!(
        "Voice webhook available at {}",
        CONFIG.settings.voice_route
    );

    // Start the webserver
    let router = callroute::app(secrets, policy);
    axum::serve(
        tcp,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Failed to start the server")?;

    Ok(())
}
