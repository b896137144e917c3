use anyhow::{Context, Result};
use callroute::{
    secrets::TwilioCredentials,
    token::{inspect, mint, IdentityStrategy, TokenConfig},
    CONFIG,
};
use chrono::{Duration, Utc};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mint a Twilio Voice access token")]
struct Cli {
    /// Fixed identity for the token bearer
    #[arg(long, conflicts_with = "unique")]
    identity: Option<String>,
    /// Derive a unique identity from the current time
    #[arg(long)]
    unique: bool,
    /// Prefix for derived identities
    #[arg(long, default_value = CONFIG.settings.identity_prefix)]
    prefix: String,
    /// Token lifetime in seconds
    #[arg(long, default_value_t = CONFIG.settings.twilio_token_expiry)]
    ttl: i64,
    /// Do not allow incoming calls to this identity
    #[arg(long)]
    no_incoming: bool,
    /// Decode the minted token again and print its claims
    #[arg(long)]
    verify: bool,
}

/// `--identity` wins, `--unique` derives one from the clock, otherwise the
/// fixed `{prefix}_123`.
fn identity_strategy(cli: &Cli) -> IdentityStrategy {
    match (&cli.identity, cli.unique) {
        (Some(identity), _) => IdentityStrategy::Fixed(identity.clone()),
        (None, true) => IdentityStrategy::TimeDerived {
            prefix: cli.prefix.clone(),
        },
        (None, false) => IdentityStrategy::Fixed(format!("{}_123", cli.prefix)),
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let credentials = TwilioCredentials::from_env().context("Invalid Twilio credentials")?;

    let config = TokenConfig {
        credentials,
        identity: identity_strategy(&cli),
        ttl: Duration::seconds(cli.ttl),
        incoming_allow: !cli.no_incoming,
    };

    let token = mint(&config, Utc::now()).context("Failed to mint the access token")?;

    println!("Identity:   {}", token.identity);
    println!("Expires at: {}", token.expires_at.to_rfc3339());
    println!();
    println!("{}", token.jwt);

    if cli.verify {
        let claims = inspect(&token.jwt, &config.credentials.api_key_secret)
            .context("Minted token failed verification")?;
        println!();
        println!("{}", serde_json::to_string_pretty(&claims)?);
    }

    Ok(())
}
