use anyhow::Result;
use authentik_sync::{AuthentikClient, MembershipResolver, Settings};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Resolve the members of an Authentik group into GitHub-usable usernames.
///
/// Configuration comes from the environment: AUTHENTIK_SERVER_URL,
/// AUTHENTIK_API_KEY, and optionally AUTHENTIK_USERNAME_ATTRIBUTE and
/// EMU_SHORTCODE.
#[derive(Parser)]
#[command(name = "authentik-sync", version)]
struct Cli {
    /// Name of the Authentik group to resolve
    group: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    let client = Arc::new(AuthentikClient::new(&settings)?);
    let resolver = MembershipResolver::new(settings, client);

    let members = resolver.group_members(&cli.group).await?;
    println!("{}", serde_json::to_string_pretty(&members)?);

    Ok(())
}
