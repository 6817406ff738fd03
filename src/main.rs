use std::path::PathBuf;
use clap::Parser;
use log::{error, info};

use chorus::server::{build_router, AppState};
use chorus::{Credentials, Gateway, GatewayBackend, GatewayConfig};

/// Multi-provider chat-completion gateway
#[derive(Debug, Parser)]
#[command(name = "chorus", version)]
struct Cli
{   /// JSON configuration file; built-in defaults when omitted
    #[arg(long, env = "CHORUS_CONFIG")]
    config: Option<PathBuf>
  , #[arg(long, default_value = "0.0.0.0")]
    host: String
  , #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16
}

#[tokio::main]
async fn main()
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("info")
    ).init();

    if let Err(e) = run(Cli::parse()).await
    {   error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), chorus::Error>
{   let config = match &cli.config
    {   Some(path) => GatewayConfig::from_json_file(path)?
      , None => GatewayConfig::default()
    };
    let credentials = Credentials::from_env();
    info!("Credentials: {:?}", credentials);

    let backend = GatewayBackend::new(Gateway::new(config, credentials));
    let app = build_router(AppState::new(backend));

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
      .await
      .map_err(|e| chorus::Error::Other(format!("Server error: {}", e)))
}
