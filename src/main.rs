use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use navbridge::config::Config;
use navbridge::server::{init_tracing, NavigationServer};

/// Navigation bridge between postback-driven views and stateless handlers.
#[derive(Debug, Parser)]
#[command(name = "navbridge", version, about)]
struct Cli {
    /// Path to the config file (defaults to the user config directory).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the bind address from the config file.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;
    if let Some(bind) = cli.bind {
        config.server.bind_addr = bind;
        config.validate()?;
    }

    let mut server = NavigationServer::new(&config);
    server
        .try_bind(&config.server.bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    server.run().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["navbridge"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.bind.is_none());
    }

    #[test]
    fn parse_overrides() {
        let cli =
            Cli::try_parse_from(["navbridge", "--config", "/tmp/c.toml", "--bind", "0.0.0.0:9000"])
                .unwrap();
        assert_eq!(cli.config.unwrap().to_str(), Some("/tmp/c.toml"));
        assert_eq!(cli.bind.as_deref(), Some("0.0.0.0:9000"));
    }
}
