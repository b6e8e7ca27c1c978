//! route-dispatch command line.
//!
//! Loads a routing configuration and inspects it without a transport:
//! validate and summarize the tables, probe which route a path selects,
//! compose URLs, or watch the file and rebuild the router on change.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use route_dispatch::config::{load_config, ConfigWatcher, RouterHandle};
use route_dispatch::observability::logging;
use route_dispatch::{ActionInvoker, ActionRegistry, Params, Router};

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Inspect and exercise routing tables", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, validate and build the routing tables
    Check,
    /// Show which redirect or route a path selects, without running actions
    Match {
        path: String,
    },
    /// Compose a URL from a template and key=value parameters
    Compose {
        template: String,
        params: Vec<String>,
        /// Drop unused parameters instead of appending them as a query
        #[arg(long)]
        no_query: bool,
    },
    /// Watch the configuration file and rebuild the router on change
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::debug!(
        path = ?cli.config,
        routes = config.routes.len(),
        redirects = config.redirects.len(),
        handlers = config.handlers.len(),
        "Configuration loaded"
    );

    // Actions are only resolved at dispatch time, so an empty registry
    // is enough to build and inspect the tables.
    let invoker: Arc<dyn ActionInvoker> = Arc::new(ActionRegistry::new());
    let router = Router::from_config(&config, invoker.clone())?;

    match cli.command {
        Commands::Check => print_summary(&router),
        Commands::Match { path } => {
            let probe = router.probe(&path);
            println!("{}", serde_json::to_string_pretty(&probe)?);
        }
        Commands::Compose {
            template,
            params,
            no_query,
        } => {
            let params = parse_params(&params)?;
            println!("{}", router.compose(&template, &params, !no_query)?);
        }
        Commands::Watch => {
            let handle = RouterHandle::new(router);
            let (watcher, updates) = ConfigWatcher::new(&cli.config, invoker);
            let _watcher = watcher.run()?;

            tokio::select! {
                _ = handle.follow(updates) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received");
                }
            }
        }
    }

    Ok(())
}

fn print_summary(router: &Router) {
    let settings = router.settings();
    println!(
        "restless: {}, word separator: {:?}, max redirect hops: {}",
        settings.restless, settings.word_separator, settings.max_redirect_hops
    );

    println!("routes ({}):", router.routes().len());
    for route in router.routes().iter() {
        println!("  {} -> {}", route.template(), route.action());
    }

    println!("redirects ({}):", router.redirects().len());
    for redirect in router.redirects().iter() {
        println!("  {} -> {} [{}]", redirect.route(), redirect.translation(), redirect.kind());
    }

    println!("handlers ({}):", router.handlers().len());
    for handler in router.handlers().iter() {
        let base_url = if handler.base_url().is_empty() { "(root)" } else { handler.base_url() };
        println!("  {} {} -> {}", base_url, handler.error(), handler.action());
    }
}

fn parse_params(pairs: &[String]) -> Result<Params, String> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .ok_or_else(|| format!("Parameter \"{}\" is not of the form key=value", pair))
        })
        .collect()
}
