//! # sidecart-cli
//!
//! Prices an exported order against a catalog file and prints the result
//! as JSON (or the effective pricing configuration as TOML).
//!
//! ## Usage
//! ```text
//! sidecart price   --catalog catalog.toml order.json
//! sidecart receipt --catalog catalog.toml order.json --pretty
//! sidecart persist --catalog catalog.json order.json
//! sidecart config
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (`RUST_LOG`, default `info,sidecart_core=debug,sidecart_cli=debug`)
//! 2. Load `PricingConfig` (file → environment → validate)
//! 3. Load the catalog and import the order
//! 4. Run the command through a `PriceCalculator`

pub mod error;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sidecart_core::order::{OrderJson, OrderTotals};
use sidecart_core::{LinePrices, Order, PosCatalog, PricingConfig, PricingStrategy};

pub use error::CliError;

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "sidecart", version, about = "Order-line pricing for Sidecart POS")]
pub struct Cli {
    /// Pricing config file (defaults to the platform config directory).
    #[arg(long, short, global = true, env = "SIDECART_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Line prices and order totals.
    Price(OrderArgs),
    /// Receipt data per line.
    Receipt(OrderArgs),
    /// Order lines as persisted, add-ons flattened into rows.
    Persist(OrderArgs),
    /// Effective pricing configuration.
    Config,
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    /// Catalog document (.toml or .json).
    #[arg(long, short = 'k', env = "SIDECART_CATALOG")]
    pub catalog: PathBuf,

    /// Exported order (JSON).
    pub order: PathBuf,

    /// Pretty-print the output.
    #[arg(long)]
    pub pretty: bool,
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Serialize)]
pub struct OrderReport {
    pub uid: Uuid,
    pub currency: String,
    pub lines: Vec<LineReport>,
    pub totals: OrderTotals,
}

#[derive(Debug, Serialize)]
pub struct LineReport {
    pub index: usize,
    pub product_name: String,
    pub quantity: Decimal,
    pub display_price: Decimal,
    #[serde(flatten)]
    pub prices: LinePrices,
}

// =============================================================================
// Entry Points
// =============================================================================

/// Runs the CLI: logging, configuration, then the selected command.
pub fn run(cli: Cli) -> Result<(), CliError> {
    init_tracing();

    let config = PricingConfig::load(cli.config.clone())?;
    info!(
        tax_mode = %config.tax_mode,
        discount_scope = %config.discount_scope,
        rounding = %config.rounding(),
        "Pricing configuration ready"
    );

    let output = execute(&cli.command, &config)?;
    println!("{}", output);
    Ok(())
}

/// Runs one command against an already loaded configuration.
pub fn execute(command: &Command, config: &PricingConfig) -> Result<String, CliError> {
    match command {
        Command::Config => Ok(toml::to_string_pretty(config)?),
        Command::Price(args) => {
            let (catalog, order) = load_inputs(args)?;
            let calculator = order.price_calculator(&catalog, config);
            render(args, &price_report(&order, &calculator, config))
        }
        Command::Receipt(args) => {
            let (catalog, order) = load_inputs(args)?;
            let calculator = order.price_calculator(&catalog, config);
            render(args, &order.export_for_printing(&calculator))
        }
        Command::Persist(args) => {
            let (catalog, order) = load_inputs(args)?;
            let calculator = order.price_calculator(&catalog, config);
            render(args, &order.persisted_lines(&calculator))
        }
    }
}

fn render<T: Serialize>(args: &OrderArgs, value: &T) -> Result<String, CliError> {
    let text = if args.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}

fn load_inputs(args: &OrderArgs) -> Result<(PosCatalog, Order), CliError> {
    let catalog = PosCatalog::load(&args.catalog)?;
    let order = load_order(&args.order, &catalog)?;
    Ok((catalog, order))
}

fn load_order(path: &Path, catalog: &PosCatalog) -> Result<Order, CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let json: OrderJson = serde_json::from_str(&content)?;
    let order = Order::from_json(&json, catalog)?;

    info!(uid = %order.uid(), lines = order.lines().len(), "Imported order");
    Ok(order)
}

fn price_report<S: PricingStrategy>(order: &Order, strategy: &S, config: &PricingConfig) -> OrderReport {
    let lines = order
        .lines()
        .iter()
        .enumerate()
        .map(|(index, line)| LineReport {
            index,
            product_name: line.product().display_name.clone(),
            quantity: line.quantity(),
            display_price: strategy.display_price(line),
            prices: strategy.all_prices(line),
        })
        .collect();

    OrderReport {
        uid: order.uid(),
        currency: config.currency.code.clone(),
        lines,
        totals: order.totals(strategy),
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=sidecart_core=trace` - Trace the pricing crate only
/// - Default: INFO, DEBUG for sidecart crates
///
/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sidecart_core=debug,sidecart_cli=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .with_writer(std::io::stderr)
        .init();
}
