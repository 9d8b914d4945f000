//! # Command Line
//!
//! ```text
//! depot [--config FILE] [--session-file FILE] [--json] <command>
//!
//!   login / logout / whoami
//!   report     --from --to | --preset, filters, --export [DIR]
//!   dashboard  --period today|yesterday|7d
//!   customers  list | add | edit | delete
//!   stock      summary | add | movements
//!   sales      new | recent
//!   products
//!   config
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use depot_core::{PaymentMethod, Preset, RECENT_MOVEMENTS_LIMIT, RECENT_SALES_LIMIT};

#[derive(Debug, Parser)]
#[command(name = "depot")]
#[command(about = "Back-office console for the gas and water depot")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: platform config dir / console.toml)
    #[arg(long, global = true, env = "DEPOT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where the signed-in session is kept
    #[arg(long, global = true, env = "DEPOT_SESSION_FILE", value_name = "FILE")]
    pub session_file: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long, short = 'e')]
        email: String,

        #[arg(long, short = 'p', env = "DEPOT_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Sales report for a date range, grouped by day
    #[command(after_help = "\
Examples:
  depot report --preset 7d
  depot report --from 2025-01-01 --to 2025-01-31 --product agua
  depot report --preset today --payment pix --export ~/reports")]
    Report(ReportArgs),

    /// Period KPIs, product totals, stock gauges and unread messages
    Dashboard {
        #[arg(long, short = 'p', default_value = "today")]
        period: Preset,
    },

    /// Customer registry
    #[command(subcommand)]
    Customers(CustomerCommand),

    /// Stock levels and goods received
    #[command(subcommand)]
    Stock(StockCommand),

    /// Register sales and list recent ones
    #[command(subcommand)]
    Sales(SaleCommand),

    /// Product catalog with default prices
    Products,

    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Default, Args)]
pub struct ReportArgs {
    /// First day, YYYY-MM-DD (default: today)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day, YYYY-MM-DD, inclusive (default: today)
    #[arg(long)]
    pub to: Option<String>,

    /// Relative period; --from/--to override its days
    #[arg(long, value_name = "PERIOD")]
    pub preset: Option<Preset>,

    /// Keep only items of this product name (gas, agua)
    #[arg(long)]
    pub product: Option<String>,

    /// Only sales containing this product id
    #[arg(long)]
    pub product_id: Option<String>,

    /// Customer id or exact name
    #[arg(long)]
    pub customer: Option<String>,

    /// dinheiro, pix or cartao
    #[arg(long)]
    pub payment: Option<PaymentMethod>,

    /// Also save the CSV, into DIR or the configured export dir
    #[arg(long, value_name = "DIR", num_args = 0..=1)]
    pub export: Option<Option<PathBuf>>,
}

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// List customers, newest first
    List {
        /// Case-insensitive name search
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Register a customer
    Add(CustomerFields),

    /// Replace a customer's fields
    Edit {
        id: String,

        #[command(flatten)]
        fields: CustomerFields,
    },

    /// Delete a customer
    Delete { id: String },
}

#[derive(Debug, Clone, Args)]
pub struct CustomerFields {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum StockCommand {
    /// Current stock per product
    Summary,

    /// Record goods received
    Add {
        /// Product name or id
        #[arg(long)]
        product: String,

        #[arg(long, short = 'q')]
        quantity: i64,

        /// Unit cost, e.g. 85.00 or 85,00
        #[arg(long)]
        cost: Option<String>,
    },

    /// Latest movements
    Movements {
        #[arg(long, short = 'n', default_value_t = RECENT_MOVEMENTS_LIMIT)]
        limit: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum SaleCommand {
    /// Register a one-item sale
    New {
        /// Product name or id (default: gas, else the first product)
        #[arg(long)]
        product: Option<String>,

        #[arg(long, short = 'q', default_value_t = 1)]
        quantity: i64,

        /// Unit price (default: the product's price)
        #[arg(long)]
        price: Option<String>,

        #[arg(long, default_value = "dinheiro")]
        payment: PaymentMethod,

        /// Customer id or exact name; omit for a walk-in sale
        #[arg(long)]
        customer: Option<String>,
    },

    /// Latest sales with items
    Recent {
        #[arg(long, short = 'n', default_value_t = RECENT_SALES_LIMIT)]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_report_flags() {
        let cli = Cli::try_parse_from([
            "depot", "report", "--from", "2025-01-01", "--to", "2025-01-31", "--product", "agua",
            "--payment", "pix", "--export",
        ])
        .unwrap();

        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.from.as_deref(), Some("2025-01-01"));
        assert_eq!(args.product.as_deref(), Some("agua"));
        assert_eq!(args.payment, Some(PaymentMethod::Pix));
        assert_eq!(args.export, Some(None));
    }

    #[test]
    fn test_export_dir_and_global_json() {
        let cli = Cli::try_parse_from(["depot", "report", "--export", "/tmp/out", "--json"]).unwrap();
        assert!(cli.json);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.export, Some(Some(PathBuf::from("/tmp/out"))));
    }

    #[test]
    fn test_sale_defaults() {
        let cli = Cli::try_parse_from(["depot", "sales", "new"]).unwrap();
        match cli.command {
            Command::Sales(SaleCommand::New {
                product,
                quantity,
                payment,
                customer,
                ..
            }) => {
                assert_eq!(product, None);
                assert_eq!(quantity, 1);
                assert_eq!(payment, PaymentMethod::Cash);
                assert_eq!(customer, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_payment_and_period() {
        assert!(Cli::try_parse_from(["depot", "sales", "new", "--payment", "cheque"]).is_err());
        assert!(Cli::try_parse_from(["depot", "dashboard", "--period", "month"]).is_err());
    }

    #[test]
    fn test_dashboard_period() {
        let cli = Cli::try_parse_from(["depot", "dashboard", "-p", "7d"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Dashboard {
                period: Preset::Last7Days
            }
        ));
    }
}
