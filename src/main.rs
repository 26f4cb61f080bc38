//! pacsweb main entry point

mod commands;
mod views;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use commands::{App, TransactionArgs};
use pacsweb_config::Config;
use pacsweb_api::ApiError;
use pacsweb_core::{AccType, CoreError, Pk};
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "pacsweb")]
#[command(version = "0.1.0")]
#[command(about = "Command line client for the pacs accounting server", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Password protecting the cached API token
    #[arg(short, long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the default configuration file
    InitConfig {
        #[arg(long)]
        force: bool,
    },
    /// Show the account tree
    Accounts,
    /// Balance of an account over the recent transactions
    Balance { account: Pk },
    CreateAccount {
        #[arg(long)]
        name: String,
        /// root, branch or leaf
        #[arg(long = "type")]
        acc_type: AccType,
        #[arg(long)]
        parent: Option<Pk>,
    },
    DeleteAccount { pk: Pk },
    Currencies,
    /// List the most recent transactions
    Transactions,
    /// Show one transaction
    Transaction { pk: Pk },
    CreateTransaction {
        /// Copy description, reference, movements and tags of this transaction
        #[arg(long)]
        template: Option<Pk>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        reference: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<NaiveDate>,
        /// account:currency:quantity[:comment], repeated
        #[arg(long = "movement")]
        movements: Vec<String>,
        /// foo:bar baz:boz
        #[arg(long)]
        tags: Option<String>,
    },
    DeleteTransaction { pk: Pk },
    /// Journal of an account, newest first
    Journal {
        account: Pk,
        /// Page number, starting at 0
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        page_size: Option<u32>,
    },
    /// Balance of accounts at the end of each month
    BalanceEvolution {
        #[arg(long, value_delimiter = ',', required = true)]
        accounts: Vec<Pk>,
        /// Month/Year, e.g. January/2019
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Moneys that went through accounts during each month
    FlowEvolution {
        #[arg(long, value_delimiter = ',', required = true)]
        accounts: Vec<Pk>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Price portfolio JSON file used for currency conversion
        #[arg(long)]
        portfolio: Option<PathBuf>,
        /// Currency code all values are converted to
        #[arg(long)]
        convert_to: Option<String>,
    },
    /// Fetch exchange rates as a price portfolio
    ExchangeRates {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// EUR, BRL
        #[arg(long)]
        currencies: String,
    },
    /// Validate a price portfolio file
    Portfolio { file: PathBuf },
    /// Server side feature toggles
    Toggles,
    /// Get an API token and cache it when --password is given
    Login {
        #[arg(long)]
        admin_token: Option<String>,
    },
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    Flags {
        #[command(subcommand)]
        action: Option<FlagAction>,
    },
}

#[derive(Subcommand, Debug)]
enum TokenAction {
    Show,
    Clear,
}

#[derive(Subcommand, Debug)]
enum FlagAction {
    List,
    Enable { name: String },
    Disable { name: String },
    Reset,
}

fn init_config(path: &PathBuf, force: bool) -> anyhow::Result<String> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to overwrite", path.display());
    }
    std::fs::write(path, Config::generate_default())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(format!("Wrote {}", path.display()))
}

async fn run(app: App, command: Command) -> anyhow::Result<String> {
    match command {
        Command::InitConfig { .. } => bail!("init-config runs without a loaded configuration"),
        Command::Accounts => app.accounts().await,
        Command::Balance { account } => app.balance(account).await,
        Command::CreateAccount {
            name,
            acc_type,
            parent,
        } => app.create_account(name, acc_type, parent).await,
        Command::DeleteAccount { pk } => app.delete_account(pk).await,
        Command::Currencies => app.currencies().await,
        Command::Transactions => app.transactions().await,
        Command::Transaction { pk } => app.transaction(pk).await,
        Command::CreateTransaction {
            template,
            description,
            reference,
            date,
            movements,
            tags,
        } => {
            app.create_transaction(TransactionArgs {
                template,
                description,
                reference,
                date,
                movements,
                tags,
            })
            .await
        }
        Command::DeleteTransaction { pk } => app.delete_transaction(pk).await,
        Command::Journal {
            account,
            page,
            page_size,
        } => app.journal(account, page, page_size).await,
        Command::BalanceEvolution { accounts, from, to } => {
            app.balance_evolution(accounts, &from, &to).await
        }
        Command::FlowEvolution {
            accounts,
            from,
            to,
            portfolio,
            convert_to,
        } => {
            app.flow_evolution(accounts, &from, &to, portfolio, convert_to)
                .await
        }
        Command::ExchangeRates {
            start,
            end,
            currencies,
        } => app.exchange_rates(start, end, currencies).await,
        Command::Portfolio { file } => app.portfolio(file).await,
        Command::Toggles => app.toggles().await,
        Command::Login { admin_token } => app.login(admin_token).await,
        Command::Token { action } => match action {
            TokenAction::Show => app.show_token(),
            TokenAction::Clear => app.clear_token(),
        },
        Command::Flags { action } => match action.unwrap_or(FlagAction::List) {
            FlagAction::List => app.list_flags(),
            FlagAction::Enable { name } => app.set_flag(&name, true),
            FlagAction::Disable { name } => app.set_flag(&name, false),
            FlagAction::Reset => app.reset_flags(),
        },
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Command::InitConfig { force } = args.command {
        env_logger::init();
        println!("{}", init_config(&args.config, force)?);
        return Ok(());
    }

    let config = if args.config.exists() {
        Some(
            Config::load(&args.config)
                .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
                .with_context(|| {
                    format!("Failed to load configuration from {}", args.config.display())
                })?,
        )
    } else {
        None
    };
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = config.unwrap_or_else(|| {
        log::warn!(
            "Config file {} not found, using defaults",
            args.config.display()
        );
        Config::default()
    });
    log::debug!("Using API host {}", config.server.host);

    let app = App::new(config, args.password);
    let rt = Runtime::new()?;
    match rt.block_on(run(app, args.command)) {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(err) => {
            if let Some(hint) = core_hint(&err) {
                log::info!("{}", hint);
            }
            Err(err)
        }
    }
}

/// Hint attached to the first ledger domain error in the chain
fn core_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain().find_map(|cause| {
        if let Some(ApiError::Core(core)) = cause.downcast_ref::<ApiError>() {
            return core.hint();
        }
        cause.downcast_ref::<CoreError>().and_then(CoreError::hint)
    })
}
