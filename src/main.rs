use anyhow::Result;
use clap::{Parser, Subcommand};

use envelope_ledger::cli::{
    handle_account_command, handle_audit, handle_available, handle_balances,
    handle_envelope_command, handle_register, handle_stash_command, handle_transaction_command,
    AccountCommands, EnvelopeCommands, RegisterArgs, StashArgs, TransactionCommands,
};
use envelope_ledger::config::{
    paths::LedgerPaths,
    settings::{AvailableCalculation, Settings},
};
use envelope_ledger::storage::{seed_if_empty, JsonFile, Storage};

#[derive(Parser)]
#[command(
    name = "ledger",
    version,
    about = "Double-entry envelope budgeting ledger",
    long_about = "Track accounts with balanced transactions, budget money into \
                  envelopes, and see what is still available to allocate."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the ledger and write default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Account management commands
    #[command(subcommand)]
    Account(AccountCommands),

    /// Envelope management commands
    #[command(subcommand)]
    Envelope(EnvelopeCommands),

    /// Transaction commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Move money from one envelope to another
    Stash(StashArgs),

    /// Show every account's balance
    Balances,

    /// Show unallocated funds
    Available {
        /// Calculation mode; defaults to the configured one
        #[arg(short, long, value_enum)]
        mode: Option<AvailableCalculation>,
        /// Also list envelopes with their spending
        #[arg(short, long)]
        envelopes: bool,
    },

    /// Show an account register, newest first
    Register(RegisterArgs),

    /// Show recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    envelope_ledger::init_tracing();
    let cli = Cli::parse();

    let paths = LedgerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    let seeded = seed_if_empty(&storage, &settings)?;

    match cli.command {
        Some(Commands::Init) => {
            if !paths.settings_file().exists() {
                settings.save(&paths)?;
            }
            println!("Ledger at: {}", paths.base_dir().display());
            if seeded {
                println!("Created envelopes:");
                for envelope in storage.envelopes.get_all()? {
                    println!("  - {}", envelope.name);
                }
            } else {
                println!("Ledger already initialized.");
            }
        }
        Some(Commands::Config) => {
            println!("Envelope Ledger Configuration");
            println!("=============================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!();
            for path in [
                paths.accounts_file(),
                paths.transactions_file(),
                paths.envelopes_file(),
            ] {
                let file = JsonFile::new(path);
                println!("  {:<20} {}", file.name(), file.status());
            }
            println!();
            println!("Settings:");
            println!("  Currency symbol:   {}", settings.currency_symbol);
            println!("  Asset prefix:      {}", settings.asset_prefix);
            println!("  Available mode:    {:?}", settings.available_calculation);
        }
        Some(Commands::Account(cmd)) => handle_account_command(&storage, &settings, cmd)?,
        Some(Commands::Envelope(cmd)) => handle_envelope_command(&storage, &settings, cmd)?,
        Some(Commands::Txn(cmd)) => handle_transaction_command(&storage, &settings, cmd)?,
        Some(Commands::Stash(args)) => handle_stash_command(&storage, &settings, args)?,
        Some(Commands::Balances) => handle_balances(&storage, &settings)?,
        Some(Commands::Available { mode, envelopes }) => {
            handle_available(&storage, &settings, mode, envelopes)?
        }
        Some(Commands::Register(args)) => handle_register(&storage, &settings, args)?,
        Some(Commands::Audit { limit }) => handle_audit(&storage, limit)?,
        None => {
            println!("Envelope Ledger - double-entry envelope budgeting");
            println!();
            println!("Run 'ledger --help' for usage information.");
        }
    }

    Ok(())
}

