use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use devkit_wallet_cli::handlers::wallet_commands;
use devkit_wallet_cli::ui::prompt::ConsolePrompt;
use devkit_wallet_cli::wallet::MnemonicManager;
use devkit_wallet_cli::{Chain, KeystoreStore, WalletConfig};

#[derive(Clone, Debug, ValueEnum)]
enum ChainArg {
    /// Conflux Core space (base32 addresses)
    Core,
    /// Conflux eSpace (EVM hex addresses)
    Espace,
}

impl From<ChainArg> for Chain {
    fn from(arg: ChainArg) -> Self {
        match arg {
            ChainArg::Core => Chain::Core,
            ChainArg::Espace => Chain::Espace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Mnemonic keystore and HD wallet for Conflux dev nodes")]
struct Cli {
    /// Keystore file path (default: ~/.devkit.keystore.json)
    #[arg(long, global = true)]
    keystore: Option<PathBuf>,

    /// Core space network id for address encoding
    #[arg(long, global = true)]
    network_id: Option<u32>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create and activate a default keystore if none exists
    Init,
    /// Add a mnemonic (generate or import, plaintext or encrypted)
    Add,
    /// List keystore entries
    List,
    /// Select the active mnemonic
    Select {
        /// Entry index; prompts interactively when omitted
        index: Option<usize>,
    },
    /// Delete a keystore entry
    Delete { index: usize },
    /// Show the active mnemonic's label
    Active,
    /// Derive accounts from the active mnemonic
    Derive {
        #[arg(long, value_enum)]
        chain: ChainArg,

        /// First account index (inclusive)
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Last account index (inclusive)
        #[arg(long, default_value_t = 0)]
        to: u32,

        /// Print private keys alongside addresses
        #[arg(long)]
        show_secrets: bool,
    },
    /// Print one account's address
    Address {
        #[arg(long, value_enum)]
        chain: ChainArg,

        #[arg(long, default_value_t = 0)]
        index: u32,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Environment resolution happens here, once; the core only ever sees the
    // resolved values.
    let mut config = WalletConfig::from_env();
    if let Some(path) = cli.keystore {
        config.keystore_path = path;
    }
    if let Some(network_id) = cli.network_id {
        config.core_network_id = network_id;
    }

    let mut manager = MnemonicManager::new(KeystoreStore::open(&config.keystore_path));
    let mut prompt = ConsolePrompt::new();

    match cli.command {
        Command::Init => wallet_commands::handle_init(&mut manager)?,
        command => {
            manager.store_mut().load()?;
            match command {
                Command::Init => unreachable!(),
                Command::Add => wallet_commands::handle_add(&mut manager, &mut prompt)?,
                Command::List => wallet_commands::handle_list(&manager)?,
                Command::Select { index } => {
                    wallet_commands::handle_select(&mut manager, &mut prompt, index)?
                }
                Command::Delete { index } => wallet_commands::handle_delete(&mut manager, index)?,
                Command::Active => wallet_commands::handle_active(&manager)?,
                Command::Derive {
                    chain,
                    from,
                    to,
                    show_secrets,
                } => wallet_commands::handle_derive(
                    &manager,
                    &mut prompt,
                    chain.into(),
                    from,
                    to,
                    config.core_network_id,
                    show_secrets,
                )?,
                Command::Address { chain, index } => wallet_commands::handle_address(
                    &manager,
                    &mut prompt,
                    chain.into(),
                    index,
                    config.core_network_id,
                )?,
            }
        }
    }

    Ok(())
}
