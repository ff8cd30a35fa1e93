#[path = "mixer-wallet/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::{Cli, Command};
use mixer_core::foundation::{Address, MixError};
use mixer_core::infrastructure::config::Role;
use mixer_core::infrastructure::ledger::FileWallet;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    setup::apply_path_overrides(args.config.as_deref(), args.data_dir.as_deref());
    let app_config = setup::load_app_config(Role::Wallet, None, |config| args.apply(config))?;
    setup::init_logging(&app_config)?;

    let path = app_config.participant.wallet_path.trim();
    if path.is_empty() {
        return Err(MixError::ConfigError("wallet path required: pass --wallet or set participant.wallet_path".to_string()).into());
    }
    let ledger = setup::dev_ledger(&app_config);

    match &args.command {
        Command::Create => {
            let wallet = FileWallet::create(path, ledger)?;
            println!("{}", wallet.path().display());
        }
        Command::NewAddress => {
            let wallet = FileWallet::open(path, ledger)?;
            println!("{}", wallet.new_address()?);
        }
        Command::Fund { address, amount } => {
            let wallet = FileWallet::open(path, ledger.clone())?;
            let address = Address::from(address.as_str());
            ledger.validate_address(&address)?;
            let output = wallet.fund(&address, *amount)?;
            println!("{} {}", output.outpoint, output.amount);
        }
        Command::Show => {
            let wallet = FileWallet::open(path, ledger)?;
            println!("network: {}", app_config.network);
            for address in wallet.addresses()? {
                println!("address: {address}");
            }
            for output in wallet.outputs()? {
                println!("output: {} amount={} owner={}", output.outpoint, output.amount, output.owner);
            }
            for tx_id in wallet.history()? {
                println!("committed: {tx_id}");
            }
            println!("balance: {}", wallet.balance()?);
        }
    }
    Ok(())
}
