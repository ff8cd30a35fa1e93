#[path = "mixer-participant/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::Cli;
use log::{info, warn};
use mixer_core::application::ParticipantSession;
use mixer_core::foundation::util::time::optional_secs;
use mixer_core::infrastructure::config::Role;
use mixer_core::infrastructure::ledger::FileWallet;
use mixer_service::service::{participant_settings, run_participant};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    setup::apply_path_overrides(args.config.as_deref(), args.data_dir.as_deref());
    let app_config = setup::load_app_config(Role::Participant, args.profile.as_deref(), |config| args.apply(config))?;
    setup::init_logging(&app_config)?;

    let ledger = setup::dev_ledger(&app_config);
    let wallet = Arc::new(FileWallet::open(&app_config.participant.wallet_path, ledger.clone())?);
    for target in &app_config.participant.target_addresses {
        ledger.validate_address(&target.as_str().into())?;
    }
    info!(
        "mixer-participant starting network={} coordinator={} amount={} targets={}",
        app_config.network,
        app_config.participant.coordinator_addr,
        app_config.participant.amount,
        app_config.participant.target_addresses.len()
    );

    let session = ParticipantSession::new(ledger, wallet, participant_settings(&app_config));
    let abort = session.abort_signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, leaving round");
            abort.trigger("interrupted");
        }
    });

    let connect_timeout = optional_secs(app_config.runtime.connect_timeout_secs);
    let outcome = run_participant(&app_config.participant.coordinator_addr, connect_timeout, session).await?;
    println!("{}", outcome.tx_id);
    Ok(())
}
