#[path = "mixer-coordinator/cli.rs"]
mod cli;
#[path = "common/setup.rs"]
mod setup;

use crate::cli::Cli;
use log::{info, warn};
use mixer_core::application::CompositeObserver;
use mixer_core::infrastructure::config::Role;
use mixer_core::infrastructure::transport::tcp;
use mixer_service::service::{coordinator_settings, listen_addr, CoordinatorServer};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse_args();
    setup::apply_path_overrides(args.config.as_deref(), args.data_dir.as_deref());
    let app_config = setup::load_app_config(Role::Coordinator, args.profile.as_deref(), |config| args.apply(config))?;
    setup::init_logging(&app_config)?;
    info!(
        "mixer-coordinator starting network={} player_count={} amount={}",
        app_config.network, app_config.coordinator.player_count, app_config.coordinator.amount
    );

    let ledger = setup::dev_ledger(&app_config);
    let listener = tcp::bind(listen_addr(&app_config)?).await?;
    let server = CoordinatorServer::new(listener, coordinator_settings(&app_config), ledger, Arc::new(CompositeObserver::new()));
    let handle = server.handle();
    info!("round open session_id={} addr={}", handle.session_id(), server.local_addr()?);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, aborting round");
            handle.abort("interrupted");
        }
    });

    let outcome = server.run().await?;
    println!("{}", outcome.tx_id);
    Ok(())
}
