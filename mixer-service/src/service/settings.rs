//! Maps loaded configuration onto round settings.

use mixer_core::application::{CoordinatorSettings, ParticipantSettings};
use mixer_core::domain::RoundParams;
use mixer_core::foundation::util::time::optional_secs;
use mixer_core::foundation::{Address, MixError};
use mixer_core::infrastructure::config::AppConfig;
use std::collections::BTreeSet;
use std::net::SocketAddr;

pub fn coordinator_settings(config: &AppConfig) -> CoordinatorSettings {
    CoordinatorSettings {
        params: RoundParams { player_count: config.coordinator.player_count, amount: config.coordinator.amount },
        input_timeout: optional_secs(config.runtime.input_timeout_secs),
        signature_timeout: optional_secs(config.runtime.signature_timeout_secs),
    }
}

pub fn listen_addr(config: &AppConfig) -> Result<SocketAddr, MixError> {
    let raw = format!("{}:{}", config.coordinator.listen_addr, config.coordinator.port);
    raw.parse().map_err(|err| MixError::ConfigError(format!("coordinator.listen_addr {raw}: {err}")))
}

/// The participant waits for its partial transaction under the input deadline, since that
/// wait lasts until every other participant has joined.
pub fn participant_settings(config: &AppConfig) -> ParticipantSettings {
    let targets: BTreeSet<Address> = config.participant.target_addresses.iter().map(|address| Address::from(address.as_str())).collect();
    ParticipantSettings {
        amount: config.participant.amount,
        targets,
        partial_timeout: optional_secs(config.runtime.input_timeout_secs),
        final_timeout: optional_secs(config.runtime.final_timeout_secs),
    }
}
