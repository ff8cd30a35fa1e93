use crate::foundation::{MAX_PLAYER_COUNT, MAX_TIMEOUT_SECS, MIN_PLAYER_COUNT};
use crate::infrastructure::config::types::AppConfig;
use std::collections::BTreeSet;

/// Which launcher the configuration is being checked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Coordinator,
    Participant,
    /// Offline wallet maintenance; only shared settings apply.
    Wallet,
}

impl AppConfig {
    /// Checks settings shared by every role.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        self.validate_runtime(&mut errors);
        if self.logging.level.trim().is_empty() {
            errors.push("logging.level must not be empty".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Checks shared settings plus the section the given role needs.
    pub fn validate_for(&self, role: Role) -> Result<(), Vec<String>> {
        let mut errors = self.validate().err().unwrap_or_default();
        match role {
            Role::Coordinator => self.validate_coordinator(&mut errors),
            Role::Participant => self.validate_participant(&mut errors),
            Role::Wallet => {}
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_runtime(&self, errors: &mut Vec<String>) {
        let timeouts = [
            ("runtime.input_timeout_secs", self.runtime.input_timeout_secs),
            ("runtime.signature_timeout_secs", self.runtime.signature_timeout_secs),
            ("runtime.final_timeout_secs", self.runtime.final_timeout_secs),
            ("runtime.connect_timeout_secs", self.runtime.connect_timeout_secs),
        ];
        for (name, value) in timeouts {
            if value > MAX_TIMEOUT_SECS {
                errors.push(format!("{name} should not exceed {MAX_TIMEOUT_SECS}"));
            }
        }
    }

    fn validate_coordinator(&self, errors: &mut Vec<String>) {
        let coordinator = &self.coordinator;
        if coordinator.player_count < MIN_PLAYER_COUNT || coordinator.player_count > MAX_PLAYER_COUNT {
            errors.push(format!("coordinator.player_count must be within {MIN_PLAYER_COUNT}..={MAX_PLAYER_COUNT}"));
        }
        if coordinator.amount == 0 {
            errors.push("coordinator.amount must be > 0".to_string());
        }
        if coordinator.listen_addr.trim().is_empty() {
            errors.push("coordinator.listen_addr must not be empty".to_string());
        }
        if coordinator.port == 0 {
            errors.push("coordinator.port must be > 0".to_string());
        }
    }

    fn validate_participant(&self, errors: &mut Vec<String>) {
        let participant = &self.participant;
        if participant.coordinator_addr.trim().is_empty() {
            errors.push("participant.coordinator_addr is required".to_string());
        }
        if participant.wallet_path.trim().is_empty() {
            errors.push("participant.wallet_path is required".to_string());
        }
        if participant.amount == 0 {
            errors.push("participant.amount must be > 0".to_string());
        }
        if participant.target_addresses.len() < MIN_PLAYER_COUNT {
            errors.push(format!("participant.target_addresses needs at least {MIN_PLAYER_COUNT} addresses"));
        }
        let unique: BTreeSet<&str> = participant.target_addresses.iter().map(|address| address.as_str()).collect();
        if unique.len() != participant.target_addresses.len() {
            errors.push("participant.target_addresses contains duplicates".to_string());
        }
    }
}
