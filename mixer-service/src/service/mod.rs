pub mod coordinator;
pub mod participant;
pub mod settings;

pub use coordinator::{serve_round, CoordinatorServer};
pub use participant::run_participant;
pub use settings::{coordinator_settings, listen_addr, participant_settings};
