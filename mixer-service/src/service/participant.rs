use log::info;
use mixer_core::application::{ParticipantOutcome, ParticipantSession};
use mixer_core::foundation::MixError;
use mixer_core::infrastructure::transport::tcp;
use std::time::Duration;

/// Connects to the coordinator and runs one round.
pub async fn run_participant(coordinator_addr: &str, connect_timeout: Option<Duration>, session: ParticipantSession) -> Result<ParticipantOutcome, MixError> {
    let stream = tcp::connect(coordinator_addr, connect_timeout).await?;
    info!("connected to coordinator addr={}", coordinator_addr);
    session.run(stream).await
}
