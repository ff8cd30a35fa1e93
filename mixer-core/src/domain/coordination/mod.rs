pub mod coordinator;
pub mod participant;
pub mod phase;

pub use coordinator::{CoordinatorState, FinalTransaction, ParticipantSlot, RoundParams};
pub use participant::ParticipantState;
pub use phase::{CoordinatorPhase, ParticipantPhase};
