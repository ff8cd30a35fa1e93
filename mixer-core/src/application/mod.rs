//! Application layer: async drivers around the synchronous round state.

pub mod coordinator;
pub mod lifecycle;
pub mod participant;

pub use coordinator::{CoordinatorHandle, CoordinatorSession, CoordinatorSettings, SessionOutcome};
pub use lifecycle::{CompositeObserver, NoopObserver, SessionObserver};
pub use participant::{ParticipantOutcome, ParticipantSession, ParticipantSettings};
