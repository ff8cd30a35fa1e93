#![no_main]

use arbitrary::Unstructured;
use libfuzzer_sys::fuzz_target;
use mixer_core::domain::{CoordinatorPhase, ParticipantPhase};

const COORDINATOR: [CoordinatorPhase; 6] = [
    CoordinatorPhase::Accepting,
    CoordinatorPhase::CollectingInputs,
    CoordinatorPhase::Constructed,
    CoordinatorPhase::CollectingSignatures,
    CoordinatorPhase::Finalized,
    CoordinatorPhase::Aborted,
];

const PARTICIPANT: [ParticipantPhase; 8] = [
    ParticipantPhase::Connecting,
    ParticipantPhase::InputSent,
    ParticipantPhase::AwaitingPartial,
    ParticipantPhase::Verifying,
    ParticipantPhase::Signed,
    ParticipantPhase::AwaitingFinal,
    ParticipantPhase::Committed,
    ParticipantPhase::Aborted,
];

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let mut coordinator = CoordinatorPhase::Accepting;
    let mut participant = ParticipantPhase::Connecting;
    while let Ok(byte) = u.arbitrary::<u8>() {
        let next = COORDINATOR[byte as usize % COORDINATOR.len()];
        if coordinator.can_transition_to(next) {
            assert!(!coordinator.is_terminal());
            coordinator = next;
        }
        let next = PARTICIPANT[byte as usize % PARTICIPANT.len()];
        if participant.can_transition_to(next) {
            assert!(!participant.is_terminal());
            participant = next;
        }
    }
});
