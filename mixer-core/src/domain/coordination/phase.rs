use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CoordinatorPhase {
    #[default]
    Accepting = 0,
    CollectingInputs = 1,
    Constructed = 2,
    CollectingSignatures = 3,
    Finalized = 4,
    Aborted = 5,
}

impl CoordinatorPhase {
    pub fn can_transition_to(self, target: CoordinatorPhase) -> bool {
        use CoordinatorPhase::*;
        if target == Aborted {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Accepting, CollectingInputs)
                | (CollectingInputs, Constructed)
                | (Constructed, CollectingSignatures)
                | (CollectingSignatures, Finalized)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CoordinatorPhase::Finalized | CoordinatorPhase::Aborted)
    }

    /// Phases in which an Input message may still arrive.
    pub fn accepts_inputs(self) -> bool {
        matches!(self, CoordinatorPhase::Accepting | CoordinatorPhase::CollectingInputs)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoordinatorPhase::Accepting => "accepting",
            CoordinatorPhase::CollectingInputs => "collecting_inputs",
            CoordinatorPhase::Constructed => "constructed",
            CoordinatorPhase::CollectingSignatures => "collecting_signatures",
            CoordinatorPhase::Finalized => "finalized",
            CoordinatorPhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CoordinatorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ParticipantPhase {
    #[default]
    Connecting = 0,
    InputSent = 1,
    AwaitingPartial = 2,
    Verifying = 3,
    Signed = 4,
    AwaitingFinal = 5,
    Committed = 6,
    Aborted = 7,
}

impl ParticipantPhase {
    pub fn can_transition_to(self, target: ParticipantPhase) -> bool {
        use ParticipantPhase::*;
        if target == Aborted {
            return !self.is_terminal();
        }
        matches!(
            (self, target),
            (Connecting, InputSent)
                | (InputSent, AwaitingPartial)
                | (AwaitingPartial, Verifying)
                | (Verifying, Signed)
                | (Signed, AwaitingFinal)
                | (AwaitingFinal, Committed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ParticipantPhase::Committed | ParticipantPhase::Aborted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantPhase::Connecting => "connecting",
            ParticipantPhase::InputSent => "input_sent",
            ParticipantPhase::AwaitingPartial => "awaiting_partial",
            ParticipantPhase::Verifying => "verifying",
            ParticipantPhase::Signed => "signed",
            ParticipantPhase::AwaitingFinal => "awaiting_final",
            ParticipantPhase::Committed => "committed",
            ParticipantPhase::Aborted => "aborted",
        }
    }
}

impl fmt::Display for ParticipantPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
