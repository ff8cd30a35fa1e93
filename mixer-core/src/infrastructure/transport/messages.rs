use crate::domain::ParticipantInput;
use crate::foundation::{SignatureBytes, TxBytes};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four messages of a round, in protocol order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum MixMessage {
    /// Participant -> coordinator, once.
    Input(ParticipantInput),
    /// Coordinator -> participant, once, after every Input is in.
    PartialTransaction { unsigned_tx: TxBytes, signing_index: u32 },
    /// Participant -> coordinator, once, after the partial transaction.
    Signature { signature: SignatureBytes },
    /// Coordinator -> participant, once, after every Signature is in.
    Transaction { final_tx: TxBytes },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Input,
    PartialTransaction,
    Signature,
    Transaction,
}

impl MixMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            MixMessage::Input(_) => MessageKind::Input,
            MixMessage::PartialTransaction { .. } => MessageKind::PartialTransaction,
            MixMessage::Signature { .. } => MessageKind::Signature,
            MixMessage::Transaction { .. } => MessageKind::Transaction,
        }
    }
}

impl MessageKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Input => "input",
            MessageKind::PartialTransaction => "partial_transaction",
            MessageKind::Signature => "signature",
            MessageKind::Transaction => "transaction",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
