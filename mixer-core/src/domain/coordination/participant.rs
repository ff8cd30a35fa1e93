use crate::domain::coordination::phase::ParticipantPhase;
use crate::domain::fairness::FairnessPolicy;
use crate::domain::latch::OneShotLatch;
use crate::domain::ledger::{Ledger, Wallet};
use crate::domain::transaction::{OutputRef, ParticipantInput, TransactionView};
use crate::foundation::{Address, Amount, MixError, Result, SignatureBytes};
use log::{info, warn};
use std::collections::BTreeSet;

/// Participant side of one round: at most one signature, only over a fair transaction.
#[derive(Debug)]
pub struct ParticipantState {
    phase: ParticipantPhase,
    policy: FairnessPolicy,
    own_input: OutputRef,
    sign_latch: OneShotLatch,
    signing_index: Option<usize>,
    signed_view: Option<TransactionView>,
}

impl ParticipantState {
    pub fn new(amount: Amount, targets: BTreeSet<Address>, own_input: OutputRef) -> Self {
        Self {
            phase: ParticipantPhase::Connecting,
            policy: FairnessPolicy::new(amount, targets),
            own_input,
            sign_latch: OneShotLatch::new(),
            signing_index: None,
            signed_view: None,
        }
    }

    pub fn phase(&self) -> ParticipantPhase {
        self.phase
    }

    pub fn signing_index(&self) -> Option<usize> {
        self.signing_index
    }

    pub fn own_input(&self) -> &OutputRef {
        &self.own_input
    }

    /// Produces the Input message content and moves to INPUT_SENT.
    pub fn input_message(&mut self) -> Result<ParticipantInput> {
        self.transition(ParticipantPhase::InputSent)?;
        Ok(ParticipantInput { source_output: self.own_input.clone(), target_addresses: self.policy.targets().clone() })
    }

    pub fn input_delivered(&mut self) -> Result<()> {
        self.transition(ParticipantPhase::AwaitingPartial)
    }

    /// Validates a PartialTransaction and signs the designated input exactly once.
    ///
    /// Any failure aborts the session before the wallet is asked to sign.
    pub fn on_partial(&mut self, ledger: &dyn Ledger, wallet: &dyn Wallet, unsigned_tx: &[u8], signing_index: usize) -> Result<SignatureBytes> {
        if self.sign_latch.has_fired() {
            self.abort();
            return Err(MixError::DoubleSignAttempt { index: signing_index });
        }
        if self.phase != ParticipantPhase::AwaitingPartial {
            let err = MixError::protocol(None, format!("partial transaction received in phase {}", self.phase));
            self.abort();
            return Err(err);
        }
        self.transition(ParticipantPhase::Verifying)?;

        let view = match self.verify_partial(ledger, unsigned_tx, signing_index) {
            Ok(view) => view,
            Err(err) => {
                warn!("refusing to sign signing_index={} error={}", signing_index, err);
                self.abort();
                return Err(err);
            }
        };

        if !self.sign_latch.try_fire() {
            self.abort();
            return Err(MixError::DoubleSignAttempt { index: signing_index });
        }
        let signature = match wallet.sign_input(unsigned_tx, signing_index, &self.own_input) {
            Ok(signature) => signature,
            Err(err) => {
                self.abort();
                return Err(err);
            }
        };
        self.signing_index = Some(signing_index);
        self.signed_view = Some(view);
        self.transition(ParticipantPhase::Signed)?;
        info!("signed joint transaction signing_index={} outpoint={}", signing_index, self.own_input.outpoint);
        Ok(signature)
    }

    fn verify_partial(&self, ledger: &dyn Ledger, unsigned_tx: &[u8], signing_index: usize) -> Result<TransactionView> {
        let view = ledger.decode_transaction(unsigned_tx)?;
        let input = view.inputs.get(signing_index).ok_or(MixError::InvalidSigningIndex { index: signing_index, inputs: view.inputs.len() })?;
        if input.outpoint != self.own_input.outpoint {
            return Err(MixError::protocol(None, format!("signing index {} points at foreign input {}", signing_index, input.outpoint)));
        }
        if view.inputs.iter().filter(|input| input.outpoint == self.own_input.outpoint).count() != 1 {
            return Err(MixError::protocol(None, "own input appears more than once"));
        }
        self.policy.check_outputs(&view.outputs)?;
        Ok(view)
    }

    pub fn signature_delivered(&mut self) -> Result<()> {
        self.transition(ParticipantPhase::AwaitingFinal)
    }

    /// Checks that the final transaction is the one this participant signed, fully signed.
    pub fn on_final(&mut self, ledger: &dyn Ledger, final_tx: &[u8]) -> Result<TransactionView> {
        if self.phase != ParticipantPhase::AwaitingFinal {
            let err = MixError::protocol(None, format!("final transaction received in phase {}", self.phase));
            self.abort();
            return Err(err);
        }
        let checked = ledger.decode_transaction(final_tx).and_then(|view| {
            let signed = self.signed_view.as_ref().ok_or_else(|| MixError::InvariantViolation("awaiting final without a signed transaction".to_string()))?;
            if !view.same_body(signed) {
                return Err(MixError::protocol(None, "final transaction differs from the signed one"));
            }
            if !view.is_fully_signed() {
                return Err(MixError::protocol(None, "final transaction has unsigned inputs"));
            }
            Ok(view)
        });
        if checked.is_err() {
            self.abort();
        }
        checked
    }

    pub fn mark_committed(&mut self) -> Result<()> {
        self.transition(ParticipantPhase::Committed)
    }

    /// Moves to ABORTED. Returns false when the session had already ended.
    pub fn abort(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = ParticipantPhase::Aborted;
        true
    }

    fn transition(&mut self, to: ParticipantPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(MixError::InvalidStateTransition { from: self.phase.to_string(), to: to.to_string() });
        }
        self.phase = to;
        Ok(())
    }
}
