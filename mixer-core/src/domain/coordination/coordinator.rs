//! Coordinator round state.
//!
//! `CoordinatorState` is the single owner of the slot table, the unsigned transaction and
//! the signature map. It is synchronous; every check-then-act sequence runs
//! inside one `&mut self` call, and the async layer feeds it one event at a time.

use crate::domain::coordination::phase::CoordinatorPhase;
use crate::domain::fairness::{check_agreement, FairnessPolicy};
use crate::domain::latch::OneShot;
use crate::domain::ledger::Ledger;
use crate::domain::transaction::{OutputRef, ParticipantInput};
use crate::foundation::{Amount, MixError, Result, SignatureBytes, TransactionId, TxBytes};
use log::{debug, info};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundParams {
    pub player_count: usize,
    pub amount: Amount,
}

#[derive(Debug)]
pub struct ParticipantSlot {
    pub index: usize,
    input: OneShot<ParticipantInput>,
    signature: OneShot<SignatureBytes>,
}

impl ParticipantSlot {
    fn new(index: usize) -> Self {
        Self { index, input: OneShot::new(), signature: OneShot::new() }
    }

    pub fn input(&self) -> Option<&ParticipantInput> {
        self.input.get()
    }

    pub fn signature(&self) -> Option<&SignatureBytes> {
        self.signature.get()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalTransaction {
    pub final_tx: TxBytes,
    pub tx_id: TransactionId,
}

pub struct CoordinatorState {
    params: RoundParams,
    phase: CoordinatorPhase,
    slots: Vec<ParticipantSlot>,
    unsigned_tx: OneShot<TxBytes>,
    final_tx: Option<FinalTransaction>,
    ledger: Arc<dyn Ledger>,
}

impl CoordinatorState {
    pub fn new(params: RoundParams, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            params,
            phase: CoordinatorPhase::Accepting,
            slots: Vec::with_capacity(params.player_count),
            unsigned_tx: OneShot::new(),
            final_tx: None,
            ledger,
        }
    }

    pub fn params(&self) -> RoundParams {
        self.params
    }

    pub fn phase(&self) -> CoordinatorPhase {
        self.phase
    }

    pub fn admitted(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[ParticipantSlot] {
        &self.slots
    }

    pub fn inputs_received(&self) -> usize {
        self.slots.iter().filter(|slot| slot.input.is_filled()).count()
    }

    pub fn signatures_received(&self) -> usize {
        self.slots.iter().filter(|slot| slot.signature.is_filled()).count()
    }

    pub fn unsigned_tx(&self) -> Option<&TxBytes> {
        self.unsigned_tx.get()
    }

    pub fn final_tx(&self) -> Option<&FinalTransaction> {
        self.final_tx.as_ref()
    }

    /// Assigns the next index. Never reuses an index and never exceeds the player count.
    pub fn admit(&mut self) -> Result<usize> {
        if self.phase.is_terminal() {
            return Err(MixError::SessionAborted { reason: format!("round is {}", self.phase) });
        }
        if self.slots.len() >= self.params.player_count {
            return Err(MixError::CapacityExceeded { admitted: self.slots.len(), capacity: self.params.player_count });
        }
        let index = self.slots.len();
        self.slots.push(ParticipantSlot::new(index));
        debug!("participant admitted index={} admitted={}/{}", index, self.slots.len(), self.params.player_count);
        if self.slots.len() == self.params.player_count {
            self.transition(CoordinatorPhase::CollectingInputs)?;
        }
        Ok(index)
    }

    /// Records an Input. Returns the unsigned transaction when this was the last one.
    pub fn receive_input(&mut self, index: usize, input: ParticipantInput) -> Result<Option<TxBytes>> {
        let slot = self.slots.get(index).ok_or_else(|| MixError::protocol(Some(index), "input from unknown participant"))?;
        if slot.input.is_filled() {
            return Err(MixError::protocol(Some(index), "duplicate input"));
        }
        if !self.phase.accepts_inputs() {
            return Err(MixError::protocol(Some(index), format!("input received in phase {}", self.phase)));
        }
        self.validate_input(index, &input)?;

        self.slots[index].input.fill(input).map_err(|_| MixError::protocol(Some(index), "duplicate input"))?;
        check_agreement(self.slots.iter().filter_map(|slot| slot.input().map(|input| &input.target_addresses)))?;

        let received = self.inputs_received();
        info!("input accepted index={} inputs={}/{}", index, received, self.params.player_count);
        if received < self.params.player_count {
            return Ok(None);
        }
        self.construct_transaction().map(Some)
    }

    fn validate_input(&self, index: usize, input: &ParticipantInput) -> Result<()> {
        let invalid = |details: String| MixError::InvalidInput { index, details };
        if input.target_addresses.len() != self.params.player_count {
            return Err(invalid(format!(
                "{} target addresses declared, round has {} participants",
                input.target_addresses.len(),
                self.params.player_count
            )));
        }
        if input.target_addresses.iter().any(|address| address.is_empty()) {
            return Err(invalid("empty target address".to_string()));
        }
        if input.source_output.amount < self.params.amount {
            return Err(invalid(format!("funding output carries {} below amount {}", input.source_output.amount, self.params.amount)));
        }
        let outpoint = input.source_output.outpoint;
        if self.slots.iter().filter_map(ParticipantSlot::input).any(|other| other.source_output.outpoint == outpoint) {
            return Err(invalid(format!("funding output {outpoint} already contributed")));
        }
        Ok(())
    }

    fn construct_transaction(&mut self) -> Result<TxBytes> {
        let mut inputs: Vec<OutputRef> = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let input = slot.input().ok_or_else(|| MixError::InvariantViolation(format!("slot {} has no input at construction", slot.index)))?;
            inputs.push(input.source_output.clone());
        }
        let targets = self
            .slots
            .first()
            .and_then(ParticipantSlot::input)
            .map(|input| input.target_addresses.clone())
            .ok_or_else(|| MixError::InvariantViolation("no inputs at construction".to_string()))?;
        let outputs = FairnessPolicy::new(self.params.amount, targets).expected_outputs();

        let tx = self.ledger.build_unsigned_transaction(&inputs, &outputs)?;
        self.unsigned_tx.fill(tx.clone()).map_err(|_| MixError::InvariantViolation("unsigned transaction constructed twice".to_string()))?;
        self.transition(CoordinatorPhase::Constructed)?;
        info!("joint transaction constructed inputs={} outputs={} bytes={}", inputs.len(), outputs.len(), tx.len());
        Ok(tx)
    }

    /// Called once the partial transaction has been handed to every participant.
    pub fn mark_partials_sent(&mut self) -> Result<()> {
        self.transition(CoordinatorPhase::CollectingSignatures)
    }

    /// Records a Signature. Returns the final transaction when this was the last one.
    pub fn receive_signature(&mut self, index: usize, signature: SignatureBytes) -> Result<Option<FinalTransaction>> {
        let slot = self.slots.get(index).ok_or_else(|| MixError::protocol(Some(index), "signature from unknown participant"))?;
        let Some(input) = slot.input() else {
            return Err(MixError::protocol(Some(index), "signature before input"));
        };
        if slot.signature.is_filled() {
            return Err(MixError::DoubleSignAttempt { index });
        }
        if self.phase != CoordinatorPhase::CollectingSignatures {
            return Err(MixError::protocol(Some(index), format!("signature received in phase {}", self.phase)));
        }
        let unsigned_tx = self.unsigned_tx.get().ok_or_else(|| MixError::InvariantViolation("collecting signatures without a transaction".to_string()))?;
        self.ledger
            .verify_input_signature(unsigned_tx, index, &input.source_output, &signature)
            .map_err(|err| {
                debug!("signature rejected index={} error={}", index, err);
                MixError::InvalidSignature { input_index: index }
            })?;

        self.slots[index].signature.fill(signature).map_err(|_| MixError::DoubleSignAttempt { index })?;
        let received = self.signatures_received();
        info!("signature accepted index={} signatures={}/{}", index, received, self.params.player_count);
        if received < self.params.player_count {
            return Ok(None);
        }
        self.assemble().map(Some)
    }

    fn assemble(&mut self) -> Result<FinalTransaction> {
        let unsigned_tx = self.unsigned_tx.get().ok_or_else(|| MixError::InvariantViolation("assembling without a transaction".to_string()))?;
        let mut signatures = BTreeMap::new();
        for slot in &self.slots {
            let signature = slot.signature().ok_or_else(|| MixError::InvariantViolation(format!("slot {} has no signature at assembly", slot.index)))?;
            signatures.insert(slot.index, signature.clone());
        }
        let final_tx = self.ledger.assemble_transaction(unsigned_tx, &signatures)?;
        let tx_id = self.ledger.transaction_id(&final_tx)?;
        self.transition(CoordinatorPhase::Finalized)?;
        info!("joint transaction finalized tx_id={} bytes={}", tx_id, final_tx.len());
        let assembled = FinalTransaction { final_tx, tx_id };
        self.final_tx = Some(assembled.clone());
        Ok(assembled)
    }

    /// Moves to ABORTED. Returns false when the round had already ended.
    pub fn abort(&mut self) -> bool {
        if self.phase.is_terminal() {
            return false;
        }
        self.phase = CoordinatorPhase::Aborted;
        true
    }

    fn transition(&mut self, to: CoordinatorPhase) -> Result<()> {
        if !self.phase.can_transition_to(to) {
            return Err(MixError::InvalidStateTransition { from: self.phase.to_string(), to: to.to_string() });
        }
        self.phase = to;
        Ok(())
    }
}
