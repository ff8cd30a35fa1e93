//! Participant session driver.

use crate::domain::coordination::ParticipantState;
use crate::domain::{Ledger, Wallet};
use crate::foundation::util::conversion::u32_to_usize;
use crate::foundation::util::time::with_deadline;
use crate::foundation::{AbortSignal, Address, Amount, MixError, Result, TransactionId, TxBytes};
use crate::infrastructure::transport::{FrameReader, FrameWriter, MixMessage};
use log::{info, warn};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantSettings {
    pub amount: Amount,
    pub targets: BTreeSet<Address>,
    pub partial_timeout: Option<Duration>,
    pub final_timeout: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParticipantOutcome {
    pub tx_id: TransactionId,
    pub signing_index: usize,
    pub final_tx: TxBytes,
}

pub struct ParticipantSession {
    ledger: Arc<dyn Ledger>,
    wallet: Arc<dyn Wallet>,
    settings: ParticipantSettings,
    abort: AbortSignal,
}

impl ParticipantSession {
    pub fn new(ledger: Arc<dyn Ledger>, wallet: Arc<dyn Wallet>, settings: ParticipantSettings) -> Self {
        Self { ledger, wallet, settings, abort: AbortSignal::new() }
    }

    /// Signal that cancels `run` at its next suspension point.
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Runs one round over an already connected stream.
    ///
    /// Selects the funding output before anything is sent, so an empty wallet never talks
    /// to the coordinator.
    pub async fn run<S>(self, stream: S) -> Result<ParticipantOutcome>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let own_input = self.wallet.select_funding_output(self.settings.amount)?;
        let mut state = ParticipantState::new(self.settings.amount, self.settings.targets.clone(), own_input);
        let (read_half, write_half) = tokio::io::split(stream);
        let mut reader = FrameReader::new(read_half);
        let mut writer = FrameWriter::new(write_half);

        let result = self.drive(&mut state, &mut reader, &mut writer).await;
        if let Err(err) = &result {
            state.abort();
            warn!("participant round aborted phase={} code={} error={}", state.phase(), err.code(), err);
        }
        let _ = writer.shutdown().await;
        result
    }

    async fn drive<R, W>(&self, state: &mut ParticipantState, reader: &mut FrameReader<R>, writer: &mut FrameWriter<W>) -> Result<ParticipantOutcome>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let input = state.input_message()?;
        info!("sending input outpoint={} amount={} targets={}", input.source_output.outpoint, self.settings.amount, input.target_addresses.len());
        writer.write_message(&MixMessage::Input(input)).await?;
        state.input_delivered()?;

        let (unsigned_tx, signing_index) = match self.next_message(reader, self.settings.partial_timeout, "partial_transaction").await? {
            MixMessage::PartialTransaction { unsigned_tx, signing_index } => (unsigned_tx, u32_to_usize(signing_index)),
            other => return Err(MixError::protocol(None, format!("expected partial_transaction, got {}", other.kind()))),
        };
        let signature = state.on_partial(self.ledger.as_ref(), self.wallet.as_ref(), &unsigned_tx, signing_index)?;
        writer.write_message(&MixMessage::Signature { signature }).await?;
        state.signature_delivered()?;

        match self.next_message(reader, self.settings.final_timeout, "transaction").await? {
            MixMessage::Transaction { final_tx } => {
                state.on_final(self.ledger.as_ref(), &final_tx)?;
                let tx_id = self.commit(final_tx.clone()).await?;
                state.mark_committed()?;
                info!("joint transaction committed tx_id={} signing_index={}", tx_id, signing_index);
                Ok(ParticipantOutcome { tx_id, signing_index, final_tx })
            }
            MixMessage::PartialTransaction { unsigned_tx, signing_index } => {
                // The latch refuses; this only produces the error.
                state.on_partial(self.ledger.as_ref(), self.wallet.as_ref(), &unsigned_tx, u32_to_usize(signing_index))?;
                Err(MixError::InvariantViolation("second partial transaction was signed".to_string()))
            }
            other => Err(MixError::protocol(None, format!("expected transaction, got {}", other.kind()))),
        }
    }

    async fn commit(&self, final_tx: TxBytes) -> Result<TransactionId> {
        let wallet = self.wallet.clone();
        tokio::task::spawn_blocking(move || wallet.commit(&final_tx))
            .await
            .map_err(|err| MixError::wallet("commit", format!("commit task failed: {err}")))?
    }

    async fn next_message<R>(&self, reader: &mut FrameReader<R>, limit: Option<Duration>, awaiting: &str) -> Result<MixMessage>
    where
        R: AsyncRead + Unpin,
    {
        let read = with_deadline(limit, awaiting, async {
            reader
                .read_message()
                .await?
                .ok_or_else(|| MixError::connection("receive", format!("coordinator closed the connection while awaiting {awaiting}")))
        });
        tokio::select! {
            reason = self.abort.triggered() => Err(MixError::SessionAborted { reason }),
            read = read => read,
        }
    }
}
