//! Coordinator round actor.
//!
//! `CoordinatorSession` owns the `CoordinatorState` and is the only task that touches it.
//! Each admitted connection gets a reader task that forwards decoded frames into the event
//! channel and a writer task that drains a per-participant outbound queue. Fan-out happens
//! from the actor alone, after checking every queue can take the message. The actor owns the
//! writer tasks and only reports FINALIZED once every writer has flushed the Transaction.

use crate::application::lifecycle::SessionObserver;
use crate::domain::coordination::{CoordinatorPhase, CoordinatorState, FinalTransaction, RoundParams};
use crate::domain::Ledger;
use crate::foundation::util::conversion::usize_to_u32;
use crate::foundation::{
    AbortSignal, MixError, Result, SessionId, TransactionId, TxBytes, COORDINATOR_EVENT_QUEUE_DEPTH, FINAL_FLUSH_TIMEOUT_SECS,
    OUTBOUND_QUEUE_DEPTH,
};
use crate::infrastructure::transport::{FrameReader, FrameWriter, MixMessage};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

type BoxedWrite = Box<dyn AsyncWrite + Send + Unpin>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoordinatorSettings {
    pub params: RoundParams,
    /// Measured from the first admission until the last Input.
    pub input_timeout: Option<Duration>,
    /// Measured from the partial fan-out until the last Signature.
    pub signature_timeout: Option<Duration>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub tx_id: TransactionId,
    pub final_tx: TxBytes,
    pub participants: usize,
}

enum Event {
    Admit { writer: FrameWriter<BoxedWrite>, events: mpsc::Sender<Event>, reply: oneshot::Sender<Result<usize>> },
    Message { index: usize, message: MixMessage },
    Closed { index: usize, error: Option<MixError> },
}

/// Cloneable entry point used by the accept loop.
#[derive(Clone)]
pub struct CoordinatorHandle {
    session_id: SessionId,
    events: mpsc::Sender<Event>,
    shutdown: AbortSignal,
}

impl CoordinatorHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Fires once the round has ended, successfully or not.
    pub fn shutdown_signal(&self) -> AbortSignal {
        self.shutdown.clone()
    }

    pub fn abort(&self, reason: impl Into<String>) {
        self.shutdown.trigger(reason);
    }

    /// Admits a connection into the round and returns its participant index.
    ///
    /// On rejection the stream is dropped, which closes the connection.
    pub async fn admit<S>(&self, stream: S) -> Result<usize>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
    {
        let closed = || MixError::SessionAborted { reason: "round has ended".to_string() };
        let (read_half, write_half) = tokio::io::split(stream);
        let writer = FrameWriter::new(Box::new(write_half) as BoxedWrite);
        let (reply, reply_rx) = oneshot::channel();
        self.events.send(Event::Admit { writer, events: self.events.clone(), reply }).await.map_err(|_| closed())?;
        let index = reply_rx.await.map_err(|_| closed())??;

        tokio::spawn(read_loop(index, FrameReader::new(read_half), self.events.clone(), self.shutdown.clone()));
        Ok(index)
    }
}

async fn read_loop<R>(index: usize, mut reader: FrameReader<R>, events: mpsc::Sender<Event>, shutdown: AbortSignal)
where
    R: AsyncRead + Unpin,
{
    loop {
        let read = tokio::select! {
            _ = shutdown.triggered() => return,
            read = reader.read_message() => read,
        };
        let event = match read {
            Ok(Some(message)) => {
                debug!("frame received index={} kind={}", index, message.kind());
                Event::Message { index, message }
            }
            Ok(None) => Event::Closed { index, error: None },
            Err(err) => Event::Closed { index, error: Some(err) },
        };
        let closing = matches!(event, Event::Closed { .. });
        if events.send(event).await.is_err() || closing {
            return;
        }
    }
}

/// Drains `outbound` until the actor drops the sender. Fails on the first unwritable frame.
async fn write_loop(index: usize, mut writer: FrameWriter<BoxedWrite>, mut outbound: mpsc::Receiver<MixMessage>, events: mpsc::Sender<Event>) -> Result<()> {
    while let Some(message) = outbound.recv().await {
        if let Err(err) = writer.write_message(&message).await {
            warn!("write failed index={} kind={} error={}", index, message.kind(), err);
            let _ = events.try_send(Event::Closed { index, error: Some(MixError::connection("send", err.to_string())) });
            return Err(err);
        }
        debug!("frame sent index={} kind={}", index, message.kind());
    }
    let _ = writer.shutdown().await;
    Ok(())
}

pub struct CoordinatorSession {
    session_id: SessionId,
    state: CoordinatorState,
    settings: CoordinatorSettings,
    observer: Arc<dyn SessionObserver>,
    outbound: Vec<mpsc::Sender<MixMessage>>,
    writers: Vec<JoinHandle<Result<()>>>,
    events: mpsc::Receiver<Event>,
    shutdown: AbortSignal,
    input_deadline: Option<Instant>,
    signature_deadline: Option<Instant>,
}

impl CoordinatorSession {
    pub fn new(settings: CoordinatorSettings, ledger: Arc<dyn Ledger>, observer: Arc<dyn SessionObserver>) -> (Self, CoordinatorHandle) {
        let session_id = SessionId::random();
        let (events_tx, events) = mpsc::channel(COORDINATOR_EVENT_QUEUE_DEPTH);
        let shutdown = AbortSignal::new();
        let session = Self {
            session_id,
            state: CoordinatorState::new(settings.params, ledger),
            settings,
            observer,
            outbound: Vec::with_capacity(settings.params.player_count),
            writers: Vec::with_capacity(settings.params.player_count),
            events,
            shutdown: shutdown.clone(),
            input_deadline: None,
            signature_deadline: None,
        };
        (session, CoordinatorHandle { session_id, events: events_tx, shutdown })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Drives the round to FINALIZED or ABORTED.
    pub async fn run(mut self) -> Result<SessionOutcome> {
        info!(
            "coordinator round started session_id={} player_count={} amount={}",
            self.session_id.short(),
            self.settings.params.player_count,
            self.settings.params.amount
        );
        loop {
            let deadline = self.current_deadline();
            let sleep = async move {
                match deadline {
                    Some((at, _, _)) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };
            let step = tokio::select! {
                reason = self.shutdown.triggered() => Err(MixError::SessionAborted { reason }),
                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => Err(MixError::SessionAborted { reason: "event channel closed".to_string() }),
                },
                _ = sleep => match deadline {
                    Some((_, phase, timeout_secs)) => Err(MixError::Timeout { phase: phase.to_string(), timeout_secs }),
                    None => Ok(None),
                },
            };
            match step {
                Ok(Some(finalized)) => return self.finish(finalized).await,
                Ok(None) => {}
                Err(err) => return Err(self.fail(err)),
            }
        }
    }

    fn current_deadline(&self) -> Option<(Instant, &'static str, u64)> {
        let (at, phase, limit) = match self.state.phase() {
            CoordinatorPhase::Accepting | CoordinatorPhase::CollectingInputs => (self.input_deadline?, "inputs", self.settings.input_timeout?),
            CoordinatorPhase::CollectingSignatures => (self.signature_deadline?, "signatures", self.settings.signature_timeout?),
            _ => return None,
        };
        Some((at, phase, limit.as_secs()))
    }

    fn handle_event(&mut self, event: Event) -> Result<Option<FinalTransaction>> {
        match event {
            Event::Admit { writer, events, reply } => {
                self.on_admit(writer, events, reply);
                Ok(None)
            }
            Event::Message { index, message } => self.on_message(index, message),
            Event::Closed { index, error } => {
                let details = match error {
                    Some(err) => format!("participant {index} disconnected: {err}"),
                    None => format!("participant {index} closed the connection"),
                };
                Err(MixError::connection("receive", details))
            }
        }
    }

    fn on_admit(&mut self, writer: FrameWriter<BoxedWrite>, events: mpsc::Sender<Event>, reply: oneshot::Sender<Result<usize>>) {
        match self.state.admit() {
            Ok(index) => {
                let (outbound, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
                self.outbound.push(outbound);
                self.writers.push(tokio::spawn(write_loop(index, writer, outbound_rx, events)));
                if index == 0 {
                    self.input_deadline = self.settings.input_timeout.map(|limit| Instant::now() + limit);
                }
                self.observer.on_admitted(&self.session_id, index);
                let _ = reply.send(Ok(index));
            }
            Err(err) => {
                info!("connection rejected session_id={} error={}", self.session_id.short(), err);
                let _ = reply.send(Err(err));
            }
        }
    }

    fn on_message(&mut self, index: usize, message: MixMessage) -> Result<Option<FinalTransaction>> {
        match message {
            MixMessage::Input(input) => {
                let constructed = self.state.receive_input(index, input)?;
                self.observer.on_input_accepted(&self.session_id, index);
                if let Some(unsigned_tx) = constructed {
                    self.broadcast_partials(unsigned_tx)?;
                }
                Ok(None)
            }
            MixMessage::Signature { signature } => {
                let finalized = self.state.receive_signature(index, signature)?;
                self.observer.on_signature_accepted(&self.session_id, index);
                match finalized {
                    Some(finalized) => {
                        self.broadcast(|_| Ok(MixMessage::Transaction { final_tx: finalized.final_tx.clone() }))?;
                        Ok(Some(finalized))
                    }
                    None => Ok(None),
                }
            }
            other => Err(MixError::protocol(Some(index), format!("participant sent a {} message", other.kind()))),
        }
    }

    fn broadcast_partials(&mut self, unsigned_tx: TxBytes) -> Result<()> {
        self.broadcast(|index| Ok(MixMessage::PartialTransaction { unsigned_tx: unsigned_tx.clone(), signing_index: usize_to_u32(index)? }))?;
        self.state.mark_partials_sent()?;
        self.input_deadline = None;
        self.signature_deadline = self.settings.signature_timeout.map(|limit| Instant::now() + limit);
        self.observer.on_constructed(&self.session_id, self.state.admitted());
        Ok(())
    }

    /// Queues one message per participant, or none at all.
    fn broadcast(&self, build: impl Fn(usize) -> Result<MixMessage>) -> Result<()> {
        if self.outbound.len() != self.settings.params.player_count {
            return Err(MixError::InvariantViolation(format!(
                "broadcast to {} of {} participants",
                self.outbound.len(),
                self.settings.params.player_count
            )));
        }
        let messages = (0..self.outbound.len()).map(&build).collect::<Result<Vec<_>>>()?;
        if let Some(index) = self.outbound.iter().position(|sender| sender.is_closed() || sender.capacity() == 0) {
            return Err(MixError::connection("broadcast", format!("participant {index} cannot receive")));
        }
        for (index, (sender, message)) in self.outbound.iter().zip(messages).enumerate() {
            sender
                .try_send(message)
                .map_err(|err| MixError::InvariantViolation(format!("queue for participant {index} refused a checked send: {err}")))?;
        }
        Ok(())
    }

    async fn finish(mut self, finalized: FinalTransaction) -> Result<SessionOutcome> {
        // Writers drain their queues and close once the senders are gone.
        self.outbound.clear();
        if let Err(err) = self.flush_writers().await {
            warn!("final transaction not delivered session_id={} tx_id={} error={}", self.session_id.short(), finalized.tx_id, err);
            return Err(self.fail(err));
        }
        self.observer.on_finalized(&self.session_id, &finalized.tx_id);
        self.shutdown.trigger("round finalized");
        Ok(SessionOutcome { session_id: self.session_id, tx_id: finalized.tx_id, final_tx: finalized.final_tx, participants: self.state.admitted() })
    }

    /// Waits until every writer has sent its queued frames and closed its stream.
    async fn flush_writers(&mut self) -> Result<()> {
        let writers = std::mem::take(&mut self.writers);
        let flush = async move {
            for (index, writer) in writers.into_iter().enumerate() {
                writer
                    .await
                    .map_err(|err| MixError::connection("final_fanout", format!("writer for participant {index} failed: {err}")))?
                    .map_err(|err| MixError::connection("final_fanout", format!("participant {index}: {err}")))?;
            }
            Ok::<(), MixError>(())
        };
        tokio::time::timeout(Duration::from_secs(FINAL_FLUSH_TIMEOUT_SECS), flush)
            .await
            .map_err(|_| MixError::Timeout { phase: "final_fanout".to_string(), timeout_secs: FINAL_FLUSH_TIMEOUT_SECS })?
    }

    fn fail(mut self, err: MixError) -> MixError {
        let reason = err.to_string();
        if self.state.abort() {
            warn!("coordinator round aborted session_id={} code={} reason={}", self.session_id.short(), err.code(), reason);
        }
        self.outbound.clear();
        self.observer.on_aborted(&self.session_id, &reason);
        self.shutdown.trigger(reason);
        err
    }
}
