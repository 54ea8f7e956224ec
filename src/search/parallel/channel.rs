//! Task queue carrying candidate chunks and stop sentinels to workers.

use crate::error::{PipelineError, Result};
use crate::search::CandidateChunk;
use crossbeam_channel::{Receiver, Sender, TryRecvError, bounded, unbounded};

/// Item travelling through the task queue.
///
/// `Stop` is the poison pill: a worker that receives it exits its loop.
/// An empty `Chunk` is ordinary (if useless) work, never a stop signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelItem {
    Chunk(CandidateChunk),
    Stop,
}

/// FIFO queue shared between the orchestrator (producer) and the workers.
///
/// The queue owns the only sender. Dropping it disconnects the channel;
/// consumers then drain what is left and observe `Stop`.
#[derive(Debug)]
pub struct TaskQueue {
    tx: Sender<ChannelItem>,
    rx: Receiver<ChannelItem>,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    /// Unbounded queue; `put` never blocks.
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Queue holding at most `capacity` items; `put` blocks while full.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    pub fn put(&self, chunk: CandidateChunk) -> Result<()> {
        self.send(ChannelItem::Chunk(chunk))
    }

    /// Enqueue `n` stop sentinels. Call only after the last `put`.
    pub fn send_poison_pills(&self, n: usize) -> Result<()> {
        for _ in 0..n {
            self.send(ChannelItem::Stop)?;
        }
        Ok(())
    }

    /// Block until an item is available.
    pub fn get(&self) -> ChannelItem {
        self.rx.recv().unwrap_or(ChannelItem::Stop)
    }

    /// Consumer endpoint for a worker.
    pub fn receiver(&self) -> TaskReceiver {
        TaskReceiver {
            rx: self.rx.clone(),
        }
    }

    /// Discard everything still queued, returning how many items were dropped.
    pub fn drain(&self) -> usize {
        let mut discarded = 0;
        loop {
            match self.rx.try_recv() {
                Ok(_) => discarded += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        discarded
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    fn send(&self, item: ChannelItem) -> Result<()> {
        self.tx
            .send(item)
            .map_err(|_| PipelineError::Pipeline("task queue disconnected".to_string()))
    }
}

/// Worker-side endpoint of a [`TaskQueue`]
#[derive(Debug, Clone)]
pub struct TaskReceiver {
    rx: Receiver<ChannelItem>,
}

impl TaskReceiver {
    /// Block until an item is available. A disconnected, empty queue reads as `Stop`.
    pub fn get(&self) -> ChannelItem {
        self.rx.recv().unwrap_or(ChannelItem::Stop)
    }
}
