//! Queue Host
//!
//! The audio bar's side of the queue bus. Owns the ephemeral queue, applies
//! `audio:*` commands and answers every transition with an `audio:state`
//! broadcast. Items without a URL are kept in the list but never selected.

use chrono::Utc;
use ddx_common::events::{QueueBus, QueueEvent, QueueStateSnapshot};
use ddx_common::models::{PlaylistItem, SourceKey};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct QueueHost {
    list: Vec<PlaylistItem>,
    index: Option<usize>,
    source_key: Option<SourceKey>,
    playing: bool,
}

impl QueueHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current(&self) -> Option<&PlaylistItem> {
        self.index.and_then(|i| self.list.get(i))
    }

    pub fn list(&self) -> &[PlaylistItem] {
        &self.list
    }

    pub fn source_key(&self) -> Option<&SourceKey> {
        self.source_key.as_ref()
    }

    /// Current state as broadcast on `audio:state`
    pub fn snapshot(&self) -> QueueStateSnapshot {
        QueueStateSnapshot {
            playing: self.playing,
            source_key: self.source_key.clone(),
            track_id: self.current().map(|item| item.id.clone()),
            list: Some(self.list.clone()),
            index: self.index,
            timestamp: Utc::now(),
        }
    }

    /// Apply one bus event
    ///
    /// Returns the snapshot to broadcast, or `None` for events the host does
    /// not answer (its own `audio:state`).
    pub fn apply(&mut self, event: &QueueEvent) -> Option<QueueStateSnapshot> {
        match event {
            QueueEvent::PlayList {
                list,
                index,
                source_key,
            } => {
                self.load(list.clone(), *index, Some(source_key.clone()));
            }
            QueueEvent::QueueAppend { items, source_key } => {
                if self.list.is_empty() {
                    self.load(items.clone(), 0, source_key.clone());
                } else {
                    self.list.extend(items.iter().cloned());
                    if self.index.is_none() {
                        let start = self.list.len() - items.len();
                        self.index = self.first_playable_from(start);
                        self.playing = self.index.is_some();
                    }
                }
            }
            QueueEvent::Pause => {
                self.playing = false;
            }
            QueueEvent::Resume => {
                if self.current().is_some() {
                    self.playing = true;
                } else {
                    debug!("Resume ignored, nothing queued");
                }
            }
            QueueEvent::GetState => {}
            QueueEvent::State(_) => return None,
        }

        Some(self.snapshot())
    }

    /// Skip to the next playable item; stays put at the end of the queue
    pub fn next(&mut self) -> QueueStateSnapshot {
        if let Some(next) = self.index.and_then(|i| self.first_playable_from(i + 1)) {
            self.index = Some(next);
        }
        self.snapshot()
    }

    /// Go back to the previous playable item
    pub fn previous(&mut self) -> QueueStateSnapshot {
        if let Some(current) = self.index {
            if let Some(prev) = (0..current).rev().find(|&i| self.list[i].is_playable()) {
                self.index = Some(prev);
            }
        }
        self.snapshot()
    }

    /// Current track finished: advance, or clear the queue after the last one
    pub fn track_ended(&mut self) -> QueueStateSnapshot {
        match self.index.and_then(|i| self.first_playable_from(i + 1)) {
            Some(next) => {
                self.index = Some(next);
                self.snapshot()
            }
            None => {
                debug!("Reached end of queue");
                self.clear()
            }
        }
    }

    /// Drop the queue but remember which source owned it
    pub fn clear(&mut self) -> QueueStateSnapshot {
        self.list.clear();
        self.index = None;
        self.playing = false;
        self.snapshot()
    }

    /// Run on the bus until the task is aborted
    pub fn spawn(self, bus: QueueBus) -> JoinHandle<()> {
        // Subscribe before spawning so commands emitted right after spawn()
        // are not missed
        let rx = bus.subscribe();
        tokio::spawn(self.run(bus, rx))
    }

    async fn run(mut self, bus: QueueBus, mut rx: broadcast::Receiver<QueueEvent>) {
        info!("Queue host listening");
        loop {
            match rx.recv().await {
                // Our own audio:state broadcasts
                Ok(event) if !event.is_command() => {}
                Ok(event) => {
                    if let Some(snapshot) = self.apply(&event) {
                        debug!(
                            event = event.event_type(),
                            playing = snapshot.playing,
                            track_id = ?snapshot.track_id,
                            "Queue host transition"
                        );
                        bus.emit_lossy(QueueEvent::State(snapshot));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Queue host lagged behind the bus");
                    bus.emit_lossy(QueueEvent::State(self.snapshot()));
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    fn load(&mut self, list: Vec<PlaylistItem>, index: usize, source_key: Option<SourceKey>) {
        self.list = list;
        self.source_key = source_key;

        // Forward from the requested index, else the first playable overall
        let start = index.min(self.list.len().saturating_sub(1));
        self.index = self
            .first_playable_from(start)
            .or_else(|| self.first_playable_from(0));
        self.playing = self.index.is_some();

        if self.index.is_none() && !self.list.is_empty() {
            warn!(items = self.list.len(), "Queue loaded without any playable item");
        }
    }

    fn first_playable_from(&self, start: usize) -> Option<usize> {
        (start..self.list.len()).find(|&i| self.list[i].is_playable())
    }
}
