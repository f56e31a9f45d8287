//! Play Button state machine
//!
//! Each card that can start playback (a beat row, a pack, a kit) owns one
//! `PlayButton` keyed by its `SourceKey`. Clicks update the button
//! optimistically (`Pending`) and `audio:state` broadcasts confirm them.
//!
//! ```text
//!   Idle ──click──▶ Pending(Play) ──state(own key, playing)──▶ Active
//!   Active ──click──▶ Pending(Pause|Resume) ──matching state──▶ Active
//!   Active ──state(other key)──▶ Idle
//! ```
//!
//! A snapshot for the button's own key that carries a list but no track means
//! nothing in the queue was playable; it ends any pending intent and shows
//! the button as idle.
//!
//! Transient empty snapshots (no list, no track) are ambiguous: the audio bar
//! emits them both when a queue ends and while it re-initializes. They never
//! change what the button shows, but they do count for the live-queue check,
//! so the next click rebuilds the queue instead of resuming a queue that may
//! no longer exist.

use ddx_common::events::QueueStateSnapshot;
use ddx_common::models::SourceKey;
use tracing::debug;

/// Optimistic target of a click awaiting confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Play,
    Pause,
    Resume,
}

impl Intent {
    fn confirmed_by(self, playing: bool) -> bool {
        match self {
            Intent::Play | Intent::Resume => playing,
            Intent::Pause => !playing,
        }
    }

    fn expects_playing(self) -> bool {
        !matches!(self, Intent::Pause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Idle,
    Pending(Intent),
    Active { playing: bool },
}

/// What the caller must do after a click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// Build the queue and dispatch `audio:play-list`
    StartQueue,
    /// Dispatch `audio:pause`
    Pause,
    /// Dispatch `audio:resume`
    Resume,
}

#[derive(Debug, Clone)]
pub struct PlayButton {
    source_key: SourceKey,
    state: ButtonState,
    latest: Option<QueueStateSnapshot>,
    last_confident: Option<QueueStateSnapshot>,
}

impl PlayButton {
    pub fn new(source_key: SourceKey) -> Self {
        Self {
            source_key,
            state: ButtonState::Idle,
            latest: None,
            last_confident: None,
        }
    }

    pub fn source_key(&self) -> &SourceKey {
        &self.source_key
    }

    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Whether the queue for this button's source can be paused/resumed
    /// in place
    pub fn has_live_queue(&self) -> bool {
        self.latest
            .as_ref()
            .map_or(false, |snapshot| snapshot.is_live_for(&self.source_key))
    }

    /// Icon state: pending intents are shown as if already confirmed
    pub fn shows_playing(&self) -> bool {
        match self.state {
            ButtonState::Idle => false,
            ButtonState::Pending(intent) => intent.expects_playing(),
            ButtonState::Active { playing } => playing,
        }
    }

    /// Whether this card should be highlighted as "now playing"
    pub fn is_current(&self) -> bool {
        !matches!(self.state, ButtonState::Idle)
    }

    /// Last snapshot that was not a transient empty one
    pub fn last_confident_snapshot(&self) -> Option<&QueueStateSnapshot> {
        self.last_confident.as_ref()
    }

    /// Decide what a click does and enter the matching pending state
    pub fn click(&mut self) -> ClickAction {
        let action = if self.has_live_queue() {
            if self.shows_playing() {
                ClickAction::Pause
            } else {
                ClickAction::Resume
            }
        } else {
            ClickAction::StartQueue
        };

        self.state = ButtonState::Pending(match action {
            ClickAction::StartQueue => Intent::Play,
            ClickAction::Pause => Intent::Pause,
            ClickAction::Resume => Intent::Resume,
        });

        debug!(source_key = %self.source_key, ?action, "Play button clicked");
        action
    }

    /// Reconcile with an `audio:state` broadcast
    pub fn on_state(&mut self, snapshot: &QueueStateSnapshot) {
        self.latest = Some(snapshot.clone());

        if snapshot.is_transient_empty() {
            debug!(source_key = %self.source_key, "Ignoring transient empty state for display");
            return;
        }
        self.last_confident = Some(snapshot.clone());

        let own = snapshot.source_key.as_ref() == Some(&self.source_key);

        // Own queue loaded but nothing in it could be played
        if own && snapshot.track_id.is_none() {
            debug!(source_key = %self.source_key, "Own queue has no playable track");
            self.state = ButtonState::Idle;
            return;
        }

        self.state = match self.state {
            ButtonState::Pending(intent) if own && intent.confirmed_by(snapshot.playing) => {
                ButtonState::Active {
                    playing: snapshot.playing,
                }
            }
            // Another source took over while a pause/resume was in flight
            ButtonState::Pending(Intent::Pause | Intent::Resume) if !own => ButtonState::Idle,
            // Older broadcasts may still arrive before ours lands
            ButtonState::Pending(intent) => ButtonState::Pending(intent),
            _ if own => ButtonState::Active {
                playing: snapshot.playing,
            },
            _ => ButtonState::Idle,
        };
    }

    /// Abandon a pending start (e.g. nothing playable was found)
    pub fn reset(&mut self) {
        self.state = ButtonState::Idle;
    }
}
