//! Queue bus event types
//!
//! Provides the `audio:*` event contract shared by every page-level consumer
//! and the audio bar, plus the QueueBus that carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::{PlaylistItem, SourceKey};

/// Queue bus events
///
/// Serialized with a `type` tag carrying the topic name, so a JSON dump of an
/// event reads the same as the browser `CustomEvent` it replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// Replace whatever the audio bar is playing
    #[serde(rename = "audio:play-list")]
    PlayList {
        list: Vec<PlaylistItem>,
        index: usize,
        #[serde(rename = "sourceKey")]
        source_key: SourceKey,
    },

    /// Append to the tail of the current queue
    ///
    /// On an empty queue this starts playback at the first item, adopting
    /// `source_key` when given.
    #[serde(rename = "audio:queue-append")]
    QueueAppend {
        items: Vec<PlaylistItem>,
        #[serde(rename = "sourceKey", default, skip_serializing_if = "Option::is_none")]
        source_key: Option<SourceKey>,
    },

    #[serde(rename = "audio:pause")]
    Pause,

    #[serde(rename = "audio:resume")]
    Resume,

    /// Ask the audio bar to re-broadcast `audio:state` immediately
    #[serde(rename = "audio:get-state")]
    GetState,

    /// Audio bar state broadcast (on every transition and on demand)
    #[serde(rename = "audio:state")]
    State(QueueStateSnapshot),
}

impl QueueEvent {
    /// Topic name of this event
    pub fn event_type(&self) -> &'static str {
        match self {
            QueueEvent::PlayList { .. } => "audio:play-list",
            QueueEvent::QueueAppend { .. } => "audio:queue-append",
            QueueEvent::Pause => "audio:pause",
            QueueEvent::Resume => "audio:resume",
            QueueEvent::GetState => "audio:get-state",
            QueueEvent::State(_) => "audio:state",
        }
    }

    /// True for commands addressed to the audio bar (everything but `audio:state`)
    pub fn is_command(&self) -> bool {
        !matches!(self, QueueEvent::State(_))
    }
}

/// Snapshot of the audio bar's queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStateSnapshot {
    pub playing: bool,
    #[serde(default)]
    pub source_key: Option<SourceKey>,
    #[serde(default)]
    pub track_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<PlaylistItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl QueueStateSnapshot {
    /// Snapshot of a queue with nothing loaded
    pub fn empty(source_key: Option<SourceKey>) -> Self {
        Self {
            playing: false,
            source_key,
            track_id: None,
            list: Some(Vec::new()),
            index: None,
            timestamp: Utc::now(),
        }
    }

    /// Empty list and no track.
    ///
    /// Emitted both when a queue legitimately ends and while the audio bar
    /// re-initializes, so consumers treat it as low-confidence.
    pub fn is_transient_empty(&self) -> bool {
        self.track_id.is_none() && self.list.as_ref().map_or(true, Vec::is_empty)
    }

    /// Queue for `key` is loaded and resumable.
    ///
    /// An absent list counts as non-empty when a track id is present.
    pub fn is_live_for(&self, key: &SourceKey) -> bool {
        self.source_key.as_ref() == Some(key)
            && self.track_id.is_some()
            && self.list.as_ref().map_or(true, |list| !list.is_empty())
    }
}

/// Process-wide publish/subscribe channel for queue events
///
/// Backed by tokio::broadcast:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged subscribers lose the oldest events and should resync with
///   `audio:get-state`
///
/// # Examples
///
/// ```
/// use ddx_common::events::{QueueBus, QueueEvent};
///
/// let bus = QueueBus::new(100);
/// let mut rx = bus.subscribe();
///
/// bus.emit(QueueEvent::Pause).ok();
/// assert_eq!(rx.try_recv().unwrap(), QueueEvent::Pause);
/// ```
#[derive(Clone)]
pub struct QueueBus {
    tx: broadcast::Sender<QueueEvent>,
    capacity: usize,
}

impl QueueBus {
    /// Creates a new QueueBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: QueueEvent) -> Result<usize, broadcast::error::SendError<QueueEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: QueueEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str) -> PlaylistItem {
        PlaylistItem {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist_name: "Artist".to_string(),
            album_cover_url: String::new(),
            audio_url: format!("https://cdn/{}.mp3", id),
            duration_in_seconds: 60.0,
        }
    }

    #[test]
    fn test_play_list_wire_format() {
        let event = QueueEvent::PlayList {
            list: vec![item("a")],
            index: 0,
            source_key: SourceKey::beat("a"),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("audio:play-list"));
        assert_eq!(value["sourceKey"], json!("beat:a"));
        assert_eq!(value["index"], json!(0));
        assert_eq!(value["list"][0]["audioUrl"], json!("https://cdn/a.mp3"));
    }

    #[test]
    fn test_unit_events_wire_format() {
        assert_eq!(
            serde_json::to_value(QueueEvent::Pause).unwrap(),
            json!({ "type": "audio:pause" })
        );

        let parsed: QueueEvent = serde_json::from_value(json!({ "type": "audio:get-state" })).unwrap();
        assert_eq!(parsed, QueueEvent::GetState);
    }

    #[test]
    fn test_state_parses_without_optional_fields() {
        let parsed: QueueEvent = serde_json::from_value(json!({
            "type": "audio:state",
            "playing": true,
            "sourceKey": "kit:7",
            "trackId": "s1"
        }))
        .unwrap();

        match parsed {
            QueueEvent::State(snapshot) => {
                assert!(snapshot.playing);
                assert_eq!(snapshot.source_key, Some(SourceKey::kit("7")));
                assert!(snapshot.list.is_none());
                assert!(snapshot.is_live_for(&SourceKey::kit("7")));
            }
            other => panic!("Wrong event type deserialized: {:?}", other),
        }
    }

    #[test]
    fn test_event_type_names() {
        let events = vec![
            (QueueEvent::Pause, "audio:pause"),
            (QueueEvent::Resume, "audio:resume"),
            (QueueEvent::GetState, "audio:get-state"),
            (
                QueueEvent::QueueAppend { items: vec![], source_key: None },
                "audio:queue-append",
            ),
            (QueueEvent::State(QueueStateSnapshot::empty(None)), "audio:state"),
        ];

        for (event, expected) in events {
            assert_eq!(event.event_type(), expected);
        }
        assert!(!QueueEvent::State(QueueStateSnapshot::empty(None)).is_command());
    }

    #[test]
    fn test_transient_empty_and_live_checks() {
        let key = SourceKey::beat("a");
        let empty = QueueStateSnapshot::empty(Some(key.clone()));
        assert!(empty.is_transient_empty());
        assert!(!empty.is_live_for(&key));

        let live = QueueStateSnapshot {
            playing: false,
            source_key: Some(key.clone()),
            track_id: Some("a".to_string()),
            list: Some(vec![item("a")]),
            index: Some(0),
            timestamp: Utc::now(),
        };
        assert!(!live.is_transient_empty());
        assert!(live.is_live_for(&key));
        assert!(!live.is_live_for(&SourceKey::beat("b")));
    }

    #[test]
    fn test_bus_new_and_subscribe() {
        let bus = QueueBus::new(16);
        assert_eq!(bus.capacity(), 16);
        assert_eq!(bus.subscriber_count(), 0);

        let _rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);
    }

    #[test]
    fn test_bus_emit_without_subscribers_errors() {
        let bus = QueueBus::new(4);
        assert!(bus.emit(QueueEvent::Resume).is_err());
        bus.emit_lossy(QueueEvent::Resume);
    }

    #[test]
    fn test_bus_multiple_subscribers_receive_same_event() {
        let bus = QueueBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let delivered = bus.emit(QueueEvent::GetState).expect("emit should succeed");
        assert_eq!(delivered, 2);

        assert_eq!(rx1.try_recv().unwrap(), QueueEvent::GetState);
        assert_eq!(rx2.try_recv().unwrap(), QueueEvent::GetState);
    }
}
