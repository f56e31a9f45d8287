//! Queue construction, lookahead, the audio bar's queue model and the
//! per-button state machine

mod builder;
mod button;
mod host;
mod prefetch;

pub use builder::QueueBuilder;
pub use button::{ButtonState, ClickAction, Intent, PlayButton};
pub use host::QueueHost;
pub use prefetch::{LookaheadPrefetcher, DEFAULT_LOOKAHEAD};
