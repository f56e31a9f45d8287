//! Preview URL resolution and caching

mod cache;
mod clock;
mod url_repair;

pub use cache::{PreviewUrlCache, DEFAULT_PREVIEW_TTL};
pub use clock::{Clock, ManualClock, SystemClock};
pub use url_repair::repair_preview_url;
