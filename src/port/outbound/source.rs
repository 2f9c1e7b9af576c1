//! Venue snapshot port.
//!
//! A snapshot source hands the core every event it currently quotes for a
//! category. How the data is obtained (REST, files, a message bus) is the
//! adapter's concern.

use async_trait::async_trait;

use crate::domain::{Category, Event};
use crate::error::Error;

/// Capability interface implemented once per venue or feed.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Source name. Also the key its quota is tracked under.
    fn name(&self) -> &str;

    /// Quota units one fetch of `category` consumes.
    fn request_cost(&self, _category: &Category) -> u32 {
        1
    }

    /// Fetch the current events for `category`.
    async fn fetch(&self, category: &Category) -> Result<Vec<Event>, Error>;

    /// Remaining budget as last reported by the provider, if it reports one.
    fn reported_remaining(&self) -> Option<u32> {
        None
    }
}
