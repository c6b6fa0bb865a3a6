//! OS deep-link event port

use async_trait::async_trait;

/// Port for OS-level deep-link delivery.
///
/// The returned future resolves with the first URL whose scheme matches;
/// it stays pending forever when no matching link arrives. Dropping the
/// future is the cancellation: implementations must release their listener
/// when that happens.
#[async_trait]
pub trait DeepLinkSource: Send + Sync {
    /// Waits for the next deep link with the given custom scheme.
    async fn wait_for_callback(&self, scheme: &str) -> String;
}
