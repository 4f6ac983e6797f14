use crate::core::Result;
use async_trait::async_trait;

/// Source of the shared handle a session lends to its commands
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    type Handle: Send;

    /// Obtain a handle; failure here prevents the session from starting
    async fn acquire(&self) -> Result<Self::Handle>;

    /// Give a handle back once the session is over
    async fn release(&self, handle: Self::Handle);
}
