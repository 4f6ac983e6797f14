//! Interactive session runtime
//!
//! [`run_session`] owns the handle lifecycle: it acquires one handle from
//! the provider, lends it to a [`Session`] for the whole loop and releases
//! it afterwards, whatever the session's outcome.

pub mod provider;
pub mod repl;


pub use provider::ResourceProvider;
pub use repl::{Dispatch, ReplOptions, Session, SessionStats, EXIT_DIRECTIVE, HELP_ALIASES};

use crate::core::{CommandCatalog, Result, WorldError};
use std::io::Write;
use tokio::io::AsyncBufRead;
use tracing::error;

/// Acquire a handle, run an interactive session on it, release it.
///
/// Returns [`WorldError::ResourceAcquisition`] without reading any input
/// when the provider cannot supply a handle.
pub async fn run_session<P, R, W>(
    provider: &P,
    catalog: &CommandCatalog<P::Handle>,
    options: ReplOptions,
    input: R,
    out: &mut W,
) -> Result<SessionStats>
where
    P: ResourceProvider,
    P::Handle: 'static,
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut handle = provider.acquire().await.map_err(|e| {
        error!("Failed to acquire session handle: {}", e);
        match e {
            WorldError::ResourceAcquisition(_) => e,
            other => WorldError::resource_acquisition(other.to_string()),
        }
    })?;

    let outcome = Session::new(catalog, &mut handle)
        .with_options(options)
        .run(input, out)
        .await;

    provider.release(handle).await;
    outcome
}
