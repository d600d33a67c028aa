//! Concurrent lookups.
//!
//! [`lookup_all`] spawns one task per name. Each task sends exactly one
//! reply on a shared channel and the collector waits for all of them, so no
//! lookup is still running once the call returns.

use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::CoreError;

/// The answer of one lookup.
#[derive(Debug)]
pub struct LookupReply<T, E> {
    /// Position of the name in the request.
    pub index: usize,
    /// The name looked up.
    pub name: String,
    /// What the lookup returned.
    pub result: Result<T, E>,
}

/// Receive up to `expected` replies, in arrival order.
///
/// Returns early only if every sender is gone, which happens when a lookup
/// task died before replying.
pub async fn collect_all<T, E>(
    rx: &mut mpsc::Receiver<LookupReply<T, E>>,
    expected: usize,
) -> Vec<LookupReply<T, E>> {
    let mut replies = Vec::with_capacity(expected);
    while replies.len() < expected {
        let Some(reply) = rx.recv().await else {
            break;
        };
        trace!(name = %reply.name, ok = reply.result.is_ok(), "Lookup replied");
        replies.push(reply);
    }
    replies
}

/// Run `lookup` for every name concurrently.
///
/// Successes come back in the order of `names`.
///
/// # Errors
///
/// The first error to arrive, after every lookup has replied.
/// [`CoreError::LookupAborted`] if a lookup task ended without replying.
pub async fn lookup_all<T, E, F, Fut>(names: Vec<String>, lookup: F) -> Result<Vec<T>, E>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: From<CoreError> + Send + 'static,
{
    let expected = names.len();
    let (tx, mut rx) = mpsc::channel(expected.max(1));

    for (index, name) in names.into_iter().enumerate() {
        let tx = tx.clone();
        let pending = lookup(name.clone());
        tokio::spawn(async move {
            let result = pending.await;
            // The collector outlives every task unless the caller was dropped.
            let _ = tx.send(LookupReply { index, name, result }).await;
        });
    }
    drop(tx);

    let replies = collect_all(&mut rx, expected).await;
    debug!(expected, received = replies.len(), "Lookups collected");
    if replies.len() < expected {
        return Err(CoreError::LookupAborted {
            expected,
            received: replies.len(),
        }
        .into());
    }

    let mut found: Vec<(usize, T)> = Vec::with_capacity(expected);
    for reply in replies {
        found.push((reply.index, reply.result?));
    }
    found.sort_by_key(|(index, _)| *index);
    Ok(found.into_iter().map(|(_, value)| value).collect())
}
