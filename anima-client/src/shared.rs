//! Process-wide client handle built lazily from the environment.
//!
//! Prefer constructing an [`AnimaClient`] explicitly and passing it around;
//! this exists for scripts and integrations that have nowhere to keep one.

use anima_core::Result;
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::client::AnimaClient;

static SHARED: OnceCell<AnimaClient> = OnceCell::new();

/// The shared client, created from `ANIMA_*` environment variables on first use.
///
/// Concurrent first calls block on a single initialisation. A failed
/// initialisation is returned to the caller and attempted again next time.
///
/// # Errors
/// Whatever [`AnimaClient::from_env`] returns.
pub fn client() -> Result<&'static AnimaClient> {
    init_in(&SHARED, AnimaClient::from_env)
}

/// The shared client if it has already been initialised.
#[must_use]
pub fn get() -> Option<&'static AnimaClient> {
    SHARED.get()
}

/// Fill `cell` with `init` unless it already holds a client. An error leaves
/// the cell empty.
fn init_in<F>(cell: &OnceCell<AnimaClient>, init: F) -> Result<&AnimaClient>
where
    F: FnOnce() -> Result<AnimaClient>,
{
    cell.get_or_try_init(|| {
        let client = init()?;
        debug!(base_url = client.config().base_url(), "Initialised shared Anima client");
        Ok(client)
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    use anima_core::AnimaError;

    use super::*;

    fn build(api_key: Option<&str>) -> Result<AnimaClient> {
        let builder = AnimaClient::builder();
        let builder = match api_key {
            Some(key) => builder.api_key(key),
            None => builder,
        };
        builder.build_with_env(|_| None)
    }

    #[test]
    fn failed_init_leaves_the_cell_empty_and_is_retried() {
        let cell = OnceCell::new();

        let err = init_in(&cell, || build(None)).unwrap_err();
        assert!(matches!(err, AnimaError::Authentication { .. }));
        assert!(cell.get().is_none());

        let first = init_in(&cell, || build(Some("k"))).unwrap();
        assert_eq!(first.config().api_key(), "k");

        // Once filled, later initialisers are never run.
        let again = init_in(&cell, || panic!("initialiser ran twice")).unwrap();
        assert!(std::ptr::eq(first, again));
    }

    #[test]
    fn concurrent_first_use_runs_one_initialiser() {
        let cell = OnceCell::new();
        let runs = AtomicUsize::new(0);

        let addrs: Vec<usize> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let client = init_in(&cell, || {
                            runs.fetch_add(1, Ordering::SeqCst);
                            build(Some("k"))
                        })
                        .unwrap();
                        std::ptr::from_ref(client) as usize
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("thread panicked"))
                .collect()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(addrs.iter().all(|a| *a == addrs[0]));
    }

    #[test]
    fn get_reflects_the_process_handle() {
        // Whatever the environment holds, `get` agrees with a prior `client`.
        match client() {
            Ok(c) => assert!(get().is_some_and(|g| std::ptr::eq(c, g))),
            Err(_) => assert!(get().is_none()),
        }
    }
}
