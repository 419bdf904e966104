//! Bounded random selection of an enabled option.
//!
//! Given a resolved option set, pick one at random and accept it if it is
//! enabled, for at most [`MAX_TRIES`] attempts. Indices are sampled with
//! replacement, so a rejected option may be drawn again and an enabled one
//! may never be drawn. The search is bounded, not exhaustive.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use session_sync::select::select_random_enabled;
//! use session_sync::wait::wait_for_clickable_collection;
//! use session_sync::Locator;
//!
//! let options = wait_for_clickable_collection(&session, Locator::css("#size option"), Duration::from_secs(5))
//!     .await
//!     .into_result()?;
//! let picked = select_random_enabled(&session, &options).await?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::browser::TargetHandle;
use crate::error::{Error, Result};
use crate::session::Session;

// ============================================================================
// Constants
// ============================================================================

/// Sampling attempts before giving up.
pub const MAX_TRIES: usize = 5;

// ============================================================================
// Selection
// ============================================================================

/// Samples `options` up to [`MAX_TRIES`] times and returns the first sample
/// for which `is_enabled` answers `true`.
///
/// # Errors
///
/// - [`Error::NoEnabledOption`] if every attempt drew a disabled option, or
///   the set is empty (zero attempts)
/// - any error returned by `is_enabled`
pub async fn choose_enabled<'a, T, R, F, Fut>(
    options: &'a [T],
    rng: &mut R,
    mut is_enabled: F,
) -> Result<&'a T>
where
    R: Rng,
    F: FnMut(&'a T) -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    if options.is_empty() {
        warn!("No options to choose from");
        return Err(Error::no_enabled_option(0, 0));
    }

    for attempt in 1..=MAX_TRIES {
        let index = rng.gen_range(0..options.len());
        let option = &options[index];

        if is_enabled(option).await? {
            debug!(attempt, index, "Picked enabled option");
            return Ok(option);
        }

        warn!(attempt, index, max_tries = MAX_TRIES, "Option disabled, retrying");
    }

    Err(Error::no_enabled_option(MAX_TRIES, options.len()))
}

/// Clicks a randomly chosen enabled option and returns it.
///
/// # Errors
///
/// - [`Error::SessionTerminated`] if the session was released
/// - [`Error::NoEnabledOption`] if no enabled option was drawn
/// - any remote error while reading state or clicking
pub async fn select_random_enabled(session: &Session, options: &[TargetHandle]) -> Result<TargetHandle> {
    let mut rng = StdRng::from_entropy();
    select_random_enabled_with(session, options, &mut rng).await
}

/// [`select_random_enabled`] with a caller-supplied RNG.
///
/// # Errors
///
/// Same as [`select_random_enabled`].
pub async fn select_random_enabled_with<R>(
    session: &Session,
    options: &[TargetHandle],
    rng: &mut R,
) -> Result<TargetHandle>
where
    R: Rng,
{
    session.ensure_active()?;
    let remote = session.remote();

    let chosen = choose_enabled(options, rng, |handle| async move {
        remote.element_state(handle).await.map(|state| state.enabled)
    })
    .await?;

    remote.click(chosen).await?;
    info!(session_id = %session.id(), option = %chosen, "Selected random option");
    Ok(chosen.clone())
}

// ============================================================================
// Tests
// ============================================================================
