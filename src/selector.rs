//! Picks the next avatar id from the configured list
//!
//! Sequential mode advances past the last applied id and wraps at the end of
//! the list. Random mode picks uniformly. An id that is no longer configured
//! restarts the cycle from the first entry.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::config::{AvatarId, UsageOrder};
use crate::error::{Result, RotateError};
use crate::state::StateStore;

/// Fail fast on a list nothing can be selected from
pub fn ensure_selectable(ids: &[AvatarId]) -> Result<()> {
    if ids.is_empty() {
        return Err(RotateError::Configuration("avatar_ids must not be empty".to_string()));
    }
    Ok(())
}

/// Read the last applied id, materializing an empty record on first run
pub fn load_prior(store: &dyn StateStore) -> Result<Option<AvatarId>> {
    let prior = store.read()?;
    if prior.is_none() {
        store.initialize()?;
    }
    Ok(prior)
}

pub fn select_next(ids: &[AvatarId], order: UsageOrder, prior: Option<AvatarId>) -> Result<AvatarId> {
    select_with_rng(ids, order, prior, &mut rand::rng())
}

pub fn select_with_rng<R: Rng + ?Sized>(
    ids: &[AvatarId],
    order: UsageOrder,
    prior: Option<AvatarId>,
    rng: &mut R,
) -> Result<AvatarId> {
    ensure_selectable(ids)?;

    let id = match order {
        UsageOrder::Sequential => next_in_sequence(ids, prior),
        UsageOrder::Random => *ids
            .choose(rng)
            .ok_or_else(|| RotateError::Configuration("avatar_ids must not be empty".to_string()))?,
    };

    log::debug!("Selected avatar {} ({} mode, prior {:?})", id, order, prior);
    Ok(id)
}

/// Id following `prior`, wrapping; the first id when `prior` is absent or unknown
fn next_in_sequence(ids: &[AvatarId], prior: Option<AvatarId>) -> AvatarId {
    let Some(prior) = prior else {
        return ids[0];
    };

    match ids.iter().position(|&id| id == prior) {
        Some(index) => ids[(index + 1) % ids.len()],
        None => {
            log::warn!("Last applied avatar {} is no longer configured, restarting cycle", prior);
            ids[0]
        }
    }
}
