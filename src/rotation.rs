//! One rotation run: select, submit, persist
//!
//! Idle -> Selecting -> Submitting -> Persisted | Failed. State only advances
//! after the service confirms the update, so a failed run leaves the record
//! untouched and sequential mode retries the same id next time.

use std::fmt;

use crate::config::{AvatarId, Config};
use crate::error::Result;
use crate::jira::AvatarService;
use crate::selector;
use crate::state::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Selecting,
    Submitting,
    Persisted,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Selecting => "selecting",
            Phase::Submitting => "submitting",
            Phase::Persisted => "persisted",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Applied remotely and recorded
    Applied(AvatarId),
    /// Selected only, nothing sent or recorded
    Planned(AvatarId),
}

impl Outcome {
    pub fn id(&self) -> AvatarId {
        match self {
            Outcome::Applied(id) | Outcome::Planned(id) => *id,
        }
    }
}

pub struct Rotation<'a> {
    config: &'a Config,
    store: &'a dyn StateStore,
    service: &'a dyn AvatarService,
    phase: Phase,
}

impl<'a> Rotation<'a> {
    pub fn new(config: &'a Config, store: &'a dyn StateStore, service: &'a dyn AvatarService) -> Self {
        Self {
            config,
            store,
            service,
            phase: Phase::Idle,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("Rotation {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Drive the run to a terminal phase
    pub fn run(&mut self, dry_run: bool) -> Result<Outcome> {
        let result = self.advance(dry_run);
        if let Err(e) = &result {
            log::error!("Rotation failed while {}: {}", self.phase, e);
            self.enter(Phase::Failed);
        }
        result
    }

    fn advance(&mut self, dry_run: bool) -> Result<Outcome> {
        self.enter(Phase::Selecting);
        selector::ensure_selectable(&self.config.avatar_ids)?;
        let prior = selector::load_prior(self.store)?;
        let id = selector::select_next(&self.config.avatar_ids, self.config.usage_order, prior)?;

        if dry_run {
            log::info!("Dry run, would apply avatar {}", id);
            return Ok(Outcome::Planned(id));
        }

        self.enter(Phase::Submitting);
        self.service.apply_avatar(id)?;

        // The avatar is live remotely from here on; a write failure must still surface
        self.store.write(id)?;
        self.enter(Phase::Persisted);
        Ok(Outcome::Applied(id))
    }
}
