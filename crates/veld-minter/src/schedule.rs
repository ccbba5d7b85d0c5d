//! The emission schedule state machine.

use serde::{Deserialize, Serialize};
use veld_math::mul_div;
use veld_types::config::ProtocolConfig;
use veld_types::events::{Event, EventJournal};
use veld_types::roles::KeeperRole;
use veld_types::AccountId;

use crate::Result;

/// The governance-token emission schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Minter {
    role: KeeperRole,
    epoch_length: u64,
    decay_num: u64,
    decay_den: u64,
    weekly_emission: u64,
    last_epoch_start: u64,
    journal: EventJournal,
}

impl Minter {
    /// Create the schedule anchored at the epoch containing `now`.
    pub fn new(config: &ProtocolConfig, admin: AccountId, now: u64) -> Self {
        Self {
            role: KeeperRole::new(admin),
            epoch_length: config.epoch_length,
            decay_num: config.emission_decay_num,
            decay_den: config.emission_decay_den,
            weekly_emission: config.initial_weekly_emission,
            last_epoch_start: config.epoch_start(now),
            journal: EventJournal::new(),
        }
    }

    /// The emission the next rollover will pay.
    pub fn weekly_emission(&self) -> u64 {
        self.weekly_emission
    }

    /// Start timestamp of the last processed epoch.
    pub fn last_epoch_start(&self) -> u64 {
        self.last_epoch_start
    }

    pub fn keeper(&self) -> AccountId {
        self.role.keeper()
    }

    /// Reassign the keeper. Admin-gated.
    pub fn set_keeper(&mut self, caller: &AccountId, new: AccountId) -> Result<()> {
        self.role.set_keeper(caller, new)?;
        self.journal.record(Event::KeeperChanged { keeper: new });
        Ok(())
    }

    /// Events recorded by the minter, oldest first.
    pub fn events(&self) -> &[Event] {
        self.journal.entries()
    }

    /// Drain the minter's event journal.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.journal.drain()
    }

    /// Advance the schedule by one epoch if one has elapsed.
    ///
    /// Returns `None` without any state change while the current epoch is
    /// already processed; otherwise advances `last_epoch_start` by exactly
    /// one epoch length, returns the emission for the newly processed
    /// epoch, and decays the stored weekly emission for the next one.
    ///
    /// Keeper-gated.
    pub fn update_period(&mut self, caller: &AccountId, now: u64) -> Result<Option<u64>> {
        self.role.require_keeper(caller)?;
        if now < self.last_epoch_start + self.epoch_length {
            return Ok(None);
        }
        self.last_epoch_start += self.epoch_length;
        let emitted = self.weekly_emission;
        self.weekly_emission = mul_div(self.weekly_emission, self.decay_num, self.decay_den)?;
        self.journal.record(Event::EmissionAdvanced {
            epoch_start: self.last_epoch_start,
            emitted,
            next_weekly: self.weekly_emission,
        });
        tracing::info!(
            epoch_start = self.last_epoch_start,
            emitted,
            next_weekly = self.weekly_emission,
            "emission period advanced"
        );
        Ok(Some(emitted))
    }
}
