//! Cooldown system for rate limiting command usage.
//!
//! Each entry maps `(command, caller)` to the instant the cooldown lapses.
//! Presence of a live entry means the caller is throttled for that command.
//! Entries whose expiry has passed are treated as absent on the next check
//! and are pruned by a periodic sweep (see [`CooldownRegistry::spawn_sweeper`]),
//! so memory stays bounded by the pairs cooled down within one sweep period.

use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use ticketbot_common::UserId;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::debug;

/// Result of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownOutcome {
    /// The caller may proceed; a new cooldown has been recorded.
    Allowed,
    /// The caller is still cooling down. Nothing was recorded.
    Throttled {
        /// Time until the cooldown lapses.
        remaining: Duration,
    },
}

impl CooldownOutcome {
    /// Whether the invocation may proceed.
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Per-command, per-caller cooldown state.
#[derive(Debug, Default)]
pub struct CooldownRegistry {
    /// command name -> caller -> expiry; `None` when the expiry is past the clock's range
    cooldowns: DashMap<String, HashMap<UserId, Option<Instant>>>,
}

impl CooldownRegistry {
    /// Create a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks whether `caller` may run `command` at `now`, recording a new
    /// cooldown if so.
    ///
    /// The check and the record happen under the same shard lock, so two
    /// concurrent invocations by one caller cannot both be allowed.
    pub fn check_and_record(
        &self,
        command: &str,
        caller: UserId,
        cooldown: Duration,
        now: Instant,
    ) -> CooldownOutcome {
        let mut callers = self.cooldowns.entry(command.to_string()).or_default();

        match callers.get(&caller) {
            Some(Some(expiry)) if *expiry > now => {
                return CooldownOutcome::Throttled {
                    remaining: *expiry - now,
                };
            }
            Some(None) => return CooldownOutcome::Throttled { remaining: cooldown },
            _ => {}
        }

        callers.insert(caller, now.checked_add(cooldown));
        CooldownOutcome::Allowed
    }

    /// Get the number of live and not-yet-swept cooldown entries.
    pub fn active_cooldowns(&self) -> usize {
        self.cooldowns.iter().map(|entry| entry.value().len()).sum()
    }

    /// Removes every entry that expired at or before `now`. Returns how many were removed.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let mut removed = 0;
        self.cooldowns.retain(|_, callers| {
            let before = callers.len();
            callers.retain(|_, expiry| expiry.map_or(true, |expiry| expiry > now));
            removed += before - callers.len();
            !callers.is_empty()
        });

        if removed > 0 {
            debug!("Swept {} expired cooldown entries", removed);
        }
        removed
    }

    /// Start a background task that sweeps expired entries every `period`.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.sweep_expired(Instant::now());
            }
        })
    }
}
