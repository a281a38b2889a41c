//! # On-Kill Bonus Ledger
//!
//! Tracks which participants carry "currency on kill" gear and turns their
//! kills into currency grants.
//!
//! ```text
//! amount = uniform(range[currency][tier]) * magnitude * curve.multiplier(item level)
//! ```
//!
//! Gold and dust are tracked independently, each with the upgrade level of
//! the item granting it, so upgrading that item scales the bonus along the
//! same curve as its stats. Entries must be cleared when a participant
//! disconnects.

use std::collections::HashMap;

use rand::Rng;

use crate::config::{EconomyConfig, OnKillConfig};
use crate::curve::StatScalingCurve;
use crate::item::{CurrencyKind, ItemInstance};
use crate::loot::{KillEvent, Participant, ParticipantId, Position};

/// One currency's bonus for one participant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OnKillBonus {
    /// Multiplier on the rolled base amount. Zero disables the bonus.
    pub magnitude: f32,
    /// Upgrade level of the granting item.
    pub upgrade_level: u32,
}

/// Both currency bonuses of one participant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OnKillBonusEntry {
    /// Gold on kill.
    pub gold: OnKillBonus,
    /// Dust on kill.
    pub dust: OnKillBonus,
}

impl OnKillBonusEntry {
    /// Bonus for `currency`.
    #[inline]
    #[must_use]
    pub const fn get(&self, currency: CurrencyKind) -> OnKillBonus {
        match currency {
            CurrencyKind::Gold => self.gold,
            CurrencyKind::Dust => self.dust,
        }
    }

    /// Sums the bonuses of `items`, keeping the highest upgrade level among
    /// items that contribute to each currency.
    #[must_use]
    pub fn from_equipment<'a>(items: impl IntoIterator<Item = &'a ItemInstance>) -> Self {
        let mut entry = Self::default();
        for item in items {
            if item.is_consumable() {
                continue;
            }
            for (slot, currency) in [(&mut entry.gold, CurrencyKind::Gold), (&mut entry.dust, CurrencyKind::Dust)] {
                let magnitude = item.stats.on_kill_bonus(currency);
                if magnitude > 0.0 {
                    slot.magnitude += magnitude;
                    slot.upgrade_level = slot.upgrade_level.max(item.upgrade_level);
                }
            }
        }
        entry
    }

    /// Whether any currency bonus is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gold.magnitude > 0.0 || self.dust.magnitude > 0.0
    }
}

/// Request to credit currency, handed to the external currency subsystem.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurrencyGrant {
    /// Participant receiving the currency.
    pub recipient: ParticipantId,
    /// Currency granted.
    pub currency: CurrencyKind,
    /// Amount granted. Never zero.
    pub amount: u64,
    /// Where the kill happened.
    pub position: Position,
}

/// Per-participant on-kill bonuses.
#[derive(Clone, Debug)]
pub struct OnKillBonusLedger {
    entries: HashMap<ParticipantId, OnKillBonusEntry>,
    ranges: OnKillConfig,
    curve: StatScalingCurve,
}

impl OnKillBonusLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn from_config(config: &EconomyConfig) -> Self {
        Self {
            entries: HashMap::new(),
            ranges: config.on_kill.clone(),
            curve: StatScalingCurve::new(config.upgrades.scaling_per_level),
        }
    }

    /// Sets `participant`'s bonuses, replacing any previous entry.
    ///
    /// An entry with no active bonus clears the participant instead.
    pub fn register(&mut self, participant: ParticipantId, entry: OnKillBonusEntry) {
        if entry.is_active() {
            self.entries.insert(participant, entry);
        } else {
            self.entries.remove(&participant);
        }
    }

    /// Registers `participant` from the items they have equipped.
    pub fn register_from_equipment<'a>(
        &mut self,
        participant: ParticipantId,
        equipped: impl IntoIterator<Item = &'a ItemInstance>,
    ) {
        self.register(participant, OnKillBonusEntry::from_equipment(equipped));
    }

    /// Forgets `participant`. Returns whether an entry existed.
    pub fn clear(&mut self, participant: ParticipantId) -> bool {
        self.entries.remove(&participant).is_some()
    }

    /// Bonuses registered for `participant`.
    #[must_use]
    pub fn entry(&self, participant: ParticipantId) -> Option<&OnKillBonusEntry> {
        self.entries.get(&participant)
    }

    /// Number of participants with an active bonus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nobody has an active bonus.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Grants the killer's bonuses for `kill`.
    ///
    /// The killer is whichever participant controls the killing unit, hero
    /// or owned unit alike.
    pub fn on_kill<R: Rng + ?Sized>(
        &self,
        kill: &KillEvent,
        participants: &[Participant],
        rng: &mut R,
    ) -> Vec<CurrencyGrant> {
        let Some(unit) = kill.killer_unit else {
            return Vec::new();
        };
        let Some(killer) = participants.iter().find(|p| p.controls(unit)) else {
            return Vec::new();
        };
        let Some(entry) = self.entries.get(&killer.id) else {
            return Vec::new();
        };

        let mut grants = Vec::new();
        for currency in [CurrencyKind::Gold, CurrencyKind::Dust] {
            let bonus = entry.get(currency);
            if bonus.magnitude <= 0.0 {
                continue;
            }
            let (low, high) = self.ranges.range(currency, kill.victim_tier);
            let base = if high > low && high.is_finite() {
                rng.gen_range(low..=high)
            } else {
                low
            };
            let amount = base * f64::from(bonus.magnitude) * self.curve.multiplier(bonus.upgrade_level);
            let amount = amount.round();
            if amount.is_finite() && amount >= 1.0 {
                tracing::debug!(participant = killer.id, %currency, amount, "on-kill bonus");
                grants.push(CurrencyGrant {
                    recipient: killer.id,
                    currency,
                    amount: amount as u64,
                    position: kill.position,
                });
            }
        }
        grants
    }
}

impl Default for OnKillBonusLedger {
    fn default() -> Self {
        Self::from_config(&EconomyConfig::default())
    }
}
