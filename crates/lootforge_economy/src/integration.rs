//! # Integration API
//!
//! [`LootEngine`] is the single entry point the host simulation calls. It
//! owns the shared state the pure modules deliberately don't:
//!
//! ```text
//!                 on_kill(kill, roster)
//!                         │
//!        ┌────────────────┼─────────────────┐
//!        ▼                ▼                 ▼
//!   LootSnapshot      ChaCha8Rng      OnKillBonusLedger
//!   (RwLock<Arc>)      (Mutex)            (Mutex)
//!        │                │                 │
//!        └──── DropArbiter ┘                │
//!                   │                       │
//!                   ▼                       ▼
//!            DropCreated events     CurrencyGranted events
//!                   └──────────┬────────────┘
//!                              ▼
//!                     event buffer (Mutex)
//!                              │
//!                              ▼
//!              drain_events() by the pickup and
//!                   currency subsystems
//! ```
//!
//! ## Thread Safety
//!
//! `LootEngine` is `Send + Sync`. Kills are still expected to arrive one at
//! a time from the authoritative side; the locks only make catalog reloads
//! and event draining safe from other threads.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::bonus::{CurrencyGrant, OnKillBonusEntry, OnKillBonusLedger};
use crate::config::EconomyConfig;
use crate::error::{EconomyError, EconomyResult};
use crate::item::{ItemCatalog, ItemInstance, TemplateId};
use crate::loot::{DropArbiter, DropPlacement, DropRecord, KillEvent, LootSnapshot, OpenGround, Participant, ParticipantId};
use crate::transactions::{ItemTransactions, Wallet};
use crate::upgrade_roll::{NoProgression, ProgressionScalar};

/// Outbound request for an external subsystem.
#[derive(Debug, PartialEq)]
pub enum EconomyEvent {
    /// Spawn a world drop. For the drop/pickup subsystem.
    DropCreated(DropRecord),
    /// Credit currency. For the currency subsystem.
    CurrencyGranted(CurrencyGrant),
}

/// What one kill produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KillSummary {
    /// Drops created across all participants.
    pub drops: usize,
    /// Currency grants issued to the killer.
    pub currency_grants: usize,
}

/// The loot and progression economy behind one session.
pub struct LootEngine {
    config: EconomyConfig,
    arbiter: DropArbiter,
    snapshot: RwLock<Arc<LootSnapshot>>,
    rng: Mutex<ChaCha8Rng>,
    ledger: Mutex<OnKillBonusLedger>,
    events: Mutex<Vec<EconomyEvent>>,
    progression: Box<dyn ProgressionScalar>,
    placement: Box<dyn DropPlacement>,
}

impl LootEngine {
    /// Creates an engine over `catalog` with a deterministic random source.
    ///
    /// Drop-time upgrade odds are unscaled and every position is a valid
    /// drop point until [`with_progression`](Self::with_progression) and
    /// [`with_placement`](Self::with_placement) say otherwise.
    #[must_use]
    pub fn new(config: EconomyConfig, catalog: ItemCatalog, seed: u64) -> Self {
        let snapshot = LootSnapshot::build(catalog);
        tracing::info!(
            templates = snapshot.catalog().len(),
            equipment = snapshot.pools().equipment_count(),
            "loot engine ready"
        );
        Self {
            arbiter: DropArbiter::from_config(&config),
            ledger: Mutex::new(OnKillBonusLedger::from_config(&config)),
            config,
            snapshot: RwLock::new(Arc::new(snapshot)),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            events: Mutex::new(Vec::with_capacity(64)),
            progression: Box::new(NoProgression),
            placement: Box::new(OpenGround),
        }
    }

    /// Uses `progression` to scale drop-time upgrade odds.
    #[must_use]
    pub fn with_progression(mut self, progression: impl ProgressionScalar + 'static) -> Self {
        self.progression = Box::new(progression);
        self
    }

    /// Uses `placement` to validate drop positions.
    #[must_use]
    pub fn with_placement(mut self, placement: impl DropPlacement + 'static) -> Self {
        self.placement = Box::new(placement);
        self
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// The current catalog snapshot. Stays valid across reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LootSnapshot> {
        Arc::clone(&self.snapshot.read())
    }

    /// Replaces the catalog. The new snapshot is built before the swap, so
    /// readers see either the old snapshot or the new one, never a mix.
    pub fn reload_catalog(&self, catalog: ItemCatalog) {
        let fresh = Arc::new(LootSnapshot::build(catalog));
        tracing::info!(
            templates = fresh.catalog().len(),
            equipment = fresh.pools().equipment_count(),
            "catalog snapshot swapped"
        );
        *self.snapshot.write() = fresh;
    }

    // ========================================================================
    // Kills
    // ========================================================================

    /// Resolves one kill: drops for every eligible participant, then the
    /// killer's on-kill currency.
    ///
    /// Call exactly once per kill, from the authoritative side.
    pub fn on_kill(&self, kill: &KillEvent, participants: &[Participant]) -> KillSummary {
        let snapshot = self.snapshot();
        let (drops, grants) = {
            let mut rng = self.rng.lock();
            let drops = self.arbiter.resolve_kill(
                &snapshot,
                kill,
                participants,
                self.progression.as_ref(),
                self.placement.as_ref(),
                &mut *rng,
            );
            let grants = self.ledger.lock().on_kill(kill, participants, &mut *rng);
            (drops, grants)
        };

        let summary = KillSummary {
            drops: drops.len(),
            currency_grants: grants.len(),
        };
        let mut events = self.events.lock();
        events.extend(drops.into_iter().map(EconomyEvent::DropCreated));
        events.extend(grants.into_iter().map(EconomyEvent::CurrencyGranted));
        summary
    }

    /// Takes every buffered event, oldest first.
    #[must_use]
    pub fn drain_events(&self) -> Vec<EconomyEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of buffered events.
    #[must_use]
    pub fn pending_event_count(&self) -> usize {
        self.events.lock().len()
    }

    // ========================================================================
    // On-kill bonuses
    // ========================================================================

    /// Sets `participant`'s on-kill bonuses.
    pub fn register_bonus(&self, participant: ParticipantId, entry: OnKillBonusEntry) {
        self.ledger.lock().register(participant, entry);
    }

    /// Sets `participant`'s on-kill bonuses from their equipped items.
    pub fn register_bonus_from_equipment<'a>(
        &self,
        participant: ParticipantId,
        equipped: impl IntoIterator<Item = &'a ItemInstance>,
    ) {
        self.ledger.lock().register_from_equipment(participant, equipped);
    }

    /// Forgets `participant`'s bonuses. Call on disconnect.
    pub fn clear_bonus(&self, participant: ParticipantId) -> bool {
        self.ledger.lock().clear(participant)
    }

    /// The bonuses registered for `participant`.
    #[must_use]
    pub fn bonus(&self, participant: ParticipantId) -> Option<OnKillBonusEntry> {
        self.ledger.lock().entry(participant).copied()
    }

    // ========================================================================
    // Vendors and progression
    // ========================================================================

    /// Upgrade, cleanse, dismantle and vendor operations.
    #[must_use]
    pub fn transactions(&self) -> ItemTransactions<'_> {
        ItemTransactions::new(&self.config)
    }

    /// Gold price of template `template_id`, if it exists.
    #[must_use]
    pub fn buy_quote(&self, template_id: TemplateId) -> Option<u64> {
        let snapshot = self.snapshot();
        let template = snapshot.catalog().get(template_id)?;
        Some(self.transactions().buy_quote(template))
    }

    /// Buys a fresh instance of template `template_id`.
    ///
    /// # Errors
    ///
    /// - `TemplateNotFound` if the catalog has no such template
    /// - `InsufficientFunds` if the wallet cannot cover the price
    pub fn purchase(&self, template_id: TemplateId, wallet: &mut Wallet) -> EconomyResult<ItemInstance> {
        let snapshot = self.snapshot();
        let template = snapshot
            .catalog()
            .get(template_id)
            .ok_or(EconomyError::TemplateNotFound(template_id))?;
        self.transactions().purchase(template, wallet)
    }
}

impl std::fmt::Debug for LootEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LootEngine")
            .field("templates", &self.snapshot.read().catalog().len())
            .field("pending_events", &self.pending_event_count())
            .finish_non_exhaustive()
    }
}
