//! Rules events.
//!
//! An [`Event`] records one state change. Events are built by whatever
//! applied the rule, handed to the [`EventBus`](super::EventBus), and
//! from then on only read.
//!
//! ## Event Types
//!
//! [`EventType`] is a closed set. Each variant has a stable
//! SCREAMING_SNAKE name used on the wire and in logs. A handful of
//! variants are "batch" events that summarize several simultaneous
//! sub-events (for example every creature damaged by one source).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PlayerId, Zone};

macro_rules! event_types {
    ($($(#[$batch:ident])? $variant:ident => $name:literal,)+) => {
        /// Kind of rules event.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(into = "&'static str", try_from = "String")]
        pub enum EventType {
            $($variant,)+
        }

        impl EventType {
            /// Every event type, in declaration order.
            pub const ALL: &'static [EventType] = &[$(EventType::$variant,)+];

            /// Stable wire name.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(EventType::$variant => $name,)+
                }
            }

            /// Whether this type summarizes several simultaneous sub-events.
            #[must_use]
            pub const fn is_batch(self) -> bool {
                match self {
                    $(EventType::$variant => event_types!(@batch $($batch)?),)+
                }
            }
        }

        impl std::str::FromStr for EventType {
            type Err = UnknownEventType;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(EventType::$variant),)+
                    other => Err(UnknownEventType(other.to_string())),
                }
            }
        }
    };
    (@batch batch) => { true };
    (@batch) => { false };
}

event_types! {
    // Turn structure
    BeginTurn => "BEGIN_TURN",
    PlayTurn => "PLAY_TURN",
    ExtraTurn => "EXTRA_TURN",
    ChangePhase => "CHANGE_PHASE",
    PhaseChanged => "PHASE_CHANGED",
    ChangeStep => "CHANGE_STEP",
    StepChanged => "STEP_CHANGED",
    BeginningPhase => "BEGINNING_PHASE",
    UntapStep => "UNTAP_STEP",
    UpkeepStep => "UPKEEP_STEP",
    DrawStep => "DRAW_STEP",
    PrecombatMainPhase => "PRECOMBAT_MAIN_PHASE",
    PrecombatMainStep => "PRECOMBAT_MAIN_STEP",
    CombatPhase => "COMBAT_PHASE",
    BeginCombatStep => "BEGIN_COMBAT_STEP",
    DeclareAttackersStep => "DECLARE_ATTACKERS_STEP",
    DeclareBlockersStep => "DECLARE_BLOCKERS_STEP",
    CombatDamageStepPre => "COMBAT_DAMAGE_STEP_PRE",
    CombatDamageStep => "COMBAT_DAMAGE_STEP",
    EndCombatStep => "END_COMBAT_STEP",
    PostcombatMainPhase => "POSTCOMBAT_MAIN_PHASE",
    PostcombatMainStep => "POSTCOMBAT_MAIN_STEP",
    EndPhase => "END_PHASE",
    EndTurnStep => "END_TURN_STEP",
    CleanupStep => "CLEANUP_STEP",
    EmptyManaPool => "EMPTY_MANA_POOL",
    AtEndOfTurn => "AT_END_OF_TURN",

    // Zones
    ZoneChange => "ZONE_CHANGE",
    ZoneChangeGroup => "ZONE_CHANGE_GROUP",
    #[batch] ZoneChangeBatch => "ZONE_CHANGE_BATCH",

    // Library, hand and graveyard
    DrawCard => "DRAW_CARD",
    DrewCard => "DREW_CARD",
    DiscardCard => "DISCARD_CARD",
    DiscardedCard => "DISCARDED_CARD",
    MillCards => "MILL_CARDS",
    MilledCard => "MILLED_CARD",
    #[batch] MilledCardsBatchForOnePlayer => "MILLED_CARDS_BATCH_FOR_ONE_PLAYER",
    #[batch] MilledCardsBatchForAll => "MILLED_CARDS_BATCH_FOR_ALL",
    ShuffleLibrary => "SHUFFLE_LIBRARY",
    LibraryShuffled => "LIBRARY_SHUFFLED",

    // Damage and life
    DamagePlayer => "DAMAGE_PLAYER",
    DamagedPlayer => "DAMAGED_PLAYER",
    #[batch] DamagedBatchForPlayers => "DAMAGED_BATCH_FOR_PLAYERS",
    #[batch] DamagedBatchForOnePlayer => "DAMAGED_BATCH_FOR_ONE_PLAYER",
    #[batch] DamagedBatchBySource => "DAMAGED_BATCH_BY_SOURCE",
    #[batch] DamagedBatchForAll => "DAMAGED_BATCH_FOR_ALL",
    PlayerLifeChange => "PLAYER_LIFE_CHANGE",
    GainLife => "GAIN_LIFE",
    GainedLife => "GAINED_LIFE",
    LoseLife => "LOSE_LIFE",
    LostLife => "LOST_LIFE",
    #[batch] LostLifeBatchForOnePlayer => "LOST_LIFE_BATCH_FOR_ONE_PLAYER",
    #[batch] LostLifeBatch => "LOST_LIFE_BATCH",
    PayLife => "PAY_LIFE",
    LifePaid => "LIFE_PAID",

    // Casting, activating, mana
    PlayLand => "PLAY_LAND",
    LandPlayed => "LAND_PLAYED",
    CastSpell => "CAST_SPELL",
    SpellCast => "SPELL_CAST",
    ActivateAbility => "ACTIVATE_ABILITY",
    ActivatedAbility => "ACTIVATED_ABILITY",
    TakeSpecialAction => "TAKE_SPECIAL_ACTION",
    TakenSpecialAction => "TAKEN_SPECIAL_ACTION",
    TriggeredAbility => "TRIGGERED_ABILITY",
    ResolvingAbility => "RESOLVING_ABILITY",
    AddMana => "ADD_MANA",
    ManaAdded => "MANA_ADDED",
    ManaPaid => "MANA_PAID",

    // Targets and countering
    Target => "TARGET",
    Targeted => "TARGETED",
    TargetsValid => "TARGETS_VALID",
    Counter => "COUNTER",
    Countered => "COUNTERED",

    // Combat
    DeclaredAttackers => "DECLARED_ATTACKERS",
    AttackerDeclared => "ATTACKER_DECLARED",
    DefenderAttacked => "DEFENDER_ATTACKED",
    DeclaredBlockers => "DECLARED_BLOCKERS",
    BlockerDeclared => "BLOCKER_DECLARED",
    CreatureBlocked => "CREATURE_BLOCKED",
    UnblockedAttacker => "UNBLOCKED_ATTACKER",
    CombatDamageApplied => "COMBAT_DAMAGE_APPLIED",
    RemovedFromCombat => "REMOVED_FROM_COMBAT",

    // Tapping
    Tap => "TAP",
    Tapped => "TAPPED",
    TappedForMana => "TAPPED_FOR_MANA",
    #[batch] TappedBatch => "TAPPED_BATCH",
    Untap => "UNTAP",
    Untapped => "UNTAPPED",
    #[batch] UntappedBatch => "UNTAPPED_BATCH",

    // Permanents
    EntersTheBattlefield => "ENTERS_THE_BATTLEFIELD",
    PermanentEntersBattlefield => "PERMANENT_ENTERS_BATTLEFIELD",
    DamagePermanent => "DAMAGE_PERMANENT",
    DamagedPermanent => "DAMAGED_PERMANENT",
    #[batch] DamagedBatchForPermanents => "DAMAGED_BATCH_FOR_PERMANENTS",
    #[batch] DamagedBatchForOnePermanent => "DAMAGED_BATCH_FOR_ONE_PERMANENT",
    DestroyPermanent => "DESTROY_PERMANENT",
    DestroyedPermanent => "DESTROYED_PERMANENT",
    SacrificePermanent => "SACRIFICE_PERMANENT",
    SacrificedPermanent => "SACRIFICED_PERMANENT",
    #[batch] SacrificedPermanentBatch => "SACRIFICED_PERMANENT_BATCH",
    PermanentDies => "PERMANENT_DIES",

    // Counters
    AddCounter => "ADD_COUNTER",
    CounterAdded => "COUNTER_ADDED",
    AddCounters => "ADD_COUNTERS",
    CountersAdded => "COUNTERS_ADDED",
    RemoveCounter => "REMOVE_COUNTER",
    CounterRemoved => "COUNTER_REMOVED",
    RemoveCounters => "REMOVE_COUNTERS",
    CountersRemoved => "COUNTERS_REMOVED",

    // Control and tokens
    GainControl => "GAIN_CONTROL",
    GainedControl => "GAINED_CONTROL",
    LoseControl => "LOSE_CONTROL",
    LostControl => "LOST_CONTROL",
    CreateToken => "CREATE_TOKEN",
    CreatedToken => "CREATED_TOKEN",

    // Match outcome
    Loses => "LOSES",
    Lost => "LOST",
    Wins => "WINS",

    // Stack lifecycle
    StackItemResolving => "STACK_ITEM_RESOLVING",
    StackItemResolved => "STACK_ITEM_RESOLVED",
    StackItemRemoved => "STACK_ITEM_REMOVED",

    StateBasedActions => "STATE_BASED_ACTIONS",
    CustomEvent => "CUSTOM_EVENT",
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventType> for &'static str {
    fn from(event_type: EventType) -> Self {
        event_type.as_str()
    }
}

impl TryFrom<String> for EventType {
    type Error = UnknownEventType;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

/// Returned when parsing a name that is not an [`EventType`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEventType(pub String);

impl std::fmt::Display for UnknownEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown event type: {}", self.0)
    }
}

impl std::error::Error for UnknownEventType {}

/// Targets carried by a multi-target event.
pub type EventTargets = SmallVec<[EntityId; 4]>;

/// A rules event with contextual data.
///
/// ## Event Data
///
/// - `target`, `source`: the object affected and the object responsible
/// - `controller`, `player`: who controls the source, and the player the
///   event is about (defaults to the controller)
/// - `amount`, `flag`, `data`: type-specific payload (damage dealt,
///   combat vs. noncombat, counter name, ...)
/// - `timestamp`: logical clock stamped by the bus at publish time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub id: String,
    pub target: EntityId,
    pub source: EntityId,
    pub controller: PlayerId,
    pub player: PlayerId,
    pub amount: i64,
    pub flag: bool,
    pub data: String,
    pub zone: Option<Zone>,
    pub targets: EventTargets,
    pub timestamp: u64,
    pub metadata: FxHashMap<String, String>,
    pub description: String,
    /// Replacement effects already applied to this event.
    pub applied_effects: Vec<String>,
}

impl Event {
    /// Create an event with the common fields populated.
    pub fn new(
        event_type: EventType,
        target: impl Into<EntityId>,
        source: impl Into<EntityId>,
        controller: impl Into<PlayerId>,
    ) -> Self {
        let controller = controller.into();
        Self {
            event_type,
            id: String::new(),
            target: target.into(),
            source: source.into(),
            player: controller.clone(),
            controller,
            amount: 0,
            flag: false,
            data: String::new(),
            zone: None,
            targets: EventTargets::new(),
            timestamp: 0,
            metadata: FxHashMap::default(),
            description: String::new(),
            applied_effects: Vec::new(),
        }
    }

    /// Create an event with no objects or players attached.
    pub fn of_type(event_type: EventType) -> Self {
        Self::new(event_type, EntityId::none(), EntityId::none(), PlayerId::none())
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_player(mut self, player: impl Into<PlayerId>) -> Self {
        self.player = player.into();
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: i64) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_flag(mut self, flag: bool) -> Self {
        self.flag = flag;
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = data.into();
        self
    }

    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Add one target to the multi-target list (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: impl Into<EntityId>) -> Self {
        self.targets.push(target.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Look up a metadata value.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Whether a replacement effect has already modified this event.
    #[must_use]
    pub fn was_applied(&self, effect_id: &str) -> bool {
        self.applied_effects.iter().any(|e| e == effect_id)
    }
}
