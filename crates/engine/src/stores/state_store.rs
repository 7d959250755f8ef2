//! The single authoritative game state and its sequencing.
//!
//! All reads and writes go through one mutex. Nothing inside the critical
//! section awaits: parsing happens before the lock is taken, and outbound
//! frames are handed to a non-blocking [`FrameSink`] before it is released,
//! so frames leave in index order.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use xhaven_domain::{
    Character, CharacterNumber, Condition, ConditionToggle, DocumentError, DomainError, GameState,
    HealthChange, HealthUpdate, Monster, MonsterNumber, NameTable, ParsedGameState, StandeeNumber,
    UnknownRosterEntry,
};
use xhaven_shared::{Frame, FrameError};

use super::roster_view::RosterView;
use crate::infrastructure::ports::FrameSink;

/// Index of a store that has not seen any frame yet.
pub const INITIAL_INDEX: i64 = -1;

/// State store errors. Every failure leaves the store unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    MalformedFrame(#[from] FrameError),
    #[error("Invalid game state: {0}")]
    InvalidJson(#[from] DocumentError),
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid request: {0}")]
    Invalid(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<DomainError> for StoreError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// What to do with an inbound frame whose index does not advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleIndexPolicy {
    /// Last writer wins: log the anomaly and apply anyway.
    ///
    /// The store adopts the inbound index even when it is lower, so the
    /// index on the next outbound frame can go backward after a stale frame.
    #[default]
    Apply,
    /// Log the anomaly and keep the current state.
    Ignore,
}

impl FromStr for StaleIndexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "apply" => Ok(Self::Apply),
            "ignore" => Ok(Self::Ignore),
            other => Err(format!("expected apply or ignore, got {:?}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    pub stale_index: StaleIndexPolicy,
    /// Propagate the state again after an applied reconcile.
    pub echo_reconciled: bool,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            stale_index: StaleIndexPolicy::Apply,
            echo_reconciled: true,
        }
    }
}

/// An inbound index that was not strictly greater than the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencingAnomaly {
    pub current: i64,
    pub received: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileOutcome {
    /// False only when a stale frame was ignored.
    pub applied: bool,
    /// Store index after the call, including any echo.
    pub index: i64,
    pub anomaly: Option<SequencingAnomaly>,
    pub skipped: Vec<UnknownRosterEntry>,
    pub characters: usize,
    pub monsters: usize,
}

/// A propagated local change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    /// Index of the frame that carried the change.
    pub index: i64,
    pub description: String,
    pub detail: T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterAdjustment {
    pub update: HealthUpdate,
    pub removed: bool,
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionChange {
    pub condition: Condition,
    pub toggle: ConditionToggle,
    /// False when adding a condition that was already present.
    pub changed: bool,
}

struct StoreState {
    game: GameState,
    index: i64,
    description: String,
}

pub struct StateStore {
    inner: Mutex<StoreState>,
    sink: Arc<dyn FrameSink>,
    names: NameTable,
    policy: StorePolicy,
}

impl StateStore {
    pub fn new(sink: Arc<dyn FrameSink>, names: NameTable, policy: StorePolicy) -> Self {
        Self {
            inner: Mutex::new(StoreState {
                game: GameState::default(),
                index: INITIAL_INDEX,
                description: String::new(),
            }),
            sink,
            names,
            policy,
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Every critical section leaves the state consistent before it can panic.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn index(&self) -> i64 {
        self.lock().index
    }

    pub fn description(&self) -> String {
        self.lock().description.clone()
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    /// Decodes one delimited frame and reconciles from it.
    pub fn apply_frame(&self, raw: &[u8]) -> Result<ReconcileOutcome, StoreError> {
        let frame = Frame::decode(raw).inspect_err(|e| {
            tracing::warn!(error = %e, bytes = raw.len(), "Discarding malformed frame");
        })?;
        self.reconcile(frame.index, &frame.description, &frame.payload)
    }

    /// Replaces session and roster from a full state document.
    pub fn reconcile(
        &self,
        index: i64,
        description: &str,
        payload: &str,
    ) -> Result<ReconcileOutcome, StoreError> {
        let ParsedGameState { mut state, skipped } =
            GameState::from_json(payload).inspect_err(|e| {
                tracing::warn!(index, error = %e, "Rejecting game state, store unchanged");
            })?;
        state.roster.apply_names(&self.names);

        for entry in &skipped {
            tracing::warn!(
                position = entry.position,
                id = ?entry.id,
                reason = %entry.reason,
                "Skipping unknown roster entry"
            );
        }

        let characters = state.roster.character_count();
        let monsters = state.roster.monster_count();

        let mut inner = self.lock();
        let anomaly = (index <= inner.index).then_some(SequencingAnomaly {
            current: inner.index,
            received: index,
        });

        if let Some(anomaly) = anomaly {
            tracing::warn!(
                current = anomaly.current,
                received = anomaly.received,
                policy = ?self.policy.stale_index,
                "Inbound index did not advance"
            );
            if self.policy.stale_index == StaleIndexPolicy::Ignore {
                return Ok(ReconcileOutcome {
                    applied: false,
                    index: inner.index,
                    anomaly: Some(anomaly),
                    skipped,
                    characters,
                    monsters,
                });
            }
        }

        inner.game = state;
        inner.index = index;
        inner.description = description.to_string();
        tracing::info!(
            index,
            description,
            characters,
            monsters,
            "Reconciled game state"
        );

        if self.policy.echo_reconciled {
            self.propagate(&mut inner);
        }

        Ok(ReconcileOutcome {
            applied: true,
            index: inner.index,
            anomaly,
            skipped,
            characters,
            monsters,
        })
    }

    /// Serializes session and roster in document form.
    pub fn snapshot(&self) -> Result<String, StoreError> {
        Ok(self.lock().game.to_json()?)
    }

    pub fn roster(&self) -> RosterView {
        let inner = self.lock();
        RosterView::from_state(&inner.game, inner.index)
    }

    pub fn set_initiative(
        &self,
        character: CharacterNumber,
        initiative: i32,
    ) -> Result<Mutation<()>, StoreError> {
        self.mutate(|game| {
            let character = game.roster.character_mut(character)?;
            character.set_initiative(initiative);
            let description = format!(
                "Character {} initiative changed to {}",
                character_name(character),
                initiative
            );
            Ok((description, ()))
        })
    }

    /// Changes one standee's health, optionally adding a condition first.
    ///
    /// The condition code and both lookups are checked before anything
    /// changes. A standee clamped to 0 leaves the board in the same call.
    pub fn adjust_monster(
        &self,
        monster: MonsterNumber,
        standee: StandeeNumber,
        change: HealthChange,
        condition: Option<&str>,
    ) -> Result<Mutation<MonsterAdjustment>, StoreError> {
        let condition = condition.map(Condition::from_str).transpose()?;

        self.mutate(|game| {
            let monster = game.roster.monster_mut(monster)?;
            let instance = monster.instance_mut(standee)?;
            if let Some(condition) = condition {
                instance.add_condition(condition);
            }
            let outcome = monster.apply_standee_health(standee, change)?;

            let mut description = format!("Monster {} nr {}", monster_name(monster), standee);
            if let Some(condition) = condition {
                description.push_str(&format!(" gained {},", condition));
            }
            description.push_str(&format!(" health changed to {}", outcome.update.health));
            if outcome.removed {
                description.push_str(", killed");
            }

            Ok((
                description,
                MonsterAdjustment {
                    update: outcome.update,
                    removed: outcome.removed,
                    condition,
                },
            ))
        })
    }

    /// Characters are clamped like standees but never removed.
    pub fn adjust_character_health(
        &self,
        character: CharacterNumber,
        change: HealthChange,
    ) -> Result<Mutation<HealthUpdate>, StoreError> {
        self.mutate(|game| {
            let character = game.roster.character_mut(character)?;
            let update = character.apply_health(change);
            if update.is_depleted() {
                tracing::info!(character = character.label(), "Character exhausted");
            }
            let description = format!(
                "Character {} health changed to {}",
                character_name(character),
                update.health
            );
            Ok((description, update))
        })
    }

    pub fn toggle_character_condition(
        &self,
        character: CharacterNumber,
        condition: Condition,
        toggle: ConditionToggle,
    ) -> Result<Mutation<ConditionChange>, StoreError> {
        self.mutate(|game| {
            let character = game.roster.character_mut(character)?;
            let name = character_name(character);
            let changed = match toggle {
                ConditionToggle::Add => character.add_condition(condition),
                ConditionToggle::Remove => {
                    if !character.remove_condition(condition) {
                        return Err(DomainError::not_found(
                            "Condition",
                            format!("{} on character {}", condition, name),
                        ));
                    }
                    true
                }
            };
            Ok((
                condition_description(&format!("Character {}", name), condition, toggle),
                ConditionChange {
                    condition,
                    toggle,
                    changed,
                },
            ))
        })
    }

    pub fn toggle_monster_condition(
        &self,
        monster: MonsterNumber,
        standee: StandeeNumber,
        condition: Condition,
        toggle: ConditionToggle,
    ) -> Result<Mutation<ConditionChange>, StoreError> {
        self.mutate(|game| {
            let monster = game.roster.monster_mut(monster)?;
            let subject = format!("Monster {} nr {}", monster_name(monster), standee);
            let instance = monster.instance_mut(standee)?;
            let changed = match toggle {
                ConditionToggle::Add => instance.add_condition(condition),
                ConditionToggle::Remove => {
                    if !instance.remove_condition(condition) {
                        return Err(DomainError::not_found(
                            "Condition",
                            format!("{} on {}", condition, subject),
                        ));
                    }
                    true
                }
            };
            Ok((
                condition_description(&subject, condition, toggle),
                ConditionChange {
                    condition,
                    toggle,
                    changed,
                },
            ))
        })
    }

    pub fn set_toast_message(&self, message: &str) -> Result<Mutation<()>, StoreError> {
        self.mutate(|game| {
            game.session.toast_message.set(message.to_string());
            Ok((format!("Setting toast message to {}", message), ()))
        })
    }

    /// Runs a mutation under the lock and propagates it.
    ///
    /// The closure must fail before touching the state, so an error leaves
    /// the store unchanged and sends nothing.
    fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut GameState) -> Result<(String, T), DomainError>,
    ) -> Result<Mutation<T>, StoreError> {
        let mut inner = self.lock();
        let (description, detail) = apply(&mut inner.game).inspect_err(|e| {
            tracing::warn!(error = %e, "Mutation rejected");
        })?;
        tracing::info!(description = %description, "Applied local change");
        inner.description = description;
        let index = self.propagate(&mut inner);
        Ok(Mutation {
            index,
            description: inner.description.clone(),
            detail,
        })
    }

    /// Advances the index and hands the encoded snapshot to the sink.
    fn propagate(&self, inner: &mut StoreState) -> i64 {
        inner.index += 1;
        let payload = match inner.game.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(index = inner.index, error = %e, "Failed to serialize game state");
                return inner.index;
            }
        };
        let frame = Frame::new(inner.index, inner.description.clone(), payload);
        match self.sink.send(Bytes::from(frame.encode())) {
            Ok(()) => tracing::debug!(index = inner.index, "Queued state frame"),
            Err(e) => tracing::warn!(
                index = inner.index,
                error = %e,
                "Dropping outbound state frame"
            ),
        }
        inner.index
    }
}

fn character_name(character: &Character) -> String {
    character
        .id
        .get()
        .cloned()
        .unwrap_or_else(|| character.label().to_string())
}

fn monster_name(monster: &Monster) -> String {
    monster
        .monster_type
        .get()
        .or_else(|| monster.id.get())
        .cloned()
        .unwrap_or_else(|| monster.label().to_string())
}

fn condition_description(subject: &str, condition: Condition, toggle: ConditionToggle) -> String {
    match toggle {
        ConditionToggle::Add => format!("{} gained {}", subject, condition),
        ConditionToggle::Remove => format!("{} lost {}", subject, condition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockFrameSink, SinkError};
    use serde_json::{json, Value};

    /// Keeps every frame the store sends.
    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<Frame>>,
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<Frame> {
            self.frames.lock().unwrap().clone()
        }

        fn last_payload(&self) -> Value {
            let frames = self.frames();
            let last = frames.last().unwrap();
            serde_json::from_str(&last.payload).unwrap()
        }
    }

    impl FrameSink for RecordingSink {
        fn send(&self, frame: Bytes) -> Result<(), SinkError> {
            self.frames
                .lock()
                .unwrap()
                .push(Frame::decode(&frame).unwrap());
            Ok(())
        }
    }

    fn document() -> String {
        json!({
            "level": 1,
            "round": 1,
            "roundState": 0,
            "scenario": "#0 Howling in the Snow",
            "toastMessage": "",
            "currentList": [
                {"id": "Boneshaper", "turnState": 0, "characterClass": "Boneshaper",
                 "characterState": {"initiative": 0, "health": 10, "maxHealth": 10,
                                    "level": 1, "xp": 0, "display": "Boneshaper",
                                    "conditions": [], "summonList": []}},
                {"id": "Frost Demon", "turnState": 0, "isActive": false, "type": "Frost Demon",
                 "isAlly": false, "level": 1,
                 "monsterInstances": [
                    {"health": 4, "maxHealth": 8, "standeeNr": 1, "level": 1,
                     "conditions": [], "move": 2, "attack": 3}
                 ]}
            ]
        })
        .to_string()
    }

    fn store_with(policy: StorePolicy) -> (StateStore, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let store = StateStore::new(sink.clone(), NameTable::default(), policy);
        (store, sink)
    }

    fn quiet_policy() -> StorePolicy {
        StorePolicy {
            echo_reconciled: false,
            ..StorePolicy::default()
        }
    }

    fn seeded() -> (StateStore, Arc<RecordingSink>) {
        let (store, sink) = store_with(quiet_policy());
        store.reconcile(10, "Start of round", &document()).unwrap();
        (store, sink)
    }

    fn one() -> (MonsterNumber, StandeeNumber) {
        (MonsterNumber::new(1), StandeeNumber::new(1))
    }

    #[test]
    fn new_store_starts_before_first_index() {
        let (store, _) = store_with(StorePolicy::default());
        assert_eq!(store.index(), INITIAL_INDEX);
        assert_eq!(store.snapshot().unwrap(), r#"{"currentList":[]}"#);
    }

    #[test]
    fn snapshot_round_trips_the_document() {
        let (store, _) = seeded();
        let original: Value = serde_json::from_str(&document()).unwrap();
        let snapshot: Value = serde_json::from_str(&store.snapshot().unwrap()).unwrap();
        assert_eq!(snapshot, original);

        store.reconcile(11, "again", &store.snapshot().unwrap()).unwrap();
        let again: Value = serde_json::from_str(&store.snapshot().unwrap()).unwrap();
        assert_eq!(again, original);
    }

    #[test]
    fn reconcile_adopts_index_and_echoes_next() {
        let (store, sink) = store_with(StorePolicy::default());
        let outcome = store.reconcile(10, "Peer update", &document()).unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.anomaly, None);
        assert_eq!(outcome.index, 11);
        assert_eq!((outcome.characters, outcome.monsters), (1, 1));

        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].index, 11);
        assert_eq!(frames[0].description, "Peer update");
    }

    #[test]
    fn reconcile_without_echo_sends_nothing() {
        let (store, sink) = seeded();
        assert_eq!(store.index(), 10);
        assert_eq!(store.description(), "Start of round");
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn stale_index_is_applied_by_default() {
        let (store, _) = seeded();
        let doc = document().replace("\"round\":1", "\"round\":2");
        let outcome = store.reconcile(3, "late", &doc).unwrap();

        assert!(outcome.applied);
        assert_eq!(
            outcome.anomaly,
            Some(SequencingAnomaly {
                current: 10,
                received: 3
            })
        );
        assert_eq!(store.index(), 3);
        assert_eq!(store.roster().round, Some(2));
    }

    #[test]
    fn stale_index_can_be_ignored() {
        let (store, sink) = store_with(StorePolicy {
            stale_index: StaleIndexPolicy::Ignore,
            echo_reconciled: true,
        });
        store.reconcile(10, "first", &document()).unwrap();
        let before = store.snapshot().unwrap();

        let outcome = store.reconcile(11, "repeat", r#"{"currentList":[]}"#).unwrap();
        assert!(!outcome.applied);
        assert!(outcome.anomaly.is_some());
        assert_eq!(store.index(), 11);
        assert_eq!(store.snapshot().unwrap(), before);
        assert_eq!(sink.frames().len(), 1);
    }

    #[test]
    fn invalid_json_leaves_store_unchanged() {
        let (store, sink) = seeded();
        let before = store.snapshot().unwrap();

        let err = store.reconcile(11, "broken", "{not json").unwrap_err();
        assert!(matches!(err, StoreError::InvalidJson(_)));
        let err = store.reconcile(12, "array", "[1,2]").unwrap_err();
        assert!(matches!(err, StoreError::InvalidJson(_)));

        assert_eq!(store.index(), 10);
        assert_eq!(store.snapshot().unwrap(), before);
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn unknown_roster_entries_are_skipped() {
        let (store, _) = store_with(quiet_policy());
        let doc = json!({"currentList": [
            {"id": "Obstacle"},
            {"id": "Drifter", "characterState": {"health": 5}},
            {"id": "Broken", "monsterInstances": "nope"},
            {"id": "Guard", "monsterInstances": []}
        ]})
        .to_string();

        let outcome = store.reconcile(0, "", &doc).unwrap();
        assert_eq!(outcome.skipped.len(), 2);
        assert_eq!(outcome.skipped[0].position, 0);
        assert_eq!(outcome.skipped[1].id.as_deref(), Some("Broken"));
        assert_eq!((outcome.characters, outcome.monsters), (1, 1));
    }

    #[test]
    fn mistyped_fields_survive_reconcile_and_echo() {
        let (store, sink) = store_with(StorePolicy::default());
        let doc = json!({
            "round": 2.0,
            "toastMessage": null,
            "currentList": [
                {"id": "Drifter", "characterState": {"health": 5, "xp": 1.5, "initiative": null}}
            ]
        });

        let outcome = store.reconcile(3, "Peer update", &doc.to_string()).unwrap();
        assert!(outcome.skipped.is_empty());
        assert_eq!(outcome.characters, 1);
        assert_eq!(sink.last_payload(), doc);

        store
            .adjust_character_health(CharacterNumber::new(1), HealthChange::Relative(-1))
            .unwrap();
        let payload = sink.last_payload();
        assert_eq!(payload["currentList"][0]["characterState"]["xp"], json!(1.5));
        assert_eq!(payload["currentList"][0]["characterState"]["health"], json!(4));
        assert_eq!(payload["round"], json!(2.0));
    }

    #[test]
    fn malformed_frame_leaves_store_unchanged() {
        let (store, sink) = seeded();
        let before = store.snapshot().unwrap();

        let err = store
            .apply_frame(b"S3nD:Index:11Description:no state here[EOM]")
            .unwrap_err();
        assert!(matches!(err, StoreError::MalformedFrame(_)));
        assert_eq!(store.index(), 10);
        assert_eq!(store.snapshot().unwrap(), before);
        assert!(sink.frames().is_empty());
    }

    #[test]
    fn apply_frame_reconciles() {
        let (store, _) = store_with(quiet_policy());
        let raw = Frame::new(4, "From peer", document()).encode();
        let outcome = store.apply_frame(&raw).unwrap();
        assert_eq!(outcome.index, 4);
        assert_eq!(store.roster().characters.len(), 1);
    }

    #[test]
    fn lethal_damage_removes_the_standee() {
        let (store, sink) = seeded();
        let (monster, standee) = one();

        let mutation = store
            .adjust_monster(monster, standee, HealthChange::Relative(-5), None)
            .unwrap();
        assert!(mutation.detail.removed);
        assert_eq!(mutation.detail.update.health, 0);
        assert_eq!(mutation.index, 11);
        assert_eq!(
            mutation.description,
            "Monster Frost Demon nr 1 health changed to 0, killed"
        );

        let payload = sink.last_payload();
        assert_eq!(payload["currentList"][1]["monsterInstances"], json!([]));

        let err = store
            .adjust_monster(monster, standee, HealthChange::Relative(1), None)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn overheal_clamps_to_max_health() {
        let (store, sink) = seeded();
        let (monster, standee) = one();

        let mutation = store
            .adjust_monster(monster, standee, HealthChange::Relative(20), None)
            .unwrap();
        assert_eq!(mutation.detail.update.health, 8);
        assert!(!mutation.detail.removed);
        assert_eq!(
            sink.last_payload()["currentList"][1]["monsterInstances"][0]["health"],
            json!(8)
        );
    }

    #[test]
    fn absolute_health_replaces_value() {
        let (store, _) = seeded();
        let (monster, standee) = one();
        let mutation = store
            .adjust_monster(monster, standee, HealthChange::Absolute(6), None)
            .unwrap();
        assert_eq!(mutation.detail.update.previous, 4);
        assert_eq!(mutation.detail.update.health, 6);
    }

    #[test]
    fn condition_is_added_alongside_damage() {
        let (store, sink) = seeded();
        let (monster, standee) = one();

        let mutation = store
            .adjust_monster(monster, standee, HealthChange::Relative(-2), Some("p"))
            .unwrap();
        assert_eq!(mutation.detail.condition, Some(Condition::Poison));
        assert_eq!(
            sink.last_payload()["currentList"][1]["monsterInstances"][0]["conditions"],
            json!([5])
        );
        assert_eq!(
            mutation.description,
            "Monster Frost Demon nr 1 gained poison, health changed to 2"
        );
    }

    #[test]
    fn condition_is_reported_when_damage_is_lethal() {
        let (store, sink) = seeded();
        let (monster, standee) = one();

        let mutation = store
            .adjust_monster(monster, standee, HealthChange::Relative(-5), Some("p"))
            .unwrap();
        assert!(mutation.detail.removed);
        assert_eq!(mutation.detail.condition, Some(Condition::Poison));
        assert!(mutation.description.contains("gained poison"));
        assert!(mutation.description.contains("killed"));
        assert_eq!(
            mutation.description,
            "Monster Frost Demon nr 1 gained poison, health changed to 0, killed"
        );

        let payload = sink.last_payload();
        assert_eq!(payload["currentList"][1]["monsterInstances"], json!([]));
        assert!(store.roster().monsters[0].standees.is_empty());
    }

    #[test]
    fn unknown_condition_code_changes_nothing() {
        let (store, _) = seeded();
        let before = store.snapshot().unwrap();
        let (monster, standee) = one();

        let err = store
            .adjust_monster(monster, standee, HealthChange::Relative(-5), Some("q"))
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.snapshot().unwrap(), before);
        assert_eq!(store.index(), 10);
    }

    #[test]
    fn missing_slots_send_nothing() {
        let mut sink = MockFrameSink::new();
        sink.expect_send().never();
        let store = StateStore::new(Arc::new(sink), NameTable::default(), quiet_policy());
        store.reconcile(1, "", &document()).unwrap();

        let err = store
            .adjust_monster(
                MonsterNumber::new(2),
                StandeeNumber::new(1),
                HealthChange::Relative(-1),
                None,
            )
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::NotFound {
                entity_type: "Monster",
                id: "2".into()
            }
        );
        assert!(store
            .adjust_monster(
                MonsterNumber::new(1),
                StandeeNumber::new(4),
                HealthChange::Relative(-1),
                None
            )
            .unwrap_err()
            .is_not_found());
        assert!(store
            .set_initiative(CharacterNumber::new(2), 40)
            .unwrap_err()
            .is_not_found());
        assert!(store
            .set_initiative(CharacterNumber::new(0), 40)
            .unwrap_err()
            .is_not_found());
        assert_eq!(store.index(), 1);
    }

    #[test]
    fn set_initiative_touches_only_initiative() {
        let (store, sink) = seeded();
        let before: Value = serde_json::from_str(&store.snapshot().unwrap()).unwrap();

        let mutation = store.set_initiative(CharacterNumber::new(1), 35).unwrap();
        assert_eq!(
            mutation.description,
            "Character Boneshaper initiative changed to 35"
        );

        let mut expected = before;
        expected["currentList"][0]["characterState"]["initiative"] = json!(35);
        assert_eq!(sink.last_payload(), expected);
    }

    #[test]
    fn character_health_clamps_and_never_removes() {
        let (store, sink) = seeded();
        let character = CharacterNumber::new(1);

        let healed = store
            .adjust_character_health(character, HealthChange::Relative(5))
            .unwrap();
        assert_eq!(healed.detail.health, 10);

        let down = store
            .adjust_character_health(character, HealthChange::Relative(-30))
            .unwrap();
        assert!(down.detail.is_depleted());
        assert_eq!(store.roster().characters.len(), 1);
        assert_eq!(
            sink.last_payload()["currentList"][0]["characterState"]["health"],
            json!(0)
        );
    }

    #[test]
    fn condition_toggles() {
        let (store, _) = seeded();
        let character = CharacterNumber::new(1);

        let added = store
            .toggle_character_condition(character, Condition::Wound, ConditionToggle::Add)
            .unwrap();
        assert!(added.detail.changed);
        let again = store
            .toggle_character_condition(character, Condition::Wound, ConditionToggle::Add)
            .unwrap();
        assert!(!again.detail.changed);
        assert_eq!(store.roster().characters[0].conditions, vec![Condition::Wound]);

        store
            .toggle_character_condition(character, Condition::Wound, ConditionToggle::Remove)
            .unwrap();
        let err = store
            .toggle_character_condition(character, Condition::Wound, ConditionToggle::Remove)
            .unwrap_err();
        assert!(err.is_not_found());

        let (monster, standee) = one();
        let muddled = store
            .toggle_monster_condition(monster, standee, Condition::Muddle, ConditionToggle::Add)
            .unwrap();
        assert_eq!(
            muddled.description,
            "Monster Frost Demon nr 1 gained muddle"
        );
        assert!(store
            .toggle_monster_condition(monster, standee, Condition::Stun, ConditionToggle::Remove)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn propagated_indices_strictly_increase() {
        let (store, sink) = seeded();
        store.set_initiative(CharacterNumber::new(1), 20).unwrap();
        store.set_toast_message("Round two").unwrap();
        store
            .adjust_character_health(CharacterNumber::new(1), HealthChange::Relative(-1))
            .unwrap();

        let indices: Vec<i64> = sink.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![11, 12, 13]);
        assert_eq!(store.index(), 13);
    }

    #[test]
    fn toast_message_is_propagated() {
        let (store, sink) = seeded();
        let mutation = store.set_toast_message("Monsters: Adam").unwrap();
        assert_eq!(mutation.description, "Setting toast message to Monsters: Adam");
        assert_eq!(sink.last_payload()["toastMessage"], json!("Monsters: Adam"));
    }

    #[test]
    fn full_sink_keeps_the_change() {
        let mut sink = MockFrameSink::new();
        sink.expect_send().returning(|_| Err(SinkError::Full));
        let store = StateStore::new(Arc::new(sink), NameTable::default(), quiet_policy());
        store.reconcile(1, "", &document()).unwrap();

        let mutation = store.set_initiative(CharacterNumber::new(1), 50).unwrap();
        assert_eq!(mutation.index, 2);
        assert_eq!(store.roster().characters[0].initiative, Some(50));
    }

    #[test]
    fn aliases_come_from_name_table() {
        let sink = Arc::new(RecordingSink::default());
        let mut names = NameTable::default();
        names.monster_names.insert("Frost Demon".into(), "Frosty".into());
        let store = StateStore::new(sink, names, quiet_policy());
        store.reconcile(1, "", &document()).unwrap();

        let roster = store.roster();
        assert_eq!(roster.monsters[0].alias.as_deref(), Some("Frosty"));
        assert_eq!(roster.monsters[0].call_sign, Some("Adam"));
        assert!(!store.snapshot().unwrap().contains("Frosty"));
    }

    #[test]
    fn concurrent_mutations_keep_frames_in_order() {
        let (store, sink) = seeded();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.set_initiative(CharacterNumber::new(1), i).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let indices: Vec<i64> = sink.frames().iter().map(|f| f.index).collect();
        assert_eq!(indices, (11..19).collect::<Vec<_>>());
    }
}
