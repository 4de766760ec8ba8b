//! Per-entity record of active collision pairs.
//!
//! Every entity that takes part in collision detection gets a
//! [`CollisionLedger`] the first time it needs one. The ledger is keyed by
//! the *other* entity, so however many shapes on either side overlap, a
//! contact episode between two entities is exactly one [`CollisionRecord`].
//!
//! Ledgers are only mutated by
//! [`detect_collisions`](crate::systems::collision::detect_collisions) and
//! [`registry::destroy`](crate::registry::destroy).

use bevy_ecs::prelude::{Component, Entity};
use rustc_hash::FxHashMap;

/// Unordered entity pair with a canonical (sorted) representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityPair {
    first: Entity,
    second: Entity,
}

impl EntityPair {
    pub fn new(a: Entity, b: Entity) -> Self {
        if a <= b {
            Self {
                first: a,
                second: b,
            }
        } else {
            Self {
                first: b,
                second: a,
            }
        }
    }

    pub fn first(&self) -> Entity {
        self.first
    }

    pub fn second(&self) -> Entity {
        self.second
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.first == entity || self.second == entity
    }

    /// The member of the pair that is not `entity`.
    pub fn other(&self, entity: Entity) -> Option<Entity> {
        if self.first == entity {
            Some(self.second)
        } else if self.second == entity {
            Some(self.first)
        } else {
            None
        }
    }
}

/// One active overlap between two entities.
// TODO: carry contact points once the narrow phase reports them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionRecord {
    pub pair: EntityPair,
    /// Tick on which the pair started overlapping.
    pub since_tick: u64,
    /// Most recent tick on which the pair was confirmed.
    pub last_seen_tick: u64,
}

impl CollisionRecord {
    pub fn new(pair: EntityPair, tick: u64) -> Self {
        Self {
            pair,
            since_tick: tick,
            last_seen_tick: tick,
        }
    }

    /// Number of ticks the pair has been tracked, counting the entry tick.
    pub fn duration_ticks(&self) -> u64 {
        self.last_seen_tick - self.since_tick + 1
    }
}

/// Active collision records from the owning entity's point of view.
#[derive(Component, Clone, Debug, Default)]
pub struct CollisionLedger {
    records: FxHashMap<Entity, CollisionRecord>,
}

impl CollisionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, other: Entity) -> bool {
        self.records.contains_key(&other)
    }

    pub fn get(&self, other: Entity) -> Option<&CollisionRecord> {
        self.records.get(&other)
    }

    /// Open a record for `owner`/`other`. Returns false if one already exists,
    /// in which case the existing record is left untouched.
    pub fn open(&mut self, owner: Entity, other: Entity, tick: u64) -> bool {
        if self.records.contains_key(&other) {
            return false;
        }
        self.records
            .insert(other, CollisionRecord::new(EntityPair::new(owner, other), tick));
        true
    }

    /// Refresh the last-seen tick of an existing record.
    pub fn touch(&mut self, other: Entity, tick: u64) -> bool {
        match self.records.get_mut(&other) {
            Some(record) => {
                record.last_seen_tick = tick;
                true
            }
            None => false,
        }
    }

    pub fn close(&mut self, other: Entity) -> Option<CollisionRecord> {
        self.records.remove(&other)
    }

    /// Entities this ledger currently tracks a contact with.
    pub fn others(&self) -> impl Iterator<Item = Entity> + '_ {
        self.records.keys().copied()
    }

    pub fn records(&self) -> impl Iterator<Item = &CollisionRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
