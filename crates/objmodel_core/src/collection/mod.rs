//! Generic keyed collection engine.
//!
//! # Responsibility
//! - Own one `KeyedStorage` and mediate lazy population from a source.
//! - Track `Uninitialized -> Populating -> Initialized` and the orthogonal
//!   dirty flag.
//! - Expose the lookup/removal contract every typed collection shares.
//!
//! # Invariants
//! - `get*`, `count`, `iter` and `cursor` may populate; `peek*` never do.
//! - A failed population leaves the previous contents untouched and the
//!   state `Uninitialized`; retrying is safe.
//! - A successful full population resets `is_dirty` to `false`.
//! - Once initialized, traversal follows the comparer's order regardless of
//!   discovery order.

mod population;

use crate::config::StringComparer;
use crate::error::{CollectionError, CollectionResult};
use crate::key::{ObjectComparer, ObjectKey};
use crate::source::{MemberDescriptor, PopulationRequest, PopulationSource};
use crate::storage::{Cursor, KeyedStorage, Members};
use crate::urn::{Urn, UrnSegment};
use log::{debug, error, info};
use population::StagingSink;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;
use std::time::Instant;

/// Per-entity-type configuration binding the engine to one member type.
pub trait CollectionSchema {
    type Key: ObjectKey;
    type Member;
    /// Orders this type's keys; built from the parent's string policy.
    type Comparer: ObjectComparer<Self::Key> + From<StringComparer>;

    /// Member type name as used in path segments (`Table`, `Login`, ...).
    const TYPE_NAME: &'static str;

    /// Identity of an already constructed member.
    fn key_of(member: &Self::Member) -> &Self::Key;

    /// Builds a member from a discovered descriptor.
    fn create_member(
        context: &CollectionContext,
        key: Self::Key,
        descriptor: MemberDescriptor,
    ) -> CollectionResult<Self::Member>;

    /// Key constructor used during population.
    fn key_from_descriptor(descriptor: &MemberDescriptor) -> CollectionResult<Self::Key> {
        Self::Key::from_attributes(descriptor.attributes())
    }

    /// Turns a path's trailing segment into a key of this type.
    fn key_from_path(segment: &UrnSegment) -> CollectionResult<Self::Key> {
        if segment.type_name() != Self::TYPE_NAME {
            return Err(CollectionError::MalformedKey(format!(
                "segment `{}` does not address a `{}`",
                segment.type_name(),
                Self::TYPE_NAME
            )));
        }
        Self::Key::from_path_expression(segment)
    }

    /// Decides which object survives when a re-population discovers a member
    /// that is already held. Keeps the held object by default.
    fn reconcile(existing: Self::Member, _discovered: Self::Member) -> Self::Member {
        existing
    }

    /// Decides whether a held member the source no longer reports is kept.
    /// Drops it by default.
    fn retain_unreported(_member: &Self::Member) -> bool {
        false
    }
}

/// Construction-time configuration handed down by the parent entity.
#[derive(Clone)]
pub struct CollectionContext {
    parent: Urn,
    comparer: StringComparer,
    source: Rc<dyn PopulationSource>,
}

impl CollectionContext {
    pub fn new(parent: Urn, comparer: StringComparer, source: Rc<dyn PopulationSource>) -> Self {
        Self {
            parent,
            comparer,
            source,
        }
    }

    /// Path of the owning parent entity.
    pub fn parent(&self) -> &Urn {
        &self.parent
    }

    pub fn comparer(&self) -> &StringComparer {
        &self.comparer
    }

    pub fn source(&self) -> &Rc<dyn PopulationSource> {
        &self.source
    }

    /// Context for collections owned by a member living at `member_urn`.
    pub fn for_child(&self, member_urn: Urn) -> Self {
        Self {
            parent: member_urn,
            comparer: self.comparer,
            source: Rc::clone(&self.source),
        }
    }
}

impl Debug for CollectionContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionContext")
            .field("parent", &self.parent.to_string())
            .field("comparer", &self.comparer)
            .finish_non_exhaustive()
    }
}

/// Population lifecycle of one collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionState {
    Uninitialized,
    Populating,
    Initialized,
}

/// Lazily populated, key-ordered collection of one member type.
pub struct ObjectCollection<S: CollectionSchema> {
    context: CollectionContext,
    storage: KeyedStorage<S::Key, S::Member, S::Comparer>,
    state: CollectionState,
    dirty: bool,
}

impl<S: CollectionSchema> ObjectCollection<S> {
    /// Creates an empty, uninitialized collection.
    pub fn new(context: CollectionContext) -> Self {
        let storage = KeyedStorage::new(S::Comparer::from(context.comparer));
        Self {
            context,
            storage,
            state: CollectionState::Uninitialized,
            dirty: false,
        }
    }

    pub fn context(&self) -> &CollectionContext {
        &self.context
    }

    pub fn parent(&self) -> &Urn {
        &self.context.parent
    }

    pub fn type_name(&self) -> &'static str {
        S::TYPE_NAME
    }

    pub fn state(&self) -> CollectionState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == CollectionState::Initialized
    }

    /// True when a member was removed since the last full population.
    ///
    /// What a caller does about it is owner-defined; the engine only sets it
    /// on removal and clears it after a successful population.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Populates from the source unless already initialized.
    pub fn ensure_populated(&mut self) -> CollectionResult<()> {
        if self.is_initialized() {
            return Ok(());
        }
        self.populate()
    }

    /// Returns the member stored under `key`, populating first if needed.
    pub fn get(&mut self, key: &S::Key) -> CollectionResult<&S::Member> {
        self.ensure_populated()?;
        self.storage.lookup(key)
    }

    pub fn get_mut(&mut self, key: &S::Key) -> CollectionResult<&mut S::Member> {
        self.ensure_populated()?;
        self.storage.lookup_mut(key)
    }

    /// Populates if needed, then looks up without failing on absence.
    ///
    /// Population failures still surface as errors; only "not found" is
    /// turned into `None`.
    pub fn no_fault_get(&mut self, key: &S::Key) -> CollectionResult<Option<&S::Member>> {
        self.ensure_populated()?;
        Ok(self.storage.try_lookup(key))
    }

    /// Returns the member at `index` in comparer order.
    pub fn get_by_index(&mut self, index: usize) -> CollectionResult<&S::Member> {
        self.ensure_populated()?;
        self.storage.by_position(index)
    }

    pub fn contains(&mut self, key: &S::Key) -> CollectionResult<bool> {
        self.ensure_populated()?;
        Ok(self.storage.contains_key(key))
    }

    pub fn count(&mut self) -> CollectionResult<usize> {
        self.ensure_populated()?;
        Ok(self.storage.len())
    }

    /// Same as `count`; the name signals the eager-population contract.
    pub fn no_fault_count(&mut self) -> CollectionResult<usize> {
        self.count()
    }

    /// Members in comparer order, populating first if needed.
    pub fn iter(&mut self) -> CollectionResult<Members<'_, S::Key, S::Member>> {
        self.ensure_populated()?;
        Ok(self.storage.iter())
    }

    pub fn keys(&mut self) -> CollectionResult<impl Iterator<Item = &S::Key> + '_> {
        self.ensure_populated()?;
        Ok(self.storage.keys())
    }

    /// Starts a detached traversal; see `next_member`.
    pub fn cursor(&mut self) -> CollectionResult<Cursor> {
        self.ensure_populated()?;
        Ok(self.storage.cursor())
    }

    /// Advances a detached traversal.
    ///
    /// # Errors
    /// - `ForeignCursor` when `cursor` came from another collection.
    /// - `ConcurrentModification` when members were added or removed since
    ///   `cursor` was taken.
    pub fn next_member(&self, cursor: &mut Cursor) -> CollectionResult<Option<&S::Member>> {
        self.storage.advance(cursor)
    }

    /// Looks up loaded members only; never populates.
    pub fn peek(&self, key: &S::Key) -> Option<&S::Member> {
        self.storage.try_lookup(key)
    }

    pub fn peek_by_index(&self, index: usize) -> Option<&S::Member> {
        self.storage.by_position(index).ok()
    }

    pub fn peek_count(&self) -> usize {
        self.storage.len()
    }

    pub fn peek_iter(&self) -> Members<'_, S::Key, S::Member> {
        self.storage.iter()
    }

    /// Adds a locally created member after making sure the existing members
    /// are loaded, so collisions with server-side objects are detected.
    ///
    /// # Errors
    /// - `InvalidKey` for a null key, `DuplicateKey` on collision.
    pub fn add_new(&mut self, member: S::Member) -> CollectionResult<&S::Member> {
        self.ensure_populated()?;
        let key = S::key_of(&member).clone();
        self.storage.insert(key.clone(), member)?;
        debug!(
            "event=collection_add module=collection status=ok type={} count={}",
            S::TYPE_NAME,
            self.storage.len()
        );
        self.storage.lookup(&key)
    }

    /// Removes one member from the loaded contents and marks the collection
    /// dirty. Does not populate and does not change the initialized state.
    pub fn remove_object(&mut self, key: &S::Key) -> CollectionResult<S::Member> {
        let member = self.storage.remove(key)?;
        self.dirty = true;
        debug!(
            "event=collection_remove module=collection status=ok type={} count={}",
            S::TYPE_NAME,
            self.storage.len()
        );
        Ok(member)
    }

    /// Invalidates cached members. Contents are kept; the next populating
    /// operation re-invokes the source and reconciles.
    pub fn mark_out_of_sync(&mut self) {
        if self.state != CollectionState::Uninitialized {
            info!(
                "event=collection_invalidate module=collection status=ok type={} count={}",
                S::TYPE_NAME,
                self.storage.len()
            );
        }
        self.state = CollectionState::Uninitialized;
    }

    /// Forces a fresh population pass.
    pub fn refresh(&mut self) -> CollectionResult<()> {
        self.mark_out_of_sync();
        self.populate()
    }

    /// Drops every member and returns to the freshly constructed state.
    pub fn reset(&mut self) {
        self.storage.clear();
        self.state = CollectionState::Uninitialized;
        self.dirty = false;
    }

    /// Builds a key from a full path; its trailing segment must address
    /// this collection's member type.
    pub fn key_from_urn(&self, urn: &Urn) -> CollectionResult<S::Key> {
        S::key_from_path(urn.last())
    }

    /// Path of the member identified by `key`.
    pub fn urn_for(&self, key: &S::Key) -> Urn {
        self.context.parent.child(S::TYPE_NAME, key.attributes())
    }

    fn populate(&mut self) -> CollectionResult<()> {
        let started_at = Instant::now();
        self.state = CollectionState::Populating;
        info!(
            "event=collection_populate module=collection status=start type={}",
            S::TYPE_NAME
        );

        let mut sink = StagingSink::<S>::new(&self.context);
        let request = PopulationRequest {
            parent: &self.context.parent,
            type_name: S::TYPE_NAME,
        };
        let outcome = self.context.source.populate(&request, &mut sink);

        let staged = match sink.finish(outcome) {
            Ok(staged) => staged,
            Err(cause) => {
                self.state = CollectionState::Uninitialized;
                let err = CollectionError::Population {
                    type_name: S::TYPE_NAME,
                    parent: self.context.parent.to_string(),
                    cause,
                };
                error!(
                    "event=collection_populate module=collection status=error type={} \
                     duration_ms={} error_code={} error={}",
                    S::TYPE_NAME,
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                return Err(err);
            }
        };

        let discovered = staged.len();
        let previous = std::mem::replace(
            &mut self.storage,
            KeyedStorage::new(S::Comparer::from(self.context.comparer)),
        );
        let previous_count = previous.len();
        let (previous_id, previous_version) = (previous.id(), previous.version());
        self.storage = population::reconcile::<S>(previous, staged, self.context.comparer);
        self.storage.continue_from(previous_id, previous_version);
        self.state = CollectionState::Initialized;
        self.dirty = false;

        info!(
            "event=collection_populate module=collection status=ok type={} members={} \
             previous={} duration_ms={}",
            S::TYPE_NAME,
            discovered,
            previous_count,
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl<S: CollectionSchema> Debug for ObjectCollection<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCollection")
            .field("type_name", &S::TYPE_NAME)
            .field("parent", &self.context.parent.to_string())
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .field("count", &self.storage.len())
            .finish()
    }
}
