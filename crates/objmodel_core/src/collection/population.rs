//! Staging and reconciliation for one population pass.

use crate::collection::{CollectionContext, CollectionSchema};
use crate::config::StringComparer;
use crate::error::CollectionError;
use crate::key::{ObjectComparer, ObjectKey};
use crate::source::{MemberDescriptor, MemberSink, SourceError};
use crate::storage::KeyedStorage;
use log::debug;
use std::cmp::Ordering;

/// Storage shape of one schema's collection.
pub(super) type SchemaStorage<S> = KeyedStorage<
    <S as CollectionSchema>::Key,
    <S as CollectionSchema>::Member,
    <S as CollectionSchema>::Comparer,
>;

/// Collects one pass into fresh storage so a failed pass never touches the
/// collection's current contents.
pub(super) struct StagingSink<'c, S: CollectionSchema> {
    context: &'c CollectionContext,
    staged: SchemaStorage<S>,
    rejection: Option<String>,
}

impl<'c, S: CollectionSchema> StagingSink<'c, S> {
    pub(super) fn new(context: &'c CollectionContext) -> Self {
        Self {
            context,
            staged: KeyedStorage::new(S::Comparer::from(*context.comparer())),
            rejection: None,
        }
    }

    /// Resolves the pass. The source outcome wins; a rejection the source
    /// swallowed still fails the pass.
    pub(super) fn finish(
        self,
        outcome: Result<(), SourceError>,
    ) -> Result<SchemaStorage<S>, SourceError> {
        match (outcome, self.rejection) {
            (Err(cause), _) => Err(cause),
            (Ok(()), Some(message)) => Err(SourceError::IgnoredRejection(message)),
            (Ok(()), None) => Ok(self.staged),
        }
    }

    fn stage(&mut self, descriptor: MemberDescriptor) -> Result<(), CollectionError> {
        let key = S::key_from_descriptor(&descriptor)?;
        if key.is_null() {
            return Err(CollectionError::InvalidKey(key.to_string()));
        }
        if self.staged.contains_key(&key) {
            return Err(CollectionError::DuplicateKey(key.to_string()));
        }
        let member = S::create_member(self.context, key.clone(), descriptor)?;
        self.staged.insert(key, member)
    }
}

impl<S: CollectionSchema> MemberSink for StagingSink<'_, S> {
    fn add_existing(&mut self, descriptor: MemberDescriptor) -> Result<(), CollectionError> {
        let result = self.stage(descriptor);
        if let Err(err) = &result {
            if self.rejection.is_none() {
                self.rejection = Some(err.to_string());
            }
        }
        result
    }
}

/// Merges a successful pass into the previously held members.
///
/// Members seen again go through `S::reconcile` and new members are added.
/// Held members the pass no longer reports stay only when
/// `S::retain_unreported` says so. Both inputs share one comparer, so a
/// single ordered walk suffices.
pub(super) fn reconcile<S: CollectionSchema>(
    previous: SchemaStorage<S>,
    discovered: SchemaStorage<S>,
    strings: StringComparer,
) -> SchemaStorage<S> {
    if previous.is_empty() {
        return discovered;
    }

    let comparer = S::Comparer::from(strings);
    let mut previous = previous.into_entries().into_iter().peekable();
    let mut merged = Vec::new();
    let mut kept = 0usize;
    let mut retained = 0usize;
    let mut dropped = 0usize;

    for (key, fresh) in discovered.into_entries() {
        while let Some(entry) =
            previous.next_if(|(old_key, _)| comparer.compare(old_key, &key) == Ordering::Less)
        {
            if carry_unreported::<S>(entry, &mut merged) {
                retained += 1;
            } else {
                dropped += 1;
            }
        }

        match previous.next_if(|(old_key, _)| comparer.equals(old_key, &key)) {
            Some((_, existing)) => {
                kept += 1;
                // Stored under the survivor's key, not the rediscovered spelling.
                let member = S::reconcile(existing, fresh);
                merged.push((S::key_of(&member).clone(), member));
            }
            None => merged.push((key, fresh)),
        }
    }
    for entry in previous {
        if carry_unreported::<S>(entry, &mut merged) {
            retained += 1;
        } else {
            dropped += 1;
        }
    }

    debug!(
        "event=collection_reconcile module=collection status=ok type={} kept={} \
         retained={} dropped={} total={}",
        S::TYPE_NAME,
        kept,
        retained,
        dropped,
        merged.len()
    );
    KeyedStorage::from_sorted_entries(comparer, merged)
}

fn carry_unreported<S: CollectionSchema>(
    entry: (S::Key, S::Member),
    merged: &mut Vec<(S::Key, S::Member)>,
) -> bool {
    if !S::retain_unreported(&entry.1) {
        return false;
    }
    merged.push(entry);
    true
}

#[cfg(test)]
mod tests {
    use super::{reconcile, StagingSink};
    use crate::collection::{CollectionContext, CollectionSchema};
    use crate::config::StringComparer;
    use crate::error::{CollectionError, CollectionResult};
    use crate::key::{KeyComparer, ObjectKey, SimpleObjectKey};
    use crate::source::{MemberDescriptor, MemberSink, MemoryCatalog, SourceError};
    use crate::storage::KeyedStorage;
    use crate::urn::Urn;
    use std::rc::Rc;

    #[derive(Debug)]
    struct Tagged {
        key: SimpleObjectKey,
        generation: u32,
    }

    struct TaggedSchema;

    impl CollectionSchema for TaggedSchema {
        type Key = SimpleObjectKey;
        type Member = Tagged;
        type Comparer = KeyComparer;

        const TYPE_NAME: &'static str = "Tagged";

        fn key_of(member: &Tagged) -> &SimpleObjectKey {
            &member.key
        }

        fn create_member(
            _context: &CollectionContext,
            key: SimpleObjectKey,
            descriptor: MemberDescriptor,
        ) -> CollectionResult<Tagged> {
            let generation = descriptor.number("Generation").unwrap_or(0) as u32;
            Ok(Tagged { key, generation })
        }

        // Generation 0 marks a member that only exists locally.
        fn retain_unreported(member: &Tagged) -> bool {
            member.generation == 0
        }
    }

    fn storage(members: &[(&str, u32)]) -> KeyedStorage<SimpleObjectKey, Tagged> {
        let mut storage = KeyedStorage::new(KeyComparer::new(StringComparer::case_insensitive()));
        for (name, generation) in members {
            let key = SimpleObjectKey::new(*name);
            storage
                .insert(
                    key.clone(),
                    Tagged {
                        key,
                        generation: *generation,
                    },
                )
                .expect("insert");
        }
        storage
    }

    fn context() -> CollectionContext {
        CollectionContext::new(
            Urn::parse("Server").expect("urn"),
            StringComparer::case_insensitive(),
            Rc::new(MemoryCatalog::new()),
        )
    }

    #[test]
    fn reconcile_keeps_held_members_and_drops_vanished_ones() {
        let previous = storage(&[("alpha", 1), ("beta", 1), ("delta", 1)]);
        let discovered = storage(&[("ALPHA", 2), ("charlie", 2), ("delta", 2)]);

        let merged = reconcile::<TaggedSchema>(
            previous,
            discovered,
            StringComparer::case_insensitive(),
        );

        let summary: Vec<(&str, u32)> = merged
            .entries()
            .map(|(key, member)| (key.name(), member.generation))
            .collect();
        assert_eq!(summary, vec![("alpha", 1), ("charlie", 2), ("delta", 1)]);
    }

    #[test]
    fn reconcile_retains_unreported_members_the_schema_keeps() {
        let previous = storage(&[("aaa", 0), ("bbb", 1), ("mmm", 0), ("zzz", 0)]);
        let discovered = storage(&[("ccc", 2), ("nnn", 2)]);

        let merged = reconcile::<TaggedSchema>(
            previous,
            discovered,
            StringComparer::case_insensitive(),
        );

        let names: Vec<&str> = merged.keys().map(|key| key.name()).collect();
        assert_eq!(names, vec!["aaa", "ccc", "mmm", "nnn", "zzz"]);
    }

    #[test]
    fn reconcile_into_empty_storage_takes_the_discovered_pass() {
        let merged = reconcile::<TaggedSchema>(
            storage(&[]),
            storage(&[("x", 3)]),
            StringComparer::case_insensitive(),
        );
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged
                .lookup(&SimpleObjectKey::new("X"))
                .expect("present")
                .generation,
            3
        );
    }

    #[test]
    fn staging_rejects_null_and_duplicate_keys() {
        let context = context();
        let mut sink = StagingSink::<TaggedSchema>::new(&context);

        sink.add_existing(MemberDescriptor::new().with("Name", "one"))
            .expect("first member");
        assert!(matches!(
            sink.add_existing(MemberDescriptor::new().with("Name", "ONE")),
            Err(CollectionError::DuplicateKey(_))
        ));
        assert!(matches!(
            sink.add_existing(MemberDescriptor::new().with("Name", "")),
            Err(CollectionError::InvalidKey(_))
        ));

        assert!(matches!(
            sink.finish(Ok(())),
            Err(SourceError::IgnoredRejection(_))
        ));
    }

    #[test]
    fn staging_source_error_wins_over_rejection() {
        let context = context();
        let mut sink = StagingSink::<TaggedSchema>::new(&context);
        let _ = sink.add_existing(MemberDescriptor::new());

        let outcome = Err(SourceError::UnsupportedType("Tagged".to_string()));
        assert!(matches!(
            sink.finish(outcome),
            Err(SourceError::UnsupportedType(_))
        ));
    }

    #[test]
    fn clean_pass_yields_sorted_members() {
        let context = context();
        let mut sink = StagingSink::<TaggedSchema>::new(&context);
        for name in ["b", "A", "c"] {
            sink.add_existing(MemberDescriptor::new().with("Name", name))
                .expect("stage");
        }

        let staged = sink.finish(Ok(())).expect("clean pass");
        let names: Vec<&str> = staged.keys().map(|key| key.name()).collect();
        assert_eq!(names, vec!["A", "b", "c"]);
        assert!(staged.keys().all(|key| !key.is_null()));
    }
}
