//! In-memory population source.
//!
//! # Invariants
//! - Descriptors are streamed in registration order.
//! - An unregistered `(parent, type)` pair enumerates no members.

use crate::source::{MemberDescriptor, MemberSink, PopulationRequest, PopulationSource, SourceError};
use crate::urn::Urn;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

type CatalogSlot = (String, String);

/// Source backed by descriptors registered per parent path and type name.
///
/// Registration goes through `&self` so one catalog can be shared with the
/// collections it feeds and still be edited between population passes.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    members: RefCell<BTreeMap<CatalogSlot, Vec<MemberDescriptor>>>,
    invocations: Cell<usize>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every descriptor registered under `parent`/`type_name`.
    pub fn set_members(&self, parent: &Urn, type_name: &str, descriptors: Vec<MemberDescriptor>) {
        self.members
            .borrow_mut()
            .insert(slot(parent, type_name), descriptors);
    }

    /// Appends one descriptor under `parent`/`type_name`.
    pub fn push_member(&self, parent: &Urn, type_name: &str, descriptor: MemberDescriptor) {
        self.members
            .borrow_mut()
            .entry(slot(parent, type_name))
            .or_default()
            .push(descriptor);
    }

    /// Total number of population passes served.
    pub fn invocations(&self) -> usize {
        self.invocations.get()
    }
}

impl PopulationSource for MemoryCatalog {
    fn populate(
        &self,
        request: &PopulationRequest<'_>,
        sink: &mut dyn MemberSink,
    ) -> Result<(), SourceError> {
        self.invocations.set(self.invocations.get() + 1);

        let descriptors = self
            .members
            .borrow()
            .get(&slot(request.parent, request.type_name))
            .cloned()
            .unwrap_or_default();
        for descriptor in descriptors {
            sink.add_existing(descriptor)?;
        }
        Ok(())
    }
}

fn slot(parent: &Urn, type_name: &str) -> CatalogSlot {
    (parent.to_string(), type_name.to_string())
}
