use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use parking_lot::RwLock;

use crate::{Resource, ResourceGraph, ResourceId, Transaction, WebacGraphError};

type Entries = BTreeMap<ResourceId, Resource>;

/// A trivial implementation of [ResourceGraph] - backed by a [BTreeMap] - where
/// all resources are kept in memory and never persisted. Writes may be staged
/// in a [Transaction], in which case only reads carrying that transaction
/// observe them until [MemoryResourceGraph::commit] is called.
#[derive(Clone, Default)]
pub struct MemoryResourceGraph {
    committed: Arc<RwLock<Entries>>,
    staged: Arc<RwLock<HashMap<Transaction, BTreeMap<ResourceId, Option<Resource>>>>>,
    reads: Arc<AtomicUsize>,
}

impl MemoryResourceGraph {
    /// Store (or replace) a committed resource.
    pub fn insert(&self, resource: Resource) {
        self.committed
            .write()
            .insert(resource.id().clone(), resource);
    }

    /// Delete a committed resource.
    pub fn remove(&self, id: &ResourceId) -> Option<Resource> {
        self.committed.write().remove(id)
    }

    /// Stage a resource write inside `transaction`.
    pub fn insert_in(&self, transaction: &Transaction, resource: Resource) {
        self.staged
            .write()
            .entry(transaction.clone())
            .or_default()
            .insert(resource.id().clone(), Some(resource));
    }

    /// Stage a resource deletion inside `transaction`.
    pub fn remove_in(&self, transaction: &Transaction, id: &ResourceId) {
        self.staged
            .write()
            .entry(transaction.clone())
            .or_default()
            .insert(id.clone(), None);
    }

    /// Apply everything staged in `transaction` to the committed graph.
    pub fn commit(&self, transaction: &Transaction) {
        let Some(staged) = self.staged.write().remove(transaction) else {
            return;
        };
        let mut committed = self.committed.write();
        for (id, resource) in staged {
            match resource {
                Some(resource) => committed.insert(id, resource),
                None => committed.remove(&id),
            };
        }
    }

    /// The number of [ResourceGraph::resource] calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn view(&self, transaction: Option<&Transaction>) -> Entries {
        let mut view = self.committed.read().clone();
        if let Some(staged) = transaction.and_then(|tx| self.staged.read().get(tx).cloned()) {
            for (id, resource) in staged {
                match resource {
                    Some(resource) => view.insert(id, resource),
                    None => view.remove(&id),
                };
            }
        }
        view
    }
}

impl ResourceGraph for MemoryResourceGraph {
    fn resource(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Resource, WebacGraphError> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(staged) = transaction.and_then(|tx| {
            self.staged
                .read()
                .get(tx)
                .and_then(|entries| entries.get(id).cloned())
        }) {
            return staged.ok_or_else(|| WebacGraphError::NotFound(id.to_string()));
        }

        self.committed
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| WebacGraphError::NotFound(id.to_string()))
    }

    fn children(
        &self,
        transaction: Option<&Transaction>,
        id: &ResourceId,
    ) -> Result<Vec<ResourceId>, WebacGraphError> {
        Ok(self
            .view(transaction)
            .into_values()
            .filter(|resource| resource.container() == Some(id))
            .map(|resource| resource.id().clone())
            .collect())
    }
}
