//! Versioned, observable record list with optimistic mutations.
//!
//! Every change bumps `version` and is published through a `watch` channel,
//! so all subscribers converge on the same snapshot. Optimistic changes are
//! tracked per mutation: `apply_*` makes the change visible immediately and
//! remembers what it replaced, `commit` makes it final, `rollback` puts the
//! prior value back unless a later mutation has touched the same record.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

pub trait Record: Clone + Send + Sync + 'static {
    fn key(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub version: u64,
    /// False until the first full fetch lands.
    pub loaded: bool,
    pub items: Arc<Vec<T>>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            version: 0,
            loaded: false,
            items: Arc::new(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MutationId(Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationState {
    Pending,
    Committed,
    RolledBack,
}

enum Prior<T> {
    Absent,
    Present { item: T, index: usize },
}

struct PendingMutation<T> {
    key: String,
    prior: Prior<T>,
}

struct Ledger<T> {
    pending: HashMap<MutationId, PendingMutation<T>>,
    /// Most recent mutation per record key.
    latest: HashMap<String, MutationId>,
}

pub struct Collection<T: Record> {
    tx: watch::Sender<Snapshot<T>>,
    ledger: Mutex<Ledger<T>>,
}

impl<T: Record> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Collection<T> {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Snapshot::default());
        Self {
            tx,
            ledger: Mutex::new(Ledger {
                pending: HashMap::new(),
                latest: HashMap::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub fn items(&self) -> Arc<Vec<T>> {
        self.tx.borrow().items.clone()
    }

    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.tx.borrow().items.iter().find(|i| i.key() == key).cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }

    pub fn stream(&self) -> WatchStream<Snapshot<T>> {
        WatchStream::new(self.tx.subscribe())
    }

    pub fn pending_count(&self) -> usize {
        self.ledger.lock().pending.len()
    }

    pub fn is_pending(&self, id: MutationId) -> bool {
        self.ledger.lock().pending.contains_key(&id)
    }

    fn publish(&self, loaded: Option<bool>, f: impl FnOnce(&mut Vec<T>)) {
        self.tx.send_modify(|snap| {
            f(Arc::make_mut(&mut snap.items));
            snap.version += 1;
            if let Some(loaded) = loaded {
                snap.loaded = loaded;
            }
        });
    }

    /// Installs a full server listing. Records with a pending mutation keep
    /// their local value, so a refresh that raced a local edit cannot undo it.
    pub fn replace_all(&self, fresh: Vec<T>) {
        let ledger = self.ledger.lock();
        let pending_keys: Vec<&String> = ledger.pending.values().map(|p| &p.key).collect();
        if pending_keys.is_empty() {
            self.publish(Some(true), |items| *items = fresh);
            return;
        }

        let current = self.items();
        let local: HashMap<&str, Option<&T>> = pending_keys
            .iter()
            .map(|k| (k.as_str(), current.iter().find(|i| i.key() == k.as_str())))
            .collect();

        let mut merged: Vec<T> = Vec::with_capacity(fresh.len());
        for item in fresh {
            match local.get(item.key()) {
                Some(Some(mine)) => merged.push((*mine).clone()),
                Some(None) => {}
                None => merged.push(item),
            }
        }
        for mine in local.values().flatten() {
            if !merged.iter().any(|i| i.key() == mine.key()) {
                merged.push((*mine).clone());
            }
        }
        self.publish(Some(true), |items| *items = merged);
    }

    /// Merges one fetched record unless it has a mutation in flight.
    pub fn merge(&self, item: T) -> bool {
        let ledger = self.ledger.lock();
        if ledger.pending.values().any(|p| p.key == item.key()) {
            return false;
        }
        self.publish(None, |items| match items.iter().position(|i| i.key() == item.key()) {
            Some(idx) => items[idx] = item,
            None => items.push(item),
        });
        true
    }

    /// Non-optimistic in-place edit; returns false when the key is unknown.
    pub fn modify_local(&self, key: &str, f: impl FnOnce(&mut T)) -> bool {
        if self.get(key).is_none() {
            return false;
        }
        self.publish(None, |items| {
            if let Some(item) = items.iter_mut().find(|i| i.key() == key) {
                f(item);
            }
        });
        true
    }

    pub fn clear(&self) {
        let mut ledger = self.ledger.lock();
        ledger.pending.clear();
        ledger.latest.clear();
        self.publish(Some(false), |items| items.clear());
    }

    fn track(ledger: &mut Ledger<T>, key: String, prior: Prior<T>) -> MutationId {
        let id = MutationId(Uuid::new_v4());
        ledger.latest.insert(key.clone(), id);
        ledger.pending.insert(id, PendingMutation { key, prior });
        id
    }

    pub fn apply_insert(&self, item: T) -> MutationId {
        let mut ledger = self.ledger.lock();
        let id = Self::track(&mut ledger, item.key().to_string(), Prior::Absent);
        self.publish(None, |items| items.push(item));
        id
    }

    /// `None` when no record has `key`.
    pub fn apply_update(&self, key: &str, f: impl FnOnce(&mut T)) -> Option<MutationId> {
        let mut ledger = self.ledger.lock();
        let current = self.items();
        let index = current.iter().position(|i| i.key() == key)?;
        let prior = Prior::Present {
            item: current[index].clone(),
            index,
        };
        drop(current);
        let id = Self::track(&mut ledger, key.to_string(), prior);
        self.publish(None, |items| {
            if let Some(item) = items.get_mut(index) {
                f(item);
            }
        });
        Some(id)
    }

    pub fn apply_remove(&self, key: &str) -> Option<MutationId> {
        let mut ledger = self.ledger.lock();
        let current = self.items();
        let index = current.iter().position(|i| i.key() == key)?;
        let prior = Prior::Present {
            item: current[index].clone(),
            index,
        };
        drop(current);
        let id = Self::track(&mut ledger, key.to_string(), prior);
        self.publish(None, |items| {
            items.remove(index);
        });
        Some(id)
    }

    /// Finalizes a mutation. `replacement` (the server's version of the
    /// record) takes the place of the optimistic value; an insert's
    /// placeholder key is swapped for the server key this way.
    pub fn commit(&self, id: MutationId, replacement: Option<T>) -> MutationState {
        let mut ledger = self.ledger.lock();
        let Some(pending) = ledger.pending.remove(&id) else {
            return MutationState::Committed;
        };
        let superseded = ledger.latest.get(&pending.key) != Some(&id);
        if !superseded {
            ledger.latest.remove(&pending.key);
        }
        if let Some(server) = replacement {
            let key = pending.key;
            // A later local edit of the same record wins over the server echo
            if superseded {
                return MutationState::Committed;
            }
            self.publish(None, |items| {
                let existing = items.iter().position(|i| i.key() == server.key());
                match items.iter().position(|i| i.key() == key) {
                    Some(idx) => {
                        items[idx] = server;
                        if let Some(dup) = existing.filter(|&d| d != idx) {
                            items.remove(dup);
                        }
                    }
                    None => {
                        if let Some(dup) = existing {
                            items[dup] = server;
                        }
                    }
                }
            });
        }
        MutationState::Committed
    }

    pub fn rollback(&self, id: MutationId) -> MutationState {
        let mut ledger = self.ledger.lock();
        let Some(pending) = ledger.pending.remove(&id) else {
            return MutationState::RolledBack;
        };
        if ledger.latest.get(&pending.key) != Some(&id) {
            log::debug!("not restoring '{}': superseded by a later change", pending.key);
            return MutationState::RolledBack;
        }
        ledger.latest.remove(&pending.key);
        let key = pending.key;
        self.publish(None, |items| {
            let at = items.iter().position(|i| i.key() == key);
            match (pending.prior, at) {
                (Prior::Absent, Some(idx)) => {
                    items.remove(idx);
                }
                (Prior::Absent, None) => {}
                (Prior::Present { item, .. }, Some(idx)) => items[idx] = item,
                (Prior::Present { item, index }, None) => {
                    let index = index.min(items.len());
                    items.insert(index, item);
                }
            }
        });
        MutationState::RolledBack
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: String,
        value: u32,
    }

    impl Record for Item {
        fn key(&self) -> &str {
            &self.id
        }
    }

    fn item(id: &str, value: u32) -> Item {
        Item {
            id: id.to_string(),
            value,
        }
    }

    fn seeded() -> Collection<Item> {
        let c = Collection::new();
        c.replace_all(vec![item("a", 1), item("b", 2), item("c", 3)]);
        c
    }

    #[test]
    fn replace_all_marks_loaded_and_bumps_version() {
        let c = Collection::<Item>::new();
        assert!(!c.snapshot().loaded);
        c.replace_all(vec![item("a", 1)]);
        let snap = c.snapshot();
        assert!(snap.loaded);
        assert_eq!(snap.version, 1);
        assert_eq!(snap.items.len(), 1);
    }

    #[test]
    fn committed_update_keeps_optimistic_value() {
        let c = seeded();
        let id = c.apply_update("b", |i| i.value = 20).unwrap();
        assert_eq!(c.get("b").unwrap().value, 20);
        assert!(c.is_pending(id));
        assert_eq!(c.commit(id, None), MutationState::Committed);
        assert_eq!(c.get("b").unwrap().value, 20);
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn rolled_back_update_restores_prior() {
        let c = seeded();
        let id = c.apply_update("b", |i| i.value = 20).unwrap();
        assert_eq!(c.rollback(id), MutationState::RolledBack);
        assert_eq!(c.get("b").unwrap().value, 2);
        assert_eq!(c.items().len(), 3);
    }

    #[test]
    fn rollback_of_superseded_mutation_keeps_newer_value() {
        let c = seeded();
        let first = c.apply_update("b", |i| i.value = 20).unwrap();
        let second = c.apply_update("b", |i| i.value = 200).unwrap();
        c.rollback(first);
        assert_eq!(c.get("b").unwrap().value, 200);
        c.commit(second, None);
        assert_eq!(c.get("b").unwrap().value, 200);
    }

    #[test]
    fn insert_commit_swaps_placeholder_for_server_record() {
        let c = seeded();
        let id = c.apply_insert(item("tmp-1", 9));
        assert_eq!(c.items().len(), 4);
        c.commit(id, Some(item("d", 9)));
        let keys: Vec<String> = c.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn insert_rollback_removes_placeholder() {
        let c = seeded();
        let id = c.apply_insert(item("tmp-1", 9));
        c.rollback(id);
        assert_eq!(c.items().len(), 3);
        assert!(c.get("tmp-1").is_none());
    }

    #[test]
    fn remove_rollback_reinserts_at_old_position() {
        let c = seeded();
        let id = c.apply_remove("b").unwrap();
        assert!(c.get("b").is_none());
        c.rollback(id);
        let keys: Vec<String> = c.items().iter().map(|i| i.id.clone()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_key_is_not_tracked() {
        let c = seeded();
        assert!(c.apply_update("zzz", |i| i.value = 0).is_none());
        assert!(c.apply_remove("zzz").is_none());
        assert_eq!(c.pending_count(), 0);
    }

    #[test]
    fn refresh_during_pending_update_keeps_local_edit() {
        let c = seeded();
        let id = c.apply_update("b", |i| i.value = 20).unwrap();
        c.replace_all(vec![item("a", 10), item("b", 2), item("c", 30)]);
        assert_eq!(c.get("a").unwrap().value, 10);
        assert_eq!(c.get("b").unwrap().value, 20);
        c.commit(id, None);
        assert_eq!(c.get("b").unwrap().value, 20);
    }

    #[test]
    fn refresh_during_pending_remove_and_insert() {
        let c = seeded();
        let removed = c.apply_remove("a").unwrap();
        let inserted = c.apply_insert(item("tmp", 7));
        c.replace_all(vec![item("a", 1), item("b", 2), item("c", 3)]);
        assert!(c.get("a").is_none());
        assert!(c.get("tmp").is_some());
        c.commit(removed, None);
        c.rollback(inserted);
        assert_eq!(c.items().len(), 2);
    }

    #[test]
    fn merge_skips_records_in_flight() {
        let c = seeded();
        let id = c.apply_update("a", |i| i.value = 5).unwrap();
        assert!(!c.merge(item("a", 1)));
        assert!(c.merge(item("z", 26)));
        c.commit(id, None);
        assert_eq!(c.get("a").unwrap().value, 5);
        assert_eq!(c.items().len(), 4);
    }

    #[tokio::test]
    async fn subscribers_see_every_change() {
        let c = seeded();
        let mut rx = c.subscribe();
        let before = rx.borrow_and_update().version;
        let id = c.apply_update("a", |i| i.value = 11).unwrap();
        rx.changed().await.unwrap();
        let snap = rx.borrow_and_update().clone();
        assert_eq!(snap.version, before + 1);
        assert_eq!(snap.items[0].value, 11);
        c.rollback(id);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().items[0].value, 1);
    }
}
