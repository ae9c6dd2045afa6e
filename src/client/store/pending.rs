use std::collections::BTreeMap;

/// Handle for one in-flight optimistic edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Create,
    Update,
    Delete,
}

/// What a store changed locally before the server answered.
#[derive(Debug, Clone)]
pub struct PendingOp<V> {
    pub id: OpId,
    pub key: String,
    pub kind: OpKind,
    /// Value under `key` before the edit; `None` if the key was absent.
    pub previous: Option<V>,
}

impl<V> PendingOp<V> {
    /// Puts `map` back the way it was before this edit.
    pub fn restore_into(self, map: &mut BTreeMap<String, V>) {
        match self.previous {
            Some(previous) => {
                map.insert(self.key, previous);
            }
            None => {
                map.remove(&self.key);
            }
        }
    }
}

/// Two-phase log of optimistic edits.
///
/// A store calls [`begin`](Self::begin) with the previous value before
/// touching its map, then either [`commit`](Self::commit) once the server
/// confirms or [`rollback`](Self::rollback) and restore on failure.
#[derive(Debug)]
pub struct PendingLog<V> {
    next_id: u64,
    ops: Vec<PendingOp<V>>,
}

impl<V> Default for PendingLog<V> {
    fn default() -> Self {
        Self {
            next_id: 1,
            ops: Vec::new(),
        }
    }
}

impl<V> PendingLog<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, key: impl Into<String>, kind: OpKind, previous: Option<V>) -> OpId {
        let id = OpId(self.next_id);
        self.next_id += 1;
        self.ops.push(PendingOp {
            id,
            key: key.into(),
            kind,
            previous,
        });
        id
    }

    pub fn commit(&mut self, id: OpId) -> Option<PendingOp<V>> {
        self.take(id)
    }

    /// Removes the op so the caller can restore from it.
    pub fn rollback(&mut self, id: OpId) -> Option<PendingOp<V>> {
        self.take(id)
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.ops.iter().any(|op| op.key == key)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingOp<V>> {
        self.ops.iter()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }

    fn take(&mut self, id: OpId) -> Option<PendingOp<V>> {
        let index = self.ops.iter().position(|op| op.id == id)?;
        Some(self.ops.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rollback_of_create_removes_the_key() {
        let mut map = BTreeMap::new();
        let mut log = PendingLog::new();

        let op = log.begin("a", OpKind::Create, None);
        map.insert("a".to_string(), 1);
        assert!(log.is_pending("a"));

        log.rollback(op).unwrap().restore_into(&mut map);
        assert!(map.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn rollback_of_update_restores_previous() {
        let mut map = BTreeMap::from([("a".to_string(), 1)]);
        let mut log = PendingLog::new();

        let op = log.begin("a", OpKind::Update, map.get("a").copied());
        map.insert("a".to_string(), 2);

        log.rollback(op).unwrap().restore_into(&mut map);
        assert_eq!(map["a"], 1);
    }

    #[test]
    fn commit_only_drops_its_own_op() {
        let mut log: PendingLog<i32> = PendingLog::new();
        let first = log.begin("a", OpKind::Delete, Some(1));
        let second = log.begin("b", OpKind::Update, Some(2));
        assert_ne!(first, second);

        let committed = log.commit(first).unwrap();
        assert_eq!(committed.kind, OpKind::Delete);
        assert_eq!(log.len(), 1);
        assert!(log.is_pending("b"));
        assert!(log.commit(first).is_none());
    }
}
