use crate::ice::IceSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;

/// Holds the most recent [`IceSnapshot`].
///
/// Snapshots are swapped as a whole behind an `Arc`, so readers only hold the lock for a
/// pointer clone and never observe a partially built list.
#[derive(Debug, Default)]
pub struct IceServerCache {
    current: RwLock<Option<Arc<IceSnapshot>>>,
}

impl IceServerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<Arc<IceSnapshot>> {
        self.current.read().clone()
    }

    pub fn replace(&self, snapshot: IceSnapshot) -> Arc<IceSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Some(snapshot.clone());
        snapshot
    }

    pub fn is_empty(&self) -> bool {
        self.current.read().is_none()
    }
}
