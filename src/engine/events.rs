use std::sync::Arc;
use crate::FileInfo;

/// Handle returned on registration, used to unregister a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type RestoredFn = Arc<dyn Fn(&str, &serde_json::Value, &FileInfo) + Send + Sync>;
type DeletedFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Callbacks for catalog changes, one list per notification kind.
///
/// Listeners run synchronously, in registration order.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    restored: Vec<(ListenerId, RestoredFn)>,
    deleted: Vec<(ListenerId, DeletedFn)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_restored<F>(&mut self, f: F) -> ListenerId
    where
        F: Fn(&str, &serde_json::Value, &FileInfo) + Send + Sync + 'static,
    {
        let id = self.allocate();
        self.restored.push((id, Arc::new(f)));
        id
    }

    pub fn on_deleted<F>(&mut self, f: F) -> ListenerId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.allocate();
        self.deleted.push((id, Arc::new(f)));
        id
    }

    /// Unregisters a listener. Returns false if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.restored.len() + self.deleted.len();
        self.restored.retain(|(lid, _)| *lid != id);
        self.deleted.retain(|(lid, _)| *lid != id);
        before != self.restored.len() + self.deleted.len()
    }

    /// Snapshot of the `restored` callbacks, so they can run without holding a lock.
    pub fn restored(&self) -> Vec<RestoredFn> {
        self.restored.iter().map(|(_, f)| f.clone()).collect()
    }

    pub fn deleted(&self) -> Vec<DeletedFn> {
        self.deleted.iter().map(|(_, f)| f.clone()).collect()
    }

    fn allocate(&mut self) -> ListenerId {
        self.next_id += 1;
        ListenerId(self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_listeners_run_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut listeners = Listeners::new();

        let c = calls.clone();
        listeners.on_deleted(move |id| c.lock().unwrap().push(format!("first {}", id)));
        let c = calls.clone();
        listeners.on_deleted(move |id| c.lock().unwrap().push(format!("second {}", id)));

        for f in listeners.deleted() {
            f("m1");
        }
        assert_eq!(*calls.lock().unwrap(), vec!["first m1", "second m1"]);
    }

    #[test]
    fn test_remove_listener() {
        let mut listeners = Listeners::new();
        let id = listeners.on_restored(|_, _, _| {});
        listeners.on_deleted(|_| {});

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.restored().is_empty());
        assert_eq!(listeners.deleted().len(), 1);

        // restored callbacks receive the full payload
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        listeners.on_restored(move |id, content, info| {
            *s.lock().unwrap() = Some((id.to_string(), content.clone(), info.clone()));
        });
        for f in listeners.restored() {
            f("m1", &json!("c"), &FileInfo::new("d", 1));
        }
        assert_eq!(
            *seen.lock().unwrap(),
            Some(("m1".to_string(), json!("c"), FileInfo::new("d", 1)))
        );
    }
}
