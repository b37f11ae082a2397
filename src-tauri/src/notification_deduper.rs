use std::{collections::HashSet, sync::Mutex};

use crate::planner_task::TaskId;

/// Task ids already announced since the last reset. In-memory only.
#[derive(Debug, Default)]
pub(crate) struct NotificationDeduper {
    notified: Mutex<HashSet<TaskId>>,
}

impl NotificationDeduper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `true` exactly once per id between resets.
    pub(crate) fn should_notify(&self, task_id: &TaskId) -> bool {
        match self.notified.lock() {
            Ok(mut notified) => notified.insert(task_id.clone()),
            Err(poisoned) => poisoned.into_inner().insert(task_id.clone()),
        }
    }

    pub(crate) fn reset(&self) -> usize {
        let mut notified = match self.notified.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let cleared = notified.len();
        notified.clear();
        cleared
    }

    pub(crate) fn len(&self) -> usize {
        self.notified
            .lock()
            .map(|notified| notified.len())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn should_notify_is_true_once_then_false() {
        let deduper = NotificationDeduper::new();
        let id = TaskId::Number(1);

        assert!(deduper.should_notify(&id));
        assert!(!deduper.should_notify(&id));
        assert!(!deduper.should_notify(&id));
    }

    #[test]
    fn reset_allows_same_id_again() {
        let deduper = NotificationDeduper::new();
        let id = TaskId::Text("a".to_string());

        assert!(deduper.should_notify(&id));
        assert_eq!(deduper.reset(), 1);
        assert_eq!(deduper.len(), 0);
        assert!(deduper.should_notify(&id));
    }

    #[test]
    fn numeric_and_text_ids_are_distinct() {
        let deduper = NotificationDeduper::new();
        assert!(deduper.should_notify(&TaskId::Number(1)));
        assert!(deduper.should_notify(&TaskId::Text("1".to_string())));
    }

    #[test]
    fn concurrent_callers_get_exactly_one_true() {
        let deduper = Arc::new(NotificationDeduper::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let deduper = Arc::clone(&deduper);
                std::thread::spawn(move || deduper.should_notify(&TaskId::Number(99)))
            })
            .collect();

        let granted = handles
            .into_iter()
            .map(|handle| handle.join().expect("thread"))
            .filter(|granted| *granted)
            .count();
        assert_eq!(granted, 1);
    }
}
