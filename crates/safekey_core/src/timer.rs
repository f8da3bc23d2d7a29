//! Cancellable deferred tasks on a logical clock
//!
//! The overlay never blocks or sleeps. Debounce delays and animation guards
//! are queued here and fired when the host advances the clock, in due-time
//! order (FIFO for equal due times).

use std::time::Duration;

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a scheduled task
    pub struct TaskId;
}

struct Entry<T> {
    due: Duration,
    seq: u64,
    task: T,
}

/// Queue of tasks due at points on a logical clock
pub struct DeferredQueue<T> {
    tasks: SlotMap<TaskId, Entry<T>>,
    now: Duration,
    next_seq: u64,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: SlotMap::with_key(),
            now: Duration::ZERO,
            next_seq: 0,
        }
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Run `task` once `delay` has elapsed from now
    pub fn schedule(&mut self, delay: Duration, task: T) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.insert(Entry {
            due: self.now + delay,
            seq,
            task,
        })
    }

    /// Cancel a pending task, returning it if it had not fired yet
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        self.tasks.remove(id).map(|entry| entry.task)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Due time of the earliest pending task
    pub fn next_due(&self) -> Option<Duration> {
        self.tasks.values().map(|entry| entry.due).min()
    }

    /// Remove the earliest task due at or before `until`
    ///
    /// The clock moves to the task's due time, so tasks scheduled while
    /// handling it are timed from the moment it fired.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskId, T)> {
        let id = self
            .tasks
            .iter()
            .filter(|(_, entry)| entry.due <= until)
            .min_by_key(|(_, entry)| (entry.due, entry.seq))
            .map(|(id, _)| id)?;

        let entry = self.tasks.remove(id)?;
        self.now = self.now.max(entry.due);
        Some((id, entry.task))
    }

    /// Move the clock forward once every due task has been popped
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }

    /// Drop every pending task
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(200), "show");
        queue.schedule(ms(50), "hide");

        assert_eq!(queue.pop_due(ms(300)).map(|(_, t)| t), Some("hide"));
        assert_eq!(queue.now(), ms(50));
        assert_eq!(queue.pop_due(ms(300)).map(|(_, t)| t), Some("show"));
        assert!(queue.pop_due(ms(300)).is_none());
    }

    #[test]
    fn test_equal_due_times_are_fifo() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(10), 1);
        queue.schedule(ms(10), 2);
        assert_eq!(queue.pop_due(ms(10)).map(|(_, t)| t), Some(1));
        assert_eq!(queue.pop_due(ms(10)).map(|(_, t)| t), Some(2));
    }

    #[test]
    fn test_not_due_yet() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(200), ());
        assert!(queue.pop_due(ms(199)).is_none());
        queue.settle(ms(199));
        assert_eq!(queue.now(), ms(199));
        assert!(queue.pop_due(ms(200)).is_some());
    }

    #[test]
    fn test_cancel() {
        let mut queue = DeferredQueue::new();
        let id = queue.schedule(ms(5), "gone");
        assert!(queue.is_pending(id));
        assert_eq!(queue.cancel(id), Some("gone"));
        assert_eq!(queue.cancel(id), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_scheduling_from_fired_task_uses_fire_time() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(200), "first");
        let _ = queue.pop_due(ms(1000));
        queue.schedule(ms(300), "second");
        assert_eq!(queue.next_due(), Some(ms(500)));
    }
}
