//! Named, cancelable deadlines on the round clock. Each task has at most one
//! pending deadline; arming a task again replaces the previous one.

use std::collections::BTreeMap;

/// Scheduled activities of a round. The declaration order breaks ties
/// between deadlines that fall on the same millisecond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    Movement,
    Countdown,
    PowerUpSpawn,
    PowerUpExpiry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timers {
    deadlines: BTreeMap<Task, u64>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, task: Task, at_ms: u64) {
        self.deadlines.insert(task, at_ms);
    }

    pub fn cancel(&mut self, task: Task) -> bool {
        self.deadlines.remove(&task).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn deadline(&self, task: Task) -> Option<u64> {
        self.deadlines.get(&task).copied()
    }

    pub fn is_idle(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<u64> {
        self.deadlines.values().copied().min()
    }

    /// Disarm and return the earliest task due at or before `until_ms`
    pub fn pop_due(&mut self, until_ms: u64) -> Option<(Task, u64)> {
        let (task, at) = self
            .deadlines
            .iter()
            .filter(|&(_, &at)| at <= until_ms)
            .min_by_key(|&(&task, &at)| (at, task))
            .map(|(&task, &at)| (task, at))?;
        self.deadlines.remove(&task);
        Some((task, at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_replaces_deadline() {
        let mut timers = Timers::new();
        timers.arm(Task::Movement, 150);
        timers.arm(Task::Movement, 300);

        assert_eq!(timers.deadline(Task::Movement), Some(300));
        assert_eq!(timers.pop_due(200), None);
    }

    #[test]
    fn test_pop_due_in_deadline_order() {
        let mut timers = Timers::new();
        timers.arm(Task::PowerUpSpawn, 1_000);
        timers.arm(Task::Countdown, 1_000);
        timers.arm(Task::Movement, 900);
        timers.arm(Task::PowerUpExpiry, 5_000);

        assert_eq!(timers.pop_due(1_000), Some((Task::Movement, 900)));
        assert_eq!(timers.pop_due(1_000), Some((Task::Countdown, 1_000)));
        assert_eq!(timers.pop_due(1_000), Some((Task::PowerUpSpawn, 1_000)));
        assert_eq!(timers.pop_due(1_000), None);
        assert_eq!(timers.next_deadline(), Some(5_000));
    }

    #[test]
    fn test_cancel() {
        let mut timers = Timers::new();
        timers.arm(Task::Movement, 10);
        timers.arm(Task::Countdown, 20);

        assert!(timers.cancel(Task::Movement));
        assert!(!timers.cancel(Task::Movement));
        assert_eq!(timers.next_deadline(), Some(20));

        timers.cancel_all();
        assert!(timers.is_idle());
        assert_eq!(timers.next_deadline(), None);
    }
}
