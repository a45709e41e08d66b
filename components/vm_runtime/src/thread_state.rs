//! Thread lifecycle states

use std::fmt;

/// Lifecycle state of a logical thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadState {
    /// Executing or runnable (initial)
    Running,
    /// Blocked on a monitor
    Blocked,
    /// Waiting for a notification
    Waiting,
    /// Timed sleep
    Sleeping,
    /// Terminated
    Died,
}

impl ThreadState {
    /// Whether the thread has terminated
    pub fn is_terminal(self) -> bool {
        self == ThreadState::Died
    }

    /// Whether `self -> next` is a legal change. Nothing leaves `Died`.
    pub fn can_transition_to(self, next: ThreadState) -> bool {
        !self.is_terminal() && self != next
    }

    /// Upper-case name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            ThreadState::Running => "RUNNING",
            ThreadState::Blocked => "BLOCKED",
            ThreadState::Waiting => "WAITING",
            ThreadState::Sleeping => "SLEEPING",
            ThreadState::Died => "DIED",
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
