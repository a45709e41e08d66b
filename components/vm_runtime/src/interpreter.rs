//! Seam to the bytecode dispatch loop

use core_types::{Value, VmResult};

use crate::thread::Thread;

/// Executes the frame on top of a thread's frame stack.
///
/// Implementations run until the method returns and hand back its result
/// (`None` for void). They may call [`Thread::run_method`] on the same thread
/// to invoke callees.
pub trait Interpreter: Send + Sync {
    /// Run the top frame of `thread` to completion
    fn interp(&self, thread: &mut Thread) -> VmResult<Option<Value>>;
}

impl<F> Interpreter for F
where
    F: Fn(&mut Thread) -> VmResult<Option<Value>> + Send + Sync,
{
    fn interp(&self, thread: &mut Thread) -> VmResult<Option<Value>> {
        self(thread)
    }
}
