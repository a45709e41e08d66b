//! Logical VM threads and their launch protocol.
//!
//! A [`Thread`] is built on the creating thread and then moved, by
//! [`Thread::create`], into the OS thread that runs it. From then on its frame
//! stack, arguments and `pc` are touched only by that OS thread. What other
//! threads may observe (id, state, the bound thread object, the execution
//! context) lives behind a cloneable [`ThreadHandle`].
//!
//! Thread bodies form a closed set selected at construction ([`ThreadKind`]):
//!
//! - `Java` runs `run()` on exactly one receiver, is recorded in the
//!   registry and detaches its execution context as soon as it starts.
//! - `Main` runs the program entry point, is not recorded, and is joined by
//!   its creator; it outlives every application thread.
//!
//! `create()` returns only once the spawned thread has finished registering
//! itself, so registration happens-before anything the creator does next.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{JoinHandle, ThreadId};

use core_types::{Method, Value, VmError, VmResult};
use crossbeam::atomic::AtomicCell;
use crossbeam::channel;
use parking_lot::Mutex;

use crate::config::RuntimeConfig;
use crate::fatal;
use crate::frame::Frame;
use crate::frame_stack::FrameStack;
use crate::interpreter::Interpreter;
use crate::registry::{self, ThreadRegistry};
use crate::thread_state::ThreadState;

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Which body a thread runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreadKind {
    /// Application thread running `run()` on its receiver
    Java,
    /// Program entry point
    Main,
}

impl ThreadKind {
    /// Whether threads of this kind are recorded in the registry (and
    /// therefore counted as live application threads until they die).
    pub fn records_in_thread_table(self) -> bool {
        match self {
            ThreadKind::Java => true,
            ThreadKind::Main => false,
        }
    }
}

/// The OS execution context behind a thread.
///
/// A `Detached` context is never awaited by anyone; whether the thread is
/// still alive is known only from the registry.
#[derive(Debug, Default)]
pub enum ExecutionContext {
    /// `create()` has not run yet
    #[default]
    Unlaunched,
    /// Spawned, join handle still held
    Attached(JoinHandle<()>),
    /// Join handle dropped
    Detached,
    /// Joined by the creator
    Joined,
}

struct ThreadShared {
    id: u64,
    kind: ThreadKind,
    state: AtomicCell<ThreadState>,
    vm_thread_object: OnceLock<Value>,
    exec: Mutex<ExecutionContext>,
    exec_id: OnceLock<ThreadId>,
}

/// Shared view of a thread, usable from any OS thread.
#[derive(Clone)]
pub struct ThreadHandle(Arc<ThreadShared>);

impl ThreadHandle {
    pub(crate) fn new(kind: ThreadKind) -> Self {
        Self(Arc::new(ThreadShared {
            id: NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            state: AtomicCell::new(ThreadState::Running),
            vm_thread_object: OnceLock::new(),
            exec: Mutex::new(ExecutionContext::Unlaunched),
            exec_id: OnceLock::new(),
        }))
    }

    /// Process-unique thread id
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Body variant
    pub fn kind(&self) -> ThreadKind {
        self.0.kind
    }

    /// Written only under the registry lock. Outside the crate, state is
    /// read through [`ThreadRegistry::state_of`] or
    /// [`ThreadRegistry::snapshot`].
    pub(crate) fn state(&self) -> ThreadState {
        self.0.state.load()
    }

    pub(crate) fn store_state(&self, state: ThreadState) {
        self.0.state.store(state);
    }

    /// Language-level thread object bound by `create()`
    pub fn vm_thread_object(&self) -> Option<&Value> {
        self.0.vm_thread_object.get()
    }

    /// OS identifier of the execution context, once launched.
    ///
    /// For introspection and debugging only.
    pub fn execution_handle(&self) -> Option<ThreadId> {
        self.0.exec_id.get().copied()
    }

    /// Whether the execution context has been detached
    pub fn is_detached(&self) -> bool {
        matches!(*self.0.exec.lock(), ExecutionContext::Detached)
    }

    #[cfg(test)]
    pub(crate) fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    fn attach(&self, join: JoinHandle<()>) {
        // set once: create() consumes the Thread
        let _ = self.0.exec_id.set(join.thread().id());
        *self.0.exec.lock() = ExecutionContext::Attached(join);
    }

    fn detach(&self) {
        let mut exec = self.0.exec.lock();
        if matches!(*exec, ExecutionContext::Attached(_)) {
            *exec = ExecutionContext::Detached;
        }
    }

    fn join(&self) -> VmResult<()> {
        let previous = std::mem::replace(&mut *self.0.exec.lock(), ExecutionContext::Joined);
        match previous {
            ExecutionContext::Attached(join) => join
                .join()
                .map_err(|_| VmError::ThreadPanicked { id: self.id() }),
            other => {
                *self.0.exec.lock() = other;
                Ok(())
            }
        }
    }

    /// Hook run on the creating thread right after launch.
    fn on_thread_launched(&self) -> VmResult<()> {
        match self.kind() {
            ThreadKind::Java => Ok(()),
            ThreadKind::Main => self.join(),
        }
    }
}

impl fmt::Debug for ThreadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadHandle")
            .field("id", &self.id())
            .field("kind", &self.kind())
            .field("state", &self.state())
            .field("execution_handle", &self.execution_handle())
            .finish()
    }
}

/// Collaborators every thread is built against.
#[derive(Clone)]
pub struct ThreadEnv {
    registry: Arc<ThreadRegistry>,
    interpreter: Arc<dyn Interpreter>,
    max_stack_depth: usize,
}

impl ThreadEnv {
    /// Environment with an explicit registry and configuration
    pub fn new(
        registry: Arc<ThreadRegistry>,
        interpreter: Arc<dyn Interpreter>,
        config: &RuntimeConfig,
    ) -> Self {
        Self {
            registry,
            interpreter,
            max_stack_depth: config.thread_max_stack_size,
        }
    }

    /// Environment using the process-wide registry and configuration
    pub fn from_global(interpreter: Arc<dyn Interpreter>) -> VmResult<Self> {
        Ok(Self::new(registry::global()?, interpreter, RuntimeConfig::get()))
    }

    /// Registry threads built from this environment report to
    pub fn registry(&self) -> &Arc<ThreadRegistry> {
        &self.registry
    }
}

impl fmt::Debug for ThreadEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadEnv")
            .field("max_stack_depth", &self.max_stack_depth)
            .finish_non_exhaustive()
    }
}

/// A logical VM thread.
pub struct Thread {
    handle: ThreadHandle,
    pub(crate) frames: FrameStack,
    method: Arc<Method>,
    args: Vec<Value>,
    pub(crate) pc: usize,
    registry: Arc<ThreadRegistry>,
    pub(crate) interpreter: Arc<dyn Interpreter>,
}

impl Thread {
    /// Build a thread of any kind without checking its argument list.
    pub(crate) fn new(kind: ThreadKind, method: Arc<Method>, args: Vec<Value>, env: &ThreadEnv) -> Self {
        Self {
            handle: ThreadHandle::new(kind),
            frames: FrameStack::new(env.max_stack_depth),
            method,
            args,
            pc: 0,
            registry: Arc::clone(&env.registry),
            interpreter: Arc::clone(&env.interpreter),
        }
    }

    /// Application thread running `method` on `receiver`
    pub fn java(method: Arc<Method>, receiver: Value, env: &ThreadEnv) -> Self {
        Self::new(ThreadKind::Java, method, vec![receiver], env)
    }

    /// Application thread from a caller-built argument list.
    ///
    /// Fails unless `args` holds exactly the receiver.
    pub fn java_from_args(method: Arc<Method>, args: Vec<Value>, env: &ThreadEnv) -> VmResult<Self> {
        if args.len() != 1 {
            return Err(VmError::ReceiverArity {
                method: method.name().to_string(),
                given: args.len(),
            });
        }
        Ok(Self::new(ThreadKind::Java, method, args, env))
    }

    /// Entry-point thread running `method` with `args`
    pub fn main(method: Arc<Method>, args: Vec<Value>, env: &ThreadEnv) -> Self {
        Self::new(ThreadKind::Main, method, args, env)
    }

    /// Shared handle to this thread
    pub fn handle(&self) -> &ThreadHandle {
        &self.handle
    }

    /// Process-unique thread id
    pub fn id(&self) -> u64 {
        self.handle.id()
    }

    /// Body variant
    pub fn kind(&self) -> ThreadKind {
        self.handle.kind()
    }

    /// Current lifecycle state, read under the registry lock
    pub fn state(&self) -> ThreadState {
        self.registry.state_of(&self.handle)
    }

    /// Target method run by the thread body
    pub fn method(&self) -> &Arc<Method> {
        &self.method
    }

    /// Arguments not yet consumed by the thread body
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Program counter of the active frame
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Move the program counter
    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    /// Frame stack
    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    /// Frame on top of the stack
    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.current()
    }

    /// Mutable frame on top of the stack
    pub fn current_frame_mut(&mut self) -> Option<&mut Frame> {
        self.frames.current_mut()
    }

    /// Registry this thread reports to
    pub fn registry(&self) -> &Arc<ThreadRegistry> {
        &self.registry
    }

    /// Whether launch records this thread in the registry
    pub fn should_record_in_thread_table(&self) -> bool {
        self.kind().records_in_thread_table()
    }

    /// OS identifier of the execution context; `None` before `create()`
    pub fn execution_handle(&self) -> Option<ThreadId> {
        self.handle.execution_handle()
    }

    /// Bind `vm_thread_object`, spawn the OS thread and launch the body.
    ///
    /// The spawned thread records itself in the registry (if its kind is
    /// recorded) and then runs [`start`](Self::start). This call returns
    /// after registration has completed and the post-launch hook has run;
    /// for `Main` threads that hook joins the body.
    pub fn create(self, vm_thread_object: Value) -> VmResult<ThreadHandle> {
        let handle = self.handle.clone();
        let id = handle.id();
        if handle.0.vm_thread_object.set(vm_thread_object).is_err() {
            fatal::invariant_violation("thread object bound twice");
        }

        let (launch_tx, launch_rx) = channel::bounded::<()>(1);
        let (ready_tx, ready_rx) = channel::bounded::<()>(1);

        let mut thread = self;
        let join = std::thread::Builder::new()
            .name(format!("vm-thread-{id}"))
            .spawn(move || {
                if launch_rx.recv().is_err() {
                    return;
                }
                if thread.should_record_in_thread_table() {
                    tracing::debug!(thread = id, "recording thread in thread table");
                    thread.registry.add(thread.handle.clone());
                }
                // the creator is blocked on this; nothing to do if it went away
                let _ = ready_tx.send(());
                thread.start();
            })?;

        handle.attach(join);
        launch_tx
            .send(())
            .map_err(|_| VmError::LaunchAborted { id })?;
        ready_rx.recv().map_err(|_| VmError::LaunchAborted { id })?;
        tracing::debug!(thread = id, kind = ?handle.kind(), "thread launched");

        handle.on_thread_launched()?;
        Ok(handle)
    }

    /// Run the thread body on the current OS thread.
    ///
    /// Normally called by the trampoline spawned in [`create`](Self::create).
    /// A body that starts with active frames, or a `Java` body that does not
    /// hold exactly one receiver argument, aborts. The thread is retired
    /// however the body ends, unwinding included, so the registry never keeps
    /// counting a thread that is gone.
    pub fn start(&mut self) {
        let _retire = RetireOnExit {
            registry: Arc::clone(&self.registry),
            handle: self.handle.clone(),
        };
        match self.kind() {
            ThreadKind::Java => self.start_java(),
            ThreadKind::Main => self.start_main(),
        }
    }

    fn start_java(&mut self) {
        // nobody joins application threads
        self.handle.detach();

        if !self.frames.is_empty() {
            fatal::invariant_violation("thread body started with active frames");
        }
        if self.args.len() != 1 {
            fatal::invariant_violation("thread body needs exactly one receiver argument");
        }

        self.run_body();
    }

    fn start_main(&mut self) {
        if !self.frames.is_empty() {
            fatal::invariant_violation("thread body started with active frames");
        }

        self.run_body();
        self.registry.wait_for_app_threads();
    }

    fn run_body(&mut self) {
        let method = Arc::clone(&self.method);
        let args = std::mem::take(&mut self.args);
        match self.run_method(&method, &args) {
            Ok(result) => {
                tracing::debug!(thread = self.id(), method = method.name(), ?result, "thread body returned")
            }
            Err(err) => {
                tracing::error!(thread = self.id(), method = method.name(), error = %err, "thread body failed")
            }
        }
    }
}

/// Retires a thread when its body ends.
struct RetireOnExit {
    registry: Arc<ThreadRegistry>,
    handle: ThreadHandle,
}

impl Drop for RetireOnExit {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if self.handle.state().is_terminal() {
                return;
            }
            tracing::error!(thread = self.handle.id(), "thread body panicked");
        }
        self.registry.retire(&self.handle);
    }
}

impl fmt::Debug for Thread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thread")
            .field("handle", &self.handle)
            .field("method", &self.method.name())
            .field("args", &self.args)
            .field("pc", &self.pc)
            .field("depth", &self.frames.len())
            .finish_non_exhaustive()
    }
}
