//! Thread-execution engine for the bytecode VM
//!
//! This crate provides the per-thread machinery that sits between the
//! interpreter and the OS:
//! - Frames with fixed-size local-variable tables and bounded operand stacks
//! - A bounded frame stack per thread
//! - Type-directed marshalling of boxed arguments into a new frame
//! - Thread launch, execution and retirement against a process-wide registry
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use core_types::{Method, MethodFlags, Value, VmResult};
//! use vm_runtime::{RuntimeConfig, Thread, ThreadEnv, ThreadRegistry};
//!
//! // An interpreter that returns the int stored in local 0
//! let interp = |thread: &mut Thread| -> VmResult<Option<Value>> {
//!     let frame = thread.current_frame().expect("frame pushed by run_method");
//!     Ok(frame.locals().get_int(0).map(Value::int))
//! };
//! let env = ThreadEnv::new(
//!     Arc::new(ThreadRegistry::new()),
//!     Arc::new(interp),
//!     &RuntimeConfig::default(),
//! );
//!
//! let flags = MethodFlags { is_static: true, is_native: false };
//! let id = Arc::new(Method::new("id", "(I)I", flags, 1, 1).unwrap());
//! let mut thread = Thread::main(Arc::clone(&id), vec![], &env);
//!
//! let result = thread.run_method(&id, &[Value::int(42)]).unwrap();
//! assert_eq!(result, Some(Value::int(42)));
//! assert!(thread.frames().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod fatal;
pub mod frame;
pub mod frame_stack;
pub mod interpreter;
pub mod invoke;
pub mod registry;
pub mod thread;
pub mod thread_state;

// Re-export main types at crate root
pub use config::RuntimeConfig;
pub use frame::{Frame, Locals, OperandStack, Slot};
pub use frame_stack::FrameStack;
pub use interpreter::Interpreter;
pub use invoke::marshal_arguments;
pub use registry::{RegistrySnapshot, ThreadRegistry};
pub use thread::{ExecutionContext, Thread, ThreadEnv, ThreadHandle, ThreadKind};
pub use thread_state::ThreadState;
