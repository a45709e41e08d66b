//! Recoverable VM errors.
//!
//! Only conditions a caller outside the thread engine can trigger are
//! reported here. Broken internal invariants abort instead of returning.

use thiserror::Error;

/// An error reported by the thread engine or its collaborators.
#[derive(Debug, Error)]
pub enum VmError {
    /// More arguments than the method has local slots
    #[error("method {method} takes at most {max_locals} local slots, got {given} arguments")]
    TooManyArguments {
        /// Method name
        method: String,
        /// Size of the local-variable table
        max_locals: usize,
        /// Number of arguments supplied
        given: usize,
    },

    /// Frame stack capacity exhausted
    #[error("stack overflow: frame stack depth limit {limit} reached")]
    StackOverflow {
        /// Configured maximum depth
        limit: usize,
    },

    /// Local-variable index outside the frame's table
    #[error("local variable index {index} out of bounds (max_locals = {max_locals})")]
    LocalIndexOutOfBounds {
        /// Offending index
        index: usize,
        /// Size of the table
        max_locals: usize,
    },

    /// Operand stack bound exceeded
    #[error("operand stack overflow (max_stack = {max_stack})")]
    OperandStackOverflow {
        /// Operand stack bound
        max_stack: usize,
    },

    /// Pop from an empty operand stack
    #[error("operand stack underflow")]
    OperandStackUnderflow,

    /// A thread state change that the state machine forbids
    #[error("illegal thread state transition {from} -> {to}")]
    IllegalStateTransition {
        /// Current state
        from: &'static str,
        /// Requested state
        to: &'static str,
    },

    /// The OS refused to create an execution context
    #[error("failed to spawn execution context: {0}")]
    Spawn(#[from] std::io::Error),

    /// The spawned execution context exited before it finished launching
    #[error("thread {id} exited before finishing its launch handshake")]
    LaunchAborted {
        /// Thread id
        id: u64,
    },

    /// A joined thread body panicked
    #[error("thread {id} panicked")]
    ThreadPanicked {
        /// Thread id
        id: u64,
    },

    /// The process-wide registry was used before `initialize()`
    #[error("thread registry is not initialized")]
    RegistryNotInitialized,

    /// `initialize()` called while a registry is already installed
    #[error("thread registry is already initialized")]
    RegistryAlreadyInitialized,

    /// Runtime configuration installed twice
    #[error("runtime configuration is already installed")]
    ConfigAlreadyInstalled,

    /// Malformed method descriptor
    #[error("invalid method descriptor {descriptor:?}: {reason}")]
    InvalidDescriptor {
        /// The descriptor text
        descriptor: String,
        /// What is wrong with it
        reason: String,
    },

    /// Entry-point thread built with a wrong receiver-only argument list
    #[error("entry method {method} must take exactly one receiver argument, got {given}")]
    ReceiverArity {
        /// Method name
        method: String,
        /// Number of arguments supplied
        given: usize,
    },
}

/// Result alias used across the VM crates.
pub type VmResult<T> = Result<T, VmError>;
