//! Runtime configuration consumed by the thread engine

use std::sync::OnceLock;

use core_types::{VmError, VmResult};

/// Default frame stack depth per thread.
pub const DEFAULT_THREAD_MAX_STACK_SIZE: usize = 1024;

static INSTALLED: OnceLock<RuntimeConfig> = OnceLock::new();

/// Configuration read at thread construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Maximum number of frames on one thread's frame stack
    pub thread_max_stack_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            thread_max_stack_size: DEFAULT_THREAD_MAX_STACK_SIZE,
        }
    }
}

impl RuntimeConfig {
    /// Set the frame stack depth limit
    pub fn with_thread_max_stack_size(mut self, depth: usize) -> Self {
        self.thread_max_stack_size = depth;
        self
    }

    /// Install this configuration process-wide.
    ///
    /// Can be done once, before the first call to [`RuntimeConfig::get`].
    pub fn install(self) -> VmResult<()> {
        INSTALLED
            .set(self)
            .map_err(|_| VmError::ConfigAlreadyInstalled)
    }

    /// The process-wide configuration, or the defaults if none was installed.
    pub fn get() -> &'static RuntimeConfig {
        INSTALLED.get_or_init(RuntimeConfig::default)
    }
}
