//! Fatal internal-invariant failures.
//!
//! Everything here diverges. These paths mean the VM itself is broken, so the
//! offending thread is torn down instead of reporting a `VmError`.

use core_types::{ValueTag, ValueType};

/// What the marshaller could not handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachableKind {
    /// Argument tag the marshaller does not accept
    Tag(ValueTag),
    /// Declared parameter kind that cannot receive a primitive
    Declared(Option<ValueType>),
    /// Primitive box whose width disagrees with the declared kind
    Mismatch {
        /// Declared parameter kind
        declared: ValueType,
        /// Kind the box actually holds
        boxed: ValueType,
    },
}

/// Abort on a value kind the marshaller must never see.
#[cold]
#[track_caller]
pub fn unreachable_kind(kind: UnreachableKind, slot: usize) -> ! {
    tracing::error!(?kind, slot, "unreachable value kind during argument marshalling");
    panic!("unreachable value kind {kind:?} at local slot {slot}");
}

/// Abort on a broken thread-engine invariant.
#[cold]
#[track_caller]
pub fn invariant_violation(what: &str) -> ! {
    tracing::error!(invariant = what, "internal invariant violated");
    panic!("internal invariant violated: {what}");
}
