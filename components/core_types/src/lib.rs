//! Core value types and error handling for the VM.
//!
//! This crate provides the foundational types shared by the VM components:
//! the boxed value representation, method descriptors and the error type.
//!
//! # Overview
//!
//! - [`Value`] - Tagged representation of runtime values
//! - [`Method`] - Resolved method metadata used to build frames
//! - [`VmError`] - Recoverable VM errors
//!
//! # Examples
//!
//! ```
//! use core_types::{Method, MethodFlags, Value, ValueType};
//!
//! let run = Method::new("run", "()V", MethodFlags::default(), 1, 2).unwrap();
//! assert_eq!(run.arg_value_types(), &[ValueType::Object]);
//!
//! let n = Value::int(3);
//! assert!(!n.is_reference());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod method;
mod value;

pub use error::{VmError, VmResult};
pub use method::{Method, MethodFlags, ValueType};
pub use value::{ArrayHeader, ArrayRef, ObjectHeader, ObjectRef, PrimitiveValue, Value, ValueTag};
