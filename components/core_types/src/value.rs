//! Boxed runtime values passed across the thread engine.
//!
//! This module provides the `Value` enum, the tagged representation of every
//! value the thread engine can receive as a call argument or hand back as a
//! method result. Heap values are shared handles; primitives are stored inline.

use std::fmt;
use std::sync::Arc;

use crate::method::ValueType;

/// Header of a heap-allocated object instance.
///
/// The full object model lives outside this crate; the thread engine only
/// needs identity and a class name for diagnostics.
#[derive(Debug)]
pub struct ObjectHeader {
    /// Internal name of the instance's class (e.g. `java/lang/Thread`)
    pub class_name: String,
}

/// Header of a heap-allocated array.
#[derive(Debug)]
pub struct ArrayHeader {
    /// Component descriptor (e.g. `I` or `Ljava/lang/String;`)
    pub component: String,
    /// Number of elements
    pub length: usize,
}

/// Shared reference to an object instance.
///
/// Equality is identity: two references are equal only if they point at the
/// same heap object.
#[derive(Clone)]
pub struct ObjectRef(Arc<ObjectHeader>);

impl ObjectRef {
    /// Allocate a fresh instance of `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self(Arc::new(ObjectHeader {
            class_name: class_name.into(),
        }))
    }

    /// Class name of the referenced instance.
    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({}@{:p})", self.0.class_name, Arc::as_ptr(&self.0))
    }
}

/// Shared reference to an array (of objects or of primitives).
#[derive(Clone)]
pub struct ArrayRef(Arc<ArrayHeader>);

impl ArrayRef {
    /// Allocate a fresh array header.
    pub fn new(component: impl Into<String>, length: usize) -> Self {
        Self(Arc::new(ArrayHeader {
            component: component.into(),
            length,
        }))
    }

    /// Component descriptor of the array.
    pub fn component(&self) -> &str {
        &self.0.component
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.0.length
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.0.length == 0
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ArrayRef([{}; {}]@{:p})",
            self.0.component,
            self.0.length,
            Arc::as_ptr(&self.0)
        )
    }
}

/// Boxed primitive.
///
/// Sub-word kinds (boolean, byte, char, short) are boxed as `Int`, the same
/// way the local-variable table stores them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveValue {
    /// 32-bit integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
}

impl PrimitiveValue {
    /// Extract the value as an int, if it was boxed as one.
    pub fn as_int(self) -> Option<i32> {
        match self {
            PrimitiveValue::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Extract the value as a float, if it was boxed as one.
    pub fn as_float(self) -> Option<f32> {
        match self {
            PrimitiveValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Extract the value as a long, if it was boxed as one.
    pub fn as_long(self) -> Option<i64> {
        match self {
            PrimitiveValue::Long(v) => Some(v),
            _ => None,
        }
    }

    /// Extract the value as a double, if it was boxed as one.
    pub fn as_double(self) -> Option<f64> {
        match self {
            PrimitiveValue::Double(v) => Some(v),
            _ => None,
        }
    }

    /// The declared kind this box naturally corresponds to.
    pub fn natural_type(self) -> ValueType {
        match self {
            PrimitiveValue::Int(_) => ValueType::Int,
            PrimitiveValue::Float(_) => ValueType::Float,
            PrimitiveValue::Long(_) => ValueType::Long,
            PrimitiveValue::Double(_) => ValueType::Double,
        }
    }
}

/// Tag of a boxed value, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    /// The null reference
    Null,
    /// Reference to an object instance
    Instance,
    /// Reference to an array of references
    ObjectArray,
    /// Reference to an array of primitives
    TypeArray,
    /// Boxed primitive
    Primitive,
    /// Subroutine return address
    ReturnAddress,
}

/// Represents any value the thread engine can pass or receive.
///
/// # Examples
///
/// ```
/// use core_types::{ObjectRef, PrimitiveValue, Value, ValueTag};
///
/// let receiver = Value::Instance(ObjectRef::new("java/lang/Thread"));
/// assert_eq!(receiver.tag(), ValueTag::Instance);
/// assert!(receiver.is_reference());
///
/// let five = Value::Primitive(PrimitiveValue::Int(5));
/// assert!(!five.is_reference());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null reference
    Null,
    /// Object instance
    Instance(ObjectRef),
    /// Array whose elements are references
    ObjectArray(ArrayRef),
    /// Array whose elements are primitives
    TypeArray(ArrayRef),
    /// Boxed primitive
    Primitive(PrimitiveValue),
    /// Return address pushed by a subroutine jump; never a call argument
    ReturnAddress(usize),
}

impl Value {
    /// Tag of this value.
    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::Instance(_) => ValueTag::Instance,
            Value::ObjectArray(_) => ValueTag::ObjectArray,
            Value::TypeArray(_) => ValueTag::TypeArray,
            Value::Primitive(_) => ValueTag::Primitive,
            Value::ReturnAddress(_) => ValueTag::ReturnAddress,
        }
    }

    /// Whether this value is a reference (including null).
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Instance(_) | Value::ObjectArray(_) | Value::TypeArray(_)
        )
    }

    /// Whether this value is the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Shorthand for a boxed int.
    pub fn int(v: i32) -> Self {
        Value::Primitive(PrimitiveValue::Int(v))
    }

    /// Shorthand for a boxed float.
    pub fn float(v: f32) -> Self {
        Value::Primitive(PrimitiveValue::Float(v))
    }

    /// Shorthand for a boxed long.
    pub fn long(v: i64) -> Self {
        Value::Primitive(PrimitiveValue::Long(v))
    }

    /// Shorthand for a boxed double.
    pub fn double(v: f64) -> Self {
        Value::Primitive(PrimitiveValue::Double(v))
    }
}
