//! Method descriptors as seen by the thread engine.
//!
//! Resolution and loading happen elsewhere; a `Method` here carries only the
//! metadata needed to build a frame and marshal arguments into it.

use crate::error::{VmError, VmResult};

/// Declared kind of a parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// No value (return type only)
    Void,
    /// `B`
    Byte,
    /// `Z`
    Boolean,
    /// `C`
    Char,
    /// `S`
    Short,
    /// `I`
    Int,
    /// `F`
    Float,
    /// `J`
    Long,
    /// `D`
    Double,
    /// `L...;`
    Object,
    /// `[...`
    Array,
}

impl ValueType {
    /// Whether values of this kind are primitives.
    pub fn is_primitive(self) -> bool {
        !matches!(self, ValueType::Void | ValueType::Object | ValueType::Array)
    }
}

/// Method access flags relevant to invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodFlags {
    /// Static method: no receiver in slot 0
    pub is_static: bool,
    /// Native method: executed by the native trampoline
    pub is_native: bool,
}

/// A resolved method.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    name: String,
    descriptor: String,
    flags: MethodFlags,
    max_locals: usize,
    max_stack: usize,
    arg_value_types: Vec<ValueType>,
    return_type: ValueType,
}

impl Method {
    /// Build a method from its descriptor.
    ///
    /// The slot-indexed argument kinds are derived from `descriptor`; instance
    /// methods get an `Object` entry at slot 0 for the receiver.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_types::{Method, MethodFlags, ValueType};
    ///
    /// let m = Method::new("add", "(ID)V", MethodFlags { is_static: true, ..Default::default() }, 2, 4)
    ///     .unwrap();
    /// assert_eq!(m.arg_value_types(), &[ValueType::Int, ValueType::Double]);
    /// assert_eq!(m.return_type(), ValueType::Void);
    /// ```
    pub fn new(
        name: impl Into<String>,
        descriptor: impl Into<String>,
        flags: MethodFlags,
        max_locals: usize,
        max_stack: usize,
    ) -> VmResult<Self> {
        let descriptor = descriptor.into();
        let (params, return_type) = parse_descriptor(&descriptor)?;

        let mut arg_value_types = Vec::with_capacity(params.len() + 1);
        if !flags.is_static {
            arg_value_types.push(ValueType::Object);
        }
        arg_value_types.extend(params);

        Ok(Self {
            name: name.into(),
            descriptor,
            flags,
            max_locals,
            max_stack,
            arg_value_types,
            return_type,
        })
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw descriptor string
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Size of the local-variable table
    pub fn max_locals(&self) -> usize {
        self.max_locals
    }

    /// Operand stack bound
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Whether the method is native
    pub fn is_native(&self) -> bool {
        self.flags.is_native
    }

    /// Whether the method is static
    pub fn is_static(&self) -> bool {
        self.flags.is_static
    }

    /// Declared kind for each argument slot, receiver included.
    pub fn arg_value_types(&self) -> &[ValueType] {
        &self.arg_value_types
    }

    /// Declared kind of the argument at `slot`, if any.
    pub fn arg_value_type(&self, slot: usize) -> Option<ValueType> {
        self.arg_value_types.get(slot).copied()
    }

    /// Declared return kind
    pub fn return_type(&self) -> ValueType {
        self.return_type
    }
}

fn parse_descriptor(descriptor: &str) -> VmResult<(Vec<ValueType>, ValueType)> {
    let invalid = |reason: &str| VmError::InvalidDescriptor {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    };

    let rest = descriptor
        .strip_prefix('(')
        .ok_or_else(|| invalid("missing '('"))?;
    let close = rest.find(')').ok_or_else(|| invalid("missing ')'"))?;
    let (params_src, ret_src) = (&rest[..close], &rest[close + 1..]);

    let mut params = Vec::new();
    let mut chars = params_src.chars().peekable();
    while chars.peek().is_some() {
        params.push(parse_field_type(&mut chars).ok_or_else(|| invalid("bad parameter type"))?);
    }

    let return_type = if ret_src == "V" {
        ValueType::Void
    } else {
        let mut ret_chars = ret_src.chars().peekable();
        let ty = parse_field_type(&mut ret_chars).ok_or_else(|| invalid("bad return type"))?;
        if ret_chars.next().is_some() {
            return Err(invalid("trailing characters after return type"));
        }
        ty
    };

    Ok((params, return_type))
}

fn parse_field_type(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<ValueType> {
    let ty = match chars.next()? {
        'B' => ValueType::Byte,
        'Z' => ValueType::Boolean,
        'C' => ValueType::Char,
        'S' => ValueType::Short,
        'I' => ValueType::Int,
        'F' => ValueType::Float,
        'J' => ValueType::Long,
        'D' => ValueType::Double,
        'L' => {
            let mut saw_name = false;
            loop {
                match chars.next()? {
                    ';' if saw_name => break,
                    ';' => return None,
                    _ => saw_name = true,
                }
            }
            ValueType::Object
        }
        '[' => {
            parse_field_type(chars)?;
            ValueType::Array
        }
        _ => return None,
    };
    Some(ty)
}
