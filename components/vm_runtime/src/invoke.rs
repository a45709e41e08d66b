//! Argument marshalling and the frame protocol around the interpreter.

use std::sync::Arc;

use core_types::{Method, PrimitiveValue, Value, ValueType, VmError, VmResult};

use crate::fatal::{self, UnreachableKind};
use crate::frame::{Frame, Locals};
use crate::thread::Thread;

/// Copy `args` into ascending local slots starting at 0.
///
/// References are stored as-is. Primitives are stored with the width the
/// method declares for that slot. A `ReturnAddress` argument, a primitive in
/// a slot declared as a reference (or not declared at all), or a box whose
/// width disagrees with the declaration aborts.
pub fn marshal_arguments(locals: &mut Locals, method: &Method, args: &[Value]) -> VmResult<()> {
    for (slot, arg) in args.iter().enumerate() {
        match arg {
            Value::Null => {
                tracing::trace!(slot, "copying null");
                locals.set_reference(slot, Value::Null)?;
            }
            Value::Instance(_) | Value::ObjectArray(_) | Value::TypeArray(_) => {
                tracing::trace!(slot, tag = ?arg.tag(), "copying reference");
                locals.set_reference(slot, arg.clone())?;
            }
            Value::Primitive(value) => copy_primitive(locals, method, slot, *value)?,
            Value::ReturnAddress(_) => {
                fatal::unreachable_kind(UnreachableKind::Tag(arg.tag()), slot)
            }
        }
    }
    Ok(())
}

fn copy_primitive(
    locals: &mut Locals,
    method: &Method,
    slot: usize,
    value: PrimitiveValue,
) -> VmResult<()> {
    match method.arg_value_type(slot) {
        Some(
            declared @ (ValueType::Boolean
            | ValueType::Byte
            | ValueType::Char
            | ValueType::Short
            | ValueType::Int),
        ) => {
            tracing::trace!(slot, "copying int");
            let v = value.as_int().unwrap_or_else(|| mismatch(declared, value, slot));
            locals.set_int(slot, v)
        }
        Some(ValueType::Float) => {
            tracing::trace!(slot, "copying float");
            let v = value
                .as_float()
                .unwrap_or_else(|| mismatch(ValueType::Float, value, slot));
            locals.set_float(slot, v)
        }
        Some(ValueType::Long) => {
            tracing::trace!(slot, "copying long");
            let v = value
                .as_long()
                .unwrap_or_else(|| mismatch(ValueType::Long, value, slot));
            locals.set_long(slot, v)
        }
        Some(ValueType::Double) => {
            tracing::trace!(slot, "copying double");
            let v = value
                .as_double()
                .unwrap_or_else(|| mismatch(ValueType::Double, value, slot));
            locals.set_double(slot, v)
        }
        declared @ (None | Some(ValueType::Void | ValueType::Object | ValueType::Array)) => {
            fatal::unreachable_kind(UnreachableKind::Declared(declared), slot)
        }
    }
}

fn mismatch(declared: ValueType, value: PrimitiveValue, slot: usize) -> ! {
    fatal::unreachable_kind(
        UnreachableKind::Mismatch {
            declared,
            boxed: value.natural_type(),
        },
        slot,
    )
}

impl Thread {
    /// Invoke `method` with `args` on this thread.
    ///
    /// Builds a frame sized by the method, marshals the arguments into its
    /// locals, pushes it, resets `pc` to 0 and hands the thread to the
    /// interpreter. Once the interpreter returns (successfully or not) the
    /// frame is popped and `pc` is restored to the caller's resume point.
    ///
    /// Reentrant: the interpreter may call this again on the same thread to
    /// run a callee.
    pub fn run_method(&mut self, method: &Arc<Method>, args: &[Value]) -> VmResult<Option<Value>> {
        tracing::trace!(
            thread = self.id(),
            method = method.name(),
            max_locals = method.max_locals(),
            max_stack = method.max_stack(),
            "run_method"
        );
        if args.len() > method.max_locals() {
            return Err(VmError::TooManyArguments {
                method: method.name().to_string(),
                max_locals: method.max_locals(),
                given: args.len(),
            });
        }

        let mut frame = Frame::new(method.max_locals(), method.max_stack());
        marshal_arguments(frame.locals_mut(), method, args)?;
        frame.set_method(Arc::clone(method));
        frame.set_return_pc(self.pc);
        frame.set_native_frame(method.is_native());

        let depth = self.frames.len();
        self.frames.push(frame)?;
        self.pc = 0;

        let interpreter = Arc::clone(&self.interpreter);
        let result = interpreter.interp(self);

        if self.frames.len() != depth + 1 {
            fatal::invariant_violation("interpreter returned with an unbalanced frame stack");
        }
        let Some(frame) = self.frames.pop() else {
            fatal::invariant_violation("frame stack empty after interpreter returned");
        };
        self.pc = frame.return_pc();
        result
    }
}
