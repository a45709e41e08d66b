//! Activation records for method invocation

use std::sync::Arc;

use core_types::{Method, Value, VmError, VmResult};

/// One local-variable or operand-stack slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Slot {
    /// Never written
    #[default]
    Empty,
    /// Reference (null, instance or array)
    Reference(Value),
    /// 32-bit integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// 64-bit integer
    Long(i64),
    /// 64-bit float
    Double(f64),
}

/// Fixed-size local-variable table.
///
/// The size is set at creation and never changes; writes past it fail.
#[derive(Debug, Clone, PartialEq)]
pub struct Locals {
    slots: Box<[Slot]>,
}

impl Locals {
    /// Create a table of `max_locals` empty slots
    pub fn new(max_locals: usize) -> Self {
        Self {
            slots: vec![Slot::Empty; max_locals].into_boxed_slice(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the table has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Read a slot
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    fn set(&mut self, index: usize, slot: Slot) -> VmResult<()> {
        let max_locals = self.slots.len();
        match self.slots.get_mut(index) {
            Some(target) => {
                *target = slot;
                Ok(())
            }
            None => Err(VmError::LocalIndexOutOfBounds { index, max_locals }),
        }
    }

    /// Store a reference. Non-reference values are a caller bug.
    pub fn set_reference(&mut self, index: usize, value: Value) -> VmResult<()> {
        debug_assert!(value.is_reference(), "set_reference with {:?}", value.tag());
        self.set(index, Slot::Reference(value))
    }

    /// Store an int
    pub fn set_int(&mut self, index: usize, value: i32) -> VmResult<()> {
        self.set(index, Slot::Int(value))
    }

    /// Store a float
    pub fn set_float(&mut self, index: usize, value: f32) -> VmResult<()> {
        self.set(index, Slot::Float(value))
    }

    /// Store a long
    pub fn set_long(&mut self, index: usize, value: i64) -> VmResult<()> {
        self.set(index, Slot::Long(value))
    }

    /// Store a double
    pub fn set_double(&mut self, index: usize, value: f64) -> VmResult<()> {
        self.set(index, Slot::Double(value))
    }

    /// Read a reference slot
    pub fn get_reference(&self, index: usize) -> Option<&Value> {
        match self.slots.get(index) {
            Some(Slot::Reference(v)) => Some(v),
            _ => None,
        }
    }

    /// Read an int slot
    pub fn get_int(&self, index: usize) -> Option<i32> {
        match self.slots.get(index) {
            Some(Slot::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Read a float slot
    pub fn get_float(&self, index: usize) -> Option<f32> {
        match self.slots.get(index) {
            Some(Slot::Float(v)) => Some(*v),
            _ => None,
        }
    }

    /// Read a long slot
    pub fn get_long(&self, index: usize) -> Option<i64> {
        match self.slots.get(index) {
            Some(Slot::Long(v)) => Some(*v),
            _ => None,
        }
    }

    /// Read a double slot
    pub fn get_double(&self, index: usize) -> Option<f64> {
        match self.slots.get(index) {
            Some(Slot::Double(v)) => Some(*v),
            _ => None,
        }
    }
}

/// Operand stack bounded by the method's `max_stack`.
#[derive(Debug, Clone, PartialEq)]
pub struct OperandStack {
    slots: Vec<Slot>,
    max_stack: usize,
}

impl OperandStack {
    /// Create an empty stack with the given bound
    pub fn new(max_stack: usize) -> Self {
        Self {
            slots: Vec::with_capacity(max_stack),
            max_stack,
        }
    }

    /// Push a slot
    pub fn push(&mut self, slot: Slot) -> VmResult<()> {
        if self.slots.len() >= self.max_stack {
            return Err(VmError::OperandStackOverflow {
                max_stack: self.max_stack,
            });
        }
        self.slots.push(slot);
        Ok(())
    }

    /// Pop a slot
    pub fn pop(&mut self) -> VmResult<Slot> {
        self.slots.pop().ok_or(VmError::OperandStackUnderflow)
    }

    /// Current depth
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the stack is empty
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stack bound
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }
}

/// Activation record for one method invocation.
///
/// Created by `Thread::run_method` and owned by the thread's frame stack for
/// exactly the duration of that call.
#[derive(Debug, Clone)]
pub struct Frame {
    locals: Locals,
    stack: OperandStack,
    method: Option<Arc<Method>>,
    return_pc: usize,
    native: bool,
}

impl Frame {
    /// Create a frame with the given capacities
    pub fn new(max_locals: usize, max_stack: usize) -> Self {
        Self {
            locals: Locals::new(max_locals),
            stack: OperandStack::new(max_stack),
            method: None,
            return_pc: 0,
            native: false,
        }
    }

    /// Local-variable table
    pub fn locals(&self) -> &Locals {
        &self.locals
    }

    /// Mutable local-variable table
    pub fn locals_mut(&mut self) -> &mut Locals {
        &mut self.locals
    }

    /// Operand stack
    pub fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// Mutable operand stack
    pub fn stack_mut(&mut self) -> &mut OperandStack {
        &mut self.stack
    }

    /// Size of the local-variable table
    pub fn max_locals(&self) -> usize {
        self.locals.len()
    }

    /// Operand stack bound
    pub fn max_stack(&self) -> usize {
        self.stack.max_stack()
    }

    /// Method this frame executes
    pub fn method(&self) -> Option<&Arc<Method>> {
        self.method.as_ref()
    }

    /// Bind the method this frame executes
    pub fn set_method(&mut self, method: Arc<Method>) {
        self.method = Some(method);
    }

    /// Caller's resume point
    pub fn return_pc(&self) -> usize {
        self.return_pc
    }

    /// Save the caller's resume point
    pub fn set_return_pc(&mut self, pc: usize) {
        self.return_pc = pc;
    }

    /// Whether the bound method is native
    pub fn is_native_frame(&self) -> bool {
        self.native
    }

    /// Mark the frame as native
    pub fn set_native_frame(&mut self, native: bool) {
        self.native = native;
    }
}
