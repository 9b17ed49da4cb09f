use crate::InstRef;
use rspirv::spirv::{Op, Word};
use std::fmt;
use thiserror::Error;

/// Category of a barrier validation failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand is not the expected scalar kind or width.
    MalformedOperandType,
    /// A capability requires the operand to be an `OpConstant`, but it isn't.
    UnresolvedRequiredConstant,
    /// Memory Semantics not allowed by the module's memory model.
    IncompatibleMemoryModel,
    /// A bit or scope needs a capability the module doesn't declare.
    MissingCapability,
    /// More than one of Acquire, Release, AcquireRelease and SequentiallyConsistent.
    ConflictingMemoryOrderBits,
    /// `MakeAvailable`/`MakeVisible` without the memory order or storage class bits they depend on.
    MissingDependentBit,
    /// Vulkan requires a memory order bit, none is set.
    MissingMemoryOrderBit,
    /// Vulkan requires a storage class bit it supports, none is set.
    MissingStorageClassBit,
    /// Named barrier operand or result type is not `OpTypeNamedBarrier`.
    WrongOperandKind,
    /// Reached from an entry point whose execution model doesn't allow the instruction.
    DeferredExecutionModelViolation,
    /// Scope value undefined, or not allowed in the target environment.
    InvalidScope,
    /// The module itself is malformed, e.g. an `OpEntryPoint` naming a non-function.
    InvalidModule,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorKind::*;

        f.write_str(match self {
            MalformedOperandType => "malformed operand type",
            UnresolvedRequiredConstant => "unresolved required constant",
            IncompatibleMemoryModel => "incompatible memory model",
            MissingCapability => "missing capability",
            ConflictingMemoryOrderBits => "conflicting memory order bits",
            MissingDependentBit => "missing dependent bit",
            MissingMemoryOrderBit => "missing memory order bit",
            MissingStorageClassBit => "missing storage class bit",
            WrongOperandKind => "wrong operand kind",
            DeferredExecutionModelViolation => "execution model violation",
            InvalidScope => "invalid scope",
            InvalidModule => "invalid module",
        })
    }
}

/// Where in the module an offending instruction lives.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InstLocation {
    pub opcode: Op,
    pub result_id: Option<Word>,
    /// Result id of the enclosing `OpFunction`.
    pub function: Word,
    /// Position of the instruction among all function body instructions, in module order.
    pub index: usize,
}

impl From<&InstRef<'_>> for InstLocation {
    fn from(inst: &InstRef<'_>) -> Self {
        Self {
            opcode: inst.opcode(),
            result_id: inst.inst.result_id,
            function: inst.function,
            index: inst.index,
        }
    }
}

/// A barrier instruction (or the module) failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}{} - {message}", at_index(.location))]
pub struct ValidationError {
    pub kind: ErrorKind,
    /// The offending instruction, absent for module-level errors.
    pub location: Option<InstLocation>,
    pub message: String,
}

fn at_index(location: &Option<InstLocation>) -> String {
    location.map_or_else(String::new, |loc| format!(":{}", loc.index))
}

impl ValidationError {
    pub fn new(kind: ErrorKind, inst: &InstRef<'_>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: Some(inst.into()),
            message: message.into(),
        }
    }

    /// An error that isn't attributable to a single instruction.
    pub fn module(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidModule,
            location: None,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
