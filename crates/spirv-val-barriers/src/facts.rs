//! Read-only queries the barrier checks make against the module being validated.

use crate::target_env::TargetEnv;
use rspirv::dr::Instruction;
use rspirv::spirv::{Capability, MemoryModel, Op, Word};

/// A function body instruction, together with where it lives in the module.
#[derive(Copy, Clone, Debug)]
pub struct InstRef<'a> {
    pub inst: &'a Instruction,
    /// Result id of the enclosing `OpFunction`.
    pub function: Word,
    /// Position among all function body instructions, in module order.
    pub index: usize,
}

impl<'a> InstRef<'a> {
    pub fn new(inst: &'a Instruction, function: Word, index: usize) -> Self {
        Self {
            inst,
            function,
            index,
        }
    }

    pub fn opcode(&self) -> Op {
        self.inst.class.opcode
    }

    /// The id in operand `index`, if that operand is an id of any kind.
    ///
    /// Operand indices don't count the result type and result id.
    pub fn id_operand(&self, index: usize) -> Option<Word> {
        self.inst.operands.get(index).and_then(|op| op.id_ref_any())
    }
}

/// Outcome of evaluating an id as a 32-bit integer constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConstantInt32 {
    /// The id's type is not a 32-bit integer scalar.
    NotInt32,
    /// A 32-bit integer, but its value isn't known statically.
    NonConstant,
    Constant(u32),
}

pub trait ModuleFacts {
    fn eval_int32_if_const(&self, id: Word) -> ConstantInt32;

    fn has_capability(&self, capability: Capability) -> bool;

    fn memory_model(&self) -> MemoryModel;

    fn target_env(&self) -> TargetEnv;

    /// Opcode of the instruction defining `id`.
    fn id_opcode(&self, id: Word) -> Option<Op>;

    /// Type id of the value `id`.
    fn type_of(&self, id: Word) -> Option<Word>;

    fn is_int_scalar_type(&self, type_id: Word) -> bool;

    fn bit_width(&self, type_id: Word) -> Option<u32>;

    fn operand_type_id(&self, inst: &InstRef<'_>, operand_index: usize) -> Option<Word> {
        inst.id_operand(operand_index).and_then(|id| self.type_of(id))
    }
}
