use crate::facts::{ConstantInt32, ModuleFacts};
use crate::target_env::TargetEnv;
use rspirv::dr::{Instruction, Module, Operand};
use rspirv::spirv::{Capability, MemoryModel, Op, Word};
use std::collections::{HashMap, HashSet};

/// Module-wide facts, gathered once from an `rspirv` module before any
/// instruction is validated.
pub struct ValidationState<'m> {
    target_env: TargetEnv,
    capabilities: HashSet<Capability>,
    memory_model: MemoryModel,
    defs: HashMap<Word, &'m Instruction>,
}

impl<'m> ValidationState<'m> {
    pub fn new(module: &'m Module, target_env: TargetEnv) -> Self {
        let capabilities = module
            .capabilities
            .iter()
            .filter_map(|inst| match inst.operands.first() {
                Some(&Operand::Capability(cap)) => Some(cap),
                _ => None,
            })
            .collect();

        // A module without `OpMemoryModel` is invalid regardless of its barriers,
        // so fall back to a model that no barrier rule depends on.
        let memory_model = module
            .memory_model
            .as_ref()
            .and_then(|inst| match inst.operands.get(1) {
                Some(&Operand::MemoryModel(model)) => Some(model),
                _ => None,
            })
            .unwrap_or(MemoryModel::Simple);

        let defs = module
            .all_inst_iter()
            .filter_map(|inst| inst.result_id.map(|id| (id, inst)))
            .collect();

        Self {
            target_env,
            capabilities,
            memory_model,
            defs,
        }
    }

    pub fn def(&self, id: Word) -> Option<&'m Instruction> {
        self.defs.get(&id).copied()
    }
}

fn literal_u32(operand: &Operand) -> Option<u32> {
    match *operand {
        Operand::LiteralInt32(value) => Some(value),
        _ => None,
    }
}

impl ModuleFacts for ValidationState<'_> {
    fn eval_int32_if_const(&self, id: Word) -> ConstantInt32 {
        let inst = match self.def(id) {
            Some(inst) => inst,
            None => return ConstantInt32::NotInt32,
        };
        let is_int32 = inst
            .result_type
            .map_or(false, |ty| self.is_int_scalar_type(ty) && self.bit_width(ty) == Some(32));
        if !is_int32 {
            return ConstantInt32::NotInt32;
        }

        // Specialization constants can't be evaluated, so they count as runtime values.
        match inst.class.opcode {
            Op::ConstantNull => ConstantInt32::Constant(0),
            Op::Constant => inst
                .operands
                .first()
                .and_then(literal_u32)
                .map_or(ConstantInt32::NonConstant, ConstantInt32::Constant),
            _ => ConstantInt32::NonConstant,
        }
    }

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    fn memory_model(&self) -> MemoryModel {
        self.memory_model
    }

    fn target_env(&self) -> TargetEnv {
        self.target_env
    }

    fn id_opcode(&self, id: Word) -> Option<Op> {
        self.def(id).map(|inst| inst.class.opcode)
    }

    fn type_of(&self, id: Word) -> Option<Word> {
        self.def(id).and_then(|inst| inst.result_type)
    }

    fn is_int_scalar_type(&self, type_id: Word) -> bool {
        self.id_opcode(type_id) == Some(Op::TypeInt)
    }

    fn bit_width(&self, type_id: Word) -> Option<u32> {
        let inst = self.def(type_id)?;
        match inst.class.opcode {
            Op::TypeInt | Op::TypeFloat => inst.operands.first().and_then(literal_u32),
            Op::TypeVector => {
                let component = inst.operands.first()?.id_ref_any()?;
                self.bit_width(component)
            }
            _ => None,
        }
    }
}
