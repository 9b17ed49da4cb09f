use crate::error::{ErrorKind, Result, ValidationError};
use crate::facts::{InstRef, ModuleFacts};
use crate::limitations::{ExecutionModelLimitation, FunctionLimitations};
use crate::op_name;
use crate::options::ValidatorOptions;
use crate::scopes::ScopeValidator;
use crate::semantics::validate_memory_semantics;
use rspirv::spirv::{ExecutionModel, Op, Word};

/// Before SPIR-V 1.3, `OpControlBarrier` is only allowed in these execution models.
const CONTROL_BARRIER_EXECUTION_MODELS: &[ExecutionModel] = &[
    ExecutionModel::TessellationControl,
    ExecutionModel::GLCompute,
    ExecutionModel::Kernel,
    ExecutionModel::TaskNV,
    ExecutionModel::MeshNV,
];

pub fn is_barrier_opcode(opcode: Op) -> bool {
    matches!(
        opcode,
        Op::ControlBarrier | Op::MemoryBarrier | Op::NamedBarrierInitialize | Op::MemoryNamedBarrier
    )
}

/// Validates the barrier family of instructions against a single module.
#[derive(Copy, Clone)]
pub struct BarrierPass<'a> {
    facts: &'a dyn ModuleFacts,
    scopes: &'a dyn ScopeValidator,
    options: &'a ValidatorOptions,
}

impl<'a> BarrierPass<'a> {
    pub fn new(
        facts: &'a dyn ModuleFacts,
        scopes: &'a dyn ScopeValidator,
        options: &'a ValidatorOptions,
    ) -> Self {
        Self {
            facts,
            scopes,
            options,
        }
    }

    /// Validates one instruction. Instructions outside the barrier family are
    /// accepted without looking at them.
    ///
    /// Checks that depend on the execution model of the enclosing function are
    /// recorded in `limitations` instead, and must be resolved once the module's
    /// entry points are known.
    pub fn validate(
        &self,
        inst: &InstRef<'_>,
        limitations: &mut FunctionLimitations,
    ) -> Result<()> {
        match inst.opcode() {
            Op::ControlBarrier => self.control_barrier(inst, limitations),
            Op::MemoryBarrier => self.memory_barrier(inst),
            Op::NamedBarrierInitialize => self.named_barrier_initialize(inst),
            Op::MemoryNamedBarrier => self.memory_named_barrier(inst),
            _ => Ok(()),
        }
    }

    fn control_barrier(
        &self,
        inst: &InstRef<'_>,
        limitations: &mut FunctionLimitations,
    ) -> Result<()> {
        tracing::trace!(index = inst.index, "OpControlBarrier");
        if self.facts.target_env().spirv_version() < (1, 3) {
            limitations.register(
                inst.function,
                inst.into(),
                ExecutionModelLimitation::new(
                    CONTROL_BARRIER_EXECUTION_MODELS,
                    "OpControlBarrier requires one of the following Execution Models: \
                     TessellationControl, GLCompute or Kernel",
                ),
            );
        }

        let execution_scope = operand(inst, 0, "Execution Scope")?;
        let memory_scope = operand(inst, 1, "Memory Scope")?;
        let memory_semantics = operand(inst, 2, "Memory Semantics")?;

        self.scopes.validate_execution_scope(self.facts, inst, execution_scope)?;
        self.scopes.validate_memory_scope(self.facts, inst, memory_scope)?;
        validate_memory_semantics(self.facts, self.options, inst, memory_semantics)
    }

    fn memory_barrier(&self, inst: &InstRef<'_>) -> Result<()> {
        tracing::trace!(index = inst.index, "OpMemoryBarrier");
        let memory_scope = operand(inst, 0, "Memory Scope")?;
        let memory_semantics = operand(inst, 1, "Memory Semantics")?;

        self.memory_scope_and_semantics(inst, memory_scope, memory_semantics)
    }

    fn named_barrier_initialize(&self, inst: &InstRef<'_>) -> Result<()> {
        tracing::trace!(index = inst.index, "OpNamedBarrierInitialize");
        let result_type = inst.inst.result_type;
        if result_type.and_then(|ty| self.facts.id_opcode(ty)) != Some(Op::TypeNamedBarrier) {
            return Err(ValidationError::new(
                ErrorKind::WrongOperandKind,
                inst,
                format!(
                    "{}: expected Result Type to be OpTypeNamedBarrier",
                    op_name(inst.opcode())
                ),
            ));
        }

        let subgroup_count_type = self.facts.operand_type_id(inst, 0);
        let is_u32 = subgroup_count_type.map_or(false, |ty| {
            self.facts.is_int_scalar_type(ty) && self.facts.bit_width(ty) == Some(32)
        });
        if !is_u32 {
            return Err(ValidationError::new(
                ErrorKind::MalformedOperandType,
                inst,
                format!(
                    "{}: expected Subgroup Count to be a 32-bit int",
                    op_name(inst.opcode())
                ),
            ));
        }
        Ok(())
    }

    fn memory_named_barrier(&self, inst: &InstRef<'_>) -> Result<()> {
        tracing::trace!(index = inst.index, "OpMemoryNamedBarrier");
        let named_barrier_type = self.facts.operand_type_id(inst, 0);
        if named_barrier_type.and_then(|ty| self.facts.id_opcode(ty)) != Some(Op::TypeNamedBarrier)
        {
            return Err(ValidationError::new(
                ErrorKind::WrongOperandKind,
                inst,
                format!(
                    "{}: expected Named Barrier to be of type OpTypeNamedBarrier",
                    op_name(inst.opcode())
                ),
            ));
        }

        let memory_scope = operand(inst, 1, "Memory Scope")?;
        let memory_semantics = operand(inst, 2, "Memory Semantics")?;

        self.memory_scope_and_semantics(inst, memory_scope, memory_semantics)
    }

    fn memory_scope_and_semantics(
        &self,
        inst: &InstRef<'_>,
        memory_scope: Word,
        memory_semantics: Word,
    ) -> Result<()> {
        self.scopes.validate_memory_scope(self.facts, inst, memory_scope)?;
        validate_memory_semantics(self.facts, self.options, inst, memory_semantics)
    }
}

fn operand(inst: &InstRef<'_>, index: usize, what: &str) -> Result<Word> {
    inst.id_operand(index).ok_or_else(|| {
        ValidationError::new(
            ErrorKind::MalformedOperandType,
            inst,
            format!("{}: expected {} operand", op_name(inst.opcode()), what),
        )
    })
}
