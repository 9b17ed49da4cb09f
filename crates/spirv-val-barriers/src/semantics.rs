//! Checks for the Memory Semantics operand of barrier instructions.
//!
//! Once the operand is known to be a 32-bit constant, its value goes through an
//! ordered list of independent rules ([`check_constant`]). The first rule that
//! fails determines the reported error, so rules run from the most fundamental
//! (memory model, capabilities) to the most specific (cross-bit dependencies).

use crate::error::{ErrorKind, Result, ValidationError};
use crate::facts::{ConstantInt32, InstRef, ModuleFacts};
use crate::op_name;
use crate::options::ValidatorOptions;
use rspirv::spirv::{Capability, MemoryModel, MemorySemantics, Op, Word};

const MEMORY_ORDER: MemorySemantics = MemorySemantics::from_bits_truncate(
    MemorySemantics::ACQUIRE.bits()
        | MemorySemantics::RELEASE.bits()
        | MemorySemantics::ACQUIRE_RELEASE.bits()
        | MemorySemantics::SEQUENTIALLY_CONSISTENT.bits(),
);

/// Storage classes a Vulkan environment lets a barrier apply to.
const VULKAN_STORAGE_CLASSES: MemorySemantics = MemorySemantics::from_bits_truncate(
    MemorySemantics::UNIFORM_MEMORY.bits()
        | MemorySemantics::WORKGROUP_MEMORY.bits()
        | MemorySemantics::IMAGE_MEMORY.bits()
        | MemorySemantics::OUTPUT_MEMORY_KHR.bits(),
);

const STORAGE_CLASSES: MemorySemantics = MemorySemantics::from_bits_truncate(
    VULKAN_STORAGE_CLASSES.bits()
        | MemorySemantics::SUBGROUP_MEMORY.bits()
        | MemorySemantics::CROSS_WORKGROUP_MEMORY.bits()
        | MemorySemantics::ATOMIC_COUNTER_MEMORY.bits(),
);

type RuleResult = std::result::Result<(), Violation>;

/// A failed rule, not yet attributed to an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ErrorKind,
    pub message: String,
}

impl Violation {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn at(self, inst: &InstRef<'_>) -> ValidationError {
        ValidationError::new(self.kind, inst, self.message)
    }
}

/// Everything about the module and instruction that the constant rules depend on.
#[derive(Copy, Clone, Debug)]
pub struct SemanticsEnv {
    pub opcode: Op,
    pub memory_model: MemoryModel,
    pub vulkan_env: bool,
    pub vulkan_memory_model_capability: bool,
    pub control_barrier_vulkan_storage_class: bool,
}

impl SemanticsEnv {
    pub fn new(facts: &dyn ModuleFacts, options: &ValidatorOptions, opcode: Op) -> Self {
        Self {
            opcode,
            memory_model: facts.memory_model(),
            vulkan_env: facts.target_env().is_vulkan(),
            vulkan_memory_model_capability: facts.has_capability(Capability::VulkanMemoryModel),
            control_barrier_vulkan_storage_class: options.control_barrier_vulkan_storage_class,
        }
    }
}

pub fn validate_memory_semantics(
    facts: &dyn ModuleFacts,
    options: &ValidatorOptions,
    inst: &InstRef<'_>,
    id: Word,
) -> Result<()> {
    let opcode = inst.opcode();
    let value = match facts.eval_int32_if_const(id) {
        ConstantInt32::NotInt32 => {
            return Err(ValidationError::new(
                ErrorKind::MalformedOperandType,
                inst,
                format!(
                    "{}: expected Memory Semantics to be a 32-bit int",
                    op_name(opcode)
                ),
            ));
        }
        ConstantInt32::NonConstant => {
            if facts.has_capability(Capability::Shader) {
                return Err(ValidationError::new(
                    ErrorKind::UnresolvedRequiredConstant,
                    inst,
                    "Memory Semantics ids must be OpConstant when Shader capability is present",
                ));
            }
            tracing::trace!(id, "memory semantics not constant, skipping bit checks");
            return Ok(());
        }
        ConstantInt32::Constant(value) => value,
    };

    let env = SemanticsEnv::new(facts, options, opcode);
    check_constant(&env, value).map_err(|v| v.at(inst))
}

/// Runs every rule over a constant Memory Semantics value, in order.
///
/// Bits without a meaning in `MemorySemantics` are ignored, except where the
/// value is compared against None.
pub fn check_constant(env: &SemanticsEnv, value: u32) -> RuleResult {
    let semantics = MemorySemantics::from_bits_truncate(value);
    sequential_consistency(env, semantics)?;
    required_capabilities(env, semantics)?;
    at_most_one_memory_order(env, semantics)?;
    make_available_order(env, semantics)?;
    make_visible_order(env, semantics)?;
    vulkan_requirements(env, value)?;
    availability_storage_class(env, semantics)?;
    Ok(())
}

pub fn memory_order_bits(value: MemorySemantics) -> u32 {
    (value & MEMORY_ORDER).bits().count_ones()
}

pub fn sequential_consistency(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if env.memory_model == MemoryModel::Vulkan
        && value.contains(MemorySemantics::SEQUENTIALLY_CONSISTENT)
    {
        return Err(Violation::new(
            ErrorKind::IncompatibleMemoryModel,
            "SequentiallyConsistent memory semantics cannot be used with the VulkanKHR memory model.",
        ));
    }
    Ok(())
}

pub fn required_capabilities(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if env.vulkan_memory_model_capability {
        return Ok(());
    }
    let gated = [
        (MemorySemantics::OUTPUT_MEMORY_KHR, "OutputMemoryKHR"),
        (MemorySemantics::MAKE_AVAILABLE_KHR, "MakeAvailableKHR"),
        (MemorySemantics::MAKE_VISIBLE_KHR, "MakeVisibleKHR"),
    ];
    match gated.iter().find(|(bit, _)| value.contains(*bit)) {
        Some((_, name)) => Err(Violation::new(
            ErrorKind::MissingCapability,
            format!(
                "{}: Memory Semantics {} requires capability VulkanMemoryModelKHR",
                op_name(env.opcode),
                name
            ),
        )),
        None => Ok(()),
    }
}

pub fn at_most_one_memory_order(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if memory_order_bits(value) > 1 {
        return Err(Violation::new(
            ErrorKind::ConflictingMemoryOrderBits,
            format!(
                "{}: Memory Semantics can have at most one of the following bits set: \
                 Acquire, Release, AcquireRelease or SequentiallyConsistent",
                op_name(env.opcode)
            ),
        ));
    }
    Ok(())
}

pub fn make_available_order(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if value.contains(MemorySemantics::MAKE_AVAILABLE_KHR)
        && !value.intersects(MemorySemantics::RELEASE | MemorySemantics::ACQUIRE_RELEASE)
    {
        return Err(Violation::new(
            ErrorKind::MissingDependentBit,
            format!(
                "{}: MakeAvailableKHR Memory Semantics also requires either Release or \
                 AcquireRelease Memory Semantics",
                op_name(env.opcode)
            ),
        ));
    }
    Ok(())
}

pub fn make_visible_order(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if value.contains(MemorySemantics::MAKE_VISIBLE_KHR)
        && !value.intersects(MemorySemantics::ACQUIRE | MemorySemantics::ACQUIRE_RELEASE)
    {
        return Err(Violation::new(
            ErrorKind::MissingDependentBit,
            format!(
                "{}: MakeVisibleKHR Memory Semantics also requires either Acquire or \
                 AcquireRelease Memory Semantics",
                op_name(env.opcode)
            ),
        ));
    }
    Ok(())
}

pub fn vulkan_requirements(env: &SemanticsEnv, raw: u32) -> RuleResult {
    if !env.vulkan_env {
        return Ok(());
    }
    let value = MemorySemantics::from_bits_truncate(raw);
    let includes_storage_class = value.intersects(VULKAN_STORAGE_CLASSES);

    match env.opcode {
        Op::MemoryBarrier => {
            if memory_order_bits(value) == 0 {
                return Err(Violation::new(
                    ErrorKind::MissingMemoryOrderBit,
                    format!(
                        "{}: Vulkan specification requires Memory Semantics to have one of the \
                         following bits set: Acquire, Release, AcquireRelease or \
                         SequentiallyConsistent",
                        op_name(env.opcode)
                    ),
                ));
            }
            if !includes_storage_class {
                return Err(Violation::new(
                    ErrorKind::MissingStorageClassBit,
                    format!(
                        "{}: expected Memory Semantics to include a Vulkan-supported storage class",
                        op_name(env.opcode)
                    ),
                ));
            }
        }
        Op::ControlBarrier if env.control_barrier_vulkan_storage_class => {
            if raw != 0 && !includes_storage_class {
                return Err(Violation::new(
                    ErrorKind::MissingStorageClassBit,
                    format!(
                        "{}: expected Memory Semantics to include a Vulkan-supported storage \
                         class if Memory Semantics is not None",
                        op_name(env.opcode)
                    ),
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn availability_storage_class(env: &SemanticsEnv, value: MemorySemantics) -> RuleResult {
    if value.intersects(MemorySemantics::MAKE_AVAILABLE_KHR | MemorySemantics::MAKE_VISIBLE_KHR)
        && !value.intersects(STORAGE_CLASSES)
    {
        return Err(Violation::new(
            ErrorKind::MissingDependentBit,
            format!(
                "{}: expected Memory Semantics to include a storage class",
                op_name(env.opcode)
            ),
        ));
    }
    Ok(())
}
