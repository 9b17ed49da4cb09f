use crate::error::{ErrorKind, Result, ValidationError};
use crate::facts::{ConstantInt32, InstRef, ModuleFacts};
use crate::op_name;
use num_traits::cast::FromPrimitive;
use rspirv::spirv::{Capability, Scope, Word};

/// Validates execution and memory scope operands in isolation.
pub trait ScopeValidator {
    fn validate_execution_scope(
        &self,
        facts: &dyn ModuleFacts,
        inst: &InstRef<'_>,
        id: Word,
    ) -> Result<()>;

    fn validate_memory_scope(
        &self,
        facts: &dyn ModuleFacts,
        inst: &InstRef<'_>,
        id: Word,
    ) -> Result<()>;
}

/// The scope rules that apply to every barrier, regardless of opcode.
#[derive(Copy, Clone, Debug, Default)]
pub struct StandardScopes;

impl StandardScopes {
    /// Resolves a scope operand to its constant value, or `None` when it may
    /// legally be a runtime value.
    fn eval(
        facts: &dyn ModuleFacts,
        inst: &InstRef<'_>,
        id: Word,
        what: &str,
    ) -> Result<Option<Scope>> {
        let value = match facts.eval_int32_if_const(id) {
            ConstantInt32::NotInt32 => {
                return Err(ValidationError::new(
                    ErrorKind::MalformedOperandType,
                    inst,
                    format!(
                        "{}: expected {} to be a 32-bit int",
                        op_name(inst.opcode()),
                        what
                    ),
                ));
            }
            ConstantInt32::NonConstant => {
                if facts.has_capability(Capability::Shader) {
                    return Err(ValidationError::new(
                        ErrorKind::UnresolvedRequiredConstant,
                        inst,
                        "Scope ids must be OpConstant when Shader capability is present",
                    ));
                }
                return Ok(None);
            }
            ConstantInt32::Constant(value) => value,
        };

        match Scope::from_u32(value) {
            Some(scope) => Ok(Some(scope)),
            None => Err(ValidationError::new(
                ErrorKind::InvalidScope,
                inst,
                format!("{}: invalid scope value {}", op_name(inst.opcode()), value),
            )),
        }
    }
}

impl ScopeValidator for StandardScopes {
    fn validate_execution_scope(
        &self,
        facts: &dyn ModuleFacts,
        inst: &InstRef<'_>,
        id: Word,
    ) -> Result<()> {
        let scope = match Self::eval(facts, inst, id, "Execution Scope")? {
            Some(scope) => scope,
            None => return Ok(()),
        };

        if facts.target_env().is_vulkan() && scope != Scope::Workgroup && scope != Scope::Subgroup
        {
            return Err(ValidationError::new(
                ErrorKind::InvalidScope,
                inst,
                format!(
                    "{}: in Vulkan environment Execution Scope is limited to Workgroup and Subgroup",
                    op_name(inst.opcode())
                ),
            ));
        }
        Ok(())
    }

    fn validate_memory_scope(
        &self,
        facts: &dyn ModuleFacts,
        inst: &InstRef<'_>,
        id: Word,
    ) -> Result<()> {
        let scope = match Self::eval(facts, inst, id, "Memory Scope")? {
            Some(scope) => scope,
            None => return Ok(()),
        };

        if scope == Scope::QueueFamily && !facts.has_capability(Capability::VulkanMemoryModel) {
            return Err(ValidationError::new(
                ErrorKind::MissingCapability,
                inst,
                format!(
                    "{}: Memory Scope QueueFamilyKHR requires capability VulkanMemoryModelKHR",
                    op_name(inst.opcode())
                ),
            ));
        }

        if facts.target_env().is_vulkan() && scope == Scope::CrossDevice {
            return Err(ValidationError::new(
                ErrorKind::InvalidScope,
                inst,
                format!(
                    "{}: in Vulkan environment, Memory Scope cannot be CrossDevice",
                    op_name(inst.opcode())
                ),
            ));
        }
        Ok(())
    }
}
