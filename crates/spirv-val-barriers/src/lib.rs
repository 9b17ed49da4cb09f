//! Validation of SPIR-V barrier instructions: `OpControlBarrier`, `OpMemoryBarrier`,
//! `OpNamedBarrierInitialize` and `OpMemoryNamedBarrier`.
//!
//! Most of their rules only need the instruction and a few module-wide facts
//! (capabilities, memory model, target environment), see [`BarrierPass`]. Some
//! depend on the execution model of the entry points calling the enclosing
//! function, which are only known once the whole module has been scanned; those
//! are recorded in [`FunctionLimitations`] and resolved afterwards.
//!
//! [`validate_module`] drives both phases over an `rspirv` module.


pub mod barriers;
pub mod call_graph;
pub mod error;
pub mod facts;
pub mod limitations;
pub mod options;
pub mod scopes;
pub mod semantics;
pub mod state;
pub mod target_env;
mod validate;

pub use barriers::BarrierPass;
pub use error::{ErrorKind, InstLocation, Result, ValidationError};
pub use facts::{ConstantInt32, InstRef, ModuleFacts};
pub use limitations::{ExecutionModelLimitation, FunctionLimitations};
pub use options::ValidatorOptions;
pub use scopes::{ScopeValidator, StandardScopes};
pub use state::ValidationState;
pub use target_env::TargetEnv;
pub use validate::{resolve_limitations, validate_module};

use rspirv::spirv::Op;

/// Validates a single barrier instruction, see [`BarrierPass::validate`].
pub fn validate_barrier_instruction(
    facts: &dyn ModuleFacts,
    scopes: &dyn ScopeValidator,
    options: &ValidatorOptions,
    inst: &InstRef<'_>,
    limitations: &mut FunctionLimitations,
) -> Result<()> {
    BarrierPass::new(facts, scopes, options).validate(inst, limitations)
}

pub(crate) fn op_name(opcode: Op) -> String {
    format!("Op{:?}", opcode)
}
