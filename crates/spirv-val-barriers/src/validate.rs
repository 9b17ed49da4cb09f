use crate::barriers::{is_barrier_opcode, BarrierPass};
use crate::call_graph::CallGraph;
use crate::error::{Result, ValidationError};
use crate::facts::InstRef;
use crate::limitations::FunctionLimitations;
use crate::options::ValidatorOptions;
use crate::scopes::StandardScopes;
use crate::state::ValidationState;
use crate::target_env::TargetEnv;
use rspirv::dr::Module;

/// Validates every barrier instruction in `module`.
///
/// Function bodies are scanned in module order first, stopping at the first
/// invalid instruction. Only then are the execution model limitations gathered
/// along the way checked, for every function against every execution model that
/// reaches it.
pub fn validate_module(
    module: &Module,
    target_env: TargetEnv,
    options: &ValidatorOptions,
) -> Result<()> {
    let state = ValidationState::new(module, target_env);
    let pass = BarrierPass::new(&state, &StandardScopes, options);
    let mut limitations = FunctionLimitations::default();

    let mut index = 0;
    let mut barriers = 0;
    for func in &module.functions {
        let function = func
            .def_id()
            .ok_or_else(|| ValidationError::module("OpFunction is missing a result id"))?;
        for inst in func.blocks.iter().flat_map(|block| &block.instructions) {
            if is_barrier_opcode(inst.class.opcode) {
                barriers += 1;
                pass.validate(&InstRef::new(inst, function, index), &mut limitations)?;
            }
            index += 1;
        }
    }

    resolve_limitations(module, &limitations)?;

    tracing::debug!(?target_env, barriers, "barrier validation passed");
    Ok(())
}

/// Checks the limitations registered while scanning `module` against the
/// execution models of the entry points that call (transitively) into each function.
///
/// Functions no entry point reaches are never resolved.
pub fn resolve_limitations(module: &Module, limitations: &FunctionLimitations) -> Result<()> {
    if limitations.is_empty() {
        return Ok(());
    }

    let models = CallGraph::collect(module)?.reaching_execution_models();
    for function in limitations.functions() {
        for &model in models.get(&function).into_iter().flatten() {
            limitations.resolve(function, model)?;
        }
    }
    Ok(())
}
