//! Which entry points, and so which execution models, can reach each function.

use crate::error::{Result, ValidationError};
use indexmap::{IndexMap, IndexSet};
use rspirv::dr::{Module, Operand};
use rspirv::spirv::{ExecutionModel, Op, Word};

type FuncIdx = usize;

pub struct CallGraph {
    /// Result id of every `OpFunction`, indexed like `module.functions`.
    pub function_ids: Vec<Word>,

    /// Entry point functions, with their execution models, in `OpEntryPoint` order.
    pub entry_points: Vec<(FuncIdx, ExecutionModel)>,

    /// `callees[i].contains(j)` implies `functions[i]` calls `functions[j]`.
    pub callees: Vec<IndexSet<FuncIdx>>,
}

impl CallGraph {
    pub fn collect(module: &Module) -> Result<Self> {
        let function_ids = module
            .functions
            .iter()
            .map(|func| {
                func.def_id()
                    .ok_or_else(|| ValidationError::module("OpFunction is missing a result id"))
            })
            .collect::<Result<Vec<_>>>()?;
        let func_id_to_idx: IndexMap<Word, FuncIdx> = function_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let entry_points = module
            .entry_points
            .iter()
            .filter(|entry| entry.class.opcode == Op::EntryPoint)
            .map(|entry| match (entry.operands.get(0), entry.operands.get(1)) {
                (Some(&Operand::ExecutionModel(model)), Some(&Operand::IdRef(id))) => {
                    match func_id_to_idx.get(&id) {
                        Some(&idx) => Ok((idx, model)),
                        None => Err(ValidationError::module(format!(
                            "OpEntryPoint Entry Point <id> {} is not a function",
                            id
                        ))),
                    }
                }
                _ => Err(ValidationError::module("malformed OpEntryPoint")),
            })
            .collect::<Result<Vec<_>>>()?;

        // Calls to ids that aren't functions are someone else's problem.
        let callees = module
            .functions
            .iter()
            .map(|func| {
                func.all_inst_iter()
                    .filter(|inst| inst.class.opcode == Op::FunctionCall)
                    .filter_map(|inst| inst.operands.first()?.id_ref_any())
                    .filter_map(|id| func_id_to_idx.get(&id).copied())
                    .collect()
            })
            .collect();

        Ok(Self {
            function_ids,
            entry_points,
            callees,
        })
    }

    /// For every function reachable from an entry point, the execution models of
    /// the entry points reaching it, in `OpEntryPoint` order.
    pub fn reaching_execution_models(&self) -> IndexMap<Word, IndexSet<ExecutionModel>> {
        let mut models: Vec<IndexSet<ExecutionModel>> = vec![IndexSet::new(); self.callees.len()];

        for &(entry, model) in &self.entry_points {
            let mut stack = vec![entry];
            while let Some(func) = stack.pop() {
                if models[func].insert(model) {
                    stack.extend(self.callees[func].iter().copied());
                }
            }
        }

        self.function_ids
            .iter()
            .zip(models)
            .filter(|(_, models)| !models.is_empty())
            .map(|(&id, models)| (id, models))
            .collect()
    }
}
