//! Checks that can only run once the execution models reaching a function are known.
//!
//! While instructions are visited, the entry points calling into their function
//! may not have been linked up yet. Such checks are recorded here as plain data
//! against the function, and resolved after the whole module has been scanned.

use crate::error::{ErrorKind, InstLocation, Result, ValidationError};
use indexmap::IndexMap;
use rspirv::spirv::{ExecutionModel, Word};
use std::borrow::Cow;

/// Restricts which execution models may (transitively) call a function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionModelLimitation {
    pub allowed: Cow<'static, [ExecutionModel]>,
    pub message: Cow<'static, str>,
}

impl ExecutionModelLimitation {
    pub fn new(
        allowed: impl Into<Cow<'static, [ExecutionModel]>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            allowed: allowed.into(),
            message: message.into(),
        }
    }

    pub fn check(&self, model: ExecutionModel) -> std::result::Result<(), &str> {
        if self.allowed.contains(&model) {
            Ok(())
        } else {
            Err(&*self.message)
        }
    }
}

#[derive(Clone, Debug)]
struct Registered {
    limitation: ExecutionModelLimitation,
    origin: InstLocation,
}

/// Pending limitations, keyed by the result id of the function they apply to.
#[derive(Clone, Debug, Default)]
pub struct FunctionLimitations {
    by_function: IndexMap<Word, Vec<Registered>>,
}

impl FunctionLimitations {
    pub fn register(
        &mut self,
        function: Word,
        origin: InstLocation,
        limitation: ExecutionModelLimitation,
    ) {
        tracing::debug!(
            function,
            opcode = ?origin.opcode,
            "registered execution model limitation"
        );
        self.by_function
            .entry(function)
            .or_default()
            .push(Registered { limitation, origin });
    }

    pub fn is_empty(&self) -> bool {
        self.by_function.is_empty()
    }

    /// Functions with at least one pending limitation, in registration order.
    pub fn functions(&self) -> impl Iterator<Item = Word> + '_ {
        self.by_function.keys().copied()
    }

    pub fn limitations(
        &self,
        function: Word,
    ) -> impl Iterator<Item = &ExecutionModelLimitation> + '_ {
        self.by_function
            .get(&function)
            .into_iter()
            .flatten()
            .map(|registered| &registered.limitation)
    }

    /// Checks every limitation of `function` against one execution model that reaches it.
    pub fn resolve(&self, function: Word, model: ExecutionModel) -> Result<()> {
        let registered = match self.by_function.get(&function) {
            Some(registered) => registered,
            None => return Ok(()),
        };
        for Registered { limitation, origin } in registered {
            if let Err(message) = limitation.check(model) {
                return Err(ValidationError {
                    kind: ErrorKind::DeferredExecutionModelViolation,
                    location: Some(*origin),
                    message: message.to_owned(),
                });
            }
        }
        Ok(())
    }
}
