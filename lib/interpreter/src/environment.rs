use std::collections::HashMap;

use scanner::Token;

use crate::{value::Value, RuntimeError, RuntimeErrorType};

/// A single, flat table of global bindings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any earlier binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Looking up a name that was never defined is a runtime error, not a syntax error,
    /// so code may mention names that only get defined later.
    pub fn get(&self, name: &Token) -> Result<&Value, RuntimeError> {
        self.values.get(name.lexeme()).ok_or_else(|| {
            let error = RuntimeErrorType::UndefinedVariable(name.lexeme().to_string());
            RuntimeError::new(error, name.line())
        })
    }
}
