//! Algorithm registry keyed by id prefix.

use std::collections::HashMap;

use crate::error::AlgorithmError;
use crate::{Algorithm, R1};

/// Resolves an algorithm id prefix (e.g. `"R1"`) to its [`Algorithm`]
/// implementation.
///
/// Seeded with [`R1`] by default; [`AlgorithmRegistry::register`] allows
/// extension without touching callers that only depend on the trait.
pub struct AlgorithmRegistry {
    algorithms: HashMap<&'static str, Box<dyn Algorithm>>,
}

impl AlgorithmRegistry {
    /// Build a registry containing only the default algorithms (`R1`).
    pub fn new() -> Self {
        let mut algorithms: HashMap<&'static str, Box<dyn Algorithm>> = HashMap::new();
        algorithms.insert(R1.id(), Box::new(R1));
        Self { algorithms }
    }

    /// Register an additional algorithm implementation, replacing any
    /// existing entry under the same id.
    pub fn register(&mut self, algorithm: Box<dyn Algorithm>) {
        self.algorithms.insert(algorithm.id(), algorithm);
    }

    /// Resolve an algorithm by its id prefix.
    pub fn get(&self, id: &str) -> Result<&dyn Algorithm, AlgorithmError> {
        self.algorithms
            .get(id)
            .map(|a| a.as_ref())
            .ok_or_else(|| AlgorithmError::Unknown(id.to_string()))
    }
}

impl Default for AlgorithmRegistry {
    fn default() -> Self {
        Self::new()
    }
}
