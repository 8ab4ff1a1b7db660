//! Pass configuration.

use bon::bon;
use tmir_ir::InterfaceRegistry;
use tmir_ir::dialect::{arith, bufferization, func, memref, tensor, tm_tensor};

/// Iteration budget of the conversion driver.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Dialects whose ops are legal no matter what types they use.
pub fn default_legal_dialects() -> Vec<&'static str> {
    vec![arith::DIALECT, func::DIALECT, memref::DIALECT, tensor::DIALECT, bufferization::DIALECT]
}

/// Configuration of [`BufferizePass`](crate::BufferizePass).
#[derive(Debug, Clone)]
pub struct BufferizeConfig {
    /// Dialect whose ops are rewritten. Its ops are legal once every operand
    /// and result has a buffer (or non-tensor) type.
    pub target_dialect: &'static str,
    /// Always-legal passthrough dialects.
    pub legal_dialects: Vec<&'static str>,
    /// Tensor-algebra contracts of the ops to rewrite.
    pub registry: InterfaceRegistry,
    /// Upper bound on legalization attempts by the driver.
    pub max_iterations: usize,
}

impl Default for BufferizeConfig {
    fn default() -> Self {
        Self {
            target_dialect: tm_tensor::DIALECT,
            legal_dialects: default_legal_dialects(),
            registry: InterfaceRegistry::with_builtin_dialects(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[bon]
impl BufferizeConfig {
    /// Create a bufferization configuration with builder pattern.
    #[builder(finish_fn = build)]
    pub fn builder(
        #[builder(default = tm_tensor::DIALECT)] target_dialect: &'static str,
        #[builder(default = default_legal_dialects())] legal_dialects: Vec<&'static str>,
        #[builder(default = InterfaceRegistry::with_builtin_dialects())] registry: InterfaceRegistry,
        #[builder(default = DEFAULT_MAX_ITERATIONS)] max_iterations: usize,
    ) -> Self {
        Self { target_dialect, legal_dialects, registry, max_iterations }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TMIR_BUFFERIZE_MAX_ITERATIONS` - Driver legalization budget (default: 10000)
    pub fn from_env() -> Self {
        let max_iterations = std::env::var("TMIR_BUFFERIZE_MAX_ITERATIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MAX_ITERATIONS);

        Self { max_iterations, ..Default::default() }
    }
}
