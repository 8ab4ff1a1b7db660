//! The bufferization pass.
//!
//! Legality policy:
//!
//! - ops of the configured always-legal dialects are left alone,
//! - ops of the target dialect are legal once every operand and result has
//!   its converted (buffer) type, and rewritten by
//!   [`BufferizeTensorAlgebraOp`] otherwise,
//! - everything else is ignored.
//!
//! The conversion runs on a copy of the function that replaces the original
//! only when the whole conversion succeeded.

use std::rc::Rc;

use snafu::ResultExt;
use tmir_ir::conversion::{
    ConversionConfig, ConversionPattern, ConversionStats, ConversionTarget, TypeConverter, apply_partial_conversion,
};
use tmir_ir::Func;

use crate::config::BufferizeConfig;
use crate::error::{PassFailedSnafu, Result};
use crate::pattern::BufferizeTensorAlgebraOp;
use crate::type_converter::bufferize_type_converter;

/// Summary of one successful run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Operations in the function before the run.
    pub ops_before: usize,
    /// Operations in the function after the run.
    pub ops_after: usize,
    pub conversion: ConversionStats,
}

impl PassStats {
    /// Number of tensor-algebra ops moved to buffer semantics.
    pub fn rewritten(&self) -> usize {
        self.conversion.rewritten
    }
}

/// Converts tensor-algebra ops working on tensors into ops working on
/// buffers.
#[derive(Debug, Clone, Default)]
pub struct BufferizePass {
    config: BufferizeConfig,
}

impl BufferizePass {
    pub fn new(config: BufferizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BufferizeConfig {
        &self.config
    }

    /// Conversion target implementing the legality policy for `converter`.
    pub fn conversion_target(&self, converter: &Rc<TypeConverter>) -> ConversionTarget {
        let mut target = ConversionTarget::new();
        target.add_legal_dialects(self.config.legal_dialects.iter().copied());
        let converter = Rc::clone(converter);
        target.add_dynamically_legal_dialect(self.config.target_dialect, move |graph, op| {
            converter.is_legal_op(graph, op)
        });
        target
    }

    /// Bufferize `func` in place.
    ///
    /// On failure `func` is left exactly as it was and the error carries the
    /// diagnostics of every op that could not be converted.
    #[tracing::instrument(skip_all, fields(func = func.name()))]
    pub fn run(&self, func: &mut Func) -> Result<PassStats> {
        let converter = Rc::new(bufferize_type_converter());
        let target = self.conversion_target(&converter);
        let patterns: Vec<Box<dyn ConversionPattern>> =
            vec![Box::new(BufferizeTensorAlgebraOp::new(self.config.registry.clone()))];
        let driver_config = ConversionConfig { max_iterations: self.config.max_iterations };

        let ops_before = func.body().num_ops();
        tracing::debug!(ops = ops_before, "bufferize start");
        tracing::trace!(input = %func, "bufferize input");

        let mut working = func.clone();
        let conversion = apply_partial_conversion(&mut working, &target, &converter, &patterns, &driver_config)
            .context(PassFailedSnafu { func: func.name() })?;
        *func = working;

        let stats = PassStats { ops_before, ops_after: func.body().num_ops(), conversion };
        tracing::debug!(
            rewritten = stats.conversion.rewritten,
            materializations = stats.conversion.materializations,
            ops = stats.ops_after,
            output = %func,
            "bufferize done"
        );
        Ok(stats)
    }
}
