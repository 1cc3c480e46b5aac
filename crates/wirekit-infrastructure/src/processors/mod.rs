//! Built-in post processors
//!
//! ### Definition processors (run once per component while preparing)
//! | Processor | Tag |
//! |-----------|-----|
//! | [`WireTagScanProcessor`] | `wire` |
//! | [`FuncTagScanProcessor`] | `func` |
//! | [`ValueTagScanProcessor`] | `value` |
//! | [`PropTagScanProcessor`] | `prop`, rewritten to `${path}` |
//! | [`PrefixScanProcessor`] | whole-component configuration |
//!
//! ### Property processors (run on every creation, in this order)
//! | Processor | Effect |
//! |-----------|--------|
//! | [`ConfigQuoteProcessor`] | substitutes `${path:default}` |
//! | [`ExpressionProcessor`] | evaluates `#{...}` |
//! | [`ValueBindingProcessor`] | decodes and validates configuration fields |
//! | [`DependencyNameProcessor`] | candidates by explicit name |
//! | [`DependencyTypeProcessor`] | candidates by concrete type |
//! | [`DependencyInterfaceProcessor`] | candidates by interface |
//! | [`DependencyFunctionProcessor`] | candidates by function result |
//! | [`DependencyFurtherMatchingProcessor`] | qualifier, self-injection, primary |
//! | [`DependencyValidateProcessor`] | required checks, dependent tracking |

use std::sync::{Arc, OnceLock};

use wirekit_application::{Configure, DefinitionRegistry};
use wirekit_domain::{Error, Instance, Result};

pub mod binding;
pub mod dependency;
pub mod expression;
pub mod matching;
pub mod quote;
pub mod scan;
pub mod validate;

pub use binding::ValueBindingProcessor;
pub use dependency::{
    DependencyFunctionProcessor, DependencyInterfaceProcessor, DependencyNameProcessor,
    DependencyTypeProcessor,
};
pub use expression::ExpressionProcessor;
pub use matching::DependencyFurtherMatchingProcessor;
pub use quote::ConfigQuoteProcessor;
pub use scan::{
    FieldScanner, FuncTagScanProcessor, PrefixScanProcessor, PropTagScanProcessor,
    ValueTagScanProcessor, WireTagScanProcessor,
};
pub use validate::DependencyValidateProcessor;

/// Every built-in processor, ready to register
pub fn builtin_processors() -> Vec<Instance> {
    vec![
        WireTagScanProcessor::instance(),
        FuncTagScanProcessor::instance(),
        ValueTagScanProcessor::instance(),
        PropTagScanProcessor::instance(),
        PrefixScanProcessor::instance(),
        ConfigQuoteProcessor::instance(),
        ExpressionProcessor::instance(),
        ValueBindingProcessor::instance(),
        DependencyNameProcessor::instance(),
        DependencyTypeProcessor::instance(),
        DependencyInterfaceProcessor::instance(),
        DependencyFunctionProcessor::instance(),
        DependencyFurtherMatchingProcessor::instance(),
        DependencyValidateProcessor::instance(),
    ]
}

/// Implements `Component`, `Ordered` and `PriorityOrdered` for a built-in processor
macro_rules! builtin_processor {
    ($processor:ty, $order:expr) => {
        impl wirekit_domain::Component for $processor {}

        impl wirekit_domain::Ordered for $processor {
            fn order(&self) -> i32 {
                $order
            }
        }

        impl wirekit_domain::PriorityOrdered for $processor {}
    };
}
pub(crate) use builtin_processor;

/// Definition registry injected through `DefinitionRegistryAware`
#[derive(Default)]
pub(crate) struct RegistryHandle(OnceLock<Arc<dyn DefinitionRegistry>>);

impl RegistryHandle {
    pub(crate) fn set(&self, registry: Arc<dyn DefinitionRegistry>) {
        let _ = self.0.set(registry);
    }

    pub(crate) fn get(&self) -> Result<&dyn DefinitionRegistry> {
        self.0
            .get()
            .map(|registry| registry.as_ref())
            .ok_or_else(|| Error::internal("definition registry was not injected"))
    }
}

/// Configuration injected through `ConfigureAware`
#[derive(Default)]
pub(crate) struct ConfigureHandle(OnceLock<Arc<dyn Configure>>);

impl ConfigureHandle {
    pub(crate) fn set(&self, configure: Arc<dyn Configure>) {
        let _ = self.0.set(configure);
    }

    pub(crate) fn get(&self) -> Result<&dyn Configure> {
        self.0
            .get()
            .map(|configure| configure.as_ref())
            .ok_or_else(|| Error::internal("configuration was not injected"))
    }
}

/// Index of the `}` closing the `{` at byte `open`, skipping nested pairs
pub(crate) fn matching_brace(input: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, byte) in input.bytes().enumerate().skip(open) {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
