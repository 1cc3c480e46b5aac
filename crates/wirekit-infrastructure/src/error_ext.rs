//! Context for foreign errors raised while wiring components
//!
//! Figment, `serde_json`, evalexpr and tracing-subscriber failures surface
//! at a handful of places. Each gets the domain variant for its step.

use std::fmt::Display;

use wirekit_domain::error::{Error, Result};

/// Converts any error into the wirekit variant for the step that failed
///
/// ```ignore
/// use wirekit_infrastructure::error_ext::ErrorContext;
///
/// let root: serde_json::Value = figment
///     .extract()
///     .config_context("Failed to extract configuration")?;
/// let value = evalexpr::eval(source).expression_context(source)?;
/// ```
pub trait ErrorContext<T> {
    /// [`Error::Configuration`] keeping the source
    fn config_context<C: Display>(self, context: C) -> Result<T>;

    /// [`Error::Binding`] on `property`
    fn bind_context(self, property: &str) -> Result<T>;

    /// [`Error::Expression`] naming the expression source
    fn expression_context(self, expression: &str) -> Result<T>;

    /// [`Error::Infrastructure`] keeping the source
    fn infra_context<C: Display>(self, context: C) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|err| Error::configuration_with_source(format!("{context}: {err}"), err))
    }

    fn bind_context(self, property: &str) -> Result<T> {
        self.map_err(|err| Error::binding(property, err.to_string()))
    }

    fn expression_context(self, expression: &str) -> Result<T> {
        self.map_err(|err| Error::expression(expression, err.to_string()))
    }

    fn infra_context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|err| Error::infrastructure_with_source(format!("{context}: {err}"), err))
    }
}
