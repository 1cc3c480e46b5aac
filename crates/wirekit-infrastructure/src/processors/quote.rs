//! `${path:default}` placeholder substitution
//!
//! Placeholders are resolved innermost first, so a default or a key may itself
//! contain placeholders: `${db.${env:local}.host}`.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;
use wirekit_application::{Configure, ConfigureAware, InstantiationAwarePostProcessor};
use wirekit_domain::constants::PLACEHOLDER_PREFIX;
use wirekit_domain::{Error, Instance, Ordered, PriorityOrdered, Property, Result, component};

use super::{ConfigureHandle, builtin_processor, matching_brace};
use crate::constants::{MAX_PLACEHOLDER_SUBSTITUTIONS, ORDER_CONFIG_QUOTE};
use crate::error_ext::ErrorContext;

#[derive(Default)]
pub struct ConfigQuoteProcessor {
    configure: ConfigureHandle,
}

impl ConfigQuoteProcessor {
    pub fn instance() -> Instance {
        component!(
            Self::default();
            dyn InstantiationAwarePostProcessor,
            dyn ConfigureAware,
            dyn Ordered,
            dyn PriorityOrdered
        )
    }
}

builtin_processor!(ConfigQuoteProcessor, ORDER_CONFIG_QUOTE);

impl ConfigureAware for ConfigQuoteProcessor {
    fn set_configure(&self, configure: Arc<dyn Configure>) {
        self.configure.set(configure);
    }
}

impl InstantiationAwarePostProcessor for ConfigQuoteProcessor {
    fn post_process_properties(
        &self,
        properties: &mut [Property],
        _component: &Instance,
        _name: &str,
    ) -> Result<()> {
        let configure = self.configure.get()?;
        for property in properties.iter_mut().filter(|p| p.is_configuration()) {
            if property.tag_value.contains(PLACEHOLDER_PREFIX) {
                property.tag_value =
                    resolve_placeholders(&property.tag_value, configure).bind_context(&property.id())?;
            }
        }
        Ok(())
    }
}

/// Substitute every `${key}` / `${key:default}` in `input`
///
/// Strings are substituted as-is, other values in their JSON form. A key that
/// is absent (missing, null, empty array or empty object) uses its default;
/// without one it becomes the empty string and a warning is logged.
pub fn resolve_placeholders(input: &str, configure: &dyn Configure) -> Result<String> {
    let mut output = input.to_string();
    let mut substitutions = 0usize;
    while let Some(start) = output.rfind(PLACEHOLDER_PREFIX) {
        substitutions += 1;
        if substitutions > MAX_PLACEHOLDER_SUBSTITUTIONS {
            return Err(Error::configuration(format!(
                "placeholder substitution in `{input}` did not terminate after {MAX_PLACEHOLDER_SUBSTITUTIONS} steps"
            )));
        }
        let open = start + 1;
        let end = matching_brace(&output, open)
            .ok_or_else(|| Error::configuration(format!("unclosed placeholder in `{input}`")))?;
        let body = &output[open + 1..end];
        let (key, default) = match body.split_once(':') {
            Some((key, default)) => (key.trim(), Some(default)),
            None => (body.trim(), None),
        };
        let replacement = match (configure.get(key).filter(|v| !is_absent(v)), default) {
            (Some(Value::String(text)), _) => text,
            (Some(value), _) => value.to_string(),
            (None, Some(default)) => default.to_string(),
            (None, None) => {
                warn!(key, "Configuration key not found, substituting an empty value");
                String::new()
            }
        };
        output.replace_range(start..=end, &replacement);
    }
    Ok(output)
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
