//! Decoding configuration literals into fields
//!
//! `validate=<rules>` checks the literal before it is decoded; a bare
//! `validate` flag runs the field type's own `Validate` implementation.
//!
//! | Rule | Passes when |
//! |------|-------------|
//! | `required` | the literal is not blank |
//! | `min=N` / `max=N` | the number, or the length of a string, array or map, is within bounds |
//! | `len=N` | the length is exactly `N` |
//! | `oneof=a\|b` | the literal is one of the listed values |
//! | `email` / `url` | the string is a valid address |
//! | `numeric` | the literal is a number |

use serde_json::Value;
use tracing::debug;
use validator::{ValidateEmail, ValidateUrl};
use wirekit_application::InstantiationAwarePostProcessor;
use wirekit_domain::constants::ARG_VALIDATE;
use wirekit_domain::{Error, Instance, Ordered, PriorityOrdered, Property, Result, component};

use super::builtin_processor;
use crate::constants::ORDER_VALUE_BINDING;

#[derive(Debug, Default)]
pub struct ValueBindingProcessor;

impl ValueBindingProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn InstantiationAwarePostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(ValueBindingProcessor, ORDER_VALUE_BINDING);

impl InstantiationAwarePostProcessor for ValueBindingProcessor {
    fn post_process_properties(
        &self,
        properties: &mut [Property],
        component: &Instance,
        name: &str,
    ) -> Result<()> {
        for property in properties.iter().filter(|p| p.is_configuration()) {
            let literal = property.tag_value.as_str();
            let rules = property.args.values_flat(ARG_VALIDATE);
            if literal.trim().is_empty() {
                if rules.iter().any(|rule| rule == "required") {
                    return Err(Error::validation(property.id(), "value is required"));
                }
                debug!(component = name, property = %property.id(), "No configuration value, field left unset");
                continue;
            }
            validate_rules(&property.id(), literal, &rules)?;
            let structural = property.args.has(ARG_VALIDATE) && rules.is_empty();
            property.bind_value(component, literal, structural)?;
            debug!(component = name, property = %property.id(), "Bound configuration value");
        }
        Ok(())
    }
}

/// Check `literal` against every rule, failing on the first violation
pub fn validate_rules(field: &str, literal: &str, rules: &[String]) -> Result<()> {
    if rules.is_empty() {
        return Ok(());
    }
    let value = serde_json::from_str::<Value>(literal.trim())
        .unwrap_or_else(|_| Value::String(literal.to_string()));
    for rule in rules {
        let (name, arg) = match rule.split_once('=') {
            Some((name, arg)) => (name, Some(arg)),
            None => (rule.as_str(), None),
        };
        let violation = match name {
            "required" => is_blank(&value).then(|| "value is required".to_string()),
            "min" => bound(field, &value, arg, |measured, limit| measured >= limit, "at least")?,
            "max" => bound(field, &value, arg, |measured, limit| measured <= limit, "at most")?,
            "len" => bound(field, &value, arg, |measured, limit| (measured - limit).abs() < f64::EPSILON, "exactly")?,
            "oneof" => {
                let allowed: Vec<&str> = arg.unwrap_or_default().split('|').map(str::trim).collect();
                let text = as_text(&value);
                (!allowed.contains(&text.as_str()))
                    .then(|| format!("`{text}` is not one of {}", allowed.join(", ")))
            }
            "email" => (!as_text(&value).validate_email()).then(|| "not a valid email address".to_string()),
            "url" => (!as_text(&value).validate_url()).then(|| "not a valid url".to_string()),
            "numeric" => (!value.is_number()).then(|| "not a number".to_string()),
            other => return Err(Error::validation(field, format!("unknown validation rule `{other}`"))),
        };
        if let Some(message) = violation {
            return Err(Error::validation(field, message));
        }
    }
    Ok(())
}

fn bound(
    field: &str,
    value: &Value,
    arg: Option<&str>,
    check: impl Fn(f64, f64) -> bool,
    relation: &str,
) -> Result<Option<String>> {
    let limit: f64 = arg
        .and_then(|a| a.trim().parse().ok())
        .ok_or_else(|| Error::validation(field, format!("`{relation}` rule needs a numeric argument")))?;
    let Some(measured) = measure(value) else {
        return Ok(Some("value has no size".to_string()));
    };
    Ok((!check(measured, limit)).then(|| format!("{measured} must be {relation} {limit}")))
}

#[allow(clippy::cast_precision_loss)]
fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(text) => Some(text.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(map) => Some(map.len() as f64),
        Value::Bool(_) | Value::Null => None,
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
