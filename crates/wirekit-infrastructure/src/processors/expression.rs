//! `#{...}` expression evaluation
//!
//! Runs after placeholder substitution, so expressions can use configuration:
//! `#{${pool.size:4} * 2}`.

use evalexpr::Value as EvalValue;
use wirekit_application::InstantiationAwarePostProcessor;
use wirekit_domain::constants::EXPRESSION_PREFIX;
use wirekit_domain::{Error, Instance, Ordered, PriorityOrdered, Property, Result, component};

use super::{builtin_processor, matching_brace};
use crate::constants::ORDER_EXPRESSION;
use crate::error_ext::ErrorContext;

#[derive(Debug, Default)]
pub struct ExpressionProcessor;

impl ExpressionProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn InstantiationAwarePostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(ExpressionProcessor, ORDER_EXPRESSION);

impl InstantiationAwarePostProcessor for ExpressionProcessor {
    fn post_process_properties(
        &self,
        properties: &mut [Property],
        _component: &Instance,
        _name: &str,
    ) -> Result<()> {
        for property in properties.iter_mut().filter(|p| p.is_configuration()) {
            if property.tag_value.contains(EXPRESSION_PREFIX) {
                property.tag_value =
                    evaluate_expressions(&property.tag_value).bind_context(&property.id())?;
            }
        }
        Ok(())
    }
}

/// Replace every `#{expr}` in `input` with its rendered result
pub fn evaluate_expressions(input: &str) -> Result<String> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find(EXPRESSION_PREFIX) {
        let open = start + 1;
        let end = matching_brace(rest, open)
            .ok_or_else(|| Error::expression(input, "unclosed expression"))?;
        let source = &rest[open + 1..end];
        let value = evalexpr::eval(source).expression_context(source)?;
        output.push_str(&rest[..start]);
        output.push_str(&render(&value));
        rest = &rest[end + 1..];
    }
    output.push_str(rest);
    Ok(output)
}

fn render(value: &EvalValue) -> String {
    match value {
        EvalValue::String(text) => text.clone(),
        EvalValue::Int(i) => i.to_string(),
        EvalValue::Float(f) => f.to_string(),
        EvalValue::Boolean(b) => b.to_string(),
        EvalValue::Tuple(items) => serde_json::Value::Array(items.iter().map(to_json).collect()).to_string(),
        EvalValue::Empty => String::new(),
    }
}

fn to_json(value: &EvalValue) -> serde_json::Value {
    match value {
        EvalValue::String(text) => serde_json::Value::String(text.clone()),
        EvalValue::Int(i) => serde_json::Value::from(*i),
        EvalValue::Float(f) => serde_json::Value::from(*f),
        EvalValue::Boolean(b) => serde_json::Value::Bool(*b),
        EvalValue::Tuple(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        EvalValue::Empty => serde_json::Value::Null,
    }
}
