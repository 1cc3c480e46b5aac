//! Tag and argument names shared by scanners and processors

/// Dependency injection by name, type or interface
pub const WIRE_TAG: &str = "wire";

/// Dependency injection by named function result
pub const FUNC_TAG: &str = "func";

/// Literal configuration binding, placeholders and expressions allowed
pub const VALUE_TAG: &str = "value";

/// Configuration path binding, rewritten to a `${...}` placeholder
pub const PROP_TAG: &str = "prop";

/// Whole-component binding below a configuration prefix
pub const PREFIX_TAG: &str = "prefix";

/// `required=false` makes an unsatisfied dependency optional
pub const ARG_REQUIRED: &str = "required";

/// Restricts candidates to components declaring one of the listed qualifiers
pub const ARG_QUALIFIER: &str = "qualifier";

/// Expected function results for `func` dependencies
pub const ARG_RETURNS: &str = "returns";

/// Validation rules for configuration bindings
pub const ARG_VALIDATE: &str = "validate";

/// Matches any function result
pub const RESULT_WILDCARD: &str = "*";

/// Placeholder opening sequence
pub const PLACEHOLDER_PREFIX: &str = "${";

/// Expression opening sequence
pub const EXPRESSION_PREFIX: &str = "#{";
