//! Constants Tests

use wirekit_infrastructure::constants::*;

#[test]
fn test_processor_orders_are_strictly_increasing() {
    let orders = [
        ORDER_TAG_SCAN,
        ORDER_CONFIG_QUOTE,
        ORDER_EXPRESSION,
        ORDER_VALUE_BINDING,
        ORDER_DEPENDENCY_NAME,
        ORDER_DEPENDENCY_TYPE,
        ORDER_DEPENDENCY_INTERFACE,
        ORDER_DEPENDENCY_FUNCTION,
        ORDER_FURTHER_MATCHING,
        ORDER_DEPENDENCY_VALIDATE,
    ];
    assert!(orders.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn test_configuration_constants() {
    assert_eq!(DEFAULT_CONFIG_FILENAME, "wirekit.toml");
    assert_eq!(CONFIG_ENV_PREFIX, "WIREKIT");
    assert_eq!(CONFIG_ENV_SEPARATOR, "__");
    const { assert!(MAX_PLACEHOLDER_SUBSTITUTIONS > 0) };
}
