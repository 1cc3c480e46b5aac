//! Expression Evaluation Tests

use wirekit_domain::Error;
use wirekit_infrastructure::processors::expression::evaluate_expressions;

#[test]
fn test_arithmetic() {
    assert_eq!(evaluate_expressions("#{2 * 3 + 1}").unwrap(), "7");
    assert_eq!(evaluate_expressions("#{7 / 2.0}").unwrap(), "3.5");
}

#[test]
fn test_boolean_and_string_results() {
    assert_eq!(evaluate_expressions("#{1 < 2 && true}").unwrap(), "true");
    assert_eq!(evaluate_expressions(r#"#{"a" + "b"}"#).unwrap(), "ab");
}

#[test]
fn test_tuple_rendered_as_json() {
    assert_eq!(evaluate_expressions("#{(1, 2, 3)}").unwrap(), "[1,2,3]");
}

#[test]
fn test_surrounding_text_kept() {
    assert_eq!(
        evaluate_expressions("pool-#{2 * 4}-of-#{10 - 1}").unwrap(),
        "pool-8-of-9"
    );
    assert_eq!(evaluate_expressions("plain").unwrap(), "plain");
}

#[test]
fn test_invalid_expression() {
    let err = evaluate_expressions("#{1 +}").unwrap_err();
    match err {
        Error::Expression { expression, .. } => assert_eq!(expression, "1 +"),
        _ => panic!("Expected Expression error"),
    }
}

#[test]
fn test_unclosed_expression() {
    let err = evaluate_expressions("#{1 + 2").unwrap_err();
    match err {
        Error::Expression { message, .. } => assert_eq!(message, "unclosed expression"),
        _ => panic!("Expected Expression error"),
    }
}
