//! Tests for prefix expression parsing and evaluation

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use ifsforge::io::configuration::MAX_EXPRESSION_DEPTH;
    use ifsforge::math::expression::{
        BinaryOp, EvaluationError, Expression, ExpressionError, Node,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn eval(text: &str, names: &[&str], values: &[f64]) -> Result<f64, EvaluationError> {
        let expression = Expression::parse(text, names).expect("expression should parse");
        let mut rng = StdRng::seed_from_u64(7);
        expression.evaluate(values, &mut rng)
    }

    // Tests operators precede their operands
    // Verified by swapping operand order in the parser
    #[test]
    fn test_prefix_addition_over_parameters() {
        let value = eval("+ y x", &["x", "y"], &[2.0, 3.0]).expect("evaluation should succeed");
        assert!((value - 5.0).abs() < f64::EPSILON);

        let value = eval("- x y", &["x", "y"], &[2.0, 3.0]).expect("evaluation should succeed");
        assert!((value + 1.0).abs() < f64::EPSILON, "subtraction is left minus right");
    }

    // Tests nested operators and unary functions
    // Verified by evaluating unary operands twice
    #[test]
    fn test_nested_expression() {
        let value = eval("+ * x x square y", &["x", "y"], &[3.0, 2.0])
            .expect("evaluation should succeed");
        assert!((value - 13.0).abs() < 1e-12);

        let value = eval("sign - 0 x", &["x"], &[4.0]).expect("evaluation should succeed");
        assert!((value + 1.0).abs() < f64::EPSILON);
    }

    // Tests division by an exact zero is reported
    // Verified by returning infinity instead of an error
    #[test]
    fn test_division_by_zero_fails() {
        for x in [-3.0, 0.0, 1.5] {
            assert_eq!(
                eval("/ x 0", &["x"], &[x]),
                Err(EvaluationError::DivisionByZero)
            );
        }
    }

    // Tests multiplication short-circuits on a zero left operand
    // Verified by always evaluating the right operand
    #[test]
    fn test_zero_multiplication_skips_right_operand() {
        let value = eval("* 0 / x 0", &["x"], &[1.0]).expect("right operand must not run");
        assert!(value.abs() < f64::EPSILON);
    }

    // Tests the conditional operators
    // Verified by inverting the test operator branches
    #[test]
    fn test_less_and_test_operators() {
        assert_eq!(eval("< x y", &["x", "y"], &[1.0, 2.0]), Ok(1.0));
        assert_eq!(eval("< y x", &["x", "y"], &[1.0, 2.0]), Ok(0.0));
        assert_eq!(eval("test 0 y", &["y"], &[9.0]), Ok(9.0));
        assert_eq!(eval("test 4 y", &["y"], &[9.0]), Ok(4.0));
    }

    // Tests rand draws stay in the unit interval
    // Verified by returning the raw integer draw
    #[test]
    fn test_random_token_in_unit_interval() {
        let expression = Expression::parse("rand", &[]).expect("rand should parse");
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let value = expression.evaluate(&[], &mut rng).expect("rand cannot fail");
            assert!((0.0..1.0).contains(&value));
        }
    }

    // Tests malformed texts are rejected at parse time
    // Verified by accepting unknown tokens as zero
    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Expression::parse("+ x", &["x"]),
            Err(ExpressionError::MissingTokens)
        );
        assert_eq!(
            Expression::parse("* x z", &["x"]),
            Err(ExpressionError::UnknownToken("z".to_string()))
        );
        assert_eq!(
            Expression::parse("x x", &["x"]),
            Err(ExpressionError::TrailingTokens("x".to_string()))
        );
        assert!(matches!(
            Expression::parse("1.2.3", &[]),
            Err(ExpressionError::InvalidNumber(_))
        ));
        assert_eq!(Expression::parse("", &[]), Err(ExpressionError::MissingTokens));
    }

    // Tests deeply nested formulas fail to parse instead of exhausting the stack
    // Verified by recursing without a depth limit
    #[test]
    fn test_nesting_depth_is_capped() {
        let nested = |depth: usize| format!("{}x", "abs ".repeat(depth));
        assert!(Expression::parse(&nested(MAX_EXPRESSION_DEPTH), &["x"]).is_ok());
        assert_eq!(
            Expression::parse(&nested(MAX_EXPRESSION_DEPTH + 1), &["x"]),
            Err(ExpressionError::TooDeep(MAX_EXPRESSION_DEPTH))
        );
        assert_eq!(
            Expression::parse(&nested(50_000), &["x"]),
            Err(ExpressionError::TooDeep(MAX_EXPRESSION_DEPTH))
        );
        assert_eq!(eval(&nested(MAX_EXPRESSION_DEPTH), &["x"], &[-2.0]), Ok(2.0));
    }

    // Tests negative literals and tree shape
    // Verified by treating '-' prefixed numbers as the subtraction operator
    #[test]
    fn test_negative_literal_and_tree() {
        let expression = Expression::parse("+  x   -0.5", &["x"]).expect("should parse");
        assert_eq!(expression.text(), "+ x -0.5");
        assert_eq!(
            expression.root(),
            &Node::Binary(
                BinaryOp::Add,
                Box::new(Node::Parameter(0)),
                Box::new(Node::Number(-0.5))
            )
        );
        assert_eq!(expression.parameters(), ["x".to_string()]);
    }

    // Tests a short parameter vector is an evaluation error
    // Verified by defaulting missing parameters to zero
    #[test]
    fn test_missing_parameter_value() {
        assert_eq!(
            eval("y", &["x", "y"], &[1.0]),
            Err(EvaluationError::MissingParameter(1))
        );
    }
}
