use pretty_assertions::assert_eq;
use textcalc::calc::operators::{BinaryOperator, Calculation, UnaryOperator};
use textcalc::calc::{
    standard_registry, CalcError, Calculator, Registry, RuntimeErrorKind, SyntaxErrorKind,
};

fn value(line: &str) -> f64 {
    match Calculator::new().evaluate(line) {
        Ok(value) => value,
        Err(e) => panic!("{:?} failed: {}", line, e),
    }
}

fn failure(line: &str) -> CalcError {
    match Calculator::new().evaluate(line) {
        Ok(value) => panic!("{:?} unexpectedly gave {}", line, value),
        Err(e) => e,
    }
}

#[test]
fn test_precedence() {
    assert_eq!(value("2+3*4"), 14.0);
    assert_eq!(value("(2+3)*4"), 20.0);
    assert_eq!(value("2*3^2"), 18.0);
    assert_eq!(value("-2^2"), -4.0);
    assert_eq!(value("10 - 2 * 3"), 4.0);
}

#[test]
fn test_right_associative_power() {
    assert_eq!(value("2^3^2"), 512.0);
    assert_eq!(value("(2^3)^2"), 64.0);
}

#[test]
fn test_postfix_operators() {
    assert_eq!(value("5!"), 120.0);
    assert_eq!(value("0!"), 1.0);
    assert_eq!(value("3!!"), 720.0);
    assert_eq!(value("200 * 15%"), 30.0);
    assert!((value("180 degree") - std::f64::consts::PI).abs() < 1e-12);

    let err = failure("171!");
    assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::ResultTooLarge));
    assert_eq!(err.message(), "Result Too Large");
}

#[test]
fn test_division_by_zero_covers_operator() {
    let err = failure("5/0");
    assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DividedByZero));
    assert_eq!(err.message(), "Divided By Zero");
    assert!(err.start() <= 1 && 1 < err.end());
    assert_eq!((err.start(), err.end()), (0, 3));
}

#[test]
fn test_runtime_error_reported_at_enclosing_node() {
    // The failing division sits inside the left operand of `+`; the error is
    // reported at the division node, not at the zero literal.
    let err = failure("(8 / (2 - 2)) + 1");
    assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::DividedByZero));
    assert_eq!((err.start(), err.end()), (1, 11));
}

#[test]
fn test_implicit_multiplication() {
    assert_eq!(value("2(3+4)"), 14.0);
    assert_eq!(value("(1+1)(2+2)"), 8.0);
    assert_eq!(value("3 sqrt 4"), 6.0);
    assert!((value("2pi") - std::f64::consts::TAU).abs() < 1e-12);
    assert_eq!(value("5 -2"), 3.0);
}

#[test]
fn test_functions() {
    assert_eq!(value("sqrt 16"), 4.0);
    assert_eq!(value("sin(0)^2 + cos(0)^2"), 1.0);
    assert!((value("log 1000") - 3.0).abs() < 1e-12);
    assert!((value("ln e") - 1.0).abs() < 1e-12);
    assert!((value("cbrt 27") - 3.0).abs() < 1e-12);
    assert_eq!(value("abs(3 - 10)"), 7.0);

    // Results outside a function's domain are non-finite.
    for line in ["ln 0", "sqrt(-4)", "asin 2", "log(-1)"] {
        let err = failure(line);
        assert_eq!(err.runtime_kind(), Some(RuntimeErrorKind::ResultTooLarge), "{:?}", line);
        assert_eq!(err.message(), "Result Too Large");
    }
}

#[test]
fn test_syntax_error_spans() {
    let cases: [(&str, SyntaxErrorKind, usize, usize); 6] = [
        ("2)", SyntaxErrorKind::TooManyClosingBrackets, 1, 2),
        ("3 4", SyntaxErrorKind::MissingBinaryOperator, 2, 3),
        ("abc", SyntaxErrorKind::UnknownWord, 0, 3),
        ("1.5.2", SyntaxErrorKind::TooManyDecimalPoints, 3, 4),
        ("/ 4", SyntaxErrorKind::EmptyOperation, 0, 1),
        ("4 * * 2", SyntaxErrorKind::InvalidOperation, 4, 5),
    ];

    for (line, kind, start, end) in cases {
        let err = failure(line);
        assert_eq!(err.syntax_kind(), Some(kind), "kind for {:?}", line);
        assert_eq!((err.start(), err.end()), (start, end), "span for {:?}", line);
    }
}

#[test]
fn test_error_messages() {
    assert_eq!(failure("2)").message(), "Extra Closing Bracket");
    assert_eq!(failure("1..2").message(), "Extra Decimal Point");
    assert_eq!(failure("1,").message(), "Invalid Number");
    assert_eq!(failure("()").message(), "Empty Operation");
    assert_eq!(failure("1 +").message(), "Invalid Operation");
    assert_eq!(failure("foo").message(), "Unknown Word");
    assert_eq!(failure("1 2").message(), "Missing a Binary Operator");
    assert_eq!(failure("1.5!").message(), "Not An Integer");
}

#[test]
fn test_variable_scoping() {
    let mut calc = Calculator::new();
    calc.set_line_context(0);
    calc.bind_variable("x", 5.0);

    calc.set_line_context(1);
    assert_eq!(calc.evaluate("x+1"), Ok(6.0));

    // A line never sees its own binding.
    calc.set_line_context(0);
    let err = calc.evaluate("x+1").unwrap_err();
    assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::UnknownWord));
    assert_eq!((err.start(), err.end()), (0, 1));
}

#[test]
fn test_rebinding_is_per_line() {
    let mut calc = Calculator::new();
    calc.set_line_context(0);
    calc.bind_variable("x", 1.0);
    calc.set_line_context(2);
    calc.bind_variable("x", 2.0);

    calc.set_line_context(1);
    assert_eq!(calc.evaluate("x"), Ok(1.0));
    calc.set_line_context(3);
    assert_eq!(calc.evaluate("x"), Ok(2.0));
}

#[test]
fn test_idempotence() {
    let calc = Calculator::new();
    for line in ["1/3", "sin 1 + e^2", "2^0.5", "5/0", "3 4"] {
        let first = calc.evaluate(line).map(f64::to_bits);
        let second = calc.evaluate(line).map(f64::to_bits);
        assert_eq!(first, second, "{:?}", line);
    }
}

#[test]
fn test_deep_nesting_is_rejected_without_overflow() {
    let calc = Calculator::new();
    let lines = [
        format!("{}1", "-".repeat(100_000)),
        format!("{}2", "2^".repeat(50_000)),
        format!("{}1", "1+".repeat(100_000)),
        format!("{}1", "2(".repeat(50_000)),
    ];

    for line in &lines {
        let err = calc.evaluate(line).unwrap_err();
        assert_eq!(err.syntax_kind(), Some(SyntaxErrorKind::InvalidOperation));
        assert!(err.start() < err.end() && err.end() <= line.chars().count());
    }

    // Moderate nesting still evaluates.
    assert_eq!(calc.evaluate(&format!("{}1", "-".repeat(400))), Ok(1.0));
    let brackets = format!("{}7{}", "(".repeat(100_000), ")".repeat(100_000));
    assert_eq!(calc.evaluate(&brackets), Ok(7.0));
}

fn hypot(a: f64, b: f64) -> Calculation {
    Ok(a.hypot(b))
}

fn square(a: f64) -> Calculation {
    Ok(a * a)
}

#[test]
fn test_registry_extension_keeps_existing_results() {
    let extended = Registry::standard_builder()
        .register_binary(BinaryOperator::new("hyp", 1, hypot))
        .register_unary(UnaryOperator::postfix("²", 4, square))
        .build()
        .expect("extended registry");

    let standard = Calculator::new();
    let custom = Calculator::with_registry(&extended);

    for line in ["2+3*4", "2^3^2", "5!", "2(3+4)", "-3^2", "10 mod 4", "5/0", "3 4"] {
        assert_eq!(
            standard.evaluate(line).map(f64::to_bits),
            custom.evaluate(line).map(f64::to_bits),
            "{:?}",
            line
        );
    }

    assert_eq!(custom.evaluate("3 hyp 4"), Ok(5.0));
    assert_eq!(custom.evaluate("1 + 3²"), Ok(10.0));
    assert!(standard.evaluate("3 hyp 4").is_err());
    assert!(custom.is_reserved_identifier("hyp"));
}

#[test]
fn test_registry_is_shared_across_threads() {
    let lines = ["1+1", "2*3", "2^10", "7!"];
    let expected = [2.0, 6.0, 1024.0, 5040.0];

    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = lines
            .iter()
            .map(|line| {
                scope.spawn(move || {
                    Calculator::with_registry(standard_registry())
                        .evaluate(line)
                        .expect("evaluates")
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("thread"))
            .collect()
    });

    assert_eq!(results, expected);
}
