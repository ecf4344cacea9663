//! Property-based tests for the calculator.
//!
//! Random lines are drawn mostly from the calculator's own alphabet so that a
//! good share of them parse, with a fully arbitrary strategy for robustness.

use proptest::prelude::*;
use std::sync::LazyLock;
use textcalc::calc::operators::{BinaryOperator, Calculation, UnaryOperator};
use textcalc::calc::{CalcError, Calculator, Registry};

fn hypot(a: f64, b: f64) -> Calculation {
    Ok(a.hypot(b))
}

fn halve(a: f64) -> Calculation {
    Ok(a / 2.0)
}

/// Standard operators plus two that the generated lines never spell
static EXTENDED: LazyLock<Registry> = LazyLock::new(|| {
    Registry::standard_builder()
        .register_binary(BinaryOperator::new("hyp", 2, hypot).right_to_left())
        .register_unary(UnaryOperator::postfix("&", 3, halve))
        .build()
        .expect("extended registry is valid")
});

// ============================================================================
// Strategies
// ============================================================================

/// Lines built from digits, operators, brackets and a few function letters
fn arb_line() -> impl Strategy<Value = String> {
    "[0-9.,+*/!%() pisqrtemod^-]{0,40}"
}

fn arb_small() -> impl Strategy<Value = u32> {
    0u32..1000
}

fn bits(result: Result<f64, CalcError>) -> Result<u64, CalcError> {
    result.map(f64::to_bits)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn evaluate_never_panics(line in ".{0,60}") {
        let _ = Calculator::new().evaluate(&line);
    }

    #[test]
    fn error_spans_stay_inside_the_line(line in arb_line()) {
        let trimmed = line.trim_end();
        if let Err(e) = Calculator::new().evaluate(trimmed) {
            let len = trimmed.chars().count();
            prop_assert!(e.start() <= e.end(), "{:?}: {}", line, e);
            prop_assert!(e.end() <= len, "{:?}: {}", line, e);
        }
    }

    #[test]
    fn evaluation_is_idempotent(line in arb_line()) {
        let calc = Calculator::new();
        prop_assert_eq!(bits(calc.evaluate(&line)), bits(calc.evaluate(&line)));
    }

    #[test]
    fn extending_the_registry_keeps_results(line in arb_line()) {
        let standard = Calculator::new();
        let extended = Calculator::with_registry(&EXTENDED);
        prop_assert_eq!(bits(standard.evaluate(&line)), bits(extended.evaluate(&line)));
    }

    #[test]
    fn integer_arithmetic_is_exact(a in arb_small(), b in arb_small(), c in arb_small()) {
        let (fa, fb, fc) = (f64::from(a), f64::from(b), f64::from(c));
        let calc = Calculator::new();

        prop_assert_eq!(calc.evaluate(&format!("{} + {} * {}", a, b, c)), Ok(fa + fb * fc));
        prop_assert_eq!(calc.evaluate(&format!("({} + {}) * {}", a, b, c)), Ok((fa + fb) * fc));
        prop_assert_eq!(calc.evaluate(&format!("{} - {} - {}", a, b, c)), Ok(fa - fb - fc));
        prop_assert_eq!(calc.evaluate(&format!("{}({} - {})", a, b, c)), Ok(fa * (fb - fc)));
    }
}
