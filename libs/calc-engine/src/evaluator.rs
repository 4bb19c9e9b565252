//! CalcEngine - local expression evaluator
//!
//! Provides formula evaluation with support for:
//! - Arithmetic: +, -, *, /, ^, % (real division, integer literals are promoted)
//! - Functions: sin, cos, tan, asin, acos, atan, sqrt, ln, log, log10, abs, exp,
//!   round, ceil, floor
//! - Constants: pi, e, phi

use crate::error::{CalcError, Result};
use crate::safety;
use crate::token::{Constant, UnaryFunction};
use crate::value::Value;
use evalexpr::{
    ContextWithMutableFunctions, ContextWithMutableVariables, EvalexprError, Function,
    HashMapContext, Value as RawValue,
};
use tracing::debug;

/// Evaluator capability
///
/// The builder folds chained operators through this trait and the evaluation
/// pipeline uses it as its local fallback.
pub trait Evaluator: Send + Sync {
    /// Evaluate a finished expression
    fn evaluate(&self, expression: &str) -> Result<Value>;

    /// Side-effect-free probe: false on a denylist hit or any evaluation error
    fn validate(&self, expression: &str) -> bool {
        safety::is_safe(expression) && self.evaluate(expression).is_ok()
    }
}

/// CalcEngine - evalexpr-backed evaluator with the calculator's function catalogue
///
/// # Example
/// ```
/// use calc_engine::{CalcEngine, Evaluator, Value};
///
/// let engine = CalcEngine::new().unwrap();
/// assert_eq!(engine.evaluate("1 / 4").unwrap(), Value::Real(0.25));
/// assert_eq!(engine.evaluate("sqrt(16)").unwrap(), Value::Real(4.0));
/// ```
pub struct CalcEngine {
    context: HashMapContext,
}

impl CalcEngine {
    /// Create new CalcEngine with functions and constants registered
    pub fn new() -> Result<Self> {
        let mut context = HashMapContext::new();
        Self::register_constants(&mut context)?;
        Self::register_functions(&mut context)?;
        Ok(Self { context })
    }

    /// Register named constants as variables
    fn register_constants(context: &mut HashMapContext) -> Result<()> {
        for constant in Constant::ALL {
            context
                .set_value(
                    constant.name().to_string(),
                    RawValue::Float(constant.value()),
                )
                .map_err(|e| {
                    CalcError::config(format!("Failed to register {}: {}", constant.name(), e))
                })?;
        }
        Ok(())
    }

    /// Register single-argument functions with evalexpr context
    fn register_functions(context: &mut HashMapContext) -> Result<()> {
        // Helper to convert Value to f64 (handles both Int and Float)
        fn to_f64(value: &RawValue) -> std::result::Result<f64, EvalexprError> {
            match value {
                RawValue::Float(f) => Ok(*f),
                RawValue::Int(i) => Ok(*i as f64),
                _ => Err(EvalexprError::expected_number(value.clone())),
            }
        }

        for function in UnaryFunction::ALL {
            context
                .set_function(
                    function.name().to_string(),
                    Function::new(move |argument| {
                        let x = to_f64(argument)?;
                        Ok(RawValue::Float(function.apply(x)))
                    }),
                )
                .map_err(|e| {
                    CalcError::config(format!("Failed to register {}: {}", function.name(), e))
                })?;
        }
        Ok(())
    }

    /// Convert evalexpr Value to the calculator's result model
    fn convert(value: RawValue, formula: &str) -> Result<Value> {
        match value {
            RawValue::Float(f) => Ok(Value::Real(f)),
            RawValue::Int(i) => Ok(Value::Real(i as f64)),
            RawValue::Boolean(b) => Ok(Value::Text(b.to_string())),
            RawValue::String(s) => Ok(Value::Text(s)),
            RawValue::Tuple(_) | RawValue::Empty => Err(CalcError::expression(format!(
                "Expression did not evaluate to a number: {}",
                formula
            ))),
        }
    }
}

impl Evaluator for CalcEngine {
    fn evaluate(&self, expression: &str) -> Result<Value> {
        let formula = promote_integer_literals(expression.trim());
        if formula.is_empty() {
            return Err(CalcError::expression("Expression is empty"));
        }

        let raw = evalexpr::eval_with_context(&formula, &self.context).map_err(|e| {
            CalcError::expression(format!("Failed to evaluate '{}': {}", expression, e))
        })?;
        debug!("Evaluated '{}' -> {:?}", formula, raw);

        Self::convert(raw, expression)
    }
}

/// Normalise user-typed expression text
///
/// Trims, collapses whitespace runs to one space and maps the display glyphs
/// `×`, `÷` and `−` to their ASCII operators.
pub fn clean_expression(expression: &str) -> String {
    expression
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|c| match c {
            '×' => '*',
            '÷' => '/',
            '−' => '-',
            other => other,
        })
        .collect()
}

/// Rewrite integer literals as float literals (`7` -> `7.0`)
///
/// evalexpr performs integer division on integer operands, which is not what a
/// calculator user expects from `1 / 3`. Digits that belong to an identifier
/// (`log10`) and literals already carrying a fraction or exponent are left alone.
pub fn promote_integer_literals(formula: &str) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let in_identifier = i > 0 && (chars[i - 1].is_alphanumeric() || chars[i - 1] == '_');

        let starts_number = c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()));
        if !starts_number || in_identifier {
            out.push(c);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
            i += 1;
        }
        out.extend(&chars[start..i]);

        let has_fraction = chars[start..i].contains(&'.');
        let exponent_len = exponent_length(&chars[i..]);
        if exponent_len > 0 {
            out.extend(&chars[i..i + exponent_len]);
            i += exponent_len;
        } else if !has_fraction {
            out.push_str(".0");
        }
    }

    out
}

/// Length of a `e5` / `E-3` / `e+12` exponent suffix at the start of `chars`, or 0
fn exponent_length(chars: &[char]) -> usize {
    if !matches!(chars.first(), Some('e') | Some('E')) {
        return 0;
    }
    let sign = usize::from(matches!(chars.get(1), Some('+') | Some('-')));
    let digits = chars[1 + sign..]
        .iter()
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        0
    } else {
        1 + sign + digits
    }
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    fn engine() -> CalcEngine {
        CalcEngine::new().unwrap()
    }

    fn real(expression: &str) -> f64 {
        match engine().evaluate(expression).unwrap() {
            Value::Real(n) => n,
            other => panic!("expected real for '{}', got {:?}", expression, other),
        }
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(real("5 + 3"), 8.0);
        assert_eq!(real("10 - 4"), 6.0);
        assert_eq!(real("6 * 7"), 42.0);
        assert_eq!(real("1 / 4"), 0.25);
        assert_eq!(real("7 % 3"), 1.0);
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(real("2 + 3 * 4"), 14.0);
        assert_eq!(real("(2 + 3) * 4"), 20.0);
    }

    #[test]
    fn test_power() {
        assert_eq!(real("2^10"), 1024.0);
        assert_eq!(real("9^0.5"), 3.0);
    }

    #[test]
    fn test_functions() {
        assert_eq!(real("sqrt(16)"), 4.0);
        assert_eq!(real("log10(1000)"), 3.0);
        assert_eq!(real("abs(-5)"), 5.0);
        assert_eq!(real("floor(3.8)"), 3.0);
        assert_eq!(real("ceil(3.2)"), 4.0);
        assert_eq!(real("sin(0)"), 0.0);
        assert_eq!(real("ln(1)"), 0.0);
    }

    #[test]
    fn test_constants() {
        assert!((real("pi") - 3.141592653589793).abs() < 1e-12);
        assert!((real("log(e)") - 1.0).abs() < 1e-12);
        assert!((real("phi") - 1.618033988749895).abs() < 1e-12);
    }

    #[test]
    fn test_negative_operands() {
        assert_eq!(real("-5 + 2"), -3.0);
        assert_eq!(real("3 - -5"), 8.0);
    }

    #[test]
    fn test_division_by_zero_is_infinite_not_error() {
        assert!(real("1 / 0").is_infinite());
    }

    #[test]
    fn test_boolean_results_are_text() {
        assert_eq!(
            engine().evaluate("1 < 2").unwrap(),
            Value::Text("true".to_string())
        );
    }

    #[test]
    fn test_errors() {
        assert!(engine().evaluate("").is_err());
        assert!(engine().evaluate("2 +* 2").is_err());
        assert!(engine().evaluate("unknown_symbol + 1").is_err());
        assert!(engine().evaluate("sqrt(16").is_err());
    }

    #[test]
    fn test_validate() {
        let engine = engine();
        assert!(engine.validate("1 + 1"));
        assert!(!engine.validate("1 +"));
        assert!(!engine.validate("require('fs')"));
    }

    #[test]
    fn test_clean_expression() {
        assert_eq!(clean_expression("  6   × 7 "), "6 * 7");
        assert_eq!(clean_expression("8÷2\t−\n1"), "8/2 - 1");
        assert_eq!(clean_expression("   "), "");
    }

    #[test]
    fn test_promote_integer_literals() {
        assert_eq!(promote_integer_literals("1 / 3"), "1.0 / 3.0");
        assert_eq!(promote_integer_literals("2.5*4"), "2.5*4.0");
        assert_eq!(promote_integer_literals("log10(100)"), "log10(100.0)");
        assert_eq!(promote_integer_literals("1e5 + 2"), "1e5 + 2.0");
        assert_eq!(promote_integer_literals("1.5e-3*2"), "1.5e-3*2.0");
        assert_eq!(promote_integer_literals("2*e"), "2.0*e");
        assert_eq!(promote_integer_literals(".5 + 1"), ".5 + 1.0");
        assert_eq!(promote_integer_literals("x2"), "x2");
    }
}
