//! Incremental expression builder
//!
//! Folds key presses into a `(pending_expression, display)` pair. The builder is a
//! pure transition function: it never fails and never blocks. Chained operators
//! are folded eagerly through a synchronous [`Evaluator`]; `Equals` hands the
//! finished expression back to the caller through [`Transition::submit`] and parks
//! the display on a placeholder until [`ExpressionBuilder::settle`] corrects it.

use crate::evaluator::Evaluator;
use crate::format::{format_number, format_value, parse_numeric};
use crate::safety;
use crate::token::{BinaryOp, InputToken, Mode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Display value of a fresh builder
pub const DEFAULT_DISPLAY: &str = "0";
/// Display sentinel after a failed fold, transform or evaluation
pub const ERROR_DISPLAY: &str = "Error";
/// Display shown while a submitted expression is being evaluated
pub const PENDING_PLACEHOLDER: &str = "…";

/// The builder's complete mutable state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuilderState {
    pub display: String,
    /// Left operand and operator awaiting a right operand, e.g. `"5 + "`
    pub pending_expression: String,
    pub awaiting_operand: bool,
    pub is_error: bool,
}

impl Default for BuilderState {
    fn default() -> Self {
        Self {
            display: DEFAULT_DISPLAY.to_string(),
            pending_expression: String::new(),
            awaiting_operand: false,
            is_error: false,
        }
    }
}

impl BuilderState {
    /// Whether an `Equals` has been submitted and not yet settled
    pub fn is_pending(&self) -> bool {
        self.display == PENDING_PLACEHOLDER
    }

    fn display_is_default(&self) -> bool {
        self.display == DEFAULT_DISPLAY
    }

    fn fail(&mut self) {
        self.display = ERROR_DISPLAY.to_string();
        self.pending_expression.clear();
        self.awaiting_operand = true;
        self.is_error = true;
    }
}

/// Result of applying one token
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: BuilderState,
    /// Balanced expression to evaluate, set only by `Equals`
    pub submit: Option<String>,
}

impl Transition {
    fn stay(state: BuilderState) -> Self {
        Self {
            state,
            submit: None,
        }
    }
}

/// Expression builder for one keypad mode
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionBuilder {
    mode: Mode,
}

impl ExpressionBuilder {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Apply one token to `state`
    ///
    /// `evaluator` is only consulted when a binary operator folds a chained
    /// operation (`5 + 3 -` evaluates `5 + 3` first).
    pub fn apply(
        &self,
        state: &BuilderState,
        token: InputToken,
        evaluator: &dyn Evaluator,
    ) -> Transition {
        if token.requires_scientific() && self.mode == Mode::Basic {
            return Transition::stay(state.clone());
        }
        if token == InputToken::Equals && state.is_pending() {
            return Transition::stay(state.clone());
        }

        let mut next = state.clone();
        if next.is_error {
            next.is_error = false;
            if next.display == ERROR_DISPLAY {
                next.display = DEFAULT_DISPLAY.to_string();
            }
        }
        if next.is_pending() {
            next.display = DEFAULT_DISPLAY.to_string();
        }

        match token {
            InputToken::Digit(d) => {
                if next.awaiting_operand || next.display_is_default() {
                    next.display = d.to_string();
                } else {
                    next.display.push(d);
                }
                next.awaiting_operand = false;
            },
            InputToken::DecimalPoint => {
                if next.awaiting_operand || next.display_is_default() {
                    next.display = "0.".to_string();
                } else {
                    let run = trailing_numeric_run(&next.display);
                    if run.is_empty() {
                        next.display.push_str("0.");
                    } else if !run.contains('.') {
                        next.display.push('.');
                    }
                }
                next.awaiting_operand = false;
            },
            InputToken::BinaryOperator(op) => {
                self.apply_operator(&mut next, op, evaluator);
            },
            InputToken::UnaryFunction(function) => {
                insert(&mut next, &format!("{}(", function.name()));
            },
            InputToken::Constant(constant) => {
                insert(&mut next, constant.name());
            },
            InputToken::OpenParen => {
                insert(&mut next, "(");
            },
            InputToken::CloseParen => {
                // while awaiting an operand the display repeats the left operand
                let context = format!("{}{}", next.pending_expression, next.display);
                if !next.awaiting_operand && unmatched_open_parens(&context) > 0 {
                    next.display.push(')');
                    next.awaiting_operand = false;
                }
            },
            InputToken::Negate => transform(&mut next, |x| -x),
            InputToken::Percent => transform(&mut next, |x| x / 100.0),
            InputToken::Square => transform(&mut next, |x| x * x),
            InputToken::Equals => {
                let full = if next.pending_expression.is_empty() {
                    next.display.clone()
                } else {
                    format!("{}{}", next.pending_expression, next.display)
                };
                let full = balance_parentheses(&full);
                debug!("Submitting expression '{}'", full);

                next.display = PENDING_PLACEHOLDER.to_string();
                next.pending_expression.clear();
                next.awaiting_operand = true;
                return Transition {
                    state: next,
                    submit: Some(full),
                };
            },
            InputToken::Clear => return Transition::stay(BuilderState::default()),
        }

        Transition::stay(next)
    }

    /// Apply a sequence of tokens, returning the final state and every submission
    pub fn apply_all(
        &self,
        state: &BuilderState,
        tokens: impl IntoIterator<Item = InputToken>,
        evaluator: &dyn Evaluator,
    ) -> (BuilderState, Vec<String>) {
        let mut current = state.clone();
        let mut submitted = Vec::new();
        for token in tokens {
            let transition = self.apply(&current, token, evaluator);
            current = transition.state;
            submitted.extend(transition.submit);
        }
        (current, submitted)
    }

    /// Corrective update once a submitted evaluation settles
    ///
    /// `result` is the formatted result, or `None` when the evaluation failed.
    pub fn settle(state: &BuilderState, result: Option<&str>) -> BuilderState {
        let mut next = state.clone();
        match result {
            Some(shown) if !shown.is_empty() => {
                next.display = shown.to_string();
                next.pending_expression.clear();
                next.awaiting_operand = true;
                next.is_error = false;
            },
            _ => next.fail(),
        }
        next
    }

    fn apply_operator(&self, next: &mut BuilderState, op: BinaryOp, evaluator: &dyn Evaluator) {
        if !next.pending_expression.is_empty() && !next.awaiting_operand {
            let chained = balance_parentheses(&format!(
                "{}{}",
                next.pending_expression, next.display
            ));
            match fold(&chained, evaluator) {
                Some(shown) => {
                    debug!("Folded '{}' -> {}", chained, shown);
                    next.display = shown;
                },
                None => {
                    debug!("Fold of '{}' failed", chained);
                    next.fail();
                    return;
                },
            }
        }

        next.pending_expression = format!("{} {} ", next.display, op.symbol());
        next.awaiting_operand = true;
    }
}

fn fold(expression: &str, evaluator: &dyn Evaluator) -> Option<String> {
    if !safety::is_safe(expression) {
        return None;
    }
    let shown = format_value(&evaluator.evaluate(expression).ok()?);
    (!shown.is_empty()).then_some(shown)
}

/// Replace the display when starting a fresh operand, append otherwise
fn insert(next: &mut BuilderState, text: &str) {
    if next.awaiting_operand || next.display_is_default() {
        next.display = text.to_string();
    } else {
        next.display.push_str(text);
    }
    next.awaiting_operand = false;
}

fn transform(next: &mut BuilderState, f: impl Fn(f64) -> f64) {
    match parse_numeric(&next.display).and_then(|value| value.as_real()) {
        Some(x) => {
            next.display = format_number(f(x));
            next.awaiting_operand = false;
        },
        None => next.fail(),
    }
}

/// Trailing run of digits and decimal points
fn trailing_numeric_run(display: &str) -> &str {
    let start = display
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit() || *c == '.')
        .last()
        .map_or(display.len(), |(i, _)| i);
    &display[start..]
}

/// Number of `(` without a matching `)`, clamped at zero
pub fn unmatched_open_parens(expression: &str) -> usize {
    let opens = expression.chars().filter(|c| *c == '(').count();
    let closes = expression.chars().filter(|c| *c == ')').count();
    opens.saturating_sub(closes)
}

/// Append one `)` per unmatched `(`; surplus `)` are left in place
pub fn balance_parentheses(expression: &str) -> String {
    let missing = unmatched_open_parens(expression);
    let mut balanced = String::with_capacity(expression.len() + missing);
    balanced.push_str(expression);
    balanced.extend(std::iter::repeat(')').take(missing));
    balanced
}
