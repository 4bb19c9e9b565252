//! Input tokens consumed by the expression builder
//!
//! One token corresponds to one key press or button press. Tokens parse from the
//! key names used by keyboards and the CLI (`7`, `.`, `+`, `sqrt`, `pi`, `=`, `c`, ...).

use crate::error::{CalcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calculator keypad mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Basic,
    Scientific,
}

/// Binary infix operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 6] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Modulo,
        Self::Power,
    ];

    /// Operator text as it appears in a built expression
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::Power => "^",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Add => "Addition",
            Self::Subtract => "Subtraction",
            Self::Multiply => "Multiplication",
            Self::Divide => "Division",
            Self::Modulo => "Remainder",
            Self::Power => "Exponentiation",
        }
    }

    /// Parse an operator symbol, accepting the display glyphs `×`, `÷` and `−`
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Self::Add),
            "-" | "−" => Some(Self::Subtract),
            "*" | "×" => Some(Self::Multiply),
            "/" | "÷" => Some(Self::Divide),
            "mod" => Some(Self::Modulo),
            "^" => Some(Self::Power),
            _ => None,
        }
    }
}

/// Prefix function inserted as `name(`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryFunction {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Ln,
    Log,
    Log10,
    Abs,
    Exp,
    Round,
    Ceil,
    Floor,
}

impl UnaryFunction {
    pub const ALL: [UnaryFunction; 15] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Sqrt,
        Self::Ln,
        Self::Log,
        Self::Log10,
        Self::Abs,
        Self::Exp,
        Self::Round,
        Self::Ceil,
        Self::Floor,
    ];

    /// Name the evaluator resolves
    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sqrt => "sqrt",
            Self::Ln => "ln",
            Self::Log => "log",
            Self::Log10 => "log10",
            Self::Abs => "abs",
            Self::Exp => "exp",
            Self::Round => "round",
            Self::Ceil => "ceil",
            Self::Floor => "floor",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Sin => "Sine (radians)",
            Self::Cos => "Cosine (radians)",
            Self::Tan => "Tangent (radians)",
            Self::Asin => "Arcsine (radians)",
            Self::Acos => "Arccosine (radians)",
            Self::Atan => "Arctangent (radians)",
            Self::Sqrt => "Square root",
            Self::Ln => "Natural logarithm",
            Self::Log => "Natural logarithm",
            Self::Log10 => "Base-10 logarithm",
            Self::Abs => "Absolute value",
            Self::Exp => "Exponential function",
            Self::Round => "Round to nearest integer",
            Self::Ceil => "Round up",
            Self::Floor => "Round down",
        }
    }

    /// Apply the function to a real argument
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Self::Sin => x.sin(),
            Self::Cos => x.cos(),
            Self::Tan => x.tan(),
            Self::Asin => x.asin(),
            Self::Acos => x.acos(),
            Self::Atan => x.atan(),
            Self::Sqrt => x.sqrt(),
            Self::Ln | Self::Log => x.ln(),
            Self::Log10 => x.log10(),
            Self::Abs => x.abs(),
            Self::Exp => x.exp(),
            Self::Round => x.round(),
            Self::Ceil => x.ceil(),
            Self::Floor => x.floor(),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

/// Named constant inserted symbolically and resolved by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constant {
    Pi,
    E,
    Phi,
}

impl Constant {
    pub const ALL: [Constant; 3] = [Self::Pi, Self::E, Self::Phi];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pi => "pi",
            Self::E => "e",
            Self::Phi => "phi",
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
            Self::Phi => (1.0 + 5f64.sqrt()) / 2.0,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Pi => "Ratio of a circle's circumference to its diameter",
            Self::E => "Euler's number",
            Self::Phi => "Golden ratio",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" | "π" => Some(Self::Pi),
            "e" => Some(Self::E),
            "phi" | "φ" => Some(Self::Phi),
            _ => None,
        }
    }
}

/// One discrete input event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum InputToken {
    Digit(char),
    DecimalPoint,
    BinaryOperator(BinaryOp),
    UnaryFunction(UnaryFunction),
    Constant(Constant),
    OpenParen,
    CloseParen,
    Negate,
    Percent,
    Square,
    Equals,
    Clear,
}

impl InputToken {
    /// Tokens only available on the scientific keypad
    pub fn requires_scientific(&self) -> bool {
        matches!(self, Self::UnaryFunction(_) | Self::Constant(_))
    }
}

impl FromStr for InputToken {
    type Err = CalcError;

    fn from_str(key: &str) -> Result<Self> {
        let key = key.trim();
        let mut chars = key.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_digit() {
                return Ok(Self::Digit(c));
            }
        }

        if let Some(op) = BinaryOp::from_symbol(key) {
            return Ok(Self::BinaryOperator(op));
        }

        let lower = key.to_lowercase();
        if let Some(function) = UnaryFunction::from_name(&lower) {
            return Ok(Self::UnaryFunction(function));
        }
        if let Some(constant) = Constant::from_name(&lower) {
            return Ok(Self::Constant(constant));
        }

        match lower.as_str() {
            "." | "," => Ok(Self::DecimalPoint),
            "(" => Ok(Self::OpenParen),
            ")" => Ok(Self::CloseParen),
            "neg" | "negate" | "±" | "+/-" => Ok(Self::Negate),
            "%" | "percent" => Ok(Self::Percent),
            "sq" | "x²" | "x^2" | "^2" => Ok(Self::Square),
            "=" | "enter" => Ok(Self::Equals),
            "c" | "clear" | "esc" | "escape" => Ok(Self::Clear),
            _ => Err(CalcError::input(format!("Unknown key: '{}'", key))),
        }
    }
}

impl fmt::Display for InputToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{}", d),
            Self::DecimalPoint => f.write_str("."),
            Self::BinaryOperator(op) => f.write_str(op.symbol()),
            Self::UnaryFunction(func) => f.write_str(func.name()),
            Self::Constant(c) => f.write_str(c.name()),
            Self::OpenParen => f.write_str("("),
            Self::CloseParen => f.write_str(")"),
            Self::Negate => f.write_str("neg"),
            Self::Percent => f.write_str("%"),
            Self::Square => f.write_str("sq"),
            Self::Equals => f.write_str("="),
            Self::Clear => f.write_str("clear"),
        }
    }
}

/// Parse a whitespace-separated key sequence, e.g. `"5 + 3 ="`
pub fn parse_keys(keys: &str) -> Result<Vec<InputToken>> {
    keys.split_whitespace().map(str::parse).collect()
}
