//! calc-engine - Keystroke expression builder and local evaluator
//!
//! # Features
//!
//! - **Expression building**: folds key presses (`InputToken`) into an expression string
//! - **Safety filter**: denylist pre-screen applied before any evaluator call
//! - **Local evaluation**: evalexpr-backed `CalcEngine` with scientific functions
//! - **Formatting**: one display rendering shared by local and remote results
//!
//! # Example
//!
//! ```rust
//! use calc_engine::{parse_keys, BuilderState, CalcEngine, ExpressionBuilder, Mode};
//!
//! let engine = CalcEngine::new().unwrap();
//! let builder = ExpressionBuilder::new(Mode::Scientific);
//!
//! let tokens = parse_keys("sqrt 1 6 =").unwrap();
//! let (state, submitted) = builder.apply_all(&BuilderState::default(), tokens, &engine);
//!
//! assert_eq!(submitted, vec!["sqrt(16)".to_string()]);
//! assert!(state.is_pending());
//! ```
//!
//! # Result formatting
//!
//! | Value | Display |
//! |-------|---------|
//! | `8.0` | `8` |
//! | `0.1 + 0.2` | `0.3` |
//! | `1e-15` | `1.00e-15` |
//! | `1e13` | `1.00000e+13` |
//! | NaN | `undefined` |

pub mod builder;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod functions;
pub mod safety;
pub mod token;
pub mod value;

// Re-exports for convenience
pub use builder::{
    balance_parentheses, BuilderState, ExpressionBuilder, Transition, ERROR_DISPLAY,
    PENDING_PLACEHOLDER,
};
pub use error::{CalcError, Result};
pub use evaluator::{clean_expression, CalcEngine, Evaluator};
pub use format::{format_number, format_value, parse_numeric};
pub use functions::{functions, FunctionCatalog};
pub use safety::{is_safe, DenylistFilter, ExpressionFilter};
pub use token::{parse_keys, BinaryOp, Constant, InputToken, Mode, UnaryFunction};
pub use value::Value;
