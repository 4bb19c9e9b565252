//! Function catalogue advertised to clients

use crate::token::{BinaryOp, Constant, UnaryFunction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstantInfo {
    pub name: String,
    pub description: String,
    pub value: f64,
}

/// Operators, scientific functions and constants understood by the evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCatalog {
    pub basic: Vec<FunctionInfo>,
    pub scientific: Vec<FunctionInfo>,
    pub constants: Vec<ConstantInfo>,
}

pub fn functions() -> FunctionCatalog {
    FunctionCatalog {
        basic: BinaryOp::ALL
            .into_iter()
            .map(|op| FunctionInfo {
                name: op.symbol().to_string(),
                description: op.description().to_string(),
            })
            .collect(),
        scientific: UnaryFunction::ALL
            .into_iter()
            .map(|f| FunctionInfo {
                name: f.name().to_string(),
                description: f.description().to_string(),
            })
            .collect(),
        constants: Constant::ALL
            .into_iter()
            .map(|c| ConstantInfo {
                name: c.name().to_string(),
                description: c.description().to_string(),
                value: c.value(),
            })
            .collect(),
    }
}
