//! Host call stack convention
//!
//! Delegated operations consume their inputs from the top of the stack and
//! push their outputs back, mirroring the host's stack-based calling
//! convention.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Dense `f32` tensor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    pub shape: Vec<usize>,
    pub data: Vec<f32>,
}

impl Tensor {
    /// Create a tensor, checking that the data matches the shape
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CoreError::InvalidTensor(format!(
                "shape {:?} needs {} elements, got {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Rank-0 tensor
    pub fn scalar(value: f32) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![value],
        }
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }
}

/// Value carried on the host stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IValue {
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Tensor(Tensor),
    List(Vec<IValue>),
}

impl IValue {
    /// Short type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            IValue::None => "None",
            IValue::Bool(_) => "Bool",
            IValue::Int(_) => "Int",
            IValue::Double(_) => "Double",
            IValue::String(_) => "String",
            IValue::Tensor(_) => "Tensor",
            IValue::List(_) => "List",
        }
    }

    pub fn as_tensor(&self) -> Result<&Tensor> {
        match self {
            IValue::Tensor(tensor) => Ok(tensor),
            other => Err(CoreError::TypeMismatch {
                expected: "Tensor".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    pub fn into_tensor(self) -> Result<Tensor> {
        match self {
            IValue::Tensor(tensor) => Ok(tensor),
            other => Err(CoreError::TypeMismatch {
                expected: "Tensor".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }

    pub fn as_int(&self) -> Result<i64> {
        match self {
            IValue::Int(value) => Ok(*value),
            other => Err(CoreError::TypeMismatch {
                expected: "Int".to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}

impl From<Tensor> for IValue {
    fn from(value: Tensor) -> Self {
        IValue::Tensor(value)
    }
}

impl From<i64> for IValue {
    fn from(value: i64) -> Self {
        IValue::Int(value)
    }
}

impl From<f64> for IValue {
    fn from(value: f64) -> Self {
        IValue::Double(value)
    }
}

impl From<bool> for IValue {
    fn from(value: bool) -> Self {
        IValue::Bool(value)
    }
}

/// Host call stack
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stack {
    values: Vec<IValue>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: Vec<IValue>) -> Self {
        Self { values }
    }

    pub fn push(&mut self, value: impl Into<IValue>) {
        self.values.push(value.into());
    }

    pub fn pop(&mut self) -> Result<IValue> {
        self.values.pop().ok_or(CoreError::StackUnderflow {
            needed: 1,
            available: 0,
        })
    }

    /// Pop the top `n` values, returned in push order
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<IValue>> {
        let available = self.values.len();
        if n > available {
            return Err(CoreError::StackUnderflow {
                needed: n,
                available,
            });
        }
        Ok(self.values.split_off(available - n))
    }

    pub fn peek(&self) -> Option<&IValue> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[IValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<IValue> {
        self.values
    }
}
