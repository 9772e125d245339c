//! IR Value Representations
//! 
//! Defines values that can be used as operands in IR instructions:
//! SSA temporaries, constants, and references to globals and functions.

use irscope_common::TempId;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::IrType;

/// IR Value - represents operands in IR instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// SSA temporary: a parameter or the result of an instruction
    Temp(TempId),

    /// Constant integer
    ConstInt { ty: IrType, value: i64 },

    /// Constant floating point value
    ConstFloat { ty: IrType, value: f64 },

    /// Null pointer constant
    Null,

    /// Global variable reference
    Global(String),

    /// Function reference
    Function(String),

    /// Undefined value of the given type
    Undef(IrType),
}

impl Value {
    /// Shorthand for an integer constant
    pub fn int(ty: IrType, value: i64) -> Self {
        Value::ConstInt { ty, value }
    }

    pub fn i32(value: i64) -> Self {
        Value::int(IrType::I32, value)
    }

    pub fn i64(value: i64) -> Self {
        Value::int(IrType::I64, value)
    }

    pub fn bool(value: bool) -> Self {
        Value::int(IrType::I1, i64::from(value))
    }

    /// Integer constant sign-extended from its bit width
    pub fn as_signed(&self) -> Option<i64> {
        let Value::ConstInt { ty, value } = self else {
            return None;
        };
        match ty.int_width() {
            Some(bits) if bits < 64 => {
                let shift = 64 - bits;
                Some((*value << shift) >> shift)
            }
            _ => Some(*value),
        }
    }

    /// Integer constant zero-extended from its bit width, if it fits in a u64
    pub fn as_unsigned(&self) -> Option<u64> {
        let Value::ConstInt { ty, value } = self else {
            return None;
        };
        match ty.int_width() {
            Some(bits) if bits < 64 => Some(*value as u64 & ((1u64 << bits) - 1)),
            Some(64) => Some(*value as u64),
            _ => u64::try_from(*value).ok(),
        }
    }

    pub fn as_temp(&self) -> Option<TempId> {
        match self {
            Value::Temp(id) => Some(*id),
            _ => None,
        }
    }

    /// Type of the value when it can be known without a function context
    pub fn constant_type(&self) -> Option<IrType> {
        match self {
            Value::Temp(_) => None,
            Value::ConstInt { ty, .. } | Value::ConstFloat { ty, .. } | Value::Undef(ty) => Some(ty.clone()),
            Value::Null | Value::Global(_) | Value::Function(_) => Some(IrType::Ptr),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Temp(id) => write!(f, "%{id}"),
            Value::ConstInt { ty: IrType::I1, value } => {
                write!(f, "{}", if *value != 0 { "true" } else { "false" })
            }
            Value::ConstInt { value, .. } => write!(f, "{value}"),
            Value::ConstFloat { value, .. } => write_float(f, *value),
            Value::Null => write!(f, "null"),
            Value::Global(name) | Value::Function(name) => write!(f, "@{name}"),
            Value::Undef(_) => write!(f, "undef"),
        }
    }
}

/// Floats print like LLVM: six fraction digits and a signed two-digit
/// exponent, or the raw bits when the value has no decimal form
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    if !value.is_finite() {
        return write!(f, "0x{:016X}", value.to_bits());
    }
    let formatted = format!("{value:.6e}");
    let Some((mantissa, exponent)) = formatted.split_once('e') else {
        return f.write_str(&formatted);
    };
    match exponent.strip_prefix('-') {
        Some(digits) => write!(f, "{mantissa}e-{digits:0>2}"),
        None => write!(f, "{mantissa}e+{exponent:0>2}"),
    }
}
