//! IR Type System
//!
//! Defines the first-class types of the IR: integers of fixed width,
//! floating point, opaque pointers, arrays, structs and functions.
//! Sizes and alignments are not known here; they come from the
//! [`DataLayout`](crate::DataLayout) of the module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IR Type system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrType {
    /// Void type
    Void,

    /// Integer types with bit width
    I1,   // Boolean
    I8,
    I16,
    I32,
    I64,
    I128,

    /// Floating point types
    Half,
    Float,
    Double,

    /// Opaque pointer type
    Ptr,

    /// Array type [size x element_type]
    Array { size: u64, element_type: Box<IrType> },

    /// Function type
    Function {
        return_type: Box<IrType>,
        param_types: Vec<IrType>,
        is_vararg: bool,
    },

    /// Struct type, named (`%name`) or literal (`{ ... }`)
    Struct {
        name: Option<String>,
        fields: Vec<IrType>,
        packed: bool,
    },

    /// Label type (for basic block addresses)
    Label,
}

impl IrType {
    /// Bit width of integer types
    pub fn int_width(&self) -> Option<u32> {
        match self {
            IrType::I1 => Some(1),
            IrType::I8 => Some(8),
            IrType::I16 => Some(16),
            IrType::I32 => Some(32),
            IrType::I64 => Some(64),
            IrType::I128 => Some(128),
            _ => None,
        }
    }

    /// Bit width of floating point types
    pub fn float_width(&self) -> Option<u32> {
        match self {
            IrType::Half => Some(16),
            IrType::Float => Some(32),
            IrType::Double => Some(64),
            _ => None,
        }
    }

    pub fn array(size: u64, element_type: IrType) -> IrType {
        IrType::Array { size, element_type: Box::new(element_type) }
    }

    pub fn function(return_type: IrType, param_types: Vec<IrType>, is_vararg: bool) -> IrType {
        IrType::Function {
            return_type: Box::new(return_type),
            param_types,
            is_vararg,
        }
    }

    /// Literal (unnamed, unpacked) struct type
    pub fn literal_struct(fields: Vec<IrType>) -> IrType {
        IrType::Struct { name: None, fields, packed: false }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::Void => write!(f, "void"),
            IrType::I1 => write!(f, "i1"),
            IrType::I8 => write!(f, "i8"),
            IrType::I16 => write!(f, "i16"),
            IrType::I32 => write!(f, "i32"),
            IrType::I64 => write!(f, "i64"),
            IrType::I128 => write!(f, "i128"),
            IrType::Half => write!(f, "half"),
            IrType::Float => write!(f, "float"),
            IrType::Double => write!(f, "double"),
            IrType::Ptr => write!(f, "ptr"),
            IrType::Array { size, element_type } => write!(f, "[{size} x {element_type}]"),
            IrType::Function { return_type, param_types, is_vararg } => {
                write!(f, "{return_type} (")?;
                for (i, param) in param_types.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{param}")?;
                }
                if *is_vararg {
                    if !param_types.is_empty() { write!(f, ", ")?; }
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
            IrType::Struct { name: Some(name), .. } => write!(f, "%{name}"),
            IrType::Struct { name: None, fields, packed } => {
                if *packed { write!(f, "<")?; }
                if fields.is_empty() {
                    write!(f, "{{}}")?;
                } else {
                    write!(f, "{{ ")?;
                    for (i, field) in fields.iter().enumerate() {
                        if i > 0 { write!(f, ", ")?; }
                        write!(f, "{field}")?;
                    }
                    write!(f, " }}")?;
                }
                if *packed { write!(f, ">")?; }
                Ok(())
            }
            IrType::Label => write!(f, "label"),
        }
    }
}
