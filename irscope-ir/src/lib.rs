//! Host Intermediate Representation
//! 
//! This crate defines the IR the inspector reads. It mirrors the shape of
//! an LLVM module closely enough that reports read like LLVM output, while
//! staying a plain Rust data structure that can be built programmatically
//! or loaded from JSON.
//! 
//! ## Architecture
//! 
//! The crate is structured as follows:
//! - `types` - Type system (IrType)
//! - `layout` - Target data layout (sizes and alignments)
//! - `values` - Operand representations
//! - `ops` - Opcodes, predicates and cast kinds
//! - `instructions` - IR instructions
//! - `blocks` - Basic block management
//! - `function` - Functions and parameters
//! - `module` - Module and global variables
//! - `builder` - IR construction utilities
//! - `printer` - Per-function value table and textual rendering

// Public exports - clean API surface
pub use self::types::IrType;
pub use self::layout::{DataLayout, StructLayout};
pub use self::values::Value;
pub use self::ops::{IrBinaryOp, IntPredicate, FloatPredicate, CastOp, IrUnaryOp};
pub use self::instructions::Instruction;
pub use self::blocks::BasicBlock;
pub use self::function::{Function, Parameter};
pub use self::module::{Module, GlobalVariable, Linkage};
pub use self::builder::IrBuilder;
pub use self::printer::{ValueTable, Definition, InstructionDisplay};

pub use irscope_common::{IrError, LabelId, TempId, UNNAMED};

// Internal modules
mod types;
mod layout;
mod values;
mod ops;
mod instructions;
mod blocks;
mod function;
mod module;
mod builder;
mod printer;

#[cfg(test)]
mod tests;
