//! IR Instructions
//!
//! Defines all instruction shapes available in the IR. Rendering needs the
//! enclosing function (for value names and operand types) and lives in
//! [`crate::printer`].

use irscope_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use crate::{CastOp, FloatPredicate, IntPredicate, IrBinaryOp, IrType, IrUnaryOp, Value};

/// IR Instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Binary operation: result = op ty lhs, rhs
    Binary {
        result: TempId,
        op: IrBinaryOp,
        result_type: IrType,
        lhs: Value,
        rhs: Value,
    },

    /// Integer comparison: result = icmp pred lhs, rhs
    ICmp {
        result: TempId,
        predicate: IntPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// Floating point comparison: result = fcmp pred lhs, rhs
    FCmp {
        result: TempId,
        predicate: FloatPredicate,
        lhs: Value,
        rhs: Value,
    },

    /// Allocate stack memory: result = alloca type, count
    Alloca {
        result: TempId,
        alloc_type: IrType,
        count: Option<Value>,
        align: Option<u64>,
    },

    /// Load from memory: result = load ty, ptr
    Load {
        result: TempId,
        result_type: IrType,
        ptr: Value,
        align: Option<u64>,
    },

    /// Store to memory: store value, ptr
    Store {
        value: Value,
        ptr: Value,
        align: Option<u64>,
    },

    /// Function call: result = call ret func(args...)
    Call {
        result: Option<TempId>,
        function: Value,
        args: Vec<Value>,
        result_type: IrType,
    },

    /// Return: ret value or ret void
    Return(Option<Value>),

    /// Unconditional branch: br label
    Branch(LabelId),

    /// Conditional branch: br condition, true_label, false_label
    BranchCond {
        condition: Value,
        true_label: LabelId,
        false_label: LabelId,
    },

    /// Type conversion: result = op value to target_type
    Cast {
        result: TempId,
        op: CastOp,
        value: Value,
        target_type: IrType,
    },

    /// Address computation: result = getelementptr source_type, ptr, indices...
    GetElementPtr {
        result: TempId,
        source_type: IrType,
        ptr: Value,
        indices: Vec<Value>,
        inbounds: bool,
    },

    /// Phi node: result = phi [val1, label1], [val2, label2], ...
    Phi {
        result: TempId,
        result_type: IrType,
        incoming: Vec<(Value, LabelId)>,
    },

    /// Select (ternary): result = select condition, true_value, false_value
    Select {
        result: TempId,
        condition: Value,
        true_value: Value,
        false_value: Value,
    },

    /// Unary operation: result = op operand
    Unary {
        result: TempId,
        op: IrUnaryOp,
        operand: Value,
    },

    /// Marks a point that is never reached
    Unreachable,

    /// An instruction the model has no dedicated shape for, kept by name
    Opaque {
        result: Option<TempId>,
        opcode: String,
        operands: Vec<Value>,
        result_type: IrType,
    },
}

impl Instruction {
    /// The SSA value defined by this instruction, if any
    pub fn result(&self) -> Option<TempId> {
        match self {
            Instruction::Binary { result, .. }
            | Instruction::ICmp { result, .. }
            | Instruction::FCmp { result, .. }
            | Instruction::Alloca { result, .. }
            | Instruction::Load { result, .. }
            | Instruction::Cast { result, .. }
            | Instruction::GetElementPtr { result, .. }
            | Instruction::Phi { result, .. }
            | Instruction::Select { result, .. }
            | Instruction::Unary { result, .. } => Some(*result),
            Instruction::Call { result, .. } | Instruction::Opaque { result, .. } => *result,
            Instruction::Store { .. }
            | Instruction::Return(_)
            | Instruction::Branch(_)
            | Instruction::BranchCond { .. }
            | Instruction::Unreachable => None,
        }
    }

    /// Textual opcode, as it appears in the printed IR
    pub fn opcode_name(&self) -> &str {
        match self {
            Instruction::Binary { op, .. } => op.name(),
            Instruction::ICmp { .. } => "icmp",
            Instruction::FCmp { .. } => "fcmp",
            Instruction::Alloca { .. } => "alloca",
            Instruction::Load { .. } => "load",
            Instruction::Store { .. } => "store",
            Instruction::Call { .. } => "call",
            Instruction::Return(_) => "ret",
            Instruction::Branch(_) | Instruction::BranchCond { .. } => "br",
            Instruction::Cast { op, .. } => op.name(),
            Instruction::GetElementPtr { .. } => "getelementptr",
            Instruction::Phi { .. } => "phi",
            Instruction::Select { .. } => "select",
            Instruction::Unary { op, .. } => op.name(),
            Instruction::Unreachable => "unreachable",
            Instruction::Opaque { opcode, .. } => opcode,
        }
    }

    /// Value operands in operand order. Block labels are not values and
    /// are reported through [`Instruction::successors`] instead.
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Binary { lhs, rhs, .. }
            | Instruction::ICmp { lhs, rhs, .. }
            | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::Alloca { count, .. } => count.iter().collect(),
            Instruction::Load { ptr, .. } => vec![ptr],
            Instruction::Store { value, ptr, .. } => vec![value, ptr],
            Instruction::Call { function, args, .. } => {
                // The callee is the last operand of a call
                args.iter().chain(std::iter::once(function)).collect()
            }
            Instruction::Return(value) => value.iter().collect(),
            Instruction::Branch(_) | Instruction::Unreachable => Vec::new(),
            Instruction::BranchCond { condition, .. } => vec![condition],
            Instruction::Cast { value, .. } => vec![value],
            Instruction::GetElementPtr { ptr, indices, .. } => {
                std::iter::once(ptr).chain(indices.iter()).collect()
            }
            Instruction::Phi { incoming, .. } => incoming.iter().map(|(value, _)| value).collect(),
            Instruction::Select { condition, true_value, false_value, .. } => {
                vec![condition, true_value, false_value]
            }
            Instruction::Unary { operand, .. } => vec![operand],
            Instruction::Opaque { operands, .. } => operands.iter().collect(),
        }
    }

    /// Blocks control may transfer to after this instruction
    pub fn successors(&self) -> Vec<LabelId> {
        match self {
            Instruction::Branch(label) => vec![*label],
            Instruction::BranchCond { true_label, false_label, .. } => vec![*true_label, *false_label],
            _ => Vec::new(),
        }
    }

    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Return(_)
                | Instruction::Branch(_)
                | Instruction::BranchCond { .. }
                | Instruction::Unreachable
        )
    }
}
