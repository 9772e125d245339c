//! Instruction Classification
//!
//! Every instruction falls into exactly one [`Category`]. The classifier
//! checks the specific shapes first (binary ops, memory ops, calls,
//! branches, returns, comparisons, casts) and falls back to "other
//! operator" for generic instructions and to "unknown" for opaque ones
//! that carry no operands. A shape whose details cannot be resolved
//! degrades to a less specific category instead of failing.

use irscope_common::UNNAMED;
use irscope_ir::{DataLayout, Instruction, IntPredicate, IrType, LabelId, Module, Value, ValueTable};
use log::trace;
use serde::Serialize;

use crate::report::ParamFact;

/// Structural category of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BinaryOperation,
    StackAllocation,
    Load,
    Store,
    DirectCall,
    IndirectCall,
    ConditionalBranch,
    UnconditionalBranch,
    Return,
    ReturnVoid,
    Comparison,
    Cast,
    OtherOperator,
    Unknown,
}

impl Category {
    pub const ALL: [Category; 14] = [
        Category::BinaryOperation,
        Category::StackAllocation,
        Category::Load,
        Category::Store,
        Category::DirectCall,
        Category::IndirectCall,
        Category::ConditionalBranch,
        Category::UnconditionalBranch,
        Category::Return,
        Category::ReturnVoid,
        Category::Comparison,
        Category::Cast,
        Category::OtherOperator,
        Category::Unknown,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::BinaryOperation => "Binary Operation",
            Category::StackAllocation => "Stack Allocation",
            Category::Load => "Load from Memory",
            Category::Store => "Store to Memory",
            Category::DirectCall => "Function Call",
            Category::IndirectCall => "Indirect Function Call",
            Category::ConditionalBranch => "Conditional Branch",
            Category::UnconditionalBranch => "Unconditional Branch",
            Category::Return => "Return Statement",
            Category::ReturnVoid => "Return Statement (void)",
            Category::Comparison => "Comparison Instruction",
            Category::Cast => "Cast Operation",
            Category::OtherOperator => "Other Operator",
            Category::Unknown => "Unknown Instruction Type",
        }
    }
}

/// Which comparison family an instruction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    Integer,
    Float,
}

/// What a `ret` instruction returns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReturnValue {
    /// A value with an explicit name
    Named(String),
    /// An unnamed temporary produced by this instruction (rendered)
    Instruction(String),
    /// An unnamed integer constant
    Constant(i64),
    /// Any other unnamed value (parameters, non-integer constants)
    Temporary,
}

/// Bytes reserved by a stack allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "bytes", rename_all = "snake_case")]
pub enum AllocationSize {
    Bytes(u64),
    /// The element count is not a constant
    Dynamic,
    /// The size does not fit in 64 bits
    Overflow,
}

/// Category plus the facts extracted for it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum InstructionFacts {
    BinaryOperation {
        opcode: String,
        lhs: String,
        rhs: String,
    },
    StackAllocation {
        allocated_type: String,
        size: AllocationSize,
        align: u64,
    },
    Load {
        source: String,
        loaded_type: String,
        align: u64,
    },
    Store {
        value: String,
        destination: String,
        align: u64,
    },
    DirectCall {
        callee: String,
        args: Vec<String>,
        signature: Vec<ParamFact>,
    },
    IndirectCall {
        target: String,
    },
    ConditionalBranch {
        condition: String,
        true_block: String,
        false_block: String,
    },
    UnconditionalBranch {
        target: String,
    },
    Return {
        return_type: String,
        value: ReturnValue,
    },
    ReturnVoid,
    Comparison {
        kind: ComparisonKind,
        /// Readable predicate, integer comparisons only
        predicate: Option<String>,
        lhs: String,
        rhs: String,
    },
    Cast {
        opcode: String,
        from: String,
        to: String,
        source: String,
    },
    OtherOperator {
        opcode: String,
        operands: Vec<String>,
    },
    Unknown {
        opcode: String,
    },
}

impl InstructionFacts {
    pub fn category(&self) -> Category {
        match self {
            InstructionFacts::BinaryOperation { .. } => Category::BinaryOperation,
            InstructionFacts::StackAllocation { .. } => Category::StackAllocation,
            InstructionFacts::Load { .. } => Category::Load,
            InstructionFacts::Store { .. } => Category::Store,
            InstructionFacts::DirectCall { .. } => Category::DirectCall,
            InstructionFacts::IndirectCall { .. } => Category::IndirectCall,
            InstructionFacts::ConditionalBranch { .. } => Category::ConditionalBranch,
            InstructionFacts::UnconditionalBranch { .. } => Category::UnconditionalBranch,
            InstructionFacts::Return { .. } => Category::Return,
            InstructionFacts::ReturnVoid => Category::ReturnVoid,
            InstructionFacts::Comparison { .. } => Category::Comparison,
            InstructionFacts::Cast { .. } => Category::Cast,
            InstructionFacts::OtherOperator { .. } => Category::OtherOperator,
            InstructionFacts::Unknown { .. } => Category::Unknown,
        }
    }
}

/// Readable name of an integer predicate. Only equality and the signed
/// relations have names; every other predicate is "Other".
pub fn int_predicate_name(predicate: IntPredicate) -> &'static str {
    match predicate {
        IntPredicate::Eq => "Equal (==)",
        IntPredicate::Ne => "Not Equal (!=)",
        IntPredicate::Sgt => "Signed Greater Than (>)",
        IntPredicate::Sge => "Signed Greater or Equal (>=)",
        IntPredicate::Slt => "Signed Less Than (<)",
        IntPredicate::Sle => "Signed Less or Equal (<=)",
        _ => "Other",
    }
}

/// Classifies the instructions of one function
pub struct Classifier<'a> {
    module: &'a Module,
    table: &'a ValueTable<'a>,
}

impl<'a> Classifier<'a> {
    pub fn new(module: &'a Module, table: &'a ValueTable<'a>) -> Self {
        Self { module, table }
    }

    fn layout(&self) -> &'a DataLayout {
        &self.module.data_layout
    }

    pub fn classify(&self, inst: &Instruction) -> InstructionFacts {
        let t = self.table;
        let facts = match inst {
            Instruction::Binary { op, lhs, rhs, .. } => InstructionFacts::BinaryOperation {
                opcode: op.name().to_string(),
                lhs: t.operand(lhs),
                rhs: t.operand(rhs),
            },

            Instruction::Alloca { alloc_type, count, align, .. } => InstructionFacts::StackAllocation {
                allocated_type: alloc_type.to_string(),
                size: self.allocation_size(alloc_type, count.as_ref()),
                align: align.unwrap_or_else(|| self.layout().pref_alignment(alloc_type)),
            },

            Instruction::Load { result_type, ptr, align, .. } => InstructionFacts::Load {
                source: t.operand(ptr),
                loaded_type: result_type.to_string(),
                align: align.unwrap_or_else(|| self.layout().abi_alignment(result_type)),
            },

            Instruction::Store { value, ptr, align } => InstructionFacts::Store {
                value: t.operand(value),
                destination: t.operand(ptr),
                align: align.unwrap_or_else(|| self.layout().abi_alignment(&t.value_type(value))),
            },

            Instruction::Call { function, args, .. } => self.classify_call(function, args),

            Instruction::BranchCond { condition, true_label, false_label } => {
                InstructionFacts::ConditionalBranch {
                    condition: t.operand(condition),
                    true_block: self.block_name(*true_label),
                    false_block: self.block_name(*false_label),
                }
            }

            Instruction::Branch(label) => InstructionFacts::UnconditionalBranch {
                target: self.block_name(*label),
            },

            Instruction::Return(Some(value)) => InstructionFacts::Return {
                return_type: t.value_type(value).to_string(),
                value: self.return_value(value),
            },

            Instruction::Return(None) => InstructionFacts::ReturnVoid,

            Instruction::ICmp { predicate, lhs, rhs, .. } => InstructionFacts::Comparison {
                kind: ComparisonKind::Integer,
                predicate: Some(int_predicate_name(*predicate).to_string()),
                lhs: t.operand(lhs),
                rhs: t.operand(rhs),
            },

            Instruction::FCmp { lhs, rhs, .. } => InstructionFacts::Comparison {
                kind: ComparisonKind::Float,
                predicate: None,
                lhs: t.operand(lhs),
                rhs: t.operand(rhs),
            },

            Instruction::Cast { op, value, target_type, .. } => InstructionFacts::Cast {
                opcode: op.name().to_string(),
                from: t.value_type(value).to_string(),
                to: target_type.to_string(),
                source: t.operand(value),
            },

            // Generic operators
            Instruction::GetElementPtr { .. }
            | Instruction::Phi { .. }
            | Instruction::Select { .. }
            | Instruction::Unary { .. }
            | Instruction::Unreachable => self.other_operator(inst),
            Instruction::Opaque { operands, .. } if !operands.is_empty() => self.other_operator(inst),

            Instruction::Opaque { .. } => InstructionFacts::Unknown {
                opcode: inst.opcode_name().to_string(),
            },
        };

        trace!("classified '{}' as {:?}", inst.opcode_name(), facts.category());
        facts
    }

    /// A call is direct when its callee names a function of this module;
    /// anything else is reported by its callee operand only.
    fn classify_call(&self, function: &Value, args: &[Value]) -> InstructionFacts {
        let t = self.table;
        let callee = match function {
            Value::Function(name) => self.module.get_function(name),
            _ => None,
        };

        match callee {
            Some(callee) => InstructionFacts::DirectCall {
                callee: callee.name.clone(),
                args: args.iter().map(|arg| t.operand(arg)).collect(),
                signature: callee.parameters.iter().map(ParamFact::from_parameter).collect(),
            },
            None => InstructionFacts::IndirectCall {
                target: t.operand(function),
            },
        }
    }

    fn other_operator(&self, inst: &Instruction) -> InstructionFacts {
        InstructionFacts::OtherOperator {
            opcode: inst.opcode_name().to_string(),
            operands: inst.operands().into_iter().map(|op| self.table.operand(op)).collect(),
        }
    }

    fn return_value(&self, value: &Value) -> ReturnValue {
        let t = self.table;
        if let Some(name) = t.value_name(value) {
            return ReturnValue::Named(name.to_string());
        }
        if let Some(inst) = t.defining_instruction(value) {
            return ReturnValue::Instruction(t.display(inst).to_string());
        }
        match value {
            Value::Global(name) | Value::Function(name) => ReturnValue::Named(name.clone()),
            _ => value.as_signed().map_or(ReturnValue::Temporary, ReturnValue::Constant),
        }
    }

    /// Allocated bytes: alloc size of the type times the (unsigned)
    /// constant count
    fn allocation_size(&self, alloc_type: &IrType, count: Option<&Value>) -> AllocationSize {
        let count = match count {
            None => Some(1),
            Some(value @ Value::ConstInt { .. }) => value.as_unsigned(),
            Some(_) => return AllocationSize::Dynamic,
        };
        let bytes = count.and_then(|count| self.layout().alloc_size(alloc_type)?.checked_mul(count));
        match bytes {
            Some(bytes) => AllocationSize::Bytes(bytes),
            None => AllocationSize::Overflow,
        }
    }

    fn block_name(&self, label: LabelId) -> String {
        self.table.block_name(label).unwrap_or(UNNAMED).to_string()
    }
}
