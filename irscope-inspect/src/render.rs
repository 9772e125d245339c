//! Text Report Rendering
//!
//! The text report is meant for people: section banners per module and
//! function, box-drawing rails per block and an icon per instruction
//! category. It is not meant to be parsed; use the JSON form for that.

use std::fmt;

use crate::classify::{AllocationSize, ComparisonKind, InstructionFacts, ReturnValue};
use crate::report::{BlockReport, FunctionReport, InstructionReport, ModuleReport, ParamFact};

const BANNER_TOP: &str = "╔══════════════════════════════════════════════════════════════════════════════╗";
const BANNER_TITLE: &str = "║                            🔍 IR MODULE ANALYSIS                             ║";
const BANNER_BOTTOM: &str = "╚══════════════════════════════════════════════════════════════════════════════╝";
const SEPARATOR: &str = "══════════════════════════════════════════════════════════════════════════════";
const BLOCK_RULE: &str = "─────────────────────────────────────────────────────";

/// Rail in front of every line inside a block
const RAIL: &str = "   │";
/// Indentation of the category line
const FACT: &str = "   │      ";
/// Indentation of the lines under a category
const DETAIL: &str = "   │         ";

impl fmt::Display for ModuleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{BANNER_TOP}")?;
        writeln!(f, "{BANNER_TITLE}")?;
        writeln!(f, "{BANNER_BOTTOM}")?;
        writeln!(f, "📁 Module: {}", self.module)?;
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f)?;

        for function in &self.functions {
            write!(f, "{function}")?;
        }

        writeln!(f, "✅ Analysis Complete!")?;
        writeln!(f, "{SEPARATOR}")?;
        writeln!(f)
    }
}

fn write_params(f: &mut fmt::Formatter<'_>, indent: &str, params: &[ParamFact]) -> fmt::Result {
    for param in params {
        writeln!(f, "{indent}• {} : {}", param.name, param.ty)?;
    }
    Ok(())
}

impl fmt::Display for FunctionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_declaration() {
            writeln!(f, "📋 External Function Declaration: {}()", self.name)?;
            writeln!(f, "   ↳ Return Type: {}", self.return_type)?;
            writeln!(f, "   ↳ Parameters: {}", self.parameters.len())?;
            write_params(f, "     ", &self.parameters)?;
            writeln!(f)?;
        } else {
            writeln!(f, "🔧 Function Definition: {}()", self.name)?;
            writeln!(f, "   ↳ Return Type: {}", self.return_type)?;
            writeln!(f, "   ↳ Parameters: {}", self.parameters.len())?;
            writeln!(f, "   ↳ Basic Blocks: {}", self.block_count())?;
            if !self.parameters.is_empty() {
                writeln!(f, "   ↳ Function Arguments:")?;
                write_params(f, "     ", &self.parameters)?;
            }
            writeln!(f)?;

            for block in &self.blocks {
                write!(f, "{block}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "{SEPARATOR}")?;
        writeln!(f)
    }
}

impl fmt::Display for BlockReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   ┌─ Basic Block #{}: {}", self.index, self.name)?;
        writeln!(f, "{RAIL}  Instructions: {}", self.instruction_count)?;
        writeln!(f, "{RAIL}")?;

        for inst in &self.instructions {
            write!(f, "{inst}")?;
            writeln!(f, "{RAIL}")?;
        }

        let corner = if self.is_last { "└" } else { "├" };
        writeln!(f, "   {corner}{BLOCK_RULE}")
    }
}

impl fmt::Display for InstructionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RAIL}  [{}] {}", self.index, self.text)?;
        write!(f, "{}", self.facts)
    }
}

impl fmt::Display for InstructionFacts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstructionFacts::BinaryOperation { opcode, lhs, rhs } => {
                writeln!(f, "{FACT}🔧 Binary Operation: {opcode}")?;
                writeln!(f, "{DETAIL}Operand 1: {lhs}")?;
                writeln!(f, "{DETAIL}Operand 2: {rhs}")
            }
            InstructionFacts::StackAllocation { allocated_type, size, align } => {
                writeln!(f, "{FACT}📦 Stack Allocation (alloca)")?;
                writeln!(f, "{DETAIL}Type: {allocated_type}")?;
                match size {
                    AllocationSize::Bytes(bytes) => writeln!(f, "{DETAIL}Size: {bytes} bytes")?,
                    AllocationSize::Dynamic => writeln!(f, "{DETAIL}Size: dynamic")?,
                    AllocationSize::Overflow => writeln!(f, "{DETAIL}Size: exceeds 64 bits")?,
                }
                writeln!(f, "{DETAIL}Alignment: {align} bytes")
            }
            InstructionFacts::Load { source, loaded_type, align } => {
                writeln!(f, "{FACT}📥 Load from Memory")?;
                writeln!(f, "{DETAIL}Source: {source}")?;
                writeln!(f, "{DETAIL}Type: {loaded_type}")?;
                writeln!(f, "{DETAIL}Alignment: {align} bytes")
            }
            InstructionFacts::Store { value, destination, align } => {
                writeln!(f, "{FACT}📤 Store to Memory")?;
                writeln!(f, "{DETAIL}Value: {value}")?;
                writeln!(f, "{DETAIL}Destination: {destination}")?;
                writeln!(f, "{DETAIL}Alignment: {align} bytes")
            }
            InstructionFacts::DirectCall { callee, args, signature } => {
                writeln!(f, "{FACT}📞 Function Call: {callee}()")?;
                writeln!(f, "{DETAIL}Arguments: {}", args.len())?;
                for (i, arg) in args.iter().enumerate() {
                    writeln!(f, "{DETAIL}Arg {}: {arg}", i + 1)?;
                }
                writeln!(f, "{DETAIL}Target Function Signature:")?;
                write_params(f, "   │           ", signature)
            }
            InstructionFacts::IndirectCall { target } => {
                writeln!(f, "{FACT}📞 Indirect Function Call")?;
                writeln!(f, "{DETAIL}Target: {target}")
            }
            InstructionFacts::ConditionalBranch { condition, true_block, false_block } => {
                writeln!(f, "{FACT}🔀 Conditional Branch")?;
                writeln!(f, "{DETAIL}Condition: {condition}")?;
                writeln!(f, "{DETAIL}True Block: {true_block}")?;
                writeln!(f, "{DETAIL}False Block: {false_block}")
            }
            InstructionFacts::UnconditionalBranch { target } => {
                writeln!(f, "{FACT}➡️  Unconditional Branch")?;
                writeln!(f, "{DETAIL}Target: {target}")
            }
            InstructionFacts::Return { return_type, value } => {
                writeln!(f, "{FACT}🔙 Return Statement")?;
                writeln!(f, "{DETAIL}Type: {return_type}")?;
                match value {
                    ReturnValue::Named(name) => writeln!(f, "{DETAIL}Value: {name}"),
                    ReturnValue::Instruction(text) => {
                        writeln!(f, "{DETAIL}Value: (unnamed temporary)")?;
                        writeln!(f, "{DETAIL}Source: {text}")
                    }
                    ReturnValue::Constant(constant) => {
                        writeln!(f, "{DETAIL}Value: (unnamed temporary)")?;
                        writeln!(f, "{DETAIL}Constant: {constant}")
                    }
                    ReturnValue::Temporary => writeln!(f, "{DETAIL}Value: (unnamed temporary)"),
                }
            }
            InstructionFacts::ReturnVoid => writeln!(f, "{FACT}🔙 Return Statement (void)"),
            InstructionFacts::Comparison { kind, predicate, lhs, rhs } => {
                writeln!(f, "{FACT}⚖️  Comparison Instruction")?;
                if *kind == ComparisonKind::Integer {
                    writeln!(f, "{DETAIL}Type: Integer Comparison")?;
                    if let Some(predicate) = predicate {
                        writeln!(f, "{DETAIL}Predicate: {predicate}")?;
                    }
                }
                writeln!(f, "{DETAIL}Left Operand: {lhs}")?;
                writeln!(f, "{DETAIL}Right Operand: {rhs}")
            }
            InstructionFacts::Cast { opcode, from, to, source } => {
                writeln!(f, "{FACT}🔄 Cast Operation: {opcode}")?;
                writeln!(f, "{DETAIL}From: {from}")?;
                writeln!(f, "{DETAIL}To: {to}")?;
                writeln!(f, "{DETAIL}Source: {source}")
            }
            InstructionFacts::OtherOperator { opcode, operands } => {
                writeln!(f, "{FACT}⚙️  Other Operator: {opcode}")?;
                writeln!(f, "{DETAIL}Operands: {}", operands.len())?;
                for (i, operand) in operands.iter().enumerate() {
                    writeln!(f, "{DETAIL}Op[{i}]: {operand}")?;
                }
                Ok(())
            }
            InstructionFacts::Unknown { opcode } => {
                writeln!(f, "{FACT}❓ Unknown Instruction Type")?;
                writeln!(f, "{DETAIL}Opcode: {opcode}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_comparison_lines() {
        let facts = InstructionFacts::Comparison {
            kind: ComparisonKind::Integer,
            predicate: Some("Equal (==)".to_string()),
            lhs: "i32 %a".to_string(),
            rhs: "i32 0".to_string(),
        };
        assert_eq!(
            facts.to_string(),
            "   │      ⚖️  Comparison Instruction\n\
             \x20  │         Type: Integer Comparison\n\
             \x20  │         Predicate: Equal (==)\n\
             \x20  │         Left Operand: i32 %a\n\
             \x20  │         Right Operand: i32 0\n"
        );
    }

    #[test]
    fn test_float_comparison_has_no_predicate_line() {
        let facts = InstructionFacts::Comparison {
            kind: ComparisonKind::Float,
            predicate: None,
            lhs: "double %x".to_string(),
            rhs: "double 0.000000e+00".to_string(),
        };
        let text = facts.to_string();
        assert!(!text.contains("Predicate"));
        assert!(!text.contains("Integer Comparison"));
        assert!(text.contains("Left Operand: double %x"));
    }

    #[test]
    fn test_block_closing_delimiter() {
        let mut block = BlockReport {
            index: 1,
            name: "entry".to_string(),
            instruction_count: 0,
            is_last: false,
            instructions: Vec::new(),
        };
        assert!(block.to_string().ends_with(&format!("   ├{BLOCK_RULE}\n")));
        block.is_last = true;
        assert!(block.to_string().ends_with(&format!("   └{BLOCK_RULE}\n")));
    }

    #[test]
    fn test_unknown_instruction_lines() {
        let facts = InstructionFacts::Unknown { opcode: "fence".to_string() };
        assert_eq!(
            facts.to_string(),
            "   │      ❓ Unknown Instruction Type\n   │         Opcode: fence\n"
        );
    }

    #[test]
    fn test_oversized_allocation_line() {
        let facts = InstructionFacts::StackAllocation {
            allocated_type: "[4611686018427387904 x i64]".to_string(),
            size: AllocationSize::Overflow,
            align: 4,
        };
        assert_eq!(
            facts.to_string(),
            "   │      📦 Stack Allocation (alloca)\n\
             \x20  │         Type: [4611686018427387904 x i64]\n\
             \x20  │         Size: exceeds 64 bits\n\
             \x20  │         Alignment: 4 bytes\n"
        );
    }
}
