//! Module, Function and Block Reporters
//!
//! Walks a module in program order and collects what the text report
//! shows: function signatures, block identities and one classified entry
//! per instruction. Nothing is carried over between functions.

use irscope_common::UNNAMED;
use irscope_ir::{BasicBlock, Function, Module, Parameter, ValueTable};
use log::{debug, info};
use serde::Serialize;

use crate::classify::{Classifier, InstructionFacts};

/// Report for a whole module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleReport {
    pub module: String,
    pub functions: Vec<FunctionReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// External function without a body
    Declaration,
    Definition,
}

/// Name and type of a parameter; unnamed parameters read "unnamed"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamFact {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl ParamFact {
    pub fn from_parameter(param: &Parameter) -> Self {
        Self {
            name: param.name.clone().unwrap_or_else(|| UNNAMED.to_string()),
            ty: param.param_type.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionReport {
    pub name: String,
    pub kind: FunctionKind,
    pub return_type: String,
    pub parameters: Vec<ParamFact>,
    /// Empty for declarations
    pub blocks: Vec<BlockReport>,
}

impl FunctionReport {
    pub fn is_declaration(&self) -> bool {
        self.kind == FunctionKind::Declaration
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockReport {
    /// 1-based position within the function
    pub index: usize,
    pub name: String,
    pub instruction_count: usize,
    /// Whether this is the function's final block
    pub is_last: bool,
    pub instructions: Vec<InstructionReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionReport {
    /// 1-based position within the block
    pub index: usize,
    pub opcode: String,
    /// The instruction in textual IR form
    pub text: String,
    pub facts: InstructionFacts,
}

/// Report every function of the module in declaration order
pub fn report_module(module: &Module) -> ModuleReport {
    info!("Inspecting module '{}' ({} functions)", module.name, module.functions.len());
    let functions = module.functions.iter()
        .map(|function| report_function(module, function))
        .collect();
    ModuleReport {
        module: module.name.clone(),
        functions,
    }
}

/// Report a function's signature and, for definitions, its blocks
pub fn report_function(module: &Module, function: &Function) -> FunctionReport {
    let parameters = function.parameters.iter().map(ParamFact::from_parameter).collect();

    if function.is_declaration() {
        debug!("Function '{}' is an external declaration", function.name);
        return FunctionReport {
            name: function.name.clone(),
            kind: FunctionKind::Declaration,
            return_type: function.return_type.to_string(),
            parameters,
            blocks: Vec::new(),
        };
    }

    debug!(
        "Function '{}': {} blocks, {} instructions",
        function.name,
        function.blocks.len(),
        function.instruction_count()
    );
    let table = ValueTable::new(function);
    let classifier = Classifier::new(module, &table);
    let mut blocks = Vec::with_capacity(function.blocks.len());
    let mut index = 0;
    for block in &function.blocks {
        index += 1;
        let is_last = function.last_block().is_some_and(|last| std::ptr::eq(last, block));
        blocks.push(report_block(&classifier, &table, block, index, is_last));
    }

    FunctionReport {
        name: function.name.clone(),
        kind: FunctionKind::Definition,
        return_type: function.return_type.to_string(),
        parameters,
        blocks,
    }
}

/// Report one block and classify its instructions in layout order
pub fn report_block(
    classifier: &Classifier<'_>,
    table: &ValueTable<'_>,
    block: &BasicBlock,
    index: usize,
    is_last: bool,
) -> BlockReport {
    let instructions = block.instructions.iter()
        .enumerate()
        .map(|(i, inst)| InstructionReport {
            index: i + 1,
            opcode: inst.opcode_name().to_string(),
            text: table.display(inst).to_string(),
            facts: classifier.classify(inst),
        })
        .collect();

    BlockReport {
        index,
        name: block.name.clone().unwrap_or_else(|| UNNAMED.to_string()),
        instruction_count: block.instructions.len(),
        is_last,
        instructions,
    }
}
