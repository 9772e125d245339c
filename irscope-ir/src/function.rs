//! Function Definitions
//! 
//! Defines IR functions with their parameters, blocks, and value names.

use irscope_common::{LabelId, TempId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::{BasicBlock, IrType};

/// Formal parameter of a function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub id: TempId,
    #[serde(default)]
    pub name: Option<String>,
    pub param_type: IrType,
}

/// Function in IR. A function without blocks is an external declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub blocks: Vec<BasicBlock>,
    #[serde(default)]
    pub is_vararg: bool,
    /// Names given to instruction results; unnamed results print as `%id`
    #[serde(default)]
    pub value_names: BTreeMap<TempId, String>,
}

impl Function {
    pub fn new(name: String, return_type: IrType) -> Self {
        Self {
            name,
            return_type,
            parameters: Vec::new(),
            blocks: Vec::new(),
            is_vararg: false,
            value_names: BTreeMap::new(),
        }
    }

    pub fn add_block(&mut self, block: BasicBlock) {
        self.blocks.push(block);
    }

    /// Attach a name to an instruction result
    pub fn set_value_name(&mut self, id: TempId, name: impl Into<String>) {
        self.value_names.insert(id, name.into());
    }

    /// Name of a parameter or instruction result
    pub fn value_name(&self, id: TempId) -> Option<&str> {
        self.parameters.iter()
            .find(|param| param.id == id)
            .and_then(|param| param.name.as_deref())
            .or_else(|| self.value_names.get(&id).map(String::as_str))
    }

    /// True for external functions (no body)
    pub fn is_declaration(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get_block(&self, id: LabelId) -> Option<&BasicBlock> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn get_block_mut(&mut self, id: LabelId) -> Option<&mut BasicBlock> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }

    pub fn last_block(&self) -> Option<&BasicBlock> {
        self.blocks.last()
    }

    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(BasicBlock::len).sum()
    }
}
