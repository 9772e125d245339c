//! Basic Block Management
//! 
//! Defines basic blocks - sequences of instructions with single entry/exit points.

use irscope_common::LabelId;
use serde::{Deserialize, Serialize};
use crate::Instruction;

/// Basic Block - a sequence of instructions with a single entry and exit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: LabelId,
    #[serde(default)]
    pub name: Option<String>,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(id: LabelId) -> Self {
        Self {
            id,
            name: None,
            instructions: Vec::new(),
        }
    }

    pub fn add_instruction(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|instr| instr.is_terminator())
    }

    pub fn has_terminator(&self) -> bool {
        self.terminator().is_some()
    }

    /// Successor labels taken from the terminator
    pub fn successors(&self) -> Vec<LabelId> {
        self.terminator().map(Instruction::successors).unwrap_or_default()
    }
}
