//! Value Table and Textual IR
//!
//! Instructions only refer to their operands by [`TempId`]; the names and
//! types behind those ids live in the enclosing function. [`ValueTable`]
//! indexes one function's definitions once so that operands can be
//! resolved and instructions rendered in LLVM-like syntax.

use irscope_common::{LabelId, TempId};
use std::collections::HashMap;
use std::fmt;

use crate::{Function, GlobalVariable, Instruction, IrType, Linkage, Module, Parameter, Value};

const MAX_TYPE_DEPTH: usize = 64;

/// Where an SSA value comes from
#[derive(Debug, Clone, Copy)]
pub enum Definition<'f> {
    Parameter(&'f Parameter),
    Instruction(&'f Instruction),
}

/// Read-only index of the values defined in a function
pub struct ValueTable<'f> {
    function: &'f Function,
    definitions: HashMap<TempId, Definition<'f>>,
}

impl<'f> ValueTable<'f> {
    pub fn new(function: &'f Function) -> Self {
        let mut definitions = HashMap::new();
        for param in &function.parameters {
            definitions.insert(param.id, Definition::Parameter(param));
        }
        for block in &function.blocks {
            for inst in &block.instructions {
                if let Some(result) = inst.result() {
                    definitions.insert(result, Definition::Instruction(inst));
                }
            }
        }
        Self { function, definitions }
    }

    pub fn definition(&self, id: TempId) -> Option<Definition<'f>> {
        self.definitions.get(&id).copied()
    }

    /// The instruction producing a value, if the value is an instruction result
    pub fn defining_instruction(&self, value: &Value) -> Option<&'f Instruction> {
        match self.definition(value.as_temp()?)? {
            Definition::Instruction(inst) => Some(inst),
            Definition::Parameter(_) => None,
        }
    }

    /// Explicit name of a value, if it has one
    pub fn value_name(&self, value: &Value) -> Option<&'f str> {
        self.function.value_name(value.as_temp()?)
    }

    /// Type of an operand
    pub fn value_type(&self, value: &Value) -> IrType {
        self.value_type_at(value, 0)
    }

    fn value_type_at(&self, value: &Value, depth: usize) -> IrType {
        if let Some(ty) = value.constant_type() {
            return ty;
        }
        match value.as_temp().and_then(|id| self.definition(id)) {
            Some(Definition::Parameter(param)) => param.param_type.clone(),
            Some(Definition::Instruction(inst)) if depth < MAX_TYPE_DEPTH => {
                self.result_type_at(inst, depth + 1)
            }
            _ => IrType::Void,
        }
    }

    fn result_type_at(&self, inst: &Instruction, depth: usize) -> IrType {
        match inst {
            Instruction::Binary { result_type, .. }
            | Instruction::Load { result_type, .. }
            | Instruction::Phi { result_type, .. } => result_type.clone(),
            Instruction::Call { result: Some(_), result_type, .. }
            | Instruction::Opaque { result: Some(_), result_type, .. } => result_type.clone(),
            Instruction::ICmp { .. } | Instruction::FCmp { .. } => IrType::I1,
            Instruction::Alloca { .. } | Instruction::GetElementPtr { .. } => IrType::Ptr,
            Instruction::Cast { target_type, .. } => target_type.clone(),
            Instruction::Select { true_value, .. } => self.value_type_at(true_value, depth),
            Instruction::Unary { operand, .. } => self.value_type_at(operand, depth),
            Instruction::Call { result: None, .. }
            | Instruction::Opaque { result: None, .. }
            | Instruction::Store { .. }
            | Instruction::Return(_)
            | Instruction::Branch(_)
            | Instruction::BranchCond { .. }
            | Instruction::Unreachable => IrType::Void,
        }
    }

    /// Reference to a value without its type: `%x`, `%3`, `42`, `@g`
    pub fn value_ref(&self, value: &Value) -> String {
        match self.value_name(value) {
            Some(name) => format!("%{name}"),
            None => value.to_string(),
        }
    }

    /// Operand with its type: `i32 %x`, `ptr @g`
    pub fn operand(&self, value: &Value) -> String {
        format!("{} {}", self.value_type(value), self.value_ref(value))
    }

    pub fn block_name(&self, label: LabelId) -> Option<&'f str> {
        self.function.get_block(label).and_then(|block| block.name.as_deref())
    }

    /// Reference to a block: `%name` or `%id`
    pub fn block_ref(&self, label: LabelId) -> String {
        match self.block_name(label) {
            Some(name) => format!("%{name}"),
            None => format!("%{label}"),
        }
    }

    /// Render an instruction in textual IR form
    pub fn display<'t>(&'t self, inst: &'t Instruction) -> InstructionDisplay<'t, 'f> {
        InstructionDisplay { table: self, inst }
    }
}

/// Display adapter for an instruction in the context of its function
pub struct InstructionDisplay<'t, 'f> {
    table: &'t ValueTable<'f>,
    inst: &'t Instruction,
}

impl fmt::Display for InstructionDisplay<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.table;
        if let Some(result) = self.inst.result() {
            write!(f, "{} = ", t.value_ref(&Value::Temp(result)))?;
        }
        match self.inst {
            Instruction::Binary { op, result_type, lhs, rhs, .. } => {
                write!(f, "{op} {result_type} {}, {}", t.value_ref(lhs), t.value_ref(rhs))
            }
            Instruction::ICmp { predicate, lhs, rhs, .. } => {
                write!(f, "icmp {predicate} {}, {}", t.operand(lhs), t.value_ref(rhs))
            }
            Instruction::FCmp { predicate, lhs, rhs, .. } => {
                write!(f, "fcmp {predicate} {}, {}", t.operand(lhs), t.value_ref(rhs))
            }
            Instruction::Alloca { alloc_type, count, align, .. } => {
                write!(f, "alloca {alloc_type}")?;
                if let Some(count) = count {
                    write!(f, ", {}", t.operand(count))?;
                }
                write_align(f, *align)
            }
            Instruction::Load { result_type, ptr, align, .. } => {
                write!(f, "load {result_type}, {}", t.operand(ptr))?;
                write_align(f, *align)
            }
            Instruction::Store { value, ptr, align } => {
                write!(f, "store {}, {}", t.operand(value), t.operand(ptr))?;
                write_align(f, *align)
            }
            Instruction::Call { function, args, result_type, .. } => {
                write!(f, "call {result_type} {}(", t.value_ref(function))?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", t.operand(arg))?;
                }
                write!(f, ")")
            }
            Instruction::Return(Some(value)) => write!(f, "ret {}", t.operand(value)),
            Instruction::Return(None) => write!(f, "ret void"),
            Instruction::Branch(label) => write!(f, "br label {}", t.block_ref(*label)),
            Instruction::BranchCond { condition, true_label, false_label } => {
                write!(
                    f,
                    "br {}, label {}, label {}",
                    t.operand(condition),
                    t.block_ref(*true_label),
                    t.block_ref(*false_label)
                )
            }
            Instruction::Cast { op, value, target_type, .. } => {
                write!(f, "{op} {} to {target_type}", t.operand(value))
            }
            Instruction::GetElementPtr { source_type, ptr, indices, inbounds, .. } => {
                write!(f, "getelementptr ")?;
                if *inbounds { write!(f, "inbounds ")?; }
                write!(f, "{source_type}, {}", t.operand(ptr))?;
                for index in indices {
                    write!(f, ", {}", t.operand(index))?;
                }
                Ok(())
            }
            Instruction::Phi { result_type, incoming, .. } => {
                write!(f, "phi {result_type} ")?;
                for (i, (value, label)) in incoming.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "[ {}, {} ]", t.value_ref(value), t.block_ref(*label))?;
                }
                Ok(())
            }
            Instruction::Select { condition, true_value, false_value, .. } => {
                write!(
                    f,
                    "select {}, {}, {}",
                    t.operand(condition),
                    t.operand(true_value),
                    t.operand(false_value)
                )
            }
            Instruction::Unary { op, operand, .. } => write!(f, "{op} {}", t.operand(operand)),
            Instruction::Unreachable => write!(f, "unreachable"),
            Instruction::Opaque { opcode, operands, .. } => {
                write!(f, "{opcode}")?;
                for (i, operand) in operands.iter().enumerate() {
                    write!(f, "{}{}", if i == 0 { " " } else { ", " }, t.operand(operand))?;
                }
                Ok(())
            }
        }
    }
}

fn write_align(f: &mut fmt::Formatter<'_>, align: Option<u64>) -> fmt::Result {
    match align {
        Some(align) => write!(f, ", align {align}"),
        None => Ok(()),
    }
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let linkage = match self.linkage {
            Linkage::External => "",
            Linkage::Internal => "internal ",
            Linkage::Private => "private ",
        };
        let kind = if self.is_constant { "constant" } else { "global" };
        write!(f, "@{} = {linkage}{kind} {}", self.name, self.var_type)?;
        match &self.initializer {
            Some(init) => write!(f, " {init}"),
            None => write!(f, " zeroinitializer"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = if self.is_declaration() { "declare" } else { "define" };
        write!(f, "{keyword} {} @{}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "{}", param.param_type)?;
            if let Some(name) = &param.name {
                write!(f, " %{name}")?;
            } else if !self.is_declaration() {
                write!(f, " %{}", param.id)?;
            }
        }
        if self.is_vararg {
            if !self.parameters.is_empty() { write!(f, ", ")?; }
            write!(f, "...")?;
        }
        write!(f, ")")?;
        if self.is_declaration() {
            return writeln!(f);
        }

        writeln!(f, " {{")?;
        let table = ValueTable::new(self);
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 { writeln!(f)?; }
            match &block.name {
                Some(name) => writeln!(f, "{name}:")?,
                None => writeln!(f, "{}:", block.id)?,
            }
            for inst in &block.instructions {
                writeln!(f, "  {}", table.display(inst))?;
            }
        }
        writeln!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "target datalayout = \"{}\"", self.data_layout)?;
        if let Some(triple) = &self.target_triple {
            writeln!(f, "target triple = \"{triple}\"")?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(f, "{global}")?;
            }
        }
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}
