//! IR Builder
//!
//! Provides utilities for constructing IR programmatically.

use irscope_common::{IrError, LabelId, TempId};
use log::debug;
use crate::{
    BasicBlock, CastOp, FloatPredicate, Function, Instruction, IntPredicate,
    IrBinaryOp, IrType, IrUnaryOp, Parameter, Value,
};

/// Builder for constructing IR
pub struct IrBuilder {
    current_function: Option<Function>,
    current_block: Option<LabelId>,
    next_temp_id: TempId,
    next_label_id: LabelId,
}

impl IrBuilder {
    pub fn new() -> Self {
        Self {
            current_function: None,
            current_block: None,
            next_temp_id: 0,
            next_label_id: 0,
        }
    }

    pub fn new_temp(&mut self) -> TempId {
        let temp = self.next_temp_id;
        self.next_temp_id += 1;
        temp
    }

    pub fn new_label(&mut self) -> LabelId {
        let label = self.next_label_id;
        self.next_label_id += 1;
        label
    }

    /// Build an external declaration (a function without a body)
    pub fn declare_function(name: &str, return_type: IrType, params: &[(Option<&str>, IrType)]) -> Function {
        let mut function = Function::new(name.to_string(), return_type);
        for (id, (param_name, param_type)) in (0..).zip(params) {
            function.parameters.push(Parameter {
                id,
                name: param_name.map(str::to_string),
                param_type: param_type.clone(),
            });
        }
        function
    }

    pub fn create_function(&mut self, name: &str, return_type: IrType) -> &mut Function {
        // Reset counters for new function
        self.next_temp_id = 0;
        self.next_label_id = 0;
        self.current_block = None;
        self.current_function.insert(Function::new(name.to_string(), return_type))
    }

    pub fn add_parameter(&mut self, name: Option<&str>, param_type: IrType) -> Result<Value, IrError> {
        let id = self.new_temp();
        let function = self.function_mut()?;
        function.parameters.push(Parameter {
            id,
            name: name.map(str::to_string),
            param_type,
        });
        Ok(Value::Temp(id))
    }

    /// Append a block for a label obtained from [`IrBuilder::new_label`]
    /// and make it the insertion point.
    pub fn create_block(&mut self, label_id: LabelId, name: Option<&str>) -> Result<(), IrError> {
        let mut block = BasicBlock::new(label_id);
        block.name = name.map(str::to_string);

        let function = self.function_mut()?;
        if function.get_block(label_id).is_some() {
            return Err(IrError::builder(format!("block {label_id} already exists in '{}'", function.name)));
        }
        function.add_block(block);
        self.current_block = Some(label_id);
        Ok(())
    }

    /// Give an instruction result a name
    pub fn set_name(&mut self, value: &Value, name: &str) -> Result<(), IrError> {
        let Some(id) = value.as_temp() else {
            return Err(IrError::builder(format!("cannot name non-temporary value {value}")));
        };
        self.function_mut()?.set_value_name(id, name);
        Ok(())
    }

    pub fn build_binary(&mut self, op: IrBinaryOp, result_type: IrType, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Binary { result, op, result_type, lhs, rhs })?;
        Ok(Value::Temp(result))
    }

    pub fn build_icmp(&mut self, predicate: IntPredicate, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::ICmp { result, predicate, lhs, rhs })?;
        Ok(Value::Temp(result))
    }

    pub fn build_fcmp(&mut self, predicate: FloatPredicate, lhs: Value, rhs: Value) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::FCmp { result, predicate, lhs, rhs })?;
        Ok(Value::Temp(result))
    }

    pub fn build_alloca(&mut self, alloc_type: IrType, count: Option<Value>, align: Option<u64>) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Alloca { result, alloc_type, count, align })?;
        Ok(Value::Temp(result))
    }

    pub fn build_load(&mut self, result_type: IrType, ptr: Value, align: Option<u64>) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Load { result, result_type, ptr, align })?;
        Ok(Value::Temp(result))
    }

    pub fn build_store(&mut self, value: Value, ptr: Value, align: Option<u64>) -> Result<(), IrError> {
        self.add_instruction(Instruction::Store { value, ptr, align })
    }

    /// Build a call; void calls produce no value
    pub fn build_call(&mut self, function: Value, args: Vec<Value>, result_type: IrType) -> Result<Option<Value>, IrError> {
        let result = if matches!(result_type, IrType::Void) {
            None
        } else {
            Some(self.new_temp())
        };

        self.add_instruction(Instruction::Call { result, function, args, result_type })?;
        Ok(result.map(Value::Temp))
    }

    pub fn build_return(&mut self, value: Option<Value>) -> Result<(), IrError> {
        self.add_instruction(Instruction::Return(value))
    }

    pub fn build_branch(&mut self, label: LabelId) -> Result<(), IrError> {
        self.add_instruction(Instruction::Branch(label))
    }

    pub fn build_branch_cond(&mut self, condition: Value, true_label: LabelId, false_label: LabelId) -> Result<(), IrError> {
        self.add_instruction(Instruction::BranchCond { condition, true_label, false_label })
    }

    pub fn build_cast(&mut self, op: CastOp, value: Value, target_type: IrType) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Cast { result, op, value, target_type })?;
        Ok(Value::Temp(result))
    }

    pub fn build_gep(&mut self, source_type: IrType, ptr: Value, indices: Vec<Value>, inbounds: bool) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::GetElementPtr { result, source_type, ptr, indices, inbounds })?;
        Ok(Value::Temp(result))
    }

    pub fn build_phi(&mut self, result_type: IrType, incoming: Vec<(Value, LabelId)>) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Phi { result, result_type, incoming })?;
        Ok(Value::Temp(result))
    }

    pub fn build_select(&mut self, condition: Value, true_value: Value, false_value: Value) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Select { result, condition, true_value, false_value })?;
        Ok(Value::Temp(result))
    }

    pub fn build_unary(&mut self, op: IrUnaryOp, operand: Value) -> Result<Value, IrError> {
        let result = self.new_temp();
        self.add_instruction(Instruction::Unary { result, op, operand })?;
        Ok(Value::Temp(result))
    }

    pub fn build_unreachable(&mut self) -> Result<(), IrError> {
        self.add_instruction(Instruction::Unreachable)
    }

    /// Build an instruction the IR has no dedicated shape for
    pub fn build_opaque(&mut self, opcode: &str, operands: Vec<Value>, result_type: IrType) -> Result<Option<Value>, IrError> {
        let result = if matches!(result_type, IrType::Void) {
            None
        } else {
            Some(self.new_temp())
        };
        self.add_instruction(Instruction::Opaque {
            result,
            opcode: opcode.to_string(),
            operands,
            result_type,
        })?;
        Ok(result.map(Value::Temp))
    }

    fn function_mut(&mut self) -> Result<&mut Function, IrError> {
        self.current_function.as_mut().ok_or_else(|| IrError::builder("No current function"))
    }

    fn add_instruction(&mut self, instr: Instruction) -> Result<(), IrError> {
        let block_id = self.current_block.ok_or_else(|| IrError::builder("No current block"))?;
        let function = self.function_mut()?;
        let block = function.get_block_mut(block_id)
            .ok_or_else(|| IrError::builder("Current block not found"))?;
        block.add_instruction(instr);
        Ok(())
    }

    pub fn finish_function(&mut self) -> Option<Function> {
        self.current_block = None;
        let function = self.current_function.take()?;
        debug!(
            "Finished function '{}': {} blocks, {} values",
            function.name,
            function.blocks.len(),
            self.next_temp_id
        );
        Some(function)
    }
}

impl Default for IrBuilder {
    fn default() -> Self {
        Self::new()
    }
}
