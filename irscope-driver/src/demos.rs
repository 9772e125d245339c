//! Built-in modules
//!
//! Small hand-built modules for trying the inspector without an input
//! file. `irscope dump <name>` prints any of them as JSON, which doubles
//! as a template for writing module files by hand.

use anyhow::{bail, Result};
use irscope_ir::{
    CastOp, DataLayout, FloatPredicate, GlobalVariable, Instruction, IntPredicate, IrBinaryOp, IrBuilder, IrType,
    IrUnaryOp, Linkage, Module, Value,
};

pub const NAMES: &[&str] = &["scenario", "arith", "memory", "calls", "control"];

const X86_64_LAYOUT: &str = "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128";

/// Build the named module
pub fn build(name: &str) -> Result<Module> {
    match name {
        "scenario" => scenario(),
        "arith" => arith(),
        "memory" => memory(),
        "calls" => calls(),
        "control" => control(),
        _ => bail!("Unknown demo '{}' (available: {})", name, NAMES.join(", ")),
    }
}

fn x86_64_module(name: &str) -> Result<Module> {
    let mut module = Module::new(name.to_string()).with_data_layout(DataLayout::parse(X86_64_LAYOUT)?);
    module.target_triple = Some("x86_64-unknown-linux-gnu".to_string());
    Ok(module)
}

/// External declaration, a constant return and a branch to a named block
fn scenario() -> Result<Module> {
    let mut module = Module::new("scenario".to_string());
    module.add_function(IrBuilder::declare_function("foo", IrType::I32, &[(None, IrType::I32)]));

    let mut builder = IrBuilder::new();
    builder.create_function("bar", IrType::I32);
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    builder.build_return(Some(Value::i32(0)))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    builder.create_function("step", IrType::Void);
    let entry = builder.new_label();
    let next = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let a = builder.build_binary(IrBinaryOp::Add, IrType::I32, Value::i32(1), Value::i32(2))?;
    builder.set_name(&a, "a")?;
    builder.build_branch(next)?;
    builder.create_block(next, Some("next"))?;
    builder.build_return(None)?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    Ok(module)
}

/// Integer and floating point arithmetic, comparisons and casts
fn arith() -> Result<Module> {
    let mut module = x86_64_module("arith")?;
    let mut builder = IrBuilder::new();

    builder.create_function("mix", IrType::I64);
    let a = builder.add_parameter(Some("a"), IrType::I32)?;
    let b = builder.add_parameter(Some("b"), IrType::I32)?;
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let sum = builder.build_binary(IrBinaryOp::Add, IrType::I32, a.clone(), b.clone())?;
    builder.set_name(&sum, "sum")?;
    let diff = builder.build_binary(IrBinaryOp::Sub, IrType::I32, a.clone(), b.clone())?;
    let prod = builder.build_binary(IrBinaryOp::Mul, IrType::I32, sum.clone(), diff)?;
    let quot = builder.build_binary(IrBinaryOp::SDiv, IrType::I32, prod, Value::i32(3))?;
    let shifted = builder.build_binary(IrBinaryOp::Shl, IrType::I32, quot, Value::i32(2))?;
    let mixed = builder.build_binary(IrBinaryOp::Xor, IrType::I32, shifted, b.clone())?;
    let is_eq = builder.build_icmp(IntPredicate::Eq, mixed.clone(), Value::i32(0))?;
    let is_neg = builder.build_icmp(IntPredicate::Slt, a, Value::i32(0))?;
    let is_big = builder.build_icmp(IntPredicate::Ugt, b, Value::i32(100))?;
    let flags = builder.build_binary(IrBinaryOp::Or, IrType::I1, is_eq, is_neg)?;
    let flags = builder.build_binary(IrBinaryOp::And, IrType::I1, flags, is_big)?;
    let pick = builder.build_select(flags, mixed, sum)?;
    let wide = builder.build_cast(CastOp::SExt, pick, IrType::I64)?;
    builder.build_return(Some(wide))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    builder.create_function("scale", IrType::Double);
    let x = builder.add_parameter(Some("x"), IrType::Double)?;
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let half = Value::ConstFloat { ty: IrType::Double, value: 0.5 };
    let scaled = builder.build_binary(IrBinaryOp::FMul, IrType::Double, x.clone(), half)?;
    let neg = builder.build_unary(IrUnaryOp::FNeg, scaled.clone())?;
    let below = builder.build_fcmp(FloatPredicate::Olt, x, Value::ConstFloat { ty: IrType::Double, value: 0.0 })?;
    let result = builder.build_select(below, neg, scaled)?;
    builder.set_name(&result, "result")?;
    builder.build_return(Some(result))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    Ok(module)
}

/// Stack slots of several shapes, loads, stores and address arithmetic
fn memory() -> Result<Module> {
    let mut module = x86_64_module("memory")?;
    let mut builder = IrBuilder::new();

    let point = IrType::Struct {
        name: Some("struct.point".to_string()),
        fields: vec![IrType::I32, IrType::Double],
        packed: false,
    };

    builder.create_function("frame", IrType::I32);
    let n = builder.add_parameter(Some("n"), IrType::I32)?;
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let counter = builder.build_alloca(IrType::I32, None, Some(4))?;
    builder.set_name(&counter, "counter")?;
    let buffer = builder.build_alloca(IrType::array(16, IrType::I8), None, None)?;
    builder.set_name(&buffer, "buffer")?;
    let p = builder.build_alloca(point.clone(), None, None)?;
    builder.set_name(&p, "p")?;
    let scratch = builder.build_alloca(IrType::I64, Some(Value::i32(4)), None)?;
    let vla = builder.build_alloca(IrType::I8, Some(n.clone()), Some(16))?;
    builder.set_name(&vla, "vla")?;

    builder.build_store(n.clone(), counter.clone(), Some(4))?;
    let y = builder.build_gep(point, p, vec![Value::i32(0), Value::i32(1)], true)?;
    builder.build_store(Value::ConstFloat { ty: IrType::Double, value: 1.5 }, y, None)?;
    let slot = builder.build_gep(IrType::I64, scratch, vec![Value::i64(2)], true)?;
    builder.build_store(Value::i64(-1), slot, None)?;
    let first = builder.build_gep(IrType::array(16, IrType::I8), buffer, vec![Value::i64(0), Value::i64(0)], true)?;
    builder.build_store(Value::int(IrType::I8, 65), first, None)?;
    let value = builder.build_load(IrType::I32, counter, Some(4))?;
    builder.build_return(Some(value))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    Ok(module)
}

/// Direct calls into the module, calls through pointers and calls to
/// symbols the module does not know
fn calls() -> Result<Module> {
    let mut module = x86_64_module("calls")?;
    module.add_global(GlobalVariable {
        name: "greeting".to_string(),
        var_type: IrType::array(6, IrType::I8),
        is_constant: true,
        initializer: None,
        linkage: Linkage::Private,
    });
    module.add_function(IrBuilder::declare_function("puts", IrType::I32, &[(None, IrType::Ptr)]));

    let mut builder = IrBuilder::new();
    builder.create_function("twice", IrType::I32);
    let x = builder.add_parameter(Some("x"), IrType::I32)?;
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let doubled = builder.build_binary(IrBinaryOp::Add, IrType::I32, x.clone(), x)?;
    builder.build_return(Some(doubled))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    builder.create_function("main", IrType::I32);
    let callback = builder.add_parameter(Some("callback"), IrType::Ptr)?;
    let entry = builder.new_label();
    builder.create_block(entry, Some("entry"))?;
    let greeting = Value::Global("greeting".to_string());
    builder.build_call(Value::Function("puts".to_string()), vec![greeting], IrType::I32)?;
    let twice = builder.build_call(Value::Function("twice".to_string()), vec![Value::i32(21)], IrType::I32)?
        .ok_or_else(no_value)?;
    builder.set_name(&twice, "answer")?;
    builder.build_call(callback, vec![twice.clone()], IrType::Void)?;
    builder.build_call(Value::Function("abort_if_zero".to_string()), vec![twice.clone()], IrType::Void)?;
    builder.build_return(Some(twice))?;
    module.add_function(builder.finish_function().ok_or_else(no_function)?);

    Ok(module)
}

/// A counting loop with a phi, an unnamed block and an unreachable exit
fn control() -> Result<Module> {
    let mut module = x86_64_module("control")?;
    let mut builder = IrBuilder::new();

    builder.create_function("count", IrType::I32);
    let limit = builder.add_parameter(Some("limit"), IrType::I32)?;
    let entry = builder.new_label();
    let header = builder.new_label();
    let body = builder.new_label();
    let exit = builder.new_label();
    let trap = builder.new_label();

    builder.create_block(entry, Some("entry"))?;
    let valid = builder.build_icmp(IntPredicate::Sge, limit.clone(), Value::i32(0))?;
    builder.build_branch_cond(valid, header, trap)?;

    builder.create_block(header, Some("loop"))?;
    let i = builder.build_phi(IrType::I32, vec![(Value::i32(0), entry)])?;
    builder.set_name(&i, "i")?;
    let done = builder.build_icmp(IntPredicate::Sge, i.clone(), limit)?;
    builder.build_branch_cond(done, exit, body)?;

    builder.create_block(body, None)?;
    let stepped = builder.build_binary(IrBinaryOp::Add, IrType::I32, i.clone(), Value::i32(1))?;
    builder.build_branch(header)?;

    builder.create_block(exit, Some("exit"))?;
    builder.build_return(Some(i))?;

    builder.create_block(trap, Some("trap"))?;
    builder.build_unreachable()?;

    let mut function = builder.finish_function().ok_or_else(no_function)?;
    // Back edge of the loop
    let phi = function.get_block_mut(header).and_then(|block| block.instructions.first_mut());
    if let Some(Instruction::Phi { incoming, .. }) = phi {
        incoming.push((stepped, body));
    }
    module.add_function(function);

    Ok(module)
}

fn no_function() -> anyhow::Error {
    anyhow::anyhow!("builder has no function in progress")
}

fn no_value() -> anyhow::Error {
    anyhow::anyhow!("call produced no value")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_demo_builds() {
        for name in NAMES {
            let module = build(name).unwrap();
            assert_eq!(module.name, *name);
            assert!(!module.functions.is_empty());
        }
    }

    #[test]
    fn test_unknown_demo() {
        let err = build("nope").unwrap_err();
        assert!(err.to_string().contains("available: scenario, arith"));
    }

    #[test]
    fn test_control_loop_back_edge() {
        let module = build("control").unwrap();
        let text = module.get_function("count").unwrap().to_string();
        assert!(text.contains("%i = phi i32 [ 0, %entry ], [ %4, %2 ]"));
    }
}
