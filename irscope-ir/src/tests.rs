//! Unit tests for the IR model

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_ir_values() {
    let temp = Value::Temp(5);
    let constant = Value::i32(42);
    let global = Value::Global("main".to_string());

    assert_eq!(format!("{}", temp), "%5");
    assert_eq!(format!("{}", constant), "42");
    assert_eq!(format!("{}", global), "@main");
    assert_eq!(format!("{}", Value::bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
}

#[test]
fn test_float_constants_use_llvm_notation() {
    let double = |value: f64| Value::ConstFloat { ty: IrType::Double, value }.to_string();
    assert_eq!(double(0.5), "5.000000e-01");
    assert_eq!(double(0.0), "0.000000e+00");
    assert_eq!(double(1.5), "1.500000e+00");
    assert_eq!(double(-2.5e-100), "-2.500000e-100");
    assert_eq!(double(1e300), "1.000000e+300");
    assert_eq!(double(f64::INFINITY), "0x7FF0000000000000");
}

#[test]
fn test_integer_constant_extension() {
    assert_eq!(Value::bool(true).as_signed(), Some(-1));
    assert_eq!(Value::bool(true).as_unsigned(), Some(1));
    assert_eq!(Value::int(IrType::I8, 255).as_signed(), Some(-1));
    assert_eq!(Value::int(IrType::I8, -1).as_unsigned(), Some(255));
    assert_eq!(Value::i32(-5).as_signed(), Some(-5));
    assert_eq!(Value::i64(-1).as_unsigned(), Some(u64::MAX));
    assert_eq!(Value::int(IrType::I128, -1).as_unsigned(), None);
    assert_eq!(Value::Null.as_signed(), None);
}

#[test]
fn test_type_display() {
    assert_eq!(IrType::array(4, IrType::I32).to_string(), "[4 x i32]");
    assert_eq!(
        IrType::function(IrType::I32, vec![IrType::Ptr], true).to_string(),
        "i32 (ptr, ...)"
    );
    assert_eq!(IrType::literal_struct(vec![IrType::I8, IrType::Double]).to_string(), "{ i8, double }");
    let packed = IrType::Struct { name: None, fields: vec![IrType::I8], packed: true };
    assert_eq!(packed.to_string(), "<{ i8 }>");
}

#[test]
fn test_basic_block() {
    let mut block = BasicBlock::new(0);
    assert!(block.is_empty());
    assert!(!block.has_terminator());

    block.add_instruction(Instruction::Store { value: Value::i32(1), ptr: Value::Temp(0), align: None });
    assert!(!block.is_empty());
    assert!(!block.has_terminator());

    block.add_instruction(Instruction::Branch(3));
    assert!(block.has_terminator());
    assert_eq!(block.successors(), vec![3]);
}

#[test]
fn test_function_declaration() {
    let decl = IrBuilder::declare_function("foo", IrType::I32, &[(None, IrType::I32)]);
    assert!(decl.is_declaration());
    assert_eq!(decl.parameters.len(), 1);
    assert_eq!(decl.to_string(), "declare i32 @foo(i32)\n");
}

#[test]
fn test_ir_builder() {
    let mut builder = IrBuilder::new();
    builder.create_function("add", IrType::I32);
    let a = builder.add_parameter(Some("a"), IrType::I32).unwrap();
    let b = builder.add_parameter(Some("b"), IrType::I32).unwrap();

    let entry = builder.new_label();
    builder.create_block(entry, Some("entry")).unwrap();
    let sum = builder.build_binary(IrBinaryOp::Add, IrType::I32, a, b).unwrap();
    builder.set_name(&sum, "sum").unwrap();
    builder.build_return(Some(sum)).unwrap();

    let function = builder.finish_function().unwrap();
    assert_eq!(function.name, "add");
    assert_eq!(function.blocks.len(), 1);
    assert!(function.blocks[0].has_terminator());
    assert_eq!(
        function.to_string(),
        "define i32 @add(i32 %a, i32 %b) {\nentry:\n  %sum = add i32 %a, %b\n  ret i32 %sum\n}\n"
    );
}

#[test]
fn test_builder_errors() {
    let mut builder = IrBuilder::new();
    assert!(builder.build_return(None).is_err());

    builder.create_function("f", IrType::Void);
    assert!(builder.build_return(None).is_err());

    builder.create_block(0, None).unwrap();
    assert!(builder.create_block(0, None).is_err());
    assert!(builder.set_name(&Value::i32(1), "one").is_err());
}

#[test]
fn test_value_table_types_and_names() {
    let mut builder = IrBuilder::new();
    builder.create_function("f", IrType::I64);
    let x = builder.add_parameter(None, IrType::I32).unwrap();
    builder.create_block(0, None).unwrap();
    let wide = builder.build_cast(CastOp::SExt, x.clone(), IrType::I64).unwrap();
    let cond = builder.build_icmp(IntPredicate::Slt, x.clone(), Value::i32(0)).unwrap();
    let pick = builder.build_select(cond.clone(), wide.clone(), Value::i64(0)).unwrap();
    builder.build_return(Some(pick.clone())).unwrap();
    let function = builder.finish_function().unwrap();

    let table = ValueTable::new(&function);
    assert_eq!(table.value_type(&x), IrType::I32);
    assert_eq!(table.value_type(&wide), IrType::I64);
    assert_eq!(table.value_type(&cond), IrType::I1);
    assert_eq!(table.value_type(&pick), IrType::I64);
    assert_eq!(table.value_type(&Value::Temp(99)), IrType::Void);
    assert_eq!(table.value_ref(&x), "%0");
    assert!(table.defining_instruction(&x).is_none());
    assert!(matches!(table.defining_instruction(&wide), Some(Instruction::Cast { .. })));
}

#[test]
fn test_instruction_rendering() {
    let mut builder = IrBuilder::new();
    builder.create_function("g", IrType::Void);
    let p = builder.add_parameter(Some("p"), IrType::Ptr).unwrap();
    let entry = builder.new_label();
    let exit = builder.new_label();
    builder.create_block(entry, Some("entry")).unwrap();
    let slot = builder.build_alloca(IrType::I32, None, Some(4)).unwrap();
    builder.build_store(Value::i32(7), slot.clone(), Some(4)).unwrap();
    let loaded = builder.build_load(IrType::I32, slot, Some(4)).unwrap();
    let elem = builder.build_gep(IrType::I32, p.clone(), vec![Value::i64(1)], true).unwrap();
    builder.build_call(Value::Function("sink".to_string()), vec![loaded, elem], IrType::Void).unwrap();
    builder.build_branch(exit).unwrap();
    builder.create_block(exit, None).unwrap();
    builder.build_unreachable().unwrap();
    let function = builder.finish_function().unwrap();

    let table = ValueTable::new(&function);
    let rendered: Vec<String> = function.blocks.iter()
        .flat_map(|b| b.instructions.iter())
        .map(|inst| table.display(inst).to_string())
        .collect();
    assert_eq!(
        rendered,
        vec![
            "%1 = alloca i32, align 4",
            "store i32 7, ptr %1, align 4",
            "%2 = load i32, ptr %1, align 4",
            "%3 = getelementptr inbounds i32, ptr %p, i64 1",
            "call void @sink(i32 %2, ptr %3)",
            "br label %1",
            "unreachable",
        ]
    );
}

#[test]
fn test_module() {
    let mut module = Module::new("test".to_string());

    let function = Function::new("main".to_string(), IrType::I32);
    module.add_function(function);

    let global = GlobalVariable {
        name: "global_var".to_string(),
        var_type: IrType::I32,
        is_constant: false,
        initializer: Some(Value::i32(42)),
        linkage: Linkage::External,
    };
    module.add_global(global);

    assert_eq!(module.functions.len(), 1);
    assert_eq!(module.globals.len(), 1);
    assert!(module.get_function("main").is_some());
    assert!(module.get_global("global_var").is_some());
    assert_eq!(module.globals[0].to_string(), "@global_var = global i32 42");
}

#[test]
fn test_module_json_round_trip() {
    let mut module = Module::new("json".to_string())
        .with_data_layout(DataLayout::parse("e-p:32:32").unwrap());
    let mut builder = IrBuilder::new();
    builder.create_function("id", IrType::I32);
    let x = builder.add_parameter(Some("x"), IrType::I32).unwrap();
    builder.create_block(0, Some("entry")).unwrap();
    builder.build_return(Some(x)).unwrap();
    module.add_function(builder.finish_function().unwrap());

    let json = module.to_json().unwrap();
    let back = Module::from_json(&json).unwrap();
    assert_eq!(back, module);
}

#[test]
fn test_module_json_defaults() {
    let module = Module::from_json(r#"{ "name": "empty" }"#).unwrap();
    assert_eq!(module.data_layout, DataLayout::default());
    assert!(module.functions.is_empty());
}
