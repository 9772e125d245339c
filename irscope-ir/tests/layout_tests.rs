//! Tests for data layout size and alignment queries

use irscope_ir::{DataLayout, IrType};
use pretty_assertions::assert_eq;

const X86_64: &str = "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128";

fn x86_64() -> DataLayout {
    DataLayout::parse(X86_64).expect("x86-64 layout should parse")
}

#[test]
fn test_x86_64_scalars() {
    let layout = x86_64();
    assert!(!layout.is_big_endian());
    assert_eq!(layout.pointer_size(), 8);
    assert_eq!(layout.stack_alignment(), Some(16));

    assert_eq!(layout.abi_alignment(&IrType::I64), 8);
    assert_eq!(layout.abi_alignment(&IrType::I128), 16);
    assert_eq!(layout.abi_alignment(&IrType::Ptr), 8);
    assert_eq!(layout.alloc_size(&IrType::I1), Some(1));
    assert_eq!(layout.store_size(&IrType::I16), Some(2));
    assert_eq!(layout.alloc_size(&IrType::Double), Some(8));
}

#[test]
fn test_simple_struct_layout() {
    let layout = x86_64().struct_layout(&[IrType::I8, IrType::I32, IrType::I64], false).unwrap();
    assert_eq!(layout.offsets, vec![0, 4, 8]);
    assert_eq!(layout.size, 16);
    assert_eq!(layout.alignment, 8);
}

#[test]
fn test_packed_struct_layout() {
    let layout = x86_64().struct_layout(&[IrType::I8, IrType::I32], true).unwrap();
    assert_eq!(layout.offsets, vec![0, 1]);
    assert_eq!(layout.size, 5);
    assert_eq!(layout.alignment, 1);
}

#[test]
fn test_struct_tail_padding() {
    let layout = x86_64();
    let ty = IrType::literal_struct(vec![IrType::Double, IrType::I8]);
    assert_eq!(layout.alloc_size(&ty), Some(16));
    assert_eq!(layout.type_size_in_bits(&ty), Some(128));
}

#[test]
fn test_array_of_structs() {
    let layout = x86_64();
    let pair = IrType::literal_struct(vec![IrType::I8, IrType::I16]);
    assert_eq!(layout.alloc_size(&pair), Some(4));
    assert_eq!(layout.alloc_size(&IrType::array(3, pair)), Some(12));
    assert_eq!(layout.pref_alignment(&IrType::array(4, IrType::I64)), 8);
}

#[test]
fn test_invalid_layouts() {
    for bad in ["x", "p:63:64", "i32:64:32", "i32:24", "i:32"] {
        assert!(DataLayout::parse(bad).is_err(), "'{bad}' should be rejected");
    }
}
