//! Target Data Layout
//!
//! Answers size and alignment questions for IR types, the way a target's
//! data layout string describes them. The layout is parsed from (and
//! printed back to) the LLVM layout string syntax, e.g.
//! `e-m:e-i64:64-f80:128-n8:16:32:64-S128`.
//!
//! All sizes and alignments returned by this module are in bytes; the
//! layout string itself is written in bits.

use irscope_common::IrError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::IrType;

/// ABI and preferred alignment of a type class, in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AlignPair {
    abi: u64,
    pref: u64,
}

impl AlignPair {
    const fn new(abi: u64, pref: u64) -> Self {
        Self { abi, pref }
    }
}

/// Memory layout of a struct type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    /// Byte offset of every field, in declaration order
    pub offsets: Vec<u64>,
    /// Total size in bytes, including tail padding
    pub size: u64,
    /// ABI alignment of the struct in bytes
    pub alignment: u64,
}

/// Target data layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataLayout {
    big_endian: bool,
    pointer_size: u64,
    pointer_align: AlignPair,
    int_aligns: BTreeMap<u32, AlignPair>,
    float_aligns: BTreeMap<u32, AlignPair>,
    aggregate_align: AlignPair,
    stack_align: Option<u64>,
}

impl Default for DataLayout {
    fn default() -> Self {
        let int_aligns = BTreeMap::from([
            (1, AlignPair::new(1, 1)),
            (8, AlignPair::new(1, 1)),
            (16, AlignPair::new(2, 2)),
            (32, AlignPair::new(4, 4)),
            (64, AlignPair::new(4, 8)),
        ]);
        let float_aligns = BTreeMap::from([
            (16, AlignPair::new(2, 2)),
            (32, AlignPair::new(4, 4)),
            (64, AlignPair::new(8, 8)),
            (128, AlignPair::new(16, 16)),
        ]);
        Self {
            big_endian: false,
            pointer_size: 8,
            pointer_align: AlignPair::new(8, 8),
            int_aligns,
            float_aligns,
            aggregate_align: AlignPair::new(0, 8),
            stack_align: None,
        }
    }
}

impl DataLayout {
    /// Parse a layout string. Specifiers not present keep their default.
    ///
    /// # Errors
    /// Returns [`IrError::InvalidLayout`] for unknown specifiers, malformed
    /// numbers, sizes that are not whole bytes, and preferred alignments
    /// smaller than the ABI alignment.
    pub fn parse(spec: &str) -> Result<Self, IrError> {
        let mut layout = DataLayout::default();
        if spec.is_empty() {
            return Ok(layout);
        }

        for token in spec.split('-') {
            let err = |message: String| IrError::invalid_layout(spec, message);
            let mut chars = token.chars();
            let Some(kind) = chars.next() else {
                return Err(err("empty specifier".to_string()));
            };
            let rest = chars.as_str();

            match kind {
                'e' if rest.is_empty() => layout.big_endian = false,
                'E' if rest.is_empty() => layout.big_endian = true,
                'p' => {
                    let (space, fields) = rest.split_once(':')
                        .ok_or_else(|| err(format!("pointer specifier '{token}' has no size")))?;
                    let space: u32 = if space.is_empty() { 0 } else { parse_number(space).map_err(&err)? };
                    let fields: Vec<&str> = fields.split(':').collect();
                    if fields.len() < 2 || fields.len() > 4 {
                        return Err(err(format!("pointer specifier '{token}' needs size and alignment")));
                    }
                    let size = parse_bits(fields[0], false).map_err(&err)?;
                    let align = parse_align_pair(&fields[1..2], fields.get(2).copied()).map_err(&err)?;
                    // Only the default address space is modelled
                    if space == 0 {
                        layout.pointer_size = size;
                        layout.pointer_align = align;
                    }
                }
                'i' | 'f' => {
                    let (width, fields) = rest.split_once(':')
                        .ok_or_else(|| err(format!("specifier '{token}' has no alignment")))?;
                    let width: u32 = parse_number(width).map_err(&err)?;
                    if width == 0 {
                        return Err(err(format!("specifier '{token}' has zero width")));
                    }
                    let fields: Vec<&str> = fields.split(':').collect();
                    if fields.len() > 2 {
                        return Err(err(format!("specifier '{token}' has too many fields")));
                    }
                    let align = parse_align_pair(&fields[..1], fields.get(1).copied()).map_err(&err)?;
                    if align.abi == 0 {
                        return Err(err(format!("specifier '{token}' has zero ABI alignment")));
                    }
                    if kind == 'i' {
                        layout.int_aligns.insert(width, align);
                    } else {
                        layout.float_aligns.insert(width, align);
                    }
                }
                'a' => {
                    let fields = rest.split_once(':').map(|(_, f)| f)
                        .ok_or_else(|| err(format!("aggregate specifier '{token}' has no alignment")))?;
                    let fields: Vec<&str> = fields.split(':').collect();
                    if fields.len() > 2 {
                        return Err(err(format!("specifier '{token}' has too many fields")));
                    }
                    layout.aggregate_align = parse_align_pair(&fields[..1], fields.get(1).copied())
                        .map_err(&err)?;
                }
                'S' => {
                    let bits = parse_bits(rest, true).map_err(&err)?;
                    layout.stack_align = (bits != 0).then_some(bits);
                }
                // Mangling, native widths, vectors, address spaces and
                // function pointer alignment do not affect reported sizes
                'm' | 'n' | 'v' | 'A' | 'P' | 'G' | 'F' => {}
                _ => return Err(err(format!("unknown specifier '{token}'"))),
            }
        }

        Ok(layout)
    }

    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// Pointer size in bytes
    pub fn pointer_size(&self) -> u64 {
        self.pointer_size
    }

    /// Natural stack alignment in bytes, if the target declares one
    pub fn stack_alignment(&self) -> Option<u64> {
        self.stack_align
    }

    /// ABI-required alignment of a type in bytes
    pub fn abi_alignment(&self, ty: &IrType) -> u64 {
        self.alignment(ty, false)
    }

    /// Preferred alignment of a type in bytes (used for stack slots)
    pub fn pref_alignment(&self, ty: &IrType) -> u64 {
        self.alignment(ty, true)
    }

    fn alignment(&self, ty: &IrType, pref: bool) -> u64 {
        let pick = |pair: AlignPair| if pref { pair.pref } else { pair.abi };
        let align = match ty {
            IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64 | IrType::I128 => {
                let bits = ty.int_width().unwrap_or(8);
                pick(self.int_alignment(bits))
            }
            IrType::Half | IrType::Float | IrType::Double => {
                let bits = ty.float_width().unwrap_or(32);
                self.float_aligns.get(&bits).map(|&pair| pick(pair)).unwrap_or(u64::from(bits) / 8)
            }
            IrType::Ptr => pick(self.pointer_align),
            IrType::Array { element_type, .. } => self.alignment(element_type, pref),
            IrType::Struct { packed: true, .. } => 1,
            IrType::Struct { fields, .. } => {
                let fields_align = fields.iter()
                    .map(|field| self.abi_alignment(field))
                    .max()
                    .unwrap_or(1);
                fields_align.max(pick(self.aggregate_align))
            }
            IrType::Void | IrType::Label | IrType::Function { .. } => 1,
        };
        align.max(1)
    }

    /// Integer alignment lookup: exact width, else the next wider entry,
    /// else the widest entry known.
    fn int_alignment(&self, bits: u32) -> AlignPair {
        if let Some(pair) = self.int_aligns.get(&bits) {
            return *pair;
        }
        self.int_aligns.range(bits..).next()
            .or_else(|| self.int_aligns.iter().next_back())
            .map(|(_, pair)| *pair)
            .unwrap_or(AlignPair::new(1, 1))
    }

    /// Size of a type in bits, without padding. `None` when the size does
    /// not fit in 64 bits.
    pub fn type_size_in_bits(&self, ty: &IrType) -> Option<u64> {
        match ty {
            IrType::I1 | IrType::I8 | IrType::I16 | IrType::I32 | IrType::I64 | IrType::I128 => {
                Some(u64::from(ty.int_width().unwrap_or(0)))
            }
            IrType::Half | IrType::Float | IrType::Double => Some(u64::from(ty.float_width().unwrap_or(0))),
            IrType::Ptr => self.pointer_size.checked_mul(8),
            IrType::Array { size, element_type } => {
                self.alloc_size(element_type)?.checked_mul(*size)?.checked_mul(8)
            }
            IrType::Struct { fields, packed, .. } => self.struct_layout(fields, *packed)?.size.checked_mul(8),
            IrType::Void | IrType::Label | IrType::Function { .. } => Some(0),
        }
    }

    /// Bytes written by a store of this type
    pub fn store_size(&self, ty: &IrType) -> Option<u64> {
        Some(self.type_size_in_bits(ty)?.div_ceil(8))
    }

    /// Bytes between successive objects of this type (store size rounded
    /// up to the ABI alignment)
    pub fn alloc_size(&self, ty: &IrType) -> Option<u64> {
        align_to(self.store_size(ty)?, self.abi_alignment(ty))
    }

    /// Compute field offsets, size and alignment of a struct, or `None`
    /// when it does not fit in the address space of a u64
    pub fn struct_layout(&self, fields: &[IrType], packed: bool) -> Option<StructLayout> {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0u64;
        let mut alignment = 1u64;

        for field in fields {
            let field_align = if packed { 1 } else { self.abi_alignment(field) };
            offset = align_to(offset, field_align)?;
            offsets.push(offset);
            offset = offset.checked_add(self.alloc_size(field)?)?;
            alignment = alignment.max(field_align);
        }

        if !packed {
            alignment = alignment.max(self.aggregate_align.abi);
        }
        Some(StructLayout {
            offsets,
            size: align_to(offset, alignment)?,
            alignment,
        })
    }
}

fn align_to(value: u64, align: u64) -> Option<u64> {
    if align <= 1 {
        Some(value)
    } else {
        value.div_ceil(align).checked_mul(align)
    }
}

fn parse_number<T: std::str::FromStr>(text: &str) -> Result<T, String> {
    text.parse().map_err(|_| format!("'{text}' is not a valid number"))
}

/// Parse a bit count into bytes
fn parse_bits(text: &str, allow_zero: bool) -> Result<u64, String> {
    let bits: u64 = parse_number(text)?;
    if bits == 0 && !allow_zero {
        return Err(format!("'{text}' must be non-zero"));
    }
    if bits % 8 != 0 {
        return Err(format!("{bits} bits is not a whole number of bytes"));
    }
    Ok(bits / 8)
}

fn parse_alignment(text: &str) -> Result<u64, String> {
    let bytes = parse_bits(text, true)?;
    if bytes != 0 && !bytes.is_power_of_two() {
        return Err(format!("alignment {text} is not a power of two"));
    }
    Ok(bytes)
}

fn parse_align_pair(abi: &[&str], pref: Option<&str>) -> Result<AlignPair, String> {
    let abi_text = abi.first().copied().unwrap_or_default();
    let abi = parse_alignment(abi_text)?;
    let pref = match pref {
        Some(text) => parse_alignment(text)?,
        None => abi,
    };
    if pref < abi {
        return Err(format!("preferred alignment {} is smaller than ABI alignment {}", pref * 8, abi * 8));
    }
    Ok(AlignPair::new(abi, pref))
}

impl fmt::Display for DataLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.big_endian { "E" } else { "e" })?;
        write!(
            f,
            "-p:{}:{}:{}",
            self.pointer_size * 8,
            self.pointer_align.abi * 8,
            self.pointer_align.pref * 8
        )?;
        for (bits, pair) in &self.int_aligns {
            write!(f, "-i{bits}:{}:{}", pair.abi * 8, pair.pref * 8)?;
        }
        for (bits, pair) in &self.float_aligns {
            write!(f, "-f{bits}:{}:{}", pair.abi * 8, pair.pref * 8)?;
        }
        write!(f, "-a:{}:{}", self.aggregate_align.abi * 8, self.aggregate_align.pref * 8)?;
        if let Some(stack) = self.stack_align {
            write!(f, "-S{}", stack * 8)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for DataLayout {
    type Error = IrError;

    fn try_from(spec: String) -> Result<Self, Self::Error> {
        DataLayout::parse(&spec)
    }
}

impl From<DataLayout> for String {
    fn from(layout: DataLayout) -> Self {
        layout.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X86_64: &str = "e-m:e-p270:32:32-p271:32:32-p272:64:64-i64:64-i128:128-f80:128-n8:16:32:64-S128";

    #[test]
    fn test_default_layout() {
        let dl = DataLayout::default();
        assert!(!dl.is_big_endian());
        assert_eq!(dl.pointer_size(), 8);
        assert_eq!(dl.abi_alignment(&IrType::I64), 4);
        assert_eq!(dl.pref_alignment(&IrType::I64), 8);
        assert_eq!(dl.alloc_size(&IrType::I1), Some(1));
        assert_eq!(dl.alloc_size(&IrType::Double), Some(8));
    }

    #[test]
    fn test_parse_x86_64() {
        let dl = DataLayout::parse(X86_64).unwrap();
        assert_eq!(dl.abi_alignment(&IrType::I64), 8);
        assert_eq!(dl.abi_alignment(&IrType::I128), 16);
        assert_eq!(dl.abi_alignment(&IrType::Ptr), 8);
        assert_eq!(dl.stack_alignment(), Some(16));
        // p270 belongs to another address space and leaves the default alone
        assert_eq!(dl.pointer_size(), 8);
    }

    #[test]
    fn test_parse_32bit_pointers() {
        let dl = DataLayout::parse("e-p:32:32-i64:64").unwrap();
        assert_eq!(dl.pointer_size(), 4);
        assert_eq!(dl.alloc_size(&IrType::Ptr), Some(4));
    }

    #[test]
    fn test_parse_big_endian() {
        let dl = DataLayout::parse("E-p:64:64").unwrap();
        assert!(dl.is_big_endian());
    }

    #[test]
    fn test_parse_errors() {
        assert!(DataLayout::parse("e-q:1").is_err());
        assert!(DataLayout::parse("e-i32:abc").is_err());
        assert!(DataLayout::parse("e-i32:12").is_err());
        assert!(DataLayout::parse("e-i32:64:32").is_err());
        assert!(DataLayout::parse("e--i32:32").is_err());
        assert!(DataLayout::parse("e-p").is_err());
    }

    #[test]
    fn test_unlisted_int_width_uses_next_wider_entry() {
        let dl = DataLayout::parse("e-i32:32-i64:64").unwrap();
        // i128 has no entry, so the widest known (i64) applies
        assert_eq!(dl.abi_alignment(&IrType::I128), 8);
    }

    #[test]
    fn test_struct_layout_with_padding() {
        let dl = DataLayout::parse(X86_64).unwrap();
        let layout = dl.struct_layout(&[IrType::I8, IrType::I32, IrType::I8], false).unwrap();
        assert_eq!(layout.offsets, vec![0, 4, 8]);
        assert_eq!(layout.size, 12);
        assert_eq!(layout.alignment, 4);

        let packed = dl.struct_layout(&[IrType::I8, IrType::I32, IrType::I8], true).unwrap();
        assert_eq!(packed.offsets, vec![0, 1, 5]);
        assert_eq!(packed.size, 6);
    }

    #[test]
    fn test_array_sizes() {
        let dl = DataLayout::parse(X86_64).unwrap();
        assert_eq!(dl.alloc_size(&IrType::array(10, IrType::I32)), Some(40));
        let nested = IrType::array(2, IrType::literal_struct(vec![IrType::I64, IrType::I8]));
        assert_eq!(dl.alloc_size(&nested), Some(32));
    }

    #[test]
    fn test_sizes_beyond_u64_are_none() {
        let dl = DataLayout::parse(X86_64).unwrap();
        let huge = IrType::array(1 << 62, IrType::I64);
        assert_eq!(dl.type_size_in_bits(&huge), None);
        assert_eq!(dl.alloc_size(&huge), None);
        assert_eq!(dl.alloc_size(&IrType::array(2, huge.clone())), None);
        assert!(dl.struct_layout(&[IrType::I8, huge], false).is_none());
        assert_eq!(dl.alloc_size(&IrType::array(1 << 40, IrType::I8)), Some(1 << 40));
    }

    #[test]
    fn test_display_round_trip() {
        let dl = DataLayout::parse(X86_64).unwrap();
        let printed = dl.to_string();
        assert_eq!(DataLayout::parse(&printed).unwrap(), dl);
    }

    #[test]
    fn test_serde_uses_layout_string() {
        let dl = DataLayout::parse("e-p:32:32").unwrap();
        let json = serde_json::to_string(&dl).unwrap();
        assert!(json.starts_with("\"e-p:32:32:32"));
        let back: DataLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dl);
        assert!(serde_json::from_str::<DataLayout>("\"e-z\"").is_err());
    }
}
