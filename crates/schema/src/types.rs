//! Leaf types and the value descriptors derived from them.
//!
//! A [`TypeDef`] is what the schema file says; a [`LeafType`] is the
//! resolved, range-checked form the engine works with. Every leaf exposes
//! its accepted values as an ordered list of [`ValueDescriptor`]s: one per
//! literal (enum value, bit, boolean) and one per open-ended typed value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Schema-file representation ─────────────────────────────────────────────

/// Range restriction shared by all integer bases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IntRestriction {
    /// Inclusive `[min, max]`; defaults to the full range of the base type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(i64, i64)>,
}

/// Restriction for `decimal64`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecimalRestriction {
    /// Number of digits after the decimal point (1..=18).
    #[serde(rename = "fraction-digits")]
    pub fraction_digits: u8,
    /// Inclusive `[min, max]` in whole units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

/// Restriction for `string`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StringRestriction {
    /// Inclusive `[min, max]` length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<(u64, u64)>,
}

/// Literal names of an `enumeration`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumRestriction {
    /// Enum literals in declaration order.
    pub enums: Vec<String>,
}

/// Bit names of a `bits` type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BitsRestriction {
    /// Bit names in declaration order.
    pub bits: Vec<String>,
}

/// Member types of a `union`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnionMembers {
    /// Member types, tried in order.
    pub types: Vec<TypeDef>,
}

/// A leaf type as written in the schema file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "base", rename_all = "kebab-case")]
pub enum TypeDef {
    /// Signed 8-bit integer.
    Int8(IntRestriction),
    /// Signed 16-bit integer.
    Int16(IntRestriction),
    /// Signed 32-bit integer.
    Int32(IntRestriction),
    /// Signed 64-bit integer.
    Int64(IntRestriction),
    /// Unsigned 8-bit integer.
    Uint8(IntRestriction),
    /// Unsigned 16-bit integer.
    Uint16(IntRestriction),
    /// Unsigned 32-bit integer.
    Uint32(IntRestriction),
    /// Unsigned 64-bit integer.
    Uint64(IntRestriction),
    /// Fixed-point decimal.
    Decimal64(DecimalRestriction),
    /// Free text.
    String(StringRestriction),
    /// `true` / `false`.
    Boolean,
    /// Presence-only leaf without a value.
    Empty,
    /// One of a fixed set of literals.
    Enumeration(EnumRestriction),
    /// Any subset of a fixed set of bit names.
    Bits(BitsRestriction),
    /// First member type that accepts the value.
    Union(UnionMembers),
}

// ─── Resolved types ─────────────────────────────────────────────────────────

/// The eight integer bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
}

impl IntKind {
    /// Base type name as written in schema files.
    pub fn name(self) -> &'static str {
        match self {
            IntKind::Int8 => "int8",
            IntKind::Int16 => "int16",
            IntKind::Int32 => "int32",
            IntKind::Int64 => "int64",
            IntKind::Uint8 => "uint8",
            IntKind::Uint16 => "uint16",
            IntKind::Uint32 => "uint32",
            IntKind::Uint64 => "uint64",
        }
    }

    /// Full inclusive range of the base type.
    pub fn bounds(self) -> (i128, i128) {
        match self {
            IntKind::Int8 => (i8::MIN.into(), i8::MAX.into()),
            IntKind::Int16 => (i16::MIN.into(), i16::MAX.into()),
            IntKind::Int32 => (i32::MIN.into(), i32::MAX.into()),
            IntKind::Int64 => (i64::MIN.into(), i64::MAX.into()),
            IntKind::Uint8 => (0, u8::MAX.into()),
            IntKind::Uint16 => (0, u16::MAX.into()),
            IntKind::Uint32 => (0, u32::MAX.into()),
            IntKind::Uint64 => (0, u64::MAX.into()),
        }
    }
}

/// Errors found while resolving a [`TypeDef`].
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    /// Range bounds are inverted or fall outside the base type.
    #[error("invalid range [{min}, {max}] for {base}")]
    InvalidRange {
        /// Base type name.
        base: &'static str,
        /// Declared minimum.
        min: String,
        /// Declared maximum.
        max: String,
    },
    /// `decimal64` fraction digits outside 1..=18.
    #[error("fraction-digits must be 1..=18, got {0}")]
    FractionDigits(u8),
    /// Enumeration, bits or union without members.
    #[error("{0} must declare at least one member")]
    NoMembers(&'static str),
    /// The same literal appears twice.
    #[error("duplicate literal '{0}'")]
    DuplicateLiteral(String),
}

/// A resolved leaf type.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafType {
    /// Integer within `[min, max]`.
    Integer {
        /// Base type.
        kind: IntKind,
        /// Inclusive minimum.
        min: i128,
        /// Inclusive maximum.
        max: i128,
    },
    /// Decimal; `min`/`max` are scaled by `10^fraction_digits`.
    Decimal {
        /// Digits after the decimal point.
        fraction_digits: u8,
        /// Scaled inclusive minimum.
        min: i128,
        /// Scaled inclusive maximum.
        max: i128,
    },
    /// Text with a length restriction.
    String {
        /// Minimum length in characters.
        min_len: u64,
        /// Maximum length in characters.
        max_len: u64,
    },
    /// `true` / `false`.
    Boolean,
    /// No value.
    Empty,
    /// Fixed literals.
    Enumeration(Vec<String>),
    /// Bit names.
    Bits(Vec<String>),
    /// Union of member types.
    Union(Vec<LeafType>),
}

impl LeafType {
    /// Resolve and check a schema-file type definition.
    pub fn resolve(def: &TypeDef) -> Result<Self, TypeError> {
        let int = |kind: IntKind, r: &IntRestriction| -> Result<Self, TypeError> {
            let (lo, hi) = kind.bounds();
            let (min, max) = match r.range {
                Some((a, b)) => (i128::from(a), i128::from(b)),
                None => (lo, hi),
            };
            if min > max || min < lo || max > hi {
                return Err(TypeError::InvalidRange {
                    base: kind.name(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
            Ok(LeafType::Integer { kind, min, max })
        };
        match def {
            TypeDef::Int8(r) => int(IntKind::Int8, r),
            TypeDef::Int16(r) => int(IntKind::Int16, r),
            TypeDef::Int32(r) => int(IntKind::Int32, r),
            TypeDef::Int64(r) => int(IntKind::Int64, r),
            TypeDef::Uint8(r) => int(IntKind::Uint8, r),
            TypeDef::Uint16(r) => int(IntKind::Uint16, r),
            TypeDef::Uint32(r) => int(IntKind::Uint32, r),
            TypeDef::Uint64(r) => int(IntKind::Uint64, r),
            TypeDef::Decimal64(d) => {
                if !(1..=18).contains(&d.fraction_digits) {
                    return Err(TypeError::FractionDigits(d.fraction_digits));
                }
                let scale = 10f64.powi(i32::from(d.fraction_digits));
                let (min, max) = match d.range {
                    Some((a, b)) => ((a * scale).round() as i128, (b * scale).round() as i128),
                    None => (i64::MIN.into(), i64::MAX.into()),
                };
                if min > max {
                    return Err(TypeError::InvalidRange {
                        base: "decimal64",
                        min: min.to_string(),
                        max: max.to_string(),
                    });
                }
                Ok(LeafType::Decimal {
                    fraction_digits: d.fraction_digits,
                    min,
                    max,
                })
            }
            TypeDef::String(s) => {
                let (min_len, max_len) = s.length.unwrap_or((0, u64::MAX));
                if min_len > max_len {
                    return Err(TypeError::InvalidRange {
                        base: "string",
                        min: min_len.to_string(),
                        max: max_len.to_string(),
                    });
                }
                Ok(LeafType::String { min_len, max_len })
            }
            TypeDef::Boolean => Ok(LeafType::Boolean),
            TypeDef::Empty => Ok(LeafType::Empty),
            TypeDef::Enumeration(e) => {
                check_literals("enumeration", &e.enums)?;
                Ok(LeafType::Enumeration(e.enums.clone()))
            }
            TypeDef::Bits(b) => {
                check_literals("bits", &b.bits)?;
                Ok(LeafType::Bits(b.bits.clone()))
            }
            TypeDef::Union(u) => {
                if u.types.is_empty() {
                    return Err(TypeError::NoMembers("union"));
                }
                let members = u
                    .types
                    .iter()
                    .map(LeafType::resolve)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(LeafType::Union(members))
            }
        }
    }

    /// Base type name (`"uint8"`, `"string"`, `"union"`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            LeafType::Integer { kind, .. } => kind.name(),
            LeafType::Decimal { .. } => "decimal64",
            LeafType::String { .. } => "string",
            LeafType::Boolean => "boolean",
            LeafType::Empty => "empty",
            LeafType::Enumeration(_) => "enumeration",
            LeafType::Bits(_) => "bits",
            LeafType::Union(_) => "union",
        }
    }

    /// Whether values of this type are sets of bit names.
    pub fn is_bits(&self) -> bool {
        matches!(self, LeafType::Bits(_))
    }

    /// Whether this is the valueless `empty` type.
    pub fn is_empty_type(&self) -> bool {
        matches!(self, LeafType::Empty)
    }

    /// The ordered value alternatives a leaf of this type offers.
    pub fn descriptors(&self) -> Vec<ValueDescriptor> {
        let mut out = Vec::new();
        self.push_descriptors(&mut out);
        out
    }

    fn push_descriptors(&self, out: &mut Vec<ValueDescriptor>) {
        let mut push = |d: ValueDescriptor| {
            if !out.iter().any(|o| o.display == d.display) {
                out.push(d);
            }
        };
        match self {
            LeafType::Empty => {}
            LeafType::Boolean => {
                push(ValueDescriptor::literal("true"));
                push(ValueDescriptor::literal("false"));
            }
            LeafType::Enumeration(lits) => lits
                .iter()
                .for_each(|l| push(ValueDescriptor::literal(l))),
            LeafType::Bits(bits) => bits.iter().for_each(|b| {
                push(ValueDescriptor {
                    kind: ValueKind::Bit(b.clone()),
                    display: b.clone(),
                    help: format!("bit {b}"),
                })
            }),
            LeafType::Union(members) => {
                for m in members {
                    for d in m.descriptors() {
                        push(d);
                    }
                }
            }
            LeafType::Integer { .. } | LeafType::Decimal { .. } | LeafType::String { .. } => {
                push(ValueDescriptor {
                    kind: ValueKind::Typed(self.clone()),
                    display: format!("<{}>", self.name()),
                    help: self.describe(),
                })
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            LeafType::Integer { kind, min, max } => format!("{} [{min}..{max}]", kind.name()),
            LeafType::Decimal {
                fraction_digits, ..
            } => format!("decimal64 with {fraction_digits} fraction digits"),
            LeafType::String { min_len, max_len } if *max_len == u64::MAX => {
                if *min_len == 0 {
                    "string".to_string()
                } else {
                    format!("string, at least {min_len} characters")
                }
            }
            LeafType::String { min_len, max_len } => {
                format!("string, length {min_len}..{max_len}")
            }
            other => other.name().to_string(),
        }
    }
}

fn check_literals(what: &'static str, lits: &[String]) -> Result<(), TypeError> {
    if lits.is_empty() {
        return Err(TypeError::NoMembers(what));
    }
    for (i, l) in lits.iter().enumerate() {
        if lits[..i].contains(l) {
            return Err(TypeError::DuplicateLiteral(l.clone()));
        }
    }
    Ok(())
}

// ─── Value descriptors ──────────────────────────────────────────────────────

/// Why a typed word was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    /// Not a number of the expected shape.
    #[error("'{text}' is not a valid {base}")]
    Malformed {
        /// Offending text.
        text: String,
        /// Expected base type.
        base: &'static str,
    },
    /// Outside the allowed range.
    #[error("'{text}' is out of range [{min}..{max}]")]
    OutOfRange {
        /// Offending text.
        text: String,
        /// Inclusive minimum (rendered).
        min: String,
        /// Inclusive maximum (rendered).
        max: String,
    },
    /// String length outside the allowed range.
    #[error("'{text}' must be {min}..{max} characters long")]
    Length {
        /// Offending text.
        text: String,
        /// Minimum length.
        min: u64,
        /// Maximum length.
        max: u64,
    },
    /// Not the expected literal.
    #[error("'{text}' is not '{expected}'")]
    NotLiteral {
        /// Offending text.
        text: String,
        /// Expected literal.
        expected: String,
    },
}

/// What a single value alternative accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    /// An enum or boolean literal, typed as a keyword.
    Literal(String),
    /// One bit name of a `bits` type.
    Bit(String),
    /// Any value of a scalar type.
    Typed(LeafType),
}

/// One value alternative of a leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueDescriptor {
    kind: ValueKind,
    display: String,
    help: String,
}

impl ValueDescriptor {
    fn literal(lit: &str) -> Self {
        Self {
            kind: ValueKind::Literal(lit.to_string()),
            display: lit.to_string(),
            help: String::new(),
        }
    }

    /// What this alternative accepts.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    /// Completion text: the literal itself, or `<type>` for typed values.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// One-line help.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Whether this alternative is typed as a keyword.
    pub fn is_keyword(&self) -> bool {
        !matches!(self.kind, ValueKind::Typed(_))
    }

    /// Whether this alternative is a bit of a `bits` type.
    pub fn is_bit(&self) -> bool {
        matches!(self.kind, ValueKind::Bit(_))
    }

    /// Whether `text` could still become a valid value by typing more.
    pub fn accepts_partial(&self, text: &str) -> bool {
        match &self.kind {
            ValueKind::Literal(l) | ValueKind::Bit(l) => l.starts_with(text),
            ValueKind::Typed(ty) => typed_accepts_partial(ty, text),
        }
    }

    /// Validate a complete value and return its canonical text.
    pub fn parse(&self, text: &str) -> Result<String, ValueError> {
        match &self.kind {
            ValueKind::Literal(l) | ValueKind::Bit(l) => {
                if l == text {
                    Ok(text.to_string())
                } else {
                    Err(ValueError::NotLiteral {
                        text: text.to_string(),
                        expected: l.clone(),
                    })
                }
            }
            ValueKind::Typed(ty) => parse_typed(ty, text),
        }
    }
}

fn typed_accepts_partial(ty: &LeafType, text: &str) -> bool {
    match ty {
        LeafType::Integer { min, max, .. } => integer_prefix_fits(text, *min, *max),
        LeafType::Decimal {
            fraction_digits,
            min,
            max,
        } => {
            let (int_part, frac) = match text.split_once('.') {
                Some((i, f)) => (i, Some(f)),
                None => (text, None),
            };
            if let Some(f) = frac
                && (f.len() > usize::from(*fraction_digits) || !f.bytes().all(|b| b.is_ascii_digit()))
            {
                return false;
            }
            let scale = 10i128.pow(u32::from(*fraction_digits));
            integer_prefix_fits(int_part, min.div_euclid(scale), max.div_euclid(scale) + 1)
        }
        LeafType::String { max_len, .. } => (text.chars().count() as u64) <= *max_len,
        _ => false,
    }
}

/// Whether appending zero or more digits to `text` can land in `[min, max]`.
fn integer_prefix_fits(text: &str, min: i128, max: i128) -> bool {
    if text.is_empty() {
        return true;
    }
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if negative && min >= 0 {
        return false;
    }
    if digits.is_empty() {
        return negative;
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let Ok(stem) = digits.parse::<i128>() else {
        return false;
    };
    // Magnitudes reachable on this side of zero.
    let (lo, hi) = if negative {
        (0.max(-max), -min)
    } else {
        (0.max(min), max)
    };
    if lo > hi {
        return false;
    }
    let mut width: i128 = 1;
    for _ in 0..40 {
        let Some(base) = stem.checked_mul(width) else {
            return false;
        };
        if base > hi {
            return false;
        }
        if base + width - 1 >= lo {
            return true;
        }
        let Some(next) = width.checked_mul(10) else {
            return false;
        };
        width = next;
    }
    false
}

fn parse_typed(ty: &LeafType, text: &str) -> Result<String, ValueError> {
    match ty {
        LeafType::Integer { kind, min, max } => {
            let well_formed = !text.is_empty()
                && text
                    .strip_prefix('-')
                    .unwrap_or(text)
                    .bytes()
                    .all(|b| b.is_ascii_digit());
            let value = well_formed
                .then(|| text.parse::<i128>().ok())
                .flatten()
                .ok_or_else(|| ValueError::Malformed {
                    text: text.to_string(),
                    base: kind.name(),
                })?;
            if value < *min || value > *max {
                return Err(ValueError::OutOfRange {
                    text: text.to_string(),
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
            Ok(value.to_string())
        }
        LeafType::Decimal {
            fraction_digits,
            min,
            max,
        } => {
            let malformed = || ValueError::Malformed {
                text: text.to_string(),
                base: "decimal64",
            };
            let (negative, body) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text),
            };
            let (int_part, frac) = body.split_once('.').unwrap_or((body, ""));
            let fd = usize::from(*fraction_digits);
            if int_part.is_empty()
                || !int_part.bytes().all(|b| b.is_ascii_digit())
                || !frac.bytes().all(|b| b.is_ascii_digit())
                || frac.len() > fd
            {
                return Err(malformed());
            }
            let whole: i128 = int_part.parse().map_err(|_| malformed())?;
            let padded = format!("{frac:0<fd$}");
            let fraction: i128 = padded.parse().map_err(|_| malformed())?;
            let scale = 10i128.pow(u32::from(*fraction_digits));
            let magnitude = whole
                .checked_mul(scale)
                .and_then(|w| w.checked_add(fraction))
                .ok_or_else(malformed)?;
            let scaled = if negative { -magnitude } else { magnitude };
            if scaled < *min || scaled > *max {
                return Err(ValueError::OutOfRange {
                    text: text.to_string(),
                    min: render_decimal(*min, fd),
                    max: render_decimal(*max, fd),
                });
            }
            Ok(render_decimal(scaled, fd))
        }
        LeafType::String { min_len, max_len } => {
            let len = text.chars().count() as u64;
            if len < *min_len || len > *max_len {
                return Err(ValueError::Length {
                    text: text.to_string(),
                    min: *min_len,
                    max: *max_len,
                });
            }
            Ok(text.to_string())
        }
        other => Err(ValueError::Malformed {
            text: text.to_string(),
            base: other.name(),
        }),
    }
}

/// Canonical decimal text: trailing fraction zeros trimmed, at least one kept.
fn render_decimal(scaled: i128, fraction_digits: usize) -> String {
    let scale = 10i128.pow(fraction_digits as u32);
    let sign = if scaled < 0 { "-" } else { "" };
    let magnitude = scaled.unsigned_abs();
    let scale = scale.unsigned_abs();
    let whole = magnitude / scale;
    let frac = format!("{:0>fraction_digits$}", magnitude % scale);
    let trimmed = frac.trim_end_matches('0');
    let frac = if trimmed.is_empty() { "0" } else { trimmed };
    format!("{sign}{whole}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint8() -> LeafType {
        LeafType::resolve(&TypeDef::Uint8(IntRestriction::default())).unwrap()
    }

    fn typed(ty: LeafType) -> ValueDescriptor {
        ty.descriptors().remove(0)
    }

    #[test]
    fn typedef_deserializes_from_base_tag() {
        let t: TypeDef = serde_json::from_str(r#"{"base":"uint8","range":[1,10]}"#).unwrap();
        assert_eq!(
            t,
            TypeDef::Uint8(IntRestriction {
                range: Some((1, 10))
            })
        );
        let e: TypeDef =
            serde_json::from_str(r#"{"base":"enumeration","enums":["up","down"]}"#).unwrap();
        assert!(matches!(e, TypeDef::Enumeration(_)));
        let d: TypeDef =
            serde_json::from_str(r#"{"base":"decimal64","fraction-digits":2}"#).unwrap();
        assert!(matches!(d, TypeDef::Decimal64(_)));
        let b: TypeDef = serde_json::from_str(r#"{"base":"boolean"}"#).unwrap();
        assert_eq!(b, TypeDef::Boolean);
    }

    #[test]
    fn range_outside_base_is_rejected() {
        let err = LeafType::resolve(&TypeDef::Uint8(IntRestriction {
            range: Some((0, 300)),
        }))
        .unwrap_err();
        assert!(matches!(err, TypeError::InvalidRange { base: "uint8", .. }));
    }

    #[test]
    fn duplicate_enum_literal_is_rejected() {
        let err = LeafType::resolve(&TypeDef::Enumeration(EnumRestriction {
            enums: vec!["a".into(), "a".into()],
        }))
        .unwrap_err();
        assert_eq!(err, TypeError::DuplicateLiteral("a".into()));
    }

    #[test]
    fn uint8_partial_and_full() {
        let d = typed(uint8());
        assert_eq!(d.display(), "<uint8>");
        assert!(d.accepts_partial(""));
        assert!(d.accepts_partial("10"));
        assert!(d.accepts_partial("25"));
        assert!(!d.accepts_partial("300"));
        assert!(!d.accepts_partial("-"));
        assert!(!d.accepts_partial("x"));
        assert_eq!(d.parse("100").unwrap(), "100");
        assert_eq!(d.parse("007").unwrap(), "7");
        assert!(matches!(d.parse("256"), Err(ValueError::OutOfRange { .. })));
        assert!(matches!(d.parse("abc"), Err(ValueError::Malformed { .. })));
    }

    #[test]
    fn ranged_prefix_may_grow_into_range() {
        let ty = LeafType::resolve(&TypeDef::Uint16(IntRestriction {
            range: Some((100, 199)),
        }))
        .unwrap();
        let d = typed(ty);
        assert!(d.accepts_partial("1"));
        assert!(d.accepts_partial("15"));
        assert!(!d.accepts_partial("2"));
        assert!(!d.accepts_partial("1999"));
        assert!(d.parse("15").is_err());
    }

    #[test]
    fn signed_partial_accepts_minus() {
        let ty = LeafType::resolve(&TypeDef::Int8(IntRestriction::default())).unwrap();
        let d = typed(ty);
        assert!(d.accepts_partial("-"));
        assert!(d.accepts_partial("-12"));
        assert!(!d.accepts_partial("-129"));
        assert_eq!(d.parse("-128").unwrap(), "-128");
    }

    #[test]
    fn decimal_canonical_form() {
        let ty = LeafType::resolve(&TypeDef::Decimal64(DecimalRestriction {
            fraction_digits: 2,
            range: Some((-10.0, 10.0)),
        }))
        .unwrap();
        let d = typed(ty);
        assert_eq!(d.parse("1.50").unwrap(), "1.5");
        assert_eq!(d.parse("3").unwrap(), "3.0");
        assert_eq!(d.parse("-0.05").unwrap(), "-0.05");
        assert!(d.parse("1.234").is_err());
        assert!(d.parse("11").is_err());
        assert!(d.accepts_partial("9."));
        assert!(!d.accepts_partial("1.234"));
    }

    #[test]
    fn string_length_is_enforced() {
        let ty = LeafType::resolve(&TypeDef::String(StringRestriction {
            length: Some((2, 4)),
        }))
        .unwrap();
        let d = typed(ty);
        assert!(d.accepts_partial("a"));
        assert!(!d.accepts_partial("abcde"));
        assert!(d.parse("a").is_err());
        assert_eq!(d.parse("abc").unwrap(), "abc");
    }

    #[test]
    fn union_flattens_and_dedupes_descriptors() {
        let ty = LeafType::resolve(&TypeDef::Union(UnionMembers {
            types: vec![
                TypeDef::Enumeration(EnumRestriction {
                    enums: vec!["unlimited".into()],
                }),
                TypeDef::Uint32(IntRestriction::default()),
                TypeDef::Uint32(IntRestriction::default()),
            ],
        }))
        .unwrap();
        let displays: Vec<_> = ty
            .descriptors()
            .iter()
            .map(|d| d.display().to_string())
            .collect();
        assert_eq!(displays, vec!["unlimited", "<uint32>"]);
    }

    #[test]
    fn boolean_offers_two_literals_and_empty_none() {
        let b = LeafType::Boolean.descriptors();
        assert_eq!(b.len(), 2);
        assert!(b.iter().all(ValueDescriptor::is_keyword));
        assert!(LeafType::Empty.descriptors().is_empty());
    }
}
