//! Literal scanners: numbers, strings and character literals.
//!
//! # Numbers
//!
//! - Radix: decimal, hex (`0x`), octal (leading `0`), binary (`0b`)
//! - A radix point is allowed in decimal and hex and makes a double;
//!   `.` followed by `.` is a range operator, never a radix point
//! - Suffixes `L`, `B`, `S`, `F` select long, byte, short and float; in hex
//!   only `L` applies since `B` and `F` are digits
//! - Unsuffixed integers are `int`
//! - Decimal literals must fit the signed range of their kind; the other
//!   radices may use the full unsigned width and wrap
//!
//! # Strings
//!
//! Double-quoted, with escapes `\t \b \n \r \f \\ \" \' \uXXXX`. Single
//! quotes hold one UTF-16 code unit and produce a `short`.

use imv_types::Value;

use crate::cursor::Cursor;
use crate::error::{CompileError, CompileErrorKind, CompileResult};


/// Integer kind selected by a suffix.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum IntKind {
    Byte,
    Short,
    Int,
    Long,
}

impl IntKind {
    const fn bits(self) -> u32 {
        match self {
            IntKind::Byte => 8,
            IntKind::Short => 16,
            IntKind::Int => 32,
            IntKind::Long => 64,
        }
    }

    /// Build a value from a two's-complement bit pattern of this width.
    fn wrap(self, bits: u64) -> Value {
        match self {
            IntKind::Byte => Value::Byte(bits as u8 as i8),
            IntKind::Short => Value::Short(bits as u16 as i16),
            IntKind::Int => Value::Int(bits as u32 as i32),
            IntKind::Long => Value::Long(bits as i64),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Suffix {
    Int(IntKind),
    Float,
}

/// Scan a number, with an optional leading sign.
pub(crate) fn scan_number(cursor: &mut Cursor<'_>) -> CompileResult<Value> {
    let start = cursor.pos();
    let negative = cursor.eat('-');
    if !negative {
        cursor.eat('+');
    }

    let radix = scan_radix_prefix(cursor);
    let mut int_digits = String::new();
    let mut frac_digits: Option<String> = None;
    loop {
        match cursor.current() {
            Some(c) if c.is_digit(radix) => {
                frac_digits.as_mut().unwrap_or(&mut int_digits).push(c);
                cursor.advance();
            }
            Some('.') if cursor.peek() != Some('.') && matches!(radix, 10 | 16) => {
                if frac_digits.is_some() {
                    return Err(CompileError::new(
                        CompileErrorKind::MultipleRadixPoints,
                        cursor.pos(),
                    ));
                }
                frac_digits = Some(String::new());
                cursor.advance();
            }
            _ => break,
        }
    }
    if int_digits.is_empty() && frac_digits.as_ref().map_or(true, String::is_empty) {
        return Err(CompileError::new(CompileErrorKind::EmptyNumeral, cursor.pos()));
    }

    let suffix_pos = cursor.pos();
    let suffix = scan_suffix(cursor, radix);
    let out_of_range = || {
        CompileError::new(
            CompileErrorKind::NumberOutOfRange {
                literal: cursor.slice_from(start).to_owned(),
            },
            start,
        )
    };

    if let Some(frac) = frac_digits {
        let magnitude = if radix == 10 {
            format!("{int_digits}.{frac}0")
                .parse::<f64>()
                .map_err(|_| out_of_range())?
        } else {
            fold_float(&int_digits, radix) + fold_fraction(&frac, radix)
        };
        let value = if negative { -magnitude } else { magnitude };
        return match suffix {
            None => Ok(Value::Double(value)),
            Some(Suffix::Float) => Ok(Value::Float(value as f32)),
            Some(Suffix::Int(_)) => Err(CompileError::new(
                CompileErrorKind::InvalidSuffix {
                    suffix: cursor.slice_from(suffix_pos).chars().next().unwrap_or('?'),
                },
                suffix_pos,
            )),
        };
    }

    let kind = match suffix {
        Some(Suffix::Float) => {
            let magnitude = fold_float(&int_digits, radix);
            let value = if negative { -magnitude } else { magnitude };
            return Ok(Value::Float(value as f32));
        }
        Some(Suffix::Int(kind)) => kind,
        None => IntKind::Int,
    };

    let magnitude = u64::from_str_radix(&int_digits, radix).map_err(|_| out_of_range())?;
    let bits = kind.bits();
    if radix == 10 {
        let limit = 1u128 << (bits - 1);
        let magnitude = u128::from(magnitude);
        let fits = if negative {
            magnitude <= limit
        } else {
            magnitude < limit
        };
        if !fits {
            return Err(out_of_range());
        }
    } else if bits < 64 && magnitude >> bits != 0 {
        return Err(out_of_range());
    }
    let pattern = if negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    Ok(kind.wrap(pattern))
}

fn scan_radix_prefix(cursor: &mut Cursor<'_>) -> u32 {
    if cursor.current() != Some('0') {
        return 10;
    }
    match cursor.peek() {
        Some('x' | 'X') => {
            cursor.advance_bytes(2);
            16
        }
        // `0b` is binary only when a binary digit follows; `0B` alone is a byte.
        Some('b' | 'B') if cursor.peek_nth(2).is_some_and(|c| c == '0' || c == '1') => {
            cursor.advance_bytes(2);
            2
        }
        Some(c) if c.is_ascii_digit() => 8,
        _ => 10,
    }
}

fn scan_suffix(cursor: &mut Cursor<'_>, radix: u32) -> Option<Suffix> {
    let suffix = match cursor.current()?.to_ascii_uppercase() {
        'L' => Suffix::Int(IntKind::Long),
        'B' if radix != 16 => Suffix::Int(IntKind::Byte),
        'S' if radix != 16 => Suffix::Int(IntKind::Short),
        'F' if radix != 16 => Suffix::Float,
        _ => return None,
    };
    cursor.advance();
    Some(suffix)
}

fn fold_float(digits: &str, radix: u32) -> f64 {
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * f64::from(radix) + f64::from(d))
}

fn fold_fraction(digits: &str, radix: u32) -> f64 {
    let base = f64::from(radix);
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold((0.0, 1.0 / base), |(acc, scale), d| {
            (acc + f64::from(d) * scale, scale / base)
        })
        .0
}

/// Scan a double-quoted string literal.
pub(crate) fn scan_string(cursor: &mut Cursor<'_>) -> CompileResult<Value> {
    let start = cursor.pos();
    cursor.advance();
    let mut units: Vec<u16> = Vec::new();
    loop {
        match cursor.current() {
            None => {
                return Err(CompileError::new(
                    CompileErrorKind::UnterminatedString,
                    start,
                ))
            }
            Some('"') => {
                cursor.advance();
                break;
            }
            Some('\\') => units.push(scan_escape(cursor)?),
            Some(c) => {
                let mut buf = [0u16; 2];
                units.extend_from_slice(c.encode_utf16(&mut buf));
                cursor.advance();
            }
        }
    }
    String::from_utf16(&units).map(Value::Str).map_err(|_| {
        CompileError::new(
            CompileErrorKind::InvalidEscape {
                escape: "u".to_owned(),
            },
            start,
        )
    })
}

/// Scan a single-quoted character literal into a `short`.
pub(crate) fn scan_char(cursor: &mut Cursor<'_>) -> CompileResult<Value> {
    let start = cursor.pos();
    cursor.advance();
    let unit = match cursor.current() {
        Some('\\') => scan_escape(cursor)?,
        Some(c) if c != '\'' && c.len_utf16() == 1 => {
            cursor.advance();
            let mut buf = [0u16; 1];
            c.encode_utf16(&mut buf);
            buf[0]
        }
        _ => {
            return Err(CompileError::new(
                CompileErrorKind::InvalidCharLiteral,
                start,
            ))
        }
    };
    if !cursor.eat('\'') {
        return Err(CompileError::new(
            CompileErrorKind::InvalidCharLiteral,
            start,
        ));
    }
    Ok(Value::Short(unit as i16))
}

/// Scan a backslash escape; returns one UTF-16 code unit.
fn scan_escape(cursor: &mut Cursor<'_>) -> CompileResult<u16> {
    let start = cursor.pos();
    cursor.advance();
    let invalid =
        |escape: String| CompileError::new(CompileErrorKind::InvalidEscape { escape }, start);
    let c = cursor
        .current()
        .ok_or_else(|| invalid(String::new()))?;
    cursor.advance();
    let unit = match c {
        't' => u16::from(b'\t'),
        'b' => 0x08,
        'n' => u16::from(b'\n'),
        'r' => u16::from(b'\r'),
        'f' => 0x0C,
        '\\' => u16::from(b'\\'),
        '"' => u16::from(b'"'),
        '\'' => u16::from(b'\''),
        'u' => {
            let hex = cursor.rest().get(..4).unwrap_or("");
            if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid(format!("u{hex}")));
            }
            cursor.advance_bytes(4);
            u16::from_str_radix(hex, 16).map_err(|_| invalid(format!("u{hex}")))?
        }
        other => return Err(invalid(other.to_string())),
    };
    Ok(unit)
}
