//! Self-describing binary codec for [`TypedValue`].
//!
//! # Layout
//!
//! ```text
//! type    := id child*            pre-order template ids, one byte each
//!          | 0xFF                 unset child slot
//! slot    := 0x00                 null
//!          | 0x01 payload
//! payload := big-endian scalar | u32 len + UTF-8 | 16-byte entity
//!          | 3 x f64 position  | container
//! ```
//!
//! A container whose declared child slot is unset writes its own child type
//! inline before its contents. Elements whose type is still unknown after
//! that carry their own type in front of the payload. The stream is
//! therefore decodable without any external schema.

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    ensure_sufficient_stack, EntityRef, EntryValue, IteratorValue, ListValue, MapValue, Position,
    Tag, TypeRegistry, TypedValue, Value, VariableType,
};


/// Marker byte for an unset child type slot.
pub const UNSET_CHILD: u8 = 0xFF;

const NULL: u8 = 0;
const PRESENT: u8 = 1;

/// Failure to encode or decode a typed value.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEof { offset: usize },

    #[error("unknown template id {id} at byte {offset}")]
    UnknownTemplate { id: u8, offset: usize },

    #[error("top-level type is missing")]
    MissingType,

    #[error("invalid presence marker {marker} at byte {offset}")]
    InvalidPresence { marker: u8, offset: usize },

    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },

    #[error("value of kind {found} does not match declared type {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("container too large to encode: {len} elements")]
    TooLarge { len: usize },
}

/// Encode a typed value into a self-describing byte stream.
pub fn encode(typed: &TypedValue) -> Result<Vec<u8>, CodecError> {
    let mut writer = Writer { out: Vec::new() };
    writer.write_type(Some(&typed.ty));
    writer.write_slot(Some(&typed.ty), typed.value.as_ref())?;
    tracing::trace!(ty = %typed.ty, len = writer.out.len(), "encoded typed value");
    Ok(writer.out)
}

/// Decode a byte stream produced by [`encode`].
pub fn decode(bytes: &[u8], registry: &TypeRegistry) -> Result<TypedValue, CodecError> {
    let mut reader = Reader {
        bytes,
        pos: 0,
        registry,
    };
    let ty = reader.read_type()?.ok_or(CodecError::MissingType)?;
    let value = reader.read_slot(Some(&ty))?;
    let remaining = bytes.len() - reader.pos;
    if remaining > 0 {
        return Err(CodecError::TrailingBytes { count: remaining });
    }
    Ok(TypedValue { ty, value })
}

// Encoding

struct Writer {
    out: Vec<u8>,
}

impl Writer {
    fn write_type(&mut self, ty: Option<&VariableType>) {
        match ty {
            None => self.out.push(UNSET_CHILD),
            Some(ty) => {
                self.out.push(ty.tag().id());
                for child in ty.children() {
                    self.write_type(child.as_ref());
                }
            }
        }
    }

    fn write_len(&mut self, len: usize) -> Result<(), CodecError> {
        let len32 = u32::try_from(len).map_err(|_| CodecError::TooLarge { len })?;
        self.out.extend_from_slice(&len32.to_be_bytes());
        Ok(())
    }

    fn write_slot(
        &mut self,
        declared: Option<&VariableType>,
        value: Option<&Value>,
    ) -> Result<(), CodecError> {
        match value {
            None => {
                self.out.push(NULL);
                Ok(())
            }
            Some(value) => {
                self.out.push(PRESENT);
                self.write_typed(declared, value)
            }
        }
    }

    /// Write a non-null value, prefixing its type when none is declared.
    fn write_typed(
        &mut self,
        declared: Option<&VariableType>,
        value: &Value,
    ) -> Result<(), CodecError> {
        match declared {
            Some(ty) => self.write_payload(ty, value),
            None => {
                let own = value.variable_type();
                self.write_type(Some(&own));
                self.write_payload(&own, value)
            }
        }
    }

    /// Write the child type the contents use: the declared one, else the
    /// container's own (written inline).
    fn resolve_child<'t>(
        &mut self,
        declared: Option<&'t VariableType>,
        own: Option<&'t VariableType>,
    ) -> Option<&'t VariableType> {
        match declared {
            Some(child) => Some(child),
            None => {
                self.write_type(own);
                own
            }
        }
    }

    fn write_payload(&mut self, ty: &VariableType, value: &Value) -> Result<(), CodecError> {
        ensure_sufficient_stack(|| self.write_payload_inner(ty, value))
    }

    fn write_payload_inner(&mut self, ty: &VariableType, value: &Value) -> Result<(), CodecError> {
        if ty.tag() != value.tag() {
            return Err(CodecError::TypeMismatch {
                expected: ty.to_string(),
                found: value.type_name().to_owned(),
            });
        }
        match value {
            Value::Byte(n) => self.out.extend_from_slice(&n.to_be_bytes()),
            Value::Short(n) => self.out.extend_from_slice(&n.to_be_bytes()),
            Value::Int(n) => self.out.extend_from_slice(&n.to_be_bytes()),
            Value::Long(n) => self.out.extend_from_slice(&n.to_be_bytes()),
            Value::Float(f) => self.out.extend_from_slice(&f.to_be_bytes()),
            Value::Double(f) => self.out.extend_from_slice(&f.to_be_bytes()),
            Value::Str(s) => {
                self.write_len(s.len())?;
                self.out.extend_from_slice(s.as_bytes());
            }
            Value::Entity(entity) => self.out.extend_from_slice(&entity.bits().to_be_bytes()),
            Value::Position(p) => {
                for coord in [p.x, p.y, p.z] {
                    self.out.extend_from_slice(&coord.to_be_bytes());
                }
            }
            Value::List(ListValue { elem_type, items })
            | Value::Iterator(IteratorValue { elem_type, items }) => {
                let elem = self.resolve_child(ty.child(0), elem_type.as_ref());
                self.write_len(items.len())?;
                for item in items {
                    self.write_slot(elem, item.as_ref())?;
                }
            }
            Value::Map(map) => {
                let key_type = self.resolve_child(ty.child(0), map.key_type.as_ref());
                let value_type = self.resolve_child(ty.child(1), map.value_type.as_ref());
                self.write_len(map.len())?;
                for (key, value) in &map.entries {
                    self.write_typed(key_type, key)?;
                    self.write_slot(value_type, value.as_ref())?;
                }
            }
            Value::Entry(entry) => {
                let key_type = self.resolve_child(ty.child(0), entry.key_type.as_ref());
                let value_type = self.resolve_child(ty.child(1), entry.value_type.as_ref());
                self.write_slot(key_type, entry.key.as_ref())?;
                self.write_slot(value_type, entry.value.as_ref())?;
            }
        }
        Ok(())
    }
}

// Decoding

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
    registry: &'a TypeRegistry,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(CodecError::UnexpectedEof { offset: self.pos })?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        self.pos = end;
        Ok(out)
    }

    fn take_slice(&mut self, len: usize) -> Result<&[u8], CodecError> {
        let start = self.pos;
        let chunk = start
            .checked_add(len)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or(CodecError::UnexpectedEof { offset: start })?;
        self.pos += len;
        Ok(chunk)
    }

    fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.take::<1>().map(|[b]| b)
    }

    fn read_len(&mut self) -> Result<usize, CodecError> {
        self.take::<4>().map(|b| u32::from_be_bytes(b) as usize)
    }

    fn read_type(&mut self) -> Result<Option<VariableType>, CodecError> {
        ensure_sufficient_stack(|| self.read_type_inner())
    }

    fn read_type_inner(&mut self) -> Result<Option<VariableType>, CodecError> {
        let offset = self.pos;
        let id = self.read_u8()?;
        if id == UNSET_CHILD {
            return Ok(None);
        }
        let template = self
            .registry
            .from_id(id)
            .ok_or(CodecError::UnknownTemplate { id, offset })?;
        let mut children = Vec::with_capacity(template.child_count);
        for _ in 0..template.child_count {
            children.push(self.read_type()?);
        }
        template
            .instantiate(children)
            .map(Some)
            .ok_or(CodecError::UnknownTemplate { id, offset })
    }

    fn read_slot(
        &mut self,
        declared: Option<&VariableType>,
    ) -> Result<Option<Value>, CodecError> {
        let offset = self.pos;
        match self.read_u8()? {
            NULL => Ok(None),
            PRESENT => self.read_typed(declared).map(Some),
            marker => Err(CodecError::InvalidPresence { marker, offset }),
        }
    }

    fn read_typed(&mut self, declared: Option<&VariableType>) -> Result<Value, CodecError> {
        match declared {
            Some(ty) => self.read_payload(ty),
            None => {
                let own = self.read_type()?.ok_or(CodecError::MissingType)?;
                self.read_payload(&own)
            }
        }
    }

    fn resolve_child(
        &mut self,
        declared: Option<&VariableType>,
    ) -> Result<Option<VariableType>, CodecError> {
        match declared {
            Some(child) => Ok(Some(child.clone())),
            None => self.read_type(),
        }
    }

    fn read_payload(&mut self, ty: &VariableType) -> Result<Value, CodecError> {
        ensure_sufficient_stack(|| self.read_payload_inner(ty))
    }

    fn read_payload_inner(&mut self, ty: &VariableType) -> Result<Value, CodecError> {
        Ok(match ty.tag() {
            Tag::Byte => Value::Byte(i8::from_be_bytes(self.take()?)),
            Tag::Short => Value::Short(i16::from_be_bytes(self.take()?)),
            Tag::Int => Value::Int(i32::from_be_bytes(self.take()?)),
            Tag::Long => Value::Long(i64::from_be_bytes(self.take()?)),
            Tag::Float => Value::Float(f32::from_be_bytes(self.take()?)),
            Tag::Double => Value::Double(f64::from_be_bytes(self.take()?)),
            Tag::Str => {
                let len = self.read_len()?;
                let offset = self.pos;
                let bytes = self.take_slice(len)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| CodecError::InvalidUtf8 { offset })?;
                Value::Str(text.to_owned())
            }
            Tag::Entity => Value::Entity(EntityRef::new(u128::from_be_bytes(self.take()?))),
            Tag::Position => {
                let x = f64::from_be_bytes(self.take()?);
                let y = f64::from_be_bytes(self.take()?);
                let z = f64::from_be_bytes(self.take()?);
                Value::Position(Position::new(x, y, z))
            }
            Tag::List | Tag::Iterator => {
                let elem_type = self.resolve_child(ty.child(0))?;
                let len = self.read_len()?;
                let mut items = Vec::with_capacity(len.min(self.bytes.len()));
                for _ in 0..len {
                    items.push(self.read_slot(elem_type.as_ref())?);
                }
                if ty.tag() == Tag::List {
                    Value::List(ListValue::new(elem_type, items))
                } else {
                    Value::Iterator(IteratorValue::new(elem_type, items))
                }
            }
            Tag::Map => {
                let key_type = self.resolve_child(ty.child(0))?;
                let value_type = self.resolve_child(ty.child(1))?;
                let len = self.read_len()?;
                let mut entries = IndexMap::with_capacity(len.min(self.bytes.len()));
                for _ in 0..len {
                    let key = self.read_typed(key_type.as_ref())?;
                    let value = self.read_slot(value_type.as_ref())?;
                    entries.insert(key, value);
                }
                Value::Map(MapValue::new(key_type, value_type, entries))
            }
            Tag::Entry => {
                let key_type = self.resolve_child(ty.child(0))?;
                let value_type = self.resolve_child(ty.child(1))?;
                let key = self.read_slot(key_type.as_ref())?;
                let value = self.read_slot(value_type.as_ref())?;
                Value::Entry(Box::new(EntryValue::new(key_type, value_type, key, value)))
            }
        })
    }
}
