//! Consensus byte serialization of Clarity values.
//!
//! Layout: one type-prefix byte, then the payload. Integers are
//! 16-byte big-endian, variable-length payloads carry a u32 length,
//! tuple keys a u8 length. Tuple keys are written in sorted order.

use std::collections::BTreeMap;

use super::DecodeError;
use super::c32::StandardPrincipal;
use super::value::{ClarityValue, Principal};

/// Maximum nesting depth accepted by the decoder.
pub const MAX_DEPTH: usize = 64;

const TYPE_INT: u8 = 0x00;
const TYPE_UINT: u8 = 0x01;
const TYPE_BUFFER: u8 = 0x02;
const TYPE_TRUE: u8 = 0x03;
const TYPE_FALSE: u8 = 0x04;
const TYPE_PRINCIPAL_STANDARD: u8 = 0x05;
const TYPE_PRINCIPAL_CONTRACT: u8 = 0x06;
const TYPE_RESPONSE_OK: u8 = 0x07;
const TYPE_RESPONSE_ERR: u8 = 0x08;
const TYPE_OPTIONAL_NONE: u8 = 0x09;
const TYPE_OPTIONAL_SOME: u8 = 0x0a;
const TYPE_LIST: u8 = 0x0b;
const TYPE_TUPLE: u8 = 0x0c;
const TYPE_STRING_ASCII: u8 = 0x0d;
const TYPE_STRING_UTF8: u8 = 0x0e;

pub fn serialize_into(value: &ClarityValue, out: &mut Vec<u8>) {
    match value {
        ClarityValue::Int(v) => {
            out.push(TYPE_INT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ClarityValue::UInt(v) => {
            out.push(TYPE_UINT);
            out.extend_from_slice(&v.to_be_bytes());
        }
        ClarityValue::Buffer(bytes) => {
            out.push(TYPE_BUFFER);
            write_len_prefixed(bytes, out);
        }
        ClarityValue::Bool(true) => out.push(TYPE_TRUE),
        ClarityValue::Bool(false) => out.push(TYPE_FALSE),
        ClarityValue::Principal(Principal::Standard(p)) => {
            out.push(TYPE_PRINCIPAL_STANDARD);
            write_standard(p, out);
        }
        ClarityValue::Principal(Principal::Contract { issuer, name }) => {
            out.push(TYPE_PRINCIPAL_CONTRACT);
            write_standard(issuer, out);
            write_short_name(name, out);
        }
        ClarityValue::ResponseOk(inner) => {
            out.push(TYPE_RESPONSE_OK);
            serialize_into(inner, out);
        }
        ClarityValue::ResponseErr(inner) => {
            out.push(TYPE_RESPONSE_ERR);
            serialize_into(inner, out);
        }
        ClarityValue::OptionalNone => out.push(TYPE_OPTIONAL_NONE),
        ClarityValue::OptionalSome(inner) => {
            out.push(TYPE_OPTIONAL_SOME);
            serialize_into(inner, out);
        }
        ClarityValue::List(items) => {
            out.push(TYPE_LIST);
            write_u32(items.len(), out);
            for item in items {
                serialize_into(item, out);
            }
        }
        ClarityValue::Tuple(fields) => {
            out.push(TYPE_TUPLE);
            write_u32(fields.len(), out);
            for (name, field) in fields {
                write_short_name(name, out);
                serialize_into(field, out);
            }
        }
        ClarityValue::StringAscii(s) => {
            out.push(TYPE_STRING_ASCII);
            write_len_prefixed(s.as_bytes(), out);
        }
        ClarityValue::StringUtf8(s) => {
            out.push(TYPE_STRING_UTF8);
            write_len_prefixed(s.as_bytes(), out);
        }
    }
}

/// Decode exactly one value from `bytes`; trailing input is an error.
pub fn deserialize(bytes: &[u8]) -> Result<ClarityValue, DecodeError> {
    let mut reader = Reader { bytes, pos: 0 };
    let value = reader.value(0)?;
    let rest = bytes.len() - reader.pos;
    if rest > 0 {
        return Err(DecodeError::TrailingBytes(rest));
    }
    Ok(value)
}

#[allow(clippy::cast_possible_truncation)]
fn write_u32(len: usize, out: &mut Vec<u8>) {
    out.extend_from_slice(&(len as u32).to_be_bytes());
}

fn write_len_prefixed(bytes: &[u8], out: &mut Vec<u8>) {
    write_u32(bytes.len(), out);
    out.extend_from_slice(bytes);
}

#[allow(clippy::cast_possible_truncation)]
fn write_short_name(name: &str, out: &mut Vec<u8>) {
    // Clarity names are at most 128 bytes.
    out.push(name.len() as u8);
    out.extend_from_slice(name.as_bytes());
}

fn write_standard(p: &StandardPrincipal, out: &mut Vec<u8>) {
    out.push(p.version);
    out.extend_from_slice(&p.hash160);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<usize, DecodeError> {
        let raw = self.take(4)?;
        let len = u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
        Ok(len as usize)
    }

    fn array16(&mut self) -> Result<[u8; 16], DecodeError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn standard(&mut self) -> Result<StandardPrincipal, DecodeError> {
        let version = self.u8()?;
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        StandardPrincipal::checked(version, hash160)
    }

    fn short_name(&mut self) -> Result<String, DecodeError> {
        let len = usize::from(self.u8()?);
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8("ascii name"))
    }

    fn value(&mut self, depth: usize) -> Result<ClarityValue, DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::DepthExceeded(MAX_DEPTH));
        }

        let offset = self.pos;
        let prefix = self.u8()?;
        let value = match prefix {
            TYPE_INT => ClarityValue::Int(i128::from_be_bytes(self.array16()?)),
            TYPE_UINT => ClarityValue::UInt(u128::from_be_bytes(self.array16()?)),
            TYPE_BUFFER => {
                let len = self.u32()?;
                ClarityValue::Buffer(self.take(len)?.to_vec())
            }
            TYPE_TRUE => ClarityValue::Bool(true),
            TYPE_FALSE => ClarityValue::Bool(false),
            TYPE_PRINCIPAL_STANDARD => ClarityValue::Principal(Principal::Standard(self.standard()?)),
            TYPE_PRINCIPAL_CONTRACT => {
                let issuer = self.standard()?;
                let name = self.short_name()?;
                ClarityValue::Principal(Principal::Contract { issuer, name })
            }
            TYPE_RESPONSE_OK => ClarityValue::ResponseOk(Box::new(self.value(depth + 1)?)),
            TYPE_RESPONSE_ERR => ClarityValue::ResponseErr(Box::new(self.value(depth + 1)?)),
            TYPE_OPTIONAL_NONE => ClarityValue::OptionalNone,
            TYPE_OPTIONAL_SOME => ClarityValue::OptionalSome(Box::new(self.value(depth + 1)?)),
            TYPE_LIST => {
                let len = self.u32()?;
                // Every element needs at least one byte.
                let mut items = Vec::with_capacity(len.min(self.bytes.len() - self.pos));
                for _ in 0..len {
                    items.push(self.value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            TYPE_TUPLE => {
                let len = self.u32()?;
                let mut fields = BTreeMap::new();
                for _ in 0..len {
                    let name = self.short_name()?;
                    let field = self.value(depth + 1)?;
                    fields.insert(name, field);
                }
                ClarityValue::Tuple(fields)
            }
            TYPE_STRING_ASCII => {
                let len = self.u32()?;
                let raw = self.take(len)?;
                if !raw.is_ascii() {
                    return Err(DecodeError::InvalidUtf8("ascii"));
                }
                ClarityValue::StringAscii(String::from_utf8_lossy(raw).into_owned())
            }
            TYPE_STRING_UTF8 => {
                let len = self.u32()?;
                let raw = self.take(len)?;
                let s = String::from_utf8(raw.to_vec()).map_err(|_| DecodeError::InvalidUtf8("utf-8"))?;
                ClarityValue::StringUtf8(s)
            }
            other => return Err(DecodeError::UnknownTypePrefix { prefix: other, offset }),
        };
        Ok(value)
    }
}
