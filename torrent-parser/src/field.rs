use std::{collections::HashMap, ops::Range};

use bstr::ByteSlice;

use crate::error::TorrentParserError;

/// Deepest list/dict nesting the decoder accepts.
pub const MAX_DEPTH: usize = 64;

/// A decoded bencode value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    String(Vec<u8>),
    Integer(i64),
    List(Vec<Field>),
    Dict(HashMap<String, Field>),
}

impl Field {
    pub fn field_type(&self) -> String {
        match self {
            Field::String(_) => "String".to_string(),
            Field::Integer(_) => "Integer".to_string(),
            Field::List(_) => "List".to_string(),
            Field::Dict(_) => "Dict".to_string(),
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Field::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Byte string decoded as UTF-8, invalid sequences replaced.
    pub fn as_str_lossy(&self) -> Option<String> {
        self.as_bytes()
            .map(|bytes| bytes.to_str_lossy().into_owned())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Field::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field]> {
        match self {
            Field::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&HashMap<String, Field>> {
        match self {
            Field::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` when this field is a dictionary.
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.as_dict()?.get(key)
    }
}

/// Recursive descent decoder over a borrowed buffer.
///
/// Remembers the raw byte range of the top-level `info` value so the info hash
/// can be computed over the exact bytes the torrent file carries.
pub(crate) struct Decoder<'a> {
    buffer: &'a [u8],
    position: usize,
    depth: usize,
    info_span: Option<Range<usize>>,
}

impl<'a> Decoder<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Decoder {
            buffer,
            position: 0,
            depth: 0,
            info_span: None,
        }
    }

    pub fn info_span(&self) -> Option<Range<usize>> {
        self.info_span.clone()
    }

    fn peek(&self) -> Option<u8> {
        self.buffer.get(self.position).copied()
    }

    fn enter(&mut self, kind: &str) -> Result<(), TorrentParserError> {
        if self.depth >= MAX_DEPTH {
            return Err(TorrentParserError::InvalidStructure(format!(
                "{} nested deeper than {} levels",
                kind, MAX_DEPTH
            )));
        }
        self.position += 1;
        self.depth += 1;
        Ok(())
    }

    pub fn decode_field(&mut self) -> Result<Option<Field>, TorrentParserError> {
        let specifier = match self.peek() {
            Some(c) => c,
            None => return Ok(None),
        };

        let field = match specifier {
            b'0'..=b'9' => Field::String(self.decode_string()?),
            b'i' => Field::Integer(self.decode_integer()?),
            b'l' => Field::List(self.decode_list()?),
            b'd' => Field::Dict(self.decode_dict()?),
            other => return Err(TorrentParserError::UnknownSpecifier(other)),
        };
        Ok(Some(field))
    }

    fn decode_string(&mut self) -> Result<Vec<u8>, TorrentParserError> {
        let rest = &self.buffer[self.position..];
        let colon = rest.find_byte(b':').ok_or_else(|| {
            TorrentParserError::InvalidStructure("Expected colon for string".to_string())
        })?;
        let digits = &rest[..colon];
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(TorrentParserError::InvalidStructure(
                "Invalid length for string".to_string(),
            ));
        }
        let length = String::from_utf8(digits.to_vec())?.parse::<usize>()?;

        let start = self.position + colon + 1;
        let end = start
            .checked_add(length)
            .filter(|end| *end <= self.buffer.len())
            .ok_or_else(|| {
                TorrentParserError::InvalidStructure(format!(
                    "Unexpected end for string, expected length {}",
                    length
                ))
            })?;
        self.position = end;
        Ok(self.buffer[start..end].to_vec())
    }

    fn decode_integer(&mut self) -> Result<i64, TorrentParserError> {
        // skip the 'i'
        let start = self.position + 1;
        let length = self.buffer[start..].find_byte(b'e').ok_or_else(|| {
            TorrentParserError::InvalidStructure("Unexpected end for integer".to_string())
        })?;
        let digits = String::from_utf8(self.buffer[start..start + length].to_vec())?;
        self.position = start + length + 1;
        Ok(digits.parse::<i64>()?)
    }

    fn decode_list(&mut self) -> Result<Vec<Field>, TorrentParserError> {
        self.enter("list")?;
        let mut list = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TorrentParserError::InvalidStructure(
                        "Unexpected end for list".to_string(),
                    ))
                }
                Some(b'e') => {
                    self.position += 1;
                    break;
                }
                Some(_) => {
                    let field = self.decode_field()?.ok_or_else(|| {
                        TorrentParserError::InvalidStructure("Unexpected end for list".to_string())
                    })?;
                    list.push(field);
                }
            }
        }
        self.depth -= 1;
        Ok(list)
    }

    fn decode_dict(&mut self) -> Result<HashMap<String, Field>, TorrentParserError> {
        self.enter("dict")?;
        let mut dict = HashMap::new();
        loop {
            match self.peek() {
                None => {
                    return Err(TorrentParserError::InvalidStructure(
                        "Unexpected end for dict".to_string(),
                    ))
                }
                Some(b'e') => {
                    self.position += 1;
                    break;
                }
                Some(_) => {
                    let key = match self.decode_field()? {
                        Some(Field::String(key)) => String::from_utf8(key)?,
                        Some(other) => {
                            return Err(TorrentParserError::FieldTypeError {
                                expected: "String".to_string(),
                                found: other.field_type(),
                            })
                        }
                        None => {
                            return Err(TorrentParserError::InvalidStructure(
                                "Unexpected end for dict".to_string(),
                            ))
                        }
                    };

                    let value_start = self.position;
                    let value = self.decode_field()?.ok_or_else(|| {
                        TorrentParserError::InvalidStructure(
                            "Expected value for dictionary".to_string(),
                        )
                    })?;
                    if self.depth == 1 && key == "info" {
                        self.info_span = Some(value_start..self.position);
                    }
                    dict.insert(key, value);
                }
            }
        }
        self.depth -= 1;
        Ok(dict)
    }
}
