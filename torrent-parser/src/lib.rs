use std::collections::HashMap;

use error::TorrentParserError;
use field::Decoder;
use model::{Info, InfoFile, TorrentMetadata};
use sha1::{Digest, Sha1};

pub mod error;
mod field;
pub mod model;

pub use field::{Field, MAX_DEPTH};

/// Decodes a single bencoded value. Bytes after the first complete value are ignored.
pub fn decode(bencoded: &[u8]) -> Result<Field, TorrentParserError> {
    Decoder::new(bencoded)
        .decode_field()?
        .ok_or(TorrentParserError::InvalidStructure(
            "Expected field".to_string(),
        ))
}

fn type_error(expected: &str, found: &Field) -> TorrentParserError {
    TorrentParserError::FieldTypeError {
        expected: expected.to_string(),
        found: found.field_type(),
    }
}

fn optional_string(
    dict: &HashMap<String, Field>,
    key: &str,
) -> Result<Option<String>, TorrentParserError> {
    match dict.get(key) {
        Some(Field::String(value)) => Ok(Some(String::from_utf8(value.clone())?)),
        None => Ok(None),
        Some(other) => Err(type_error("String", other)),
    }
}

fn required_string(dict: &HashMap<String, Field>, key: &str) -> Result<String, TorrentParserError> {
    optional_string(dict, key)?
        .ok_or_else(|| TorrentParserError::MissingRequiredField(key.to_string()))
}

fn optional_integer(
    dict: &HashMap<String, Field>,
    key: &str,
) -> Result<Option<i64>, TorrentParserError> {
    match dict.get(key) {
        Some(Field::Integer(value)) => Ok(Some(*value)),
        None => Ok(None),
        Some(other) => Err(type_error("Integer", other)),
    }
}

fn required_integer(dict: &HashMap<String, Field>, key: &str) -> Result<i64, TorrentParserError> {
    optional_integer(dict, key)?
        .ok_or_else(|| TorrentParserError::MissingRequiredField(key.to_string()))
}

fn string_list(list: &[Field]) -> Result<Vec<String>, TorrentParserError> {
    list.iter()
        .map(|field| match field {
            Field::String(value) => Ok(String::from_utf8(value.clone())?),
            other => Err(type_error("String", other)),
        })
        .collect()
}

fn parse_files(files: &[Field]) -> Result<Vec<InfoFile>, TorrentParserError> {
    files
        .iter()
        .map(|file| {
            let file = file.as_dict().ok_or_else(|| type_error("Dict", file))?;
            let path = match file.get("path") {
                Some(Field::List(path)) => string_list(path)?,
                None => return Err(TorrentParserError::MissingRequiredField("path".to_string())),
                Some(other) => return Err(type_error("List", other)),
            };
            Ok(InfoFile {
                length: required_integer(file, "length")?,
                md5sum: optional_string(file, "md5sum")?,
                path,
            })
        })
        .collect()
}

pub fn parse_torrent_metadata(bencoded: &[u8]) -> Result<TorrentMetadata, TorrentParserError> {
    let mut decoder = Decoder::new(bencoded);
    let parsed_structure = decoder.decode_field()?.ok_or(
        TorrentParserError::InvalidStructure("Expected field".to_string()),
    )?;

    // the root element should be a dictionary
    let dict = match parsed_structure {
        Field::Dict(dict) => dict,
        other => return Err(type_error("Dict", &other)),
    };

    // tier order is significant, so the list is kept as written
    let announce_list = match dict.get("announce-list") {
        Some(Field::List(tiers)) => Some(
            tiers
                .iter()
                .map(|tier| match tier {
                    Field::List(urls) => string_list(urls),
                    other => Err(type_error("List", other)),
                })
                .collect::<Result<Vec<Vec<String>>, TorrentParserError>>()?,
        ),
        None => None,
        Some(other) => return Err(type_error("List", other)),
    };

    let info = match dict.get("info") {
        Some(Field::Dict(info)) => info,
        None => return Err(TorrentParserError::MissingRequiredField("info".to_string())),
        Some(other) => return Err(type_error("Dict", other)),
    };

    let info_span = decoder.info_span().ok_or_else(|| {
        TorrentParserError::InvalidStructure("Unable to locate info dictionary".to_string())
    })?;
    let mut info_hash = [0u8; 20];
    info_hash.copy_from_slice(&Sha1::digest(&bencoded[info_span]));

    // divide pieces into 20-byte SHA1 hashes
    let pieces = match info.get("pieces") {
        Some(Field::String(pieces)) => pieces.chunks(20).map(<[u8]>::to_vec).collect(),
        None => {
            return Err(TorrentParserError::MissingRequiredField(
                "pieces".to_string(),
            ))
        }
        Some(other) => return Err(type_error("String", other)),
    };

    let files = match info.get("files") {
        Some(Field::List(files)) => Some(parse_files(files)?),
        None => None,
        Some(other) => return Err(type_error("List", other)),
    };

    Ok(TorrentMetadata {
        announce: optional_string(&dict, "announce")?,
        announce_list,
        comment: optional_string(&dict, "comment")?,
        created_by: optional_string(&dict, "created by")?,
        creation_date: optional_integer(&dict, "creation date")?,
        encoding: optional_string(&dict, "encoding")?,
        info: Info {
            piece_length: required_integer(info, "piece length")?,
            pieces,
            private: optional_integer(info, "private")?.map(|private| private != 0),
            name: required_string(info, "name")?,
            files,
            length: optional_integer(info, "length")?,
            md5sum: optional_string(info, "md5sum")?,
        },
        info_hash,
    })
}

pub fn parse_torrent_file(file_path: &str) -> Result<TorrentMetadata, TorrentParserError> {
    let bencoded = std::fs::read(file_path)?;
    parse_torrent_metadata(&bencoded)
}
