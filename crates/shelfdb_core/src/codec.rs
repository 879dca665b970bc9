//! Binary image codec for live database handles.
//!
//! A checkpoint image is the engine's own database-file format, produced
//! and consumed through the online backup API. Serialization copies the
//! live handle into a temporary file and reads it back as bytes;
//! deserialization writes the bytes to a temporary file and copies it into
//! a fresh in-memory handle. The codec has no state and no side effects
//! beyond engine memory.

use crate::error::{CoreError, CoreResult};
use rusqlite::{backup, Connection, DatabaseName};
use std::io::Write;
use tempfile::NamedTempFile;

/// The 16-byte header every non-empty SQLite database file starts with.
const IMAGE_MAGIC: &[u8; 16] = b"SQLite format 3\0";

/// Serializes a live handle into a binary image.
///
/// The image of a handle with no schema and no data depends on the
/// engine version: current versions emit a single header page, older
/// ones zero bytes. [`deserialize_image`] accepts both forms.
///
/// # Errors
///
/// Returns an error if the backup copy or the temporary file I/O fails.
pub fn serialize_image(conn: &Connection) -> CoreResult<Vec<u8>> {
    let tmp = NamedTempFile::new()?;
    conn.backup(DatabaseName::Main, tmp.path(), None)?;
    Ok(std::fs::read(tmp.path())?)
}

/// Deserializes a binary image into a fresh live handle.
///
/// # Errors
///
/// Returns [`CoreError::CorruptImage`] when the bytes are not a
/// well-formed engine image (foreign format or truncated). A corrupt
/// image never silently produces an empty database.
pub fn deserialize_image(image: &[u8]) -> CoreResult<Connection> {
    if image.is_empty() {
        return Ok(Connection::open_in_memory()?);
    }
    if image.len() < IMAGE_MAGIC.len() || &image[..IMAGE_MAGIC.len()] != IMAGE_MAGIC {
        return Err(CoreError::corrupt_image("missing SQLite file header"));
    }

    let mut tmp = NamedTempFile::new()?;
    tmp.write_all(image)?;
    tmp.flush()?;

    let mut conn = Connection::open_in_memory()?;
    conn.restore(
        DatabaseName::Main,
        tmp.path(),
        None::<fn(backup::Progress)>,
    )
    .map_err(|e| CoreError::corrupt_image(format!("image does not restore: {e}")))?;
    Ok(conn)
}
