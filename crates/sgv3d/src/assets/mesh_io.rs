//! `.vmesh` vertex files
//!
//! ```text
//! # optional comment lines
//! 1024
//! <1024 raw Vertex records>
//! ```
//!
//! Records are written in native byte order, so files are only portable
//! between machines of the same endianness.

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::assets::AssetError;
use crate::render::Vertex;

/// Serialize `vertices` with an optional comment header
pub fn encode_vmesh(out: &mut impl Write, vertices: &[Vertex], comment: &str) -> Result<(), AssetError> {
    for line in comment.lines() {
        if line.starts_with('#') {
            writeln!(out, "{line}")?;
        } else {
            writeln!(out, "# {line}")?;
        }
    }
    writeln!(out, "{}", vertices.len())?;
    out.write_all(bytemuck::cast_slice(vertices))?;
    Ok(())
}

/// Parse the contents of a `.vmesh` file
pub fn decode_vmesh(bytes: &[u8]) -> Result<Vec<Vertex>, AssetError> {
    let mut rest = bytes;
    let count = loop {
        let Some(newline) = rest.iter().position(|&b| b == b'\n') else {
            return Err(AssetError::MalformedHeader("missing vertex count line".to_string()));
        };
        let line = &rest[..newline];
        rest = &rest[newline + 1..];
        if line.first() == Some(&b'#') {
            continue;
        }
        let text = std::str::from_utf8(line)
            .map_err(|_| AssetError::MalformedHeader("vertex count is not text".to_string()))?;
        let text = text.trim();
        break text
            .parse::<usize>()
            .map_err(|_| AssetError::MalformedHeader(format!("invalid vertex count {text:?}")))?;
    };

    let record = std::mem::size_of::<Vertex>();
    let expected = count
        .checked_mul(record)
        .ok_or_else(|| AssetError::MalformedHeader(format!("vertex count {count} too large")))?;
    if rest.len() < expected {
        return Err(AssetError::Truncated {
            expected: count,
            found: rest.len() / record,
        });
    }
    if rest.len() > expected {
        log::warn!("Ignoring {} trailing bytes after {count} vertices", rest.len() - expected);
    }

    Ok(rest[..expected]
        .chunks_exact(record)
        .map(bytemuck::pod_read_unaligned::<Vertex>)
        .collect())
}

/// Write `vertices` to a `.vmesh` file, replacing it
pub fn write_vmesh(path: impl AsRef<Path>, vertices: &[Vertex], comment: &str) -> Result<(), AssetError> {
    let path = path.as_ref();
    let mut bytes = Vec::with_capacity(vertices.len() * std::mem::size_of::<Vertex>() + 64);
    encode_vmesh(&mut bytes, vertices, comment)?;
    fs::write(path, bytes)?;
    log::info!("Wrote {} vertices to {}", vertices.len(), path.display());
    Ok(())
}

/// Read every vertex from a `.vmesh` file
pub fn read_vmesh(path: impl AsRef<Path>) -> Result<Vec<Vertex>, AssetError> {
    let path = path.as_ref();
    let vertices = decode_vmesh(&fs::read(path)?)?;
    log::debug!("Read {} vertices from {}", vertices.len(), path.display());
    Ok(vertices)
}
