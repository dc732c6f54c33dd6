// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Alexander Minges

//! Upload gate: which declared media types are accepted for photo ingestion.

use std::path::Path;

use anyhow::{Context, Result};

/// Media types accepted at the upload boundary.
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Check a declared media type against the accepted set.
///
/// This gates on the *declared* type only; it never inspects content. A
/// spoofed declaration passes here and fails later when the compressor
/// decodes the actual bytes.
pub fn validate_media_type(declared: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&declared)
}

/// A file handed to ingestion: raw bytes plus the declared media type.
#[derive(Clone, Debug)]
pub struct UploadFile {
    /// Display name, used in error messages.
    pub name: String,
    /// Declared media type, e.g. `image/jpeg`.
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, deriving the declared type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read upload file {:?}", path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let declared_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            declared_type,
            bytes,
        })
    }

    /// Whether the declared type passes the upload gate.
    pub fn is_accepted(&self) -> bool {
        validate_media_type(&self.declared_type)
    }
}
