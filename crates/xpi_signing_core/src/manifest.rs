use std::borrow::Cow;
use std::io::{Read, Seek};

use zip::result::ZipError;
use zip::ZipArchive;

/// Manifest file names in lookup priority order: legacy `install.rdf` wins
/// over a WebExtension `manifest.json` when a package ships both.
pub const MANIFEST_CANDIDATES: [&str; 2] = ["install.rdf", "manifest.json"];

#[derive(Debug)]
pub enum ArchiveError {
    Open(ZipError),
    ListEntry { index: usize, source: ZipError },
    ReadEntry { name: String, source: ZipError },
    Io { name: String, source: std::io::Error },
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(source) => write!(f, "failed to open archive: {source}"),
            Self::ListEntry { index, source } => {
                write!(f, "failed to list archive entry #{index}: {source}")
            }
            Self::ReadEntry { name, source } => {
                write!(f, "failed to locate archive entry '{name}': {source}")
            }
            Self::Io { name, source } => {
                write!(f, "failed to read archive entry '{name}': {source}")
            }
        }
    }
}

impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(source)
            | Self::ListEntry { source, .. }
            | Self::ReadEntry { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: &'static str,
    pub contents: Vec<u8>,
}

impl Manifest {
    pub fn contents_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

pub fn resolve_manifest_name<S: AsRef<str>>(entry_names: &[S]) -> Option<&'static str> {
    MANIFEST_CANDIDATES.into_iter().find(|candidate| {
        entry_names
            .iter()
            .any(|name| name.as_ref() == *candidate)
    })
}

/// Read-only view over a zip-packaged extension.
pub struct XpiArchive<R> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> XpiArchive<R> {
    pub fn open(reader: R) -> Result<Self, ArchiveError> {
        let zip = ZipArchive::new(reader).map_err(ArchiveError::Open)?;
        Ok(Self { zip })
    }

    /// Entry names in central directory order.
    pub fn entry_names(&mut self) -> Result<Vec<String>, ArchiveError> {
        (0..self.zip.len())
            .map(|index| {
                self.zip
                    .by_index_raw(index)
                    .map(|entry| entry.name().to_string())
                    .map_err(|source| ArchiveError::ListEntry { index, source })
            })
            .collect()
    }

    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let mut entry = self
            .zip
            .by_name(name)
            .map_err(|source| ArchiveError::ReadEntry {
                name: name.to_string(),
                source,
            })?;
        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|source| ArchiveError::Io {
                name: name.to_string(),
                source,
            })?;
        Ok(contents)
    }

    /// Returns `None` when neither candidate manifest is packaged.
    pub fn find_manifest(&mut self) -> Result<Option<Manifest>, ArchiveError> {
        let Some(name) = resolve_manifest_name(&self.entry_names()?) else {
            return Ok(None);
        };
        let contents = self.read_entry(name)?;
        Ok(Some(Manifest { name, contents }))
    }
}
