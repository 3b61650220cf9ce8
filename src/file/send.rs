use std::{
    fs::{self, File},
    io::Read,
    path::{Component, Path, PathBuf},
};

use serde_json::{Value, json};

use crate::protocol::{ITEM_TYPE_FILE, Item, ProtocolError};

/// A file on disk offered for transfer.
///
/// `base_path` is the directory the file is presented under on the receiving
/// side, so a directory tree keeps its shape.
#[derive(Debug, Clone)]
pub struct SendFile {
    base_path: PathBuf,
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl SendFile {
    /// Describes the file at `path`, presented under `base_path`.
    ///
    /// # Errors
    /// Returns `ProtocolError::IoError` if the file cannot be inspected.
    pub fn new(base_path: impl Into<PathBuf>, path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let metadata = fs::metadata(path).map_err(|e| ProtocolError::IoError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            base_path: base_path.into(),
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    /// Name of the file as the receiver should create it, `/`-separated.
    pub fn relative_name(&self) -> String {
        let mut parts: Vec<String> = self
            .base_path
            .components()
            .filter_map(|part| match part {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        parts.push(self.file_name.clone());
        parts.join("/")
    }
}

impl Item for SendFile {
    fn item_type(&self) -> &str {
        ITEM_TYPE_FILE
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn meta(&self) -> Result<Value, ProtocolError> {
        Ok(json!({ "filename": self.relative_name() }))
    }

    fn open(&self) -> Result<Option<Box<dyn Read + Send>>, ProtocolError> {
        let file = File::open(&self.path).map_err(|e| ProtocolError::IoError {
            path: self.path.clone(),
            details: e.to_string(),
        })?;

        Ok(Some(Box::new(file)))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::io::Read;

    use tempfile::TempDir;

    use super::*;
    use crate::protocol::ItemHeader;

    #[test]
    fn describes_file_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "twelve bytes").unwrap();

        let item = SendFile::new("docs/work", &path).unwrap();

        assert_eq!(item.item_type(), "file");
        assert_eq!(item.size(), 12);
        assert_eq!(item.meta().unwrap(), json!({ "filename": "docs/work/notes.txt" }));
    }

    #[test]
    fn empty_base_path_uses_bare_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.jpg");
        fs::write(&path, [0u8; 3]).unwrap();

        let item = SendFile::new("", &path).unwrap();

        assert_eq!(item.relative_name(), "photo.jpg");
        let header = ItemHeader::for_item(&item).unwrap();
        assert_eq!(header.item_type, "file");
    }

    #[test]
    fn open_reads_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        fs::write(&path, b"payload").unwrap();
        let item = SendFile::new("", &path).unwrap();

        let mut content = Vec::new();
        item.open()
            .unwrap()
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();

        assert_eq!(content, b"payload");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();

        let result = SendFile::new("", dir.path().join("absent"));

        assert!(matches!(result, Err(ProtocolError::IoError { .. })));
    }
}
