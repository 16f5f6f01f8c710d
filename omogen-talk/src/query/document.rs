//! Files sent through document uploads

use std::path::Path;

use crate::error::Result;

/// A file to upload: its client-side name and its bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

impl DocumentFile {
    pub fn new(file_name: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, keeping its file name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { file_name, contents })
    }

    /// Token referencing the file inside a multipart payload
    pub fn reference(&self) -> String {
        format!("@{}", self.file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_from_path() {
        let mut file = tempfile::Builder::new()
            .prefix("ordonnance")
            .suffix(".pdf")
            .tempfile()
            .unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let document = DocumentFile::from_path(file.path()).await.unwrap();
        assert!(document.file_name.starts_with("ordonnance"));
        assert!(document.file_name.ends_with(".pdf"));
        assert_eq!(document.contents, b"%PDF-1.4");
        assert_eq!(document.reference(), format!("@{}", document.file_name));
    }

    #[tokio::test]
    async fn test_from_missing_path() {
        assert!(DocumentFile::from_path("/nonexistent/scan.pdf").await.is_err());
    }
}
