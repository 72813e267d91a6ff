use std::path::Path;

use crate::error::{GcnError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
}

impl DocumentKind {
    /// Classifies by file suffix only; the content is never sniffed.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
        }
    }
}

/// One uploaded certificate: raw bytes plus the name it was uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    content: Vec<u8>,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn kind(&self) -> Result<DocumentKind> {
        DocumentKind::from_file_name(&self.name).ok_or_else(|| {
            GcnError::UnsupportedDocument(format!(
                "{}: only .pdf and .txt files are accepted",
                self.name
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(DocumentKind::from_file_name("gcn.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("GCN.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("notes.txt"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_file_name("scan.jpg"), None);
        assert_eq!(DocumentKind::from_file_name("pdf"), None);
    }

    #[test]
    fn test_unsupported_document_is_unclassified() {
        let doc = Document::new("scan.docx", b"..".to_vec());
        let err = doc.kind().unwrap_err();
        assert!(matches!(err, GcnError::UnsupportedDocument(_)));
        assert!(err.to_string().contains("scan.docx"));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(DocumentKind::Pdf.mime_type(), "application/pdf");
        assert_eq!(DocumentKind::Text.mime_type(), "text/plain");
    }
}
