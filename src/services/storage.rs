use anyhow::{Context, Result};
use std::path::PathBuf;
use uuid::Uuid;

/// Reference to a stored file, attached to the owning record after a
/// successful upload.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub url: String,
    pub name: String,
    pub size: u64,
}

/// Filesystem-backed blob store. Uploads land under
/// `<root>/invoices/<user>/<unique>_<name>`; a failed upload never blocks
/// the record save that triggered it.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        FileStore { root }
    }

    pub async fn store(&self, user_id: &str, file_name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let dir = self.root.join("invoices").join(user_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create upload dir {}", dir.display()))?;

        let stored_name = format!("{}_{}", Uuid::new_v4().simple(), sanitize_file_name(file_name));
        let path = dir.join(&stored_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;

        Ok(StoredFile {
            url: path.to_string_lossy().to_string(),
            name: file_name.to_string(),
            size: bytes.len() as u64,
        })
    }
}

fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("facturaflow-test-{}", Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn store_writes_bytes_and_reports_size() {
        let root = temp_root();
        let store = FileStore::new(root.clone());

        let stored = store.store("u1", "invoice 01.pdf", b"%PDF-fake").await.unwrap();
        assert_eq!(stored.name, "invoice 01.pdf");
        assert_eq!(stored.size, 9);
        assert!(stored.url.contains("invoice_01.pdf"));

        let on_disk = tokio::fs::read(&stored.url).await.unwrap();
        assert_eq!(on_disk, b"%PDF-fake");

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn store_fails_when_root_is_not_a_directory() {
        let root = temp_root();
        tokio::fs::write(&root, b"not a dir").await.unwrap();

        let store = FileStore::new(root.clone());
        assert!(store.store("u1", "a.pdf", b"x").await.is_err());

        tokio::fs::remove_file(&root).await.unwrap();
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("a b/c.pdf"), "a_b_c.pdf");
        assert_eq!(sanitize_file_name(""), "file");
    }
}
