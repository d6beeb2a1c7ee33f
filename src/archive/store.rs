use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Archived post pages of one blog, one `{post_id}.html` file each.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    posts_dir: PathBuf,
}

impl ArchiveStore {
    /// Store rooted at `{output_dir}/{blog}/posts`.
    #[must_use]
    pub fn new(output_dir: &Path, blog: &str) -> Self {
        Self {
            posts_dir: output_dir.join(blog).join("posts"),
        }
    }

    #[must_use]
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Ids of posts already archived. A missing directory means none.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be read.
    pub async fn archived_ids(&self) -> Result<HashSet<String>> {
        let mut ids = HashSet::new();

        let mut entries = match tokio::fs::read_dir(&self.posts_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => {
                return Err(anyhow::Error::new(e)).context(format!(
                    "Failed to read archive directory: {}",
                    self.posts_dir.display()
                ));
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.insert(stem.to_string());
            }
        }

        debug!(
            dir = %self.posts_dir.display(),
            count = ids.len(),
            "Scanned archived posts"
        );
        Ok(ids)
    }

    /// Write one post page, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if `post_id` is not a plain file name, or the write
    /// fails.
    pub async fn write_post(&self, post_id: &str, html: &str) -> Result<PathBuf> {
        if post_id.is_empty()
            || post_id.contains('/')
            || post_id.contains('\\')
            || post_id.contains("..")
        {
            bail!("Refusing to write post with unsafe id: {post_id:?}");
        }

        tokio::fs::create_dir_all(&self.posts_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create archive directory: {}",
                    self.posts_dir.display()
                )
            })?;

        let path = self.posts_dir.join(format!("{post_id}.html"));
        tokio::fs::write(&path, html)
            .await
            .with_context(|| format!("Failed to write post: {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_missing_directory_has_no_ids() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path(), "nobody");
        assert!(store.archived_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_scan() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path(), "staff");

        let path = store.write_post("123", "<html></html>").await.unwrap();
        assert_eq!(path, dir.path().join("staff/posts/123.html"));
        tokio::fs::write(store.posts_dir().join("notes.txt"), "x")
            .await
            .unwrap();

        let ids = store.archived_ids().await.unwrap();
        assert_eq!(ids, HashSet::from(["123".to_string()]));
    }

    #[tokio::test]
    async fn test_unsafe_ids_rejected() {
        let dir = TempDir::new().unwrap();
        let store = ArchiveStore::new(dir.path(), "staff");
        for id in ["", "../x", "a/b", "a\\b"] {
            assert!(store.write_post(id, "x").await.is_err(), "{id:?}");
        }
    }
}
