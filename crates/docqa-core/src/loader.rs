use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Document;

/// Reads a directory tree into [`Document`]s.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader {
    extensions: Vec<String>,
}

impl DocumentLoader {
    /// `extensions` are matched case-insensitively, without the dot. An empty
    /// list accepts every file.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { extensions }
    }

    /// Load every accepted file under `source_dir`.
    ///
    /// Fails only when the directory itself is unusable. Unreadable files,
    /// non-UTF-8 contents and non-UTF-8 file names are logged and skipped.
    /// Symlinks are followed; a link back into its own ancestry is skipped.
    pub fn load(&self, source_dir: &Path) -> Result<Vec<Document>> {
        let meta = fs::metadata(source_dir)
            .map_err(|e| Error::Load(format!("{}: {e}", source_dir.display())))?;
        if !meta.is_dir() {
            return Err(Error::Load(format!("{} is not a directory", source_dir.display())));
        }

        let files = self.list_files(source_dir)?;
        let mut documents = Vec::with_capacity(files.len());
        for path in files {
            let Some(id) = doc_id(source_dir, &path) else {
                tracing::warn!(path = %path.display(), "skipping file whose name is not valid UTF-8");
                continue;
            };
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };
            let text = match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    tracing::warn!(path = %path.display(), "skipping file that is not valid UTF-8");
                    continue;
                }
            };
            if text.trim().is_empty() {
                tracing::debug!(path = %path.display(), "skipping blank file");
                continue;
            }
            documents.push(Document { id, path, text });
        }
        tracing::info!(count = documents.len(), dir = %source_dir.display(), "loaded documents");
        Ok(documents)
    }

    fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn list_files(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(Error::Load(e.to_string())),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && self.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Relative path joined with `/`, or `None` when a component is not UTF-8
/// and a lossy id could collide with another file's.
fn doc_id(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_is_relative_and_slash_separated() {
        let root = Path::new("/data");
        let path = Path::new("/data/rules/combat.txt");
        assert_eq!(doc_id(root, path).as_deref(), Some("rules/combat.txt"));
    }

    #[cfg(unix)]
    #[test]
    fn doc_id_refuses_non_utf8_components() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new("/data");
        let path = root.join(OsStr::from_bytes(b"bad\xff.txt"));
        assert_eq!(doc_id(root, &path), None);
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        let loader = DocumentLoader::new([".TXT"]);
        assert!(loader.accepts(Path::new("a.txt")));
        assert!(loader.accepts(Path::new("b.Txt")));
        assert!(!loader.accepts(Path::new("c.pdf")));
        assert!(!loader.accepts(Path::new("no_extension")));
    }

    #[test]
    fn empty_filter_accepts_everything() {
        let loader = DocumentLoader::default();
        assert!(loader.accepts(Path::new("c.pdf")));
        assert!(loader.accepts(Path::new("no_extension")));
    }
}
