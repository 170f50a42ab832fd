//! Course material viewing.
//!
//! Downloaded bytes are parked in a temporary file addressed by a `blob:` URL.
//! The `DocumentViewer` owns the URL it is showing and revokes it when another
//! document replaces it, when it is closed, or when it is dropped.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex, MutexGuard};

use sha2::{Digest, Sha256};

use crate::api::PortalApi;
use crate::error::{Error, Result};
use crate::model::MaterialId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Registry {
    dir: PathBuf,
    next: u64,
    live: HashMap<ObjectUrl, PathBuf>,
}

/// Shared handle to the set of live object URLs.
#[derive(Debug, Clone)]
pub struct BlobStore {
    inner: Arc<Mutex<Registry>>,
}

impl BlobStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Registry {
                dir,
                next: 1,
                live: HashMap::new(),
            })),
        })
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self, bytes: &[u8], file_name: Option<&str>) -> Result<ObjectUrl> {
        let digest = hex_encode(&Sha256::digest(bytes));
        let mut reg = self.registry();
        let seq = reg.next;
        reg.next += 1;

        let name = sanitize_file_name(file_name.unwrap_or("document"));
        let path = reg.dir.join(format!("{}-{}-{}", seq, &digest[..12], name));
        fs::write(&path, bytes)?;

        let url = ObjectUrl(format!("blob:lmsquiz/{}-{}", seq, &digest[..12]));
        tracing::debug!(%url, path = %path.display(), size = bytes.len(), "object url created");
        reg.live.insert(url.clone(), path);
        Ok(url)
    }

    pub fn path(&self, url: &ObjectUrl) -> Option<PathBuf> {
        self.registry().live.get(url).cloned()
    }

    /// Releases `url` and deletes its file. Returns false when it was not live.
    pub fn revoke(&self, url: &ObjectUrl) -> bool {
        let removed = self.registry().live.remove(url);
        match removed {
            Some(path) => {
                if let Err(e) = fs::remove_file(&path) {
                    tracing::warn!(%url, error = %e, "cannot delete blob file");
                }
                tracing::debug!(%url, "object url revoked");
                true
            }
            None => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.registry().live.len()
    }
}

#[derive(Debug)]
pub struct DocumentViewer {
    store: BlobStore,
    current: Option<ObjectUrl>,
}

impl DocumentViewer {
    pub fn new(store: BlobStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&ObjectUrl> {
        self.current.as_ref()
    }

    pub fn current_path(&self) -> Option<PathBuf> {
        self.current.as_ref().and_then(|u| self.store.path(u))
    }

    /// Shows `url`, revoking the previously shown document first.
    pub fn show(&mut self, url: ObjectUrl) {
        if self.current.as_ref() == Some(&url) {
            return;
        }
        if let Some(previous) = self.current.take() {
            self.store.revoke(&previous);
        }
        self.current = Some(url);
    }

    pub fn close(&mut self) {
        if let Some(url) = self.current.take() {
            self.store.revoke(&url);
        }
    }
}

impl Drop for DocumentViewer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Fetches a material into `viewer` and hands its file to `launch`.
///
/// Launchers such as `xdg-open` return as soon as the desktop viewer has the
/// path, so the document stays live until the viewer shows another one, is
/// closed, or is dropped. A failed launch releases it at once.
pub fn open_material(
    api: &dyn PortalApi,
    viewer: &mut DocumentViewer,
    material: MaterialId,
    launch: impl FnOnce(&Path) -> Result<()>,
) -> Result<()> {
    let binary = api.material_binary(material)?;
    if binary.bytes.is_empty() {
        return Err(Error::NotFound(format!("content of material {}", material)));
    }
    let fallback = format!("material-{}{}", material, extension_for(binary.content_type.as_deref()));
    let name = binary.file_name.clone().unwrap_or(fallback);
    let url = viewer.store.create(&binary.bytes, Some(&name))?;
    viewer.show(url);

    let Some(path) = viewer.current_path() else {
        return Ok(());
    };
    if let Err(e) = launch(&path) {
        viewer.close();
        return Err(e);
    }
    Ok(())
}

/// Runs the configured viewer command on `path`. A non-zero exit is an error.
pub fn launch_external(command: &str, path: &Path) -> Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Config("viewer command is empty".to_string()))?;
    let status = Command::new(program).args(parts).arg(path).status()?;
    if !status.success() {
        tracing::warn!(program, ?status, "viewer exited with error");
        return Err(Error::Viewer(format!("{} exited with {}", program, status)));
    }
    Ok(())
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type.map(|c| c.split(';').next().unwrap_or("").trim()) {
        Some("application/pdf") => ".pdf",
        Some("text/plain") => ".txt",
        Some("text/html") => ".html",
        Some("image/png") => ".png",
        Some("image/jpeg") => ".jpg",
        Some("video/mp4") => ".mp4",
        _ => "",
    }
}

fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("week 1 notes.pdf"), "week_1_notes.pdf");
        assert_eq!(sanitize_file_name(".."), "document");
    }

    #[test]
    fn test_extension_for_content_type() {
        assert_eq!(extension_for(Some("application/pdf; charset=binary")), ".pdf");
        assert_eq!(extension_for(None), "");
    }

    #[test]
    fn test_urls_are_unique_for_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = BlobStore::new(dir.path().to_path_buf()).unwrap();
        let a = store.create(b"same", None).unwrap();
        let b = store.create(b"same", None).unwrap();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:"));
        assert_eq!(store.live_count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_external_reports_exit_status() {
        let path = Path::new("/dev/null");
        assert!(launch_external("true", path).is_ok());
        let err = launch_external("false", path).unwrap_err();
        assert!(matches!(err, Error::Viewer(_)));
        assert!(matches!(launch_external("  ", path), Err(Error::Config(_))));
    }
}
