// src/core/preview.rs — On-disk preview of the current version
//
// A `PreviewGuard` owns one preview file: it is written on acquire and
// removed on drop. `Preview` swaps guards whenever the current snapshot
// changes, so at most one preview file exists per session and none remain
// after the session ends.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::snapshot::Snapshot;

static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug)]
pub struct PreviewGuard {
    path: PathBuf,
    seq: u64,
}

impl PreviewGuard {
    /// Write `snapshot` to `dir`. `owner` keeps files of different sessions
    /// in the same process apart.
    pub fn acquire(dir: &Path, owner: u64, snapshot: &Snapshot) -> io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "preview-{}-{}-{}.{}",
            std::process::id(),
            owner,
            snapshot.seq(),
            snapshot.image().extension()
        ));
        write_new(&path, |file| file.write_all(snapshot.bytes()))?;
        tracing::debug!(path = %path.display(), "Preview acquired");
        Ok(Self {
            path,
            seq: snapshot.seq(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Drop for PreviewGuard {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Preview released"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove preview {}: {}", self.path.display(), e),
        }
    }
}

/// Create `path` and fill it with `write`. A failed write removes the file.
fn write_new(path: &Path, write: impl FnOnce(&mut File) -> io::Result<()>) -> io::Result<()> {
    let mut file = File::create(path)?;
    if let Err(e) = write(&mut file) {
        drop(file);
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}

#[derive(Debug)]
pub struct Preview {
    dir: PathBuf,
    owner: u64,
    current: Option<PreviewGuard>,
}

impl Preview {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            current: None,
        }
    }

    /// Follow the current snapshot: keep the guard if it still shows the same
    /// version, otherwise release it and acquire a new one.
    pub fn sync(&mut self, snapshot: Option<&Snapshot>) -> io::Result<Option<&Path>> {
        let unchanged = match (&self.current, snapshot) {
            (Some(guard), Some(s)) => guard.seq() == s.seq(),
            (None, None) => true,
            _ => false,
        };

        if !unchanged {
            // Release before acquiring.
            self.current = None;
            if let Some(s) = snapshot {
                self.current = Some(PreviewGuard::acquire(&self.dir, self.owner, s)?);
            }
        }

        Ok(self.path())
    }

    pub fn path(&self) -> Option<&Path> {
        self.current.as_ref().map(|g| g.path())
    }
}
