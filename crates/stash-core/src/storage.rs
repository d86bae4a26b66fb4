//! Filesystem side of stored files.
//!
//! Nothing is tracked in memory: whether a file exists is asked of the disk
//! each time. Probe and removal are separate calls and not atomic.

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tokio::fs::{self, OpenOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileState {
    Exists,
    Missing,
}

/// Absolute location of a stored file.
pub fn stored_path(save_path: &Path, name: &str) -> PathBuf {
    save_path.join(name)
}

fn classify(res: io::Result<fs::File>) -> io::Result<FileState> {
    match res {
        Ok(_) => Ok(FileState::Exists),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(FileState::Missing),
        Err(e) => Err(e),
    }
}

/// Can the file be opened for reading?
pub async fn probe_read(path: &Path) -> io::Result<FileState> {
    classify(OpenOptions::new().read(true).open(path).await)
}

/// Can the file be opened for reading and writing?
pub async fn probe_read_write(path: &Path) -> io::Result<FileState> {
    classify(OpenOptions::new().read(true).write(true).open(path).await)
}

pub async fn remove(path: &Path) -> io::Result<()> {
    fs::remove_file(path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::tmp_dir;

    #[tokio::test]
    async fn probes_follow_the_disk() {
        let dir = tmp_dir("stash-storage");
        let path = stored_path(&dir, "abcdef012.txt");

        assert_eq!(probe_read(&path).await.unwrap(), FileState::Missing);
        assert_eq!(probe_read_write(&path).await.unwrap(), FileState::Missing);

        std::fs::write(&path, b"x").unwrap();
        assert_eq!(probe_read(&path).await.unwrap(), FileState::Exists);
        assert_eq!(probe_read_write(&path).await.unwrap(), FileState::Exists);

        remove(&path).await.unwrap();
        assert_eq!(probe_read(&path).await.unwrap(), FileState::Missing);
        assert_eq!(
            remove(&path).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn non_not_found_errors_propagate() {
        let dir = tmp_dir("stash-storage-dir");
        // Opening a directory for writing fails with something other than NotFound.
        let err = probe_read_write(&dir).await.unwrap_err();
        assert_ne!(err.kind(), ErrorKind::NotFound);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
