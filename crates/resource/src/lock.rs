// SPDX-License-Identifier: Apache-2.0

//! Cross-platform advisory locking around artifact file access: shared for
//! reads, exclusive for writes, released on every exit path because the
//! underlying OS lock is tied to the file handle and drops with it.

use fs2::FileExt;
use std::fs::File;
use std::io;
use std::path::PathBuf;

/// Opens `path` for reading under a shared advisory lock, then runs `read`
/// against the locked file. The lock is released when the file is dropped
/// at the end of the blocking closure, regardless of how `read` returns.
pub async fn with_shared_lock<R, F>(path: PathBuf, read: F) -> io::Result<R>
where
    F: FnOnce(PathBuf) -> io::Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let file = File::open(&path)?;
        file.lock_shared()?;
        let result = read(path);
        let _ = file.unlock();
        result
    })
    .await
    .unwrap_or_else(|join_err| Err(io::Error::other(join_err)))
}

/// Opens (creating if absent) `path` for writing under an exclusive
/// advisory lock, then runs `write` against the locked file.
pub async fn with_exclusive_lock<R, F>(path: PathBuf, write: F) -> io::Result<R>
where
    F: FnOnce(&mut File) -> io::Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut file = File::options().write(true).create(true).truncate(false).open(&path)?;
        file.lock_exclusive()?;
        let result = write(&mut file);
        let _ = file.unlock();
        result
    })
    .await
    .unwrap_or_else(|join_err| Err(io::Error::other(join_err)))
}
