// ABOUTME: Per-project mutual exclusion for install and lifecycle operations
// ABOUTME: Serializes one project name within a process and, through lock files, across processes

use fs4::fs_std::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

/// How often a contended lock file is retried.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Name-keyed locks shared by every operation that changes a project.
///
/// Without a lock directory the exclusion only covers this process. With one,
/// each acquisition also takes an exclusive advisory lock on
/// `<lock_dir>/<name>.lock`, so separate `stevedore` invocations on the same
/// name wait for each other too.
#[derive(Debug, Default)]
pub struct ProjectLocks {
    locks: LockMap,
    lock_dir: Option<PathBuf>,
}

/// Held for the duration of an operation on one project.
///
/// Dropping it releases the lock file, then the in-process lock, and forgets
/// the name once nobody else is waiting on it.
#[derive(Debug)]
pub struct ProjectGuard {
    name: String,
    file: Option<File>,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also lock `<dir>/<name>.lock` on every acquisition.
    pub fn with_lock_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lock_dir = Some(dir.into());
        self
    }

    pub fn lock_dir(&self) -> Option<&Path> {
        self.lock_dir.as_deref()
    }

    /// Wait until no other operation holds `name`, then hold it until the guard drops.
    pub async fn acquire(&self, name: &str) -> io::Result<ProjectGuard> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(name.to_string()).or_default())
        };

        let mut guard = ProjectGuard {
            name: name.to_string(),
            file: None,
            guard: Some(lock.lock_owned().await),
            locks: Arc::clone(&self.locks),
        };

        if let Some(dir) = &self.lock_dir {
            // on error the guard drops here and releases the in-process lock
            guard.file = Some(lock_file(dir, name).await?);
        }

        Ok(guard)
    }

    /// Number of names currently tracked.
    pub fn tracked(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Drop for ProjectGuard {
    fn drop(&mut self) {
        // closing the file releases the advisory lock
        drop(self.file.take());
        drop(self.guard.take());

        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        let idle = locks
            .get(&self.name)
            .map(|lock| Arc::strong_count(lock) == 1)
            .unwrap_or(false);
        if idle {
            locks.remove(&self.name);
        }
    }
}

/// Open `<dir>/<name>.lock` and poll until an exclusive lock is granted.
async fn lock_file(dir: &Path, name: &str) -> io::Result<File> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.lock", lock_file_stem(name)));

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&path)?;

    let mut waiting = false;
    loop {
        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!("Holding {}", path.display());
                return Ok(file);
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                if !waiting {
                    debug!("Waiting for another process to release {}", path.display());
                    waiting = true;
                }
                tokio::time::sleep(LOCK_POLL_INTERVAL).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Project names come from directories and the command line; keep only
/// characters that are safe in a file name.
fn lock_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
