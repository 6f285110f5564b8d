//! Advisory file locks and the single-instance PID lock.
//!
//! The PID lock is a plain-text file holding the owner's process id. It is
//! considered stale when that process no longer exists, in which case it
//! is taken over. On top of the PID check the lock file is also held with
//! a non-blocking `flock` for as long as the owner keeps it.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::errors::{Result, S7nError};

/// Block until an exclusive advisory lock on `file` is held.
///
/// The lock is released when the file is closed.
pub fn lock_exclusive(file: &File) -> io::Result<()> {
    flock(file, false).map(|_| ())
}

/// Try to take an exclusive advisory lock without blocking.
///
/// Returns `Ok(false)` when another open file description holds it.
pub fn try_lock_exclusive(file: &File) -> io::Result<bool> {
    flock(file, true)
}

#[cfg(unix)]
fn flock(file: &File, nonblocking: bool) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;

    let mut op = libc::LOCK_EX;
    if nonblocking {
        op |= libc::LOCK_NB;
    }
    loop {
        // SAFETY: the descriptor is owned by `file`, which outlives this call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), op) };
        if rc == 0 {
            return Ok(true);
        }
        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(libc::EWOULDBLOCK) if nonblocking => return Ok(false),
            _ => return Err(err),
        }
    }
}

#[cfg(not(unix))]
fn flock(_file: &File, _nonblocking: bool) -> io::Result<bool> {
    Ok(true)
}

/// Whether a process with this id currently exists.
///
/// A permission error from the probe means the process exists but belongs
/// to someone else, which still counts as alive.
#[cfg(unix)]
pub fn process_alive(pid: u32) -> bool {
    let Ok(pid) = libc::pid_t::try_from(pid) else {
        return false;
    };
    if pid <= 0 {
        return false;
    }
    // SAFETY: signal 0 performs only the existence and permission checks.
    let rc = unsafe { libc::kill(pid, 0) };
    rc == 0 || io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
pub fn process_alive(pid: u32) -> bool {
    pid != 0
}

/// Read the PID recorded in a lock file.
///
/// `None` when the file is absent; unparsable content reads as PID 0,
/// which is never alive.
pub fn read_pid(path: &Path) -> Result<Option<u32>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    Ok(Some(contents.trim().parse().unwrap_or(0)))
}

/// A held single-instance lock.
#[derive(Debug)]
pub struct PidLock {
    path: PathBuf,
    pid: u32,
    // Keeps the advisory lock for the holder's lifetime.
    _file: File,
}

impl PidLock {
    /// Take the lock at `path` for the current process.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(pid) = read_pid(path)? {
            if process_alive(pid) {
                return Err(S7nError::AlreadyRunning(pid));
            }
            warn!(pid, path = %path.display(), "taking over stale lock");
        }

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        if !try_lock_exclusive(&file)? {
            return Err(S7nError::AlreadyRunning(read_pid(path)?.unwrap_or(0)));
        }

        let pid = std::process::id();
        file.set_len(0)?;
        write!(file, "{pid}")?;
        file.flush()?;
        debug!(pid, path = %path.display(), "lock acquired");

        Ok(Self {
            path: path.to_path_buf(),
            pid,
            _file: file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Remove the lock file if it still records our PID.
    pub fn release(self) -> Result<()> {
        remove_own_lock(&self.path)
    }
}

/// Remove the lock file at `path` when it records the current process.
///
/// A foreign PID is reported as `AlreadyRunning`; a missing file is fine.
pub fn remove_own_lock(path: &Path) -> Result<()> {
    match read_pid(path)? {
        Some(pid) if pid == std::process::id() => {
            fs::remove_file(path)?;
            debug!(pid, path = %path.display(), "lock released");
            Ok(())
        }
        Some(pid) => Err(S7nError::AlreadyRunning(pid)),
        None => Ok(()),
    }
}
