//! Vault storage: the encrypted container, the instance lock and the
//! session that ties them to the in-memory entries.
//!
//! - `format`: container file layout, read and written under `flock`
//! - `lock`: advisory locks and the single-instance PID lock
//! - `record`: serialized form of the entry collection
//! - `session`: `VaultSession`, the open vault

pub mod format;
pub mod lock;
pub mod record;
pub mod session;

pub use session::VaultSession;
