use anyhow::Result;
use async_trait::async_trait;

/// Pluggable persistence backend for a session subsystem.
///
/// The session layer drives one instance through one request's lifecycle:
/// `open` at the start, `read`/`write` while the request is handled, `close`
/// at the end, with `destroy` on logout and `gc` as a periodic sweep. Id
/// generation, cookie transport, and payload serialization all live in the
/// caller; the payload is an opaque string here.
#[async_trait]
pub trait SaveHandler: Send {
    /// Begin a session-handling cycle under the given namespace.
    async fn open(&mut self, save_path: &str, name: &str) -> Result<bool>;

    /// End the cycle. The backing handle is externally owned, so this is a
    /// no-op for stores that do not hold resources of their own.
    async fn close(&mut self) -> Result<bool>;

    /// Fetch the payload for a session id, or an empty string when there is
    /// no live session. Callers cannot distinguish "no session" from a
    /// session whose payload is legitimately empty.
    async fn read(&mut self, id: &str) -> Result<String>;

    /// Persist the payload for a session id, creating the session if it does
    /// not exist yet. Returns whether a row was affected.
    async fn write(&mut self, id: &str, data: &str) -> Result<bool>;

    /// Remove a session. Succeeds whether or not it existed.
    async fn destroy(&mut self, id: &str) -> Result<bool>;

    /// Sweep expired sessions.
    async fn gc(&mut self, max_lifetime: i64) -> Result<bool>;
}
