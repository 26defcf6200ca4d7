//! Frame sink contract
//!
//! The sink is the downstream transport collaborator: it frames and
//! serializes encoded bytes onto a physical link. Callers supply the
//! implementation; the relay only ever calls it from its writer thread.

use std::io;

/// Destination for encoded frames
///
/// `write` may block for unbounded time (the relay calls it outside any lock
/// the encoder callback needs). Errors are caught and logged by the relay,
/// never propagated to the encoder callback; a failing sink loses frames but
/// does not terminate the session.
pub trait FrameSink: Send + Sync {
    /// Write one encoded frame
    ///
    /// `data[offset..offset + len]` is the encoded payload; `pts_micros` is
    /// the frame's presentation timestamp in microseconds.
    fn write(&self, data: &[u8], offset: usize, len: usize, pts_micros: i64) -> io::Result<()>;

    /// Release any resources held by the sink
    ///
    /// Called when the sink is replaced by a rebind or when the relay clears
    /// its state on shutdown. Best effort; errors are logged and swallowed.
    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}
