//! Single-slot frame relay with a background writer thread
//!
//! Decouples the encoder's callback-driven push cadence from the sink's
//! blocking write cadence without unbounded buffering: the slot holds at
//! most one frame, and a new push replaces any unconsumed one
//! (latest-wins). Frames may be dropped under sink backpressure; the frames
//! actually written are a strict subsequence of encoder output, in order.
//!
//! The writer parks on a condvar while there is nothing to drain, and the
//! slot lock is released around the sink write so a slow sink never blocks
//! frame production.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::sink::FrameSink;
use crate::types::EncodedFrame;

/// Relay throughput counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Frames accepted by push
    pub frames_pushed: u64,
    /// Frames replaced in the slot before being drained
    pub frames_dropped: u64,
    /// Frames written to the sink
    pub frames_written: u64,
    /// Sink writes that failed
    pub write_failures: u64,
}

/// The single-entry holding area plus the current sink binding
struct Slot {
    frame: Option<EncodedFrame>,
    sink: Option<Arc<dyn FrameSink>>,
}

impl Slot {
    /// Take the pending frame if both a frame and a sink are present
    fn take_ready(&mut self) -> Option<(EncodedFrame, Arc<dyn FrameSink>)> {
        if self.frame.is_some() && self.sink.is_some() {
            Some((self.frame.take()?, self.sink.clone()?))
        } else {
            None
        }
    }
}

struct Inner {
    slot: Mutex<Slot>,
    /// Signaled on push, sink rebind, and halt
    ready: Condvar,
    halted: AtomicBool,
    writer: Mutex<Option<JoinHandle<()>>>,
    frames_pushed: AtomicU64,
    frames_dropped: AtomicU64,
    frames_written: AtomicU64,
    write_failures: AtomicU64,
}

impl Inner {
    /// Write one drained frame to the sink, outside the slot lock
    fn write_frame(&self, frame: EncodedFrame, sink: Arc<dyn FrameSink>) {
        match sink.write(&frame.payload, 0, frame.payload.len(), frame.pts_micros) {
            Ok(()) => {
                self.frames_written.fetch_add(1, Ordering::Relaxed);
                trace!(
                    pts_micros = frame.pts_micros,
                    size = frame.payload.len(),
                    "frame written"
                );
            }
            Err(e) => {
                let failures = self.write_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("sink write failed ({} total): {}", failures, e);
            }
        }
    }

    /// Close a sink, logging and swallowing any failure
    fn close_sink(sink: &Arc<dyn FrameSink>) {
        if let Err(e) = sink.close() {
            warn!("sink close failed: {}", e);
        }
    }
}

/// Latest-wins handoff buffer between the encoder callback and the sink
///
/// Cheap to clone; clones share the same slot and writer thread.
#[derive(Clone)]
pub struct FrameRelay {
    inner: Arc<Inner>,
}

impl FrameRelay {
    /// Create a relay with no sink bound and no writer running
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot {
                    frame: None,
                    sink: None,
                }),
                ready: Condvar::new(),
                halted: AtomicBool::new(false),
                writer: Mutex::new(None),
                frames_pushed: AtomicU64::new(0),
                frames_dropped: AtomicU64::new(0),
                frames_written: AtomicU64::new(0),
                write_failures: AtomicU64::new(0),
            }),
        }
    }

    /// Spawn the background writer thread
    ///
    /// No-op if the writer is already running or the relay has been halted.
    pub fn start(&self) -> std::io::Result<()> {
        let mut writer = self.inner.writer.lock();
        if writer.is_some() || self.inner.halted.load(Ordering::Acquire) {
            return Ok(());
        }

        let inner = Arc::clone(&self.inner);
        let handle = std::thread::Builder::new()
            .name("mirrorcast-relay".to_string())
            .spawn(move || writer_loop(&inner))?;
        *writer = Some(handle);
        Ok(())
    }

    /// Hand a frame to the relay, replacing any unconsumed one
    ///
    /// O(1), never blocks on I/O; callable from any thread at any time.
    /// Ignored once the relay has been halted.
    pub fn push(&self, frame: EncodedFrame) {
        if self.inner.halted.load(Ordering::Acquire) {
            trace!("push after halt ignored");
            return;
        }

        let mut slot = self.inner.slot.lock();
        if slot.frame.replace(frame).is_some() {
            let dropped = self.inner.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1;
            trace!(total_dropped = dropped, "pending frame replaced");
        }
        self.inner.frames_pushed.fetch_add(1, Ordering::Relaxed);
        self.inner.ready.notify_one();
    }

    /// Bind the sink, closing any previously bound one
    ///
    /// A frame already in the slot continues to target whichever sink is
    /// bound at the moment it is drained.
    pub fn set_sink(&self, sink: Arc<dyn FrameSink>) {
        let mut slot = self.inner.slot.lock();
        if let Some(old) = slot.sink.replace(sink) {
            debug!("sink rebound, closing previous sink");
            Inner::close_sink(&old);
        }
        self.inner.ready.notify_one();
    }

    /// Drop the pending frame and release the sink binding
    pub fn clear(&self) {
        let mut slot = self.inner.slot.lock();
        slot.frame = None;
        if let Some(sink) = slot.sink.take() {
            Inner::close_sink(&sink);
        }
    }

    /// Mark the writer for termination and wait for it to exit
    ///
    /// Idempotent and safe to call from any thread. An in-flight sink write
    /// completes before the join returns; no new push or drain work is
    /// admitted once the halt flag is set.
    pub fn halt(&self) {
        if !self.inner.halted.swap(true, Ordering::AcqRel) {
            debug!("relay halt requested");
        }
        // Wake a writer parked on an empty slot.
        {
            let _slot = self.inner.slot.lock();
            self.inner.ready.notify_all();
        }

        let handle = self.inner.writer.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("relay writer thread panicked");
            }
        }
    }

    /// Whether halt has been requested
    pub fn is_halted(&self) -> bool {
        self.inner.halted.load(Ordering::Acquire)
    }

    /// Snapshot of the relay counters
    pub fn stats(&self) -> RelayStats {
        RelayStats {
            frames_pushed: self.inner.frames_pushed.load(Ordering::Relaxed),
            frames_dropped: self.inner.frames_dropped.load(Ordering::Relaxed),
            frames_written: self.inner.frames_written.load(Ordering::Relaxed),
            write_failures: self.inner.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Drain one frame synchronously if a frame and a sink are both present
    #[cfg(test)]
    pub(crate) fn drain_once(&self) -> bool {
        if self.inner.halted.load(Ordering::Acquire) {
            return false;
        }
        let Some((frame, sink)) = self.inner.slot.lock().take_ready() else {
            return false;
        };
        self.inner.write_frame(frame, sink);
        true
    }

    /// Take the pending frame out of the slot without writing it
    #[cfg(test)]
    pub(crate) fn take_pending(&self) -> Option<EncodedFrame> {
        self.inner.slot.lock().frame.take()
    }
}

impl Default for FrameRelay {
    fn default() -> Self {
        Self::new()
    }
}

/// Background writer loop: drain the slot to the sink until halted
fn writer_loop(inner: &Inner) {
    debug!("relay writer started");
    loop {
        let (frame, sink) = {
            let mut slot = inner.slot.lock();
            loop {
                if inner.halted.load(Ordering::Acquire) {
                    debug!("relay writer exiting");
                    return;
                }
                if let Some(ready) = slot.take_ready() {
                    break ready;
                }
                inner.ready.wait(&mut slot);
            }
        };

        // The write may block for unbounded time; the slot lock is not held
        // here, so pushes keep landing while it runs.
        inner.write_frame(frame, sink);
    }
}
