//! Single-slot handoff between a capture thread and the pipeline.
//!
//! The capture side keeps overwriting one slot with its newest frame; readers
//! take an [`Arc`] snapshot and never block the producer for longer than a
//! pointer swap. Frames that nobody read before the next publish are dropped.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[error("failed to start capture thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("frame source failed: {0}")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("capture thread panicked")]
    Panicked,
}

/// One published frame and its sequence number (1 for the first frame).
#[derive(Debug)]
pub struct Snapshot<T> {
    pub seq: u64,
    pub frame: Arc<T>,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            frame: Arc::clone(&self.frame),
        }
    }
}

struct Slot<T> {
    seq: u64,
    frame: Option<Arc<T>>,
    closed: bool,
}

impl<T> Slot<T> {
    fn snapshot(&self) -> Option<Snapshot<T>> {
        self.frame.as_ref().map(|frame| Snapshot {
            seq: self.seq,
            frame: Arc::clone(frame),
        })
    }
}

pub struct LatestFrame<T> {
    slot: Mutex<Slot<T>>,
    fresh: Condvar,
}

impl<T> Default for LatestFrame<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LatestFrame<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.lock();
        f.debug_struct("LatestFrame")
            .field("seq", &slot.seq)
            .field("closed", &slot.closed)
            .finish()
    }
}

impl<T> LatestFrame<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                seq: 0,
                frame: None,
                closed: false,
            }),
            fresh: Condvar::new(),
        }
    }

    // A panicking reader cannot leave the slot half-written.
    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the slot contents and wake waiting readers. Returns the new sequence number.
    pub fn publish(&self, frame: T) -> u64 {
        let frame = Arc::new(frame);
        let seq = {
            let mut slot = self.lock();
            slot.seq += 1;
            slot.frame = Some(frame);
            slot.seq
        };
        self.fresh.notify_all();
        seq
    }

    pub fn latest(&self) -> Option<Snapshot<T>> {
        self.lock().snapshot()
    }

    /// The current frame if it is newer than `seq`.
    pub fn latest_after(&self, seq: u64) -> Option<Snapshot<T>> {
        let slot = self.lock();
        if slot.seq > seq {
            slot.snapshot()
        } else {
            None
        }
    }

    /// Block until a frame newer than `seq` is published, the slot is closed,
    /// or `timeout` elapses. A timeout too large to represent waits indefinitely.
    pub fn wait_newer(&self, seq: u64, timeout: Duration) -> Option<Snapshot<T>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut slot = self.lock();
        loop {
            if slot.seq > seq {
                return slot.snapshot();
            }
            if slot.closed {
                return None;
            }
            slot = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return None;
                    }
                    self.fresh
                        .wait_timeout(slot, deadline - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self.fresh.wait(slot).unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Mark the stream as finished; waiting readers return immediately.
    pub fn close(&self) {
        self.lock().closed = true;
        self.fresh.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

/// A camera or any other producer of frames.
pub trait FrameSource: Send + 'static {
    type Frame: Send + Sync + 'static;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Next frame, or `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Self::Error>;
}

/// Running capture thread. Dropping the handle stops and joins it.
#[derive(Debug)]
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    join: Option<JoinHandle<Result<u64, CaptureError>>>,
}

impl CaptureHandle {
    /// Ask the thread to stop after its current frame and wait for it.
    /// Returns the number of frames published.
    pub fn stop(mut self) -> Result<u64, CaptureError> {
        self.stop.store(true, Ordering::Relaxed);
        self.join_thread()
    }

    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    fn join_thread(&mut self) -> Result<u64, CaptureError> {
        match self.join.take() {
            Some(handle) => handle.join().map_err(|_| CaptureError::Panicked)?,
            None => Ok(0),
        }
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Err(e) = self.join_thread() {
            log::warn!("capture thread ended with error: {e}");
        }
    }
}

/// Run `source` on a background thread, publishing every frame into `slot`.
/// The slot is closed when the source ends, fails, or the handle is stopped.
pub fn spawn_capture<S: FrameSource>(
    mut source: S,
    slot: Arc<LatestFrame<S::Frame>>,
) -> Result<CaptureHandle, CaptureError> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let join = thread::Builder::new()
        .name("gridsight-capture".into())
        .spawn(move || {
            let mut published = 0u64;
            let result = loop {
                if flag.load(Ordering::Relaxed) {
                    break Ok(published);
                }
                match source.next_frame() {
                    Ok(Some(frame)) => {
                        slot.publish(frame);
                        published += 1;
                    }
                    Ok(None) => break Ok(published),
                    Err(e) => {
                        log::warn!("frame source failed after {published} frames: {e}");
                        break Err(CaptureError::Source(Box::new(e)));
                    }
                }
            };
            slot.close();
            result
        })
        .map_err(CaptureError::Spawn)?;

    Ok(CaptureHandle {
        stop,
        join: Some(join),
    })
}
