//! Frame handoff to a background render thread
//!
//! A single-slot mailbox between the producer (whoever composes frames) and
//! the render worker: submitting while a frame is still pending replaces it,
//! so the worker always paints the newest state and never queues stale
//! frames behind a slow sink. The worker drains a final pending frame on
//! shutdown and the handle joins it on drop.

use std::io::Write;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crate::core::grid::Grid;
use crate::render::color::ColorMode;
use crate::render::diff::DiffRenderer;

#[derive(Default)]
struct Slot {
    pending: Option<Grid>,
    shutdown: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    ready: Condvar,
}

/// Handle to the render worker.
pub struct RenderPump {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl RenderPump {
    /// Spawn the worker; frames submitted to this handle are rendered into
    /// `sink` on the worker thread.
    pub fn spawn<W>(mode: ColorMode, sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot::default()),
            ready: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("render-pump".into())
            .spawn(move || run_worker(worker_shared, mode, sink));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                tracing::error!(%err, "failed to spawn render worker");
                None
            }
        };
        Self { shared, worker }
    }

    /// Hand a frame to the worker. A frame it has not picked up yet is
    /// replaced; the latest submission wins.
    pub fn submit(&self, frame: Grid) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            if slot.shutdown {
                return;
            }
            if slot.pending.is_some() {
                tracing::trace!("replacing unrendered frame");
            }
            slot.pending = Some(frame);
            self.shared.ready.notify_one();
        }
    }
}

impl Drop for RenderPump {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.shared.slot.lock() {
            slot.shutdown = true;
            self.shared.ready.notify_one();
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker<W: Write>(shared: Arc<Shared>, mode: ColorMode, mut sink: W) {
    let mut renderer = DiffRenderer::new(mode);
    loop {
        let frame = {
            let guard = match shared.slot.lock() {
                Ok(g) => g,
                Err(_) => return,
            };
            let result = shared
                .ready
                .wait_while(guard, |slot| slot.pending.is_none() && !slot.shutdown);
            let mut slot = match result {
                Ok(s) => s,
                Err(_) => return,
            };
            match slot.pending.take() {
                Some(frame) => frame,
                // Shutdown with nothing left to paint.
                None => return,
            }
        };
        // Render outside the lock so submissions never block on the sink.
        match renderer.render(&frame, &mut sink) {
            Ok(stats) => {
                if let Err(err) = sink.flush() {
                    tracing::error!(%err, "render sink flush failed");
                    return;
                }
                tracing::trace!(
                    bytes = stats.bytes,
                    cells = stats.cells_redrawn,
                    full = stats.full_repaint,
                    micros = stats.duration.as_micros() as u64,
                    "frame rendered"
                );
            }
            Err(err) => {
                tracing::error!(%err, "render sink write failed");
                return;
            }
        }
    }
}
