//! Force-Layout Worker
//!
//! Runs the force iteration kernel on a background thread for large graphs,
//! streaming position snapshots back at iteration boundaries. The worker
//! auto-stops after a size-scaled deadline; the engine drains the latest
//! snapshot inside its frame tick, so scene mutation stays on the UI thread.

use eframe::egui::Pos2;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::force::ForceInput;

/// Iterations between position snapshots
const BATCH: usize = 4;

/// Background force simulation over one graph snapshot
pub struct ForceWorker {
    rx: Receiver<HashMap<String, Pos2>>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    failed: bool,
}

impl ForceWorker {
    /// Spawn a worker that iterates `input` until the deadline or `stop`
    pub fn spawn(mut input: ForceInput, run_for: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let (tx, rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("force-layout".to_string())
            .spawn(move || {
                let deadline = Instant::now() + run_for;
                while !stop_flag.load(Ordering::Relaxed) && Instant::now() < deadline {
                    input.run(BATCH);
                    if tx.send(input.position_map()).is_err() {
                        break;
                    }
                    // Pace snapshots to roughly the display refresh
                    std::thread::sleep(Duration::from_millis(16));
                }
            });

        match handle {
            Ok(handle) => Self { rx, stop, handle: Some(handle), failed: false },
            Err(e) => {
                log::warn!("force worker failed to spawn: {}", e);
                Self { rx, stop, handle: None, failed: true }
            }
        }
    }

    /// Latest position snapshot since the last poll, if any
    pub fn poll(&mut self) -> Option<HashMap<String, Pos2>> {
        let mut latest = None;
        loop {
            match self.rx.try_recv() {
                Ok(positions) => latest = Some(positions),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.reap();
                    break;
                }
            }
        }
        latest
    }

    /// Whether the thread has finished (deadline, stop, or panic)
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    /// Whether the worker died without completing; callers fall back to the
    /// synchronous path
    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Signal the thread to stop and reclaim it
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        self.reap();
    }

    fn reap(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("force worker panicked; falling back to synchronous layout");
                self.failed = true;
            }
        }
    }
}

impl Drop for ForceWorker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        // Drop the receiver side naturally; the thread exits on send failure
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testutil;

    #[test]
    fn test_worker_streams_positions_and_stops() {
        let scene = testutil::scene(8, 3, 2);
        let input = ForceInput::from_scene(&scene, 100);
        let mut worker = ForceWorker::spawn(input, Duration::from_millis(150));

        // Wait out the deadline, then drain
        std::thread::sleep(Duration::from_millis(250));
        let positions = worker.poll().expect("worker sent no positions");
        assert_eq!(positions.len(), scene.node_count());
        assert!(worker.is_finished());
        assert!(!worker.failed());
        worker.stop();
    }

    #[test]
    fn test_stop_interrupts_long_run() {
        let scene = testutil::scene(10, 3, 2);
        let input = ForceInput::from_scene(&scene, 100);
        let mut worker = ForceWorker::spawn(input, Duration::from_secs(30));

        worker.stop();
        assert!(worker.is_finished());
    }
}
