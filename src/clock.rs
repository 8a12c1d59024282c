//! Sequencer transport: play state, the 16-step cursor, and tempo, plus the
//! tick loop that drives them.
//!
//! The loop schedules against absolute deadlines (`previous + beat`) so
//! scheduling jitter never accumulates into drift, and it parks on a
//! condvar while stopped instead of polling. Tempo lives in an atomic read
//! fresh for every deadline, so a change applies on the next tick, never
//! mid-beat. Nothing in here is allowed to kill the loop: lock poisoning is
//! recovered and unreadable rows are skipped, because losing cadence is
//! worse than losing one tick's triggers.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::pattern::PatternStore;
use crate::shared::{BPM_MAX, BPM_MIN, NUM_STEPS, UiEvent};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClockError {
    #[error("tempo {0} outside {min}..={max} BPM", min = BPM_MIN, max = BPM_MAX)]
    InvalidTempo(u32),
}

/// One sixteenth note at `bpm`.
pub fn beat_duration(bpm: u32) -> Duration {
    Duration::from_secs_f64(60.0 / f64::from(bpm) / 4.0)
}

#[derive(Debug, Clone, Copy)]
struct Transport {
    playing: bool,
    step: usize,
}

pub struct SequencerClock {
    pattern: Arc<PatternStore>,
    dispatcher: Arc<Dispatcher>,
    events: Sender<UiEvent>,
    transport: Mutex<Transport>,
    /// Wakes the tick loop out of its stopped park or its inter-tick sleep.
    wake: Condvar,
    bpm: AtomicU32,
    shutdown: AtomicBool,
}

impl SequencerClock {
    pub fn new(
        pattern: Arc<PatternStore>,
        dispatcher: Arc<Dispatcher>,
        events: Sender<UiEvent>,
        bpm: u32,
    ) -> Self {
        Self {
            pattern,
            dispatcher,
            events,
            transport: Mutex::new(Transport {
                playing: false,
                step: 0,
            }),
            wake: Condvar::new(),
            bpm: AtomicU32::new(bpm.clamp(BPM_MIN, BPM_MAX)),
            shutdown: AtomicBool::new(false),
        }
    }

    fn lock_transport(&self) -> MutexGuard<'_, Transport> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_playing(&self) -> bool {
        self.lock_transport().playing
    }

    pub fn current_step(&self) -> usize {
        self.lock_transport().step
    }

    pub fn bpm(&self) -> u32 {
        self.bpm.load(Ordering::Acquire)
    }

    /// Change tempo. Out-of-range requests leave the current tempo in
    /// place; a running loop picks the new value up for its next tick.
    pub fn set_tempo(&self, bpm: u32) -> Result<(), ClockError> {
        if !(BPM_MIN..=BPM_MAX).contains(&bpm) {
            return Err(ClockError::InvalidTempo(bpm));
        }
        self.bpm.store(bpm, Ordering::Release);
        debug!(bpm, "tempo set");
        Ok(())
    }

    /// Resume from the current step position.
    pub fn start(&self) {
        let mut transport = self.lock_transport();
        if !transport.playing {
            transport.playing = true;
            info!(bpm = self.bpm(), step = transport.step, "transport started");
            self.wake.notify_all();
        }
    }

    /// Halt future ticks; the step position survives for the next start.
    /// Voices already handed to the sink run to completion.
    pub fn stop(&self) {
        let was_playing = {
            let mut transport = self.lock_transport();
            let was = transport.playing;
            transport.playing = false;
            self.wake.notify_all();
            was
        };
        if was_playing {
            info!("transport stopped");
            let _ = self.events.try_send(UiEvent::Stopped);
        }
    }

    /// Play if stopped, stop if playing. Returns the new playing state.
    pub fn toggle(&self) -> bool {
        if self.is_playing() {
            self.stop();
            false
        } else {
            self.start();
            true
        }
    }

    /// Rewind to step 0 and clear the pattern; play state is untouched.
    pub fn reset(&self) {
        self.lock_transport().step = 0;
        self.pattern.clear();
        debug!("pattern cleared, cursor rewound");
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
        // take the lock so a waiter between its predicate check and its
        // block can't miss the notify
        let _guard = self.lock_transport();
        self.wake.notify_all();
    }

    /// Fire the current step and advance the cursor. Returns false without
    /// side effects when stopped. Public so tests can drive the clock
    /// without real time.
    pub fn tick_once(&self) -> bool {
        let step = {
            let mut transport = self.lock_transport();
            if !transport.playing {
                return false;
            }
            let step = transport.step;
            transport.step = (step + 1) % NUM_STEPS;
            step
        };

        match self.pattern.snapshot_row(step) {
            Ok(row) => self.dispatcher.fire_row(&row),
            // step is bounded by the modulo above; keep the loop alive
            Err(e) => warn!(%e, "skipping unreadable step"),
        }

        let _ = self.events.try_send(UiEvent::StepAdvance(step as u8));
        true
    }

    /// Tick loop body. Runs until [`shutdown`](Self::shutdown).
    pub fn run(&self) {
        info!(bpm = self.bpm(), "sequencer clock running");
        let mut deadline = Instant::now();
        loop {
            let parked = self.park_while_stopped();
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            if parked {
                // stale deadlines from before the stop would burst-fire
                deadline = Instant::now();
            }
            if !self.tick_once() {
                continue;
            }
            let beat = beat_duration(self.bpm());
            deadline += beat;
            let now = Instant::now();
            if now.saturating_duration_since(deadline) > beat {
                warn!("tick loop fell behind schedule, re-anchoring");
                deadline = now;
            }
            self.sleep_until(deadline);
        }
        debug!("sequencer clock shut down");
    }

    /// Block until playing or shutdown; returns whether it actually waited.
    fn park_while_stopped(&self) -> bool {
        let mut transport = self.lock_transport();
        let mut parked = false;
        while !transport.playing && !self.shutdown.load(Ordering::Acquire) {
            parked = true;
            transport = self
                .wake
                .wait(transport)
                .unwrap_or_else(PoisonError::into_inner);
        }
        parked
    }

    /// Sleep toward an absolute deadline, waking early on stop or shutdown.
    fn sleep_until(&self, deadline: Instant) {
        let mut transport = self.lock_transport();
        loop {
            if self.shutdown.load(Ordering::Acquire) || !transport.playing {
                return;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return;
            }
            let (guard, _) = self
                .wake
                .wait_timeout(transport, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            transport = guard;
        }
    }

    /// Run the tick loop on its own named thread.
    pub fn spawn(self: Arc<Self>) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("sequencer-clock".into())
            .spawn(move || self.run())
    }
}
