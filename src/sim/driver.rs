//! Per-frame driver
//!
//! Turns display-refresh timestamps into clamped simulation steps and hands
//! the same `FrameTime` to every registered consumer, in registration order.

use crate::consts::MAX_FRAME_DT;

/// Simulation instant shared by every consumer within one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    /// Clamped step (seconds)
    pub dt: f32,
    /// Sum of all clamped steps so far (seconds)
    pub elapsed: f32,
}

impl FrameTime {
    pub fn new(dt: f32, elapsed: f32) -> Self {
        Self { dt, elapsed }
    }
}

/// Clamp a raw frame delta into `[0, MAX_FRAME_DT]`
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    dt.max(0.0).min(MAX_FRAME_DT)
}

/// Converts millisecond timestamps into `FrameTime`s
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
    elapsed: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to `timestamp_ms`; the first call yields `dt = 0`
    pub fn tick(&mut self, timestamp_ms: f64) -> FrameTime {
        let raw = match self.last_ms {
            Some(last) => ((timestamp_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(timestamp_ms);
        let dt = clamp_dt(raw);
        self.elapsed += dt;
        FrameTime::new(dt, self.elapsed)
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Forget the previous timestamp and restart elapsed time at zero
    pub fn reset(&mut self) {
        self.last_ms = None;
        self.elapsed = 0.0;
    }
}

/// Handle returned by `FrameDriver::register`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u32);

type Callback<S> = Box<dyn FnMut(&mut S, FrameTime)>;

struct Registration<S> {
    id: CallbackId,
    name: &'static str,
    callback: Callback<S>,
}

/// Fixed-cadence callback scheduler over a state owner `S`
///
/// Each scene owns one driver; dropping or clearing it tears the loop down.
pub struct FrameDriver<S> {
    clock: FrameClock,
    callbacks: Vec<Registration<S>>,
    next_id: u32,
}

impl<S> Default for FrameDriver<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FrameDriver<S> {
    pub fn new() -> Self {
        Self {
            clock: FrameClock::new(),
            callbacks: Vec::new(),
            next_id: 1,
        }
    }

    /// Add a consumer; it runs after every consumer registered before it
    pub fn register<F>(&mut self, name: &'static str, callback: F) -> CallbackId
    where
        F: FnMut(&mut S, FrameTime) + 'static,
    {
        let id = CallbackId(self.next_id);
        self.next_id += 1;
        self.callbacks.push(Registration {
            id,
            name,
            callback: Box::new(callback),
        });
        log::debug!("Frame callback registered: {name} ({id:?})");
        id
    }

    /// Remove a consumer; returns false if it was not registered
    pub fn deregister(&mut self, id: CallbackId) -> bool {
        match self.callbacks.iter().position(|r| r.id == id) {
            Some(index) => {
                let removed = self.callbacks.remove(index);
                log::debug!("Frame callback removed: {}", removed.name);
                true
            }
            None => false,
        }
    }

    /// Drop every consumer and restart the clock
    pub fn clear(&mut self) {
        if !self.callbacks.is_empty() {
            log::debug!("Frame driver torn down ({} callbacks)", self.callbacks.len());
        }
        self.callbacks.clear();
        self.clock.reset();
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Run one display frame at `timestamp_ms`
    pub fn frame(&mut self, state: &mut S, timestamp_ms: f64) -> FrameTime {
        let time = self.clock.tick(timestamp_ms);
        for registration in &mut self.callbacks {
            (registration.callback)(state, time);
        }
        time
    }
}
