use std::time;

/// Tracks frame timing from the instants handed to [`FrameCounter::on_update`].
#[derive(Debug, PartialEq, PartialOrd)]
pub struct FrameCounter {
    // total frames seen so far
    frame_count: u64,
    // frames since the fps value was last refreshed
    fps_frame_count: u64,
    fps: f64,
    // duration between the last two frames
    delta_time: time::Duration,
    last_time: time::Instant,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update(&mut self, current_time: time::Instant) {
        self.delta_time = current_time - self.last_time;
        self.last_time = current_time;

        self.frame_count += 1;
        self.fps_frame_count += 1;

        // two updates with the same instant leave the previous fps in place
        if !self.delta_time.is_zero() {
            self.fps = self.fps_frame_count as f64 / self.delta_time.as_secs_f64();
            self.fps_frame_count = 0;
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn delta_time(&self) -> time::Duration {
        self.delta_time
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            delta_time: time::Duration::ZERO,
            last_time: time::Instant::now(),
        }
    }
}

/// Smooths and throttles fps reporting so the log is not written every frame.
pub struct FPSPrinter<T: MovingAverage, F: Fn(f64)> {
    throttle_ms: u128,
    delta_time_accumulator: time::Duration,

    moving_average: T,
    print_fn: F,
}

impl<T, F> FPSPrinter<T, F>
where
    T: MovingAverage,
    F: Fn(f64),
{
    pub fn new(moving_average: T, print_fn: F) -> Self {
        Self {
            throttle_ms: 1000,
            delta_time_accumulator: time::Duration::ZERO,
            moving_average,
            print_fn,
        }
    }

    pub fn with_throttle_ms(mut self, throttle_ms: u128) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }

    pub fn on_update(&mut self, delta_time: time::Duration, fps: f64) {
        self.delta_time_accumulator += delta_time;
        if self.delta_time_accumulator.as_millis() >= self.throttle_ms {
            self.delta_time_accumulator = time::Duration::ZERO;
            let fps_ma = self.moving_average.compute(fps);
            (self.print_fn)(fps_ma);
        }
    }
}

pub trait MovingAverage {
    fn compute(&mut self, fps: f64) -> f64;
}

#[derive(Debug)]
pub struct ExponentialMovingAverage {
    alpha: f64,
    moving_average: f64,
    seeded: bool,
}

impl ExponentialMovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

impl MovingAverage for ExponentialMovingAverage {
    fn compute(&mut self, value: f64) -> f64 {
        // the first sample seeds the average instead of decaying from zero
        if !self.seeded {
            self.seeded = true;
            self.moving_average = value;
            return value;
        }
        self.moving_average = self.alpha * self.moving_average + (1.0 - self.alpha) * value;
        self.moving_average
    }
}

impl Default for ExponentialMovingAverage {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            moving_average: 0.0,
            seeded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_counter_tracks_delta_and_fps() {
        let mut counter = FrameCounter::new();
        let start = time::Instant::now();
        counter.on_update(start);
        counter.on_update(start + time::Duration::from_millis(20));

        assert_eq!(counter.frame_count(), 2);
        assert_eq!(counter.delta_time(), time::Duration::from_millis(20));
        assert!((counter.fps() - 50.0).abs() < 1.0);
    }

    #[test]
    fn zero_delta_keeps_previous_fps() {
        let mut counter = FrameCounter::new();
        let start = time::Instant::now();
        counter.on_update(start);
        counter.on_update(start + time::Duration::from_millis(20));
        let fps = counter.fps();

        counter.on_update(start + time::Duration::from_millis(20));
        assert_eq!(counter.fps(), fps);
    }

    #[test]
    fn moving_average_seeds_from_first_value() {
        let mut ma = ExponentialMovingAverage::new().with_alpha(0.5);
        assert_eq!(ma.compute(60.0), 60.0);
        assert_eq!(ma.compute(30.0), 45.0);
    }

    #[test]
    fn printer_throttles_output() {
        use std::cell::Cell;

        let calls = Cell::new(0u32);
        let ma = ExponentialMovingAverage::new();
        let mut printer = FPSPrinter::new(ma, |_| calls.set(calls.get() + 1)).with_throttle_ms(100);

        for _ in 0..10 {
            printer.on_update(time::Duration::from_millis(20), 60.0);
        }
        // 200ms of accumulated time with a 100ms throttle
        assert_eq!(calls.get(), 2);
    }
}
