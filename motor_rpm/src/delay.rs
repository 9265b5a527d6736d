// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Non-blocking cyclic delay on a bounded hardware counter.
//!
//! A requested interval may need more ticks than the timer can count in one cycle. It is split
//! into `required_full_cycles` cycles of `max_ticks_per_cycle` ticks followed by one partial cycle
//! of `remainder_ticks`. The timer period is reprogrammed in place from the update interrupt, so
//! the counter never stops and no ticks are lost between cycles.
//!
//! The generator is free-running: once an interval completes, the next one starts immediately
//! with the same request.
//!
//! ```text
//! period:  | max | max | ... | max | rem |  max | max | ...
//! firing:     C     C           C     IC     C     C
//! ```

use log::{debug, info};

use crate::error::{Error, Result};
use crate::timer::PeriodTimer;

/// Immutable description of the interval to generate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DelayRequest {
    pub requested_interval_ms: u32,
    pub hardware_tick_hz: u32,
    /// Largest count the hardware counter can express in one cycle.
    pub max_ticks_per_cycle: u32,
}

impl DelayRequest {
    /// Number of timer ticks in the requested interval, or `None` when it cannot be generated.
    pub fn total_ticks(&self) -> Option<u64> {
        if self.requested_interval_ms == 0 || self.max_ticks_per_cycle == 0 {
            return None;
        }
        let ticks = self.requested_interval_ms as u64 * self.hardware_tick_hz as u64 / 1000;
        if ticks == 0 {
            None
        } else {
            Some(ticks)
        }
    }
}

/// Progress through the current interval.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DelayState {
    pub elapsed_full_cycles: u32,
    pub required_full_cycles: u32,
    pub remainder_ticks: u32,
    pub is_final_cycle: bool,
}

impl DelayState {
    /// Decompose a request into full cycles and a remainder.
    pub fn for_request(request: &DelayRequest) -> Result<Self> {
        let total = request.total_ticks().ok_or(Error::InvalidInterval)?;
        let max = request.max_ticks_per_cycle as u64;

        let required_full_cycles =
            u32::try_from(total / max).map_err(|_| Error::InvalidInterval)?;
        // Strictly less than max_ticks_per_cycle, so it fits.
        let remainder_ticks = (total % max) as u32;

        Ok(Self {
            elapsed_full_cycles: 0,
            required_full_cycles,
            remainder_ticks,
            is_final_cycle: required_full_cycles == 0,
        })
    }
}

/// Result of one period-elapsed interrupt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// More cycles remain in the current interval.
    Continuing,
    /// The requested interval has fully elapsed.
    IntervalComplete,
}

/// Delay generator bound to one hardware timer.
pub struct CyclicDelay<T> {
    timer: T,
    state: DelayState,
    max_ticks_per_cycle: u32,
    armed: bool,
}

impl<T: PeriodTimer> CyclicDelay<T> {
    /// Wrap a timer. Nothing is programmed until [`start`](Self::start).
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            state: DelayState::default(),
            max_ticks_per_cycle: 0,
            armed: false,
        }
    }

    /// Begin generating `request` repeatedly. Any interval in progress is discarded.
    ///
    /// The timer is left untouched when the request is rejected.
    pub fn start(&mut self, request: DelayRequest) -> Result<DelayState> {
        let state = DelayState::for_request(&request)?;

        self.state = state;
        self.max_ticks_per_cycle = request.max_ticks_per_cycle;

        if state.required_full_cycles > 0 {
            self.timer.set_period(request.max_ticks_per_cycle);
        } else {
            self.timer.set_period(state.remainder_ticks);
        }
        self.timer.arm();
        self.armed = true;

        info!(
            "delay started: {} ms = {} x {} ticks + {} ticks",
            request.requested_interval_ms,
            state.required_full_cycles,
            request.max_ticks_per_cycle,
            state.remainder_ticks
        );

        Ok(state)
    }

    /// Advance by one elapsed timer period.
    ///
    /// A tick that arrives while stopped (a stale pending interrupt) is ignored.
    pub fn on_tick(&mut self) -> TickOutcome {
        if !self.armed {
            return TickOutcome::Continuing;
        }

        if self.state.is_final_cycle {
            self.state.elapsed_full_cycles = 0;
            if self.state.required_full_cycles > 0 {
                self.timer.set_period(self.max_ticks_per_cycle);
                self.state.is_final_cycle = false;
            }
            return TickOutcome::IntervalComplete;
        }

        // Only reachable with required_full_cycles > 0.
        self.state.elapsed_full_cycles += 1;
        if self.state.elapsed_full_cycles < self.state.required_full_cycles {
            return TickOutcome::Continuing;
        }

        if self.state.remainder_ticks == 0 {
            // Nothing left to count; the period is still max_ticks_per_cycle for the next round.
            self.state.elapsed_full_cycles = 0;
            return TickOutcome::IntervalComplete;
        }

        self.timer.set_period(self.state.remainder_ticks);
        self.state.is_final_cycle = true;
        TickOutcome::Continuing
    }

    /// Disarm the interrupt and clear all progress. Calling it again has no further effect.
    pub fn stop(&mut self) {
        if self.armed {
            debug!("delay stopped");
        }
        self.timer.disarm();
        self.state = DelayState::default();
        self.max_ticks_per_cycle = 0;
        self.armed = false;
    }

    #[inline]
    pub fn state(&self) -> &DelayState {
        &self.state
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    #[inline]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    #[inline]
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Consume the generator and return the timer.
    pub fn free(self) -> T {
        self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records what the generator programs into the timer.
    #[derive(Debug, Default)]
    struct MockTimer {
        period: u32,
        armed: bool,
        period_writes: u32,
        wrote_zero: bool,
    }

    impl PeriodTimer for MockTimer {
        fn set_period(&mut self, ticks: u32) {
            self.period = ticks;
            self.period_writes += 1;
            if ticks == 0 {
                self.wrote_zero = true;
            }
        }

        fn arm(&mut self) {
            self.armed = true;
        }

        fn disarm(&mut self) {
            self.armed = false;
        }
    }

    fn request(ms: u32, hz: u32, max: u32) -> DelayRequest {
        DelayRequest {
            requested_interval_ms: ms,
            hardware_tick_hz: hz,
            max_ticks_per_cycle: max,
        }
    }

    /// Fire interrupts until the interval completes. Returns (firings, ticks consumed).
    fn run_interval(delay: &mut CyclicDelay<MockTimer>) -> (u32, u64) {
        let mut firings = 0;
        let mut ticks = 0u64;
        loop {
            ticks += delay.timer().period as u64;
            firings += 1;
            if delay.on_tick() == TickOutcome::IntervalComplete {
                return (firings, ticks);
            }
            assert!(firings < 10_000, "interval never completed");
        }
    }

    #[test]
    fn short_interval_starts_in_final_cycle() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        let state = delay.start(request(500, 1_000_000, u32::MAX)).unwrap();

        assert_eq!(state.required_full_cycles, 0);
        assert_eq!(state.remainder_ticks, 500_000);
        assert!(state.is_final_cycle);
        assert_eq!(delay.timer().period, 500_000);
        assert!(delay.timer().armed);

        for _ in 0..3 {
            assert_eq!(delay.on_tick(), TickOutcome::IntervalComplete);
            assert_eq!(delay.timer().period, 500_000);
        }
    }

    #[test]
    fn long_interval_is_split_into_full_cycles_and_remainder() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        let state = delay.start(request(10, 1_000_000, 3_000)).unwrap();

        assert_eq!(state.required_full_cycles, 3);
        assert_eq!(state.remainder_ticks, 1_000);
        assert_eq!(delay.timer().period, 3_000);

        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert_eq!(delay.state().elapsed_full_cycles, 2);

        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert!(delay.state().is_final_cycle);
        assert_eq!(delay.timer().period, 1_000);

        assert_eq!(delay.on_tick(), TickOutcome::IntervalComplete);
        assert!(!delay.state().is_final_cycle);
        assert_eq!(delay.state().elapsed_full_cycles, 0);
        assert_eq!(delay.timer().period, 3_000);
    }

    #[test]
    fn firings_and_ticks_match_the_request() {
        let cases = [
            (500, 1_000_000, u32::MAX),
            (10, 1_000_000, 3_000),
            (9, 1_000_000, 3_000),
            (7, 1_000_000, 1_000),
            (1, 1_000, 1),
            (1234, 48_000, 65_535),
            (u32::MAX, 1_000_000, u32::MAX),
        ];

        for (ms, hz, max) in cases {
            let req = request(ms, hz, max);
            let mut delay = CyclicDelay::new(MockTimer::default());
            let state = delay.start(req).unwrap();
            let total = req.total_ticks().unwrap();

            let (firings, ticks) = run_interval(&mut delay);
            assert_eq!(ticks, total, "case {:?}", req);
            assert_eq!(
                state.required_full_cycles as u64 * max as u64 + state.remainder_ticks as u64,
                total
            );

            let expected = if state.remainder_ticks == 0 {
                state.required_full_cycles
            } else {
                state.required_full_cycles + 1
            };
            assert_eq!(firings, expected, "case {:?}", req);
            assert!(!delay.timer().wrote_zero);
        }
    }

    #[test]
    fn zero_remainder_skips_the_partial_cycle() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        let state = delay.start(request(9, 1_000_000, 3_000)).unwrap();
        assert_eq!(state.remainder_ticks, 0);

        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert_eq!(delay.on_tick(), TickOutcome::IntervalComplete);

        assert!(!delay.timer().wrote_zero);
        assert_eq!(delay.timer().period, 3_000);
        // Only the initial programming: the period never changed.
        assert_eq!(delay.timer().period_writes, 1);
    }

    #[test]
    fn repeats_the_same_sequence_after_completion() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        delay.start(request(10, 1_000_000, 3_000)).unwrap();

        let first = run_interval(&mut delay);
        let start_state = DelayState::for_request(&request(10, 1_000_000, 3_000)).unwrap();
        assert_eq!(*delay.state(), start_state);

        for _ in 0..5 {
            assert_eq!(run_interval(&mut delay), first);
        }
    }

    #[test]
    fn invariant_holds_on_every_tick() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        delay.start(request(25, 1_000_000, 4_000)).unwrap();
        for _ in 0..100 {
            delay.on_tick();
            let s = delay.state();
            assert!(s.elapsed_full_cycles <= s.required_full_cycles);
        }
    }

    #[test]
    fn zero_interval_is_rejected_without_touching_the_timer() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        assert_eq!(
            delay.start(request(0, 1_000_000, u32::MAX)),
            Err(Error::InvalidInterval)
        );
        assert_eq!(delay.timer().period_writes, 0);
        assert!(!delay.timer().armed);
        assert!(!delay.is_armed());
    }

    #[test]
    fn unrepresentable_interval_is_rejected() {
        // Less than one tick.
        assert_eq!(
            DelayState::for_request(&request(1, 100, u32::MAX)),
            Err(Error::InvalidInterval)
        );
        // More full cycles than a u32 can count.
        assert_eq!(
            DelayState::for_request(&request(u32::MAX, u32::MAX, 1)),
            Err(Error::InvalidInterval)
        );
    }

    #[test]
    fn stop_is_idempotent() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        delay.start(request(10, 1_000_000, 3_000)).unwrap();
        delay.on_tick();

        delay.stop();
        let once = *delay.state();
        let armed_once = delay.timer().armed;

        delay.stop();
        assert_eq!(*delay.state(), once);
        assert_eq!(delay.timer().armed, armed_once);
        assert_eq!(once, DelayState::default());
        assert!(!delay.is_armed());
    }

    #[test]
    fn ticks_after_stop_are_ignored() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        delay.start(request(500, 1_000_000, u32::MAX)).unwrap();
        delay.stop();

        assert_eq!(delay.on_tick(), TickOutcome::Continuing);
        assert_eq!(*delay.state(), DelayState::default());
    }

    #[test]
    fn restart_discards_progress() {
        let mut delay = CyclicDelay::new(MockTimer::default());
        delay.start(request(10, 1_000_000, 3_000)).unwrap();
        delay.on_tick();
        delay.on_tick();

        let state = delay.start(request(2, 1_000_000, 3_000)).unwrap();
        assert_eq!(state.required_full_cycles, 0);
        assert_eq!(delay.timer().period, 2_000);
        assert_eq!(delay.on_tick(), TickOutcome::IntervalComplete);
    }
}
