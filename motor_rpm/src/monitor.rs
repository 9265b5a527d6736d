// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-facing speed monitor.
//!
//! Owns the delay generator, the sampler, the mode and the two counters it reads. The firmware
//! keeps exactly one of these inside its `App` and calls [`SpeedMonitor::on_interrupt`] from the
//! sampling timer's update interrupt:
//!
//! ```ignore
//! #[interrupt]
//! fn TIM2() {
//!     free(|cs| {
//!         if let Some(app) = APP.borrow(cs).borrow_mut().as_mut() {
//!             app.on_sample_interrupt();
//!         }
//!     });
//! }
//!
//! impl App {
//!     pub fn on_sample_interrupt(&mut self) {
//!         let Some(monitor) = self.monitor.as_mut() else {
//!             return;
//!         };
//!         monitor.timer_mut().clear_interrupt();
//!         if let Some(SampleOutcome::Published(_)) = monitor.on_interrupt() {
//!             self.display_dirty = true;
//!         }
//!     }
//! }
//! ```

use log::info;

use crate::config::SamplerConfig;
use crate::delay::{CyclicDelay, DelayState, TickOutcome};
use crate::display::SpeedText;
use crate::error::Result;
use crate::mode::{MotorMode, MotorModeSelector};
use crate::sampler::{RotationSampler, SampleOutcome, SpeedEstimate};
use crate::timer::{PeriodTimer, PositionCounter, StepRateRegister};

pub struct SpeedMonitor<T, C, S> {
    config: SamplerConfig,
    delay: CyclicDelay<T>,
    sampler: RotationSampler,
    mode: MotorModeSelector,
    counter: C,
    step_rate: S,
}

impl<T, C, S> SpeedMonitor<T, C, S>
where
    T: PeriodTimer,
    C: PositionCounter,
    S: StepRateRegister,
{
    /// Assemble a stopped monitor. Fails if `config` is not usable.
    pub fn new(
        config: SamplerConfig,
        mode: MotorMode,
        timer: T,
        counter: C,
        step_rate: S,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            delay: CyclicDelay::new(timer),
            sampler: RotationSampler::new(config),
            mode: MotorModeSelector::new(mode),
            counter,
            step_rate,
        })
    }

    /// Start the free-running sampler from the current encoder position.
    pub fn start(&mut self) -> Result<DelayState> {
        self.sampler.prime(self.counter.count());
        self.sampler.clear();
        let state = self.delay.start(self.config.delay_request())?;
        info!(
            "sampling {} every {} ms",
            self.mode.mode().label(),
            self.config.interval_ms
        );
        Ok(state)
    }

    /// Handle one period-elapsed interrupt. Returns the sample taken if the interval completed.
    pub fn on_interrupt(&mut self) -> Option<SampleOutcome> {
        match self.delay.on_tick() {
            TickOutcome::Continuing => None,
            TickOutcome::IntervalComplete => Some(self.sampler.sample(
                self.mode.mode(),
                &self.counter,
                &self.step_rate,
            )),
        }
    }

    /// Stop sampling. The last estimate is kept.
    pub fn stop(&mut self) {
        self.delay.stop();
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.delay.is_armed()
    }

    #[inline]
    pub fn mode(&self) -> MotorMode {
        self.mode.mode()
    }

    /// Estimate to show, retained across discarded samples.
    #[inline]
    pub fn last_estimate(&self) -> Option<SpeedEstimate> {
        self.sampler.last_estimate()
    }

    /// Display rows for the current estimate.
    pub fn display_text(&self) -> SpeedText {
        SpeedText::for_estimate(self.mode(), self.last_estimate())
    }

    #[inline]
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    #[inline]
    pub fn delay_state(&self) -> &DelayState {
        self.delay.state()
    }

    #[inline]
    pub fn sampler(&self) -> &RotationSampler {
        &self.sampler
    }

    #[inline]
    pub fn timer_mut(&mut self) -> &mut T {
        self.delay.timer_mut()
    }

    #[inline]
    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }

    #[inline]
    pub fn step_rate_mut(&mut self) -> &mut S {
        &mut self.step_rate
    }

    /// Tear down the monitor and return its peripherals.
    pub fn free(self) -> (T, C, S) {
        (self.delay.free(), self.counter, self.step_rate)
    }
}
