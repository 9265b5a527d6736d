// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Command handling and per-interval publishing.
//!
//! [`App`] lives in a `Mutex<RefCell<Option<_>>>` shared by the main loop, which feeds it parsed
//! commands, and the `TIM2` handler, which calls [`App::on_sample_interrupt`]. Both only ever hold
//! the lock briefly. Screen updates are queued as [`DisplayOp`]s and collected by the main loop
//! with [`App::take_display_ops`], which owns the LCD and draws with interrupts enabled.

use heapless::Deque;
use log::{error, info, warn};
use motor_rpm::command::{Command, HELP};
use motor_rpm::display::{DisplayOp, SpeedText};
use motor_rpm::{Error, MotorMode, Peripheral, Result, SampleOutcome, SamplerConfig, SpeedMonitor};
use stm32f7xx_hal::{pac, rcc::Clocks};

use crate::config;
use crate::console;
use crate::hw::pins::StepperPins;
use crate::hw::{prescaler_for, Encoder, Led, MotorPwm, SampleTimer};

pub type Monitor = SpeedMonitor<SampleTimer, Encoder<pac::TIM3>, MotorPwm>;

/// Screen updates held between main loop passes. The oldest is dropped when full.
pub const DISPLAY_QUEUE: usize = 8;

pub type DisplayOps = Deque<DisplayOp, DISPLAY_QUEUE>;

/// Timers handed over at reset and configured on the first `init`.
pub struct Timers {
    pub tim1: pac::TIM1,
    pub tim2: pac::TIM2,
    pub tim3: pac::TIM3,
}

pub struct App {
    config: SamplerConfig,
    clocks: Clocks,
    timers: Option<Timers>,
    monitor: Option<Monitor>,
    stepper: StepperPins,
    lcd_ready: bool,
    display_ops: DisplayOps,
    led: Led<'B', 7>,
    display_dirty: bool,
}

impl App {
    pub fn new(
        config: SamplerConfig,
        clocks: Clocks,
        timers: Timers,
        stepper: StepperPins,
        led: Led<'B', 7>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clocks,
            timers: Some(timers),
            monitor: None,
            stepper,
            lcd_ready: false,
            display_ops: Deque::new(),
            led,
            display_dirty: false,
        })
    }

    /// Execute one console command. Failures are logged and returned.
    pub fn handle(&mut self, command: Command) -> Result<()> {
        let result = self.dispatch(command);
        if let Err(e) = result {
            match e {
                Error::PeripheralInit(_) | Error::InvalidConfig(_) | Error::InvalidInterval => {
                    error!("{}", e)
                }
                Error::NotInitialized | Error::AlreadyRunning => warn!("{}", e),
            }
        }
        result
    }

    fn dispatch(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Init(mode) => self.init(mode.unwrap_or(config::DEFAULT_MODE)),
            Command::Stop => self.stop(),
            Command::StepperStart => {
                self.pwm()?.start_stepper();
                self.stepper.enable();
                info!("stepper output on");
                Ok(())
            }
            Command::DcStart => {
                self.pwm()?.start_dc();
                info!("dc output on");
                Ok(())
            }
            Command::StepperSpeed(percent) => {
                let config = self.config;
                self.pwm()?.set_stepper_percent(percent, &config);
                info!("stepper speed {}%", percent);
                Ok(())
            }
            Command::DcSpeed(percent) => {
                self.pwm()?.set_dc_percent(percent);
                info!("dc speed {}%", percent);
                Ok(())
            }
            Command::Lcd { row, text } => {
                self.lcd_ready()?;
                self.queue_display(DisplayOp::Line { row, text });
                Ok(())
            }
            Command::LcdClear => {
                self.lcd_ready()?;
                self.queue_display(DisplayOp::Clear);
                Ok(())
            }
            Command::LcdDisplay => {
                self.lcd_ready()?;
                self.display_dirty = true;
                Ok(())
            }
            Command::Help => {
                for &(usage, description) in HELP {
                    console::write_parts(&[usage, " : ", description, "\r\n"]);
                }
                Ok(())
            }
        }
    }

    /// Bring up the encoder and sampling timer and start sampling, then enable the motor outputs
    /// and queue the LCD bring-up. Outputs stay off if sampling cannot start.
    fn init(&mut self, mode: MotorMode) -> Result<()> {
        if self.monitor.as_ref().map_or(false, |m| m.is_running()) {
            return Err(Error::AlreadyRunning);
        }

        let monitor = match self.monitor.take() {
            Some(m) if m.mode() == mode => m,
            Some(m) => {
                let (timer, encoder, pwm) = m.free();
                SpeedMonitor::new(self.config, mode, timer, encoder, pwm)?
            }
            None => self.configure_timers(mode)?,
        };
        let monitor = self.monitor.insert(monitor);

        monitor.start()?;
        monitor.step_rate_mut().start();
        self.stepper.enable();

        if !self.lcd_ready {
            self.queue_display(DisplayOp::Init);
            self.lcd_ready = true;
        }
        self.show_banner();
        info!("initialized for {}", mode.label());
        Ok(())
    }

    /// First `init`: check both timer clocks divide down exactly, then configure the timers.
    fn configure_timers(&mut self, mode: MotorMode) -> Result<Monitor> {
        let sample_psc = prescaler_for(
            self.clocks.timclk1().raw(),
            self.config.sample_timer_hz,
            Peripheral::SampleTimer,
        )?;
        let pwm_psc = prescaler_for(
            self.clocks.timclk2().raw(),
            self.config.step_timer_hz,
            Peripheral::Pwm,
        )?;
        let timers = self.timers.take().ok_or(Error::PeripheralInit(Peripheral::SampleTimer))?;

        let timer = SampleTimer::tim2(timers.tim2, sample_psc);
        let encoder = Encoder::tim3(timers.tim3);
        let pwm = MotorPwm::tim1(timers.tim1, pwm_psc);
        SpeedMonitor::new(self.config, mode, timer, encoder, pwm)
    }

    fn stop(&mut self) -> Result<()> {
        let monitor = self.monitor.as_mut().ok_or(Error::NotInitialized)?;
        monitor.step_rate_mut().stop();
        monitor.stop();
        self.stepper.disable();
        self.show_banner();
        info!("stopped");
        Ok(())
    }

    /// Sampling timer update interrupt.
    pub fn on_sample_interrupt(&mut self) {
        let Some(monitor) = self.monitor.as_mut() else {
            return;
        };
        monitor.timer_mut().clear_interrupt();

        if let Some(outcome) = monitor.on_interrupt() {
            self.led.toggle();
            if let SampleOutcome::Published(_) = outcome {
                self.display_dirty = true;
            }
        }
    }

    /// Hand over the queued screen updates, ending with a speed screen snapshot if a new estimate
    /// arrived. The caller draws them after releasing the lock.
    pub fn take_display_ops(&mut self) -> DisplayOps {
        if self.display_dirty && self.lcd_ready {
            if let Some(text) = self.monitor.as_ref().map(|m| m.display_text()) {
                self.queue_display(DisplayOp::Show(text));
            }
        }
        self.display_dirty = false;
        core::mem::take(&mut self.display_ops)
    }

    fn queue_display(&mut self, op: DisplayOp) {
        if self.display_ops.is_full() {
            // Init is never dropped; an LCD that missed it shows garbage until reset.
            if matches!(self.display_ops.front(), Some(DisplayOp::Init)) {
                self.display_ops.pop_back();
            } else {
                self.display_ops.pop_front();
            }
            warn!("display queue full, update dropped");
        }
        let _ = self.display_ops.push_back(op);
    }

    fn show_banner(&mut self) {
        if self.lcd_ready {
            self.queue_display(DisplayOp::Clear);
            self.queue_display(DisplayOp::Show(SpeedText::banner()));
        }
        self.display_dirty = false;
    }

    fn pwm(&mut self) -> Result<&mut MotorPwm> {
        self.monitor
            .as_mut()
            .map(|m| m.step_rate_mut())
            .ok_or(Error::NotInitialized)
    }

    fn lcd_ready(&self) -> Result<()> {
        if self.lcd_ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }
}
