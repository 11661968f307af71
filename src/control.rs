//! The main loop: sample the stick, pick the mode, drive LEDs and display.

use embedded_hal::{
    digital::{
        OutputPin,
        PinState,
    },
    pwm::SetDutyCycle,
};
use embedded_hal_async::delay::DelayNs;

use crate::{
    display::{
        self,
        FrameSink,
    },
    input::InputController,
    joystick::{
        AnalogSample,
        CursorPosition,
        JoystickSampler,
        axis_level,
    },
    modes::Mode,
    pwm::PwmLed,
};

/// Minimum time between two iterations: each iteration sleeps this long
/// after its work is done.
pub const LOOP_PERIOD_MS: u32 = 100;

/// Which peripheral failed during an iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    Sample,
    Pwm,
    Indicator,
    Display,
}

/// What one iteration applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub mode: Mode,
    pub sample: AnalogSample,
    /// Red level, driven by the Y axis.
    pub red: u16,
    /// Blue level, driven by the X axis.
    pub blue: u16,
    /// `None` while the locked frame is shown.
    pub cursor: Option<CursorPosition>,
}

/// Owns every output and the sampler; reads the mode flags each iteration.
pub struct ControlLoop<'a, S, R, B, G, D> {
    input: &'a InputController,
    sampler: S,
    red: PwmLed<R>,
    blue: PwmLed<B>,
    green: G,
    display: D,
    last_mode: Option<Mode>,
}

impl<'a, S, R, B, G, D> ControlLoop<'a, S, R, B, G, D>
where
    S: JoystickSampler,
    R: SetDutyCycle,
    B: SetDutyCycle,
    G: OutputPin,
    D: FrameSink,
{
    /// Switch every LED off and send a blank frame.
    pub fn new(
        input: &'a InputController,
        sampler: S,
        mut red: PwmLed<R>,
        mut blue: PwmLed<B>,
        mut green: G,
        mut display: D,
    ) -> Result<Self, FrameError> {
        red.off().map_err(|_| FrameError::Pwm)?;
        blue.off().map_err(|_| FrameError::Pwm)?;
        green.set_low().map_err(|_| FrameError::Indicator)?;
        display::blank(&mut display).map_err(|_| FrameError::Display)?;
        info!("control loop ready");

        Ok(Self {
            input,
            sampler,
            red,
            blue,
            green,
            display,
            last_mode: None,
        })
    }

    /// One iteration without the trailing sleep.
    ///
    /// A failed read aborts the iteration before any output changes. A
    /// failed output aborts the rest of the iteration.
    pub fn step(&mut self) -> Result<Frame, FrameError> {
        let sample = self.sampler.sample().map_err(|_| FrameError::Sample)?;
        let mode = Mode::select(self.input.snapshot());
        if self.last_mode != Some(mode) {
            debug!("mode {}", mode);
            self.last_mode = Some(mode);
        }

        let (red, blue) = if mode.drives_pwm() {
            (axis_level(sample.y), axis_level(sample.x))
        } else {
            (0, 0)
        };
        self.red.set_level(red).map_err(|_| FrameError::Pwm)?;
        self.blue.set_level(blue).map_err(|_| FrameError::Pwm)?;
        self.green
            .set_state(PinState::from(mode.green_on()))
            .map_err(|_| FrameError::Indicator)?;

        let cursor = match mode {
            Mode::GreenOnly => {
                display::draw_locked_frame(&mut self.display).map_err(|_| FrameError::Display)?;
                None
            }
            Mode::Normal | Mode::AllOff => {
                let cursor = CursorPosition::from_sample(sample);
                display::draw_cursor_frame(&mut self.display, cursor)
                    .map_err(|_| FrameError::Display)?;
                Some(cursor)
            }
        };

        let frame = Frame {
            mode,
            sample,
            red,
            blue,
            cursor,
        };
        trace!("{}", frame);
        Ok(frame)
    }

    /// One iteration followed by the loop period, slept even when the
    /// iteration failed.
    pub async fn tick<T: DelayNs>(&mut self, delay: &mut T) -> Result<Frame, FrameError> {
        let frame = self.step();
        delay.delay_ms(LOOP_PERIOD_MS).await;
        frame
    }

    /// Run forever. Failed iterations are logged and skipped.
    pub async fn run<T: DelayNs>(mut self, mut delay: T) -> ! {
        loop {
            if let Err(err) = self.tick(&mut delay).await {
                warn!("frame failed: {}", err);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn into_parts(self) -> (S, PwmLed<R>, PwmLed<B>, G, D) {
        (self.sampler, self.red, self.blue, self.green, self.display)
    }
}
