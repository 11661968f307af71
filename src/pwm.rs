//! PWM-dimmed LED outputs.

use embedded_hal::pwm::SetDutyCycle;

/// PWM counter wrap value. Levels run from 0 (off) to `PWM_WRAP` (full on).
pub const PWM_WRAP: u16 = 4095;

/// PWM carrier frequency for the LED lines.
pub const PWM_FREQUENCY_KHZ: u32 = 5;

/// One LED on a PWM line that has been configured for a [`PWM_WRAP`]
/// counting period.
///
/// Levels are written straight through. Callers keep them within
/// `0..=PWM_WRAP`; the driver does not clamp.
pub struct PwmLed<P> {
    pin: P,
}

impl<P: SetDutyCycle> PwmLed<P> {
    /// Take ownership of a configured line and switch it off.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        if pin.max_duty_cycle() < PWM_WRAP {
            warn!(
                "PWM line resolution {} is below wrap value {}",
                pin.max_duty_cycle(),
                PWM_WRAP
            );
        }
        pin.set_duty_cycle_fully_off()?;
        Ok(Self { pin })
    }

    /// Set the duty cycle. Takes effect immediately, no fading.
    pub fn set_level(&mut self, level: u16) -> Result<(), P::Error> {
        self.pin.set_duty_cycle(level)
    }

    pub fn off(&mut self) -> Result<(), P::Error> {
        self.set_level(0)
    }

    #[cfg(test)]
    pub(crate) fn release(self) -> P {
        self.pin
    }
}

#[cfg(feature = "board")]
pub use board::Leds;

#[cfg(feature = "board")]
mod board {
    use esp_hal::{
        gpio::{
            DriveMode,
            Level,
            Output,
            OutputConfig,
            interconnect::PeripheralOutput,
        },
        ledc::{
            LSGlobalClkSource,
            Ledc,
            LowSpeed,
            channel::{
                self,
                Channel,
                ChannelIFace,
            },
            timer::{
                self,
                TimerIFace,
            },
        },
        time::Rate,
    };

    use super::{
        PWM_FREQUENCY_KHZ,
        PwmLed,
    };
    use crate::LedResources;

    /// Red and blue PWM LEDs plus the green indicator.
    ///
    /// The LEDC channels implement `SetDutyCycle` themselves; on a 12-bit
    /// timer their full scale is 4096, one step above [`super::PWM_WRAP`].
    pub struct Leds {
        pub red: PwmLed<Channel<'static, LowSpeed>>,
        pub blue: PwmLed<Channel<'static, LowSpeed>>,
        pub green: Output<'static>,
        _ledc: Ledc<'static>,
    }

    fn ledc_line(
        ledc: &Ledc<'static>,
        timer: &'static timer::Timer<'static, LowSpeed>,
        number: channel::Number,
        pin: impl PeripheralOutput<'static>,
    ) -> PwmLed<Channel<'static, LowSpeed>> {
        let mut channel = ledc.channel(number, pin);
        channel
            .configure(channel::config::Config {
                timer,
                duty_pct: 0,
                drive_mode: DriveMode::PushPull,
            })
            .unwrap();
        PwmLed::new(channel).unwrap()
    }

    impl From<LedResources<'static>> for Leds {
        fn from(res: LedResources<'static>) -> Self {
            let mut ledc = Ledc::new(res.ledc);
            ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

            let timer = crate::mk_static!(
                timer::Timer<'static, LowSpeed>,
                ledc.timer::<LowSpeed>(timer::Number::Timer0)
            );
            timer
                .configure(timer::config::Config {
                    duty: timer::config::Duty::Duty12Bit,
                    clock_source: timer::LSClockSource::APBClk,
                    frequency: Rate::from_khz(PWM_FREQUENCY_KHZ),
                })
                .unwrap();
            let timer: &'static timer::Timer<'static, LowSpeed> = timer;

            Self {
                red: ledc_line(&ledc, timer, channel::Number::Channel0, res.red),
                blue: ledc_line(&ledc, timer, channel::Number::Channel1, res.blue),
                green: Output::new(res.green, Level::Low, OutputConfig::default()),
                _ledc: ledc,
            }
        }
    }
}
