//! Two-axis analog joystick: raw samples, LED levels and cursor position.

use crate::pwm::PWM_WRAP;

/// Full-scale 12-bit ADC reading.
pub const ADC_MAX: u16 = 4095;

/// Reading of an axis at rest.
pub const ADC_CENTER: u16 = 2048;

/// Scaled deflection below this is treated as zero.
pub const DEAD_ZONE: u16 = 500;

/// One instantaneous reading of both axes, each in `0..=ADC_MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogSample {
    pub x: u16,
    pub y: u16,
}

impl AnalogSample {
    /// Readings above [`ADC_MAX`] saturate.
    #[must_use]
    pub fn new(x: u16, y: u16) -> Self {
        Self {
            x: x.min(ADC_MAX),
            y: y.min(ADC_MAX),
        }
    }

    /// Both axes at rest.
    #[must_use]
    pub const fn centered() -> Self {
        Self {
            x: ADC_CENTER,
            y: ADC_CENTER,
        }
    }
}

/// Reads both joystick axes on demand. No filtering or calibration; every
/// call reflects the instantaneous voltage, noise included.
pub trait JoystickSampler {
    type Error;

    /// Select and read X, then select and read Y.
    fn sample(&mut self) -> Result<AnalogSample, Self::Error>;
}

/// PWM level for one axis: twice the distance from center, zero inside the
/// dead zone, saturated at [`PWM_WRAP`].
#[must_use]
pub fn axis_level(raw: u16) -> u16 {
    let scaled = raw.abs_diff(ADC_CENTER).saturating_mul(2);
    if scaled < DEAD_ZONE {
        0
    } else {
        scaled.min(PWM_WRAP)
    }
}

/// Top-left corner of the cursor square on the display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CursorPosition {
    pub x: i32,
    pub y: i32,
}

impl CursorPosition {
    /// X maps onto 67..=117 (mirrored), Y onto 3..=103.
    #[must_use]
    pub fn from_sample(sample: AnalogSample) -> Self {
        let x = i32::from(sample.x);
        let y = i32::from(sample.y);
        let max = i32::from(ADC_MAX);
        Self {
            x: 120 - (x * 50 / max + 3),
            y: y * 100 / max + 3,
        }
    }
}

#[cfg(feature = "board")]
pub use board::{
    AdcReadError,
    Joystick,
};

#[cfg(feature = "board")]
mod board {
    use esp_hal::{
        Blocking,
        analog::adc::{
            Adc,
            AdcConfig,
            AdcPin,
            Attenuation,
        },
        peripherals::{
            ADC1,
            GPIO1,
            GPIO2,
        },
    };

    use super::{
        AnalogSample,
        JoystickSampler,
    };
    use crate::JoystickResources;

    /// ADC conversion failed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
    pub struct AdcReadError;

    /// Joystick X and Y on ADC1, one-shot conversions at 11 dB attenuation.
    pub struct Joystick {
        adc: Adc<'static, ADC1<'static>, Blocking>,
        x: AdcPin<GPIO1<'static>, ADC1<'static>>,
        y: AdcPin<GPIO2<'static>, ADC1<'static>>,
    }

    impl From<JoystickResources<'static>> for Joystick {
        fn from(res: JoystickResources<'static>) -> Self {
            let mut config = AdcConfig::new();
            let x = config.enable_pin(res.x, Attenuation::_11dB);
            let y = config.enable_pin(res.y, Attenuation::_11dB);
            Self {
                adc: Adc::new(res.adc, config),
                x,
                y,
            }
        }
    }

    impl JoystickSampler for Joystick {
        type Error = AdcReadError;

        fn sample(&mut self) -> Result<AnalogSample, Self::Error> {
            let x = nb::block!(self.adc.read_oneshot(&mut self.x)).map_err(|_| AdcReadError)?;
            let y = nb::block!(self.adc.read_oneshot(&mut self.y)).map_err(|_| AdcReadError)?;
            Ok(AnalogSample::new(x, y))
        }
    }
}
