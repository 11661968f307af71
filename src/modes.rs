//! Operating modes selected from the two button-driven flags.

/// The two mode flags toggled by the buttons.
///
/// `green_only` implies `leds_disabled` whenever the joystick button set it;
/// the reverse does not hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeFlags {
    pub leds_disabled: bool,
    pub green_only: bool,
}

/// What the control loop shows during one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// PWM LEDs off, green LED on, display shows the locked frame.
    GreenOnly,
    /// PWM LEDs follow the joystick, green LED off.
    Normal,
    /// Every LED off; the cursor is still drawn.
    AllOff,
}

impl Mode {
    /// Pick the mode for the current flags. Re-evaluated every iteration, so
    /// a flag change takes effect on the next frame.
    #[must_use]
    pub const fn select(flags: ModeFlags) -> Self {
        if flags.green_only {
            Self::GreenOnly
        } else if flags.leds_disabled {
            Self::AllOff
        } else {
            Self::Normal
        }
    }

    /// Whether the red and blue LEDs track the joystick in this mode.
    #[must_use]
    pub const fn drives_pwm(self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Green indicator LED state for this mode.
    #[must_use]
    pub const fn green_on(self) -> bool {
        matches!(self, Self::GreenOnly)
    }
}
