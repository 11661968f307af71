//! # joystick-leds
//!
//! Firmware library for an ESP32-S3 board with a two-axis joystick, two
//! PWM-dimmed LEDs, a green indicator LED and a 128×64 SSD1306 OLED.
//!
//! - **Input**: button A and the joystick click toggle the mode flags,
//!   debounced over a shared 300 ms window
//! - **Joystick**: 12-bit X/Y samples mapped to LED levels and a cursor
//! - **PWM**: red (Y axis) and blue (X axis) LEDs on a 4095-step counter
//! - **Display**: border and cursor, or a locked outline in green-only mode
//! - **Control**: the 100 ms loop tying it together
//!
//! Without the `board` feature the crate is hardware independent and every
//! component is generic over the `embedded-hal` / `embedded-graphics` traits.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! static MODES: InputController = InputController::new();
//!
//! let peripherals = joystick_leds::init();
//! let resources = joystick_leds::split_resources!(peripherals);
//!
//! let leds: joystick_leds::pwm::Leds = resources.leds.into();
//! let oled: joystick_leds::display::Oled = resources.display.into();
//! let joystick: joystick_leds::joystick::Joystick = resources.joystick.into();
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod control;
pub mod display;
pub mod input;
pub mod joystick;
pub mod modes;
pub mod pwm;

pub use control::{
    ControlLoop,
    Frame,
    FrameError,
    LOOP_PERIOD_MS,
};
pub use display::FrameSink;
pub use input::{
    EdgeOutcome,
    InputController,
    InputLine,
    Timestamp,
};
pub use joystick::{
    AnalogSample,
    CursorPosition,
    JoystickSampler,
};
pub use modes::{
    Mode,
    ModeFlags,
};
pub use pwm::PwmLed;

/// StaticCell helper: allocates a value into a `static` exactly once.
#[cfg(feature = "board")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

#[cfg(feature = "board")]
pub use board::*;

#[cfg(feature = "board")]
mod board {
    use esp_hal::{
        assign_resources,
        clock::CpuClock,
    };

    // ── Pin / peripheral assignments ────────────────────────────────────────

    assign_resources! {
        pub Resources<'d> {
            display: DisplayResources<'d> {
                sda: GPIO8,
                scl: GPIO9,
                i2c: I2C0,
            },
            leds: LedResources<'d> {
                red: GPIO13,
                blue: GPIO12,
                green: GPIO11,
                ledc: LEDC,
            },
            buttons: ButtonResources<'d> {
                a: GPIO5,
                b: GPIO6,
                stick: GPIO14,
            },
            joystick: JoystickResources<'d> {
                x: GPIO1,
                y: GPIO2,
                adc: ADC1,
            },
        }
    }

    // ── Board initialisation ────────────────────────────────────────────────

    /// Initialise the board and return the raw peripheral set.
    ///
    /// Call this once at the top of `main`, then use [`split_resources!`] to
    /// break the peripherals into typed resource groups.
    #[must_use]
    pub fn init() -> esp_hal::peripherals::Peripherals {
        let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
        esp_hal::init(config)
    }

    impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
        fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
            split_resources!(peripherals)
        }
    }
}
