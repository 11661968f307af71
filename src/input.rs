//! Debounced mode toggling from button A and the joystick click.
//!
//! Both lines share one debounce clock: an accepted edge on either line
//! swallows any edge on either line for the next [`DEBOUNCE_WINDOW`].

use core::cell::Cell;

use embassy_sync::blocking_mutex::{
    Mutex,
    raw::CriticalSectionRawMutex,
};
use fugit::{
    MicrosDurationU64,
    TimerInstantU64,
};

use crate::modes::ModeFlags;

/// Microseconds since boot.
pub type Timestamp = TimerInstantU64<1_000_000>;

/// Minimum spacing between two accepted edges.
pub const DEBOUNCE_WINDOW: MicrosDurationU64 = MicrosDurationU64::millis(300);

// Must name the same pins as `ButtonResources` in the pin map. The board
// reports edges by pin number, so a mismatch surfaces as `UnknownLine`.

/// GPIO of button A (active low).
pub const BUTTON_A_GPIO: u8 = 5;
/// GPIO of button B (active low). Wired and pulled up, but toggles nothing.
pub const BUTTON_B_GPIO: u8 = 6;
/// GPIO of the joystick click switch (active low).
pub const JOYSTICK_BUTTON_GPIO: u8 = 14;

/// Input lines that toggle a mode flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputLine {
    ButtonA,
    JoystickButton,
}

impl InputLine {
    #[must_use]
    pub const fn gpio(self) -> u8 {
        match self {
            Self::ButtonA => BUTTON_A_GPIO,
            Self::JoystickButton => JOYSTICK_BUTTON_GPIO,
        }
    }

    /// Map a GPIO number to its line. Any other pin, including button B,
    /// has no mode behavior and maps to `None`.
    #[must_use]
    pub const fn from_gpio(gpio: u8) -> Option<Self> {
        match gpio {
            BUTTON_A_GPIO => Some(Self::ButtonA),
            JOYSTICK_BUTTON_GPIO => Some(Self::JoystickButton),
            _ => None,
        }
    }
}

/// What happened to one edge event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeOutcome {
    /// The edge toggled the flags; carries their new value.
    Accepted(ModeFlags),
    /// The edge fell inside the debounce window and was dropped.
    Bounced,
    /// The edge came from a pin with no mode behavior and was dropped.
    UnknownLine,
}

#[derive(Clone, Copy)]
struct EdgeState {
    flags: ModeFlags,
    last_accepted: Timestamp,
}

/// Mode flags shared between the edge handler and the control loop.
///
/// Lives in a `static`; every access goes through a critical section so the
/// flags and the debounce clock always change together.
pub struct InputController {
    state: Mutex<CriticalSectionRawMutex, Cell<EdgeState>>,
}

impl InputController {
    /// Flags start cleared and the debounce clock starts at boot, so edges
    /// in the first [`DEBOUNCE_WINDOW`] after boot are dropped.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(Cell::new(EdgeState {
                flags: ModeFlags {
                    leds_disabled: false,
                    green_only: false,
                },
                last_accepted: Timestamp::from_ticks(0),
            })),
        }
    }

    /// Handle a falling edge on `line` observed at `at`.
    pub fn on_edge(&self, line: InputLine, at: Timestamp) -> EdgeOutcome {
        let outcome = self.state.lock(|cell| {
            let mut state = cell.get();
            match at.checked_duration_since(state.last_accepted) {
                Some(elapsed) if elapsed > DEBOUNCE_WINDOW => {}
                _ => return EdgeOutcome::Bounced,
            }

            state.last_accepted = at;
            state.flags = toggle(state.flags, line);
            cell.set(state);
            EdgeOutcome::Accepted(state.flags)
        });

        match outcome {
            EdgeOutcome::Accepted(flags) => info!("{} -> {}", line, flags),
            _ => trace!("{} bounced at {}us", line, at.ticks()),
        }
        outcome
    }

    /// Handle a falling edge reported by GPIO number.
    pub fn on_gpio_edge(&self, gpio: u8, at: Timestamp) -> EdgeOutcome {
        match InputLine::from_gpio(gpio) {
            Some(line) => self.on_edge(line, at),
            None => {
                warn!("edge on unmapped GPIO{}", gpio);
                EdgeOutcome::UnknownLine
            }
        }
    }

    /// Current flags.
    pub fn snapshot(&self) -> ModeFlags {
        self.state.lock(|cell| cell.get().flags)
    }
}

const fn toggle(flags: ModeFlags, line: InputLine) -> ModeFlags {
    match line {
        InputLine::ButtonA => ModeFlags {
            leds_disabled: !flags.leds_disabled,
            green_only: false,
        },
        InputLine::JoystickButton => {
            let green_only = !flags.green_only;
            ModeFlags {
                leds_disabled: green_only,
                green_only,
            }
        }
    }
}

#[cfg(feature = "board")]
pub use board::{
    Buttons,
    now,
};

#[cfg(feature = "board")]
mod board {
    use embassy_futures::select::{
        Either,
        select,
    };
    use esp_hal::gpio::{
        Input,
        InputConfig,
        Pin,
        Pull,
    };

    use super::Timestamp;
    use crate::ButtonResources;

    /// Read the boot clock as an edge timestamp.
    #[must_use]
    pub fn now() -> Timestamp {
        Timestamp::from_ticks(embassy_time::Instant::now().as_micros())
    }

    /// The three buttons, pulled up and active low.
    pub struct Buttons {
        pub a: Input<'static>,
        pub b: Input<'static>,
        pub stick: Input<'static>,
        a_gpio: u8,
        stick_gpio: u8,
    }

    impl From<ButtonResources<'static>> for Buttons {
        fn from(res: ButtonResources<'static>) -> Self {
            let pull_up = InputConfig::default().with_pull(Pull::Up);
            let a_gpio = res.a.number();
            let stick_gpio = res.stick.number();
            Self {
                a: Input::new(res.a, pull_up),
                b: Input::new(res.b, pull_up),
                stick: Input::new(res.stick, pull_up),
                a_gpio,
                stick_gpio,
            }
        }
    }

    impl Buttons {
        /// Wait for the next falling edge on button A or the joystick click
        /// and return the GPIO number it arrived on.
        ///
        /// No settling delay here; bounce is filtered by the debounce clock.
        pub async fn next_edge(&mut self) -> u8 {
            match select(
                self.a.wait_for_falling_edge(),
                self.stick.wait_for_falling_edge(),
            )
            .await
            {
                Either::First(()) => self.a_gpio,
                Either::Second(()) => self.stick_gpio,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Timestamp {
        Timestamp::from_ticks(millis * 1_000)
    }

    fn accepted(controller: &InputController, line: InputLine, at: Timestamp) -> ModeFlags {
        match controller.on_edge(line, at) {
            EdgeOutcome::Accepted(flags) => flags,
            other => panic!("expected accepted edge, got {other:?}"),
        }
    }

    #[test]
    fn starts_with_both_flags_cleared() {
        assert_eq!(InputController::new().snapshot(), ModeFlags::default());
    }

    #[test]
    fn edges_inside_first_window_after_boot_are_dropped() {
        let controller = InputController::new();
        assert_eq!(
            controller.on_edge(InputLine::ButtonA, ms(300)),
            EdgeOutcome::Bounced
        );
        assert_eq!(controller.snapshot(), ModeFlags::default());
    }

    #[test]
    fn button_a_toggles_leds_disabled() {
        let controller = InputController::new();
        let flags = accepted(&controller, InputLine::ButtonA, ms(1_000));
        assert!(flags.leds_disabled);
        assert!(!flags.green_only);

        let flags = accepted(&controller, InputLine::ButtonA, ms(2_000));
        assert!(!flags.leds_disabled);
        assert_eq!(controller.snapshot(), flags);
    }

    #[test]
    fn second_edge_within_window_is_ignored_on_any_line() {
        let controller = InputController::new();
        let first = accepted(&controller, InputLine::ButtonA, ms(1_000));

        assert_eq!(
            controller.on_edge(InputLine::ButtonA, ms(1_150)),
            EdgeOutcome::Bounced
        );
        assert_eq!(
            controller.on_edge(InputLine::JoystickButton, ms(1_300)),
            EdgeOutcome::Bounced
        );
        assert_eq!(controller.snapshot(), first);
    }

    #[test]
    fn window_is_measured_from_last_accepted_edge() {
        let controller = InputController::new();
        accepted(&controller, InputLine::ButtonA, ms(1_000));
        // A dropped bounce does not restart the window.
        assert_eq!(
            controller.on_edge(InputLine::ButtonA, ms(1_200)),
            EdgeOutcome::Bounced
        );
        let flags = accepted(&controller, InputLine::ButtonA, ms(1_301));
        assert!(!flags.leds_disabled);
    }

    #[test]
    fn edge_exactly_at_window_boundary_is_dropped() {
        let controller = InputController::new();
        accepted(&controller, InputLine::JoystickButton, ms(1_000));
        let boundary = Timestamp::from_ticks(1_000_000 + 300_000);
        assert_eq!(
            controller.on_edge(InputLine::JoystickButton, boundary),
            EdgeOutcome::Bounced
        );
        let just_after = Timestamp::from_ticks(1_000_000 + 300_001);
        assert!(matches!(
            controller.on_edge(InputLine::JoystickButton, just_after),
            EdgeOutcome::Accepted(_)
        ));
    }

    #[test]
    fn joystick_button_sets_leds_disabled_to_new_green_only() {
        let controller = InputController::new();
        accepted(&controller, InputLine::ButtonA, ms(1_000));

        let flags = accepted(&controller, InputLine::JoystickButton, ms(2_000));
        assert_eq!(
            flags,
            ModeFlags {
                leds_disabled: true,
                green_only: true,
            }
        );

        // Leaving green-only also re-enables the LEDs; it is a copy, not a flip.
        let flags = accepted(&controller, InputLine::JoystickButton, ms(3_000));
        assert_eq!(flags, ModeFlags::default());
    }

    #[test]
    fn button_a_leaves_green_only_and_flips_leds_disabled() {
        let controller = InputController::new();
        let flags = accepted(&controller, InputLine::JoystickButton, ms(1_000));
        assert!(flags.green_only && flags.leds_disabled);

        let flags = accepted(&controller, InputLine::ButtonA, ms(2_000));
        assert_eq!(flags, ModeFlags::default());
    }

    #[test]
    fn green_only_always_implies_leds_disabled() {
        let controller = InputController::new();
        let script = [
            InputLine::JoystickButton,
            InputLine::ButtonA,
            InputLine::ButtonA,
            InputLine::JoystickButton,
            InputLine::JoystickButton,
            InputLine::ButtonA,
            InputLine::JoystickButton,
        ];
        for (i, line) in script.into_iter().enumerate() {
            let at = ms(1_000 * (i as u64 + 1));
            controller.on_edge(line, at);
            let flags = controller.snapshot();
            assert!(!flags.green_only || flags.leds_disabled, "{flags:?} after {line:?}");
        }
    }

    #[test]
    fn unknown_gpio_is_a_no_op() {
        let controller = InputController::new();
        assert_eq!(
            controller.on_gpio_edge(BUTTON_B_GPIO, ms(1_000)),
            EdgeOutcome::UnknownLine
        );
        assert_eq!(
            controller.on_gpio_edge(42, ms(2_000)),
            EdgeOutcome::UnknownLine
        );
        assert_eq!(controller.snapshot(), ModeFlags::default());

        // An unknown edge does not consume the debounce window either.
        assert!(matches!(
            controller.on_gpio_edge(BUTTON_A_GPIO, ms(2_001)),
            EdgeOutcome::Accepted(_)
        ));
    }

    #[test]
    fn timestamp_before_last_accepted_is_dropped() {
        let controller = InputController::new();
        let flags = accepted(&controller, InputLine::ButtonA, ms(5_000));
        assert_eq!(
            controller.on_edge(InputLine::ButtonA, ms(1_000)),
            EdgeOutcome::Bounced
        );
        assert_eq!(controller.snapshot(), flags);
    }

    #[test]
    fn gpio_edges_toggle_the_line_on_that_pin() {
        let controller = InputController::new();
        let flags = match controller.on_gpio_edge(JOYSTICK_BUTTON_GPIO, ms(1_000)) {
            EdgeOutcome::Accepted(flags) => flags,
            other => panic!("expected accepted edge, got {other:?}"),
        };
        assert!(flags.green_only && flags.leds_disabled);

        let flags = match controller.on_gpio_edge(BUTTON_A_GPIO, ms(2_000)) {
            EdgeOutcome::Accepted(flags) => flags,
            other => panic!("expected accepted edge, got {other:?}"),
        };
        assert_eq!(flags, ModeFlags::default());
    }

    #[test]
    fn gpio_mapping_round_trips_for_mode_lines() {
        for line in [InputLine::ButtonA, InputLine::JoystickButton] {
            assert_eq!(InputLine::from_gpio(line.gpio()), Some(line));
        }
    }
}
