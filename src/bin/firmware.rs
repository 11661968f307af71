//! Joystick-dimmed red/blue LEDs, mode buttons and an OLED cursor.
//!
//! Button A toggles the PWM LEDs off and on. The joystick click toggles
//! green-only mode, which also locks the display.

#![no_std]
#![no_main]

use defmt::info;
#[allow(clippy::wildcard_imports)]
use joystick_leds::*;
use embassy_executor::Spawner;
use embassy_time::Delay;
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

static MODES: InputController = InputController::new();

#[embassy_executor::task]
async fn edge_task(buttons: &'static mut input::Buttons) {
    info!(
        "Edge task started: button A on GPIO{}, joystick click on GPIO{}",
        InputLine::ButtonA.gpio(),
        InputLine::JoystickButton.gpio()
    );

    loop {
        let gpio = buttons.next_edge().await;
        MODES.on_gpio_edge(gpio, input::now());
    }
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = joystick_leds::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let oled: display::Oled<'static> = resources.display.into();
    info!("Display ready");

    let joystick: joystick::Joystick = resources.joystick.into();
    let pwm::Leds {
        red,
        blue,
        green,
        ..
    } = resources.leds.into();

    let buttons = mk_static!(input::Buttons, resources.buttons.into());
    spawner.must_spawn(edge_task(buttons));

    let control = ControlLoop::new(&MODES, joystick, red, blue, green, oled).unwrap();
    info!("Running, loop period {}ms", LOOP_PERIOD_MS);
    control.run(Delay).await
}
