//! 128×64 monochrome OLED: frame layout and the SSD1306 driver over I2C.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{
        PrimitiveStyle,
        Rectangle,
    },
};

use crate::joystick::CursorPosition;

pub const DISPLAY_WIDTH: u32 = 128;
pub const DISPLAY_HEIGHT: u32 = 64;

/// 7-bit I2C address of the panel.
pub const DISPLAY_ADDRESS: u8 = 0x3C;

/// I2C bus clock for the panel.
pub const DISPLAY_BUS_KHZ: u32 = 400;

/// Side length of the cursor square.
pub const CURSOR_SIZE: u32 = 8;

/// Vertical offset added to the cursor's Y coordinate when drawn.
pub const CURSOR_Y_OFFSET: i32 = 6;

const BORDER: Rectangle = Rectangle::new(Point::new(3, 3), Size::new(122, 60));
const LOCKED: Rectangle = Rectangle::new(Point::new(1, 1), Size::new(122, 60));

/// A display that is drawn into a local frame buffer and then sent to the
/// panel in one go.
///
/// Pixels outside the panel are discarded by the implementation.
pub trait FrameSink: DrawTarget<Color = BinaryColor> {
    /// Transmit the frame buffer to the panel.
    fn flush_frame(&mut self) -> Result<(), Self::Error>;
}

/// Clear the panel.
pub fn blank<D: FrameSink>(display: &mut D) -> Result<(), D::Error> {
    display.clear(BinaryColor::Off)?;
    display.flush_frame()
}

/// Border plus the filled cursor square.
pub fn draw_cursor_frame<D: FrameSink>(
    display: &mut D,
    cursor: CursorPosition,
) -> Result<(), D::Error> {
    display.clear(BinaryColor::Off)?;
    BORDER
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display)?;
    Rectangle::new(
        Point::new(cursor.x, cursor.y + CURSOR_Y_OFFSET),
        Size::new_equal(CURSOR_SIZE),
    )
    .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
    .draw(display)?;
    display.flush_frame()
}

/// Single outline, no cursor: shown while the stick is locked out.
pub fn draw_locked_frame<D: FrameSink>(display: &mut D) -> Result<(), D::Error> {
    display.clear(BinaryColor::Off)?;
    LOCKED
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(display)?;
    display.flush_frame()
}

#[cfg(feature = "board")]
pub use board::Oled;

#[cfg(feature = "board")]
mod board {
    use esp_hal::{
        Blocking,
        i2c::master::{
            Config,
            I2c,
        },
        time::Rate,
    };
    use ssd1306::{
        I2CDisplayInterface,
        Ssd1306,
        mode::BufferedGraphicsMode,
        prelude::*,
    };

    use super::{
        DISPLAY_ADDRESS,
        DISPLAY_BUS_KHZ,
        FrameSink,
    };
    use crate::DisplayResources;

    /// The SSD1306 panel in buffered graphics mode.
    pub type Oled<'a> = Ssd1306<
        I2CInterface<I2c<'a, Blocking>>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    impl FrameSink for Oled<'_> {
        fn flush_frame(&mut self) -> Result<(), Self::Error> {
            self.flush()
        }
    }

    impl<'a> From<DisplayResources<'a>> for Oled<'a> {
        fn from(res: DisplayResources<'a>) -> Self {
            let i2c = I2c::new(
                res.i2c,
                Config::default().with_frequency(Rate::from_khz(DISPLAY_BUS_KHZ)),
            )
            .unwrap()
            .with_sda(res.sda)
            .with_scl(res.scl);

            let interface = I2CDisplayInterface::new_custom_address(i2c, DISPLAY_ADDRESS);
            let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
                .into_buffered_graphics_mode();
            display.init().unwrap();
            display
        }
    }
}
