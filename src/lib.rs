//! This Rust `embedded-hal`-based library drives a [HD44780](https://en.wikipedia.org/wiki/Hitachi_HD44780_LCD_controller)
//! compatible character display through a PCF8574 "I2C backpack" in an embedded, `no_std` environment. The display is run in
//! 4-bit mode: every byte goes out as two nibbles, each clocked in with an enable pulse, and every expander byte also carries
//! the backlight pin.
//!
//! The driver never touches a bus itself. It writes single expander bytes through an [`LcdPort`], which the embedding
//! system supplies. For the common case of a PCF8574T on an `embedded-hal` 1.0 I2C bus, [`I2cPort`] is provided.
//!
//! Key features include:
//! - Init handshake that forces the controller into 4-bit mode regardless of its prior state
//! - Clear, print, cursor positioning and cursor visibility commands
//! - Backlight control
//! - `core::fmt::Write` implementation for easy use with the `write!` macro
//! - Optional support for the `defmt` and `ufmt` logging frameworks
//!
//! ## Usage
//! Add this to your `Cargo.toml`:
//! ```toml
//! [dependencies]
//! i2c-character-lcd = { version = "0.1", features = ["defmt"] }
//! ```
//! The `features = ["defmt"]` line is optional and enables the `defmt` feature, which allows the library's errors to be used with the `defmt` logging
//! framework and emits trace records from the init sequence. Another optional feature is `features = ["ufmt"]`, which enables the `ufmt` feature,
//! allowing the `uwriteln!` and `uwrite!` macros to be used.
//!
//! Create the display from an I2C bus and a delay:
//! ```rust
//! use i2c_character_lcd::{CharacterDisplayPCF8574T, LcdDisplayType};
//!
//! let i2c = ...; // I2C peripheral
//! let delay = ...; // DelayNs implementation
//!
//! let mut lcd = CharacterDisplayPCF8574T::new_i2c(i2c, LcdDisplayType::Lcd16x2, delay);
//! ```
//! or from any other [`LcdPort`] implementation:
//! ```rust
//! let mut lcd = CharacterLcd::new(my_port, LcdDisplayType::Lcd20x4);
//! ```
//!
//! Initialize the display:
//! ```rust
//! if let Err(e) = lcd.init() {
//!    panic!("Error initializing LCD: {}", e);
//! }
//! ```
//! Use the display:
//! ```rust
//! // clear, move to the first line and print
//! lcd.print_text("Hello, world!")?;
//! // position the cursor and keep printing
//! lcd.set_cursor(1, 0)?.print("second line")?;
//! // can also use the `core::fmt::write!` macro
//! use core::fmt::Write;
//!
//! write!(lcd, "{} C", 21)?;
//! ```
//! Each method returns a `Result` that wraps the display object in `Ok()`, allowing for easy chaining of commands.
//! If any write to the port fails, the operation stops right there and the error is returned; the display contents
//! should then be considered unknown.
//!
#![no_std]
#![allow(dead_code, non_upper_case_globals)]
use core::fmt::Display;

use embedded_hal::{delay::DelayNs, i2c};

mod driver;
pub mod port;

pub use driver::pcf8574::RegisterSelect;
pub use port::{i2c::I2cPort, LcdPort};

use driver::{
    HD44780, LCD_CMD_CLEARDISPLAY, LCD_CMD_DISPLAYCONTROL, LCD_CMD_RETURNHOME,
    LCD_CMD_SETDDRAMADDR, LCD_FLAG_BLINKON, LCD_FLAG_CURSORON, LCD_FLAG_DISPLAYON,
};

/// HD44780 based character display using a generic PCF8574T I2C adapter.
pub type CharacterDisplayPCF8574T<I2C, DELAY> = CharacterLcd<I2cPort<I2C, DELAY>>;

#[derive(Debug, PartialEq, Copy, Clone)]
/// Errors that can occur when using the LCD
pub enum LcdError<E> {
    /// The port backend failed to open or to write a byte
    PortError(E),
    /// Row is out of range
    RowOutOfRange,
    /// Column is out of range
    ColumnOutOfRange,
    /// Formatting error
    FormattingError(core::fmt::Error),
}

impl<E> From<core::fmt::Error> for LcdError<E> {
    fn from(err: core::fmt::Error) -> Self {
        LcdError::FormattingError(err)
    }
}

impl<E> From<&LcdError<E>> for &'static str {
    fn from(err: &LcdError<E>) -> Self {
        match err {
            LcdError::PortError(_) => "Port error",
            LcdError::RowOutOfRange => "Row out of range",
            LcdError::ColumnOutOfRange => "Column out of range",
            LcdError::FormattingError(_) => "Formatting error",
        }
    }
}

#[cfg(feature = "defmt")]
impl<E> defmt::Format for LcdError<E> {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl<E> ufmt::uDisplay for LcdError<E> {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl<E> Display for LcdError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// The type of LCD display. This is used to determine the number of rows and columns, and the row offsets.
pub enum LcdDisplayType {
    /// 20x4 display
    Lcd20x4,
    /// 20x2 display
    Lcd20x2,
    /// 16x2 display
    Lcd16x2,
    /// 16x4 display
    Lcd16x4,
    /// 8x2 display
    Lcd8x2,
    /// 40x2 display
    Lcd40x2,
}

impl From<&LcdDisplayType> for &'static str {
    fn from(display_type: &LcdDisplayType) -> Self {
        match display_type {
            LcdDisplayType::Lcd20x4 => "20x4",
            LcdDisplayType::Lcd20x2 => "20x2",
            LcdDisplayType::Lcd16x2 => "16x2",
            LcdDisplayType::Lcd16x4 => "16x4",
            LcdDisplayType::Lcd8x2 => "8x2",
            LcdDisplayType::Lcd40x2 => "40x2",
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LcdDisplayType {
    fn format(&self, fmt: defmt::Formatter) {
        let msg: &'static str = From::from(self);
        defmt::write!(fmt, "{}", msg);
    }
}

#[cfg(feature = "ufmt")]
impl ufmt::uDisplay for LcdDisplayType {
    fn fmt<W>(&self, w: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        let msg: &'static str = From::from(self);
        ufmt::uwrite!(w, "{}", msg)
    }
}

impl Display for LcdDisplayType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg: &'static str = From::from(self);
        write!(f, "{}", msg)
    }
}

impl LcdDisplayType {
    /// Get the number of rows for the display type
    pub const fn rows(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 4,
            LcdDisplayType::Lcd20x2 => 2,
            LcdDisplayType::Lcd16x2 => 2,
            LcdDisplayType::Lcd16x4 => 4,
            LcdDisplayType::Lcd8x2 => 2,
            LcdDisplayType::Lcd40x2 => 2,
        }
    }

    /// Get the number of columns for the display type
    pub const fn cols(&self) -> u8 {
        match self {
            LcdDisplayType::Lcd20x4 => 20,
            LcdDisplayType::Lcd20x2 => 20,
            LcdDisplayType::Lcd16x2 => 16,
            LcdDisplayType::Lcd16x4 => 16,
            LcdDisplayType::Lcd8x2 => 8,
            LcdDisplayType::Lcd40x2 => 40,
        }
    }

    /// Get the DDRAM address of the first character of each row. This always returns an array of length 4.
    /// For displays with less than 4 rows, the unused rows will be set to offsets offscreen.
    const fn row_offsets(&self) -> [u8; 4] {
        match self {
            LcdDisplayType::Lcd20x4 => [0x00, 0x40, 0x14, 0x54],
            LcdDisplayType::Lcd20x2 => [0x00, 0x40, 0x00, 0x40],
            LcdDisplayType::Lcd16x2 => [0x00, 0x40, 0x10, 0x50],
            LcdDisplayType::Lcd16x4 => [0x00, 0x40, 0x10, 0x50],
            LcdDisplayType::Lcd8x2 => [0x00, 0x40, 0x00, 0x40],
            LcdDisplayType::Lcd40x2 => [0x00, 0x40, 0x00, 0x40],
        }
    }
}

pub struct CharacterLcd<PORT>
where
    PORT: LcdPort,
{
    lcd_type: LcdDisplayType,
    device: HD44780<PORT>,
}

impl<I2C, DELAY> CharacterLcd<I2cPort<I2C, DELAY>>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Create a new character display on an I2C bus with the default PCF8574T address.
    pub fn new_i2c(i2c: I2C, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new(I2cPort::new(i2c, delay), lcd_type)
    }

    /// Create a new character display on an I2C bus with a specific address for the adapter.
    pub fn new_i2c_with_address(i2c: I2C, address: u8, lcd_type: LcdDisplayType, delay: DELAY) -> Self {
        Self::new(I2cPort::new_with_address(i2c, address, delay), lcd_type)
    }
}

impl<PORT> CharacterLcd<PORT>
where
    PORT: LcdPort,
{
    /// Create a new character display writing through `port`. The backlight starts on.
    pub fn new(port: PORT, lcd_type: LcdDisplayType) -> Self {
        Self {
            lcd_type,
            device: HD44780::new(port),
        }
    }

    /// Initialize the display. This must be called before using the display.
    pub fn init(&mut self) -> Result<(), LcdError<PORT::Error>> {
        self.device.init().map_err(LcdError::PortError)
    }

    /// returns a reference to the port. mostly needed for testing
    pub fn port(&mut self) -> &mut PORT {
        self.device.port()
    }

    /// Consume the display and give back its port.
    pub fn release(self) -> PORT {
        self.device.release()
    }

    /// returns the `LcdDisplayType` used to create the display
    pub fn display_type(&self) -> LcdDisplayType {
        self.lcd_type
    }

    /// Whether frames currently go out with the backlight pin set.
    pub fn is_backlight_on(&self) -> bool {
        self.device.backlight()
    }

    //--------------------------------------------------------------------------------------------------
    // high level commands, for the user!
    //--------------------------------------------------------------------------------------------------

    /// Clear the display. The controller also moves the cursor home.
    pub fn clear(&mut self) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device
            .send_slow_command(LCD_CMD_CLEARDISPLAY)
            .map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Set the cursor to the home position.
    pub fn home(&mut self) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device
            .send_slow_command(LCD_CMD_RETURNHOME)
            .map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Set the cursor position at specified row and column. Rows and columns are zero-indexed.
    pub fn set_cursor(&mut self, row: u8, col: u8) -> Result<&mut Self, LcdError<PORT::Error>> {
        if row >= self.lcd_type.rows() {
            return Err(LcdError::RowOutOfRange);
        }
        if col >= self.lcd_type.cols() {
            return Err(LcdError::ColumnOutOfRange);
        }

        self.device
            .send_command(LCD_CMD_SETDDRAMADDR | (col + self.lcd_type.row_offsets()[row as usize]))
            .map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Show a blinking cursor.
    pub fn cursor_on(&mut self) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device
            .send_command(
                LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON | LCD_FLAG_CURSORON | LCD_FLAG_BLINKON,
            )
            .map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Hide the cursor. The display stays on.
    pub fn cursor_off(&mut self) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device
            .send_command(LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON)
            .map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Write one character code at the cursor. The byte is sent as is; what it shows depends on
    /// the controller's character ROM.
    pub fn print_char(&mut self, ch: u8) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device.send_data(ch).map_err(LcdError::PortError)?;
        Ok(self)
    }

    /// Prints a string at the current cursor position. Stops at a NUL character if the string has one.
    pub fn print(&mut self, text: &str) -> Result<&mut Self, LcdError<PORT::Error>> {
        for ch in text.bytes().take_while(|&ch| ch != 0) {
            self.device.send_data(ch).map_err(LcdError::PortError)?;
        }
        Ok(self)
    }

    /// Clears the display, moves to the start of the first row and prints `text` there.
    pub fn print_text(&mut self, text: &str) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.clear()?.set_cursor(0, 0)?.print(text)
    }

    /// Turn the backlight on or off
    pub fn backlight(&mut self, on: bool) -> Result<&mut Self, LcdError<PORT::Error>> {
        self.device
            .set_backlight(on)
            .map_err(LcdError::PortError)?;
        Ok(self)
    }
}

/// Implement the `core::fmt::Write` trait for the LCD, allowing it to be used with the `write!` macro.
/// Text goes out at the current cursor position, like `print`.
impl<PORT> core::fmt::Write for CharacterLcd<PORT>
where
    PORT: LcdPort,
{
    fn write_str(&mut self, s: &str) -> Result<(), core::fmt::Error> {
        if let Err(_e) = self.print(s) {
            return Err(core::fmt::Error);
        }
        Ok(())
    }
}

#[cfg(feature = "ufmt")]
/// Implement the `ufmt::uWrite` trait for the LCD, allowing it to be used with the `uwriteln!` and `uwrite!` macros.
impl<PORT> ufmt::uWrite for CharacterLcd<PORT>
where
    PORT: LcdPort,
{
    fn write_str(&mut self, s: &str) -> Result<(), LcdError<PORT::Error>> {
        self.print(s)?;
        Ok(())
    }

    type Error = LcdError<PORT::Error>;
}
