use bitfield::bitfield;

use crate::port::LcdPort;

// Pin layout of the PCF8574T based 4-bit LCD backpacks: the HD44780 control lines on P0-P3
// and its D4-D7 data lines on P4-P7.
bitfield! {
    pub struct Pcf8574Frame(u8);
    impl Debug;
    pub rs, set_rs: 0, 0;
    pub rw, set_rw: 1, 1;
    pub enable, set_enable: 2, 2;
    pub backlight, set_backlight: 3, 3;
    pub data, set_data: 7, 4;
}

impl Clone for Pcf8574Frame {
    fn clone(&self) -> Self {
        *self
    }
}

impl Copy for Pcf8574Frame {}

/// Which HD44780 register a transfer targets.
#[derive(Debug, PartialEq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterSelect {
    /// Instruction register, RS low
    Command = 0,
    /// Data register (DDRAM or CGRAM), RS high
    Data = 1,
}

/// Turns nibbles and bytes into the expander frames that clock them into the HD44780.
/// Holds the backlight state, since every frame written carries the backlight pin.
pub struct Pcf8574Encoder {
    bits: Pcf8574Frame,
}

impl Default for Pcf8574Encoder {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Pcf8574Encoder {
    pub fn new(backlight: bool) -> Self {
        let mut bits = Pcf8574Frame(0);
        bits.set_backlight(backlight as u8);
        Self { bits }
    }

    pub fn backlight(&self) -> bool {
        self.bits.backlight() != 0
    }

    pub fn set_backlight(&mut self, on: bool) {
        self.bits.set_backlight(on as u8);
    }

    /// The frame for a nibble with the enable line low. The read/write line is always low, this
    /// driver never reads from the controller.
    pub fn frame(&self, rs: RegisterSelect, nibble: u8) -> u8 {
        let mut frame = self.bits;
        frame.set_rs(rs as u8);
        frame.set_rw(0);
        frame.set_enable(0);
        frame.set_data(nibble & 0x0F);
        frame.0
    }

    /// writes the lower nibble of `value` as an enable pulse: the frame with enable high, then the
    /// same frame with enable low. The controller latches the data lines on the falling edge.
    pub fn write_nibble<PORT>(
        &self,
        port: &mut PORT,
        rs: RegisterSelect,
        value: u8,
    ) -> Result<(), PORT::Error>
    where
        PORT: LcdPort,
    {
        let mut frame = Pcf8574Frame(self.frame(rs, value));
        frame.set_enable(1);
        port.write_byte(frame.0)?;
        frame.set_enable(0);
        port.write_byte(frame.0)?;
        Ok(())
    }

    /// writes a full byte in 4-bit mode, high nibble first.
    pub fn write_byte<PORT>(
        &self,
        port: &mut PORT,
        rs: RegisterSelect,
        value: u8,
    ) -> Result<(), PORT::Error>
    where
        PORT: LcdPort,
    {
        self.write_nibble(port, rs, value >> 4)
            .and_then(|_| self.write_nibble(port, rs, value & 0x0F))
    }

    /// writes a single idle frame so the backlight pin takes the current state right away.
    pub fn write_backlight<PORT>(&self, port: &mut PORT) -> Result<(), PORT::Error>
    where
        PORT: LcdPort,
    {
        let mut frame = Pcf8574Frame(0);
        frame.set_backlight(self.bits.backlight());
        port.write_byte(frame.0)
    }
}
