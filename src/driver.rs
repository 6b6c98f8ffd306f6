// HD44780 command layer
// The HD44780 struct owns the port and the PCF8574 encoder. It knows the controller's command
// set and its 4-bit init handshake, and leaves validation and the public API to
// `CharacterLcd` in the crate root.
//

pub mod pcf8574;

use crate::{
    driver::pcf8574::{Pcf8574Encoder, RegisterSelect},
    port::LcdPort,
};

// commands
pub const LCD_CMD_CLEARDISPLAY: u8 = 0x01; //  Clear display, set cursor position to zero
pub const LCD_CMD_RETURNHOME: u8 = 0x02; //  Set cursor position to zero
pub const LCD_CMD_ENTRYMODESET: u8 = 0x04; //  Sets the entry mode
pub const LCD_CMD_DISPLAYCONTROL: u8 = 0x08; //  Controls the display; does stuff like turning it off and on
pub const LCD_CMD_FUNCTIONSET: u8 = 0x20; //  Used to send the function to set to the display
pub const LCD_CMD_SETDDRAMADDR: u8 = 0x80; //  Used to set the DDRAM (Display Data RAM), i.e. the cursor

// flags for display entry mode
pub const LCD_FLAG_ENTRYLEFT: u8 = 0x02; //  Cursor moves right after each character

// flags for display on/off control
pub const LCD_FLAG_DISPLAYON: u8 = 0x04; //  Turns the display on
pub const LCD_FLAG_CURSORON: u8 = 0x02; //  Turns the cursor on
pub const LCD_FLAG_BLINKON: u8 = 0x01; //  Turns on the blinking cursor

// flags for function set
pub const LCD_FLAG_4BITMODE: u8 = 0x00; //  LCD 4 bit mode
pub const LCD_FLAG_2LINE: u8 = 0x08; //  LCD 2 line mode
pub const LCD_FLAG_5x8_DOTS: u8 = 0x00; //  8 pixel high font mode

/// Commands sent as full bytes once the controller is in 4-bit mode.
pub const LCD_INIT_COMMANDS: [u8; 6] = [
    LCD_CMD_FUNCTIONSET | LCD_FLAG_4BITMODE | LCD_FLAG_2LINE | LCD_FLAG_5x8_DOTS,
    LCD_CMD_DISPLAYCONTROL, // display, cursor and blink off
    LCD_CMD_RETURNHOME,
    LCD_CMD_ENTRYMODESET | LCD_FLAG_ENTRYLEFT,
    LCD_CMD_DISPLAYCONTROL | LCD_FLAG_DISPLAYON,
    LCD_CMD_CLEARDISPLAY,
];

// settle times in ms
const POWER_ON_DELAY_MS: u32 = 20;
const WAKE_UP_DELAYS_MS: [u32; 3] = [5, 1, 1];
const COMMAND_DELAY_MS: u32 = 2;

pub struct HD44780<PORT>
where
    PORT: LcdPort,
{
    port: PORT,
    encoder: Pcf8574Encoder,
}

impl<PORT> HD44780<PORT>
where
    PORT: LcdPort,
{
    pub fn new(port: PORT) -> Self {
        Self {
            port,
            encoder: Pcf8574Encoder::default(),
        }
    }

    pub fn port(&mut self) -> &mut PORT {
        &mut self.port
    }

    pub fn release(self) -> PORT {
        self.port
    }

    /// Opens the port and runs the 4-bit init handshake followed by `LCD_INIT_COMMANDS`.
    /// Stops at the first failure.
    pub fn init(&mut self) -> Result<(), PORT::Error> {
        self.port.init().map_err(|e| {
            #[cfg(feature = "defmt")]
            defmt::warn!("LCD port init failed");
            e
        })?;
        self.port.delay_ms(POWER_ON_DELAY_MS);

        // Whatever mode the controller woke up in, 0x3, 0x3, 0x2 leaves it in 4-bit mode.
        for (nibble, delay) in [0x03, 0x03, 0x02].into_iter().zip(WAKE_UP_DELAYS_MS) {
            self.encoder
                .write_nibble(&mut self.port, RegisterSelect::Command, nibble)?;
            self.port.delay_ms(delay);
        }

        for command in LCD_INIT_COMMANDS {
            self.send_command(command)?;
            self.port.delay_ms(COMMAND_DELAY_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("LCD init sequence complete");
        Ok(())
    }

    pub fn send_command(&mut self, command: u8) -> Result<(), PORT::Error> {
        self.write_byte(RegisterSelect::Command, command)
    }

    pub fn send_data(&mut self, data: u8) -> Result<(), PORT::Error> {
        self.write_byte(RegisterSelect::Data, data)
    }

    /// Sends a command that the controller needs extra time to execute, then waits it out.
    pub fn send_slow_command(&mut self, command: u8) -> Result<(), PORT::Error> {
        self.send_command(command)?;
        self.port.delay_ms(COMMAND_DELAY_MS);
        Ok(())
    }

    pub fn backlight(&self) -> bool {
        self.encoder.backlight()
    }

    pub fn set_backlight(&mut self, on: bool) -> Result<(), PORT::Error> {
        self.encoder.set_backlight(on);
        self.encoder.write_backlight(&mut self.port)
    }

    fn write_byte(&mut self, rs: RegisterSelect, value: u8) -> Result<(), PORT::Error> {
        self.encoder
            .write_byte(&mut self.port, rs, value)
            .map_err(|e| {
                #[cfg(feature = "defmt")]
                defmt::warn!("LCD write of {} byte {=u8:#x} failed", rs, value);
                e
            })
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use std::vec::Vec;

    use super::*;
    use crate::port::test_port::{PortCall, PortFailure, RecordingPort};

    /// Expected port calls for a nibble pulse, the way the encoder should produce them.
    fn nibble_calls(rs: RegisterSelect, nibble: u8) -> [PortCall; 2] {
        let frame = rs as u8 | 1 << 3 | (nibble & 0x0F) << 4;
        [PortCall::Write(frame | 1 << 2), PortCall::Write(frame)]
    }

    fn byte_calls(rs: RegisterSelect, value: u8) -> Vec<PortCall> {
        let mut calls = Vec::new();
        calls.extend(nibble_calls(rs, value >> 4));
        calls.extend(nibble_calls(rs, value & 0x0F));
        calls
    }

    #[test]
    fn test_init_command_table() {
        assert_eq!(LCD_INIT_COMMANDS, [0x28, 0x08, 0x02, 0x06, 0x0C, 0x01]);
    }

    #[test]
    fn test_init_sequence() {
        let mut driver = HD44780::new(RecordingPort::new());
        assert!(driver.init().is_ok());

        let mut expected = std::vec![PortCall::Init];
        expected.extend(nibble_calls(RegisterSelect::Command, 0x03));
        expected.extend(nibble_calls(RegisterSelect::Command, 0x03));
        expected.extend(nibble_calls(RegisterSelect::Command, 0x02));
        for command in LCD_INIT_COMMANDS {
            expected.extend(byte_calls(RegisterSelect::Command, command));
        }
        assert_eq!(driver.port().without_delays(), expected);
    }

    #[test]
    fn test_init_waits_for_power_on_before_first_write() {
        let mut driver = HD44780::new(RecordingPort::new());
        assert!(driver.init().is_ok());
        assert_eq!(
            driver.port().calls[..2],
            [PortCall::Init, PortCall::Delay(POWER_ON_DELAY_MS)]
        );
    }

    #[test]
    fn test_init_port_open_failure() {
        let mut port = RecordingPort::new();
        port.fail_init = true;
        let mut driver = HD44780::new(port);
        assert_eq!(driver.init(), Err(PortFailure));
        assert_eq!(driver.port().calls, std::vec![PortCall::Init]);
    }

    #[test]
    fn test_init_aborts_on_any_failed_write() {
        // 3 nibbles * 2 writes + 6 commands * 4 writes
        let total_writes = 3 * 2 + LCD_INIT_COMMANDS.len() * 4;
        for failing in 0..total_writes {
            let mut driver = HD44780::new(RecordingPort::failing_write(failing));
            assert_eq!(driver.init(), Err(PortFailure));
            assert_eq!(driver.port().written().len(), failing + 1);
        }
    }

    #[test]
    fn test_send_data_sets_register_select() {
        let mut driver = HD44780::new(RecordingPort::new());
        assert!(driver.send_data(b'a').is_ok());
        assert_eq!(
            driver.port().without_delays(),
            byte_calls(RegisterSelect::Data, b'a')
        );
    }

    #[test]
    fn test_set_backlight_off_clears_bit_in_later_frames() {
        let mut driver = HD44780::new(RecordingPort::new());
        assert!(driver.backlight());
        assert!(driver.set_backlight(false).is_ok());
        assert!(!driver.backlight());
        assert!(driver.send_command(LCD_CMD_CLEARDISPLAY).is_ok());

        let written = driver.release().written();
        assert_eq!(written[0], 0x00);
        assert!(written.iter().all(|byte| byte & (1 << 3) == 0));
    }
}
