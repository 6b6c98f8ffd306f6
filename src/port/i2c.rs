use embedded_hal::{delay::DelayNs, i2c};

use super::LcdPort;

/// Default I2C address of the common PCF8574T LCD backpacks.
pub const PCF8574T_DEFAULT_ADDRESS: u8 = 0x27;

/// [`LcdPort`] over an `embedded-hal` I2C bus and delay provider. Each expander byte is a
/// single-byte I2C write to the configured address.
///
/// It is recommended that the `i2c` object be wrapped in an `embedded_hal_bus::i2c::CriticalSectionDevice`
/// if the bus is shared with other peripherals.
pub struct I2cPort<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    i2c: I2C,
    address: u8,
    delay: DELAY,
}

impl<I2C, DELAY> I2cPort<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    /// Create a port at the default PCF8574T address.
    pub fn new(i2c: I2C, delay: DELAY) -> Self {
        Self::new_with_address(i2c, PCF8574T_DEFAULT_ADDRESS, delay)
    }

    /// Create a port at a specific I2C address.
    pub fn new_with_address(i2c: I2C, address: u8, delay: DELAY) -> Self {
        Self {
            i2c,
            address,
            delay,
        }
    }

    /// returns configured i2c address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// returns a reference to the I2C peripheral. mostly needed for testing
    pub fn i2c(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Give back the I2C peripheral and delay provider.
    pub fn release(self) -> (I2C, DELAY) {
        (self.i2c, self.delay)
    }
}

impl<I2C, DELAY> LcdPort for I2cPort<I2C, DELAY>
where
    I2C: i2c::I2c,
    DELAY: DelayNs,
{
    type Error = I2C::Error;

    /// The PCF8574 has no configuration registers; its pins are usable right after power up.
    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[byte])
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
