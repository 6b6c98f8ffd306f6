pub mod i2c;

/// The hardware backend the LCD driver talks through. The driver never touches a bus directly:
/// every expander byte goes through `write_byte`, and every settle time through `delay_ms`.
///
/// Implementations own the actual transport. [`i2c::I2cPort`] covers the usual case of a
/// PCF8574 expander on an `embedded-hal` I2C bus.
pub trait LcdPort {
    /// Error reported by the backend when opening the port or writing a byte fails.
    type Error: core::fmt::Debug;

    /// Prepare the backend for use. Called once at the start of the display init sequence.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Write one byte to the expander's output pins.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T> LcdPort for &mut T
where
    T: LcdPort,
{
    type Error = T::Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        T::init(self)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error> {
        T::write_byte(self, byte)
    }

    fn delay_ms(&mut self, ms: u32) {
        T::delay_ms(self, ms)
    }
}

#[cfg(test)]
pub(crate) mod test_port {
    extern crate std;
    use std::vec::Vec;

    use super::LcdPort;

    #[derive(Debug, PartialEq, Clone, Copy)]
    pub struct PortFailure;

    /// One recorded interaction with the port.
    #[derive(Debug, PartialEq, Clone, Copy)]
    pub enum PortCall {
        Init,
        Write(u8),
        Delay(u32),
    }

    /// In-memory port that records every call and can be told to fail the port open or
    /// the n-th byte write (zero based).
    #[derive(Default)]
    pub struct RecordingPort {
        pub calls: Vec<PortCall>,
        pub fail_init: bool,
        pub fail_write_at: Option<usize>,
        writes: usize,
    }

    impl RecordingPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_write(index: usize) -> Self {
            Self {
                fail_write_at: Some(index),
                ..Self::default()
            }
        }

        /// Only the bytes written, delays and init dropped.
        pub fn written(&self) -> Vec<u8> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    PortCall::Write(byte) => Some(*byte),
                    _ => None,
                })
                .collect()
        }

        /// Every call except delays, which the driver is free to place as it likes.
        pub fn without_delays(&self) -> Vec<PortCall> {
            self.calls
                .iter()
                .copied()
                .filter(|call| !matches!(call, PortCall::Delay(_)))
                .collect()
        }
    }

    impl LcdPort for RecordingPort {
        type Error = PortFailure;

        fn init(&mut self) -> Result<(), PortFailure> {
            self.calls.push(PortCall::Init);
            if self.fail_init {
                return Err(PortFailure);
            }
            Ok(())
        }

        fn write_byte(&mut self, byte: u8) -> Result<(), PortFailure> {
            self.calls.push(PortCall::Write(byte));
            let index = self.writes;
            self.writes += 1;
            if self.fail_write_at == Some(index) {
                return Err(PortFailure);
            }
            Ok(())
        }

        fn delay_ms(&mut self, ms: u32) {
            self.calls.push(PortCall::Delay(ms));
        }
    }
}
