//! Byte-level transport contract between the frame buffer and the panel.
//!
//! The core only ever talks to a [`BusSink`]: one byte at a time, tagged as
//! either a command or display data. Any [`WriteOnlyDataCommand`] (for
//! example `display_interface_spi::SPIInterface` over a Linux spidev) is a
//! sink, and [`RecordingSink`] captures the stream in memory for tests.

use display_interface::{DataFormat, DisplayError, WriteOnlyDataCommand};

/// Destination for controller commands and display data.
pub trait BusSink {
    /// Transport failure type.
    type Error;

    /// Send one byte with the data/command line in command mode.
    fn send_command(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send one byte with the data/command line in data mode.
    fn send_data(&mut self, byte: u8) -> Result<(), Self::Error>;
}

impl<DI> BusSink for DI
where
    DI: WriteOnlyDataCommand,
{
    type Error = DisplayError;

    fn send_command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.send_commands(DataFormat::U8(&[byte]))
    }

    fn send_data(&mut self, byte: u8) -> Result<(), DisplayError> {
        WriteOnlyDataCommand::send_data(self, DataFormat::U8(&[byte]))
    }
}

/// A single byte as it crossed the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusWrite {
    Command(u8),
    Data(u8),
}

/// In-memory [`BusSink`] that records every write in order.
///
/// Optionally fails with [`DisplayError::BusWriteError`] once a set number
/// of writes has succeeded, to exercise error propagation.
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Vec<BusWrite>,
    fail_after: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `n` writes and rejects every write after that.
    pub fn failing_after(n: usize) -> Self {
        Self {
            writes: Vec::new(),
            fail_after: Some(n),
        }
    }

    /// Everything written so far, in bus order.
    pub fn writes(&self) -> &[BusWrite] {
        &self.writes
    }

    /// Only the command bytes, in bus order.
    pub fn commands(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                BusWrite::Command(b) => Some(*b),
                BusWrite::Data(_) => None,
            })
            .collect()
    }

    /// Only the data bytes, in bus order.
    pub fn data(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                BusWrite::Data(b) => Some(*b),
                BusWrite::Command(_) => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }

    fn push(&mut self, write: BusWrite) -> Result<(), DisplayError> {
        if self.fail_after.is_some_and(|n| self.writes.len() >= n) {
            return Err(DisplayError::BusWriteError);
        }
        self.writes.push(write);
        Ok(())
    }
}

impl BusSink for RecordingSink {
    type Error = DisplayError;

    fn send_command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.push(BusWrite::Command(byte))
    }

    fn send_data(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.push(BusWrite::Data(byte))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal `WriteOnlyDataCommand` to check the blanket impl tags bytes.
    #[derive(Default)]
    struct Tagged {
        log: Vec<(bool, Vec<u8>)>,
    }

    impl WriteOnlyDataCommand for Tagged {
        fn send_commands(&mut self, cmd: DataFormat<'_>) -> Result<(), DisplayError> {
            match cmd {
                DataFormat::U8(bytes) => self.log.push((true, bytes.to_vec())),
                _ => return Err(DisplayError::DataFormatNotImplemented),
            }
            Ok(())
        }

        fn send_data(&mut self, buf: DataFormat<'_>) -> Result<(), DisplayError> {
            match buf {
                DataFormat::U8(bytes) => self.log.push((false, bytes.to_vec())),
                _ => return Err(DisplayError::DataFormatNotImplemented),
            }
            Ok(())
        }
    }

    #[test]
    fn blanket_impl_sends_one_byte_per_write() {
        let mut di = Tagged::default();
        BusSink::send_command(&mut di, 0xAF).unwrap();
        BusSink::send_data(&mut di, 0x55).unwrap();
        assert_eq!(di.log, vec![(true, vec![0xAF]), (false, vec![0x55])]);
    }

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.send_command(0xB0).unwrap();
        sink.send_data(0x01).unwrap();
        sink.send_command(0x10).unwrap();
        assert_eq!(
            sink.writes(),
            &[
                BusWrite::Command(0xB0),
                BusWrite::Data(0x01),
                BusWrite::Command(0x10)
            ]
        );
        assert_eq!(sink.commands(), vec![0xB0, 0x10]);
        assert_eq!(sink.data(), vec![0x01]);
    }

    #[test]
    fn failing_sink_rejects_after_limit() {
        let mut sink = RecordingSink::failing_after(1);
        assert!(sink.send_command(0xAE).is_ok());
        assert!(matches!(
            sink.send_data(0x00),
            Err(DisplayError::BusWriteError)
        ));
        assert_eq!(sink.writes().len(), 1);
    }
}
