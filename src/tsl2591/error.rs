use std::fmt;

/// Bus transaction shape that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadByte,
    ReadWord,
    WriteByte,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::ReadByte => "byte read",
            Operation::ReadWord => "word read",
            Operation::WriteByte => "byte write",
        })
    }
}

/// One or both channels reached the saturation count for the current integration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("light channels overflowed (ch0={channel0:#06x}, ch1={channel1:#06x}); reduce gain or integration time")]
pub struct Overflow {
    pub channel0: u16,
    pub channel1: u16,
}

/// Errors from the sensor driver, generic over the bus error type.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    #[error("I2C {operation} failed! register={register:#04x}, error={cause:?}")]
    Transport {
        operation: Operation,
        register: u8,
        cause: E,
    },

    #[error("Expected TSL2591 device ID = {expected:#04x}, got {actual:#04x}")]
    UnexpectedDeviceId { expected: u8, actual: u8 },

    #[error(transparent)]
    Overflow(#[from] Overflow),
}
