/// Register-level I2C helpers: every transaction starts with the command byte for the register.
use embedded_hal::i2c::I2c;

use super::error::{Error, Operation};
use super::register::{I2C_ADDR, Register};

fn transport<E>(operation: Operation, register: Register) -> impl FnOnce(E) -> Error<E> {
    move |cause| Error::Transport {
        operation,
        register: register.addr(),
        cause,
    }
}

pub fn read_u8<I: I2c>(i2c: &mut I, register: Register) -> Result<u8, Error<I::Error>> {
    let mut buf = [0u8; 1];
    i2c.write_read(I2C_ADDR, &[register.command()], &mut buf)
        .map_err(transport(Operation::ReadByte, register))?;
    log::debug!("read {register:?} -> {:#04x}", buf[0]);
    Ok(buf[0])
}

pub fn write_u8<I: I2c>(i2c: &mut I, register: Register, value: u8) -> Result<(), Error<I::Error>> {
    i2c.write(I2C_ADDR, &[register.command(), value])
        .map_err(transport(Operation::WriteByte, register))?;
    log::debug!("wrote {register:?} <- {value:#04x}");
    Ok(())
}

/// Two-byte read, low byte first.
pub fn read_u16<I: I2c>(i2c: &mut I, register: Register) -> Result<u16, Error<I::Error>> {
    let mut buf = [0u8; 2];
    i2c.write_read(I2C_ADDR, &[register.command()], &mut buf)
        .map_err(transport(Operation::ReadWord, register))?;
    let value = u16::from_le_bytes(buf);
    log::debug!("read {register:?} -> {value:#06x}");
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    #[test]
    fn read_byte_frames_command() {
        let expectations = [I2cTransaction::write_read(
            I2C_ADDR,
            vec![0xB2],
            vec![0x50],
        )];
        let mut i2c = I2cMock::new(&expectations);

        assert_eq!(0x50, read_u8(&mut i2c, Register::DeviceId).unwrap());
        i2c.done();
    }

    #[test]
    fn write_byte_sends_command_and_value() {
        let expectations = [I2cTransaction::write(I2C_ADDR, vec![0xA1, 0x15])];
        let mut i2c = I2cMock::new(&expectations);

        write_u8(&mut i2c, Register::Control, 0x15).unwrap();
        i2c.done();
    }

    #[test]
    fn read_word_is_little_endian() {
        let expectations = [I2cTransaction::write_read(
            I2C_ADDR,
            vec![0xB4],
            vec![0x33, 0x12],
        )];
        let mut i2c = I2cMock::new(&expectations);

        assert_eq!(0x1233, read_u16(&mut i2c, Register::Chan0Low).unwrap());
        i2c.done();
    }

    #[test]
    fn transport_error_carries_context() {
        let expectations = [
            I2cTransaction::write(I2C_ADDR, vec![0xA0, 0x00]).with_error(ErrorKind::Other)
        ];
        let mut i2c = I2cMock::new(&expectations);

        let err = write_u8(&mut i2c, Register::Enable, 0x00).unwrap_err();
        match err {
            Error::Transport {
                operation,
                register,
                cause,
            } => {
                assert_eq!(Operation::WriteByte, operation);
                assert_eq!(0x00, register);
                assert_eq!(ErrorKind::Other, cause);
            }
            other => panic!("unexpected error {other:?}"),
        }
        i2c.done();
    }

    #[test]
    fn word_read_error_names_operation() {
        let expectations = [
            I2cTransaction::write_read(I2C_ADDR, vec![0xB6], vec![0x00, 0x00])
                .with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);

        let err = read_u16(&mut i2c, Register::Chan1Low).unwrap_err();
        assert_eq!(
            "I2C word read failed! register=0x16, error=Other",
            err.to_string()
        );
        i2c.done();
    }
}
