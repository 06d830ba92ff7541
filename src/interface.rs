//! Register-level access to the sensor.

use embedded_hal::i2c;

/// Register access primitives the driver is built on.
///
/// [`I2cInterface`] implements this for any `embedded-hal` I2C bus. Implement
/// it yourself to run the driver over a different transport or a test double.
pub trait RegisterInterface {
    /// Transport-specific error.
    type Error;

    /// Reads a single register.
    fn read_register(&mut self, reg: u8) -> Result<u8, Self::Error>;

    /// Writes a single register.
    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error>;

    /// Reads `buffer.len()` consecutive registers starting at `reg`.
    fn read_burst(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Self::Error>;
}

/// I2C transport addressed to one sensor.
#[derive(Debug)]
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C>
where
    I2C: i2c::I2c,
{
    /// `address` is the 7-bit slave address, `0x76` or `0x77` depending on SDO.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Gives back the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> RegisterInterface for I2cInterface<I2C>
where
    I2C: i2c::I2c,
{
    type Error = I2C::Error;

    fn read_register(&mut self, reg: u8) -> Result<u8, Self::Error> {
        let mut buffer = [0];
        self.i2c.write_read(self.address, &[reg], &mut buffer)?;
        Ok(buffer[0])
    }

    fn write_register(&mut self, reg: u8, value: u8) -> Result<(), Self::Error> {
        self.i2c.write(self.address, &[reg, value])
    }

    // Repeated start between the address write and the read, stop at the end.
    fn read_burst(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[reg], buffer)
    }
}
