#![cfg_attr(not(test), no_std)]

//! # BME280 Environmental Sensor Driver
//!
//! A type-safe, `no_std` driver for the Bosch BME280 built on `embedded-hal`.
//! The typestate pattern ensures the chip is identified and its calibration is
//! loaded before any measurement can be requested.
//!
//! ## Features
//! - **Datasheet compensation**: the Bosch integer formulas, bit for bit.
//! - **Profiles**: the datasheet's recommended operating modes as presets.
//! - **Bounded waits**: status polling gives up with [`Bme280Error::Timeout`].
//!
//! ## Units
//! - **Temperature**: °C
//! - **Pressure**: Pa
//! - **Humidity**: %RH
//!
//! ## Example
//! ```ignore
//! use bme280_driver::{Bme280, Profile, ADDRESS_PRIMARY};
//!
//! let mut bme280 = Bme280::new(i2c, ADDRESS_PRIMARY).init()?;
//! bme280.apply_profile(Profile::Indoor)?;
//!
//! let m = bme280.read_measurement(&mut delay)?;
//! ```

mod fmt;

mod calc;
pub mod interface;
mod regs;
mod settings;

use core::marker::PhantomData;
use embedded_hal::{delay::DelayNs, i2c};

pub use calc::{CalibrationData, FineTemperature};
pub use interface::{I2cInterface, RegisterInterface};
pub use settings::*;

/// I2C address with SDO tied to GND.
pub const ADDRESS_PRIMARY: u8 = 0x76;
/// I2C address with SDO tied to VDDIO.
pub const ADDRESS_SECONDARY: u8 = 0x77;
/// Expected value of the chip-ID register.
pub const CHIP_ID: u8 = regs::CHIP_ID;

// --- Typestates ---

/// Sensor has been created but not yet identified and calibrated.
pub struct Uninitialized;
/// Sensor is identified, calibrated and configured.
pub struct Ready;

/// Error types for the BME280 driver.
pub mod error {
    use crate::ConfigStep;

    /// Errors that can occur during communication or configuration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub enum Bme280Error<E> {
        /// Bus transfer failed.
        Bus(E),
        /// The chip-ID register did not identify a BME280.
        NotInitialized,
        /// The measurement did not complete within the poll budget.
        Timeout,
        /// A configuration sequence stopped at `step`. Earlier steps were applied.
        ConfigAborted { step: ConfigStep, cause: E },
    }

    /// Result type alias for BME280 operations.
    pub type Result<T, E> = core::result::Result<T, Bme280Error<E>>;
}

pub use error::Bme280Error;

/// Content of the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// A conversion is running.
    pub measuring: bool,
    /// NVM data is being copied to the image registers.
    pub im_update: bool,
}

impl Status {
    fn from_reg(value: u8) -> Self {
        Self {
            measuring: value & regs::STATUS_MEASURING != 0,
            im_update: value & regs::STATUS_IM_UPDATE != 0,
        }
    }
}

/// Compensated results of one measurement cycle.
///
/// Channels skipped by the current oversampling settings hold meaningless
/// values.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// °C
    pub temperature: f32,
    /// Pa
    pub pressure: f32,
    /// %RH
    pub humidity: f32,
}

/// The main BME280 driver structure.
///
/// Use `Bme280::new(...)` to start, then [`Bme280::init`]. The `STATE`
/// parameter tracks initialization at compile time.
#[derive(Debug)]
pub struct Bme280<B, STATE> {
    bus: B,
    calib_data: CalibrationData,
    /// `t_fine` of the most recent temperature compensation.
    fine: Option<FineTemperature>,
    poll_policy: PollPolicy,
    _state: PhantomData<STATE>,
}

impl<I2C> Bme280<I2cInterface<I2C>, Uninitialized>
where
    I2C: i2c::I2c,
{
    /// Creates a driver talking to the sensor at `address` (`0x76` or `0x77`).
    ///
    /// This does not communicate with the sensor yet.
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self::with_interface(I2cInterface::new(i2c, address))
    }
}

impl<B> Bme280<B, Uninitialized>
where
    B: RegisterInterface,
{
    /// Creates a driver on top of a custom register transport.
    pub fn with_interface(bus: B) -> Self {
        Bme280 {
            bus,
            calib_data: CalibrationData::default(),
            fine: None,
            poll_policy: PollPolicy::default(),
            _state: PhantomData,
        }
    }

    /// Identifies the chip, loads its calibration and applies [`Profile::Weather`].
    ///
    /// # Errors
    /// [`Bme280Error::NotInitialized`] if the chip-ID does not match; nothing
    /// else is sent to the device in that case. Bus failures while loading
    /// calibration or configuring are passed on.
    pub fn init(mut self) -> error::Result<Bme280<B, Ready>, B::Error> {
        let chip_id = self.chip_id()?;
        if chip_id != regs::CHIP_ID {
            error!("BME280 chip id mismatch: {}", chip_id);
            return Err(Bme280Error::NotInitialized);
        }

        let calib_data = self.read_calibration()?;
        debug!("BME280 calibration loaded");

        let mut sensor = Bme280 {
            bus: self.bus,
            calib_data,
            fine: None,
            poll_policy: self.poll_policy,
            _state: PhantomData,
        };
        sensor.apply_profile(Profile::default())?;

        info!("BME280 initialized");
        Ok(sensor)
    }

    /// Reads both calibration blocks and decodes them.
    fn read_calibration(&mut self) -> error::Result<CalibrationData, B::Error> {
        use regs::calib;

        let mut image = CalibrationImage([0u8; calib::TOTAL_SIZE]);

        let (block_a, block_b) = image.0.split_at_mut(calib::SIZES[0]);
        self.read_into(calib::ADDR[0], block_a)?;
        self.read_into(calib::ADDR[1], block_b)?;

        Ok(CalibrationData::from_image(&image.0))
    }
}

/// Raw calibration bytes, wiped on drop on every return path.
struct CalibrationImage([u8; regs::calib::TOTAL_SIZE]);

impl CalibrationImage {
    fn wipe(&mut self) {
        for byte in self.0.iter_mut() {
            // SAFETY: `byte` is a valid, aligned, exclusive reference.
            unsafe { core::ptr::write_volatile(byte, 0) };
        }
        core::sync::atomic::compiler_fence(core::sync::atomic::Ordering::SeqCst);
    }
}

impl Drop for CalibrationImage {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl<B, STATE> Bme280<B, STATE>
where
    B: RegisterInterface,
{
    /// Replaces the status polling limits used by the measurement functions.
    pub fn set_poll_policy(&mut self, policy: PollPolicy) {
        self.poll_policy = policy;
    }

    /// Status polling limits currently in use.
    pub fn poll_policy(&self) -> PollPolicy {
        self.poll_policy
    }

    /// Gives back the register transport.
    pub fn release(self) -> B {
        self.bus
    }

    /// Reads the chip-ID register (expected value: `0x60`).
    pub fn chip_id(&mut self) -> error::Result<u8, B::Error> {
        self.read_reg_byte(regs::ADDR_CHIP_ID)
    }

    /// Reads data from a starting register address into a provided buffer.
    fn read_into(&mut self, reg_address: u8, buffer: &mut [u8]) -> error::Result<(), B::Error> {
        self.bus
            .read_burst(reg_address, buffer)
            .map_err(Bme280Error::Bus)
    }

    /// Reads a single byte from a specific register address.
    fn read_reg_byte(&mut self, reg_address: u8) -> error::Result<u8, B::Error> {
        self.bus
            .read_register(reg_address)
            .map_err(Bme280Error::Bus)
    }

    fn write_reg(&mut self, reg_address: u8, value: u8) -> error::Result<(), B::Error> {
        self.bus
            .write_register(reg_address, value)
            .map_err(Bme280Error::Bus)
    }

    /// Replaces the `mask` field of a register with `bits`, keeping all other bits.
    ///
    /// A failed read means nothing is written.
    fn modify_reg(&mut self, reg_address: u8, mask: u8, bits: u8) -> Result<(), B::Error> {
        let register = self.bus.read_register(reg_address)?;
        self.bus
            .write_register(reg_address, (register & !mask) | (bits & mask))
    }
}

impl<B> Bme280<B, Ready>
where
    B: RegisterInterface,
{
    /// Calibration coefficients read during [`Bme280::init`].
    pub fn calibration(&self) -> &CalibrationData {
        &self.calib_data
    }

    /// `t_fine` of the last temperature compensation, if any.
    pub fn fine_temperature(&self) -> Option<FineTemperature> {
        self.fine
    }

    // --- Configuration ---

    /// Sets the oversampling of one channel.
    ///
    /// Humidity changes only take effect after the next write of `ctrl_meas`,
    /// e.g. through [`Bme280::set_power_mode`].
    pub fn set_oversampling(
        &mut self,
        channel: Channel,
        oversampling: Oversampling,
    ) -> error::Result<(), B::Error> {
        let (reg, mask, shift) = channel.field();
        self.modify_reg(reg, mask, (oversampling as u8) << shift)
            .map_err(Bme280Error::Bus)
    }

    /// Configures the IIR filter coefficient.
    pub fn set_iir_filter(&mut self, filter: IIRFilter) -> error::Result<(), B::Error> {
        self.modify_reg(
            regs::ADDR_CONFIG,
            regs::FILTER_MASK,
            (filter as u8) << regs::FILTER_SHIFT,
        )
        .map_err(Bme280Error::Bus)
    }

    /// Configures the inactive time between measurements in normal mode.
    pub fn set_standby_duration(&mut self, standby: StandbyDuration) -> error::Result<(), B::Error> {
        self.modify_reg(
            regs::ADDR_CONFIG,
            regs::T_SB_MASK,
            (standby as u8) << regs::T_SB_SHIFT,
        )
        .map_err(Bme280Error::Bus)
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> error::Result<(), B::Error> {
        self.modify_reg(
            regs::ADDR_CTRL_MEAS,
            regs::MODE_MASK,
            (mode as u8) << regs::MODE_SHIFT,
        )
        .map_err(Bme280Error::Bus)
    }

    pub fn power_mode(&mut self) -> error::Result<PowerMode, B::Error> {
        let ctrl_meas = self.read_reg_byte(regs::ADDR_CTRL_MEAS)?;
        Ok(PowerMode::from_bits(ctrl_meas >> regs::MODE_SHIFT))
    }

    /// Applies a full sensor configuration, one register update per [`ConfigStep`].
    ///
    /// Stops at the first failing step and reports it. Steps that already
    /// succeeded stay applied.
    pub fn configure_sensor(&mut self, config: &Config) -> error::Result<(), B::Error> {
        for step in ConfigStep::ALL {
            if let Err(cause) = self.apply_step(step, config) {
                warn!("BME280 configuration aborted at {:?}", step);
                return Err(Bme280Error::ConfigAborted { step, cause });
            }
        }
        Ok(())
    }

    fn apply_step(&mut self, step: ConfigStep, config: &Config) -> Result<(), B::Error> {
        let osrs = &config.osrs_config;
        let (reg, mask, bits) = match step {
            ConfigStep::TempOversampling => {
                let (reg, mask, shift) = Channel::Temperature.field();
                (reg, mask, (osrs.temp_osrs as u8) << shift)
            }
            ConfigStep::PresOversampling => {
                let (reg, mask, shift) = Channel::Pressure.field();
                (reg, mask, (osrs.pres_osrs as u8) << shift)
            }
            ConfigStep::HumOversampling => {
                let (reg, mask, shift) = Channel::Humidity.field();
                (reg, mask, (osrs.hum_osrs as u8) << shift)
            }
            ConfigStep::IIRFilter => (
                regs::ADDR_CONFIG,
                regs::FILTER_MASK,
                (config.iir_filter as u8) << regs::FILTER_SHIFT,
            ),
            ConfigStep::Standby => (
                regs::ADDR_CONFIG,
                regs::T_SB_MASK,
                (config.standby as u8) << regs::T_SB_SHIFT,
            ),
            ConfigStep::PowerMode => (
                regs::ADDR_CTRL_MEAS,
                regs::MODE_MASK,
                (config.mode as u8) << regs::MODE_SHIFT,
            ),
        };
        self.modify_reg(reg, mask, bits)
    }

    /// Applies one of the predefined operating profiles.
    pub fn apply_profile(&mut self, profile: Profile) -> error::Result<(), B::Error> {
        debug!("BME280 applying profile {:?}", profile);
        self.configure_sensor(&profile.config())
    }

    /// Reads the current configuration back from the sensor.
    pub fn config(&mut self) -> error::Result<Config, B::Error> {
        let mut buffer = [0u8; 4];

        // Burst read ctrl_hum (0xF2) through config (0xF5)
        self.read_into(regs::ADDR_CTRL_HUM, &mut buffer)?;

        Ok(Config::from_regs(buffer))
    }

    pub fn status(&mut self) -> error::Result<Status, B::Error> {
        Ok(Status::from_reg(self.read_reg_byte(regs::ADDR_STATUS)?))
    }

    /// Performs a soft-reset of the sensor.
    ///
    /// All configuration registers return to their power-on values. The
    /// calibration stays valid.
    pub fn soft_reset(&mut self, delay: &mut impl DelayNs) -> error::Result<(), B::Error> {
        self.write_reg(regs::ADDR_RESET, regs::SOFT_RESET_CMD)?;
        delay.delay_ms(2);
        Ok(())
    }

    // --- Measurements ---

    /// Triggers a forced measurement if the sensor is not in normal mode and
    /// waits until the result registers hold fresh data.
    fn prepare_measurement(&mut self, delay: &mut impl DelayNs) -> error::Result<(), B::Error> {
        let ctrl_meas = self.read_reg_byte(regs::ADDR_CTRL_MEAS)?;

        if PowerMode::from_bits(ctrl_meas >> regs::MODE_SHIFT) != PowerMode::Normal {
            let forced = (ctrl_meas & !regs::MODE_MASK) | (PowerMode::Forced as u8);
            self.write_reg(regs::ADDR_CTRL_MEAS, forced)?;
        }

        self.wait_for_measurement(delay)
    }

    /// Polls the "measuring" bit within the limits of the poll policy.
    fn wait_for_measurement(&mut self, delay: &mut impl DelayNs) -> error::Result<(), B::Error> {
        let policy = self.poll_policy;

        for _ in 0..policy.max_polls {
            if !self.status()?.measuring {
                return Ok(());
            }
            delay.delay_us(policy.interval_us);
        }

        error!("BME280 measurement timed out after {} polls", policy.max_polls);
        Err(Bme280Error::Timeout)
    }

    /// Compensates a raw temperature block and remembers its `t_fine`.
    fn compensate_temperature(&mut self, raw: &[u8]) -> (f32, FineTemperature) {
        let (celsius, t_fine) = self
            .calib_data
            .compensate_temperature(calc::raw_20bit(raw));
        self.fine = Some(t_fine);
        (celsius, t_fine)
    }

    /// Measures the temperature in °C.
    pub fn read_temperature(&mut self, delay: &mut impl DelayNs) -> error::Result<f32, B::Error> {
        self.prepare_measurement(delay)?;

        let mut buffer = [0u8; regs::TEMP_SIZE];
        self.read_into(regs::ADDR_TEMP_MSB, &mut buffer)?;

        let (celsius, _) = self.compensate_temperature(&buffer);
        trace!("BME280 temperature {}", celsius);
        Ok(celsius)
    }

    /// Measures the pressure in Pa.
    ///
    /// Pressure and temperature come from one burst, so both belong to the
    /// same conversion even in normal mode. A result of exactly `0.0` means
    /// the calibration data is unusable.
    pub fn read_pressure(&mut self, delay: &mut impl DelayNs) -> error::Result<f32, B::Error> {
        self.prepare_measurement(delay)?;

        // press_msb (0xF7) .. temp_xlsb (0xFC)
        let mut buffer = [0u8; regs::PRESS_SIZE + regs::TEMP_SIZE];
        self.read_into(regs::ADDR_PRESS_MSB, &mut buffer)?;

        let (press, temp) = buffer.split_at(regs::PRESS_SIZE);
        let (_, t_fine) = self.compensate_temperature(temp);

        let pascal = self
            .calib_data
            .compensate_pressure(calc::raw_20bit(press), t_fine);
        trace!("BME280 pressure {}", pascal);
        Ok(pascal)
    }

    /// Measures the relative humidity in %RH.
    ///
    /// Temperature and humidity come from one burst, so both belong to the
    /// same conversion even in normal mode.
    pub fn read_humidity(&mut self, delay: &mut impl DelayNs) -> error::Result<f32, B::Error> {
        self.prepare_measurement(delay)?;

        // temp_msb (0xFA) .. hum_lsb (0xFE)
        let mut buffer = [0u8; regs::TEMP_SIZE + regs::HUM_SIZE];
        self.read_into(regs::ADDR_TEMP_MSB, &mut buffer)?;

        let (temp, hum) = buffer.split_at(regs::TEMP_SIZE);
        let (_, t_fine) = self.compensate_temperature(temp);

        let humidity = self
            .calib_data
            .compensate_humidity(calc::raw_16bit(hum), t_fine);
        trace!("BME280 humidity {}", humidity);
        Ok(humidity)
    }

    /// Measures all three channels from one burst read.
    pub fn read_measurement(
        &mut self,
        delay: &mut impl DelayNs,
    ) -> error::Result<Measurement, B::Error> {
        self.prepare_measurement(delay)?;

        // press_msb (0xF7) .. hum_lsb (0xFE)
        let mut buffer = [0u8; regs::DATA_SIZE];
        self.read_into(regs::ADDR_PRESS_MSB, &mut buffer)?;

        let (press, rest) = buffer.split_at(regs::PRESS_SIZE);
        let (temp, hum) = rest.split_at(regs::TEMP_SIZE);

        let (temperature, t_fine) = self.compensate_temperature(temp);

        Ok(Measurement {
            temperature,
            pressure: self
                .calib_data
                .compensate_pressure(calc::raw_20bit(press), t_fine),
            humidity: self
                .calib_data
                .compensate_humidity(calc::raw_16bit(hum), t_fine),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::tests::REFERENCE_IMAGE;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

    const ADDR: u8 = ADDRESS_PRIMARY;

    fn read(reg: u8, data: &[u8]) -> Transaction {
        Transaction::write_read(ADDR, vec![reg], data.to_vec())
    }

    fn write(reg: u8, value: u8) -> Transaction {
        Transaction::write(ADDR, vec![reg, value])
    }

    /// Read-modify-write pairs of the weather profile, starting from reset
    /// values. Every read returns what the previous write left behind.
    fn weather_profile() -> Vec<Transaction> {
        vec![
            read(0xF4, &[0x00]),
            write(0xF4, 0x20),
            read(0xF4, &[0x20]),
            write(0xF4, 0x24),
            read(0xF2, &[0x00]),
            write(0xF2, 0x01),
            read(0xF5, &[0x00]),
            write(0xF5, 0x00),
            read(0xF5, &[0x00]),
            write(0xF5, 0xA0),
            read(0xF4, &[0x24]),
            write(0xF4, 0x25),
        ]
    }

    fn init_sequence() -> Vec<Transaction> {
        let mut expectations = vec![
            read(0xD0, &[0x60]),
            read(0x88, &REFERENCE_IMAGE[..26]),
            read(0xE1, &REFERENCE_IMAGE[26..]),
        ];
        expectations.extend(weather_profile());
        expectations
    }

    fn ready(extra: Vec<Transaction>) -> (Bme280<I2cInterface<I2cMock>, Ready>, I2cMock) {
        let mut expectations = init_sequence();
        expectations.extend(extra);

        let i2c = I2cMock::new(&expectations);
        let handle = i2c.clone();
        let sensor = Bme280::new(i2c, ADDR).init().unwrap();
        (sensor, handle)
    }

    #[test]
    fn init_loads_calibration_and_applies_weather_profile() {
        let (sensor, mut i2c) = ready(vec![]);

        assert_eq!(sensor.calibration().dig_t1, 27504);
        assert_eq!(sensor.calibration().dig_h4, 313);
        assert_eq!(sensor.fine_temperature(), None);

        i2c.done();
    }

    #[test]
    fn init_rejects_wrong_chip_id_without_writing() {
        let i2c = I2cMock::new(&[read(0xD0, &[0x00])]);
        let mut handle = i2c.clone();

        let result = Bme280::new(i2c, ADDR).init();
        assert_eq!(result.err(), Some(Bme280Error::NotInitialized));

        handle.done();
    }

    #[test]
    fn init_fails_on_calibration_read_error() {
        let i2c = I2cMock::new(&[
            read(0xD0, &[0x60]),
            read(0x88, &REFERENCE_IMAGE[..26]).with_error(ErrorKind::Other),
        ]);
        let mut handle = i2c.clone();

        let result = Bme280::new(i2c, ADDR).init();
        assert_eq!(result.err(), Some(Bme280Error::Bus(ErrorKind::Other)));

        handle.done();
    }

    #[test]
    fn init_fails_on_second_calibration_block() {
        let i2c = I2cMock::new(&[
            read(0xD0, &[0x60]),
            read(0x88, &REFERENCE_IMAGE[..26]),
            read(0xE1, &REFERENCE_IMAGE[26..]).with_error(ErrorKind::Other),
        ]);
        let mut handle = i2c.clone();

        let result = Bme280::new(i2c, ADDR).init();
        assert_eq!(result.err(), Some(Bme280Error::Bus(ErrorKind::Other)));

        handle.done();
    }

    #[test]
    fn calibration_image_is_wiped() {
        let mut image = CalibrationImage(REFERENCE_IMAGE);

        image.wipe();

        assert_eq!(image.0, [0u8; 33]);
    }

    #[test]
    fn weather_profile_register_writes() {
        let mut expectations = init_sequence();
        // Same sequence again, this time with unrelated bits set that must survive.
        expectations.extend(vec![
            read(0xF4, &[0x01]),
            write(0xF4, 0x21),
            read(0xF4, &[0xE1]),
            write(0xF4, 0xE5),
            read(0xF2, &[0xF8]),
            write(0xF2, 0xF9),
            read(0xF5, &[0x1D]),
            write(0xF5, 0x01),
            read(0xF5, &[0x01]),
            write(0xF5, 0xA1),
            read(0xF4, &[0x27]),
            write(0xF4, 0x25),
        ]);
        let i2c = I2cMock::new(&expectations);
        let mut handle = i2c.clone();
        let mut sensor = Bme280::new(i2c, ADDR).init().unwrap();

        sensor.apply_profile(Profile::Weather).unwrap();

        handle.done();
    }

    #[test]
    fn profile_stops_at_first_failing_step() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x25]),
            write(0xF4, 0x45),
            read(0xF4, &[0x45]),
            write(0xF4, 0x55),
            read(0xF2, &[0x01]).with_error(ErrorKind::Other),
        ]);

        let result = sensor.apply_profile(Profile::Indoor);
        assert_eq!(
            result,
            Err(Bme280Error::ConfigAborted {
                step: ConfigStep::HumOversampling,
                cause: ErrorKind::Other,
            })
        );

        i2c.done();
    }

    #[test]
    fn failed_write_aborts_at_power_mode() {
        let mut expectations = weather_profile();
        let last = expectations.len() - 1;
        expectations[last] = write(0xF4, 0x25).with_error(ErrorKind::Other);
        let (mut sensor, mut i2c) = ready(expectations);

        assert_eq!(
            sensor.apply_profile(Profile::Weather),
            Err(Bme280Error::ConfigAborted {
                step: ConfigStep::PowerMode,
                cause: ErrorKind::Other,
            })
        );

        i2c.done();
    }

    #[test]
    fn failed_read_skips_write() {
        let (mut sensor, mut i2c) =
            ready(vec![read(0xF5, &[0x00]).with_error(ErrorKind::Other)]);

        assert_eq!(
            sensor.set_iir_filter(IIRFilter::X4),
            Err(Bme280Error::Bus(ErrorKind::Other))
        );

        i2c.done();
    }

    #[test]
    fn setters_modify_only_their_field() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF2, &[0xF8]),
            write(0xF2, 0xFD),
            read(0xF5, &[0xA1]),
            write(0xF5, 0x61),
            read(0xF4, &[0x24]),
            write(0xF4, 0x27),
            read(0xF4, &[0x27]),
        ]);

        sensor
            .set_oversampling(Channel::Humidity, Oversampling::X16)
            .unwrap();
        sensor
            .set_standby_duration(StandbyDuration::Ms250)
            .unwrap();
        sensor.set_power_mode(PowerMode::Normal).unwrap();
        assert_eq!(sensor.power_mode().unwrap(), PowerMode::Normal);

        i2c.done();
    }

    #[test]
    fn config_is_read_back_in_one_burst() {
        let (mut sensor, mut i2c) = ready(vec![read(0xF2, &[0x01, 0x00, 0x25, 0xA0])]);

        assert_eq!(sensor.config().unwrap(), Profile::Weather.config());

        i2c.done();
    }

    #[test]
    fn temperature_forces_measurement_from_sleep() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x24]),
            write(0xF4, 0x25),
            read(0xF3, &[0x08]),
            read(0xF3, &[0x08]),
            read(0xF3, &[0x00]),
            read(0xFA, &[0x7E, 0xED, 0x00]),
        ]);

        let celsius = sensor.read_temperature(&mut NoopDelay::new()).unwrap();

        assert!((celsius - 25.08).abs() < 1e-4);
        assert_eq!(sensor.fine_temperature().map(|f| f.value()), Some(128_422));

        i2c.done();
    }

    #[test]
    fn normal_mode_is_left_running() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x57]),
            read(0xF3, &[0x00]),
            read(0xF7, &[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00]),
        ]);

        let pascal = sensor.read_pressure(&mut NoopDelay::new()).unwrap();
        assert!((pascal - 100_653.25).abs() < 0.01);

        i2c.done();
    }

    #[test]
    fn humidity_and_temperature_share_one_burst() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x25]),
            write(0xF4, 0x25),
            read(0xF3, &[0x00]),
            read(0xFA, &[0x7E, 0xED, 0x00, 0x75, 0x30]),
        ]);

        let rh = sensor.read_humidity(&mut NoopDelay::new()).unwrap();
        assert!((rh - 54.997_07).abs() < 1e-4);
        assert_eq!(sensor.fine_temperature().map(|f| f.value()), Some(128_422));

        i2c.done();
    }

    #[test]
    fn measurement_uses_single_burst() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x24]),
            write(0xF4, 0x25),
            read(0xF3, &[0x00]),
            read(0xF7, &[0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00, 0x75, 0x30]),
        ]);

        let m = sensor.read_measurement(&mut NoopDelay::new()).unwrap();
        assert!((m.temperature - 25.08).abs() < 1e-4);
        assert!((m.pressure - 100_653.25).abs() < 0.01);
        assert!((m.humidity - 54.997_07).abs() < 1e-4);

        i2c.done();
    }

    #[test]
    fn polling_gives_up_after_budget() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF4, &[0x24]),
            write(0xF4, 0x25),
            read(0xF3, &[0x08]),
            read(0xF3, &[0x08]),
            read(0xF3, &[0x09]),
        ]);
        sensor.set_poll_policy(PollPolicy {
            max_polls: 3,
            interval_us: 500,
        });

        assert_eq!(
            sensor.read_temperature(&mut NoopDelay::new()),
            Err(Bme280Error::Timeout)
        );

        i2c.done();
    }

    #[test]
    fn bus_error_during_measurement_is_reported() {
        let (mut sensor, mut i2c) =
            ready(vec![read(0xF4, &[0x24]).with_error(ErrorKind::Other)]);

        assert_eq!(
            sensor.read_pressure(&mut NoopDelay::new()),
            Err(Bme280Error::Bus(ErrorKind::Other))
        );

        i2c.done();
    }

    #[test]
    fn status_and_soft_reset() {
        let (mut sensor, mut i2c) = ready(vec![
            read(0xF3, &[0x09]),
            write(0xE0, 0xB6),
            read(0xD0, &[0x60]),
        ]);

        assert_eq!(
            sensor.status().unwrap(),
            Status {
                measuring: true,
                im_update: true,
            }
        );
        sensor.soft_reset(&mut NoopDelay::new()).unwrap();
        assert_eq!(sensor.chip_id().unwrap(), CHIP_ID);

        i2c.done();
    }

    #[test]
    fn release_returns_transport() {
        let (sensor, _) = ready(vec![]);

        let bus = sensor.release();
        assert_eq!(bus.address(), ADDR);
        bus.release().done();
    }
}
