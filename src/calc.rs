//! Calibration data and the datasheet compensation formulas.
//!
//! All integer steps follow the Bosch reference code (BME280 datasheet,
//! section 4.2.3) operation by operation. Floating point is used only for the
//! final scaling into physical units.

use crate::regs;

/// Factory-fused compensation coefficients, unique to every chip.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationData {
    pub dig_t1: u16,
    pub dig_t2: i16,
    pub dig_t3: i16,
    pub dig_p1: u16,
    pub dig_p2: i16,
    pub dig_p3: i16,
    pub dig_p4: i16,
    pub dig_p5: i16,
    pub dig_p6: i16,
    pub dig_p7: i16,
    pub dig_p8: i16,
    pub dig_p9: i16,
    pub dig_h1: u8,
    pub dig_h2: i16,
    pub dig_h3: u8,
    pub dig_h4: i16,
    pub dig_h5: i16,
    pub dig_h6: i8,
}

/// Temperature in the datasheet's `t_fine` resolution.
///
/// Only [`CalibrationData::compensate_temperature`] produces this value, so
/// pressure and humidity can never be compensated against a missing
/// temperature.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FineTemperature(pub(crate) i32);

impl FineTemperature {
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Reassembles a 20-bit ADC value from its msb/lsb/xlsb registers.
pub(crate) fn raw_20bit(bytes: &[u8]) -> u32 {
    ((bytes[0] as u32) << 12) | ((bytes[1] as u32) << 4) | ((bytes[2] as u32) >> 4)
}

/// Reassembles the 16-bit humidity ADC value from its msb/lsb registers.
pub(crate) fn raw_16bit(bytes: &[u8]) -> u16 {
    ((bytes[0] as u16) << 8) | (bytes[1] as u16)
}

impl CalibrationData {
    /// Decodes block A (`0x88..=0xA1`) followed by block B (`0xE1..=0xE7`).
    pub fn from_image(image: &[u8; regs::calib::TOTAL_SIZE]) -> Self {
        let u16_at = |i: usize| u16::from_le_bytes([image[i], image[i + 1]]);
        let i16_at = |i: usize| i16::from_le_bytes([image[i], image[i + 1]]);

        CalibrationData {
            dig_t1: u16_at(0),
            dig_t2: i16_at(2),
            dig_t3: i16_at(4),
            dig_p1: u16_at(6),
            dig_p2: i16_at(8),
            dig_p3: i16_at(10),
            dig_p4: i16_at(12),
            dig_p5: i16_at(14),
            dig_p6: i16_at(16),
            dig_p7: i16_at(18),
            dig_p8: i16_at(20),
            dig_p9: i16_at(22),
            // image[24] is 0xA0, unused
            dig_h1: image[25],
            dig_h2: i16_at(26),
            dig_h3: image[28],
            // 0xE4..=0xE6 hold two signed 12-bit values sharing the middle byte
            dig_h4: ((image[29] as i8 as i16) << 4) | (image[30] & 0x0F) as i16,
            dig_h5: ((image[31] as i8 as i16) << 4) | (image[30] >> 4) as i16,
            dig_h6: image[32] as i8,
        }
    }

    /// Converts a raw temperature reading into °C.
    ///
    /// Also returns `t_fine`, which the pressure and humidity formulas need
    /// to correct the temperature drift of their sensing elements.
    pub fn compensate_temperature(&self, adc_t: u32) -> (f32, FineTemperature) {
        let adc = adc_t as i32;
        let t1 = self.dig_t1 as i32;

        let var1 = ((adc >> 3) - (t1 << 1)).wrapping_mul(self.dig_t2 as i32) >> 11;
        let var2 = ((((adc >> 4) - t1).wrapping_mul((adc >> 4) - t1) >> 12)
            .wrapping_mul(self.dig_t3 as i32))
            >> 14;
        let t_fine = var1.wrapping_add(var2);

        let centi_celsius = t_fine.wrapping_mul(5).wrapping_add(128) >> 8;

        (centi_celsius as f32 / 100.0, FineTemperature(t_fine))
    }

    /// Converts a raw pressure reading into Pascal.
    ///
    /// Returns exactly `0.0` when the calibration makes the formula's divisor
    /// zero. That value is a guard, not a measurement.
    pub fn compensate_pressure(&self, adc_p: u32, t_fine: FineTemperature) -> f32 {
        let p1 = self.dig_p1 as i64;
        let p2 = self.dig_p2 as i64;
        let p3 = self.dig_p3 as i64;
        let p4 = self.dig_p4 as i64;
        let p5 = self.dig_p5 as i64;
        let p6 = self.dig_p6 as i64;
        let p7 = self.dig_p7 as i64;
        let p8 = self.dig_p8 as i64;
        let p9 = self.dig_p9 as i64;

        let mut var1 = (t_fine.0 as i64) - 128_000;
        let mut var2 = var1.wrapping_mul(var1).wrapping_mul(p6);
        var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 17);
        var2 = var2.wrapping_add(p4 << 35);
        var1 = (var1.wrapping_mul(var1).wrapping_mul(p3) >> 8)
            .wrapping_add(var1.wrapping_mul(p2) << 12);
        var1 = ((1i64 << 47).wrapping_add(var1)).wrapping_mul(p1) >> 33;

        if var1 == 0 {
            return 0.0;
        }

        let mut p: i64 = 1_048_576 - adc_p as i64;
        p = ((p << 31).wrapping_sub(var2))
            .wrapping_mul(3125)
            .wrapping_div(var1);
        var1 = p9.wrapping_mul(p >> 13).wrapping_mul(p >> 13) >> 25;
        var2 = p8.wrapping_mul(p) >> 19;
        p = (p.wrapping_add(var1).wrapping_add(var2) >> 8).wrapping_add(p7 << 4);

        // Q24.8 fixed point
        p as f32 / 256.0
    }

    /// Converts a raw humidity reading into %RH, always within `0.0..=100.0`.
    pub fn compensate_humidity(&self, adc_h: u16, t_fine: FineTemperature) -> f32 {
        let adc = adc_h as i32;
        let h1 = self.dig_h1 as i32;
        let h2 = self.dig_h2 as i32;
        let h3 = self.dig_h3 as i32;
        let h4 = self.dig_h4 as i32;
        let h5 = self.dig_h5 as i32;
        let h6 = self.dig_h6 as i32;

        let mut v = t_fine.0.wrapping_sub(76_800);

        let offset = ((adc << 14)
            .wrapping_sub(h4 << 20)
            .wrapping_sub(h5.wrapping_mul(v))
            .wrapping_add(16_384))
            >> 15;
        let scale = ((((v.wrapping_mul(h6) >> 10)
            .wrapping_mul((v.wrapping_mul(h3) >> 11).wrapping_add(32_768))
            >> 10)
            .wrapping_add(2_097_152))
        .wrapping_mul(h2)
        .wrapping_add(8_192))
            >> 14;

        v = offset.wrapping_mul(scale);
        v = v.wrapping_sub((((v >> 15).wrapping_mul(v >> 15) >> 7).wrapping_mul(h1)) >> 4);

        // 419430400 is 100 %RH in Q22.10 before the final shift.
        let v = v.clamp(0, 419_430_400);

        (v >> 12) as f32 / 1024.0
    }
}
