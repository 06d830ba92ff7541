//! Register map of the BME280 (datasheet section 5.3).

pub const ADDR_CHIP_ID: u8 = 0xD0;
pub const ADDR_RESET: u8 = 0xE0;
pub const ADDR_CTRL_HUM: u8 = 0xF2;
pub const ADDR_STATUS: u8 = 0xF3;
pub const ADDR_CTRL_MEAS: u8 = 0xF4;
pub const ADDR_CONFIG: u8 = 0xF5;

pub const ADDR_PRESS_MSB: u8 = 0xF7;
pub const ADDR_TEMP_MSB: u8 = 0xFA;

pub const PRESS_SIZE: usize = 3;
pub const TEMP_SIZE: usize = 3;
pub const HUM_SIZE: usize = 2;
/// press_msb (0xF7) through hum_lsb (0xFE).
pub const DATA_SIZE: usize = PRESS_SIZE + TEMP_SIZE + HUM_SIZE;

/// Expected content of the chip-ID register.
pub const CHIP_ID: u8 = 0x60;
/// Writing this to the reset register triggers a power-on reset.
pub const SOFT_RESET_CMD: u8 = 0xB6;

/// Calibration image: block A (`0x88..=0xA1`) followed by block B (`0xE1..=0xE7`).
pub mod calib {
    pub const ADDR: [u8; 2] = [0x88, 0xE1];
    pub const SIZES: [usize; 2] = [26, 7];
    pub const TOTAL_SIZE: usize = 26 + 7;
}

// ctrl_hum
pub const OSRS_H_MASK: u8 = 0b0000_0111;
pub const OSRS_H_SHIFT: u8 = 0;

// ctrl_meas
pub const OSRS_T_MASK: u8 = 0b1110_0000;
pub const OSRS_T_SHIFT: u8 = 5;
pub const OSRS_P_MASK: u8 = 0b0001_1100;
pub const OSRS_P_SHIFT: u8 = 2;
pub const MODE_MASK: u8 = 0b0000_0011;
pub const MODE_SHIFT: u8 = 0;

// config
pub const T_SB_MASK: u8 = 0b1110_0000;
pub const T_SB_SHIFT: u8 = 5;
pub const FILTER_MASK: u8 = 0b0001_1100;
pub const FILTER_SHIFT: u8 = 2;

// status
pub const STATUS_MEASURING: u8 = 1 << 3;
pub const STATUS_IM_UPDATE: u8 = 1 << 0;
