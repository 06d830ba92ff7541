use crate::regs;

/// Oversampling setting for one measurement channel.
///
/// Higher oversampling averages more ADC samples per result. This lowers noise
/// but lengthens every measurement cycle and raises current consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Oversampling {
    /// Channel disabled, its output registers keep the reset value.
    Skipped = 0,
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    /// Register values 5 to 7 all select x16.
    X16 = 5,
}

impl Oversampling {
    /// Decodes a 3-bit register field.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b111 {
            0 => Oversampling::Skipped,
            1 => Oversampling::X1,
            2 => Oversampling::X2,
            3 => Oversampling::X4,
            4 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }
}

/// Measurement channel an oversampling setting applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Temperature,
    Pressure,
    Humidity,
}

impl Channel {
    /// Register, field mask and field shift holding this channel's oversampling.
    pub(crate) fn field(self) -> (u8, u8, u8) {
        match self {
            Channel::Temperature => (regs::ADDR_CTRL_MEAS, regs::OSRS_T_MASK, regs::OSRS_T_SHIFT),
            Channel::Pressure => (regs::ADDR_CTRL_MEAS, regs::OSRS_P_MASK, regs::OSRS_P_SHIFT),
            Channel::Humidity => (regs::ADDR_CTRL_HUM, regs::OSRS_H_MASK, regs::OSRS_H_SHIFT),
        }
    }
}

/// Grouped oversampling settings for all three channels.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OversamplingConfig {
    pub temp_osrs: Oversampling,
    pub pres_osrs: Oversampling,
    pub hum_osrs: Oversampling,
}

/// IIR filter coefficient.
///
/// Smooths short disturbances (slamming doors, wind) in the pressure and
/// temperature outputs. Humidity is not filtered.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum IIRFilter {
    #[default]
    Off = 0,
    X2 = 1,
    X4 = 2,
    X8 = 3,
    X16 = 4,
}

impl IIRFilter {
    pub fn from_bits(value: u8) -> Self {
        match value & 0b111 {
            0 => IIRFilter::Off,
            1 => IIRFilter::X2,
            2 => IIRFilter::X4,
            3 => IIRFilter::X8,
            _ => IIRFilter::X16,
        }
    }
}

/// Inactive time between two measurements in [`PowerMode::Normal`].
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StandbyDuration {
    /// 0.5 ms
    #[default]
    Ms0_5 = 0,
    /// 62.5 ms
    Ms62_5 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    Ms1000 = 5,
    Ms10 = 6,
    Ms20 = 7,
}

impl StandbyDuration {
    pub fn from_bits(value: u8) -> Self {
        match value & 0b111 {
            0 => StandbyDuration::Ms0_5,
            1 => StandbyDuration::Ms62_5,
            2 => StandbyDuration::Ms125,
            3 => StandbyDuration::Ms250,
            4 => StandbyDuration::Ms500,
            5 => StandbyDuration::Ms1000,
            6 => StandbyDuration::Ms10,
            _ => StandbyDuration::Ms20,
        }
    }
}

/// Sensor power mode.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PowerMode {
    /// No measurements. Power-on default.
    #[default]
    Sleep = 0b00,
    /// One measurement cycle, then back to sleep.
    Forced = 0b01,
    /// Continuous measurements separated by the standby duration.
    Normal = 0b11,
}

impl PowerMode {
    /// Decodes the two mode bits; `0b10` is a second encoding of forced mode.
    pub fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            0b00 => PowerMode::Sleep,
            0b11 => PowerMode::Normal,
            _ => PowerMode::Forced,
        }
    }
}

/// Complete device configuration.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub osrs_config: OversamplingConfig,
    pub iir_filter: IIRFilter,
    pub standby: StandbyDuration,
    pub mode: PowerMode,
}

impl Config {
    /// Decodes a burst read of `ctrl_hum`, `status`, `ctrl_meas` and `config`.
    pub(crate) fn from_regs(raw: [u8; 4]) -> Self {
        let [ctrl_hum, _status, ctrl_meas, config] = raw;

        Config {
            osrs_config: OversamplingConfig {
                temp_osrs: Oversampling::from_bits(ctrl_meas >> regs::OSRS_T_SHIFT),
                pres_osrs: Oversampling::from_bits(ctrl_meas >> regs::OSRS_P_SHIFT),
                hum_osrs: Oversampling::from_bits(ctrl_hum >> regs::OSRS_H_SHIFT),
            },
            iir_filter: IIRFilter::from_bits(config >> regs::FILTER_SHIFT),
            standby: StandbyDuration::from_bits(config >> regs::T_SB_SHIFT),
            mode: PowerMode::from_bits(ctrl_meas >> regs::MODE_SHIFT),
        }
    }
}

/// One register update of a configuration sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigStep {
    TempOversampling,
    PresOversampling,
    HumOversampling,
    IIRFilter,
    Standby,
    PowerMode,
}

impl ConfigStep {
    pub const ALL: [ConfigStep; 6] = [
        ConfigStep::TempOversampling,
        ConfigStep::PresOversampling,
        ConfigStep::HumOversampling,
        ConfigStep::IIRFilter,
        ConfigStep::Standby,
        ConfigStep::PowerMode,
    ];
}

/// Operating presets from the datasheet's recommended modes of operation.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// One forced measurement per minute, ~0.16 µA.
    #[default]
    Weather,
    /// One forced measurement per second without pressure, ~2.9 µA.
    Humidity,
    /// Continuous 25 Hz with strong filtering, ~633 µA.
    Indoor,
    /// Continuous 83 Hz pressure for fast response, ~581 µA.
    Gaming,
}

impl From<u8> for Profile {
    /// Unknown indices fall back to [`Profile::Weather`].
    fn from(index: u8) -> Self {
        match index {
            1 => Profile::Humidity,
            2 => Profile::Indoor,
            3 => Profile::Gaming,
            _ => Profile::Weather,
        }
    }
}

impl Profile {
    /// The configuration this profile stands for.
    pub fn config(self) -> Config {
        let builder = ConfigBuilder::new();

        let builder = match self {
            Profile::Weather => builder
                .temp_oversampling(Oversampling::X1)
                .pres_oversampling(Oversampling::X1)
                .hum_oversampling(Oversampling::X1)
                .iir_filter(IIRFilter::Off)
                .standby(StandbyDuration::Ms1000)
                .mode(PowerMode::Forced),
            Profile::Humidity => builder
                .temp_oversampling(Oversampling::X1)
                .pres_oversampling(Oversampling::Skipped)
                .hum_oversampling(Oversampling::X1)
                .iir_filter(IIRFilter::Off)
                .standby(StandbyDuration::Ms1000)
                .mode(PowerMode::Forced),
            Profile::Indoor => builder
                .temp_oversampling(Oversampling::X2)
                .pres_oversampling(Oversampling::X16)
                .hum_oversampling(Oversampling::X1)
                .iir_filter(IIRFilter::X16)
                .standby(StandbyDuration::Ms0_5)
                .mode(PowerMode::Normal),
            Profile::Gaming => builder
                .temp_oversampling(Oversampling::X1)
                .pres_oversampling(Oversampling::X4)
                .hum_oversampling(Oversampling::Skipped)
                .iir_filter(IIRFilter::X16)
                .standby(StandbyDuration::Ms0_5)
                .mode(PowerMode::Normal),
        };

        builder.build()
    }
}

/// Fluent builder for a [`Config`].
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temp_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.temp_osrs = os;
        self
    }

    pub fn pres_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.pres_osrs = os;
        self
    }

    pub fn hum_oversampling(mut self, os: Oversampling) -> Self {
        self.config.osrs_config.hum_osrs = os;
        self
    }

    pub fn iir_filter(mut self, filter: IIRFilter) -> Self {
        self.config.iir_filter = filter;
        self
    }

    pub fn standby(mut self, standby: StandbyDuration) -> Self {
        self.config.standby = standby;
        self
    }

    pub fn mode(mut self, mode: PowerMode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// Bounds the wait for a measurement to complete.
///
/// The status register is read at most `max_polls` times, `interval_us`
/// apart. A forced measurement with x16 oversampling on all channels takes
/// about 113 ms, which the default covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollPolicy {
    pub max_polls: u32,
    pub interval_us: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_polls: 150,
            interval_us: 1_000,
        }
    }
}
