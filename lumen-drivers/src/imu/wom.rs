//! Wake-on-motion configuration
//!
//! Register packing for the WoM settings and the fixed order in which they
//! are written to the device.

use lumen_core::Error;

use super::registers::ACCEL_RANGE_4G;

/// Lowest accepted WoM threshold (mg)
pub const MIN_THRESHOLD_MG: u16 = 50;

/// Highest accepted WoM threshold (mg)
pub const MAX_THRESHOLD_MG: u16 = 500;

/// Accelerometer output data rate in low-power WoM mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AccelOdr {
    /// 128 Hz
    Hz128 = 0xC0,
    /// 21 Hz
    Hz21 = 0xD0,
    /// 11 Hz
    Hz11 = 0xE0,
    /// 3 Hz
    Hz3 = 0xF0,
}

impl AccelOdr {
    /// Register code (CTRL2 bits 7:4)
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Sensor interrupt output carrying the WoM event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptPin {
    /// INT1
    Int1,
    /// INT2
    Int2,
}

/// Initial level of the WoM interrupt line, toggled on each event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InterruptLevel {
    /// Line idles low
    Low,
    /// Line idles high
    High,
}

/// WoM interrupt routing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WomInterrupt {
    /// Output pin
    pub pin: InterruptPin,
    /// Initial line level
    pub initial_level: InterruptLevel,
}

impl WomInterrupt {
    /// CAL1_H bits 5:4 selecting pin and initial level
    pub const fn channel_code(self) -> u8 {
        match (self.pin, self.initial_level) {
            (InterruptPin::Int1, InterruptLevel::Low) => 0b00,
            (InterruptPin::Int2, InterruptLevel::Low) => 0b01,
            (InterruptPin::Int1, InterruptLevel::High) => 0b10,
            (InterruptPin::Int2, InterruptLevel::High) => 0b11,
        }
    }
}

/// Wake-on-motion configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WomConfig {
    /// Motion threshold in mg (50-500)
    pub threshold_mg: u16,
    /// Samples ignored after a trigger; only the low 2 bits reach the device
    pub blanking_samples: u8,
    /// Accelerometer output data rate
    pub odr: AccelOdr,
    /// Interrupt pin and initial level
    pub interrupt: WomInterrupt,
    /// Enable the interrupt output once configured
    pub enable_interrupt: bool,
}

impl WomConfig {
    /// INT2 idling low at 21 Hz, 200 mg threshold
    pub const DEFAULT: Self = Self {
        threshold_mg: 200,
        blanking_samples: 1,
        odr: AccelOdr::Hz21,
        interrupt: WomInterrupt {
            pin: InterruptPin::Int2,
            initial_level: InterruptLevel::Low,
        },
        enable_interrupt: true,
    };

    /// Create a configuration with the given threshold
    pub const fn new(threshold_mg: u16) -> Self {
        Self {
            threshold_mg,
            ..Self::DEFAULT
        }
    }

    /// Set the output data rate
    #[must_use]
    pub const fn with_odr(mut self, odr: AccelOdr) -> Self {
        self.odr = odr;
        self
    }

    /// Set the blanking sample count
    #[must_use]
    pub const fn with_blanking_samples(mut self, samples: u8) -> Self {
        self.blanking_samples = samples;
        self
    }

    /// Set the interrupt pin and initial level
    #[must_use]
    pub const fn with_interrupt(mut self, pin: InterruptPin, initial_level: InterruptLevel) -> Self {
        self.interrupt = WomInterrupt { pin, initial_level };
        self
    }

    /// Enable or disable the interrupt output after configuration
    #[must_use]
    pub const fn with_interrupt_enabled(mut self, enable: bool) -> Self {
        self.enable_interrupt = enable;
        self
    }

    /// Check the configuration before anything is sent to the device
    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_THRESHOLD_MG..=MAX_THRESHOLD_MG).contains(&self.threshold_mg) {
            return Err(Error::InvalidArgument);
        }
        Ok(())
    }

    /// CTRL2 value: ODR code with the +-4g range
    pub const fn accel_config_register(&self) -> u8 {
        self.odr.code() | ACCEL_RANGE_4G
    }

    /// CAL1_L value: threshold at 1 mg per LSB, saturating at 255
    pub const fn threshold_register(&self) -> u8 {
        if self.threshold_mg > u8::MAX as u16 {
            u8::MAX
        } else {
            self.threshold_mg as u8
        }
    }

    /// CAL1_H value
    ///
    /// Bits 7:6 blanking, bits 5:4 interrupt channel, bits 3:0 reserved.
    pub const fn interrupt_config_register(&self) -> u8 {
        ((self.blanking_samples & 0x03) << 6) | (self.interrupt.channel_code() << 4)
    }
}

impl Default for WomConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// One stage of WoM configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WomStep {
    /// Turn every sensor off
    DisableSensors,
    /// Program ODR and range
    AccelConfig,
    /// Program the motion threshold
    Threshold,
    /// Program blanking and interrupt routing
    InterruptConfig,
    /// Issue the apply command
    ApplyCommand,
    /// Wait for the command to finish and acknowledge it
    AwaitCompletion,
    /// Turn the accelerometer back on, gyroscope stays off
    EnableAccel,
}

impl WomStep {
    /// Steps in the order they must run
    pub const SEQUENCE: [WomStep; 7] = [
        WomStep::DisableSensors,
        WomStep::AccelConfig,
        WomStep::Threshold,
        WomStep::InterruptConfig,
        WomStep::ApplyCommand,
        WomStep::AwaitCompletion,
        WomStep::EnableAccel,
    ];

    /// Name for diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            WomStep::DisableSensors => "disable sensors",
            WomStep::AccelConfig => "accelerometer config",
            WomStep::Threshold => "threshold",
            WomStep::InterruptConfig => "interrupt config",
            WomStep::ApplyCommand => "apply command",
            WomStep::AwaitCompletion => "command completion",
            WomStep::EnableAccel => "enable accelerometer",
        }
    }
}
