//! QMI8658 register map
//!
//! Only the registers touched by wake-on-motion bring-up are listed.

/// Default I2C address (SA0 pulled high)
pub const DEFAULT_ADDRESS: u8 = 0x6B;

/// Alternate I2C address (SA0 pulled low)
pub const ALT_ADDRESS: u8 = 0x6A;

/// Expected WHO_AM_I value
pub const CHIP_ID: u8 = 0x05;

/// Register addresses
pub mod reg {
    /// Device identifier
    pub const WHO_AM_I: u8 = 0x00;
    /// Serial interface and interrupt output enables
    pub const CTRL1: u8 = 0x02;
    /// Accelerometer ODR and full-scale range
    pub const CTRL2: u8 = 0x03;
    /// Interrupt routing
    pub const CTRL5: u8 = 0x06;
    /// Sensor enables
    pub const CTRL7: u8 = 0x08;
    /// Host command
    pub const CTRL9: u8 = 0x0A;
    /// Calibration 1 low byte (WoM threshold)
    pub const CAL1_L: u8 = 0x0B;
    /// Calibration 1 high byte (WoM interrupt config)
    pub const CAL1_H: u8 = 0x0C;
    /// Interrupt status (command done)
    pub const STATUSINT: u8 = 0x2D;
    /// Data-ready status
    pub const STATUS0: u8 = 0x2E;
    /// Event status (WoM flag)
    pub const STATUS1: u8 = 0x2F;
    /// Soft reset
    pub const RESET: u8 = 0x60;
}

/// CTRL1 bits
pub mod ctrl1 {
    /// Serial address auto-increment
    pub const ADDR_AUTO_INCREMENT: u8 = 1 << 6;
    /// INT2 output enable
    pub const INT2_ENABLE: u8 = 1 << 4;
    /// INT1 output enable
    pub const INT1_ENABLE: u8 = 1 << 3;
}

/// CTRL2 accelerometer full-scale code for +-4g
pub const ACCEL_RANGE_4G: u8 = 0x05;

/// CTRL7 bits
pub mod ctrl7 {
    /// All sensors off
    pub const DISABLED: u8 = 0x00;
    /// Accelerometer enable
    pub const ACCEL_ENABLE: u8 = 1 << 0;
    /// Gyroscope enable
    pub const GYRO_ENABLE: u8 = 1 << 1;
}

/// CTRL9 host commands
pub mod cmd {
    /// Acknowledge command completion
    pub const ACK: u8 = 0x00;
    /// Apply the WoM settings held in CAL1
    pub const WRITE_WOM_SETTING: u8 = 0x08;
}

/// STATUSINT command-done flag
pub const STATUSINT_CMD_DONE: u8 = 1 << 7;

/// STATUS1 wake-on-motion flag
pub const STATUS1_WOM: u8 = 1 << 2;

/// Value written to RESET to reboot the device
pub const RESET_CODE: u8 = 0xB0;

/// Wait after a soft reset (ms); the datasheet allows up to 15
pub const RESET_SETTLE_MS: u32 = 20;

/// Wait after disabling sensors before reconfiguring (ms)
pub const DISABLE_SETTLE_MS: u32 = 10;
