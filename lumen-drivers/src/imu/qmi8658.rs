//! QMI8658 wake-on-motion driver
//!
//! The QMI8658 is a 6-axis IMU on I2C. In wake-on-motion mode only the
//! accelerometer runs, at a low ODR, and the chip toggles an interrupt line
//! when acceleration crosses the programmed threshold. That line is wired
//! to a GPIO armed as a light-sleep wake source.
//!
//! # Configuration sequence
//!
//! The datasheet requires the sensors to be off while WoM is programmed:
//!
//! 1. CTRL7 = 0, wait 10 ms
//! 2. CTRL2 = ODR | +-4g
//! 3. CAL1_L = threshold
//! 4. CAL1_H = blanking | interrupt channel
//! 5. CTRL9 = write WoM setting
//! 6. poll STATUSINT command-done, then CTRL9 = ack
//! 7. CTRL7 = accelerometer only

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use lumen_core::traits::WakeOnMotion;
use lumen_core::Error;

use super::registers::{
    cmd, ctrl1, ctrl7, reg, CHIP_ID, DEFAULT_ADDRESS, DISABLE_SETTLE_MS, RESET_CODE,
    RESET_SETTLE_MS, STATUS1_WOM, STATUSINT_CMD_DONE,
};
use super::wom::{WomConfig, WomStep};
use crate::poll::{poll_until, PollBudget, PollError};

/// Command completion polling: 100 reads, 1 ms apart
pub const COMMAND_POLL: PollBudget = PollBudget::new(100, 1);

/// Driver-side view of wake-on-motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WomState {
    /// Not configured, or exited
    Idle,
    /// Configuration started and has not completed
    Configuring,
    /// Configured and waiting for motion
    Armed,
    /// Motion flag seen while armed
    Triggered,
}

/// Result of trying to arm motion wake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionWakeStatus {
    /// Motion wake is armed
    Armed,
    /// Arming failed; the sensor was switched off and other wake sources
    /// must carry the device
    Unavailable(Error),
}

impl MotionWakeStatus {
    /// Check if motion wake is available
    pub fn is_armed(&self) -> bool {
        matches!(self, MotionWakeStatus::Armed)
    }
}

/// Registers relevant to wake-on-motion, for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDump {
    pub who_am_i: u8,
    pub ctrl1: u8,
    pub ctrl2: u8,
    pub ctrl5: u8,
    pub ctrl7: u8,
    pub cal1_l: u8,
    pub cal1_h: u8,
    pub statusint: u8,
    pub status1: u8,
}

impl RegisterDump {
    /// Check if the INT2 output is enabled
    pub fn int2_enabled(&self) -> bool {
        self.ctrl1 & ctrl1::INT2_ENABLE != 0
    }

    /// Check if only the accelerometer is running
    pub fn accel_only(&self) -> bool {
        self.ctrl7 & (ctrl7::ACCEL_ENABLE | ctrl7::GYRO_ENABLE) == ctrl7::ACCEL_ENABLE
    }
}

/// QMI8658 driver
pub struct Qmi8658<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    state: WomState,
    failed_step: Option<WomStep>,
}

impl<I2C, D> Qmi8658<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a driver at the default address
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, DEFAULT_ADDRESS)
    }

    /// Create a driver at a specific address
    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            state: WomState::Idle,
            failed_step: None,
        }
    }

    /// Release the bus and delay
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    /// Current wake-on-motion state
    pub fn state(&self) -> WomState {
        self.state
    }

    /// Step at which the last configuration attempt failed
    pub fn failed_step(&self) -> Option<WomStep> {
        self.failed_step
    }

    /// Read WHO_AM_I
    pub fn read_chip_id(&mut self) -> Result<u8, Error> {
        self.read_register(reg::WHO_AM_I)
    }

    /// Minimal bring-up for wake-on-motion use only
    ///
    /// Verifies the chip ID, resets the device and enables register address
    /// auto-increment. Sampling stays unconfigured.
    pub fn init_wom_only(&mut self) -> Result<(), Error> {
        let id = self.read_chip_id()?;
        if id != CHIP_ID {
            #[cfg(feature = "defmt")]
            defmt::error!(
                "QMI8658 not found: WHO_AM_I 0x{:02X}, expected 0x{:02X}",
                id,
                CHIP_ID
            );
            return Err(Error::HardwareIo);
        }

        self.soft_reset()?;
        self.write_register(reg::CTRL1, ctrl1::ADDR_AUTO_INCREMENT)?;

        #[cfg(feature = "defmt")]
        defmt::info!("QMI8658 initialized for wake-on-motion");
        Ok(())
    }

    /// Reset the device and wait for it to come back
    pub fn soft_reset(&mut self) -> Result<(), Error> {
        self.write_register(reg::RESET, RESET_CODE)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        self.state = WomState::Idle;
        Ok(())
    }

    /// Program wake-on-motion
    ///
    /// Runs [`WomStep::SEQUENCE`] and stops at the first failing step, which
    /// is then reported by [`failed_step`](Self::failed_step). The state
    /// stays `Configuring` after a failure; call
    /// [`exit_wom_mode`](Self::exit_wom_mode) to switch the sensor off.
    pub fn configure_wom(&mut self, config: &WomConfig) -> Result<(), Error> {
        config.validate()?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Configuring WoM: threshold={}mg, blanking={}, ODR=0x{:02X}",
            config.threshold_mg,
            config.blanking_samples,
            config.odr.code()
        );

        self.state = WomState::Configuring;
        self.failed_step = None;

        for step in WomStep::SEQUENCE {
            if let Err(err) = self.run_step(step, config) {
                #[cfg(feature = "defmt")]
                defmt::error!("WoM {} failed: {}", step.as_str(), err);
                self.rollback(step);
                self.failed_step = Some(step);
                return Err(err);
            }
        }

        self.state = WomState::Armed;
        Ok(())
    }

    /// Wait for a CTRL9 command to finish, then acknowledge it
    pub fn wait_for_command_completion(&mut self) -> Result<(), Error> {
        let i2c = &mut self.i2c;
        let address = self.address;
        let done = poll_until(&mut self.delay, COMMAND_POLL, || {
            let mut status = [0u8];
            i2c.write_read(address, &[reg::STATUSINT], &mut status)
                .map(|()| status[0] & STATUSINT_CMD_DONE != 0)
        });

        match done {
            Ok(_) => self.write_register(reg::CTRL9, cmd::ACK),
            Err(PollError::Timeout) => {
                #[cfg(feature = "defmt")]
                defmt::error!("CTRL9 command timeout");
                Err(Error::Timeout)
            }
            Err(PollError::Failed(_)) => Err(Error::HardwareIo),
        }
    }

    /// Route the WoM event to INT2
    ///
    /// Read-modify-write of CTRL1; only the INT2 enable bit changes.
    pub fn enable_wom_interrupt(&mut self) -> Result<(), Error> {
        self.update_ctrl1(|value| value | ctrl1::INT2_ENABLE)
    }

    /// Stop routing the WoM event to INT2
    pub fn disable_wom_interrupt(&mut self) -> Result<(), Error> {
        self.update_ctrl1(|value| value & !ctrl1::INT2_ENABLE)
    }

    /// Check the latched WoM flag
    ///
    /// Returns false if the read fails.
    pub fn check_wom_event(&mut self) -> bool {
        let triggered = match self.read_register(reg::STATUS1) {
            Ok(status) => status & STATUS1_WOM != 0,
            Err(_) => false,
        };

        if triggered && self.state == WomState::Armed {
            self.state = WomState::Triggered;
        }
        triggered
    }

    /// Switch every sensor off
    pub fn exit_wom_mode(&mut self) -> Result<(), Error> {
        self.write_register(reg::CTRL7, ctrl7::DISABLED)?;
        self.state = WomState::Idle;

        #[cfg(feature = "defmt")]
        defmt::info!("Exited WoM mode");
        Ok(())
    }

    /// Configure WoM and enable its interrupt, falling back on failure
    ///
    /// Any failure switches the sensor off and reports motion wake as
    /// unavailable; the caller keeps running on the remaining wake sources.
    pub fn arm_wake_on_motion(&mut self, config: &WomConfig) -> MotionWakeStatus {
        let armed = self.configure_wom(config).and_then(|()| {
            if config.enable_interrupt {
                self.enable_wom_interrupt()
            } else {
                Ok(())
            }
        });

        match armed {
            Ok(()) => MotionWakeStatus::Armed,
            Err(err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Motion wake unavailable: {}", err);
                if let Err(_exit_err) = self.exit_wom_mode() {
                    #[cfg(feature = "defmt")]
                    defmt::error!("Failed to switch sensor off after WoM failure: {}", _exit_err);
                }
                MotionWakeStatus::Unavailable(err)
            }
        }
    }

    /// Read the WoM-related registers
    pub fn read_registers(&mut self) -> Result<RegisterDump, Error> {
        Ok(RegisterDump {
            who_am_i: self.read_register(reg::WHO_AM_I)?,
            ctrl1: self.read_register(reg::CTRL1)?,
            ctrl2: self.read_register(reg::CTRL2)?,
            ctrl5: self.read_register(reg::CTRL5)?,
            ctrl7: self.read_register(reg::CTRL7)?,
            cal1_l: self.read_register(reg::CAL1_L)?,
            cal1_h: self.read_register(reg::CAL1_H)?,
            statusint: self.read_register(reg::STATUSINT)?,
            status1: self.read_register(reg::STATUS1)?,
        })
    }

    fn run_step(&mut self, step: WomStep, config: &WomConfig) -> Result<(), Error> {
        match step {
            WomStep::DisableSensors => {
                self.write_register(reg::CTRL7, ctrl7::DISABLED)?;
                self.delay.delay_ms(DISABLE_SETTLE_MS);
                Ok(())
            }
            WomStep::AccelConfig => {
                self.write_register(reg::CTRL2, config.accel_config_register())
            }
            WomStep::Threshold => self.write_register(reg::CAL1_L, config.threshold_register()),
            WomStep::InterruptConfig => {
                self.write_register(reg::CAL1_H, config.interrupt_config_register())
            }
            WomStep::ApplyCommand => self.write_register(reg::CTRL9, cmd::WRITE_WOM_SETTING),
            WomStep::AwaitCompletion => self.wait_for_command_completion(),
            WomStep::EnableAccel => self.write_register(reg::CTRL7, ctrl7::ACCEL_ENABLE),
        }
    }

    /// Undo hook for a failed step
    ///
    /// Nothing is restored; registers written earlier keep their values.
    fn rollback(&mut self, _step: WomStep) {}

    fn update_ctrl1(&mut self, f: impl FnOnce(u8) -> u8) -> Result<(), Error> {
        let value = self.read_register(reg::CTRL1)?;
        let updated = f(value);
        self.write_register(reg::CTRL1, updated)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("CTRL1 0x{:02X} -> 0x{:02X}", value, updated);
        Ok(())
    }

    fn read_register(&mut self, register: u8) -> Result<u8, Error> {
        let mut buf = [0u8];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|_| Error::HardwareIo)?;
        Ok(buf[0])
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<(), Error> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|_| Error::HardwareIo)
    }
}

impl<I2C, D> WakeOnMotion for Qmi8658<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn check_wom_event(&mut self) -> bool {
        Qmi8658::check_wom_event(self)
    }

    fn exit_wom_mode(&mut self) -> Result<(), Error> {
        Qmi8658::exit_wom_mode(self)
    }

    fn is_armed(&self) -> bool {
        matches!(self.state, WomState::Armed | WomState::Triggered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = DEFAULT_ADDRESS;

    fn write(register: u8, value: u8) -> Transaction {
        Transaction::write(ADDR, vec![register, value])
    }

    fn read(register: u8, value: u8) -> Transaction {
        Transaction::write_read(ADDR, vec![register], vec![value])
    }

    /// Full successful configuration for the default config
    fn configure_sequence() -> Vec<Transaction> {
        vec![
            write(reg::CTRL7, 0x00),
            write(reg::CTRL2, 0xD5),
            write(reg::CAL1_L, 200),
            write(reg::CAL1_H, 0b01_01_0000),
            write(reg::CTRL9, cmd::WRITE_WOM_SETTING),
            read(reg::STATUSINT, 0x00),
            read(reg::STATUSINT, 0x80),
            write(reg::CTRL9, cmd::ACK),
            write(reg::CTRL7, 0x01),
        ]
    }

    #[test]
    fn test_configure_write_order() {
        let expectations = configure_sequence();
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.configure_wom(&WomConfig::default()), Ok(()));
        assert_eq!(imu.state(), WomState::Armed);
        assert_eq!(imu.failed_step(), None);
        i2c.done();
    }

    #[test]
    fn test_invalid_config_sends_nothing() {
        let expectations: [Transaction; 0] = [];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(
            imu.configure_wom(&WomConfig::new(20)),
            Err(Error::InvalidArgument)
        );
        assert_eq!(imu.state(), WomState::Idle);
        i2c.done();
    }

    #[test]
    fn test_bus_failure_on_third_write_stops() {
        let expectations = [
            write(reg::CTRL7, 0x00),
            write(reg::CTRL2, 0xD5),
            write(reg::CAL1_L, 200).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.configure_wom(&WomConfig::default()), Err(Error::HardwareIo));
        assert_eq!(imu.failed_step(), Some(WomStep::Threshold));
        assert_eq!(imu.state(), WomState::Configuring);
        // No further transactions were attempted
        i2c.done();
    }

    #[test]
    fn test_completion_timeout() {
        let expectations: Vec<Transaction> =
            (0..100).map(|_| read(reg::STATUSINT, 0x00)).collect();
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.wait_for_command_completion(), Err(Error::Timeout));
        assert!(Error::Timeout.is_retryable());
        i2c.done();
    }

    #[test]
    fn test_completion_timeout_fails_configure() {
        let mut expectations = configure_sequence();
        expectations.truncate(5);
        expectations.extend((0..100).map(|_| read(reg::STATUSINT, 0x00)));
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.configure_wom(&WomConfig::default()), Err(Error::Timeout));
        assert_eq!(imu.failed_step(), Some(WomStep::AwaitCompletion));
        i2c.done();
    }

    #[test]
    fn test_enable_interrupt_sets_only_bit4() {
        let expectations = [read(reg::CTRL1, 0x40), write(reg::CTRL1, 0x50)];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.enable_wom_interrupt(), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_disable_interrupt_clears_only_bit4() {
        let expectations = [read(reg::CTRL1, 0xFF), write(reg::CTRL1, 0xEF)];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.disable_wom_interrupt(), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_check_wom_event() {
        let mut expectations = configure_sequence();
        expectations.push(read(reg::STATUS1, 0x00));
        expectations.push(read(reg::STATUS1, 0x04));
        expectations.push(read(reg::STATUS1, 0x04).with_error(ErrorKind::Other));
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        imu.configure_wom(&WomConfig::default()).unwrap();
        assert!(!imu.check_wom_event());
        assert_eq!(imu.state(), WomState::Armed);
        assert!(imu.check_wom_event());
        assert_eq!(imu.state(), WomState::Triggered);
        // Bus error reads as no event
        assert!(!imu.check_wom_event());
        i2c.done();
    }

    #[test]
    fn test_exit_wom_mode() {
        let expectations = [write(reg::CTRL7, 0x00)];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.exit_wom_mode(), Ok(()));
        assert_eq!(imu.state(), WomState::Idle);
        i2c.done();
    }

    #[test]
    fn test_arm_wake_on_motion() {
        let mut expectations = configure_sequence();
        expectations.push(read(reg::CTRL1, 0x40));
        expectations.push(write(reg::CTRL1, 0x50));
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        let status = imu.arm_wake_on_motion(&WomConfig::default());
        assert_eq!(status, MotionWakeStatus::Armed);
        assert!(WakeOnMotion::is_armed(&imu));
        i2c.done();
    }

    #[test]
    fn test_arm_failure_exits_wom_mode() {
        let expectations = [
            write(reg::CTRL7, 0x00),
            write(reg::CTRL2, 0xD5).with_error(ErrorKind::Other),
            // Fallback switches the sensor off
            write(reg::CTRL7, 0x00),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        let status = imu.arm_wake_on_motion(&WomConfig::default());
        assert_eq!(status, MotionWakeStatus::Unavailable(Error::HardwareIo));
        assert!(!status.is_armed());
        assert_eq!(imu.state(), WomState::Idle);
        assert_eq!(imu.failed_step(), Some(WomStep::AccelConfig));
        i2c.done();
    }

    #[test]
    fn test_arm_failure_with_failed_exit() {
        let expectations = [
            write(reg::CTRL7, 0x00),
            write(reg::CTRL2, 0xD5).with_error(ErrorKind::Other),
            write(reg::CTRL7, 0x00).with_error(ErrorKind::Other),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        // The original failure is reported; the sensor could not be switched off
        let status = imu.arm_wake_on_motion(&WomConfig::default());
        assert_eq!(status, MotionWakeStatus::Unavailable(Error::HardwareIo));
        assert_eq!(imu.state(), WomState::Configuring);
        assert_eq!(imu.failed_step(), Some(WomStep::AccelConfig));
        i2c.done();
    }

    #[test]
    fn test_init_wom_only() {
        let expectations = [
            read(reg::WHO_AM_I, CHIP_ID),
            write(reg::RESET, RESET_CODE),
            write(reg::CTRL1, ctrl1::ADDR_AUTO_INCREMENT),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.init_wom_only(), Ok(()));
        i2c.done();
    }

    #[test]
    fn test_init_rejects_wrong_chip() {
        let expectations = [read(reg::WHO_AM_I, 0x68)];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        assert_eq!(imu.init_wom_only(), Err(Error::HardwareIo));
        i2c.done();
    }

    #[test]
    fn test_register_dump() {
        let expectations = [
            read(reg::WHO_AM_I, 0x05),
            read(reg::CTRL1, 0x50),
            read(reg::CTRL2, 0xD5),
            read(reg::CTRL5, 0x00),
            read(reg::CTRL7, 0x01),
            read(reg::CAL1_L, 200),
            read(reg::CAL1_H, 0x50),
            read(reg::STATUSINT, 0x00),
            read(reg::STATUS1, 0x00),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let mut imu = Qmi8658::new(i2c.clone(), NoopDelay::new());

        let dump = imu.read_registers().unwrap();
        assert!(dump.int2_enabled());
        assert!(dump.accel_only());
        assert_eq!(dump.cal1_l, 200);
        i2c.done();
    }
}
