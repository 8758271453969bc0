//! Register-level properties of the QMI8658 wake-on-motion driver.
//! Runs the driver against an in-memory register file instead of a
//! scripted transaction list, so arbitrary starting register contents can
//! be explored.

use std::convert::Infallible;

use embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress};
use embedded_hal_mock::eh1::delay::NoopDelay;
use lumen_drivers::imu::registers::{ctrl1, reg, STATUSINT_CMD_DONE};
use lumen_drivers::imu::{AccelOdr, InterruptLevel, InterruptPin, Qmi8658, WomConfig, WomState};

/// 256-byte register file with a write pointer, like the real device
struct RegisterFile {
    regs: [u8; 256],
    pointer: u8,
    writes: Vec<(u8, u8)>,
}

impl RegisterFile {
    fn new() -> Self {
        Self {
            regs: [0; 256],
            pointer: 0,
            writes: Vec::new(),
        }
    }
}

impl ErrorType for RegisterFile {
    type Error = Infallible;
}

impl I2c<SevenBitAddress> for RegisterFile {
    fn transaction(
        &mut self,
        _address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&register, data)) = bytes.split_first() {
                        self.pointer = register;
                        for &value in data {
                            self.regs[usize::from(self.pointer)] = value;
                            self.writes.push((self.pointer, value));
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                    }
                }
                Operation::Read(buf) => {
                    for byte in buf.iter_mut() {
                        *byte = self.regs[usize::from(self.pointer)];
                        self.pointer = self.pointer.wrapping_add(1);
                    }
                }
            }
        }
        Ok(())
    }
}

proptest::proptest! {
    /// Enabling then disabling the WoM interrupt touches only CTRL1 bit 4.
    #[test]
    fn interrupt_toggle_only_changes_bit4(initial in 0u8..=255u8) {
        let mut bus = RegisterFile::new();
        bus.regs[usize::from(reg::CTRL1)] = initial;
        let mut imu = Qmi8658::new(&mut bus, NoopDelay::new());

        imu.enable_wom_interrupt().unwrap();
        imu.disable_wom_interrupt().unwrap();
        drop(imu);

        let after_disable = bus.regs[usize::from(reg::CTRL1)];
        assert_eq!(after_disable, initial & !ctrl1::INT2_ENABLE);
        assert_eq!(bus.writes[0], (reg::CTRL1, initial | ctrl1::INT2_ENABLE));
        assert_eq!(bus.writes.len(), 2);
    }

    /// With bit 4 initially clear, enable followed by disable is a round trip.
    #[test]
    fn interrupt_round_trip_restores(initial in 0u8..=255u8) {
        let initial = initial & !ctrl1::INT2_ENABLE;
        let mut bus = RegisterFile::new();
        bus.regs[usize::from(reg::CTRL1)] = initial;
        let mut imu = Qmi8658::new(&mut bus, NoopDelay::new());

        imu.enable_wom_interrupt().unwrap();
        imu.disable_wom_interrupt().unwrap();
        drop(imu);

        assert_eq!(bus.regs[usize::from(reg::CTRL1)], initial);
    }

    /// Configured registers reflect the packed config for any valid input.
    #[test]
    fn configure_programs_packed_registers(
        threshold in 50u16..=500u16,
        blanking in 0u8..=255u8,
        high in proptest::bool::ANY,
        int1 in proptest::bool::ANY,
    ) {
        let pin = if int1 { InterruptPin::Int1 } else { InterruptPin::Int2 };
        let level = if high { InterruptLevel::High } else { InterruptLevel::Low };
        let config = WomConfig::new(threshold)
            .with_odr(AccelOdr::Hz11)
            .with_blanking_samples(blanking)
            .with_interrupt(pin, level);

        let mut bus = RegisterFile::new();
        // Command completes immediately
        bus.regs[usize::from(reg::STATUSINT)] = STATUSINT_CMD_DONE;
        let mut imu = Qmi8658::new(&mut bus, NoopDelay::new());
        imu.configure_wom(&config).unwrap();
        assert_eq!(imu.state(), WomState::Armed);
        drop(imu);

        assert_eq!(bus.regs[usize::from(reg::CTRL2)], 0xE5);
        assert_eq!(bus.regs[usize::from(reg::CAL1_L)], threshold.min(255) as u8);
        assert_eq!(bus.regs[usize::from(reg::CAL1_H)] & 0x0F, 0);
        assert_eq!(bus.regs[usize::from(reg::CAL1_H)] >> 6, blanking & 0x03);
        assert_eq!(bus.regs[usize::from(reg::CTRL7)], 0x01);

        let order: Vec<u8> = bus.writes.iter().map(|&(register, _)| register).collect();
        assert_eq!(
            order,
            [reg::CTRL7, reg::CTRL2, reg::CAL1_L, reg::CAL1_H, reg::CTRL9, reg::CTRL9, reg::CTRL7]
        );
    }
}
