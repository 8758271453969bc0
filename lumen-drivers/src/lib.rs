//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in lumen-core:
//!
//! - QMI8658 6-axis IMU, wake-on-motion register protocol
//! - Bounded register polling used by command handshakes

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod imu;
pub mod poll;
