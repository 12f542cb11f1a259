//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in thawbox-core, written against the thawbox-hal traits:
//!
//! - Temperature probes (DS18B20 on 1-Wire)
//! - Range finder (HC-SR04 ultrasonic)
//! - Alert outputs and reset button (GPIO)
//! - WiFi uplink (ESP-AT modem over UART, HTTP requests)

#![no_std]
#![deny(unsafe_code)]

pub mod alert;
pub mod net;
pub mod sensor;
