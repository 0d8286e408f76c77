//! SPDX-License-Identifier: MIT OR Apache-2.0
//!
//! # Non-blocking analog reads for AVR
//!
//! Start a conversion, return right away, and get the result from the `ADC`
//! interrupt through a callback:
//!
//! ```ignore
//! use avr_analog_async::{Context, start_conversion};
//!
//! fn on_sample(value: u16, _ctx: Context) {
//!     // interrupt context: keep it short, or re-arm
//!     start_conversion(0, Some(on_sample), Context::NULL);
//! }
//!
//! start_conversion(0, Some(on_sample), Context::NULL);
//! ```
//!
//! Passing `None` instead of a callback leaves the interrupt off; poll
//! `is_conversion_complete` and fetch the value with
//! `read_conversion_value`.
//!
//! - **Controller:** [`AsyncAdc`] over any [`AdcRegisters`] (`controller.rs`).
//! - **Shared state:** the single-request [`PendingSlot`] (`slot.rs`).
//! - **Variants:** pin/channel threshold and MUX5, fixed at build time
//!   through Cargo features (`variant.rs`).
//! - **Hardware:** `avr.rs` on AVR targets, the `sim` model everywhere else.

#![cfg_attr(not(test), no_std)]

// --- Modules ---
mod fmt;

pub mod controller;
pub mod registers;
pub mod slot;
pub mod variant;

#[cfg(target_arch = "avr")]
pub mod avr;

#[cfg(not(target_arch = "avr"))]
pub mod sim;

// --- Re-exports ---
pub use controller::AsyncAdc;
pub use registers::AdcRegisters;
pub use slot::{Callback, Context, Mode, PendingSlot};
pub use variant::{CHANNEL_THRESHOLD, HAS_EXTENDED_MUX};

#[cfg(target_arch = "avr")]
pub use avr::{AvrAdc, is_conversion_complete, read_conversion_value, start_conversion};
