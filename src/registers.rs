//! ADC register access.
//!
//! The controller never touches memory-mapped registers directly; it drives
//! an [`AdcRegisters`] implementation. On AVR targets that is
//! [`crate::avr::AvrAdc`], on hosts the [`crate::sim::SimulatedAdc`].

use critical_section::CriticalSection;

/// ADMUX: reference selection bit 0 (AVcc with external capacitor on AREF).
pub const REFS0: u8 = 1 << 6;
/// ADMUX: low three multiplexer bits.
pub const MUX_MASK: u8 = 0x07;
/// ADCSRA: start conversion / conversion in progress.
pub const ADSC: u8 = 1 << 6;
/// ADCSRA: conversion complete flag, cleared by writing a one.
pub const ADIF: u8 = 1 << 4;
/// ADCSRA: conversion complete interrupt enable.
pub const ADIE: u8 = 1 << 3;
/// ADCSRB: upper multiplexer bank (channels 8..=15).
pub const MUX5: u8 = 1 << 3;

/// ADMUX value for a channel: AVcc reference, right-adjusted result.
#[inline]
pub const fn admux_for(channel: u8) -> u8 {
    REFS0 | (channel & MUX_MASK)
}

/// Register-level operations needed to run one conversion.
///
/// Methods take `&self` because the underlying peripheral is a singleton
/// shared between main and interrupt context.
pub trait AdcRegisters {
    /// Write ADMUX (reference and low multiplexer bits).
    fn select_channel(&self, admux: u8);

    /// Set or clear MUX5. Only called on variants that have it.
    fn select_upper_bank(&self, upper: bool);

    /// Set ADSC. Implemented as a read-modify-write of ADCSRA, which writes
    /// back a pending ADIF and thereby clears it.
    fn trigger(&self);

    /// Set or clear ADIE, with the same ADIF write-back as [`Self::trigger`].
    fn set_interrupt_enabled(&self, enabled: bool);

    /// ADSC is still set.
    fn conversion_in_progress(&self) -> bool;

    /// The 16-bit data register. Multi-byte; callers provide atomicity,
    /// see [`Self::masked`].
    fn read_result(&self) -> u16;

    /// Run `f` with the ADC vector unable to preempt it.
    fn masked<T>(&self, f: impl FnOnce(CriticalSection<'_>) -> T) -> T {
        critical_section::with(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admux_uses_avcc_reference() {
        assert_eq!(admux_for(0), 0x40);
        assert_eq!(admux_for(3), 0x43);
    }

    #[test]
    fn test_admux_keeps_low_mux_bits_only() {
        assert_eq!(admux_for(9), 0x41);
        assert_eq!(admux_for(15), 0x47);
    }
}
