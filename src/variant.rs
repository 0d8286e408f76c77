//! Build-time MCU variant selection.
//!
//! Arduino-style cores number the analog inputs after the digital pins, so
//! `A0` is pin 14 on an Uno and pin 54 on a Mega. Anything at or above the
//! variant's threshold is treated as such a pin number and folded back onto
//! the channel index.

/// First pin number that aliases analog channel 0.
#[cfg(any(feature = "atmega1280", feature = "atmega2560"))]
pub const CHANNEL_THRESHOLD: u8 = 54;

/// First pin number that aliases analog channel 0.
#[cfg(feature = "atmega32u4")]
pub const CHANNEL_THRESHOLD: u8 = 18;

/// First pin number that aliases analog channel 0. Shared by the whole
/// ATmega1284/644 family; only the 1284P is offered as a feature.
#[cfg(feature = "atmega1284p")]
pub const CHANNEL_THRESHOLD: u8 = 24;

/// First pin number that aliases analog channel 0.
#[cfg(not(any(
    feature = "atmega1280",
    feature = "atmega2560",
    feature = "atmega32u4",
    feature = "atmega1284p"
)))]
pub const CHANNEL_THRESHOLD: u8 = 14;

/// Whether ADCSRB has the MUX5 bit selecting channels 8..=15.
pub const HAS_EXTENDED_MUX: bool = cfg!(adc_mux5);

/// Fold a pin number onto its analog channel.
///
/// Values below [`CHANNEL_THRESHOLD`] pass through untouched. There is no
/// range check beyond that; an out-of-range channel selects whatever the
/// multiplexer decodes it to.
#[inline]
pub const fn normalize_channel(channel: u8) -> u8 {
    if channel >= CHANNEL_THRESHOLD {
        channel - CHANNEL_THRESHOLD
    } else {
        channel
    }
}

/// Whether a (normalized) channel lives in the upper multiplexer bank.
#[inline]
pub const fn upper_bank(channel: u8) -> bool {
    (channel >> 3) & 0x01 != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_indices_pass_through() {
        for ch in 0..CHANNEL_THRESHOLD {
            assert_eq!(normalize_channel(ch), ch);
        }
    }

    #[test]
    fn test_pin_numbers_fold_onto_channels() {
        assert_eq!(normalize_channel(CHANNEL_THRESHOLD), 0);
        assert_eq!(normalize_channel(CHANNEL_THRESHOLD + 5), 5);
    }

    #[test]
    fn test_upper_bank() {
        assert!(!upper_bank(0));
        assert!(!upper_bank(7));
        assert!(upper_bank(8));
        assert!(upper_bank(15));
    }

    #[cfg(not(any(
        feature = "atmega1280",
        feature = "atmega2560",
        feature = "atmega32u4",
        feature = "atmega1284p"
    )))]
    #[test]
    fn test_default_variant_threshold() {
        assert_eq!(CHANNEL_THRESHOLD, 14);
        assert!(!HAS_EXTENDED_MUX);
    }
}
