//! AVR binding: real registers, the process-wide controller and the `ADC`
//! vector.
//!
//! The peripheral must already be powered and clocked (ADEN set, prescaler
//! chosen), and global interrupts enabled for callback mode. Arduino-style
//! board init does both.

#[cfg(not(any(
    feature = "atmega168",
    feature = "atmega328p",
    feature = "atmega1280",
    feature = "atmega2560",
    feature = "atmega32u4",
    feature = "atmega1284p"
)))]
compile_error!(
    "select the target MCU with one of the features: \
     atmega168, atmega328p, atmega1280, atmega2560, atmega32u4, atmega1284p"
);

#[cfg(feature = "atmega168")]
use avr_device::atmega168 as pac;
#[cfg(feature = "atmega1280")]
use avr_device::atmega1280 as pac;
#[cfg(feature = "atmega1284p")]
use avr_device::atmega1284p as pac;
#[cfg(feature = "atmega2560")]
use avr_device::atmega2560 as pac;
#[cfg(feature = "atmega328p")]
use avr_device::atmega328p as pac;
#[cfg(feature = "atmega32u4")]
use avr_device::atmega32u4 as pac;

use crate::controller::AsyncAdc;
use crate::registers::{ADIE, ADSC, AdcRegisters};
use crate::slot::{Callback, Context, PendingSlot};

#[cfg(adc_mux5)]
use crate::registers::MUX5;

/// The on-chip ADC.
pub struct AvrAdc;

impl AvrAdc {
    #[inline(always)]
    fn regs(&self) -> &'static pac::adc::RegisterBlock {
        // SAFETY: fixed MMIO address; every access below is a single
        // volatile register operation.
        unsafe { &*pac::ADC::ptr() }
    }
}

impl AdcRegisters for AvrAdc {
    fn select_channel(&self, admux: u8) {
        self.regs().admux.write(|w| unsafe { w.bits(admux) });
    }

    #[cfg(adc_mux5)]
    fn select_upper_bank(&self, upper: bool) {
        self.regs().adcsrb.modify(|r, w| {
            let bits = r.bits() & !MUX5;
            unsafe { w.bits(if upper { bits | MUX5 } else { bits }) }
        });
    }

    #[cfg(not(adc_mux5))]
    fn select_upper_bank(&self, _upper: bool) {}

    fn trigger(&self) {
        self.regs()
            .adcsra
            .modify(|r, w| unsafe { w.bits(r.bits() | ADSC) });
    }

    fn set_interrupt_enabled(&self, enabled: bool) {
        self.regs().adcsra.modify(|r, w| {
            let bits = if enabled {
                r.bits() | ADIE
            } else {
                r.bits() & !ADIE
            };
            unsafe { w.bits(bits) }
        });
    }

    fn conversion_in_progress(&self) -> bool {
        self.regs().adcsra.read().bits() & ADSC != 0
    }

    fn read_result(&self) -> u16 {
        self.regs().adc.read().bits()
    }
}

static SLOT: PendingSlot = PendingSlot::new();
static ASYNC_ADC: AsyncAdc<'static, AvrAdc> = AsyncAdc::new(&AvrAdc, &SLOT);

/// Start a conversion and return immediately.
///
/// With `Some(callback)`, `callback(result, context)` runs from the `ADC`
/// interrupt when the conversion finishes. With `None`, poll
/// [`is_conversion_complete`] and fetch the value with
/// [`read_conversion_value`].
///
/// Only one conversion may be outstanding. Calling this again before the
/// previous one completed drops the previous request. Calling it from inside
/// the callback is fine.
pub fn start_conversion(channel: u8, callback: Option<Callback>, context: Context) {
    ASYNC_ADC.start_conversion(channel, callback, context);
}

/// `true` when no conversion is running.
pub fn is_conversion_complete() -> bool {
    ASYNC_ADC.is_conversion_complete()
}

/// The latest conversion result.
pub fn read_conversion_value() -> u16 {
    ASYNC_ADC.read_conversion_value()
}

#[cfg(feature = "atmega168")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega168)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}

#[cfg(feature = "atmega328p")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega328p)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}

#[cfg(feature = "atmega1280")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega1280)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}

#[cfg(feature = "atmega2560")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega2560)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}

#[cfg(feature = "atmega32u4")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega32u4)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}

#[cfg(feature = "atmega1284p")]
#[allow(non_snake_case)]
#[avr_device::interrupt(atmega1284p)]
fn ADC() {
    ASYNC_ADC.on_interrupt();
}
