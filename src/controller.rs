//! The async ADC controller.
//!
//! One conversion may be outstanding at a time. [`AsyncAdc::start_conversion`]
//! records who to notify in a [`PendingSlot`] and kicks the hardware;
//! [`AsyncAdc::on_interrupt`] runs from the conversion-complete vector,
//! empties the slot and hands the result to the callback.
//!
//! # Lifecycle
//!
//! ```text
//!            start_conversion            hardware
//!   Idle ─────────────────────▶ Sampling ────────▶ Complete
//!    ▲                                               │
//!    └──── on_interrupt (callback) / next start ─────┘
//! ```

use crate::registers::{AdcRegisters, admux_for};
use crate::slot::{Callback, Context, Mode, Pending, PendingSlot};
use crate::variant;

/// Interrupt-driven ADC front end over a register implementation `R`.
pub struct AsyncAdc<'a, R> {
    regs: &'a R,
    slot: &'a PendingSlot,
}

impl<'a, R: AdcRegisters> AsyncAdc<'a, R> {
    /// Usable in `static` position so the ISR can reach it.
    pub const fn new(regs: &'a R, slot: &'a PendingSlot) -> Self {
        Self { regs, slot }
    }

    /// Start a conversion on `channel` and return immediately.
    ///
    /// `channel` may be a channel index or an Arduino-style pin number; see
    /// [`variant::normalize_channel`]. With a callback, the completion
    /// interrupt is enabled and `callback(result, context)` runs from the ISR.
    /// Without one, the interrupt stays off and the caller polls
    /// [`Self::is_conversion_complete`] and [`Self::read_conversion_value`].
    ///
    /// Arming again before the previous conversion has completed replaces the
    /// previous request; its callback will never run.
    pub fn start_conversion(&self, channel: u8, callback: Option<Callback>, context: Context) {
        let channel = variant::normalize_channel(channel);

        if variant::HAS_EXTENDED_MUX {
            self.regs.select_upper_bank(variant::upper_bank(channel));
        }
        self.regs.select_channel(admux_for(channel));

        let pending = callback.map(|callback| Pending { callback, context });
        let replaced = critical_section::with(|cs| self.slot.arm(cs, pending));
        if let Some(stale) = replaced {
            warn!(
                "adc: re-armed before completion, dropping request for {}",
                stale.context
            );
        }

        match pending {
            Some(_) => {
                trace!("adc: start ch {} mode {}", channel, Mode::Callback);
                // Trigger first: its ADCSRA write-back clears any ADIF left
                // over from a polled conversion before ADIE can see it.
                self.regs.trigger();
                self.regs.set_interrupt_enabled(true);
            }
            None => {
                trace!("adc: start ch {} mode {}", channel, Mode::Polling);
                self.regs.set_interrupt_enabled(false);
                self.regs.trigger();
            }
        }
    }

    /// Conversion-complete interrupt body.
    ///
    /// The slot is emptied and the interrupt disabled before the callback
    /// runs, so the callback may call [`Self::start_conversion`] again.
    pub fn on_interrupt(&self) {
        let (pending, result) = self.regs.masked(|cs| {
            let pending = self.slot.take(cs);
            self.regs.set_interrupt_enabled(false);
            (pending, self.regs.read_result())
        });

        if let Some(Pending { callback, context }) = pending {
            callback(result, context);
        }
    }

    /// `true` once the hardware has cleared its conversion-in-progress flag.
    pub fn is_conversion_complete(&self) -> bool {
        !self.regs.conversion_in_progress()
    }

    /// Latest conversion result, read without tearing.
    pub fn read_conversion_value(&self) -> u16 {
        self.regs.masked(|_| self.regs.read_result())
    }

    /// A callback is registered and its interrupt has not fired yet.
    pub fn is_armed(&self) -> bool {
        critical_section::with(|cs| !self.slot.is_empty(cs))
    }
}
