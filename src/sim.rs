//! Host-side stand-in for the AVR ADC.
//!
//! Models the parts of the peripheral the controller relies on:
//!
//! - ADSC is set while sampling and ignored if written during a conversion.
//! - ADIF is set on completion, cleared on vector entry and by any
//!   read-modify-write of ADCSRA (the flag is write-one-to-clear).
//! - The data register is read low byte first; reading ADCL locks the data
//!   register until ADCH is read, and a conversion that finishes meanwhile is
//!   lost.
//! - A result read outside [`AdcRegisters::masked`] can be preempted between
//!   its two byte accesses. The vector's own ADCL/ADCH read releases the lock,
//!   so a conversion landing then replaces the high byte under the reader.
//!
//! Tests drive the "hardware" side with [`SimulatedAdc::complete`] or
//! [`SimulatedAdc::finish`], which also runs the interrupt handler when the
//! vector would fire.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};
use heapless::HistoryBuffer;
use typed_fsm::{Transition, state_machine};

use crate::controller::AsyncAdc;
use crate::registers::{AdcRegisters, MUX_MASK};

/// Number of latched results kept for inspection.
pub const HISTORY_DEPTH: usize = 16;

/// Hardware-side view of the current conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleState {
    Idle,
    Sampling,
    Complete,
}

// Sampler registers, the FSM context
pub struct Sampler {
    admux: u8,
    mux5: bool,
    adsc: bool,
    adie: bool,
    adif: bool,
    sample: u16,
    data: u16,
    data_locked: bool,
    masked: u8,
    conversions: u32,
    mid_read: Option<u16>,
    history: HistoryBuffer<u16, HISTORY_DEPTH>,
}

impl Sampler {
    const fn new() -> Self {
        Self {
            admux: 0,
            mux5: false,
            adsc: false,
            adie: false,
            adif: false,
            sample: 0,
            data: 0,
            data_locked: false,
            masked: 0,
            conversions: 0,
            mid_read: None,
            history: HistoryBuffer::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum SamplerEvent {
    /// ADSC written to one.
    Trigger,
    /// The successive-approximation cycle finished with this value.
    Finish(u16),
}

state_machine! {
    Name: SamplerFsm,
    Context: Sampler,
    Event: SamplerEvent,
    States: {
        Idle => {
            entry: |_ctx| {}
            process: |_ctx, evt| {
                match evt {
                    SamplerEvent::Trigger => Transition::To(SamplerFsm::Sampling),
                    SamplerEvent::Finish(_) => Transition::None,
                }
            }
        },

        Sampling => {
            entry: |ctx| {
                ctx.adsc = true;
                ctx.conversions += 1;
            }
            process: |ctx, evt| {
                match evt {
                    // ADSC writes are ignored mid-conversion
                    SamplerEvent::Trigger => Transition::None,
                    SamplerEvent::Finish(value) => {
                        ctx.sample = *value;
                        Transition::To(SamplerFsm::Complete)
                    }
                }
            }
        },

        Complete => {
            entry: |ctx| {
                ctx.adsc = false;
                ctx.adif = true;
                if !ctx.data_locked {
                    ctx.data = ctx.sample;
                    ctx.history.write(ctx.sample);
                }
            }
            process: |_ctx, evt| {
                match evt {
                    SamplerEvent::Trigger => Transition::To(SamplerFsm::Sampling),
                    SamplerEvent::Finish(_) => Transition::None,
                }
            }
        }
    }
}

struct SimCore {
    fsm: SamplerFsm,
    regs: Sampler,
}

impl SimCore {
    fn dispatch(&mut self, event: SamplerEvent) {
        self.fsm.dispatch(&mut self.regs, &event);
    }
}

/// Simulated ADC peripheral implementing [`AdcRegisters`].
pub struct SimulatedAdc {
    core: Mutex<RefCell<SimCore>>,
}

impl SimulatedAdc {
    pub const fn new() -> Self {
        Self {
            core: Mutex::new(RefCell::new(SimCore {
                fsm: SamplerFsm::Idle,
                regs: Sampler::new(),
            })),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut SimCore) -> T) -> T {
        critical_section::with(|cs| f(&mut self.core.borrow_ref_mut(cs)))
    }

    /// Finish the running conversion with `value`.
    ///
    /// Returns `true` when the completion vector fires, i.e. ADIE was set.
    /// Vector entry clears ADIF, as the hardware does. The handler itself is
    /// not run; see [`Self::finish`].
    pub fn complete(&self, value: u16) -> bool {
        self.with(|core| {
            core.dispatch(SamplerEvent::Finish(value));
            if core.regs.adie && core.regs.adif {
                core.regs.adif = false;
                true
            } else {
                false
            }
        })
    }

    /// [`Self::complete`], then run `adc`'s interrupt handler if the vector
    /// fired.
    pub fn finish(&self, adc: &AsyncAdc<'_, Self>, value: u16) -> bool {
        let fired = self.complete(value);
        if fired {
            adc.on_interrupt();
        }
        fired
    }

    /// Let the running conversion finish with `value` between the low and
    /// high byte accesses of the next result read.
    pub fn complete_during_next_read(&self, value: u16) {
        self.with(|core| core.regs.mid_read = Some(value));
    }

    pub fn state(&self) -> SampleState {
        self.with(|core| match core.fsm {
            SamplerFsm::Idle => SampleState::Idle,
            SamplerFsm::Sampling => SampleState::Sampling,
            SamplerFsm::Complete => SampleState::Complete,
        })
    }

    /// Channel the multiplexer currently decodes, including MUX5.
    pub fn selected_channel(&self) -> u8 {
        self.with(|core| {
            let bank = if core.regs.mux5 { 0x08 } else { 0 };
            (core.regs.admux & MUX_MASK) | bank
        })
    }

    pub fn admux(&self) -> u8 {
        self.with(|core| core.regs.admux)
    }

    pub fn interrupt_enabled(&self) -> bool {
        self.with(|core| core.regs.adie)
    }

    pub fn interrupt_flag(&self) -> bool {
        self.with(|core| core.regs.adif)
    }

    /// Conversions started since reset.
    pub fn conversions(&self) -> u32 {
        self.with(|core| core.regs.conversions)
    }

    /// Most recent value that made it into the data register.
    pub fn last_latched(&self) -> Option<u16> {
        self.with(|core| core.regs.history.recent().copied())
    }

    /// Number of results that made it into the data register (saturates at
    /// [`HISTORY_DEPTH`]).
    pub fn latched_count(&self) -> usize {
        self.with(|core| core.regs.history.len())
    }
}

impl Default for SimulatedAdc {
    fn default() -> Self {
        Self::new()
    }
}

impl AdcRegisters for SimulatedAdc {
    fn select_channel(&self, admux: u8) {
        self.with(|core| core.regs.admux = admux);
    }

    fn select_upper_bank(&self, upper: bool) {
        self.with(|core| core.regs.mux5 = upper);
    }

    fn trigger(&self) {
        self.with(|core| {
            core.regs.adif = false;
            core.dispatch(SamplerEvent::Trigger);
        });
    }

    fn set_interrupt_enabled(&self, enabled: bool) {
        self.with(|core| {
            core.regs.adif = false;
            core.regs.adie = enabled;
        });
    }

    fn conversion_in_progress(&self) -> bool {
        self.with(|core| core.regs.adsc)
    }

    fn read_result(&self) -> u16 {
        self.with(|core| {
            let low = core.regs.data as u8;
            core.regs.data_locked = true;

            if let Some(value) = core.regs.mid_read.take() {
                if core.regs.masked == 0 {
                    // preempted: the vector's result read drops the lock
                    core.regs.data_locked = false;
                }
                core.dispatch(SamplerEvent::Finish(value));
            }

            let high = (core.regs.data >> 8) as u8;
            core.regs.data_locked = false;
            u16::from_le_bytes([low, high])
        })
    }

    fn masked<T>(&self, f: impl FnOnce(CriticalSection<'_>) -> T) -> T {
        self.with(|core| core.regs.masked += 1);
        let result = critical_section::with(f);
        self.with(|core| core.regs.masked -= 1);
        result
    }
}
