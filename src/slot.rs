//! The pending conversion slot shared between the arm path and the ISR.

use core::cell::Cell;
use core::fmt;

use critical_section::{CriticalSection, Mutex};

/// Completion callback: `(result, context)`. Runs in interrupt context.
pub type Callback = fn(u16, Context);

/// Opaque caller-owned pointer handed back to the callback untouched.
///
/// This crate never dereferences it and never frees it; keeping the pointee
/// alive until the callback has run is the caller's job.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Context(*const ());

// The pointer is only carried, never dereferenced here.
unsafe impl Send for Context {}

impl Context {
    /// No context.
    pub const NULL: Self = Self(core::ptr::null());

    pub const fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr.cast())
    }

    pub const fn from_ref<T>(value: &'static T) -> Self {
        Self::from_ptr(value as *const T)
    }

    /// Context carrying a plain integer, e.g. a request id.
    pub const fn from_addr(addr: usize) -> Self {
        Self(core::ptr::without_provenance(addr))
    }

    pub const fn as_ptr<T>(self) -> *const T {
        self.0.cast()
    }

    pub fn addr(self) -> usize {
        self.0.addr()
    }

    pub fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Context({:#x})", self.addr())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Context {
    fn format(&self, f: defmt::Formatter<'_>) {
        defmt::write!(f, "Context({=usize:#x})", self.addr())
    }
}

/// How a conversion reports its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// The ISR delivers the result to a callback.
    Callback,
    /// No interrupt; the caller polls.
    Polling,
}

/// A registered callback and the context it gets back.
#[derive(Debug, Clone, Copy)]
pub struct Pending {
    pub callback: Callback,
    pub context: Context,
}

/// Holds at most one [`Pending`] request.
///
/// Only ever touched inside a critical section, so the ISR can never observe
/// a callback without its matching context.
pub struct PendingSlot {
    inner: Mutex<Cell<Option<Pending>>>,
}

impl PendingSlot {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(None)),
        }
    }

    /// Store a request (or clear the slot for polling mode), returning
    /// whatever was there before.
    pub fn arm(&self, cs: CriticalSection<'_>, pending: Option<Pending>) -> Option<Pending> {
        self.inner.borrow(cs).replace(pending)
    }

    /// Empty the slot, returning its previous content.
    pub fn take(&self, cs: CriticalSection<'_>) -> Option<Pending> {
        self.inner.borrow(cs).take()
    }

    pub fn is_empty(&self, cs: CriticalSection<'_>) -> bool {
        let pending = self.inner.borrow(cs).get();
        pending.is_none()
    }
}

impl Default for PendingSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: u16, _: Context) {}

    fn other(_: u16, _: Context) {}

    #[test]
    fn test_slot_starts_empty() {
        let slot = PendingSlot::new();
        critical_section::with(|cs| assert!(slot.is_empty(cs)));
    }

    #[test]
    fn test_take_clears_both_fields() {
        let slot = PendingSlot::new();
        let pending = Pending {
            callback: noop,
            context: Context::from_addr(0xBEEF),
        };

        critical_section::with(|cs| {
            assert!(slot.arm(cs, Some(pending)).is_none());
            assert!(!slot.is_empty(cs));

            let taken = slot.take(cs).unwrap();
            assert_eq!(taken.context.addr(), 0xBEEF);
            assert!(slot.is_empty(cs));
            assert!(slot.take(cs).is_none());
        });
    }

    #[test]
    fn test_arm_overwrites_last_write_wins() {
        let slot = PendingSlot::new();
        let first = Pending {
            callback: noop,
            context: Context::from_addr(1),
        };
        let second = Pending {
            callback: other,
            context: Context::from_addr(2),
        };

        critical_section::with(|cs| {
            slot.arm(cs, Some(first));
            let previous = slot.arm(cs, Some(second));
            assert_eq!(previous.map(|p| p.context.addr()), Some(1));
            assert_eq!(slot.take(cs).map(|p| p.context.addr()), Some(2));
        });
    }

    #[test]
    fn test_context_roundtrips_pointer() {
        static VALUE: u32 = 42;
        let ctx = Context::from_ref(&VALUE);
        assert!(!ctx.is_null());
        assert_eq!(ctx.as_ptr::<u32>(), &VALUE as *const u32);
        assert!(Context::NULL.is_null());
        assert_eq!(Context::default(), Context::NULL);
    }
}
