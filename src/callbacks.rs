//! Interrupt-context tick callback registry.
//!
//! One slot per [`TickEvent`].  The control-loop driver calls
//! [`CallbackRegistry::invoke`] from its interrupt on every iteration;
//! application modules install and clear their handler from task context.
//!
//! ```text
//! ┌──────────────┐ install/clear ┌──────────────────┐  invoke   ┌──────────────┐
//! │  Lifecycle   │──────────────▶│  Slot per event  │◀──────────│ Control-loop │
//! │  controller  │  (task ctx)   │  (critical sect) │  (ISR)    │     ISR      │
//! └──────────────┘               └──────────────────┘           └──────────────┘
//! ```
//!
//! Every slot access runs inside a critical section, so `invoke()` runs the
//! handler to completion before a concurrent `clear()` can swap the slot.
//! Once `clear()` returns, the removed handler is neither running nor able
//! to start.  Handlers must never call back into the registry.
//!
//! Slots are owned by a [`CallbackOwner`] token rather than a name, so two
//! instances of the same module never replace or clear each other's
//! handler.

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use std::sync::Arc;

use crate::app::ports::IsrSafe;
use crate::error::CallbackError;

/// Interrupt sources a module can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TickEvent {
    /// Once per control-loop (PWM) iteration.
    ControlLoop = 0,
    /// Once per completed ADC sampling sequence, before the control loop.
    AdcSample = 1,
}

impl TickEvent {
    pub const COUNT: usize = 2;
    pub const ALL: [TickEvent; Self::COUNT] = [Self::ControlLoop, Self::AdcSample];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Identity of one slot holder.
///
/// Every call to [`CallbackOwner::new`] yields a distinct token, even for
/// the same name.  The name is only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallbackOwner {
    id: u32,
    name: &'static str,
}

impl CallbackOwner {
    pub fn new(name: &'static str) -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(0);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            name,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Installed handler plus the token that owns it.
struct Slot {
    owner: CallbackOwner,
    handler: Arc<dyn IsrSafe>,
}

type SlotCell = Mutex<CriticalSectionRawMutex, RefCell<Option<Slot>>>;

/// Fixed-capacity table of tick callbacks, one slot per event.
pub struct CallbackRegistry {
    slots: [SlotCell; TickEvent::COUNT],
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackRegistry {
    /// Empty registry.  `const` so firmware can keep it in a `static`.
    pub const fn new() -> Self {
        Self {
            slots: [const { Mutex::new(RefCell::new(None)) }; TickEvent::COUNT],
        }
    }

    /// Publish `handler` for `event`.
    ///
    /// The incumbent owner may replace its own handler; any other owner gets
    /// [`CallbackError::AlreadyRegistered`] and the slot is left untouched.
    pub fn install(
        &self,
        event: TickEvent,
        owner: CallbackOwner,
        handler: Arc<dyn IsrSafe>,
    ) -> Result<(), CallbackError> {
        let replaced = self.slots[event.index()].lock(|cell| {
            let mut slot = cell.borrow_mut();
            match slot.as_ref() {
                Some(current) if current.owner != owner => Err(CallbackError::AlreadyRegistered {
                    event,
                    owner: current.owner.name,
                }),
                _ => Ok(slot.replace(Slot { owner, handler })),
            }
        })?;
        // Release the previous handler outside the critical section.
        drop(replaced);
        Ok(())
    }

    /// Remove the handler `owner` installed for `event`.
    ///
    /// Returns `true` if a handler was removed.  A slot held by another
    /// owner is left untouched.  After this returns no invocation of the
    /// removed handler is in progress or can begin.
    pub fn clear(&self, event: TickEvent, owner: CallbackOwner) -> bool {
        let removed = self.slots[event.index()].lock(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.as_ref().is_some_and(|s| s.owner == owner) {
                slot.take()
            } else {
                None
            }
        });
        removed.is_some()
    }

    /// Run the handler for `event`, if any.  Called from interrupt context.
    pub fn invoke(&self, event: TickEvent) {
        self.slots[event.index()].lock(|cell| {
            if let Some(slot) = cell.borrow().as_ref() {
                slot.handler.on_tick();
            }
        });
    }

    pub fn is_installed(&self, event: TickEvent) -> bool {
        self.slots[event.index()].lock(|cell| cell.borrow().is_some())
    }

    /// Name of the module holding the slot.
    pub fn owner(&self, event: TickEvent) -> Option<&'static str> {
        self.slots[event.index()].lock(|cell| cell.borrow().as_ref().map(|s| s.owner.name))
    }
}
