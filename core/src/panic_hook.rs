//! Process-wide panic hook.
//!
//! The default hook writes to stderr, which corrupts a raw-mode terminal. This
//! hook sends the report to `tracing` instead and remembers the panic location
//! for the current thread so [`contain`](crate::contain) can attach it to the
//! fault's diagnostic trace.

use std::cell::RefCell;
use std::panic;
use std::sync::Once;

thread_local! {
    static LAST_PANIC_LOCATION: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Installs the hook once; later calls are no-ops.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        panic::set_hook(Box::new(|info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()));
            let message = info.payload_as_str().unwrap_or("unknown panic");
            tracing::error!(
                location = location.as_deref().unwrap_or("unknown"),
                "panic: {message}"
            );
            LAST_PANIC_LOCATION.with(|slot| *slot.borrow_mut() = location);
        }));
    });
}

pub(crate) fn clear_last_panic_location() {
    LAST_PANIC_LOCATION.with(|slot| *slot.borrow_mut() = None);
}

pub(crate) fn take_last_panic_location() -> Option<String> {
    LAST_PANIC_LOCATION.with(|slot| slot.borrow_mut().take())
}
