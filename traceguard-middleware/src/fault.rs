//! Panic capture support shared by both recovery middlewares
//!
//! The recovery middlewares catch unwinds after the fact, at which point
//! the panicking frames are already gone. A process-wide panic hook records
//! the backtrace at the panic site into a thread-local slot; the recovery
//! middleware drains that slot when it converts the fault. Unwinding stays
//! on the thread that polled the handler, so the slot is always read by the
//! middleware that observes the unwind.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic;
use std::sync::Once;

thread_local! {
    static LAST_BACKTRACE: RefCell<Option<String>> = RefCell::new(None);
}

static HOOK: Once = Once::new();

/// Install the backtrace-capturing panic hook.
///
/// Call once at process startup, before serving traffic. The previous hook
/// keeps running, so panic output outside a request still reaches stderr.
/// Without this hook the recovery middlewares fall back to a backtrace
/// taken at the catch site.
pub fn install_panic_capture() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            LAST_BACKTRACE.with(|slot| {
                *slot.borrow_mut() = Some(Backtrace::force_capture().to_string());
            });
            previous(info);
        }));
    });
}

/// Take the backtrace recorded for the most recent panic on this thread,
/// or capture one at the call site when the hook is not installed.
pub fn captured_backtrace() -> String {
    LAST_BACKTRACE
        .with(|slot| slot.borrow_mut().take())
        .unwrap_or_else(|| Backtrace::force_capture().to_string())
}

/// Render a panic payload as text.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_variants_render_as_text() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new("boom".to_string());
        assert_eq!(panic_message(boxed.as_ref()), "boom");

        let boxed: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }

    #[test]
    fn hook_records_the_panic_site_backtrace() {
        install_panic_capture();
        let caught = std::panic::catch_unwind(|| panic!("boom"));
        assert!(caught.is_err());
        assert!(!captured_backtrace().is_empty());
    }
}
