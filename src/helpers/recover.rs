//! Turns panics raised by caller-supplied code (translators, setters) into
//! ordinary errors at public entry points.
use crate::binding::BindingError;
use std::any::Any;
use std::panic::catch_unwind;
use std::panic::AssertUnwindSafe;

/// Runs `f`, converting a panic into [`BindingError::InternalFault`].
pub(crate) fn recover<T, F>(operation: &'static str, f: F) -> Result<T, BindingError>
where
    F: FnOnce() -> Result<T, BindingError>,
{
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|payload| {
        Err(BindingError::InternalFault {
            operation,
            message: panic_message(payload.as_ref()),
        })
    })
}

/// Extracts the message of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.to_owned()
    } else {
        "unknown panic".to_owned()
    }
}
