//! Process-wide last-error text.
//!
//! Every failing operation overwrites this value. It is not scoped to a
//! call or a thread: read it right after the failure, before issuing
//! another operation, or it may describe something else. Prefer the
//! [`ProcessError`](crate::ProcessError) returned by the failing call.

use std::sync::Mutex;

/// Capacity of the last-error text, terminator included.
pub const LAST_ERROR_CAPACITY: usize = 512;

static LAST_ERROR: Mutex<String> = Mutex::new(String::new());

/// Get the most recently recorded error description.
///
/// Returns an empty string if nothing has failed yet.
pub fn get_last_error() -> String {
    match LAST_ERROR.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Overwrite the last-error text with `message`.
///
/// Text longer than the capacity is cut at a character boundary.
pub(crate) fn record(message: impl std::fmt::Display) {
    let text = clamp(message.to_string());
    let mut guard = match LAST_ERROR.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    *guard = text;
}

fn clamp(mut text: String) -> String {
    let limit = LAST_ERROR_CAPACITY - 1;
    if text.len() > limit {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
    }
    text
}
