//! Processor warnings with colored terminal output.
//!
//! Provides deduplication so a document that hits the same unsupported
//! construct a thousand times only reports it once. Used by the HTML
//! processor to report markup it bails on, and by the CLI drivers.
//!
//! Setting `WREN_QUIET` to a non-empty value other than `0` silences output
//! while still recording warnings.

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Environment variable that silences warning output.
pub const QUIET_ENV_VAR: &str = "WREN_QUIET";

/// Every warning key printed so far, formatted as `[component] message`.
static WARNED: LazyLock<Mutex<HashSet<String>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Whether output is silenced, read once per process.
static QUIET: LazyLock<bool> = LazyLock::new(|| {
    std::env::var(QUIET_ENV_VAR).is_ok_and(|value| !value.is_empty() && value != "0")
});

/// Warn about a problem in `component` (prints once per unique message).
///
/// Returns `true` when this call recorded a new warning.
///
/// # Example
/// ```
/// use wren_common::warning::warn_once;
///
/// let first = warn_once("HTML Processor", "cannot foster-parent text in TABLE");
/// let again = warn_once("HTML Processor", "cannot foster-parent text in TABLE");
/// assert!(first && !again);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let is_new = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(key);

    if is_new && !*QUIET {
        eprintln!("{}", format!("[Wren {component}] ⚠ {message}").yellow());
    }
    is_new
}

/// Number of distinct warnings recorded since the last [`clear_warnings`].
pub fn warning_count() -> usize {
    WARNED.lock().unwrap_or_else(PoisonError::into_inner).len()
}

/// Forget all recorded warnings (call when starting on a new document).
pub fn clear_warnings() {
    WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}
