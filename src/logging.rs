/// Conditional logging module for development builds
///
/// The `log!` macro provides informational logging that is compiled out of
/// production (release) builds by default. Warnings and errors should keep using
/// `leptos::logging::warn!` and `leptos::logging::error!` directly so they always
/// reach the console.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// The macro forwards to `leptos::logging::log!`, which writes to the browser
/// console on wasm and to stderr everywhere else, so pure modules can log from
/// native unit tests without touching `web_sys`.
///
/// # Examples
///
/// ```ignore
/// use crate::logging::log;
///
/// log!("Loaded {} arcs for {}", arcs.len(), month);
/// ```
#[macro_export]
macro_rules! log {
    ($($arg:tt)+) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            leptos::logging::log!($($arg)+);
        }
    };
}

pub use crate::log;
