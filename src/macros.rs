//! Call-site capturing logging macros
//!
//! Each macro takes the dispatcher as its first argument, followed by
//! `format!`-style arguments:
//!
//! ```ignore
//! log_warn!(timber, "retrying {} in {}s", job, delay);
//! ```

/// Name of the enclosing function, without its module path
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __timber_here() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let full = type_name_of(__timber_here);
        let full = full.strip_suffix("::__timber_here").unwrap_or(full);
        full.rsplit("::")
            .find(|segment| *segment != "{{closure}}")
            .unwrap_or(full)
    }};
}

/// `CallSite` for the current location
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(file!(), $crate::function_name!(), line!())
    };
}

#[macro_export]
macro_rules! log_error {
    ($timber:expr, $($arg:tt)+) => {
        $timber.error(format!($($arg)+), $crate::call_site!())
    };
}

#[macro_export]
macro_rules! log_warn {
    ($timber:expr, $($arg:tt)+) => {
        $timber.warn(format!($($arg)+), $crate::call_site!())
    };
}

#[macro_export]
macro_rules! log_info {
    ($timber:expr, $($arg:tt)+) => {
        $timber.info(format!($($arg)+), $crate::call_site!())
    };
}

#[macro_export]
macro_rules! log_debug {
    ($timber:expr, $($arg:tt)+) => {
        $timber.debug(format!($($arg)+), $crate::call_site!())
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($timber:expr, $($arg:tt)+) => {
        $timber.verbose(format!($($arg)+), $crate::call_site!())
    };
}

/// Log at `Info`
#[macro_export]
macro_rules! log {
    ($timber:expr, $($arg:tt)+) => {
        $timber.info(format!($($arg)+), $crate::call_site!())
    };
}

/// Record that execution reached this line
#[macro_export]
macro_rules! trace_here {
    ($timber:expr) => {
        $timber.trace($crate::call_site!())
    };
}

/// Log an error value and its sources at `Error`
#[macro_export]
macro_rules! log_failure {
    ($timber:expr, $error:expr) => {
        $timber.log_failure($error, $crate::call_site!())
    };
}
