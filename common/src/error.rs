use std::{backtrace::Backtrace, fmt::Debug};

use tracing::error;

/// Logs the error side of a `Result` instead of propagating it.
///
/// Used on actuator writes inside the control cycle, where a failed write
/// must never abort the cycle.
pub trait LogErrorExt<T> {
    fn log_error(self, message: &str) -> Option<T>;
}

impl<T, E: Debug> LogErrorExt<T> for Result<T, E> {
    fn log_error(self, message: &str) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                error!(
                    "{}: {:?}, Backtrace: {}",
                    message,
                    err,
                    Backtrace::capture()
                );
                None
            }
        }
    }
}
