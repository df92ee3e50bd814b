//! Exit codes for llmsensectl

use llmsense_common::SenseError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors (dataset unreadable, backend unavailable, ...)
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code for a malformed record name or time window
pub const EXIT_INVALID_INPUT: i32 = 64;

/// Exit code when the named record does not exist
pub const EXIT_RECORD_NOT_FOUND: i32 = 66;

/// Map a command failure to its exit code
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<SenseError>() {
        Some(SenseError::RecordNotFound(_)) => EXIT_RECORD_NOT_FOUND,
        Some(e) if e.is_user_error() => EXIT_INVALID_INPUT,
        _ => EXIT_GENERAL_ERROR,
    }
}
