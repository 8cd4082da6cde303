use std::cell::RefCell;
use std::ffi::CString;

use tg_tensor::TensorError;

use crate::types::TGStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `tg_last_error`.
pub fn set_last_error(msg: String) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `err` as the last error and map it to a status code.
pub fn report(err: TensorError) -> TGStatus {
    let status = match &err {
        e if e.is_config_error() => TGStatus::ErrorConfig,
        TensorError::MatmulMismatch { .. } | TensorError::ShapeMismatch { .. } => {
            TGStatus::ErrorShape
        }
        TensorError::IndexOutOfRange { .. } => TGStatus::ErrorInvalidArgument,
        _ => TGStatus::ErrorInternal,
    };
    set_last_error(err.to_string());
    status
}
