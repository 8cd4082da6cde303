mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

use tg_tensor::{multiply_slices, ComputeBackend, CpuBackend, GemmConfig};

/// Execute a closure that returns a `TGStatus`, catching any panics
/// and converting them into `TGStatus::ErrorInternal`.
///
/// Closures touching a `TGContext` are wrapped in `AssertUnwindSafe`; a
/// context only holds an immutable backend.
fn catch_panic<F: FnOnce() -> TGStatus + std::panic::UnwindSafe>(f: F) -> TGStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            TGStatus::ErrorInternal
        }
    }
}

/// Borrowed views of the caller's buffers for one `[m x k] @ [k x n]` call.
struct Operands<'a> {
    a: &'a [f32],
    b: &'a [f32],
    c: &'a mut [f32],
}

/// Check pointers and sizes, then wrap the raw buffers as slices.
///
/// # Safety
/// Non-null pointers must be valid for `m*k`, `k*n` and `m*n` elements
/// respectively, and `c` must not alias `a` or `b`.
unsafe fn operands<'a>(
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    m: usize,
    k: usize,
    n: usize,
) -> Result<Operands<'a>, TGStatus> {
    if a.is_null() || b.is_null() || c.is_null() {
        set_last_error("null argument".to_string());
        return Err(TGStatus::ErrorInvalidArgument);
    }
    let lens = (m.checked_mul(k), k.checked_mul(n), m.checked_mul(n));
    let (a_len, b_len, c_len) = match lens {
        (Some(a), Some(b), Some(c)) => (a, b, c),
        _ => {
            set_last_error(format!("matrix size overflow: m={}, k={}, n={}", m, k, n));
            return Err(TGStatus::ErrorInvalidArgument);
        }
    };
    Ok(Operands {
        a: std::slice::from_raw_parts(a, a_len),
        b: std::slice::from_raw_parts(b, b_len),
        c: std::slice::from_raw_parts_mut(c, c_len),
    })
}

/// Write `result` into the caller's output buffer or report its error.
fn finish(result: tg_tensor::Result<Vec<f32>>, out: &mut [f32]) -> TGStatus {
    match result {
        Ok(data) => {
            out.copy_from_slice(&data);
            TGStatus::Ok
        }
        Err(e) => report(e),
    }
}

/// Multiply row-major `a` ([m, k]) by `b` ([k, n]) into `c_out` ([m, n])
/// with the tiled engine.
///
/// `c_out` is only written on success.
///
/// # Safety
/// `a`, `b` and `c_out` must point to at least `m*k`, `k*n` and `m*n`
/// floats, and `c_out` must not overlap the inputs.
#[no_mangle]
pub unsafe extern "C" fn tg_matmul_f32(
    a: *const f32,
    b: *const f32,
    m: usize,
    k: usize,
    n: usize,
    tile_size: usize,
    c_out: *mut f32,
) -> TGStatus {
    catch_panic(|| {
        let ops = match unsafe { operands(a, b, c_out, m, k, n) } {
            Ok(ops) => ops,
            Err(status) => return status,
        };
        match multiply_slices(ops.a, ops.b, ops.c, m, k, n, &GemmConfig::new(tile_size)) {
            Ok(()) => TGStatus::Ok,
            Err(e) => report(e),
        }
    })
}

/// Same as `tg_matmul_f32` but runs the sequential reference loops.
///
/// # Safety
/// See `tg_matmul_f32`.
#[no_mangle]
pub unsafe extern "C" fn tg_matmul_reference_f32(
    a: *const f32,
    b: *const f32,
    m: usize,
    k: usize,
    n: usize,
    c_out: *mut f32,
) -> TGStatus {
    catch_panic(|| {
        let ops = match unsafe { operands(a, b, c_out, m, k, n) } {
            Ok(ops) => ops,
            Err(status) => return status,
        };
        finish(CpuBackend::new().matmul(ops.a, ops.b, m, k, n), ops.c)
    })
}

/// Create a context bound to one backend.
///
/// On success, writes a heap-allocated `TGContext` pointer into `*ctx_out`.
/// The caller must later call `tg_context_destroy` to free it.
#[no_mangle]
pub extern "C" fn tg_context_create(
    backend: TGBackendType,
    params: TGGemmParams,
    ctx_out: *mut *mut TGContext,
) -> TGStatus {
    catch_panic(AssertUnwindSafe(|| {
        if ctx_out.is_null() {
            set_last_error("ctx_out is null".to_string());
            return TGStatus::ErrorInvalidArgument;
        }
        let config = GemmConfig::from(params);
        if backend == TGBackendType::Tiled {
            if let Err(e) = config.validate() {
                return report(e);
            }
        }
        let ctx = Box::new(TGContext::new(backend, config));
        log::debug!("created {} context", ctx.backend.name());
        unsafe {
            *ctx_out = Box::into_raw(ctx);
        }
        TGStatus::Ok
    }))
}

/// Destroy a context previously created by `tg_context_create`.
///
/// Passing a null pointer is a no-op and returns `TGStatus::Ok`.
///
/// # Safety
/// `ctx` must be null or a pointer returned by `tg_context_create` that has
/// not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn tg_context_destroy(ctx: *mut TGContext) -> TGStatus {
    if ctx.is_null() {
        return TGStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    TGStatus::Ok
}

/// Multiply with the context's backend. Buffer rules as in `tg_matmul_f32`.
///
/// # Safety
/// `ctx` must come from `tg_context_create`; see `tg_matmul_f32` for the
/// buffer requirements.
#[no_mangle]
pub unsafe extern "C" fn tg_context_matmul(
    ctx: *const TGContext,
    a: *const f32,
    b: *const f32,
    m: usize,
    k: usize,
    n: usize,
    c_out: *mut f32,
) -> TGStatus {
    catch_panic(AssertUnwindSafe(|| {
        if ctx.is_null() {
            set_last_error("null context".to_string());
            return TGStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };
        let ops = match unsafe { operands(a, b, c_out, m, k, n) } {
            Ok(ops) => ops,
            Err(status) => return status,
        };
        finish(ctx.backend.matmul(ops.a, ops.b, m, k, n), ops.c)
    }))
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `tg_free_string`.
#[no_mangle]
pub extern "C" fn tg_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `tg_last_error`.
///
/// # Safety
/// `s` must be null or a pointer obtained from `tg_last_error`.
#[no_mangle]
pub unsafe extern "C" fn tg_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn last_error() -> Option<String> {
        let p = tg_last_error();
        if p.is_null() {
            return None;
        }
        let msg = unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned();
        unsafe { tg_free_string(p as *mut c_char) };
        Some(msg)
    }

    #[test]
    fn test_matmul_f32() {
        let a = [1.0f32, 2.0, 3.0, 4.0];
        let b = [5.0f32, 6.0, 7.0, 8.0];
        let mut c = [0.0f32; 4];
        let status = unsafe { tg_matmul_f32(a.as_ptr(), b.as_ptr(), 2, 2, 2, 128, c.as_mut_ptr()) };
        assert_eq!(status, TGStatus::Ok);
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_reference_agrees() {
        let a: Vec<f32> = (0..15).map(|i| i as f32 * 0.5).collect();
        let b: Vec<f32> = (0..20).map(|i| 1.0 - i as f32 * 0.25).collect();
        let mut tiled = vec![0.0f32; 12];
        let mut reference = vec![0.0f32; 12];
        unsafe {
            assert_eq!(
                tg_matmul_f32(a.as_ptr(), b.as_ptr(), 3, 5, 4, 2, tiled.as_mut_ptr()),
                TGStatus::Ok
            );
            assert_eq!(
                tg_matmul_reference_f32(a.as_ptr(), b.as_ptr(), 3, 5, 4, reference.as_mut_ptr()),
                TGStatus::Ok
            );
        }
        assert_eq!(tiled, reference);
    }

    #[test]
    fn test_zero_tile_size_is_config_error() {
        let a = [1.0f32];
        let mut c = [-1.0f32];
        let status = unsafe { tg_matmul_f32(a.as_ptr(), a.as_ptr(), 1, 1, 1, 0, c.as_mut_ptr()) };
        assert_eq!(status, TGStatus::ErrorConfig);
        assert_eq!(c, [-1.0]);
        assert!(last_error().unwrap().contains("tile size"));
    }

    #[test]
    fn test_null_argument() {
        let a = [1.0f32];
        let status = unsafe { tg_matmul_f32(a.as_ptr(), ptr::null(), 1, 1, 1, 4, ptr::null_mut()) };
        assert_eq!(status, TGStatus::ErrorInvalidArgument);
        assert_eq!(last_error().as_deref(), Some("null argument"));
    }

    #[test]
    fn test_empty_dimension_is_config_error() {
        let a = [1.0f32];
        let mut c = [0.0f32];
        let status = unsafe { tg_matmul_f32(a.as_ptr(), a.as_ptr(), 1, 0, 1, 4, c.as_mut_ptr()) };
        assert_eq!(status, TGStatus::ErrorConfig);
    }

    #[test]
    fn test_context_lifecycle() {
        let mut ctx: *mut TGContext = ptr::null_mut();
        let params = TGGemmParams {
            tile_size: 3,
            parallel: false,
        };
        assert_eq!(tg_context_create(TGBackendType::Tiled, params, &mut ctx), TGStatus::Ok);
        assert!(!ctx.is_null());

        let a = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let b = [1.0f32, 0.0, 0.0, 1.0, 1.0, 1.0];
        let mut c = [0.0f32; 4];
        let status =
            unsafe { tg_context_matmul(ctx, a.as_ptr(), b.as_ptr(), 2, 3, 2, c.as_mut_ptr()) };
        assert_eq!(status, TGStatus::Ok);
        assert_eq!(c, [4.0, 5.0, 10.0, 11.0]);

        assert_eq!(unsafe { tg_context_destroy(ctx) }, TGStatus::Ok);
        assert_eq!(unsafe { tg_context_destroy(ptr::null_mut()) }, TGStatus::Ok);
    }

    #[test]
    fn test_context_rejects_zero_tile() {
        let mut ctx: *mut TGContext = ptr::null_mut();
        let params = TGGemmParams {
            tile_size: 0,
            parallel: true,
        };
        assert_eq!(
            tg_context_create(TGBackendType::Tiled, params, &mut ctx),
            TGStatus::ErrorConfig
        );
        assert!(ctx.is_null());

        // The reference backend ignores the tile size.
        assert_eq!(
            tg_context_create(TGBackendType::Reference, params, &mut ctx),
            TGStatus::Ok
        );
        assert_eq!(unsafe { tg_context_destroy(ctx) }, TGStatus::Ok);
    }

    #[test]
    fn test_default_params() {
        let p = TGGemmParams::default();
        assert_eq!(p.tile_size, GemmConfig::default().tile_size);
        assert!(p.parallel);
    }
}
