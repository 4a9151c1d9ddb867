use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    path::Path,
    ptr,
};

use proj_sys as proj;

use crate::error::ProjError;
use crate::transformer::TransformDirection;

/// Raw transformer over a PROJ `crs_to_crs` pipeline.
///
/// The pipeline is normalized so input and output are always easting/x
/// first, regardless of the native axis order of either CRS. Construction
/// is side-effect-free and may be repeated; an instance must be used by one
/// thread at a time.
#[derive(Debug)]
pub struct ProjTransformer {
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
}

impl ProjTransformer {
    pub fn new_epsg(
        input_epsg: u16,
        output_epsg: u16,
        proj_data_dir: Option<&Path>,
    ) -> Result<Self, ProjError> {
        let source = format!("EPSG:{input_epsg}");
        let target = format!("EPSG:{output_epsg}");
        Self::new(&source, &target, proj_data_dir)
    }

    pub fn new(
        source: &str,
        target: &str,
        proj_data_dir: Option<&Path>,
    ) -> Result<Self, ProjError> {
        // A context must be used by only one thread at a time.
        let ctx = unsafe { proj::proj_context_create() };
        if ctx.is_null() {
            return Err(ProjError {
                code: 0,
                message: "proj_context_create() returned NULL".to_string(),
                context: "proj_context_create",
            });
        }

        // Enable network access for automatic grid file downloads from CDN.
        // Grid files will be cached in the user's local directory.
        unsafe {
            proj::proj_context_set_enable_network(ctx, 1);
            proj::proj_grid_cache_set_enable(ctx, 1);
        }

        if let Some(dir) = proj_data_dir {
            let c_path = CString::new(dir.to_string_lossy().as_bytes()).map_err(|_| ProjError {
                code: 0,
                message: "proj_data_dir contains NUL byte".to_string(),
                context: "proj_context_set_search_paths",
            })?;
            let paths = [c_path.as_ptr()];
            unsafe {
                proj::proj_context_set_search_paths(ctx, paths.len() as i32, paths.as_ptr());
            }
        }

        let source = CString::new(source).map_err(|_| ProjError {
            code: 0,
            message: "source CRS contains NUL byte".to_string(),
            context: "proj_create_crs_to_crs",
        })?;
        let target = CString::new(target).map_err(|_| ProjError {
            code: 0,
            message: "target CRS contains NUL byte".to_string(),
            context: "proj_create_crs_to_crs",
        })?;

        let pj = unsafe {
            proj::proj_create_crs_to_crs(ctx, source.as_ptr(), target.as_ptr(), ptr::null_mut())
        };
        if pj.is_null() {
            let err = proj_error_from_ctx(ctx, "proj_create_crs_to_crs");
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        // Normalize axis order (e.g. EPSG:4326 is lat,lon by definition).
        let normalized = unsafe { proj::proj_normalize_for_visualization(ctx, pj) };
        unsafe {
            proj::proj_destroy(pj);
        }
        if normalized.is_null() {
            let err = proj_error_from_ctx(ctx, "proj_normalize_for_visualization");
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        Ok(Self {
            ctx,
            pj: normalized,
        })
    }

    /// Transform coordinate arrays in place. All three slices must have the
    /// same length.
    pub fn transform_arrays(
        &mut self,
        direction: TransformDirection,
        xs: &mut [f64],
        ys: &mut [f64],
        zs: &mut [f64],
    ) -> Result<(), ProjError> {
        assert_eq!(xs.len(), ys.len());
        assert_eq!(xs.len(), zs.len());
        if xs.is_empty() {
            return Ok(());
        }

        let stride = std::mem::size_of::<f64>();
        let n = xs.len();
        let pj_direction = match direction {
            TransformDirection::Forward => proj::PJ_DIRECTION_PJ_FWD,
            TransformDirection::Inverse => proj::PJ_DIRECTION_PJ_INV,
        };

        unsafe {
            proj::proj_errno_reset(self.pj);

            proj::proj_trans_generic(
                self.pj,
                pj_direction,
                xs.as_mut_ptr(),
                stride,
                n,
                ys.as_mut_ptr(),
                stride,
                n,
                zs.as_mut_ptr(),
                stride,
                n,
                ptr::null_mut(),
                0,
                0,
            );

            let err = proj::proj_errno(self.pj);
            if err != 0 {
                return Err(proj_error_from_pj(self.ctx, self.pj, "proj_trans_generic"));
            }
        }

        Ok(())
    }
}

impl Drop for ProjTransformer {
    fn drop(&mut self) {
        unsafe {
            if !self.pj.is_null() {
                proj::proj_destroy(self.pj);
                self.pj = ptr::null_mut();
            }
            if !self.ctx.is_null() {
                proj::proj_context_destroy(self.ctx);
                self.ctx = ptr::null_mut();
            }
        }
    }
}

fn proj_error_from_ctx(ctx: *mut proj::PJ_CONTEXT, context: &'static str) -> ProjError {
    let code = unsafe { proj::proj_context_errno(ctx) } as i32;
    let message = proj_error_message(ctx, code);
    ProjError {
        code,
        message,
        context,
    }
}

fn proj_error_from_pj(
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
    context: &'static str,
) -> ProjError {
    let code = unsafe { proj::proj_errno(pj) } as i32;
    let message = proj_error_message(ctx, code);
    ProjError {
        code,
        message,
        context,
    }
}

fn proj_error_message(ctx: *mut proj::PJ_CONTEXT, code: i32) -> String {
    let c_msg = unsafe { proj::proj_context_errno_string(ctx, code) };
    if c_msg.is_null() {
        return "unknown error".to_string();
    }
    unsafe { CStr::from_ptr(c_msg as *const c_char) }
        .to_string_lossy()
        .into_owned()
}
