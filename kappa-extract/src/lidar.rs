use std::fs;
use std::path::{Path, PathBuf};

use las::Reader;

use crate::error::ExtractError;
use crate::layout::ExtractLayout;

/// Validate and rearrange raw LiDAR scans into a per-trajectory output tree.
///
/// Each scan is opened once to check it reads cleanly, then copied to
/// `<out_dir>/Trajektorie_<id>/Sensor_<id>/<file>`. The heavyweight format
/// conversion stays with downstream tooling.
pub fn prepare_scans(layout: &ExtractLayout, out_dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let scan_root = layout.scan_data_dir();
    let mut prepared = Vec::new();

    for scan in layout.all_scans()? {
        let reader = Reader::from_path(&scan)?;
        let point_count = reader.header().number_of_points();

        let rel = scan
            .strip_prefix(&scan_root)
            .map_err(|_| ExtractError::InvalidPath(scan.clone()))?;
        let target = out_dir.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&scan, &target)?;
        log::debug!("prepared {:?} ({} points)", target, point_count);
        prepared.push(target);
    }

    log::info!("prepared {} scans under {:?}", prepared.len(), out_dir);
    Ok(prepared)
}
