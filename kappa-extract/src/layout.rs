use std::path::PathBuf;

use glob::glob;

use crate::error::ExtractError;

/// Fixed directory layout of a Kappazunder data extract.
///
/// All sub-paths follow the vendor naming convention; nothing is created or
/// checked here, the accessors only resolve paths.
#[derive(Debug, Clone)]
pub struct ExtractLayout {
    pub base_dir: PathBuf,
}

impl ExtractLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        ExtractLayout {
            base_dir: base_dir.into(),
        }
    }

    /// Tab-delimited image metadata file.
    pub fn image_metadata(&self) -> PathBuf {
        self.base_dir.join("Bild-Meta").join("image_meta.txt")
    }

    /// Parent of the `trajectory_<id>_<week>_<epsg>` folders.
    pub fn trajectories_dir(&self) -> PathBuf {
        self.base_dir.join("Verortung").join("Trajektorien")
    }

    /// Root of the LiDAR scan tree.
    pub fn scan_data_dir(&self) -> PathBuf {
        self.base_dir.join("Scan-Punktwolken")
    }

    /// Every LiDAR scan file of the extract.
    pub fn all_scans(&self) -> Result<Vec<PathBuf>, ExtractError> {
        let pattern = self
            .scan_data_dir()
            .join("Trajektorie_*")
            .join("Sensor_*")
            .join("*.laz");
        let pattern = pattern
            .to_str()
            .ok_or_else(|| ExtractError::InvalidPath(pattern.clone()))?
            .to_string();

        let mut scans = Vec::new();
        for entry in glob(&pattern)? {
            scans.push(entry?);
        }
        scans.sort();
        Ok(scans)
    }

    /// Resolved path of one raw photo.
    pub fn raw_image_path(
        &self,
        trajectory_id: u64,
        sensor_id: u64,
        image_name: &str,
    ) -> PathBuf {
        self.base_dir
            .join("Bild-Rohdaten")
            .join(format!("Trajektorie_{trajectory_id}"))
            .join(format!("Sensor_{sensor_id}"))
            .join(image_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_the_vendor_convention() {
        let layout = ExtractLayout::new("/data/extract");
        assert_eq!(
            layout.image_metadata(),
            PathBuf::from("/data/extract/Bild-Meta/image_meta.txt")
        );
        assert_eq!(
            layout.trajectories_dir(),
            PathBuf::from("/data/extract/Verortung/Trajektorien")
        );
        assert_eq!(
            layout.raw_image_path(5, 110031, "img_000123.jpg"),
            PathBuf::from("/data/extract/Bild-Rohdaten/Trajektorie_5/Sensor_110031/img_000123.jpg")
        );
    }

    #[test]
    fn all_scans_is_empty_for_a_missing_tree() {
        let layout = ExtractLayout::new("/nonexistent/extract");
        assert!(layout.all_scans().unwrap().is_empty());
    }
}
