use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// EPSG code type alias
pub type EpsgCode = u16;

/// WGS84 Geographic 2D (EPSG:4326)
pub const EPSG_WGS84_GEOGRAPHIC: EpsgCode = 4326;

/// One physical photo capture from the image metadata file.
///
/// Position and rotation are expressed in the owning trajectory's projected
/// CRS. Identity is unique per (trajectory_id, sensor_id, image_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawImageRecord {
    pub trajectory_id: u64,
    pub sensor_id: u64,
    pub image_id: u64,
    pub gps_epoch_s: f64,
    pub name: String,
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub rx_rad: f64,
    pub ry_rad: f64,
    pub rz_rad: f64,
    pub path: PathBuf,
}

impl RawImageRecord {
    /// Image name without its extension, shared by all photos of one capture.
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }
}

/// One mapping run, parsed once from the trajectory folder naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub id: u64,
    pub epsg: EpsgCode,
    pub gps_week: u16,
}

/// All photos captured at a single location, up to one per viewing direction.
///
/// Members share the same position and timestamp; only the sensor (and thus
/// the direction) differs. A group always has at least one member.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGroup {
    pub trajectory_id: u64,
    pub base_name: String,
    records: Vec<RawImageRecord>,
}

impl ImageGroup {
    pub fn new(first: RawImageRecord) -> Self {
        ImageGroup {
            trajectory_id: first.trajectory_id,
            base_name: first.base_name().to_string(),
            records: vec![first],
        }
    }

    pub fn push(&mut self, record: RawImageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[RawImageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The member whose position/timestamp stands for the whole group.
    pub fn primary(&self) -> &RawImageRecord {
        &self.records[0]
    }

    /// Capture position in the trajectory's projected CRS, meters.
    pub fn position(&self) -> (f64, f64, f64) {
        let r = self.primary();
        (r.x_m, r.y_m, r.z_m)
    }

    pub fn gps_epoch_s(&self) -> f64 {
        self.primary().gps_epoch_s
    }

    /// Item identifier: trajectory id and base image name.
    pub fn id(&self) -> String {
        format!("{}_{}", self.trajectory_id, self.base_name)
    }
}
