use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use csv::ReaderBuilder;
use serde::Deserialize;

use kappa_core::record::{ImageGroup, RawImageRecord};

use crate::error::ExtractError;
use crate::layout::ExtractLayout;

/// One row of `image_meta.txt`.
#[derive(Debug, Deserialize)]
struct ImageMetaRow {
    trajectory_id: u64,
    sensor_id: u64,
    image_id: u64,
    epoch_s: f64,
    image_name: String,
    x_m: f64,
    y_m: f64,
    z_m: f64,
    rx_rad: f64,
    ry_rad: f64,
    rz_rad: f64,
}

/// Read the tab-delimited image metadata file and group rows into panorama
/// captures.
///
/// Grouping is a partition over (trajectory id, base image name): every row
/// lands in exactly one group. Groups come back in key order so downstream
/// output is deterministic.
pub fn extract_image_groups(layout: &ExtractLayout) -> Result<Vec<ImageGroup>, ExtractError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(layout.image_metadata())?;

    let mut groups: BTreeMap<(u64, String), ImageGroup> = BTreeMap::new();
    let mut row_count: usize = 0;

    for row in reader.deserialize() {
        let row: ImageMetaRow = row?;
        let path = layout.raw_image_path(row.trajectory_id, row.sensor_id, &row.image_name);
        let record = RawImageRecord {
            trajectory_id: row.trajectory_id,
            sensor_id: row.sensor_id,
            image_id: row.image_id,
            gps_epoch_s: row.epoch_s,
            name: row.image_name,
            x_m: row.x_m,
            y_m: row.y_m,
            z_m: row.z_m,
            rx_rad: row.rx_rad,
            ry_rad: row.ry_rad,
            rz_rad: row.rz_rad,
            path,
        };
        row_count += 1;

        let key = (record.trajectory_id, record.base_name().to_string());
        match groups.entry(key) {
            Entry::Occupied(mut occupied) => occupied.get_mut().push(record),
            Entry::Vacant(vacant) => {
                vacant.insert(ImageGroup::new(record));
            }
        }
    }

    log::info!("read {} image records into {} groups", row_count, groups.len());
    Ok(groups.into_values().collect())
}
