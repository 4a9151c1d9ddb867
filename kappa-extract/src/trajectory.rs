use std::collections::HashMap;
use std::fs;
use std::sync::OnceLock;

use regex::Regex;

use kappa_core::record::TrajectoryRecord;

use crate::error::ExtractError;
use crate::layout::ExtractLayout;

static TRAJECTORY_NAME: OnceLock<Regex> = OnceLock::new();

fn trajectory_name_re() -> &'static Regex {
    TRAJECTORY_NAME.get_or_init(|| {
        Regex::new(r"trajectory_(?P<id>\d+)_(?P<gps_week>\d+)_(?P<epsg>\d+)")
            .expect("trajectory folder pattern")
    })
}

/// Parse a trajectory folder name `trajectory_<id>_<gps_week>_<epsg>`.
pub fn parse_trajectory_name(name: &str) -> Result<TrajectoryRecord, ExtractError> {
    let parse_err = || ExtractError::Parse(name.to_string());
    let caps = trajectory_name_re().captures(name).ok_or_else(parse_err)?;

    let id = caps["id"].parse().map_err(|_| parse_err())?;
    let gps_week = caps["gps_week"].parse().map_err(|_| parse_err())?;
    let epsg = caps["epsg"].parse().map_err(|_| parse_err())?;

    Ok(TrajectoryRecord { id, epsg, gps_week })
}

/// Trajectory metadata keyed by id.
///
/// Built once per run from the trajectory folder names; lookups afterwards
/// are pure map reads.
#[derive(Debug, Default)]
pub struct TrajectoryIndex {
    map: HashMap<u64, TrajectoryRecord>,
}

impl TrajectoryIndex {
    pub fn from_records(records: impl IntoIterator<Item = TrajectoryRecord>) -> Self {
        TrajectoryIndex {
            map: records.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Scan the trajectory folders of an extract.
    pub fn from_layout(layout: &ExtractLayout) -> Result<Self, ExtractError> {
        let mut map = HashMap::new();
        for entry in fs::read_dir(layout.trajectories_dir())? {
            let entry = entry?;
            let name = entry.file_name();
            let record = parse_trajectory_name(&name.to_string_lossy())?;
            map.insert(record.id, record);
        }
        log::info!("found {} trajectories", map.len());
        Ok(TrajectoryIndex { map })
    }

    /// Look up a trajectory. An unknown id is unrecoverable: without
    /// trajectory metadata there is no CRS to reproject against.
    pub fn get(&self, trajectory_id: u64) -> Result<&TrajectoryRecord, ExtractError> {
        self.map
            .get(&trajectory_id)
            .ok_or(ExtractError::MissingTrajectory(trajectory_id))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrajectoryRecord> {
        self.map.values()
    }
}
