use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use kappa_core::direction::Direction;
use kappa_core::geojson::Geometry;
use kappa_core::gpstime::gps_to_datetime;
use kappa_core::record::{EpsgCode, ImageGroup};
use kappa_extract::TrajectoryIndex;
use kappa_transform::{PointTransformer, EPSG_WGS84_GEOGRAPHIC};

use crate::error::StacError;
use crate::models::{
    Asset, Collection, Item, ItemProperties, Provider, MEDIA_TYPE_JPEG, STAC_VERSION,
};

/// Build one STAC item per image group.
///
/// Every group's trajectory id is resolved before any item is assembled, so
/// a dangling reference fails the run up front. One transformer per source
/// CRS is constructed and reused across groups.
pub fn build_items(
    groups: &[ImageGroup],
    trajectories: &TrajectoryIndex,
) -> Result<Vec<Item>, StacError> {
    for group in groups {
        trajectories.get(group.trajectory_id)?;
    }

    let mut transformers: HashMap<EpsgCode, PointTransformer> = HashMap::new();
    let mut items = Vec::with_capacity(groups.len());

    for group in groups {
        let trajectory = trajectories.get(group.trajectory_id)?;

        let transformer = match transformers.entry(trajectory.epsg) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => vacant.insert(PointTransformer::new(
                trajectory.epsg,
                EPSG_WGS84_GEOGRAPHIC,
                None,
            )?),
        };

        let (x, y, z) = group.position();
        let (lng, lat, height) = transformer.forward(x, y, z)?;
        let datetime = gps_to_datetime(trajectory.gps_week, group.gps_epoch_s());

        let mut assets = BTreeMap::new();
        for record in group.records() {
            let direction = Direction::from_sensor_id(record.sensor_id)?;
            assets.insert(
                direction.label().to_string(),
                Asset {
                    href: record.path.to_string_lossy().into_owned(),
                    title: Some(direction.title()),
                    media_type: Some(MEDIA_TYPE_JPEG.to_string()),
                    roles: vec!["data".to_string()],
                    rx_rad: Some(record.rx_rad),
                    ry_rad: Some(record.ry_rad),
                    rz_rad: Some(record.rz_rad),
                    others: BTreeMap::new(),
                },
            );
        }

        items.push(Item {
            type_name: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: group.id(),
            geometry: Geometry::point(lng, lat, height),
            bbox: [lng, lat, lng, lat],
            properties: ItemProperties {
                datetime,
                trajectory_id: group.trajectory_id,
                gps_week: trajectory.gps_week,
                gps_epoch_s: group.gps_epoch_s(),
                source_epsg: trajectory.epsg,
                others: BTreeMap::new(),
            },
            links: Vec::new(),
            assets,
            collection: None,
        });
    }

    log::info!("assembled {} catalog items", items.len());
    Ok(items)
}

/// Collection shell for the Kappazunder panorama images.
pub fn image_collection(title: &str) -> Collection {
    let mut collection = Collection::new(title, "Kappazunder image panorama data.");
    collection.providers = vec![
        Provider {
            name: "Vienna City Surveying Department (MA 41)".to_string(),
            roles: vec!["producer".to_string()],
            url: None,
        },
        Provider {
            name: "Vienna Digital Department (MA 01)".to_string(),
            roles: vec!["host".to_string()],
            url: None,
        },
    ];
    collection
}
