use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use kappa_core::geojson::Geometry;
use kappa_core::record::EpsgCode;

pub const STAC_VERSION: &str = "1.0.0";

pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_GEOJSON: &str = "application/geo+json";
pub const MEDIA_TYPE_JPEG: &str = "image/jpeg";

/// One published STAC feature: a single panoramic capture location.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    #[serde(rename = "type")]
    pub type_name: String,
    pub stac_version: String,
    pub id: String,
    pub geometry: Geometry,
    pub bbox: [f64; 4],
    pub properties: ItemProperties,
    pub links: Vec<Link>,
    pub assets: BTreeMap<String, Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

/// Provenance carried by every item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemProperties {
    pub datetime: DateTime<Utc>,
    pub trajectory_id: u64,
    pub gps_week: u16,
    pub gps_epoch_s: f64,
    pub source_epsg: EpsgCode,
    #[serde(flatten)]
    pub others: BTreeMap<String, Value>,
}

/// One directional photo attached to an item.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Asset {
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx_rad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ry_rad: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rz_rad: Option<f64>,
    #[serde(flatten)]
    pub others: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Link {
    pub fn new(rel: &str, href: impl Into<String>, media_type: &str) -> Self {
        Link {
            rel: rel.to_string(),
            href: href.into(),
            media_type: Some(media_type.to_string()),
            title: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Provider {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpatialExtent {
    pub bbox: Vec<[f64; 4]>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemporalExtent {
    pub interval: Vec<[Option<DateTime<Utc>>; 2]>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Extent {
    pub spatial: SpatialExtent,
    pub temporal: TemporalExtent,
}

impl Extent {
    /// Placeholder extent used until items are known.
    pub fn unbounded() -> Self {
        Extent {
            spatial: SpatialExtent {
                bbox: vec![[-180.0, -90.0, 180.0, 90.0]],
            },
            temporal: TemporalExtent {
                interval: vec![[None, None]],
            },
        }
    }
}

/// Container of items with a derived spatial/temporal extent.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Collection {
    #[serde(rename = "type")]
    pub type_name: String,
    pub stac_version: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub license: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<Provider>,
    pub extent: Extent,
    pub links: Vec<Link>,
}

impl Collection {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        let id = id.into();
        Collection {
            type_name: "Collection".to_string(),
            stac_version: STAC_VERSION.to_string(),
            title: Some(id.clone()),
            id,
            description: description.into(),
            license: "CC-BY-4.0".to_string(),
            providers: Vec::new(),
            extent: Extent::unbounded(),
            links: Vec::new(),
        }
    }

    /// Recompute the collection extent from its item set: union bounding box
    /// and [min, max] timestamp. A collection without items keeps the
    /// placeholder extent.
    pub fn update_extent_from_items(&mut self, items: &[Item]) {
        let Some(first) = items.first() else {
            return;
        };

        let mut union = first.bbox;
        for item in &items[1..] {
            union[0] = union[0].min(item.bbox[0]);
            union[1] = union[1].min(item.bbox[1]);
            union[2] = union[2].max(item.bbox[2]);
            union[3] = union[3].max(item.bbox[3]);
        }

        let (start, end) = items
            .iter()
            .map(|item| item.properties.datetime)
            .minmax()
            .into_option()
            .expect("items is non-empty");

        self.extent = Extent {
            spatial: SpatialExtent { bbox: vec![union] },
            temporal: TemporalExtent {
                interval: vec![[Some(start), Some(end)]],
            },
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kappa_core::gpstime::gps_to_datetime;

    fn item(id: &str, lng: f64, lat: f64, sow: f64) -> Item {
        Item {
            type_name: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: id.to_string(),
            geometry: Geometry::point(lng, lat, 171.0),
            bbox: [lng, lat, lng, lat],
            properties: ItemProperties {
                datetime: gps_to_datetime(2190, sow),
                trajectory_id: 5,
                gps_week: 2190,
                gps_epoch_s: sow,
                source_epsg: 31256,
                others: BTreeMap::new(),
            },
            links: Vec::new(),
            assets: BTreeMap::new(),
            collection: None,
        }
    }

    #[test]
    fn extent_is_the_union_of_item_bboxes() {
        let mut collection = Collection::new("images", "test");
        let items = vec![
            item("a", 16.30, 48.20, 1000.0),
            item("b", 16.40, 48.10, 3000.0),
            item("c", 16.35, 48.25, 2000.0),
        ];
        collection.update_extent_from_items(&items);

        assert_eq!(collection.extent.spatial.bbox, vec![[16.30, 48.10, 16.40, 48.25]]);
        let [start, end] = collection.extent.temporal.interval[0];
        assert_eq!(start.unwrap(), gps_to_datetime(2190, 1000.0));
        assert_eq!(end.unwrap(), gps_to_datetime(2190, 3000.0));
    }

    #[test]
    fn empty_item_set_keeps_the_placeholder_extent() {
        let mut collection = Collection::new("images", "test");
        collection.update_extent_from_items(&[]);
        assert_eq!(collection.extent, Extent::unbounded());
    }

    #[test]
    fn item_serializes_with_stac_members() {
        let json = serde_json::to_value(item("5_img_000042", 16.37, 48.21, 1234.5)).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["stac_version"], STAC_VERSION);
        assert_eq!(json["geometry"]["type"], "Point");
        assert_eq!(json["properties"]["gps_week"], 2190);
        assert_eq!(json["properties"]["source_epsg"], 31256);
    }
}
