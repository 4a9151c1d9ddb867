use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::EpsgCode;

/// GeoJSON geometry. Positions are `[x, y]` or `[x, y, z]`, x (easting or
/// longitude) first.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

impl Geometry {
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Geometry::Point {
            coordinates: vec![x, y, z],
        }
    }

    pub fn geometry_type(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
        }
    }

    /// Apply a fallible transform to every position of the geometry.
    pub fn try_map_positions<E>(
        &mut self,
        f: &mut impl FnMut(&mut [f64]) -> Result<(), E>,
    ) -> Result<(), E> {
        match self {
            Geometry::Point { coordinates } => f(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                for position in coordinates {
                    f(position)?;
                }
                Ok(())
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                for part in coordinates {
                    for position in part {
                        f(position)?;
                    }
                }
                Ok(())
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        for position in ring {
                            f(position)?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

/// GeoJSON feature. Unknown members pass through untouched.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, Value>>,
    #[serde(flatten)]
    pub others: HashMap<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

/// GeoJSON feature collection. `totalFeatures` is the match count WFS
/// servers report on GetFeature responses.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_type")]
    pub type_name: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(
        rename = "totalFeatures",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub total_features: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crs: Option<NamedCrs>,
    #[serde(flatten)]
    pub others: HashMap<String, Value>,
}

fn collection_type() -> String {
    "FeatureCollection".to_string()
}

impl FeatureCollection {
    pub fn empty() -> Self {
        FeatureCollection {
            type_name: collection_type(),
            features: Vec::new(),
            total_features: None,
            crs: None,
            others: HashMap::new(),
        }
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

/// Named CRS member, e.g. `urn:ogc:def:crs:EPSG::31256`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NamedCrs {
    #[serde(rename = "type")]
    pub type_name: String,
    pub properties: CrsProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CrsProperties {
    pub name: String,
}

impl NamedCrs {
    pub fn epsg(code: EpsgCode) -> Self {
        NamedCrs {
            type_name: "name".to_string(),
            properties: CrsProperties {
                name: format!("urn:ogc:def:crs:EPSG::{code}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_round_trips_through_json() {
        let geometry = Geometry::point(16.37, 48.21, 171.5);
        let json = serde_json::to_string(&geometry).unwrap();
        assert!(json.contains(r#""type":"Point""#));
        let back: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, geometry);
    }

    #[test]
    fn wfs_response_members_are_preserved() {
        let json = r#"{
            "type": "FeatureCollection",
            "totalFeatures": 120000,
            "features": [
                {
                    "type": "Feature",
                    "id": "KAPPAZUNDERIMAGEPOGD.1",
                    "geometry": {"type": "Point", "coordinates": [1837.4, 341870.2]},
                    "properties": {"OBJECTID": 1}
                }
            ],
            "numberMatched": 120000
        }"#;
        let collection: FeatureCollection = serde_json::from_str(json).unwrap();
        assert_eq!(collection.total_features, Some(120000));
        assert_eq!(collection.features.len(), 1);
        assert!(collection.others.contains_key("numberMatched"));
    }

    #[test]
    fn map_positions_visits_every_coordinate() {
        let mut geometry = Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]],
        };
        let mut visited = 0;
        geometry
            .try_map_positions(&mut |position: &mut [f64]| {
                position[0] += 10.0;
                visited += 1;
                Ok::<(), ()>(())
            })
            .unwrap();
        assert_eq!(visited, 4);
        if let Geometry::Polygon { coordinates } = geometry {
            assert_eq!(coordinates[0][1][0], 11.0);
        } else {
            unreachable!();
        }
    }

    #[test]
    fn named_crs_formats_epsg_urn() {
        let crs = NamedCrs::epsg(31256);
        assert_eq!(crs.properties.name, "urn:ogc:def:crs:EPSG::31256");
    }
}
