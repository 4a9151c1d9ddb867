use kappa_core::geojson::FeatureCollection;
use kappa_core::record::EpsgCode;
use kappa_transform::{PointTransformer, EPSG_WGS84_GEOGRAPHIC};

use crate::error::WfsError;

/// Reproject every feature geometry to geographic coordinates (EPSG:4326).
///
/// One transformer serves the whole collection. Afterwards the `crs` member
/// is dropped: WGS84 lng/lat is the GeoJSON default.
pub fn reproject_to_wgs84(
    collection: &mut FeatureCollection,
    source_epsg: EpsgCode,
) -> Result<(), WfsError> {
    let mut transformer = PointTransformer::new(source_epsg, EPSG_WGS84_GEOGRAPHIC, None)?;

    for feature in &mut collection.features {
        if let Some(geometry) = &mut feature.geometry {
            geometry.try_map_positions(&mut |position: &mut [f64]| {
                if position.len() < 2 {
                    return Err(WfsError::Malformed(format!(
                        "position with {} coordinates",
                        position.len()
                    )));
                }
                let z = position.get(2).copied().unwrap_or(0.0);
                let (x, y, z) = transformer.forward(position[0], position[1], z)?;
                position[0] = x;
                position[1] = y;
                if let Some(third) = position.get_mut(2) {
                    *third = z;
                }
                Ok(())
            })?;
        }
    }

    collection.crs = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use kappa_core::geojson::{Feature, Geometry, NamedCrs};

    fn point_feature(x: f64, y: f64) -> Feature {
        Feature {
            type_name: "Feature".to_string(),
            id: None,
            geometry: Some(Geometry::Point {
                coordinates: vec![x, y],
            }),
            properties: None,
            others: Default::default(),
        }
    }

    #[test]
    fn identity_reprojection_clears_the_crs_tag() {
        let mut collection = FeatureCollection::empty();
        collection.crs = Some(NamedCrs::epsg(4326));
        collection.features.push(point_feature(16.37, 48.21));

        reproject_to_wgs84(&mut collection, 4326).unwrap();

        assert!(collection.crs.is_none());
        assert_eq!(
            collection.features[0].geometry,
            Some(Geometry::Point {
                coordinates: vec![16.37, 48.21]
            })
        );
    }

    #[test]
    fn short_positions_are_malformed() {
        let mut collection = FeatureCollection::empty();
        collection.features.push(Feature {
            geometry: Some(Geometry::Point {
                coordinates: vec![16.37],
            }),
            ..point_feature(0.0, 0.0)
        });
        assert!(matches!(
            reproject_to_wgs84(&mut collection, 4326),
            Err(WfsError::Malformed(_))
        ));
    }
}
