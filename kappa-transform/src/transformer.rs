use std::path::Path;

use crate::error::ProjError;
use crate::proj::ProjTransformer;

/// EPSG code type alias
pub type EpsgCode = u16;

/// WGS84 Geographic 2D (EPSG:4326)
pub const EPSG_WGS84_GEOGRAPHIC: EpsgCode = 4326;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    Forward,
    Inverse,
}

/// Coordinate transformer between two EPSG-coded CRS.
///
/// Equal source and target short-circuit to an identity transform that
/// never touches PROJ.
pub enum PointTransformer {
    Identity,
    Proj(ProjTransformer),
}

impl PointTransformer {
    pub fn new(
        input_epsg: EpsgCode,
        output_epsg: EpsgCode,
        proj_data_dir: Option<&Path>,
    ) -> Result<Self, ProjError> {
        if input_epsg == output_epsg {
            return Ok(Self::Identity);
        }

        Ok(Self::Proj(ProjTransformer::new_epsg(
            input_epsg,
            output_epsg,
            proj_data_dir,
        )?))
    }

    /// Transform a single position from source to target CRS.
    pub fn forward(&mut self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        self.transform_one(TransformDirection::Forward, x, y, z)
    }

    /// Transform a single position from target back to source CRS.
    pub fn inverse(&mut self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64), ProjError> {
        self.transform_one(TransformDirection::Inverse, x, y, z)
    }

    pub fn forward_arrays(
        &mut self,
        xs: &mut [f64],
        ys: &mut [f64],
        zs: &mut [f64],
    ) -> Result<(), ProjError> {
        self.transform_arrays(TransformDirection::Forward, xs, ys, zs)
    }

    pub fn transform_arrays(
        &mut self,
        direction: TransformDirection,
        xs: &mut [f64],
        ys: &mut [f64],
        zs: &mut [f64],
    ) -> Result<(), ProjError> {
        match self {
            Self::Identity => Ok(()),
            Self::Proj(t) => t.transform_arrays(direction, xs, ys, zs),
        }
    }

    fn transform_one(
        &mut self,
        direction: TransformDirection,
        x: f64,
        y: f64,
        z: f64,
    ) -> Result<(f64, f64, f64), ProjError> {
        let mut xs = [x];
        let mut ys = [y];
        let mut zs = [z];
        self.transform_arrays(direction, &mut xs, &mut ys, &mut zs)?;
        Ok((xs[0], ys[0], zs[0]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // MGI / Austria GK East, the CRS of the Vienna trajectory folders.
    const EPSG_MGI_GK_EAST: u16 = 31256;

    #[test]
    fn identity_transform() {
        let mut transformer =
            PointTransformer::new(EPSG_WGS84_GEOGRAPHIC, EPSG_WGS84_GEOGRAPHIC, None).unwrap();
        let (x, y, z) = transformer.forward(16.37, 48.21, 171.0).unwrap();
        assert_eq!((x, y, z), (16.37, 48.21, 171.0));
    }

    #[test]
    fn gk_east_maps_into_vienna() {
        let mut transformer =
            PointTransformer::new(EPSG_MGI_GK_EAST, EPSG_WGS84_GEOGRAPHIC, None).unwrap();
        // A point near the Vienna city center in GK East coordinates.
        let (lng, lat, _) = transformer.forward(2340.0, 340100.0, 171.0).unwrap();
        assert!((16.0..17.0).contains(&lng), "lng={lng}");
        assert!((48.0..48.5).contains(&lat), "lat={lat}");
    }

    #[test]
    fn round_trip_is_stable() {
        let mut transformer =
            PointTransformer::new(EPSG_MGI_GK_EAST, EPSG_WGS84_GEOGRAPHIC, None).unwrap();
        let (x0, y0, z0) = (2340.0, 340100.0, 171.0);
        let (lng, lat, h) = transformer.forward(x0, y0, z0).unwrap();
        let (x1, y1, z1) = transformer.inverse(lng, lat, h).unwrap();
        assert!((x1 - x0).abs() < 1e-4, "x drift: {}", (x1 - x0).abs());
        assert!((y1 - y0).abs() < 1e-4, "y drift: {}", (y1 - y0).abs());
        assert!((z1 - z0).abs() < 1e-4, "z drift: {}", (z1 - z0).abs());
    }

    #[test]
    fn arrays_transform_in_place() {
        let mut transformer =
            PointTransformer::new(EPSG_MGI_GK_EAST, EPSG_WGS84_GEOGRAPHIC, None).unwrap();
        let mut xs = [2340.0, 2350.0];
        let mut ys = [340100.0, 340110.0];
        let mut zs = [171.0, 172.0];
        transformer
            .forward_arrays(&mut xs, &mut ys, &mut zs)
            .unwrap();
        assert!(xs.iter().all(|lng| (16.0..17.0).contains(lng)));
        assert!(ys.iter().all(|lat| (48.0..48.5).contains(lat)));
    }
}
