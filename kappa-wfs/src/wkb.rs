use byteorder::{LittleEndian, WriteBytesExt};

use kappa_core::geojson::Geometry;

use crate::error::WfsError;

const POINT: u32 = 1;
const LINESTRING: u32 = 2;
const POLYGON: u32 = 3;
const MULTIPOINT: u32 = 4;
const MULTILINESTRING: u32 = 5;
const MULTIPOLYGON: u32 = 6;

/// Encode a geometry as little-endian ISO WKB.
///
/// The coordinate dimension of a geometry follows its first position; later
/// positions are padded or truncated to match, as WKB requires a uniform
/// dimension per geometry.
pub fn encode(geometry: &Geometry) -> Result<Vec<u8>, WfsError> {
    let mut out = Vec::new();
    match geometry {
        Geometry::Point { coordinates } => {
            let has_z = coordinates.len() >= 3;
            write_header(&mut out, POINT, has_z)?;
            write_position(&mut out, coordinates, has_z)?;
        }
        Geometry::LineString { coordinates } => {
            let has_z = first_has_z(coordinates);
            write_header(&mut out, LINESTRING, has_z)?;
            write_line(&mut out, coordinates, has_z)?;
        }
        Geometry::Polygon { coordinates } => {
            let has_z = coordinates.first().is_some_and(|ring| first_has_z(ring));
            write_header(&mut out, POLYGON, has_z)?;
            write_rings(&mut out, coordinates, has_z)?;
        }
        Geometry::MultiPoint { coordinates } => {
            let has_z = first_has_z(coordinates);
            write_header(&mut out, MULTIPOINT, has_z)?;
            out.write_u32::<LittleEndian>(coordinates.len() as u32)?;
            for position in coordinates {
                write_header(&mut out, POINT, has_z)?;
                write_position(&mut out, position, has_z)?;
            }
        }
        Geometry::MultiLineString { coordinates } => {
            let has_z = coordinates.first().is_some_and(|line| first_has_z(line));
            write_header(&mut out, MULTILINESTRING, has_z)?;
            out.write_u32::<LittleEndian>(coordinates.len() as u32)?;
            for line in coordinates {
                write_header(&mut out, LINESTRING, has_z)?;
                write_line(&mut out, line, has_z)?;
            }
        }
        Geometry::MultiPolygon { coordinates } => {
            let has_z = coordinates
                .first()
                .and_then(|polygon| polygon.first())
                .is_some_and(|ring| first_has_z(ring));
            write_header(&mut out, MULTIPOLYGON, has_z)?;
            out.write_u32::<LittleEndian>(coordinates.len() as u32)?;
            for polygon in coordinates {
                write_header(&mut out, POLYGON, has_z)?;
                write_rings(&mut out, polygon, has_z)?;
            }
        }
    }
    Ok(out)
}

fn first_has_z(positions: &[Vec<f64>]) -> bool {
    positions.first().is_some_and(|p| p.len() >= 3)
}

fn write_header(out: &mut Vec<u8>, base_type: u32, has_z: bool) -> Result<(), WfsError> {
    out.write_u8(1)?; // little-endian marker
    let code = if has_z { base_type + 1000 } else { base_type };
    out.write_u32::<LittleEndian>(code)?;
    Ok(())
}

fn write_position(out: &mut Vec<u8>, position: &[f64], has_z: bool) -> Result<(), WfsError> {
    if position.len() < 2 {
        return Err(WfsError::Malformed(format!(
            "position with {} coordinates",
            position.len()
        )));
    }
    out.write_f64::<LittleEndian>(position[0])?;
    out.write_f64::<LittleEndian>(position[1])?;
    if has_z {
        out.write_f64::<LittleEndian>(position.get(2).copied().unwrap_or(0.0))?;
    }
    Ok(())
}

fn write_line(out: &mut Vec<u8>, positions: &[Vec<f64>], has_z: bool) -> Result<(), WfsError> {
    out.write_u32::<LittleEndian>(positions.len() as u32)?;
    for position in positions {
        write_position(out, position, has_z)?;
    }
    Ok(())
}

fn write_rings(out: &mut Vec<u8>, rings: &[Vec<Vec<f64>>], has_z: bool) -> Result<(), WfsError> {
    out.write_u32::<LittleEndian>(rings.len() as u32)?;
    for ring in rings {
        write_line(out, ring, has_z)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_2d_is_21_bytes() {
        let wkb = encode(&Geometry::Point {
            coordinates: vec![16.37, 48.21],
        })
        .unwrap();
        assert_eq!(wkb.len(), 21);
        assert_eq!(wkb[0], 1);
        assert_eq!(u32::from_le_bytes(wkb[1..5].try_into().unwrap()), POINT);
        assert_eq!(
            f64::from_le_bytes(wkb[5..13].try_into().unwrap()),
            16.37
        );
        assert_eq!(
            f64::from_le_bytes(wkb[13..21].try_into().unwrap()),
            48.21
        );
    }

    #[test]
    fn point_with_z_uses_the_iso_type_code() {
        let wkb = encode(&Geometry::point(16.37, 48.21, 171.0)).unwrap();
        assert_eq!(wkb.len(), 29);
        assert_eq!(u32::from_le_bytes(wkb[1..5].try_into().unwrap()), 1001);
    }

    #[test]
    fn polygon_carries_ring_and_point_counts() {
        let wkb = encode(&Geometry::Polygon {
            coordinates: vec![vec![
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
                vec![0.0, 0.0],
            ]],
        })
        .unwrap();
        assert_eq!(u32::from_le_bytes(wkb[1..5].try_into().unwrap()), POLYGON);
        assert_eq!(u32::from_le_bytes(wkb[5..9].try_into().unwrap()), 1); // rings
        assert_eq!(u32::from_le_bytes(wkb[9..13].try_into().unwrap()), 4); // points
    }

    #[test]
    fn multipoint_nests_full_point_geometries() {
        let wkb = encode(&Geometry::MultiPoint {
            coordinates: vec![vec![0.0, 0.0], vec![1.0, 1.0]],
        })
        .unwrap();
        assert_eq!(
            u32::from_le_bytes(wkb[1..5].try_into().unwrap()),
            MULTIPOINT
        );
        assert_eq!(u32::from_le_bytes(wkb[5..9].try_into().unwrap()), 2);
        // first child starts with its own endianness marker and type
        assert_eq!(wkb[9], 1);
        assert_eq!(u32::from_le_bytes(wkb[10..14].try_into().unwrap()), POINT);
    }

    #[test]
    fn empty_point_is_malformed() {
        assert!(matches!(
            encode(&Geometry::Point {
                coordinates: vec![]
            }),
            Err(WfsError::Malformed(_))
        ));
    }
}
