use thiserror::Error;

use kappa_core::geojson::Geometry;

use crate::models::{Collection, Item, STAC_VERSION};

/// Structural validation failure. Collects every issue found so a broken
/// catalog reports all problems at once.
#[derive(Debug, Error)]
#[error("{}", .issues.join("; "))]
pub struct ValidationError {
    pub issues: Vec<String>,
}

/// Check an item against the STAC feature requirements.
pub fn validate_item(item: &Item) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    check_item(item, &mut issues);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

/// Check a collection shell (extent, identifiers, version).
pub fn validate_collection(collection: &Collection) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    check_collection(collection, &mut issues);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

/// Validate the whole catalog. This is the terminal gate before writing:
/// any issue in any item or the collection fails the lot.
pub fn validate_all(collection: &Collection, items: &[Item]) -> Result<(), ValidationError> {
    let mut issues = Vec::new();
    check_collection(collection, &mut issues);
    for item in items {
        check_item(item, &mut issues);
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}

fn check_item(item: &Item, issues: &mut Vec<String>) {
    let id = if item.id.is_empty() {
        "<empty>"
    } else {
        item.id.as_str()
    };

    if item.type_name != "Feature" {
        issues.push(format!("item {id}: type must be \"Feature\""));
    }
    if item.stac_version != STAC_VERSION {
        issues.push(format!(
            "item {id}: stac_version {:?} (expected {STAC_VERSION:?})",
            item.stac_version
        ));
    }
    if item.id.is_empty() {
        issues.push("item <empty>: id must not be empty".to_string());
    }

    let [xmin, ymin, xmax, ymax] = item.bbox;
    if !item.bbox.iter().all(|v| v.is_finite()) {
        issues.push(format!("item {id}: bbox has non-finite values"));
    } else if xmin > xmax || ymin > ymax {
        issues.push(format!("item {id}: bbox is inverted"));
    }

    match &item.geometry {
        Geometry::Point { coordinates } => {
            if coordinates.len() < 2 || coordinates.len() > 3 {
                issues.push(format!(
                    "item {id}: point needs 2 or 3 coordinates, got {}",
                    coordinates.len()
                ));
            } else if !coordinates.iter().all(|v| v.is_finite()) {
                issues.push(format!("item {id}: geometry has non-finite coordinates"));
            } else {
                let (lng, lat) = (coordinates[0], coordinates[1]);
                let eps = 1e-9;
                if lng < xmin - eps || lng > xmax + eps || lat < ymin - eps || lat > ymax + eps {
                    issues.push(format!("item {id}: geometry lies outside its bbox"));
                }
            }
        }
        other => {
            issues.push(format!(
                "item {id}: unexpected geometry type {}",
                other.geometry_type()
            ));
        }
    }

    if item.assets.is_empty() {
        issues.push(format!("item {id}: no assets"));
    }
    for (key, asset) in &item.assets {
        if asset.href.is_empty() {
            issues.push(format!("item {id}: asset {key:?} has an empty href"));
        }
    }
}

fn check_collection(collection: &Collection, issues: &mut Vec<String>) {
    if collection.type_name != "Collection" {
        issues.push("collection: type must be \"Collection\"".to_string());
    }
    if collection.stac_version != STAC_VERSION {
        issues.push(format!(
            "collection: stac_version {:?} (expected {STAC_VERSION:?})",
            collection.stac_version
        ));
    }
    if collection.id.is_empty() {
        issues.push("collection: id must not be empty".to_string());
    }
    if collection.description.is_empty() {
        issues.push("collection: description must not be empty".to_string());
    }
    if collection.license.is_empty() {
        issues.push("collection: license must not be empty".to_string());
    }

    if collection.extent.spatial.bbox.is_empty() {
        issues.push("collection: spatial extent has no bbox".to_string());
    }
    for bbox in &collection.extent.spatial.bbox {
        if !bbox.iter().all(|v| v.is_finite()) {
            issues.push("collection: spatial extent has non-finite values".to_string());
        } else if bbox[0] > bbox[2] || bbox[1] > bbox[3] {
            issues.push("collection: spatial extent bbox is inverted".to_string());
        }
    }

    if collection.extent.temporal.interval.is_empty() {
        issues.push("collection: temporal extent has no interval".to_string());
    }
    for [start, end] in &collection.extent.temporal.interval {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                issues.push("collection: temporal interval ends before it starts".to_string());
            }
        }
    }
}
