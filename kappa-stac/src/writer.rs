use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::error::StacError;
use crate::models::{Collection, Item, Link, MEDIA_TYPE_GEOJSON, MEDIA_TYPE_JSON};
use crate::validate;

/// Write a self-contained catalog tree:
///
/// ```text
/// <out_dir>/collection.json
/// <out_dir>/<item id>/<item id>.json
/// ```
///
/// Links are relative, so the tree can be moved or served from anywhere.
/// The whole catalog is validated first; nothing is written unless every
/// item and the collection pass.
pub fn save_catalog(
    collection: &Collection,
    items: &[Item],
    out_dir: &Path,
) -> Result<(), StacError> {
    validate::validate_all(collection, items)?;

    let mut collection = collection.clone();
    collection.links = vec![Link::new("root", "./collection.json", MEDIA_TYPE_JSON)];
    for item in items {
        collection.links.push(Link::new(
            "item",
            format!("./{id}/{id}.json", id = item.id),
            MEDIA_TYPE_GEOJSON,
        ));
    }

    fs::create_dir_all(out_dir)?;

    for item in items {
        let mut item = item.clone();
        item.collection = Some(collection.id.clone());
        item.links = vec![
            Link::new("root", "../collection.json", MEDIA_TYPE_JSON),
            Link::new("parent", "../collection.json", MEDIA_TYPE_JSON),
            Link::new("collection", "../collection.json", MEDIA_TYPE_JSON),
        ];

        let item_dir = out_dir.join(&item.id);
        fs::create_dir_all(&item_dir)?;
        let file = File::create(item_dir.join(format!("{}.json", item.id)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &item)?;
    }

    let file = File::create(out_dir.join("collection.json"))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &collection)?;

    log::info!("wrote catalog with {} items to {:?}", items.len(), out_dir);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use kappa_core::record::{ImageGroup, RawImageRecord, TrajectoryRecord};
    use kappa_extract::TrajectoryIndex;

    use crate::assembler::{build_items, image_collection};
    use crate::models::Collection;

    fn sample_items() -> Vec<Item> {
        let record = RawImageRecord {
            trajectory_id: 5,
            sensor_id: 110031,
            image_id: 42,
            gps_epoch_s: 1234.5,
            name: "img_000042.jpg".to_string(),
            x_m: 16.37,
            y_m: 48.21,
            z_m: 171.0,
            rx_rad: 0.1,
            ry_rad: 0.2,
            rz_rad: 0.3,
            path: "/data/img_000042.jpg".into(),
        };
        let index = TrajectoryIndex::from_records([TrajectoryRecord {
            id: 5,
            epsg: 4326,
            gps_week: 2190,
        }]);
        build_items(&[ImageGroup::new(record)], &index).unwrap()
    }

    #[test]
    fn writes_a_self_contained_tree() {
        let out = tempfile::tempdir().unwrap();
        let items = sample_items();
        let mut collection = image_collection("images");
        collection.update_extent_from_items(&items);

        save_catalog(&collection, &items, out.path()).unwrap();

        let collection_json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out.path().join("collection.json")).unwrap(),
        )
        .unwrap();
        let links = collection_json["links"].as_array().unwrap();
        assert!(links
            .iter()
            .any(|l| l["rel"] == "item" && l["href"] == "./5_img_000042/5_img_000042.json"));

        let item_json: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(out.path().join("5_img_000042/5_img_000042.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(item_json["collection"], "images");
        assert_eq!(item_json["assets"]["front"]["type"], "image/jpeg");
    }

    #[test]
    fn nothing_is_written_when_validation_fails() {
        let out = tempfile::tempdir().unwrap();
        let mut items = sample_items();
        items[0].id.clear();
        let mut collection: Collection = image_collection("images");
        collection.update_extent_from_items(&items);

        let err = save_catalog(&collection, &items, out.path()).unwrap_err();
        assert!(matches!(err, StacError::Validation(_)));
        assert!(!out.path().join("collection.json").exists());
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
