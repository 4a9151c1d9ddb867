use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use parquet::format::KeyValue;
use serde_json::Value;

use kappa_core::geojson::{Feature, FeatureCollection};

use crate::error::WfsError;
use crate::wkb;

/// Write the collection as a plain GeoJSON document.
pub fn write_geojson(collection: &FeatureCollection, path: &Path) -> Result<(), WfsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), collection)?;
    log::info!("wrote {} features to {:?}", collection.features.len(), path);
    Ok(())
}

/// Write the collection as GeoParquet: one column per property key, plus a
/// WKB `geometry` column, with the `geo` metadata entry in the file footer.
pub fn write_geoparquet(collection: &FeatureCollection, path: &Path) -> Result<(), WfsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let features = &collection.features;
    let keys = collect_keys(features);

    let mut fields = Vec::with_capacity(keys.len() + 1);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(keys.len() + 1);
    for key in &keys {
        let kind = classify(features, key);
        fields.push(Field::new(key, kind.data_type(), true));
        columns.push(build_column(features, key, kind));
    }

    let mut wkbs = Vec::with_capacity(features.len());
    for feature in features {
        wkbs.push(match &feature.geometry {
            Some(geometry) => Some(wkb::encode(geometry)?),
            None => None,
        });
    }
    fields.push(Field::new("geometry", DataType::Binary, true));
    columns.push(Arc::new(wkbs.into_iter().collect::<BinaryArray>()));

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns)?;

    let props = WriterProperties::builder()
        .set_key_value_metadata(Some(vec![KeyValue::new(
            "geo".to_string(),
            geo_metadata(features),
        )]))
        .build();

    let file = File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;

    log::info!("wrote {} features to {:?}", features.len(), path);
    Ok(())
}

/// GeoParquet `geo` footer entry.
fn geo_metadata(features: &[Feature]) -> String {
    let mut geometry_types: Vec<&'static str> = features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .map(|g| g.geometry_type())
        .collect();
    geometry_types.sort_unstable();
    geometry_types.dedup();

    serde_json::json!({
        "version": "1.1.0",
        "primary_column": "geometry",
        "columns": {
            "geometry": {
                "encoding": "WKB",
                "geometry_types": geometry_types,
            }
        }
    })
    .to_string()
}

/// Column type picked per property key across all features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Text,
}

impl ColumnKind {
    fn data_type(self) -> DataType {
        match self {
            ColumnKind::Bool => DataType::Boolean,
            ColumnKind::Int => DataType::Int64,
            ColumnKind::Float => DataType::Float64,
            ColumnKind::Text => DataType::Utf8,
        }
    }
}

fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a Value> {
    feature
        .properties
        .as_ref()
        .and_then(|p| p.get(key))
        .filter(|v| !v.is_null())
}

/// Property keys in first-seen order across the whole collection.
fn collect_keys(features: &[Feature]) -> Vec<String> {
    let mut keys = Vec::new();
    for feature in features {
        let Some(properties) = &feature.properties else {
            continue;
        };
        for key in properties.keys() {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn classify(features: &[Feature], key: &str) -> ColumnKind {
    let mut kind: Option<ColumnKind> = None;
    for feature in features {
        let Some(value) = property(feature, key) else {
            continue;
        };
        let seen = match value {
            Value::Bool(_) => ColumnKind::Bool,
            Value::Number(n) if n.is_i64() => ColumnKind::Int,
            Value::Number(_) => ColumnKind::Float,
            Value::String(_) => ColumnKind::Text,
            // nested values serialize as JSON text
            _ => return ColumnKind::Text,
        };
        kind = match (kind, seen) {
            (None, seen) => Some(seen),
            (Some(ColumnKind::Int), ColumnKind::Float)
            | (Some(ColumnKind::Float), ColumnKind::Int) => Some(ColumnKind::Float),
            (Some(have), seen) if have == seen => Some(have),
            _ => return ColumnKind::Text,
        };
    }
    kind.unwrap_or(ColumnKind::Text)
}

fn build_column(features: &[Feature], key: &str, kind: ColumnKind) -> ArrayRef {
    match kind {
        ColumnKind::Bool => Arc::new(
            features
                .iter()
                .map(|f| property(f, key).and_then(Value::as_bool))
                .collect::<BooleanArray>(),
        ),
        ColumnKind::Int => Arc::new(
            features
                .iter()
                .map(|f| property(f, key).and_then(Value::as_i64))
                .collect::<Int64Array>(),
        ),
        ColumnKind::Float => Arc::new(
            features
                .iter()
                .map(|f| property(f, key).and_then(Value::as_f64))
                .collect::<Float64Array>(),
        ),
        ColumnKind::Text => Arc::new(
            features
                .iter()
                .map(|f| {
                    property(f, key).map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                })
                .collect::<StringArray>(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use parquet::file::reader::{FileReader, SerializedFileReader};
    use serde_json::json;

    use kappa_core::geojson::Geometry;

    fn feature(objectid: i64, name: &str, lng: f64, lat: f64) -> Feature {
        let mut properties = serde_json::Map::new();
        properties.insert("OBJECTID".to_string(), json!(objectid));
        properties.insert("NAME".to_string(), json!(name));
        Feature {
            type_name: "Feature".to_string(),
            id: Some(json!(format!("IMAGEPOGD.{objectid}"))),
            geometry: Some(Geometry::Point {
                coordinates: vec![lng, lat],
            }),
            properties: Some(properties),
            others: Default::default(),
        }
    }

    fn collection() -> FeatureCollection {
        let mut collection = FeatureCollection::empty();
        collection.features.push(feature(1, "a", 16.37, 48.21));
        collection.features.push(feature(2, "b", 16.38, 48.22));
        collection
    }

    #[test]
    fn geojson_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("json/images.geojson");
        write_geojson(&collection(), &path).unwrap();

        let back: FeatureCollection =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, collection());
    }

    #[test]
    fn geoparquet_carries_rows_and_geo_footer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parquet/images.geoparquet");
        write_geoparquet(&collection(), &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        let meta = reader.metadata().file_metadata();
        assert_eq!(meta.num_rows(), 2);

        let geo = meta
            .key_value_metadata()
            .unwrap()
            .iter()
            .find(|kv| kv.key == "geo")
            .expect("geo footer entry");
        let geo: Value = serde_json::from_str(geo.value.as_deref().unwrap()).unwrap();
        assert_eq!(geo["primary_column"], "geometry");
        assert_eq!(geo["columns"]["geometry"]["encoding"], "WKB");
        assert_eq!(geo["columns"]["geometry"]["geometry_types"][0], "Point");
    }

    #[test]
    fn mixed_numeric_properties_widen_to_float() {
        let mut c = collection();
        c.features[0]
            .properties
            .as_mut()
            .unwrap()
            .insert("measure".to_string(), json!(1));
        c.features[1]
            .properties
            .as_mut()
            .unwrap()
            .insert("measure".to_string(), json!(2.5));
        assert_eq!(classify(&c.features, "measure"), ColumnKind::Float);
        assert_eq!(classify(&c.features, "OBJECTID"), ColumnKind::Int);
        assert_eq!(classify(&c.features, "NAME"), ColumnKind::Text);
    }

    #[test]
    fn features_without_geometry_write_null_wkb() {
        let mut c = collection();
        c.features[1].geometry = None;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("images.geoparquet");
        write_geoparquet(&c, &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 2);
    }
}
