use crate::error::CollaboratorError;
use geo::{Coord, Geometry, Rect, coord};
use geojson::GeoJson;
use serde::Deserialize;
use serde_json::from_slice;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Road as returned by the registry.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RoadEntry {
    pub name: String,
    pub id: String,
    /// `[lon_min, lat_min, lon_max, lat_max]`
    pub bbox: [f64; 4],
}

impl RoadEntry {
    pub fn bbox_rect(&self) -> Rect<f64> {
        let [lon_min, lat_min, lon_max, lat_max] = self.bbox;
        Rect::new(coord! { x: lon_min, y: lat_min }, coord! { x: lon_max, y: lat_max })
    }
}

/// Address candidate on a road; `coordinates` is `(lon, lat)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressEntry {
    pub label: String,
    pub id: String,
    pub coordinates: Coord<f64>,
}

/// Unit data needed by the price model.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UnitDetails {
    pub rooms: u32,
    pub size: f64,
    pub build_year: u32,
}

pub trait RoadLookup {
    fn fetch_roads(&self, zipcode: &str) -> Result<Vec<RoadEntry>, CollaboratorError>;
}

pub trait AddressLookup {
    fn fetch_addresses(&self, road_id: &str) -> Result<Vec<AddressEntry>, CollaboratorError>;
}

pub trait UnitLookup {
    /// `Ok(None)` when the registry knows no unit at the address.
    fn fetch_unit(&self, address_id: &str) -> Result<Option<UnitDetails>, CollaboratorError>;
}

/// Normalizes a lookup key into a file-name fragment.
fn file_key(key: &str) -> String {
    key.to_lowercase().replace(' ', "_").replace(['(', ')'], "")
}

/// Registry snapshot stored as JSON and GeoJSON files in one directory.
#[derive(Clone)]
pub struct DataCache {
    base: PathBuf,
    units: BTreeMap<String, UnitDetails>,
}

impl DataCache {
    /// Opens `base`; a missing `units_file` just means no unit is ever found.
    pub fn new<P: AsRef<Path>>(base: P, units_file: &str) -> Result<Self, CollaboratorError> {
        let base = base.as_ref().to_path_buf();
        let units: BTreeMap<String, UnitDetails> = match fs::read(base.join(units_file)) {
            Ok(bytes) => from_slice(&bytes).map_err(|e| unavailable("unit lookup", e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %base.join(units_file).display(), "no unit data");
                BTreeMap::new()
            }
            Err(e) => return Err(unavailable("unit lookup", e)),
        };
        Ok(Self { base, units })
    }

    fn read(&self, collaborator: &'static str, key: &str, filename: String) -> Result<Vec<u8>, CollaboratorError> {
        fs::read(self.base.join(&filename)).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CollaboratorError::NotFound {
                collaborator,
                key: key.to_string(),
            },
            _ => unavailable(collaborator, e),
        })
    }
}

fn unavailable(collaborator: &'static str, e: impl std::fmt::Display) -> CollaboratorError {
    CollaboratorError::Unavailable {
        collaborator,
        reason: e.to_string(),
    }
}

impl RoadLookup for DataCache {
    fn fetch_roads(&self, zipcode: &str) -> Result<Vec<RoadEntry>, CollaboratorError> {
        const WHO: &str = "road lookup";
        let data = self.read(WHO, zipcode, format!("roads_{}.json", file_key(zipcode)))?;
        from_slice(&data).map_err(|e| unavailable(WHO, e))
    }
}

impl AddressLookup for DataCache {
    fn fetch_addresses(&self, road_id: &str) -> Result<Vec<AddressEntry>, CollaboratorError> {
        const WHO: &str = "address lookup";
        let data = self.read(WHO, road_id, format!("addresses_{}.geojson", file_key(road_id)))?;
        let txt = String::from_utf8(data).map_err(|e| unavailable(WHO, e))?;
        let GeoJson::FeatureCollection(fc) = GeoJson::from_str(&txt).map_err(|e| unavailable(WHO, e))? else {
            return Err(unavailable(WHO, "expected a FeatureCollection"));
        };

        let mut entries = Vec::new();
        for feature in fc.features {
            let label = feature.property("label").and_then(|v| v.as_str());
            let id = feature.property("id").and_then(|v| v.as_str());
            let (Some(label), Some(id)) = (label, id) else {
                tracing::warn!(road_id, "address feature without label or id, skipped");
                continue;
            };
            let Some(gj) = feature.geometry.as_ref() else {
                continue;
            };
            let geom: Geometry<f64> = gj.value.clone().try_into().map_err(|e: geojson::Error| unavailable(WHO, e))?;
            let Geometry::Point(point) = geom else {
                tracing::warn!(road_id, label, "address geometry is not a point, skipped");
                continue;
            };
            entries.push(AddressEntry {
                label: label.to_string(),
                id: id.to_string(),
                coordinates: point.0,
            });
        }
        Ok(entries)
    }
}

impl UnitLookup for DataCache {
    fn fetch_unit(&self, address_id: &str) -> Result<Option<UnitDetails>, CollaboratorError> {
        Ok(self.units.get(address_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const ADDRESSES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [10.2051, 56.1531] },
              "properties": { "label": "Main St 1, 8000 Aarhus C", "id": "a-1" } },
            { "type": "Feature",
              "geometry": { "type": "LineString", "coordinates": [[10.2, 56.1], [10.3, 56.2]] },
              "properties": { "label": "Not a point", "id": "a-2" } },
            { "type": "Feature",
              "geometry": { "type": "Point", "coordinates": [10.2055, 56.1533] },
              "properties": { "id": "a-3" } }
        ]
    }"#;

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("roads_8000.json"),
            r#"[{ "name": "Main St", "id": "road-1", "bbox": [10.20, 56.15, 10.21, 56.16] }]"#,
        )
        .unwrap();
        fs::write(dir.path().join("addresses_road-1.geojson"), ADDRESSES).unwrap();
        fs::write(
            dir.path().join("units.json"),
            r#"{ "a-1": { "rooms": 3, "size": 80.0, "build_year": 1990 } }"#,
        )
        .unwrap();
        dir
    }

    #[test]
    fn reads_roads_for_zipcode() {
        let dir = fixture();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        let roads = cache.fetch_roads("8000").unwrap();
        assert_eq!(roads.len(), 1);
        assert_eq!(roads[0].name, "Main St");
        let bbox = roads[0].bbox_rect();
        assert_eq!((bbox.min().x, bbox.max().y), (10.20, 56.16));
    }

    #[test]
    fn missing_zipcode_is_not_found() {
        let dir = fixture();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        assert!(matches!(
            cache.fetch_roads("8200"),
            Err(CollaboratorError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_roads_are_unavailable() {
        let dir = fixture();
        fs::write(dir.path().join("roads_8210.json"), "[{").unwrap();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        assert!(matches!(
            cache.fetch_roads("8210"),
            Err(CollaboratorError::Unavailable { .. })
        ));
    }

    #[test]
    fn reads_point_addresses_and_skips_the_rest() {
        let dir = fixture();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        let addresses = cache.fetch_addresses("road-1").unwrap();
        assert_eq!(
            addresses,
            vec![AddressEntry {
                label: "Main St 1, 8000 Aarhus C".into(),
                id: "a-1".into(),
                coordinates: coord! { x: 10.2051, y: 56.1531 },
            }]
        );
    }

    #[test]
    fn unit_lookup_distinguishes_absence() {
        let dir = fixture();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        assert_eq!(
            cache.fetch_unit("a-1").unwrap(),
            Some(UnitDetails {
                rooms: 3,
                size: 80.0,
                build_year: 1990
            })
        );
        assert_eq!(cache.fetch_unit("a-3").unwrap(), None);
    }

    #[test]
    fn missing_units_file_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DataCache::new(dir.path(), "units.json").unwrap();
        assert_eq!(cache.fetch_unit("a-1").unwrap(), None);
    }

    #[test]
    fn keys_are_normalized() {
        assert_eq!(file_key("Road (North) 7"), "road_north_7");
    }
}
