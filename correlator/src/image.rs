//! Build a static map image URL for a resolved path (§4.16).

use crate::arena::{Arena, FpId};
use crate::db::DbReader;
use crate::error::CorrelatorError;

const STATIC_MAP_BASE: &str = "https://maps.googleapis.com/maps/api/staticmap";

/// Builds a Google Static Maps URL plotting the antenna locations visited
/// along `path`, in order. The API key is read from `MAPS_API_KEY` rather
/// than baked into the binary.
pub fn build_static_map_url(
    path: &[FpId],
    arena: &Arena,
    db: &DbReader,
) -> Result<String, CorrelatorError> {
    let api_key = std::env::var("MAPS_API_KEY").unwrap_or_default();
    let mut markers = Vec::with_capacity(path.len());
    for &id in path {
        let fp = arena.get(id);
        let (lat, lng) = db.get_antenna_location(fp.row.antenna_id, fp.last_seen())?;
        markers.push(format!("{lat},{lng}"));
    }

    let mut url = format!("{STATIC_MAP_BASE}?size=640x640");
    if !markers.is_empty() {
        url.push_str("&path=color:0x0000ff|weight:3|");
        url.push_str(&markers.join("|"));
        for marker in &markers {
            url.push_str(&format!("&markers={marker}"));
        }
    }
    if !api_key.is_empty() {
        url.push_str(&format!("&key={api_key}"));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_types::FingerprintRow;
    use std::path::Path;

    fn fp(id: i64, antenna_id: u32) -> FingerprintRow {
        FingerprintRow {
            id,
            mac: [0; 6],
            rssi: -60,
            std: 1.0,
            mean: -60.0,
            first_seen: 0,
            last_seen: 0,
            service_uuid: 1,
            company_id: 1,
            is_random: true,
            antenna_id,
        }
    }

    #[test]
    fn builds_url_with_one_marker_per_path_entry() {
        let db = DbReader::open(Path::new(":memory:")).unwrap();
        db.raw_insert_metadata_for_test(1, 50.0, 11.0, 0).unwrap();
        db.raw_insert_metadata_for_test(2, 51.0, 12.0, 0).unwrap();
        let arena = Arena::from_rows(vec![fp(1, 1), fp(2, 2)]);

        let url = build_static_map_url(&[0, 1], &arena, &db).unwrap();
        assert!(url.contains("markers=50,11"));
        assert!(url.contains("markers=51,12"));
    }
}
