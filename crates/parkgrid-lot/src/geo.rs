//! Geographic helpers for the nearest-lot query.
//!
//! Lot metadata carries the latitude/longitude of each facility; the
//! client asks for the lot closest to the driver's position before any
//! in-lot routing happens.

use parkgrid_types::LotMeta;

use crate::error::LotError;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres (haversine).
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();
    let d_lat = (lat2 - lat1) / 2.0;
    let d_lon = (lon2.to_radians() - lon1.to_radians()) / 2.0;

    let a = d_lat.sin().powi(2) + lat1.cos() * lat2.cos() * d_lon.sin().powi(2);
    2.0 * a.sqrt().asin() * EARTH_RADIUS_KM
}

/// Pick the lot geographically closest to a position.
///
/// Ties (including exact co-location) settle on the lower lot id for
/// determinism.
///
/// # Errors
///
/// Returns [`LotError::NoLots`] when the iterator is empty.
pub fn nearest_lot<'a, I>(lots: I, latitude: f64, longitude: f64) -> Result<&'a LotMeta, LotError>
where
    I: IntoIterator<Item = &'a LotMeta>,
{
    let mut best: Option<(f64, &LotMeta)> = None;
    for lot in lots {
        let distance = haversine(latitude, longitude, lot.latitude, lot.longitude);
        let closer = match best {
            None => true,
            Some((best_distance, best_lot)) => {
                distance < best_distance
                    || (distance == best_distance && lot.id < best_lot.id)
            }
        };
        if closer {
            best = Some((distance, lot));
        }
    }
    best.map(|(_, lot)| lot).ok_or(LotError::NoLots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkgrid_types::LotId;

    fn lot(id: u32, latitude: f64, longitude: f64) -> LotMeta {
        LotMeta {
            id: LotId::new(id),
            name: format!("Lot {id}"),
            location: None,
            latitude,
            longitude,
        }
    }

    #[test]
    fn haversine_zero_for_same_point() {
        assert!(haversine(52.52, 13.405, 52.52, 13.405) < 1e-9);
    }

    #[test]
    fn haversine_known_distance() {
        // Berlin to Hamburg is roughly 255 km.
        let d = haversine(52.52, 13.405, 53.551, 9.994);
        assert!((d - 255.0).abs() < 5.0, "got {d}");
    }

    #[test]
    fn nearest_lot_picks_closest() {
        let lots = vec![lot(1, 52.52, 13.405), lot(2, 48.137, 11.575)];
        let nearest = nearest_lot(&lots, 48.2, 11.6).unwrap();
        assert_eq!(nearest.id, LotId::new(2));
    }

    #[test]
    fn co_located_lots_tie_break_on_id() {
        let lots = vec![lot(5, 10.0, 10.0), lot(2, 10.0, 10.0)];
        let nearest = nearest_lot(&lots, 10.0, 10.0).unwrap();
        assert_eq!(nearest.id, LotId::new(2));
    }

    #[test]
    fn empty_registry_reports_no_lots() {
        let err = nearest_lot(&[], 0.0, 0.0);
        assert!(matches!(err, Err(LotError::NoLots)));
    }
}
