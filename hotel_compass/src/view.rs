//! The three reactive handlers. Each is a pure function of its inputs plus
//! the immutable loaded data; the UI layer invokes them per event.

use crate::gazetteer::{self, MapView, ANYWHERE};
use crate::{CompassError, ReviewRecord};

/// Recompute the map camera for a dropdown selection.
///
/// `Anywhere` restores the default view; a gazetteer city gets its stored
/// coordinates at city zoom. Any other name is an [`CompassError::UnknownCity`]
/// error so a drifted dropdown is caught instead of silently ignored.
pub fn recenter(selection: &str) -> Result<MapView, CompassError> {
    if selection == ANYWHERE {
        return Ok(MapView::anywhere());
    }
    gazetteer::find_city(selection)
        .map(MapView::over_city)
        .ok_or_else(|| CompassError::UnknownCity(selection.to_string()))
}

/// Positive review text for the effective (first) selected record index.
pub fn positive_review<'a>(records: &'a [ReviewRecord], selection: &[usize]) -> Option<&'a str> {
    selected_record(records, selection).map(|record| record.positive_review.as_str())
}

/// Negative review text for the effective (first) selected record index.
pub fn negative_review<'a>(records: &'a [ReviewRecord], selection: &[usize]) -> Option<&'a str> {
    selected_record(records, selection).map(|record| record.negative_review.as_str())
}

/// Only the first selected index counts; the table allows a single marked
/// row at a time. An out-of-range index means the selection went stale
/// against a re-sorted view and is treated as no selection.
fn selected_record<'a>(
    records: &'a [ReviewRecord],
    selection: &[usize],
) -> Option<&'a ReviewRecord> {
    let index = *selection.first()?;
    records.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::{CITIES, CITY_ZOOM, DEFAULT_CENTER_LAT, DEFAULT_CENTER_LON, DEFAULT_ZOOM};

    fn record(index: usize) -> ReviewRecord {
        ReviewRecord {
            review_date: "8/3/2017".to_string(),
            hotel: format!("Hotel {index}"),
            address: "Somewhere 1".to_string(),
            average_score: "8.1".to_string(),
            nationality: "United States".to_string(),
            reviewer_score: 8.0,
            negative_review: format!("negative {index}"),
            positive_review: format!("positive {index}"),
            reviews_by_reviewer: 1,
            lat: 0.0,
            lon: 0.0,
        }
    }

    fn records(len: usize) -> Vec<ReviewRecord> {
        (0..len).map(record).collect()
    }

    #[test]
    fn recenter_returns_exact_city_coordinates() {
        for city in &CITIES {
            let view = recenter(city.name).unwrap();
            assert_eq!(view.center_lat, city.lat);
            assert_eq!(view.center_lon, city.lon);
            assert_eq!(view.zoom, CITY_ZOOM);
            assert_eq!(view.bearing, 0.0);
            assert_eq!(view.pitch, 0.0);
        }
    }

    #[test]
    fn recenter_anywhere_is_the_default_view() {
        let view = recenter(ANYWHERE).unwrap();
        assert_eq!(view.center_lat, DEFAULT_CENTER_LAT);
        assert_eq!(view.center_lon, DEFAULT_CENTER_LON);
        assert_eq!(view.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn recenter_rejects_unknown_city() {
        match recenter("Atlantis") {
            Err(CompassError::UnknownCity(name)) => assert_eq!(name, "Atlantis"),
            other => panic!("expected UnknownCity, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let records = records(4);
        assert_eq!(positive_review(&records, &[]), None);
        assert_eq!(negative_review(&records, &[]), None);
    }

    #[test]
    fn both_panels_read_the_same_row() {
        let records = records(8);
        assert_eq!(positive_review(&records, &[5]), Some("positive 5"));
        assert_eq!(negative_review(&records, &[5]), Some("negative 5"));
    }

    #[test]
    fn only_the_first_selected_index_counts() {
        let records = records(8);
        assert_eq!(positive_review(&records, &[3, 7]), Some("positive 3"));
        assert_eq!(negative_review(&records, &[3, 7]), Some("negative 3"));
    }

    #[test]
    fn stale_index_is_no_selection() {
        let records = records(2);
        assert_eq!(positive_review(&records, &[9]), None);
        assert_eq!(negative_review(&records, &[9]), None);
    }
}
