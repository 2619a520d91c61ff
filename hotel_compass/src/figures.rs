//! Static figure builders.
//!
//! Builders are pure: they read the immutable [`ReviewSet`] (plus a
//! [`MapView`] and Mapbox config for the map layout) and return fresh
//! serializable values, so nothing mutates shared figure state between
//! events.

use std::collections::{HashMap, HashSet};

use ordered_float::OrderedFloat;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

use crate::config::MapboxConfig;
use crate::gazetteer::MapView;
use crate::ReviewSet;

/// Color-scale domain shared by the map markers and the bar chart, reversed
/// so a higher rating lands on the cooler end of the default palette.
pub const RATING_SCALE_MIN: f64 = 7.0;
pub const RATING_SCALE_MAX: f64 = 9.5;

/// Minimum rendered marker size keeps low-volume hotels visible.
pub const MARKER_SIZE_MIN: u32 = 4;
pub const MARKER_SIZE_REF: f64 = 13.0;
pub const MARKER_OPACITY: f64 = 0.8;

pub const MAP_HOVER_TEMPLATE: &str = "<b>%{text}</b><br>Average Rating: %{hovertext}<br>Total Reviews: %{marker.size:,}<extra></extra>";

/// Marker arrays for the map trace, one entry per distinct coordinate pair
/// in first-seen record order. All six vectors are index-aligned to the same
/// hotel.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MapMarkers {
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    pub hotels: Vec<String>,
    pub ratings_display: Vec<String>,
    pub sizes: Vec<u64>,
    pub colors: Vec<f64>,
}

pub fn map_markers(set: &ReviewSet) -> MapMarkers {
    let ratings: HashMap<&str, (&str, f64)> = set
        .summaries()
        .iter()
        .map(|summary| {
            (
                summary.hotel.as_str(),
                (summary.rating_display.as_str(), summary.rating),
            )
        })
        .collect();
    let counts: HashMap<&str, u64> = set
        .counts()
        .iter()
        .map(|count| (count.hotel.as_str(), count.count))
        .collect();

    let mut seen: HashSet<(OrderedFloat<f64>, OrderedFloat<f64>)> = HashSet::new();
    let mut markers = MapMarkers::default();
    for record in set.records() {
        if !seen.insert((OrderedFloat(record.lat), OrderedFloat(record.lon))) {
            continue;
        }
        let (display, rating) = match ratings.get(record.hotel.as_str()) {
            Some(&(display, rating)) => (display, rating),
            None => continue,
        };
        let count = match counts.get(record.hotel.as_str()) {
            Some(&count) => count,
            None => continue,
        };
        markers.lat.push(record.lat);
        markers.lon.push(record.lon);
        markers.hotels.push(record.hotel.clone());
        markers.ratings_display.push(display.to_string());
        markers.sizes.push(count);
        markers.colors.push(rating);
    }
    markers
}

/// Bar arrays in histogram order. A `None` rating serializes as JSON `null`,
/// which Plotly renders as a gap.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BarChart {
    pub hotels: Vec<String>,
    pub ratings: Vec<Option<f64>>,
}

pub fn bar_chart(set: &ReviewSet) -> BarChart {
    let mut chart = BarChart::default();
    for row in set.histogram() {
        chart.hotels.push(row.hotel.clone());
        chart.ratings.push(row.rating);
    }
    chart
}

pub fn map_trace(markers: &MapMarkers) -> JsonValue {
    json!({
        "type": "scattermapbox",
        "mode": "markers",
        "lat": &markers.lat,
        "lon": &markers.lon,
        "text": &markers.hotels,
        "hovertext": &markers.ratings_display,
        "marker": {
            "size": &markers.sizes,
            "sizemin": MARKER_SIZE_MIN,
            "sizeref": MARKER_SIZE_REF,
            "opacity": MARKER_OPACITY,
            "color": &markers.colors,
            "cmin": RATING_SCALE_MIN,
            "cmax": RATING_SCALE_MAX,
            "reversescale": true,
        },
        "hovertemplate": MAP_HOVER_TEMPLATE,
        "showlegend": false,
    })
}

pub fn map_layout(config: &MapboxConfig, view: &MapView) -> JsonValue {
    json!({
        "hovermode": "closest",
        "margin": { "r": 0, "t": 0, "l": 0, "b": 0 },
        "mapbox": {
            "accesstoken": config.access_token.as_str(),
            "style": config.style.as_str(),
            "bearing": view.bearing,
            "center": { "lat": view.center_lat, "lon": view.center_lon },
            "pitch": view.pitch,
            "zoom": view.zoom,
        },
    })
}

pub fn bar_trace(chart: &BarChart) -> JsonValue {
    json!({
        "type": "bar",
        "x": &chart.hotels,
        "y": &chart.ratings,
        "marker": {
            "color": &chart.ratings,
            "cmin": RATING_SCALE_MIN,
            "cmax": RATING_SCALE_MAX,
            "reversescale": true,
        },
        "showlegend": false,
    })
}

pub fn bar_layout() -> JsonValue {
    json!({
        "xaxis": { "visible": false, "automargin": true, "tickangle": -90 },
        "yaxis": { "automargin": true, "title": { "text": "Average Ratings" } },
        "paper_bgcolor": "#F4F4F2",
        "plot_bgcolor": "#F4F4F2",
        "height": 250,
        "margin": { "t": 5, "l": 10, "r": 10 },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReviewRecord;

    fn record(hotel: &str, score: &str, lat: f64, lon: f64) -> ReviewRecord {
        ReviewRecord {
            review_date: "8/3/2017".to_string(),
            hotel: hotel.to_string(),
            address: "Somewhere 1".to_string(),
            average_score: score.to_string(),
            nationality: "United States".to_string(),
            reviewer_score: 8.0,
            negative_review: String::new(),
            positive_review: String::new(),
            reviews_by_reviewer: 1,
            lat,
            lon,
        }
    }

    fn sample_set() -> ReviewSet {
        ReviewSet::from_records(vec![
            record("Hotel Alpha", "8.0", 52.36, 4.89),
            record("Hotel Beta", "9.1", 41.38, 2.17),
            record("Hotel Alpha", "8.5", 52.36, 4.89),
        ])
        .unwrap()
    }

    #[test]
    fn one_marker_per_distinct_coordinate() {
        let markers = map_markers(&sample_set());
        assert_eq!(markers.lat.len(), 2);
        assert_eq!(markers.hotels, ["Hotel Alpha", "Hotel Beta"]);
    }

    #[test]
    fn marker_arrays_are_aligned() {
        let markers = map_markers(&sample_set());
        // Index 0 is Hotel Alpha: two reviews, canonical rating 8.5.
        assert_eq!(markers.sizes, [2, 1]);
        assert_eq!(markers.colors, [8.5, 9.1]);
        assert_eq!(markers.ratings_display, ["8.5", "9.1"]);
    }

    #[test]
    fn same_hotel_at_two_coordinates_gets_two_markers() {
        let set = ReviewSet::from_records(vec![
            record("Hotel Alpha", "8.0", 52.36, 4.89),
            record("Hotel Alpha", "8.0", 48.86, 2.33),
        ])
        .unwrap();
        let markers = map_markers(&set);
        assert_eq!(markers.lat, [52.36, 48.86]);
        assert_eq!(markers.sizes, [2, 2]);
    }

    #[test]
    fn map_trace_carries_the_fixed_scale() {
        let trace = map_trace(&map_markers(&sample_set()));
        assert_eq!(trace["marker"]["cmin"], RATING_SCALE_MIN);
        assert_eq!(trace["marker"]["cmax"], RATING_SCALE_MAX);
        assert_eq!(trace["marker"]["reversescale"], true);
        assert_eq!(trace["marker"]["sizemin"], MARKER_SIZE_MIN);
        assert_eq!(trace["marker"]["sizeref"], MARKER_SIZE_REF);
        assert_eq!(trace["hovertemplate"], MAP_HOVER_TEMPLATE);
    }

    #[test]
    fn map_layout_carries_config_and_view() {
        let config = MapboxConfig::new("custom-style", "token-123");
        let view = MapView::anywhere();
        let layout = map_layout(&config, &view);
        assert_eq!(layout["mapbox"]["accesstoken"], "token-123");
        assert_eq!(layout["mapbox"]["style"], "custom-style");
        assert_eq!(layout["mapbox"]["zoom"], view.zoom);
        assert_eq!(layout["mapbox"]["center"]["lat"], view.center_lat);
        assert_eq!(layout["mapbox"]["center"]["lon"], view.center_lon);
        assert_eq!(layout["mapbox"]["bearing"], 0.0);
        assert_eq!(layout["mapbox"]["pitch"], 0.0);
    }

    #[test]
    fn bar_gap_serializes_as_null() {
        let chart = BarChart {
            hotels: vec!["Hotel Alpha".to_string(), "Hotel Ghost".to_string()],
            ratings: vec![Some(8.5), None],
        };
        let trace = bar_trace(&chart);
        assert_eq!(trace["y"][0], 8.5);
        assert!(trace["y"][1].is_null());
        assert_eq!(trace["marker"]["cmin"], RATING_SCALE_MIN);
    }

    #[test]
    fn bar_chart_follows_histogram_order() {
        let chart = bar_chart(&sample_set());
        assert_eq!(chart.hotels, ["Hotel Alpha", "Hotel Beta"]);
        assert_eq!(chart.ratings, [Some(8.5), Some(9.1)]);
    }
}
