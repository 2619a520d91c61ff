//! Fixed city reference table used to recenter the map.

use serde::Serialize;

/// Sentinel dropdown value meaning "no city filter".
pub const ANYWHERE: &str = "Anywhere";

pub const DEFAULT_CENTER_LAT: f64 = 48.7329446;
pub const DEFAULT_CENTER_LON: f64 = 5.0126286;
pub const DEFAULT_ZOOM: f64 = 2.5;
pub const CITY_ZOOM: f64 = 8.0;

#[derive(Clone, Copy, Debug)]
pub struct CityRef {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

/// The selectable universe. The dropdown options are generated from this
/// table, which keeps both sides in lockstep.
pub const CITIES: [CityRef; 6] = [
    CityRef {
        name: "Amsterdam",
        lat: 52.3545362,
        lon: 4.7638774,
    },
    CityRef {
        name: "Barcelona",
        lat: 41.3947688,
        lon: 2.0787277,
    },
    CityRef {
        name: "London",
        lat: 51.525826,
        lon: -0.2381047,
    },
    CityRef {
        name: "Milan",
        lat: 45.4017587,
        lon: 8.8486593,
    },
    CityRef {
        name: "Paris",
        lat: 48.8628612,
        lon: 2.1613319,
    },
    CityRef {
        name: "Vienna",
        lat: 48.2205998,
        lon: 16.2399763,
    },
];

pub fn find_city(name: &str) -> Option<&'static CityRef> {
    CITIES.iter().find(|city| city.name == name)
}

/// Camera descriptor for the map figure. Bearing and pitch are always zero;
/// they are carried so the layout round-trips unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MapView {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl MapView {
    /// The wide default view over Europe.
    pub fn anywhere() -> Self {
        Self {
            center_lat: DEFAULT_CENTER_LAT,
            center_lon: DEFAULT_CENTER_LON,
            zoom: DEFAULT_ZOOM,
            bearing: 0.0,
            pitch: 0.0,
        }
    }

    pub fn over_city(city: &CityRef) -> Self {
        Self {
            center_lat: city.lat,
            center_lon: city.lon,
            zoom: CITY_ZOOM,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_names_are_unique() {
        for (index, city) in CITIES.iter().enumerate() {
            assert!(CITIES[index + 1..].iter().all(|other| other.name != city.name));
        }
    }

    #[test]
    fn lookup_is_exact() {
        assert!(find_city("Paris").is_some());
        assert!(find_city("paris").is_none());
        assert!(find_city("Berlin").is_none());
    }
}
