use foundation::geo::GeoCoordinate;

/// Conservation status on the IUCN red list, as used by the animal data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IucnStatus {
    CriticallyEndangered,
    Endangered,
    Vulnerable,
    NearThreatened,
    LeastConcern,
    /// Any other value found in the data, kept verbatim.
    Other(String),
}

impl IucnStatus {
    /// Parses the snake_case codes used in the data files.
    pub fn from_code(code: &str) -> Self {
        match code {
            "critically_endangered" => IucnStatus::CriticallyEndangered,
            "endangered" => IucnStatus::Endangered,
            "vulnerable" => IucnStatus::Vulnerable,
            "near_threatened" => IucnStatus::NearThreatened,
            "least_concern" => IucnStatus::LeastConcern,
            other => IucnStatus::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            IucnStatus::CriticallyEndangered => "critically_endangered",
            IucnStatus::Endangered => "endangered",
            IucnStatus::Vulnerable => "vulnerable",
            IucnStatus::NearThreatened => "near_threatened",
            IucnStatus::LeastConcern => "least_concern",
            IucnStatus::Other(code) => code,
        }
    }

    /// Human-readable label; unknown codes are shown as-is.
    pub fn label(&self) -> &str {
        match self {
            IucnStatus::CriticallyEndangered => "Critically Endangered",
            IucnStatus::Endangered => "Endangered",
            IucnStatus::Vulnerable => "Vulnerable",
            IucnStatus::NearThreatened => "Near Threatened",
            IucnStatus::LeastConcern => "Least Concern",
            IucnStatus::Other(code) => code,
        }
    }

    /// Marker colour as `#rrggbb`.
    pub fn color_hex(&self) -> &'static str {
        match self {
            IucnStatus::CriticallyEndangered => "#d32f2f",
            IucnStatus::Endangered => "#f57c00",
            IucnStatus::Vulnerable => "#fbc02d",
            IucnStatus::NearThreatened => "#689f38",
            IucnStatus::LeastConcern => "#388e3c",
            IucnStatus::Other(_) => UNKNOWN_STATUS_COLOR,
        }
    }

    /// Threatened categories get a glow ring on their marker.
    pub fn is_threatened(&self) -> bool {
        matches!(
            self,
            IucnStatus::CriticallyEndangered | IucnStatus::Endangered | IucnStatus::Vulnerable
        )
    }
}

/// Colour for markers without a recognised status.
pub const UNKNOWN_STATUS_COLOR: &str = "#666666";

/// Secondary sighting location of an animal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Occurrence {
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Occurrence {
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        projectable_location(self.lat, self.lon)
    }
}

/// One animal as supplied by the data source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimalRecord {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub country: Option<String>,
    pub img: Option<String>,
    pub sound: Option<String>,
    pub iucn_status: Option<IucnStatus>,
    pub habitat: Option<String>,
    pub fun_fact: Option<String>,
    pub occurrences: Vec<Occurrence>,
}

impl AnimalRecord {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat: Some(lat),
            lon: Some(lon),
            ..Self::default()
        }
    }

    /// Primary location, if the record has one worth displaying.
    pub fn location(&self) -> Option<GeoCoordinate> {
        usable_location(self.lat, self.lon)
    }

    /// Primary coordinate without the `(0, 0)` sentinel check.
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        projectable_location(self.lat, self.lon)
    }

    pub fn status_color_hex(&self) -> &'static str {
        self.iucn_status
            .as_ref()
            .map(IucnStatus::color_hex)
            .unwrap_or(UNKNOWN_STATUS_COLOR)
    }
}

/// Display policy for raw coordinates.
///
/// Both values must be present and finite, and `(0, 0)` is treated as "no
/// location". That sentinel is a data convention, not geography: a real point
/// in the Gulf of Guinea at exactly `(0, 0)` is dropped too. `(0, 45)` or
/// `(12, 0)` are kept.
pub fn usable_location(lat: Option<f64>, lon: Option<f64>) -> Option<GeoCoordinate> {
    projectable_location(lat, lon).filter(|coord| !coord.is_null_island())
}

/// Both values present and finite; `(0, 0)` is accepted.
pub fn projectable_location(lat: Option<f64>, lon: Option<f64>) -> Option<GeoCoordinate> {
    let coord = GeoCoordinate::new(lat?, lon?);
    coord.is_finite().then_some(coord)
}

#[cfg(test)]
mod tests {
    use super::{AnimalRecord, IucnStatus, projectable_location, usable_location};

    #[test]
    fn sentinel_and_missing_coordinates_are_unusable() {
        assert!(usable_location(Some(0.0), Some(0.0)).is_none());
        assert!(usable_location(None, Some(10.0)).is_none());
        assert!(usable_location(Some(10.0), None).is_none());
        assert!(usable_location(Some(f64::NAN), Some(10.0)).is_none());

        let c = usable_location(Some(0.0), Some(45.0)).expect("usable");
        assert_eq!(c.lon_deg, 45.0);
        assert!(usable_location(Some(-0.0), Some(0.0)).is_none());
    }

    #[test]
    fn projectable_location_keeps_the_sentinel() {
        let c = projectable_location(Some(0.0), Some(0.0)).expect("finite");
        assert!(c.is_null_island());
        assert!(projectable_location(Some(f64::INFINITY), Some(0.0)).is_none());
        assert!(projectable_location(None, Some(0.0)).is_none());
    }

    #[test]
    fn status_codes_round_trip_and_unknowns_are_kept() {
        for code in [
            "critically_endangered",
            "endangered",
            "vulnerable",
            "near_threatened",
            "least_concern",
        ] {
            assert_eq!(IucnStatus::from_code(code).code(), code);
        }
        let other = IucnStatus::from_code("data_deficient");
        assert_eq!(other.label(), "data_deficient");
        assert_eq!(other.color_hex(), "#666666");
        assert!(!other.is_threatened());
    }

    #[test]
    fn record_colour_follows_status() {
        let mut rec = AnimalRecord::new("Tiger", 20.0, 78.0);
        assert_eq!(rec.status_color_hex(), "#666666");
        rec.iucn_status = Some(IucnStatus::Endangered);
        assert_eq!(rec.status_color_hex(), "#f57c00");
        assert!(rec.iucn_status.as_ref().is_some_and(IucnStatus::is_threatened));
    }
}
