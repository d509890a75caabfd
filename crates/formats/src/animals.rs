use scene::record::{AnimalRecord, IucnStatus, Occurrence};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One entry of the animal data file, as found on disk.
///
/// Coordinates are lenient: numbers and numeric strings are read, anything
/// else (missing, `null`, garbage) becomes "no coordinate" and is filtered
/// later by the display policy instead of failing the whole file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimalEntry {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lon: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub sound: Option<String>,
    #[serde(default)]
    pub iucn_status: Option<String>,
    #[serde(default)]
    pub habitat: Option<String>,
    #[serde(default)]
    pub fun_fact: Option<String>,
    #[serde(default)]
    pub occurrences: Vec<OccurrenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OccurrenceEntry {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub lon: Option<f64>,
}

#[derive(Debug)]
pub enum AnimalDataError {
    /// The payload is not JSON, or not a top-level array.
    Parse(serde_json::Error),
    InvalidRecord {
        index: usize,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for AnimalDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimalDataError::Parse(e) => write!(f, "animal data parse error: {e}"),
            AnimalDataError::InvalidRecord { index, source } => {
                write!(f, "invalid animal record at index {index}: {source}")
            }
        }
    }
}

impl std::error::Error for AnimalDataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnimalDataError::Parse(e) => Some(e),
            AnimalDataError::InvalidRecord { source, .. } => Some(source),
        }
    }
}

impl From<OccurrenceEntry> for Occurrence {
    fn from(entry: OccurrenceEntry) -> Self {
        Occurrence {
            country: entry.country,
            lat: entry.lat,
            lon: entry.lon,
        }
    }
}

impl From<AnimalEntry> for AnimalRecord {
    fn from(entry: AnimalEntry) -> Self {
        AnimalRecord {
            name: entry.name,
            lat: entry.lat,
            lon: entry.lon,
            country: entry.country,
            img: entry.img,
            sound: entry.sound,
            iucn_status: entry.iucn_status.as_deref().map(IucnStatus::from_code),
            habitat: entry.habitat,
            fun_fact: entry.fun_fact,
            occurrences: entry.occurrences.into_iter().map(Occurrence::from).collect(),
        }
    }
}

/// Parses the animal data file: a JSON array of entries.
pub fn parse_animals(payload: &str) -> Result<Vec<AnimalRecord>, AnimalDataError> {
    let items: Vec<Value> = serde_json::from_str(payload).map_err(AnimalDataError::Parse)?;
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<AnimalEntry>(item)
                .map(AnimalRecord::from)
                .map_err(|source| AnimalDataError::InvalidRecord { index, source })
        })
        .collect()
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::{AnimalDataError, parse_animals};
    use scene::record::{IucnStatus, Occurrence};
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_bundled_animals() {
        let payload = include_str!("../../apps/viewer_native/assets/animals.json");
        let records = parse_animals(payload).expect("parse animals");
        assert_eq!(records.len(), 6);

        let tiger = records
            .iter()
            .find(|r| r.name == "Bengal Tiger")
            .expect("tiger");
        assert_eq!(tiger.iucn_status, Some(IucnStatus::Endangered));
        assert_eq!(tiger.occurrences.len(), 2);
        assert!(tiger.location().is_some());
    }

    #[test]
    fn missing_and_odd_coordinates_become_none() {
        let payload = r#"[
            {"name": "A"},
            {"name": "B", "lat": null, "lon": "12.5"},
            {"name": "C", "lat": "north", "lon": 3, "occurrences": [{"lat": 1, "lon": 2}]}
        ]"#;
        let records = parse_animals(payload).expect("parse");
        assert_eq!(records[0].lat, None);
        assert_eq!(records[1].lat, None);
        assert_eq!(records[1].lon, Some(12.5));
        assert_eq!(records[2].lat, None);
        assert_eq!(
            records[2].occurrences,
            vec![Occurrence {
                country: None,
                lat: Some(1.0),
                lon: Some(2.0),
            }]
        );
    }

    #[test]
    fn unknown_status_codes_are_kept() {
        let records =
            parse_animals(r#"[{"name": "X", "iucn_status": "data_deficient"}]"#).expect("parse");
        assert_eq!(
            records[0].iucn_status,
            Some(IucnStatus::Other("data_deficient".to_string()))
        );
    }

    #[test]
    fn structural_errors_are_reported_with_index() {
        assert!(matches!(
            parse_animals(r#"{"name": "not an array"}"#),
            Err(AnimalDataError::Parse(_))
        ));
        assert!(matches!(
            parse_animals(r#"[{"name": "ok"}, {"lat": 1}]"#),
            Err(AnimalDataError::InvalidRecord { index: 1, .. })
        ));
    }
}
