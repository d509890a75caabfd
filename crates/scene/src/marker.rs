use std::sync::Arc;

use foundation::geo::GeoCoordinate;
use foundation::math::SpherePoint;

use crate::entity::MarkerId;
use crate::record::AnimalRecord;

/// Host-assigned id of a loaded marker image.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// What the renderer draws for a marker. Never consulted by picking.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerAppearance {
    /// Status-coloured disc with the animal's initial.
    Fallback {
        color_hex: &'static str,
        glow: bool,
        initial: char,
    },
    /// Loaded image clipped to a disc, bordered in the status colour.
    Image {
        texture: TextureHandle,
        border_hex: &'static str,
    },
}

/// Image the host should fetch for a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub marker: MarkerId,
    pub url: String,
}

/// One displayed animal or occurrence on the globe.
///
/// Geometry is fixed at creation. Hover fields are written only by the hover
/// state machine; the appearance slot only by image completions.
#[derive(Debug, Clone)]
pub struct Marker {
    record: Arc<AnimalRecord>,
    label: String,
    location_text: Option<String>,
    occurrence: Option<usize>,
    coordinate: GeoCoordinate,
    position: SpherePoint,
    base_scale: f64,
    pub(crate) is_hovered: bool,
    pub(crate) hit_scale: f64,
    pub(crate) display_scale: f64,
    pub(crate) appearance: MarkerAppearance,
}

impl Marker {
    pub(crate) fn new(
        record: Arc<AnimalRecord>,
        label: String,
        location_text: Option<String>,
        occurrence: Option<usize>,
        coordinate: GeoCoordinate,
        position: SpherePoint,
        base_scale: f64,
    ) -> Self {
        let appearance = MarkerAppearance::Fallback {
            color_hex: record.status_color_hex(),
            glow: record
                .iucn_status
                .as_ref()
                .is_some_and(|s| s.is_threatened()),
            initial: record.name.chars().next().unwrap_or('?'),
        };
        Self {
            record,
            label,
            location_text,
            occurrence,
            coordinate,
            position,
            base_scale,
            is_hovered: false,
            hit_scale: base_scale,
            display_scale: base_scale,
            appearance,
        }
    }

    /// Source record; shared by a primary marker and its occurrences.
    pub fn record(&self) -> &Arc<AnimalRecord> {
        &self.record
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn location_text(&self) -> Option<&str> {
        self.location_text.as_deref()
    }

    /// Index into the record's occurrences, `None` for the primary location.
    pub fn occurrence(&self) -> Option<usize> {
        self.occurrence
    }

    pub fn coordinate(&self) -> GeoCoordinate {
        self.coordinate
    }

    pub fn position(&self) -> SpherePoint {
        self.position
    }

    pub fn base_scale(&self) -> f64 {
        self.base_scale
    }

    pub fn is_hovered(&self) -> bool {
        self.is_hovered
    }

    /// Footprint size used for picking: base scale, enlarged while hovered.
    pub fn hit_scale(&self) -> f64 {
        self.hit_scale
    }

    /// Size to render this frame, including the hover pulse.
    pub fn display_scale(&self) -> f64 {
        self.display_scale
    }

    pub fn appearance(&self) -> &MarkerAppearance {
        &self.appearance
    }
}
