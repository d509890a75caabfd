use std::sync::Arc;

use foundation::handles::Handle;
use foundation::math::project_coordinate;
use tracing::debug;

use crate::entity::MarkerId;
use crate::marker::{ImageRequest, Marker, MarkerAppearance, TextureHandle};
use crate::record::AnimalRecord;

/// Suffix appended to the name of every occurrence marker.
pub const OCCURRENCE_LABEL_SUFFIX: &str = " (occurrence)";

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerDefaults {
    /// Sphere radius markers sit on; slightly above the globe surface.
    pub display_radius: f64,
    pub base_scale: f64,
}

impl Default for MarkerDefaults {
    fn default() -> Self {
        Self {
            display_radius: 2.1,
            base_scale: 0.4,
        }
    }
}

/// Image completion for a marker that no longer exists.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StaleMarker(pub MarkerId);

impl std::fmt::Display for StaleMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "marker {}@{} is no longer displayed",
            self.0.index(),
            self.0.generation()
        )
    }
}

impl std::error::Error for StaleMarker {}

/// Owner of the active marker set.
///
/// The whole set is replaced on every display recompute and the epoch is
/// bumped, so every [`MarkerId`] issued for the previous set stops resolving.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    defaults: MarkerDefaults,
    epoch: u32,
    markers: Vec<Marker>,
}

impl MarkerRegistry {
    pub fn new(defaults: MarkerDefaults) -> Self {
        Self {
            defaults,
            epoch: 0,
            markers: Vec::new(),
        }
    }

    pub fn defaults(&self) -> MarkerDefaults {
        self.defaults
    }

    /// Generation of the current display set.
    pub fn epoch(&self) -> u32 {
        self.epoch
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Replaces the display set with one marker per usable record.
    ///
    /// Records without a usable location (see
    /// [`usable_location`](crate::record::usable_location)) are skipped silently.
    pub fn set_display_set(&mut self, records: &[Arc<AnimalRecord>]) -> Vec<MarkerId> {
        self.begin_recompute();
        for record in records {
            let Some(coord) = record.location() else {
                continue;
            };
            let label = record.name.clone();
            let location = record.country.clone();
            self.push(Marker::new(
                Arc::clone(record),
                label,
                location,
                None,
                coord,
                project_coordinate(coord, self.defaults.display_radius),
                self.defaults.base_scale,
            ));
        }
        debug!(
            records = records.len(),
            markers = self.markers.len(),
            epoch = self.epoch,
            "display set recomputed"
        );
        self.ids()
    }

    /// Replaces the display set with `record`'s primary location plus one
    /// marker per occurrence.
    ///
    /// Occurrence markers share the record and carry their own position,
    /// location text and a `"<name> (occurrence)"` label. The `(0, 0)` sentinel
    /// does not apply here; only locations with a missing or non-finite
    /// coordinate are skipped.
    pub fn expand_occurrences(&mut self, record: &Arc<AnimalRecord>) -> Vec<MarkerId> {
        self.begin_recompute();
        if let Some(coord) = record.coordinate() {
            self.push(Marker::new(
                Arc::clone(record),
                record.name.clone(),
                record.country.clone(),
                None,
                coord,
                project_coordinate(coord, self.defaults.display_radius),
                self.defaults.base_scale,
            ));
        }

        let label = format!("{}{OCCURRENCE_LABEL_SUFFIX}", record.name);
        for (idx, occurrence) in record.occurrences.iter().enumerate() {
            let Some(coord) = occurrence.coordinate() else {
                continue;
            };
            self.push(Marker::new(
                Arc::clone(record),
                label.clone(),
                occurrence.country.clone(),
                Some(idx),
                coord,
                project_coordinate(coord, self.defaults.display_radius),
                self.defaults.base_scale,
            ));
        }
        debug!(
            name = %record.name,
            markers = self.markers.len(),
            epoch = self.epoch,
            "occurrences expanded"
        );
        self.ids()
    }

    /// Removes every marker; outstanding ids become stale.
    pub fn clear(&mut self) {
        self.begin_recompute();
    }

    pub fn contains(&self, id: MarkerId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        if id.generation() != self.epoch {
            return None;
        }
        self.markers.get(id.index() as usize)
    }

    pub(crate) fn get_mut(&mut self, id: MarkerId) -> Option<&mut Marker> {
        if id.generation() != self.epoch {
            return None;
        }
        self.markers.get_mut(id.index() as usize)
    }

    /// Markers in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (MarkerId, &Marker)> + '_ {
        let epoch = self.epoch;
        self.markers
            .iter()
            .enumerate()
            .map(move |(idx, m)| (MarkerId(Handle::new(idx as u32, epoch)), m))
    }

    pub fn ids(&self) -> Vec<MarkerId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Images to fetch for markers still showing their fallback appearance.
    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.iter()
            .filter(|(_, m)| matches!(m.appearance(), MarkerAppearance::Fallback { .. }))
            .filter_map(|(id, m)| {
                let url = m.record().img.as_ref()?;
                Some(ImageRequest {
                    marker: id,
                    url: url.clone(),
                })
            })
            .collect()
    }

    /// Swaps a marker's appearance to a loaded image.
    ///
    /// Only the appearance slot changes; position and picking footprint do not.
    pub fn apply_image(&mut self, id: MarkerId, texture: TextureHandle) -> Result<(), StaleMarker> {
        let marker = self.get_mut(id).ok_or(StaleMarker(id))?;
        let border_hex = marker.record().status_color_hex();
        marker.appearance = MarkerAppearance::Image {
            texture,
            border_hex,
        };
        Ok(())
    }

    fn begin_recompute(&mut self) {
        self.markers.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    /// Test hook: markers at explicit positions instead of projected ones.
    #[cfg(test)]
    pub(crate) fn set_display_set_at(
        &mut self,
        records: &[Arc<AnimalRecord>],
        positions: &[foundation::math::Vec3],
    ) -> Vec<MarkerId> {
        self.begin_recompute();
        for (record, position) in records.iter().zip(positions) {
            let coord = record.location().unwrap_or_default();
            self.push(Marker::new(
                Arc::clone(record),
                record.name.clone(),
                record.country.clone(),
                None,
                coord,
                *position,
                self.defaults.base_scale,
            ));
        }
        self.ids()
    }
}
