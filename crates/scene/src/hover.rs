use std::sync::Arc;

use foundation::math::Vec2;
use foundation::time::Time;
use runtime::event_bus::EventBus;
use tracing::debug;

use crate::camera::{PerspectiveCamera, PointerState};
use crate::entity::MarkerId;
use crate::picking::pick;
use crate::record::AnimalRecord;
use crate::registry::MarkerRegistry;

/// Pixel offset of the tooltip from the pointer, `+y` down.
pub const TOOLTIP_OFFSET_PX: Vec2 = Vec2 { x: 10.0, y: -10.0 };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverConfig {
    /// Hovered markers are drawn and hit-tested at `base_scale * hover_factor`.
    pub hover_factor: f64,
    pub pulse_amplitude: f64,
    /// Pulse angular rate in radians per second.
    pub pulse_rate: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            hover_factor: 1.5,
            pulse_amplitude: 0.1,
            pulse_rate: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub marker: MarkerId,
    pub title: String,
    pub subtitle: Option<String>,
    pub anchor_px: Vec2,
}

/// The record shown in the detail panel.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailSelection {
    pub marker: MarkerId,
    pub record: Arc<AnimalRecord>,
    pub label: String,
    pub location_text: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DetailCloseReason {
    Requested,
    MarkerRemoved,
}

/// Notifications for the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum HoverEvent {
    Entered { marker: MarkerId, tooltip: Tooltip },
    Left { marker: MarkerId },
    Selected(DetailSelection),
    DetailClosed {
        marker: MarkerId,
        reason: DetailCloseReason,
    },
}

/// Hover and detail state over a [`MarkerRegistry`].
///
/// Hover is `Idle` or `Hovering(marker)`; the open detail is orthogonal to it.
/// This is the only writer of a marker's hover fields, which keeps "at most one
/// hovered marker" true by construction.
#[derive(Debug, Default)]
pub struct HoverState {
    config: HoverConfig,
    hovered: Option<MarkerId>,
    tooltip: Option<Tooltip>,
    detail: Option<DetailSelection>,
}

impl HoverState {
    pub fn new(config: HoverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> HoverConfig {
        self.config
    }

    pub fn hovered(&self) -> Option<MarkerId> {
        self.hovered
    }

    pub fn is_idle(&self) -> bool {
        self.hovered.is_none()
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.tooltip.as_ref()
    }

    pub fn detail(&self) -> Option<&DetailSelection> {
        self.detail.as_ref()
    }

    /// Re-picks under the pointer and moves the hover if the result changed.
    ///
    /// Returns the marker under the pointer, if any.
    pub fn pointer_moved(
        &mut self,
        pointer: PointerState,
        camera: &PerspectiveCamera,
        registry: &mut MarkerRegistry,
        bus: &mut EventBus<HoverEvent>,
    ) -> Option<MarkerId> {
        let target = pick(pointer.ndc, camera, registry).map(|hit| hit.marker);
        self.set_hovered(target, pointer, registry, bus);
        target
    }

    /// Opens the detail for the marker under the pointer. Hover is untouched
    /// and a click over empty space does nothing.
    pub fn select(
        &mut self,
        pointer: PointerState,
        camera: &PerspectiveCamera,
        registry: &MarkerRegistry,
        bus: &mut EventBus<HoverEvent>,
    ) -> Option<&DetailSelection> {
        let hit = pick(pointer.ndc, camera, registry)?;
        let marker = registry.get(hit.marker)?;

        let selection = DetailSelection {
            marker: hit.marker,
            record: Arc::clone(marker.record()),
            label: marker.label().to_string(),
            location_text: marker.location_text().map(str::to_string),
        };
        debug!(marker = ?hit.marker, name = %selection.label, "detail opened");
        bus.emit(HoverEvent::Selected(selection.clone()));
        self.detail = Some(selection);
        self.detail.as_ref()
    }

    pub fn close_detail(&mut self, bus: &mut EventBus<HoverEvent>) {
        self.close_detail_with(DetailCloseReason::Requested, bus);
    }

    /// Drops hover and detail references that no longer resolve.
    ///
    /// Must run after every display-set recompute, before the next pointer event.
    pub fn reconcile(&mut self, registry: &MarkerRegistry, bus: &mut EventBus<HoverEvent>) {
        if let Some(marker) = self.hovered
            && !registry.contains(marker)
        {
            debug!(?marker, "hover cleared: marker removed");
            self.hovered = None;
            self.tooltip = None;
            bus.emit(HoverEvent::Left { marker });
        }

        if self
            .detail
            .as_ref()
            .is_some_and(|d| !registry.contains(d.marker))
        {
            self.close_detail_with(DetailCloseReason::MarkerRemoved, bus);
        }
    }

    /// Per-frame pulse of the hovered marker's display scale.
    ///
    /// Only the display scale moves; the hit-test footprint stays at the
    /// discrete hover scale.
    pub fn animate(&self, time: Time, registry: &mut MarkerRegistry) {
        let Some(id) = self.hovered else {
            return;
        };
        let Some(marker) = registry.get_mut(id) else {
            return;
        };
        let hover_scale = marker.base_scale() * self.config.hover_factor;
        marker.display_scale = hover_scale
            + (time.seconds() * self.config.pulse_rate).sin() * self.config.pulse_amplitude;
    }

    fn set_hovered(
        &mut self,
        target: Option<MarkerId>,
        pointer: PointerState,
        registry: &mut MarkerRegistry,
        bus: &mut EventBus<HoverEvent>,
    ) {
        if target == self.hovered {
            return;
        }

        if let Some(prev) = self.hovered.take() {
            if let Some(marker) = registry.get_mut(prev) {
                marker.is_hovered = false;
                marker.hit_scale = marker.base_scale();
                marker.display_scale = marker.base_scale();
            }
            self.tooltip = None;
            debug!(marker = ?prev, "hover left");
            bus.emit(HoverEvent::Left { marker: prev });
        }

        let Some(next) = target else {
            return;
        };
        let Some(marker) = registry.get_mut(next) else {
            return;
        };
        let hover_scale = marker.base_scale() * self.config.hover_factor;
        marker.is_hovered = true;
        marker.hit_scale = hover_scale;
        marker.display_scale = hover_scale;

        let tooltip = Tooltip {
            marker: next,
            title: marker.label().to_string(),
            subtitle: marker.location_text().map(str::to_string),
            anchor_px: pointer.screen_px + TOOLTIP_OFFSET_PX,
        };
        debug!(marker = ?next, name = %tooltip.title, "hover entered");
        self.hovered = Some(next);
        self.tooltip = Some(tooltip.clone());
        bus.emit(HoverEvent::Entered {
            marker: next,
            tooltip,
        });
    }

    fn close_detail_with(&mut self, reason: DetailCloseReason, bus: &mut EventBus<HoverEvent>) {
        if let Some(detail) = self.detail.take() {
            debug!(marker = ?detail.marker, ?reason, "detail closed");
            bus.emit(HoverEvent::DetailClosed {
                marker: detail.marker,
                reason,
            });
        }
    }
}
