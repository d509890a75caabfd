//! The globe view context.
//!
//! [`GlobeView`] owns everything one visible globe needs: camera and controls,
//! the marker registry, hover state, the record catalog and projected boundary
//! outlines, plus the frame scheduler that animates it. Hosts drive it from
//! their callbacks (pointer, click, resize, load and image completions, frame
//! ticks) and drain [`GlobeEvent`]s afterwards. Everything runs on the caller's
//! thread; there are no locks.

use formats::{BoundaryDocument, LoadError};
use foundation::math::{BoundaryGeometry, SpherePoint};
use runtime::event_bus::{EventBus, Stamped};
use runtime::scheduler::{FrameScheduler, TickOutcome};
use scene::MarkerId;
use scene::camera::{OrbitControls, PerspectiveCamera, PointerState, Viewport};
use scene::hover::{DetailSelection, HoverEvent, HoverState, Tooltip};
use scene::marker::{ImageRequest, MarkerAppearance, TextureHandle};
use scene::query::{AnimalCatalog, CatalogQuery};
use scene::record::AnimalRecord;
use scene::registry::MarkerRegistry;
use tracing::{debug, info, warn};

use crate::config::GlobeConfig;
use crate::host::ImageLoadError;

/// Which data source a load notification refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataSource {
    Boundaries,
    Animals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GlobeEvent {
    Hover(HoverEvent),
    BoundariesReady { features: usize },
    DisplaySetChanged { markers: usize, epoch: u32 },
    LoadFailed { source: DataSource, message: String },
    ImageApplied { marker: MarkerId },
    ImageFailed { marker: MarkerId, message: String },
}

/// Cursor the host should show after a pointer move.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CursorHint {
    Default,
    Pointer,
}

/// Per-marker draw data for the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSprite {
    pub marker: MarkerId,
    pub position: SpherePoint,
    pub scale: f64,
    pub hovered: bool,
    pub appearance: MarkerAppearance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub frame_index: Option<u64>,
    pub camera: PerspectiveCamera,
    pub markers: Vec<MarkerSprite>,
    pub boundary_polylines: usize,
    pub tooltip: Option<Tooltip>,
    pub detail: Option<DetailSelection>,
}

#[derive(Debug)]
pub struct GlobeView {
    config: GlobeConfig,
    scheduler: FrameScheduler,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    viewport: Viewport,
    registry: MarkerRegistry,
    hover: HoverState,
    catalog: AnimalCatalog,
    boundaries: Vec<BoundaryGeometry>,
    hover_events: EventBus<HoverEvent>,
    events: EventBus<GlobeEvent>,
}

impl GlobeView {
    /// Builds the view and starts its frame loop.
    pub fn enter(config: GlobeConfig) -> Self {
        let camera = config.camera();
        let controls = config.orbit_controls(&camera);
        let mut view = Self {
            viewport: config.viewport(),
            registry: MarkerRegistry::new(config.marker_defaults()),
            hover: HoverState::new(config.hover_config()),
            camera,
            controls,
            config,
            scheduler: FrameScheduler::new(),
            catalog: AnimalCatalog::default(),
            boundaries: Vec::new(),
            hover_events: EventBus::new(),
            events: EventBus::new(),
        };
        view.scheduler.activate();
        info!("globe view entered");
        view
    }

    /// Stops the frame loop at its next tick. Loaded data is kept.
    pub fn hide(&mut self) {
        self.scheduler.deactivate();
    }

    /// Restarts the frame loop without reloading anything.
    pub fn show(&mut self) {
        self.scheduler.activate();
    }

    pub fn is_active(&self) -> bool {
        self.scheduler.is_active()
    }

    /// One frame: camera damping, then the hover pulse.
    pub fn tick(&mut self, dt_s: f64) -> TickOutcome {
        let controls = &mut self.controls;
        let camera = &mut self.camera;
        let hover = &self.hover;
        let registry = &mut self.registry;
        let hover_events = &mut self.hover_events;
        let events = &mut self.events;

        self.scheduler.tick(dt_s, |frame| {
            hover_events.set_frame_index(frame.index);
            events.set_frame_index(frame.index);
            controls.update(camera);
            hover.animate(frame.time, registry);
        })
    }

    pub fn resize(&mut self, width_px: f64, height_px: f64) {
        self.viewport = Viewport::new(width_px, height_px);
        self.camera.set_viewport(self.viewport);
    }

    pub fn rotate(&mut self, dx_px: f64, dy_px: f64) {
        self.controls.rotate(dx_px, dy_px, self.viewport);
    }

    pub fn zoom(&mut self, steps: f64) {
        self.controls.zoom(steps);
    }

    pub fn pointer_moved(&mut self, x_px: f64, y_px: f64) -> CursorHint {
        let pointer = PointerState::from_screen(x_px, y_px, self.viewport);
        let hit = self.hover.pointer_moved(
            pointer,
            &self.camera,
            &mut self.registry,
            &mut self.hover_events,
        );
        self.flush_hover_events();
        if hit.is_some() {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        }
    }

    /// Opens the detail for the marker under the pointer, if any.
    pub fn double_click(&mut self, x_px: f64, y_px: f64) -> Option<DetailSelection> {
        let pointer = PointerState::from_screen(x_px, y_px, self.viewport);
        let detail = self
            .hover
            .select(pointer, &self.camera, &self.registry, &mut self.hover_events)
            .cloned();
        self.flush_hover_events();
        detail
    }

    pub fn close_detail(&mut self) {
        self.hover.close_detail(&mut self.hover_events);
        self.flush_hover_events();
    }

    pub fn on_boundaries_loaded(&mut self, result: Result<BoundaryDocument, LoadError>) {
        match result {
            Ok(doc) => {
                self.boundaries = doc.project(self.config.globe_radius);
                let polylines: usize = self.boundaries.iter().map(|b| b.polylines.len()).sum();
                info!(features = doc.features.len(), polylines, "boundary outlines projected");
                self.events.emit(GlobeEvent::BoundariesReady {
                    features: doc.features.len(),
                });
            }
            Err(err) => {
                warn!(error = %err, "boundary load failed; globe shown without outlines");
                self.events.emit(GlobeEvent::LoadFailed {
                    source: DataSource::Boundaries,
                    message: err.to_string(),
                });
            }
        }
    }

    pub fn on_animals_loaded(&mut self, result: Result<Vec<AnimalRecord>, LoadError>) {
        match result {
            Ok(records) => {
                self.catalog = AnimalCatalog::new(records);
                let all = self.catalog.all().to_vec();
                self.apply_display_set(&all);
            }
            Err(err) => {
                warn!(error = %err, "animal load failed; no markers shown");
                self.events.emit(GlobeEvent::LoadFailed {
                    source: DataSource::Animals,
                    message: err.to_string(),
                });
            }
        }
    }

    /// Shows only catalog records matching `query`.
    pub fn filter(&mut self, query: &CatalogQuery) -> Vec<MarkerId> {
        let records = self.catalog.filter(query);
        debug!(search = %query.search, status = ?query.status, matches = records.len(), "filter applied");
        self.apply_display_set(&records)
    }

    pub fn show_all(&mut self) -> Vec<MarkerId> {
        let all = self.catalog.all().to_vec();
        self.apply_display_set(&all)
    }

    /// Shows the named record at its primary location and every occurrence.
    ///
    /// Returns `None`, leaving the display untouched, if no record has that name.
    pub fn expand_occurrences(&mut self, name: &str) -> Option<Vec<MarkerId>> {
        let Some(record) = self.catalog.find_by_name(name).cloned() else {
            debug!(name, "occurrence expansion skipped: unknown animal");
            return None;
        };
        let ids = self.registry.expand_occurrences(&record);
        self.after_recompute();
        Some(ids)
    }

    pub fn image_requests(&self) -> Vec<ImageRequest> {
        self.registry.image_requests()
    }

    /// Completion of one marker image fetch.
    pub fn on_image_loaded(&mut self, marker: MarkerId, result: Result<TextureHandle, ImageLoadError>) {
        match result {
            Ok(texture) => match self.registry.apply_image(marker, texture) {
                Ok(()) => self.events.emit(GlobeEvent::ImageApplied { marker }),
                Err(stale) => debug!(%stale, "image completion ignored"),
            },
            Err(err) => {
                if !self.registry.contains(marker) {
                    debug!(?marker, error = %err, "image failure for removed marker ignored");
                    return;
                }
                warn!(?marker, error = %err, "marker image failed; keeping fallback");
                self.events.emit(GlobeEvent::ImageFailed {
                    marker,
                    message: err.to_string(),
                });
            }
        }
    }

    pub fn drain_events(&mut self) -> Vec<Stamped<GlobeEvent>> {
        self.events.drain()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            frame_index: self.scheduler.current_frame().map(|f| f.index),
            camera: self.camera,
            markers: self
                .registry
                .iter()
                .map(|(marker, m)| MarkerSprite {
                    marker,
                    position: m.position(),
                    scale: m.display_scale(),
                    hovered: m.is_hovered(),
                    appearance: m.appearance().clone(),
                })
                .collect(),
            boundary_polylines: self.boundaries.iter().map(|b| b.polylines.len()).sum(),
            tooltip: self.hover.tooltip().cloned(),
            detail: self.hover.detail().cloned(),
        }
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn catalog(&self) -> &AnimalCatalog {
        &self.catalog
    }

    pub fn boundaries(&self) -> &[BoundaryGeometry] {
        &self.boundaries
    }

    fn apply_display_set(&mut self, records: &[std::sync::Arc<AnimalRecord>]) -> Vec<MarkerId> {
        let ids = self.registry.set_display_set(records);
        self.after_recompute();
        ids
    }

    /// Forced clear runs before anything else can observe the new set.
    fn after_recompute(&mut self) {
        self.hover.reconcile(&self.registry, &mut self.hover_events);
        self.flush_hover_events();
        self.events.emit(GlobeEvent::DisplaySetChanged {
            markers: self.registry.len(),
            epoch: self.registry.epoch(),
        });
    }

    fn flush_hover_events(&mut self) {
        for stamped in self.hover_events.drain() {
            self.events.emit(GlobeEvent::Hover(stamped.event));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorHint, DataSource, GlobeEvent, GlobeView};
    use crate::config::GlobeConfig;
    use crate::host::ImageLoadError;
    use formats::LoadError;
    use scene::hover::HoverEvent;
    use scene::marker::{MarkerAppearance, TextureHandle};
    use scene::record::AnimalRecord;
    use scene::MarkerId;

    fn screen_of(view: &GlobeView, id: MarkerId) -> (f64, f64) {
        let p = view.registry().get(id).expect("marker").position();
        let ndc = view.camera().project_to_ndc(p).expect("visible");
        let vp = view.viewport();
        ((ndc.x + 1.0) * 0.5 * vp.width_px, (1.0 - ndc.y) * 0.5 * vp.height_px)
    }

    fn facing_records() -> Vec<AnimalRecord> {
        let mut front = AnimalRecord::new("Front", 0.0, -90.0);
        front.img = Some("img/front.png".to_string());
        vec![front, AnimalRecord::new("Back", 0.0, 90.0)]
    }

    fn io_error() -> LoadError {
        LoadError::Io {
            path: "nowhere.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
    }

    #[test]
    fn load_failures_leave_a_working_empty_view() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_boundaries_loaded(Err(io_error()));
        view.on_animals_loaded(Err(io_error()));

        assert!(view.registry().is_empty());
        assert!(view.boundaries().is_empty());
        assert_eq!(view.pointer_moved(640.0, 360.0), CursorHint::Default);
        assert!(view.tick(0.016).should_reschedule());

        let failures: Vec<DataSource> = view
            .drain_events()
            .into_iter()
            .filter_map(|s| match s.event {
                GlobeEvent::LoadFailed { source, .. } => Some(source),
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![DataSource::Boundaries, DataSource::Animals]);
    }

    #[test]
    fn pointer_over_marker_reports_pointer_cursor() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_animals_loaded(Ok(facing_records()));
        let front = view.registry().ids()[0];

        let (x, y) = screen_of(&view, front);
        assert_eq!(view.pointer_moved(x, y), CursorHint::Pointer);
        assert_eq!(view.hover().hovered(), Some(front));

        let hovered: Vec<bool> = view
            .drain_events()
            .into_iter()
            .filter_map(|s| match s.event {
                GlobeEvent::Hover(HoverEvent::Entered { marker, .. }) => Some(marker == front),
                _ => None,
            })
            .collect();
        assert_eq!(hovered, vec![true]);
    }

    #[test]
    fn filtering_clears_stale_hover_and_detail() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_animals_loaded(Ok(facing_records()));
        let front = view.registry().ids()[0];
        let (x, y) = screen_of(&view, front);
        view.pointer_moved(x, y);
        assert!(view.double_click(x, y).is_some());

        view.filter(&scene::query::CatalogQuery::new("back", None));
        assert!(view.hover().is_idle());
        assert!(view.hover().detail().is_none());
        assert_eq!(view.registry().len(), 1);

        let snapshot = view.snapshot();
        assert!(snapshot.tooltip.is_none());
        assert!(snapshot.markers.iter().all(|m| !m.hovered));
    }

    #[test]
    fn hidden_view_stops_ticking_and_resumes_on_show() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_animals_loaded(Ok(facing_records()));
        assert!(view.tick(0.016).should_reschedule());

        view.hide();
        assert!(!view.tick(0.016).should_reschedule());

        view.show();
        assert!(view.tick(0.016).should_reschedule());
        assert_eq!(view.registry().len(), 2);
    }

    #[test]
    fn stale_and_failed_images_keep_the_fallback() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_animals_loaded(Ok(facing_records()));
        let requests = view.image_requests();
        assert_eq!(requests.len(), 1);
        let old = requests[0].marker;

        view.on_image_loaded(
            old,
            Err(ImageLoadError::Empty {
                url: "img/front.png".to_string(),
            }),
        );
        assert!(matches!(
            view.registry().get(old).map(|m| m.appearance().clone()),
            Some(MarkerAppearance::Fallback { .. })
        ));

        view.show_all();
        view.drain_events();
        view.on_image_loaded(old, Ok(TextureHandle(1)));
        assert!(view.drain_events().is_empty());

        let current = view.image_requests()[0].marker;
        view.on_image_loaded(current, Ok(TextureHandle(2)));
        assert!(matches!(
            view.registry().get(current).map(|m| m.appearance().clone()),
            Some(MarkerAppearance::Image { texture: TextureHandle(2), .. })
        ));
    }

    #[test]
    fn unknown_name_does_not_touch_the_display() {
        let mut view = GlobeView::enter(GlobeConfig::default());
        view.on_animals_loaded(Ok(facing_records()));
        let epoch = view.registry().epoch();
        assert!(view.expand_occurrences("Nobody").is_none());
        assert_eq!(view.registry().epoch(), epoch);
    }
}
