use foundation::math::{Vec2, Vec3};

use crate::picking::Ray;

/// Drawable surface size in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width_px: f64,
    pub height_px: f64,
}

impl Viewport {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px: width_px.max(1.0),
            height_px: height_px.max(1.0),
        }
    }

    pub fn aspect(&self) -> f64 {
        self.width_px / self.height_px
    }
}

/// Pointer position in both screen pixels and normalized device coordinates.
///
/// NDC spans `[-1, 1]` on both axes with `+y` up; screen pixels have `+y` down.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerState {
    pub screen_px: Vec2,
    pub ndc: Vec2,
}

impl PointerState {
    pub fn from_screen(x_px: f64, y_px: f64, viewport: Viewport) -> Self {
        let ndc = Vec2::new(
            (x_px / viewport.width_px) * 2.0 - 1.0,
            -(y_px / viewport.height_px) * 2.0 + 1.0,
        );
        Self {
            screen_px: Vec2::new(x_px, y_px),
            ndc,
        }
    }

    /// Pointer given directly in NDC; the screen position is derived.
    pub fn from_ndc(ndc: Vec2, viewport: Viewport) -> Self {
        let screen_px = Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.width_px,
            (1.0 - ndc.y) * 0.5 * viewport.height_px,
        );
        Self { screen_px, ndc }
    }
}

/// Orthonormal camera frame. Billboards are aligned to `right`/`up`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBasis {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: 75.0,
            aspect: 1.0,
            near: 1.0,
            far: 100.0,
        }
    }
}

impl PerspectiveCamera {
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.aspect = viewport.aspect();
    }

    /// Right-handed look-at frame; falls back to `+Z` as up when looking
    /// straight along the configured up vector.
    pub fn basis(&self) -> Option<CameraBasis> {
        let forward = (self.target - self.eye).normalized()?;
        let right = forward
            .cross(self.up)
            .normalized()
            .or_else(|| forward.cross(Vec3::new(0.0, 0.0, 1.0)).normalized())?;
        let up = right.cross(forward);
        Some(CameraBasis { forward, right, up })
    }

    /// Ray from the eye through a point given in NDC.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let basis = self.basis()?;
        let half_h = (self.fov_y_deg.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect;
        let dir = basis.forward + basis.right * (ndc.x * half_w) + basis.up * (ndc.y * half_h);
        Some(Ray::new(self.eye, dir.normalized()?))
    }

    /// NDC of a world point, or `None` if it is behind the eye.
    pub fn project_to_ndc(&self, point: Vec3) -> Option<Vec2> {
        let basis = self.basis()?;
        let d = point - self.eye;
        let depth = d.dot(basis.forward);
        if depth <= 0.0 {
            return None;
        }
        let half_h = (self.fov_y_deg.to_radians() * 0.5).tan();
        let half_w = half_h * self.aspect;
        Some(Vec2::new(
            d.dot(basis.right) / (depth * half_w),
            d.dot(basis.up) / (depth * half_h),
        ))
    }
}

/// Damped orbit controls around a fixed target.
///
/// Input accumulates a pending delta; every [`OrbitControls::update`] applies a
/// `damping` fraction of it and decays the rest, so motion eases out over the
/// following frames.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Angle around `+Y`, 0 looks from `+Z`.
    pub yaw_rad: f64,
    /// Elevation above the equator plane.
    pub pitch_rad: f64,
    pub distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub damping: f64,
    pub rotate_speed: f64,
    pending_yaw: f64,
    pending_pitch: f64,
    pending_zoom: f64,
}

const PITCH_LIMIT: f64 = core::f64::consts::FRAC_PI_2 - 1e-3;
const SETTLE_EPS: f64 = 1e-6;

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            yaw_rad: 0.0,
            pitch_rad: 0.0,
            distance: 5.0,
            min_distance: 2.5,
            max_distance: 20.0,
            damping: 0.05,
            rotate_speed: 1.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,
        }
    }
}

impl OrbitControls {
    /// Controls that reproduce the current eye position of `camera`.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let offset = camera.eye - camera.target;
        let distance = offset.length();
        let mut controls = Self::default();
        if distance > 0.0 {
            controls.distance = distance;
            controls.pitch_rad = (offset.y / distance).clamp(-1.0, 1.0).asin();
            controls.yaw_rad = offset.x.atan2(offset.z);
        }
        controls
    }

    /// Drag by a pixel delta; a full viewport height of drag is one full turn.
    pub fn rotate(&mut self, dx_px: f64, dy_px: f64, viewport: Viewport) {
        let k = core::f64::consts::TAU / viewport.height_px * self.rotate_speed;
        self.pending_yaw -= dx_px * k;
        self.pending_pitch += dy_px * k;
    }

    /// Positive steps zoom in, negative zoom out (log-scale).
    pub fn zoom(&mut self, steps: f64) {
        self.pending_zoom -= steps * 0.1;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < SETTLE_EPS
            && self.pending_pitch.abs() < SETTLE_EPS
            && self.pending_zoom.abs() < SETTLE_EPS
    }

    /// Applies one damped step and writes the eye into `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let k = self.damping.clamp(0.0, 1.0);

        self.yaw_rad += self.pending_yaw * k;
        self.pitch_rad = (self.pitch_rad + self.pending_pitch * k).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.distance = (self.distance * (self.pending_zoom * k).exp())
            .clamp(self.min_distance, self.max_distance);

        self.pending_yaw *= 1.0 - k;
        self.pending_pitch *= 1.0 - k;
        self.pending_zoom *= 1.0 - k;
        if self.is_settled() {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            self.pending_zoom = 0.0;
        }

        let (sin_p, cos_p) = self.pitch_rad.sin_cos();
        let (sin_y, cos_y) = self.yaw_rad.sin_cos();
        let dir = Vec3::new(cos_p * sin_y, sin_p, cos_p * cos_y);
        camera.eye = camera.target + dir * self.distance;
    }
}

#[cfg(test)]
mod tests {
    use super::{OrbitControls, PerspectiveCamera, PointerState, Viewport};
    use foundation::math::{Vec2, Vec3};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn pointer_maps_corners_to_ndc() {
        let vp = Viewport::new(800.0, 600.0);
        let tl = PointerState::from_screen(0.0, 0.0, vp);
        assert_eq!(tl.ndc, Vec2::new(-1.0, 1.0));
        let c = PointerState::from_screen(400.0, 300.0, vp);
        assert_eq!(c.ndc, Vec2::new(0.0, 0.0));

        let back = PointerState::from_ndc(Vec2::new(0.5, -0.5), vp);
        assert_eq!(back.screen_px, Vec2::new(600.0, 450.0));
    }

    #[test]
    fn center_ray_points_at_target() {
        let cam = PerspectiveCamera::default();
        let ray = cam.ray_from_ndc(Vec2::new(0.0, 0.0)).expect("ray");
        assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 5.0));
        assert_close(ray.dir.z, -1.0, 1e-12);
    }

    #[test]
    fn projection_inverts_ray_casting() {
        let mut cam = PerspectiveCamera::default();
        cam.set_viewport(Viewport::new(1600.0, 900.0));
        let ndc = Vec2::new(0.3, -0.4);
        let ray = cam.ray_from_ndc(ndc).expect("ray");
        let p = ray.at(7.0);
        let back = cam.project_to_ndc(p).expect("in front");
        assert_close(back.x, ndc.x, 1e-9);
        assert_close(back.y, ndc.y, 1e-9);
        assert!(cam.project_to_ndc(Vec3::new(0.0, 0.0, 9.0)).is_none());
    }

    #[test]
    fn looking_straight_down_still_has_a_basis() {
        let cam = PerspectiveCamera {
            eye: Vec3::new(0.0, 5.0, 0.0),
            ..PerspectiveCamera::default()
        };
        let basis = cam.basis().expect("basis");
        assert_close(basis.right.length(), 1.0, 1e-12);
        assert_close(basis.up.length(), 1.0, 1e-12);
    }

    #[test]
    fn orbit_controls_start_at_camera_eye() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.update(&mut cam);
        assert_close(cam.eye.z, 5.0, 1e-12);
        assert_close(cam.eye.x, 0.0, 1e-12);
    }

    #[test]
    fn damped_rotation_eases_out() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.rotate(-100.0, 0.0, Viewport::new(800.0, 800.0));

        controls.update(&mut cam);
        let first = controls.yaw_rad;
        controls.update(&mut cam);
        let second = controls.yaw_rad - first;
        assert!(first > 0.0);
        assert!(second > 0.0 && second < first);

        for _ in 0..2000 {
            controls.update(&mut cam);
        }
        assert!(controls.is_settled());
        assert_close(controls.yaw_rad, core::f64::consts::TAU / 8.0, 1e-4);
        assert_close(cam.eye.length(), 5.0, 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.zoom(1000.0);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert_close(controls.distance, controls.min_distance, 1e-12);
    }
}
