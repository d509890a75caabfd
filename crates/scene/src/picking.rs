use foundation::math::precision::stable_total_cmp_f64;
use foundation::math::{Vec2, Vec3};

use crate::camera::{CameraBasis, PerspectiveCamera};
use crate::entity::MarkerId;
use crate::registry::MarkerRegistry;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub marker: MarkerId,
    /// Ray parameter along the normalized ray.
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
        }
    }
}

/// Marker under a pointer given in NDC, as seen through `camera`.
pub fn pick(pointer_ndc: Vec2, camera: &PerspectiveCamera, markers: &MarkerRegistry) -> Option<PickHit> {
    let ray = camera.ray_from_ndc(pointer_ndc)?;
    let basis = camera.basis()?;
    pick_ray(markers, ray, basis, PickOptions::default())
}

/// Deterministic ray picking against camera-facing marker billboards.
///
/// Ordering contract:
/// - The hit with the smallest ray parameter wins.
/// - Exact ties go to the lower `MarkerId::index()`.
///
/// Notes:
/// - Footprints use each marker's hit-test scale, which includes the discrete
///   hover enlargement but never the per-frame pulse.
/// - Linear scan; fine for low thousands of markers. A spatial index would
///   have to keep the same nearest-along-ray result.
pub fn pick_ray(
    markers: &MarkerRegistry,
    ray: Ray,
    billboard: CameraBasis,
    opts: PickOptions,
) -> Option<PickHit> {
    let dir = ray.dir.normalized()?;
    let ray = Ray::new(ray.origin, dir);

    let mut best: Option<(f64, MarkerId)> = None;

    for (id, marker) in markers.iter() {
        let Some(t) = ray_billboard_hit_t(ray, marker.position(), marker.hit_scale(), billboard)
        else {
            continue;
        };
        if t > opts.max_distance {
            continue;
        }

        best = match best {
            None => Some((t, id)),
            Some((bt, bid)) => {
                let ord = stable_total_cmp_f64(t, bt).then_with(|| id.index().cmp(&bid.index()));
                if ord.is_lt() {
                    Some((t, id))
                } else {
                    Some((bt, bid))
                }
            }
        };
    }

    let (t, marker) = best?;
    Some(PickHit {
        marker,
        distance: t,
        point: ray.at(t),
    })
}

/// Intersects a square quad of side `size`, centred on `center` and lying in
/// the camera's right/up plane. Returns the ray parameter of the hit.
pub fn ray_billboard_hit_t(ray: Ray, center: Vec3, size: f64, billboard: CameraBasis) -> Option<f64> {
    if size <= 0.0 {
        return None;
    }

    let normal = billboard.forward;
    let denom = ray.dir.dot(normal);
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = (center - ray.origin).dot(normal) / denom;
    if t < 0.0 || !t.is_finite() {
        return None;
    }

    let offset = ray.at(t) - center;
    let half = size * 0.5;
    if offset.dot(billboard.right).abs() > half || offset.dot(billboard.up).abs() > half {
        return None;
    }

    Some(t)
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick, pick_ray, ray_billboard_hit_t};
    use crate::camera::{CameraBasis, PerspectiveCamera};
    use crate::registry::{MarkerDefaults, MarkerRegistry};
    use crate::record::AnimalRecord;
    use foundation::math::{Vec2, Vec3};
    use std::sync::Arc;

    fn looking_down_negative_z() -> CameraBasis {
        CameraBasis {
            forward: Vec3::new(0.0, 0.0, -1.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }

    fn registry_with_points(points: &[Vec3], scale: f64) -> MarkerRegistry {
        let mut reg = MarkerRegistry::new(MarkerDefaults {
            display_radius: 1.0,
            base_scale: scale,
        });
        let records: Vec<Arc<AnimalRecord>> = (0..points.len())
            .map(|i| Arc::new(AnimalRecord::new(format!("m{i}"), 10.0, 10.0)))
            .collect();
        reg.set_display_set_at(&records, points);
        reg
    }

    #[test]
    fn nearest_billboard_along_ray_wins() {
        // Far marker is registered first so slot order cannot decide.
        let reg = registry_with_points(&[Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, -3.0)], 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));

        let hit = pick_ray(&reg, ray, looking_down_negative_z(), PickOptions::default()).expect("hit");
        let near_id = reg.iter().nth(1).map(|(id, _)| id).expect("id");
        assert_eq!(hit.marker, near_id);
        assert!((hit.distance - 3.0).abs() < 1e-12);
        assert_eq!(hit.point, Vec3::new(0.0, 0.0, -3.0));
    }

    #[test]
    fn exact_ties_go_to_lower_slot() {
        let p = Vec3::new(0.0, 0.0, -4.0);
        let reg = registry_with_points(&[p, p], 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0));
        let hit = pick_ray(&reg, ray, looking_down_negative_z(), PickOptions::default()).expect("hit");
        assert_eq!(hit.marker.index(), 0);
    }

    #[test]
    fn footprint_edges_and_misses() {
        let basis = looking_down_negative_z();
        let ray = Ray::new(Vec3::new(0.49, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_billboard_hit_t(ray, Vec3::new(0.0, 0.0, -2.0), 1.0, basis).is_some());

        let ray = Ray::new(Vec3::new(0.51, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_billboard_hit_t(ray, Vec3::new(0.0, 0.0, -2.0), 1.0, basis).is_none());

        // Behind the origin.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!(ray_billboard_hit_t(ray, Vec3::new(0.0, 0.0, 2.0), 1.0, basis).is_none());

        // Parallel to the quad.
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        assert!(ray_billboard_hit_t(ray, Vec3::new(3.0, 0.0, 0.0), 1.0, basis).is_none());
    }

    #[test]
    fn max_distance_limits_hits() {
        let reg = registry_with_points(&[Vec3::new(0.0, 0.0, -10.0)], 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let opts = PickOptions { max_distance: 5.0 };
        assert!(pick_ray(&reg, ray, looking_down_negative_z(), opts).is_none());
    }

    #[test]
    fn screen_pick_through_default_camera() {
        let reg = registry_with_points(&[Vec3::new(0.0, 0.0, 2.1)], 0.4);
        let cam = PerspectiveCamera::default();

        let hit = pick(Vec2::new(0.0, 0.0), &cam, &reg).expect("center hit");
        assert!((hit.distance - 2.9).abs() < 1e-9);
        assert!(pick(Vec2::new(0.5, 0.5), &cam, &reg).is_none());
    }
}
