use std::fs;
use std::path::{Path, PathBuf};

use foundation::math::Vec3;
use scene::camera::{OrbitControls, PerspectiveCamera, Viewport};
use scene::hover::HoverConfig;
use scene::registry::MarkerDefaults;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f64; 3],
    pub fov_y_deg: f64,
    pub near: f64,
    pub far: f64,
    pub damping: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 0.0, 5.0],
            fov_y_deg: 75.0,
            near: 1.0,
            far: 100.0,
            damping: 0.05,
            min_distance: 2.5,
            max_distance: 20.0,
        }
    }
}

/// Scene constants for one globe view. Every field is optional in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    /// Radius boundary outlines are projected onto.
    pub globe_radius: f64,
    /// Radius markers sit on.
    pub marker_radius: f64,
    pub marker_base_scale: f64,
    pub hover_factor: f64,
    pub pulse_amplitude: f64,
    pub pulse_rate: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Headless frame loop rate.
    pub frame_rate_hz: f64,
    pub camera: CameraConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            globe_radius: 2.0,
            marker_radius: 2.1,
            marker_base_scale: 0.4,
            hover_factor: 1.5,
            pulse_amplitude: 0.1,
            pulse_rate: 3.0,
            viewport_width: 1280.0,
            viewport_height: 720.0,
            frame_rate_hz: 60.0,
            camera: CameraConfig::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid {
        field: &'static str,
        reason: String,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Invalid { field, reason } => write!(f, "invalid {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("expected a positive number, got {value}"),
        })
    }
}

impl GlobeConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(payload).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("globe_radius", self.globe_radius)?;
        positive("marker_radius", self.marker_radius)?;
        positive("marker_base_scale", self.marker_base_scale)?;
        positive("hover_factor", self.hover_factor)?;
        positive("viewport_width", self.viewport_width)?;
        positive("viewport_height", self.viewport_height)?;
        positive("frame_rate_hz", self.frame_rate_hz)?;
        positive("camera.fov_y_deg", self.camera.fov_y_deg)?;
        if self.camera.fov_y_deg >= 180.0 {
            return Err(ConfigError::Invalid {
                field: "camera.fov_y_deg",
                reason: "must be below 180".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.camera.damping) {
            return Err(ConfigError::Invalid {
                field: "camera.damping",
                reason: format!("expected 0..=1, got {}", self.camera.damping),
            });
        }
        if self.camera.min_distance > self.camera.max_distance {
            return Err(ConfigError::Invalid {
                field: "camera.min_distance",
                reason: "exceeds camera.max_distance".to_string(),
            });
        }
        Ok(())
    }

    pub fn marker_defaults(&self) -> MarkerDefaults {
        MarkerDefaults {
            display_radius: self.marker_radius,
            base_scale: self.marker_base_scale,
        }
    }

    pub fn hover_config(&self) -> HoverConfig {
        HoverConfig {
            hover_factor: self.hover_factor,
            pulse_amplitude: self.pulse_amplitude,
            pulse_rate: self.pulse_rate,
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    pub fn camera(&self) -> PerspectiveCamera {
        let [x, y, z] = self.camera.eye;
        let mut camera = PerspectiveCamera {
            eye: Vec3::new(x, y, z),
            fov_y_deg: self.camera.fov_y_deg,
            near: self.camera.near,
            far: self.camera.far,
            ..PerspectiveCamera::default()
        };
        camera.set_viewport(self.viewport());
        camera
    }

    pub fn orbit_controls(&self, camera: &PerspectiveCamera) -> OrbitControls {
        let mut controls = OrbitControls::from_camera(camera);
        controls.damping = self.camera.damping;
        controls.min_distance = self.camera.min_distance;
        controls.max_distance = self.camera.max_distance;
        controls
    }

    pub fn frame_interval_s(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }
}
