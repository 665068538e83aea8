use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A drifting circular hazard. Damage falls off linearly from the center to
/// the rim and is reduced by the victim's defense trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub pos: Vec2,
    pub radius: f64,
    pub vel: Vec2,
}

/// Runtime switches shared with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldFlags {
    pub predation: bool,
    pub zones: bool,
    /// Emits per-tick debug summaries; renderers may also use it for overlays.
    pub debug: bool,
}

impl Default for WorldFlags {
    fn default() -> Self {
        Self {
            predation: true,
            zones: true,
            debug: false,
        }
    }
}

/// Viewport owned by the engine so it survives save/load. The core never
/// reads it; drag and pinch translation live in the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// World-level state persisted in the `world` section of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WorldSettings {
    /// Edge length of the square toroidal world.
    pub size: f64,
    /// Behavior sub-steps per tick.
    pub sim_speed: u32,
    pub flags: WorldFlags,
    pub camera: Camera,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            size: 3000.0,
            sim_speed: 1,
            flags: WorldFlags::default(),
            camera: Camera {
                x: 1500.0,
                y: 1500.0,
                zoom: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_settings_use_document_key_names() {
        let json = serde_json::to_value(WorldSettings::default()).unwrap();
        assert!(json.get("simSpeed").is_some());
        assert_eq!(json["flags"]["predation"], true);
        assert_eq!(json["camera"]["zoom"], 1.0);
    }

    #[test]
    fn test_zone_serializes_pos_and_vel_objects() {
        let zone = Zone {
            pos: Vec2::new(10.0, 20.0),
            radius: 5.0,
            vel: Vec2::new(-0.1, 0.2),
        };
        let json = serde_json::to_value(zone).unwrap();
        assert_eq!(json["pos"]["x"], 10.0);
        assert_eq!(json["vel"]["y"], 0.2);
        let back: Zone = serde_json::from_value(json).unwrap();
        assert_eq!(back, zone);
    }
}
