//! Color themes
//!
//! A palette is a named snapshot of material colors. The UI swaps palettes at
//! runtime (day/night); the driver reapplies them to the scene's nodes.

use serde::{Deserialize, Serialize};

/// Material colors by role, as "#rrggbb" strings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub sea: String,
    pub fog: String,
    pub enemy: String,
    pub cloud: String,
    pub plane_body: String,
    pub plane_propeller: String,
}

impl Palette {
    pub fn day() -> Self {
        Self {
            sea: "#68c3c0".into(),
            fog: "#f7d9aa".into(),
            enemy: "#f25346".into(),
            cloud: "#d8d0d1".into(),
            plane_body: "#f25346".into(),
            plane_propeller: "#59332e".into(),
        }
    }

    pub fn night() -> Self {
        Self {
            sea: "#62a8e1".into(),
            fog: "#a683d8".into(),
            enemy: "#f25346".into(),
            cloud: "#d8d0d1".into(),
            plane_body: "#f25346".into(),
            plane_propeller: "#23190f".into(),
        }
    }

    /// Parse a palette from JSON, falling back to the day palette on error
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(palette) => palette,
            Err(e) => {
                log::warn!("Invalid palette JSON ({e}), using day palette");
                Self::day()
            }
        }
    }

    pub fn sea_color(&self) -> u32 {
        parse_hex(&self.sea).unwrap_or(0xffffff)
    }

    pub fn fog_color(&self) -> u32 {
        parse_hex(&self.fog).unwrap_or(0xffffff)
    }

    pub fn enemy_color(&self) -> u32 {
        parse_hex(&self.enemy).unwrap_or(0xffffff)
    }

    pub fn cloud_color(&self) -> u32 {
        parse_hex(&self.cloud).unwrap_or(0xffffff)
    }

    pub fn plane_body_color(&self) -> u32 {
        parse_hex(&self.plane_body).unwrap_or(0xffffff)
    }

    pub fn plane_propeller_color(&self) -> u32 {
        parse_hex(&self.plane_propeller).unwrap_or(0xffffff)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::day()
    }
}

/// Parse "#rrggbb" (leading '#' optional) into packed 0xRRGGBB
pub fn parse_hex(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
