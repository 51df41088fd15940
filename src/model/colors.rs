//! Color preferences for flight bars.
//!
//! Colors are a plain value handed to the renderer. Loading and saving go
//! through [`ColorStore`] so nothing in the timeline depends on where the
//! preferences live. On disk colors are `#RRGGBB` strings so users can edit
//! the file by hand.

use std::collections::BTreeMap;
use std::path::PathBuf;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Flight, FlightPositioning, FlightStatus, FlightType};

pub mod hex_color {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_color(&s).map_err(serde::de::Error::custom)
    }

    pub fn to_hex(color: Color32) -> String {
        format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, String> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid hex color '{}': expected 6 hex digits", s));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Serde helper for maps of enum key → hex color.
mod hex_color_map {
    use std::collections::BTreeMap;

    use egui::Color32;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::hex_color;

    pub fn serialize<K, S>(map: &BTreeMap<K, Color32>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        S: Serializer,
    {
        let as_hex: BTreeMap<&K, String> =
            map.iter().map(|(k, c)| (k, hex_color::to_hex(*c))).collect();
        as_hex.serialize(serializer)
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, Color32>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let raw: BTreeMap<K, String> = BTreeMap::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, s)| {
                hex_color::parse_hex_color(&s)
                    .map(|c| (k, c))
                    .map_err(serde::de::Error::custom)
            })
            .collect()
    }
}

/// Which flight attribute picks the bar color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorBy {
    #[default]
    Status,
    FlightType,
    Positioning,
}

impl ColorBy {
    pub fn all() -> &'static [ColorBy] {
        &[ColorBy::Status, ColorBy::FlightType, ColorBy::Positioning]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColorBy::Status => "Status",
            ColorBy::FlightType => "Flight type",
            ColorBy::Positioning => "Positioning",
        }
    }
}

const FALLBACK: Color32 = Color32::from_rgb(59, 130, 246);

/// Display colors keyed by status, flight type and positioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    #[serde(with = "hex_color_map")]
    pub flight_types: BTreeMap<FlightType, Color32>,
    #[serde(with = "hex_color_map")]
    pub statuses: BTreeMap<FlightStatus, Color32>,
    #[serde(with = "hex_color_map")]
    pub positioning: BTreeMap<FlightPositioning, Color32>,
}

impl Default for ColorSettings {
    fn default() -> Self {
        let flight_types = BTreeMap::from([
            (FlightType::Charter, Color32::from_rgb(0x8b, 0x5c, 0xf6)),
            (FlightType::Schedule, Color32::from_rgb(0x3b, 0x82, 0xf6)),
            (FlightType::Acmi, Color32::from_rgb(0xf9, 0x73, 0x16)),
            (FlightType::Maintenance, Color32::from_rgb(0xea, 0xb3, 0x08)),
            (FlightType::Adhoc, Color32::from_rgb(0x14, 0xb8, 0xa6)),
        ]);
        let statuses = BTreeMap::from([
            (FlightStatus::Operational, Color32::from_rgb(0x22, 0xc5, 0x5e)),
            (FlightStatus::Aog, Color32::from_rgb(0xef, 0x44, 0x44)),
            (FlightStatus::Maintenance, Color32::from_rgb(0xea, 0xb3, 0x08)),
            (FlightStatus::Cancelled, Color32::from_rgb(0x6b, 0x72, 0x80)),
        ]);
        let positioning = BTreeMap::from([
            (FlightPositioning::LiveFlight, Color32::from_rgb(0x3b, 0x82, 0xf6)),
            (FlightPositioning::FerryFlight, Color32::from_rgb(0xf9, 0x73, 0x16)),
            (FlightPositioning::SpareFlight, Color32::from_rgb(0xa8, 0x55, 0xf7)),
        ]);
        Self {
            flight_types,
            statuses,
            positioning,
        }
    }
}

impl ColorSettings {
    pub fn status(&self, status: FlightStatus) -> Color32 {
        self.statuses.get(&status).copied().unwrap_or(FALLBACK)
    }

    pub fn flight_type(&self, flight_type: FlightType) -> Color32 {
        self.flight_types.get(&flight_type).copied().unwrap_or(FALLBACK)
    }

    pub fn positioning(&self, positioning: FlightPositioning) -> Color32 {
        self.positioning.get(&positioning).copied().unwrap_or(FALLBACK)
    }

    /// Bar color for `flight` under the chosen scheme.
    pub fn color_for(&self, flight: &Flight, by: ColorBy) -> Color32 {
        match by {
            ColorBy::Status => self.status(flight.status),
            ColorBy::FlightType => self.flight_type(flight.flight_type),
            ColorBy::Positioning => self.positioning(flight.flight_positioning),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Load/save port for color preferences.
pub trait ColorStore {
    fn load(&self) -> Result<ColorSettings>;
    fn save(&self, colors: &ColorSettings) -> Result<()>;
}

/// Keeps color preferences in a JSON file.
pub struct JsonColorStore {
    path: PathBuf,
}

impl JsonColorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ColorStore for JsonColorStore {
    /// A missing file yields the defaults.
    fn load(&self) -> Result<ColorSettings> {
        if !self.path.exists() {
            return Ok(ColorSettings::default());
        }
        let json = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn save(&self, colors: &ColorSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(colors)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
