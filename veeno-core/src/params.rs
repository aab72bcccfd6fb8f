/// Text geometry parameters edited by the debug panel
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::extrude::ExtrudeOptions;

pub const SIZE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const DEPTH_RANGE: RangeInclusive<f32> = 0.1..=10.0;
pub const CURVE_SEGMENTS_RANGE: RangeInclusive<u32> = 1..=20;
pub const BEVEL_THICKNESS_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const BEVEL_SIZE_RANGE: RangeInclusive<f32> = 0.01..=1.0;
pub const BEVEL_OFFSET_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const BEVEL_SEGMENTS_RANGE: RangeInclusive<u32> = 1..=20;

/// Editable fields of [`TextParams`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Text,
    Size,
    Depth,
    CurveSegments,
    BevelEnabled,
    BevelThickness,
    BevelSize,
    BevelOffset,
    BevelSegments,
}

impl TextField {
    pub const ALL: [TextField; 9] = [
        TextField::Text,
        TextField::Size,
        TextField::Depth,
        TextField::CurveSegments,
        TextField::BevelEnabled,
        TextField::BevelThickness,
        TextField::BevelSize,
        TextField::BevelOffset,
        TextField::BevelSegments,
    ];

    /// Name shown in the panel
    pub fn label(self) -> &'static str {
        match self {
            TextField::Text => "text",
            TextField::Size => "size",
            TextField::Depth => "depth",
            TextField::CurveSegments => "curveSegments",
            TextField::BevelEnabled => "bevelEnabled",
            TextField::BevelThickness => "bevelThickness",
            TextField::BevelSize => "bevelSize",
            TextField::BevelOffset => "bevelOffset",
            TextField::BevelSegments => "bevelSegments",
        }
    }

    /// Numeric range for slider fields
    pub fn range(self) -> Option<RangeInclusive<f32>> {
        let int_range = |r: RangeInclusive<u32>| *r.start() as f32..=*r.end() as f32;
        match self {
            TextField::Text | TextField::BevelEnabled => None,
            TextField::Size => Some(SIZE_RANGE),
            TextField::Depth => Some(DEPTH_RANGE),
            TextField::CurveSegments => Some(int_range(CURVE_SEGMENTS_RANGE)),
            TextField::BevelThickness => Some(BEVEL_THICKNESS_RANGE),
            TextField::BevelSize => Some(BEVEL_SIZE_RANGE),
            TextField::BevelOffset => Some(BEVEL_OFFSET_RANGE),
            TextField::BevelSegments => Some(int_range(BEVEL_SEGMENTS_RANGE)),
        }
    }

    pub fn step(self) -> f32 {
        match self {
            TextField::CurveSegments | TextField::BevelSegments => 1.0,
            _ => 0.01,
        }
    }
}

/// Parameters of the extruded text mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TextParams {
    pub text: String,
    pub size: f32,
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_offset: f32,
    pub bevel_segments: u32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            text: "veeno".to_string(),
            size: 0.5,
            depth: 0.2,
            curve_segments: 5,
            bevel_enabled: true,
            bevel_thickness: 0.03,
            bevel_size: 0.02,
            bevel_offset: 0.0,
            bevel_segments: 4,
        }
    }
}

fn check_f32(name: &'static str, value: f32, range: RangeInclusive<f32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("{value} outside {}..={}", range.start(), range.end()),
        })
    }
}

fn check_u32(name: &'static str, value: u32, range: RangeInclusive<u32>) -> Result<()> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            reason: format!("{value} outside {}..={}", range.start(), range.end()),
        })
    }
}

/// Clamp into `range` and snap to the nearest multiple of `step` from its start
pub fn snap(value: f32, range: &RangeInclusive<f32>, step: f32) -> f32 {
    let clamped = value.clamp(*range.start(), *range.end());
    if step <= 0.0 {
        return clamped;
    }
    let steps = ((clamped - range.start()) / step).round();
    (range.start() + steps * step).clamp(*range.start(), *range.end())
}

impl TextParams {
    /// Reject records outside the documented ranges
    pub fn validate(&self) -> Result<()> {
        check_f32("size", self.size, SIZE_RANGE)?;
        check_f32("depth", self.depth, DEPTH_RANGE)?;
        check_u32("curveSegments", self.curve_segments, CURVE_SEGMENTS_RANGE)?;
        check_f32("bevelThickness", self.bevel_thickness, BEVEL_THICKNESS_RANGE)?;
        check_f32("bevelSize", self.bevel_size, BEVEL_SIZE_RANGE)?;
        check_f32("bevelOffset", self.bevel_offset, BEVEL_OFFSET_RANGE)?;
        check_u32("bevelSegments", self.bevel_segments, BEVEL_SEGMENTS_RANGE)?;
        Ok(())
    }

    /// Current value of a numeric field
    pub fn number(&self, field: TextField) -> Option<f32> {
        match field {
            TextField::Text | TextField::BevelEnabled => None,
            TextField::Size => Some(self.size),
            TextField::Depth => Some(self.depth),
            TextField::CurveSegments => Some(self.curve_segments as f32),
            TextField::BevelThickness => Some(self.bevel_thickness),
            TextField::BevelSize => Some(self.bevel_size),
            TextField::BevelOffset => Some(self.bevel_offset),
            TextField::BevelSegments => Some(self.bevel_segments as f32),
        }
    }

    /// Set a numeric field, clamped and snapped to its control step.
    /// Returns whether the stored value changed.
    pub fn set_number(&mut self, field: TextField, value: f32) -> Result<bool> {
        let range = field.range().ok_or(Error::InvalidParameter {
            name: field.label(),
            reason: "not a numeric field".to_string(),
        })?;
        if !value.is_finite() {
            return Err(Error::InvalidParameter {
                name: field.label(),
                reason: format!("{value} is not finite"),
            });
        }
        let value = snap(value, &range, field.step());

        let slot_f32 = |slot: &mut f32| {
            let changed = *slot != value;
            *slot = value;
            changed
        };
        let slot_u32 = |slot: &mut u32| {
            let value = value as u32;
            let changed = *slot != value;
            *slot = value;
            changed
        };

        Ok(match field {
            TextField::Size => slot_f32(&mut self.size),
            TextField::Depth => slot_f32(&mut self.depth),
            TextField::BevelThickness => slot_f32(&mut self.bevel_thickness),
            TextField::BevelSize => slot_f32(&mut self.bevel_size),
            TextField::BevelOffset => slot_f32(&mut self.bevel_offset),
            TextField::CurveSegments => slot_u32(&mut self.curve_segments),
            TextField::BevelSegments => slot_u32(&mut self.bevel_segments),
            TextField::Text | TextField::BevelEnabled => unreachable!("filtered by range()"),
        })
    }

    pub fn set_text(&mut self, text: &str) -> bool {
        if self.text == text {
            return false;
        }
        self.text = text.to_string();
        true
    }

    pub fn set_bevel_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.bevel_enabled != enabled;
        self.bevel_enabled = enabled;
        changed
    }

    /// Extrusion settings derived from these parameters
    pub fn extrude_options(&self) -> ExtrudeOptions {
        ExtrudeOptions {
            depth: self.depth,
            curve_segments: self.curve_segments,
            bevel_enabled: self.bevel_enabled,
            bevel_thickness: self.bevel_thickness,
            bevel_size: self.bevel_size,
            bevel_offset: self.bevel_offset,
            bevel_segments: self.bevel_segments,
        }
    }
}
