/// Typeface JSON fonts and glyph outline parsing
use nalgebra::Point2;
use nom::{
    branch::alt,
    character::complete::{char, multispace0},
    combinator::{map, value},
    multi::many0,
    number::complete::float,
    sequence::{pair, preceded, tuple},
    IResult,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::{Error, Result};

/// Glyph substituted for characters the font does not cover
pub const FALLBACK_GLYPH: char = '?';

/// One drawing command of a glyph outline, in font units
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineCommand {
    MoveTo(Point2<f32>),
    LineTo(Point2<f32>),
    QuadTo {
        ctrl: Point2<f32>,
        to: Point2<f32>,
    },
    CubicTo {
        ctrl1: Point2<f32>,
        ctrl2: Point2<f32>,
        to: Point2<f32>,
    },
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in font units
    pub advance: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub outline: Vec<OutlineCommand>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontBounds {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

/// A parsed typeface. Immutable once loaded and shared between rebuilds.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family_name: String,
    /// Font units per em
    pub resolution: f32,
    pub bounding_box: FontBounds,
    pub underline_thickness: f32,
    pub ascender: f32,
    pub descender: f32,
    glyphs: HashMap<char, Glyph>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypefaceJson {
    glyphs: HashMap<String, GlyphJson>,
    #[serde(default)]
    family_name: String,
    resolution: f32,
    bounding_box: FontBounds,
    #[serde(default)]
    underline_thickness: f32,
    #[serde(default)]
    ascender: f32,
    #[serde(default)]
    descender: f32,
}

#[derive(Deserialize)]
struct GlyphJson {
    ha: f32,
    #[serde(default)]
    x_min: f32,
    #[serde(default)]
    x_max: f32,
    #[serde(default)]
    o: Option<String>,
}

impl Font {
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: TypefaceJson = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let raw: TypefaceJson = serde_json::from_slice(bytes)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: TypefaceJson) -> Result<Self> {
        if !(raw.resolution > 0.0) {
            return Err(Error::InvalidParameter {
                name: "resolution",
                reason: format!("font resolution must be positive, got {}", raw.resolution),
            });
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, glyph) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                tracing::warn!(key = %key, "skipping glyph with multi-character key");
                continue;
            };
            let outline = match glyph.o.as_deref() {
                Some(source) => parse_outline(source).map_err(|reason| Error::Outline { glyph: ch, reason })?,
                None => Vec::new(),
            };
            glyphs.insert(
                ch,
                Glyph {
                    advance: glyph.ha,
                    x_min: glyph.x_min,
                    x_max: glyph.x_max,
                    outline,
                },
            );
        }

        tracing::info!(
            family = %raw.family_name,
            glyphs = glyphs.len(),
            "font loaded"
        );

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            bounding_box: raw.bounding_box,
            underline_thickness: raw.underline_thickness,
            ascender: raw.ascender,
            descender: raw.descender,
            glyphs,
        })
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// The glyph for `ch`, or the fallback glyph when it is not covered
    pub fn glyph_or_fallback(&self, ch: char) -> Option<&Glyph> {
        self.glyphs
            .get(&ch)
            .or_else(|| self.glyphs.get(&FALLBACK_GLYPH))
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

/// Parse a typeface outline string. Curve commands list the end point
/// before their control points: `q x y cx cy`, `b x y c1x c1y c2x c2y`.
pub fn parse_outline(input: &str) -> std::result::Result<Vec<OutlineCommand>, String> {
    let (rest, commands) = many0(parse_command)(input).map_err(|e| format!("{e:?}"))?;
    let rest = rest.trim_start();
    if !rest.is_empty() {
        let near: String = rest.chars().take(16).collect();
        return Err(format!("unexpected input near {near:?}"));
    }
    Ok(commands)
}

fn parse_command(input: &str) -> IResult<&str, OutlineCommand> {
    preceded(
        multispace0,
        alt((
            map(preceded(char('m'), parse_point), OutlineCommand::MoveTo),
            map(preceded(char('l'), parse_point), OutlineCommand::LineTo),
            map(preceded(char('q'), pair(parse_point, parse_point)), |(to, ctrl)| {
                OutlineCommand::QuadTo { ctrl, to }
            }),
            map(
                preceded(char('b'), tuple((parse_point, parse_point, parse_point))),
                |(to, ctrl1, ctrl2)| OutlineCommand::CubicTo { ctrl1, ctrl2, to },
            ),
            value(OutlineCommand::Close, char('z')),
        )),
    )(input)
}

fn parse_point(input: &str) -> IResult<&str, Point2<f32>> {
    let (input, x) = preceded(multispace0, float)(input)?;
    let (input, y) = preceded(multispace0, float)(input)?;
    Ok((input, Point2::new(x, y)))
}
