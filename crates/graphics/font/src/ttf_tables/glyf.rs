//! [Glyf](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html) table implementation.

use crate::{
    outline::Point,
    stream::{f2dot14_to_f32, read_i16_at, Stream, UnexpectedEof},
    ttf::GlyphDecodeError,
};
use math::{AffineTransform, Vec2D};
use std::iter;

use super::cmap::GlyphID;

/// The bounding box that precedes every glyph description
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlyphHeader {
    pub num_contours: i16,
    pub min_x: i16,
    pub min_y: i16,
    pub max_x: i16,
    pub max_y: i16,
}

#[derive(Clone, Copy, Debug)]
pub enum Glyph<'a> {
    Simple(SimpleGlyph<'a>),
    Compound(CompoundGlyph<'a>),
}

impl<'a> Glyph<'a> {
    /// Parse the glyph description at the start of `data`.
    ///
    /// The kind of glyph is selected by the sign of the contour count.
    pub fn new(data: &'a [u8]) -> Result<(GlyphHeader, Self), UnexpectedEof> {
        // Memory map is like this:
        // num contours          : i16
        // min x                 : i16
        // min y                 : i16
        // max x                 : i16
        // max y                 : i16
        // glyph description     : remaining space
        let header = GlyphHeader {
            num_contours: read_i16_at(data, 0)?,
            min_x: read_i16_at(data, 2)?,
            min_y: read_i16_at(data, 4)?,
            max_x: read_i16_at(data, 6)?,
            max_y: read_i16_at(data, 8)?,
        };
        let description = &data[10..];

        let glyph = if header.num_contours >= 0 {
            Self::Simple(SimpleGlyph {
                num_contours: header.num_contours as usize,
                data: description,
            })
        } else {
            Self::Compound(CompoundGlyph { data: description })
        };

        Ok((header, glyph))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SimpleGlyph<'a> {
    num_contours: usize,
    data: &'a [u8],
}

impl<'a> SimpleGlyph<'a> {
    /// Decode all points of the glyph, multiplying their coordinates by `scale`.
    ///
    /// Returns the points along with the index of the last point of every contour.
    pub fn decode(&self, scale: f32) -> Result<(Vec<Point>, Vec<u32>), GlyphDecodeError> {
        // Memory map is like this:
        // end points of contours: [u16; num contours]
        // instruction length    : u16
        // instructions          : [u8; instruction length]
        // flags                 : [u8; unknown]
        // x coords              : [u8 or u16; num points]
        // y coords              : [u8 or u16; num points]
        let mut stream = Stream::new(self.data);

        let contour_ends = (0..self.num_contours)
            .map(|_| stream.read::<u16>().map(u32::from))
            .collect::<Result<Vec<_>, _>>()?;

        if !contour_ends.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(GlyphDecodeError::InvalidContourEnds);
        }

        let num_points = contour_ends.last().map_or(0, |&last| last as usize + 1);

        // Hinting instructions are never executed
        let instruction_length = stream.read::<u16>()?;
        stream.skip_bytes(instruction_length as usize)?;

        // The size of the flag array is unknown, a flag can repeat itself n times.
        // It can never be larger than num_points though (thats the case when no
        // compression happens)
        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = GlyphFlag(stream.read::<u8>()?);
            let repeat_for = if flag.repeat() {
                stream.read::<u8>()? as usize
            } else {
                0
            };

            let decoded = flags.len() + 1 + repeat_for;
            if decoded > num_points {
                return Err(GlyphDecodeError::MalformedFlags {
                    expected: num_points,
                    decoded,
                });
            }
            flags.extend(iter::repeat(flag).take(1 + repeat_for));
        }

        let mut x_coordinates = Vec::with_capacity(num_points);
        let mut x = 0_i32;
        for flag in &flags {
            x += flag.coordinate_type_x().read_delta(&mut stream)?;
            x_coordinates.push(x);
        }

        let mut points = Vec::with_capacity(num_points);
        let mut y = 0_i32;
        for (flag, x) in flags.iter().zip(x_coordinates) {
            y += flag.coordinate_type_y().read_delta(&mut stream)?;
            points.push(Point {
                x: x as f32 * scale,
                y: y as f32 * scale,
                on_curve: flag.is_on_curve(),
            });
        }

        Ok((points, contour_ends))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GlyphFlag(u8);

impl GlyphFlag {
    const POINT_ON_CURVE: u8 = 1;
    const PRIMARY_FLAG_X: u8 = 2;
    const PRIMARY_FLAG_Y: u8 = 4;
    const REPEAT: u8 = 8;
    const SECONDARY_FLAG_X: u8 = 16;
    const SECONDARY_FLAG_Y: u8 = 32;

    pub fn is_on_curve(&self) -> bool {
        self.0 & Self::POINT_ON_CURVE != 0
    }

    pub fn repeat(&self) -> bool {
        self.0 & Self::REPEAT != 0
    }

    pub fn coordinate_type_x(&self) -> GlyphCoordinateType {
        GlyphCoordinateType::from_flags(
            self.0 & Self::PRIMARY_FLAG_X != 0,
            self.0 & Self::SECONDARY_FLAG_X != 0,
        )
    }

    pub fn coordinate_type_y(&self) -> GlyphCoordinateType {
        GlyphCoordinateType::from_flags(
            self.0 & Self::PRIMARY_FLAG_Y != 0,
            self.0 & Self::SECONDARY_FLAG_Y != 0,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GlyphCoordinateType {
    /// The current coordinate is 16 bit signed delta change.
    SignedDelta16B,
    /// The current coordinate is 16 bit, has the same value as the previous one.
    ZeroDelta16B,
    /// The current coordinate is 8 bit, value is negative.
    Negative8B,
    /// The current coordinate is 8 bit, value is positive.
    Positive8B,
}

impl GlyphCoordinateType {
    fn from_flags(short_vector: bool, same_or_positive: bool) -> Self {
        match (short_vector, same_or_positive) {
            (false, false) => Self::SignedDelta16B,
            (false, true) => Self::ZeroDelta16B,
            (true, false) => Self::Negative8B,
            (true, true) => Self::Positive8B,
        }
    }

    fn read_delta(self, stream: &mut Stream<'_>) -> Result<i32, UnexpectedEof> {
        let delta = match self {
            Self::SignedDelta16B => i32::from(stream.read::<i16>()?),
            Self::ZeroDelta16B => 0,
            Self::Negative8B => -i32::from(stream.read::<u8>()?),
            Self::Positive8B => i32::from(stream.read::<u8>()?),
        };
        Ok(delta)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CompoundGlyph<'a> {
    data: &'a [u8],
}

impl<'a> CompoundGlyph<'a> {
    pub fn components(&self) -> ComponentIterator<'a> {
        ComponentIterator {
            stream: Stream::new(self.data),
            done: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CompoundGlyphFlag(u16);

impl CompoundGlyphFlag {
    const ARG_1_AND_2_ARE_WORDS: u16 = 1 << 0;
    const ARGS_ARE_XY_VALUES: u16 = 1 << 1;
    const WE_HAVE_A_SCALE: u16 = 1 << 3;
    const MORE_COMPONENTS: u16 = 1 << 5;
    const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 1 << 6;
    const WE_HAVE_A_TWO_BY_TWO: u16 = 1 << 7;
    const USE_MY_METRICS: u16 = 1 << 9;
    const SCALED_COMPONENT_OFFSET: u16 = 1 << 11;
    const UNSCALED_COMPONENT_OFFSET: u16 = 1 << 12;

    pub fn arg_1_and_2_are_words(&self) -> bool {
        self.0 & Self::ARG_1_AND_2_ARE_WORDS != 0
    }

    pub fn args_are_xy_values(&self) -> bool {
        self.0 & Self::ARGS_ARE_XY_VALUES != 0
    }

    pub fn has_scale(&self) -> bool {
        self.0 & Self::WE_HAVE_A_SCALE != 0
    }

    pub fn is_last_component(&self) -> bool {
        self.0 & Self::MORE_COMPONENTS == 0
    }

    pub fn has_xy_scale(&self) -> bool {
        self.0 & Self::WE_HAVE_AN_X_AND_Y_SCALE != 0
    }

    pub fn has_two_by_two(&self) -> bool {
        self.0 & Self::WE_HAVE_A_TWO_BY_TWO != 0
    }

    pub fn use_my_metrics(&self) -> bool {
        self.0 & Self::USE_MY_METRICS != 0
    }

    /// Whether the component offset should be transformed along with the component.
    ///
    /// If neither flag is set the offset is left unscaled.
    pub fn scaled_component_offset(&self) -> bool {
        self.0 & Self::SCALED_COMPONENT_OFFSET != 0 && self.0 & Self::UNSCALED_COMPONENT_OFFSET == 0
    }
}

/// How a component is positioned relative to the glyph that references it
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentPlacement {
    /// Translate the component by an offset in font units
    Offset(Vec2D<i32>),

    /// Move the component so that `child_point` lands on top of `parent_point`.
    ///
    /// `parent_point` indexes the points of the components decoded so far.
    MatchPoints { parent_point: u32, child_point: u32 },
}

#[derive(Clone, Copy, Debug)]
pub struct Component {
    pub glyph_id: GlyphID,
    pub flags: CompoundGlyphFlag,
    pub placement: ComponentPlacement,

    /// The linear part of the component transform, without any translation
    pub transform: AffineTransform,
}

impl Component {
    fn read(stream: &mut Stream<'_>) -> Result<Self, UnexpectedEof> {
        let flags = CompoundGlyphFlag(stream.read::<u16>()?);
        let glyph_id = GlyphID::new(stream.read::<u16>()?);

        let placement = match (flags.arg_1_and_2_are_words(), flags.args_are_xy_values()) {
            (true, true) => ComponentPlacement::Offset(Vec2D::new(
                i32::from(stream.read::<i16>()?),
                i32::from(stream.read::<i16>()?),
            )),
            (false, true) => ComponentPlacement::Offset(Vec2D::new(
                i32::from(stream.read::<i8>()?),
                i32::from(stream.read::<i8>()?),
            )),
            (true, false) => ComponentPlacement::MatchPoints {
                parent_point: u32::from(stream.read::<u16>()?),
                child_point: u32::from(stream.read::<u16>()?),
            },
            (false, false) => ComponentPlacement::MatchPoints {
                parent_point: u32::from(stream.read::<u8>()?),
                child_point: u32::from(stream.read::<u8>()?),
            },
        };

        let transform = if flags.has_scale() {
            let scale = f2dot14_to_f32(stream.read::<i16>()?);
            AffineTransform::scale(scale, scale)
        } else if flags.has_xy_scale() {
            let x_scale = f2dot14_to_f32(stream.read::<i16>()?);
            let y_scale = f2dot14_to_f32(stream.read::<i16>()?);
            AffineTransform::scale(x_scale, y_scale)
        } else if flags.has_two_by_two() {
            // Stored as xscale, scale01, scale10, yscale
            // x' = xscale * x + scale10 * y
            // y' = scale01 * x + yscale * y
            let x_scale = f2dot14_to_f32(stream.read::<i16>()?);
            let scale01 = f2dot14_to_f32(stream.read::<i16>()?);
            let scale10 = f2dot14_to_f32(stream.read::<i16>()?);
            let y_scale = f2dot14_to_f32(stream.read::<i16>()?);
            AffineTransform::from_matrix(x_scale, scale10, scale01, y_scale)
        } else {
            AffineTransform::identity()
        };

        Ok(Self {
            glyph_id,
            flags,
            placement,
            transform,
        })
    }
}

pub struct ComponentIterator<'a> {
    stream: Stream<'a>,
    done: bool,
}

impl<'a> Iterator for ComponentIterator<'a> {
    type Item = Result<Component, UnexpectedEof>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let component = Component::read(&mut self.stream);
        self.done = match &component {
            Ok(component) => component.flags.is_last_component(),
            Err(_) => true,
        };
        Some(component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_test_data::glyf::{CompositeGlyphBuilder, SimpleGlyphBuilder};

    #[test]
    fn decode_simple_glyph() {
        let data = SimpleGlyphBuilder::default()
            .contour(&[(0, 0, true), (100, 0, true), (50, 300, false)])
            .contour(&[(10, 10, true), (10, 10, true)])
            .build();

        let (header, glyph) = Glyph::new(&data).unwrap();
        assert_eq!(header.num_contours, 2);
        assert_eq!((header.max_x, header.max_y), (100, 300));

        let Glyph::Simple(glyph) = glyph else {
            panic!("expected a simple glyph");
        };
        let (points, contour_ends) = glyph.decode(0.5).unwrap();
        assert_eq!(contour_ends, [2, 4]);
        assert_eq!(
            points[2],
            Point {
                x: 25.,
                y: 150.,
                on_curve: false
            }
        );
        assert_eq!(points[3], points[4]);
        assert!(points[4].on_curve);
    }

    #[test]
    fn flags_must_match_point_count() {
        // One contour with two points, but the flag repeats three times
        let data = [
            0x00, 0x01, 0, 0, 0, 0, 0, 0, 0, 0, // header
            0x00, 0x01, // contour ends
            0x00, 0x00, // no instructions
            0x39, 0x02, // on curve, same x and y, repeat twice
        ];
        let (_, glyph) = Glyph::new(&data).unwrap();
        let Glyph::Simple(glyph) = glyph else {
            panic!("expected a simple glyph");
        };

        assert!(matches!(
            glyph.decode(1.),
            Err(GlyphDecodeError::MalformedFlags {
                expected: 2,
                decoded: 3
            })
        ));
    }

    #[test]
    fn truncated_coordinates() {
        let mut data = SimpleGlyphBuilder::default()
            .contour(&[(0, 0, true), (1000, 1000, true)])
            .build();
        data.truncate(data.len() - 1);

        let (_, glyph) = Glyph::new(&data).unwrap();
        let Glyph::Simple(glyph) = glyph else {
            panic!("expected a simple glyph");
        };
        assert!(matches!(
            glyph.decode(1.),
            Err(GlyphDecodeError::UnexpectedEof(_))
        ));
    }

    #[test]
    fn read_components() {
        let data = CompositeGlyphBuilder::default()
            .component(3, (10, -20))
            .scaled_component(4, (300, 400), 0.5)
            .build();

        let (header, glyph) = Glyph::new(&data).unwrap();
        assert!(header.num_contours < 0);
        let Glyph::Compound(glyph) = glyph else {
            panic!("expected a compound glyph");
        };

        let components = glyph
            .components()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(components.len(), 2);

        assert_eq!(components[0].glyph_id, GlyphID::new(3));
        assert_eq!(
            components[0].placement,
            ComponentPlacement::Offset(Vec2D::new(10, -20))
        );
        assert!(components[0].transform.is_identity());

        assert_eq!(components[1].glyph_id, GlyphID::new(4));
        assert_eq!(
            components[1].placement,
            ComponentPlacement::Offset(Vec2D::new(300, 400))
        );
        assert_eq!(components[1].transform, AffineTransform::scale(0.5, 0.5));
        assert!(components[1].flags.is_last_component());
    }

    #[test]
    fn two_by_two_matrix() {
        let data = CompositeGlyphBuilder::default()
            .transformed_component(1, (0, 0), [0., 1., -1., 0.])
            .build();
        let (_, Glyph::Compound(glyph)) = Glyph::new(&data).unwrap() else {
            panic!("expected a compound glyph");
        };
        let component = glyph.components().next().unwrap().unwrap();

        // xscale = 0, scale01 = 1, scale10 = -1, yscale = 0 is a rotation by 90 degrees
        let rotated = component.transform.apply_to(Vec2D::new(1., 0.));
        assert_eq!(rotated, Vec2D::new(0., 1.));
    }
}
