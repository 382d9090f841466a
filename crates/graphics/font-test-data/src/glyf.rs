//! Builders for glyph descriptions inside the `glyf` table

use crate::{be_buffer, bebuffer::BeBuffer};

const ON_CURVE_POINT: u8 = 1 << 0;
const X_SHORT_VECTOR: u8 = 1 << 1;
const Y_SHORT_VECTOR: u8 = 1 << 2;
const REPEAT_FLAG: u8 = 1 << 3;
const X_IS_SAME_OR_POSITIVE: u8 = 1 << 4;
const Y_IS_SAME_OR_POSITIVE: u8 = 1 << 5;

const ARG_1_AND_2_ARE_WORDS: u16 = 1 << 0;
const ARGS_ARE_XY_VALUES: u16 = 1 << 1;
const WE_HAVE_A_SCALE: u16 = 1 << 3;
const MORE_COMPONENTS: u16 = 1 << 5;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 1 << 6;
const WE_HAVE_A_TWO_BY_TWO: u16 = 1 << 7;
const USE_MY_METRICS: u16 = 1 << 9;
const SCALED_COMPONENT_OFFSET: u16 = 1 << 11;

/// Encode a float as a signed `2.14` fixed point number
fn f2dot14(value: f32) -> i16 {
    (value * 16384.).round() as i16
}

/// Encodes a glyph made of contours of `(x, y, on_curve)` points
#[derive(Clone, Debug, Default)]
pub struct SimpleGlyphBuilder {
    contours: Vec<Vec<(i16, i16, bool)>>,
    instructions: Vec<u8>,
    contour_ends: Option<Vec<u16>>,
}

impl SimpleGlyphBuilder {
    pub fn contour(mut self, points: &[(i16, i16, bool)]) -> Self {
        assert!(!points.is_empty());
        self.contours.push(points.to_vec());
        self
    }

    /// Hinting instructions, these are skipped by the parser
    pub fn instructions(mut self, instructions: &[u8]) -> Self {
        self.instructions = instructions.to_vec();
        self
    }

    /// Store these contour end indices instead of the ones implied by the contours
    pub fn contour_ends(mut self, contour_ends: &[u16]) -> Self {
        self.contour_ends = Some(contour_ends.to_vec());
        self
    }

    /// The bounding box of all points, including off-curve ones
    pub fn bbox(&self) -> (i16, i16, i16, i16) {
        let mut points = self.contours.iter().flatten();
        let Some(&(x, y, _)) = points.next() else {
            return (0, 0, 0, 0);
        };

        points.fold((x, y, x, y), |(min_x, min_y, max_x, max_y), &(x, y, _)| {
            (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
        })
    }

    pub fn build(&self) -> Vec<u8> {
        let (min_x, min_y, max_x, max_y) = self.bbox();
        let contour_ends = self.contour_ends.clone().unwrap_or_else(|| {
            self.contours
                .iter()
                .scan(0, |end, contour| {
                    *end += contour.len() as u16;
                    Some(*end - 1)
                })
                .collect()
        });

        let mut buffer = be_buffer! {
            contour_ends.len() as i16,
            min_x,
            min_y,
            max_x,
            max_y,
        };

        for end in contour_ends {
            buffer = buffer.push(end);
        }

        buffer = buffer
            .push(self.instructions.len() as u16)
            .extend_from_slice(&self.instructions);

        let mut flags = vec![];
        let mut x_bytes = BeBuffer::new();
        let mut y_bytes = BeBuffer::new();
        let mut previous = (0_i16, 0_i16);

        for &(x, y, on_curve) in self.contours.iter().flatten() {
            let mut flag = if on_curve { ON_CURVE_POINT } else { 0 };
            let (x_flags, x_encoded) = encode_delta(
                x - previous.0,
                X_SHORT_VECTOR,
                X_IS_SAME_OR_POSITIVE,
                x_bytes,
            );
            let (y_flags, y_encoded) = encode_delta(
                y - previous.1,
                Y_SHORT_VECTOR,
                Y_IS_SAME_OR_POSITIVE,
                y_bytes,
            );
            flag |= x_flags | y_flags;
            x_bytes = x_encoded;
            y_bytes = y_encoded;

            flags.push(flag);
            previous = (x, y);
        }

        // Compress runs of identical flags
        let mut i = 0;
        while i < flags.len() {
            let flag = flags[i];
            let run = flags[i..]
                .iter()
                .take(256)
                .take_while(|&&other| other == flag)
                .count();

            if run > 1 {
                buffer = buffer.push(flag | REPEAT_FLAG).push((run - 1) as u8);
            } else {
                buffer = buffer.push(flag);
            }
            i += run;
        }

        buffer
            .extend_from_slice(x_bytes.as_slice())
            .extend_from_slice(y_bytes.as_slice())
            .into_inner()
    }
}

fn encode_delta(delta: i16, short: u8, same_or_positive: u8, bytes: BeBuffer) -> (u8, BeBuffer) {
    if delta == 0 {
        (same_or_positive, bytes)
    } else if delta.unsigned_abs() <= 255 {
        let sign = if delta > 0 { same_or_positive } else { 0 };
        (short | sign, bytes.push(delta.unsigned_abs() as u8))
    } else {
        (0, bytes.push(delta))
    }
}

#[derive(Clone, Copy, Debug)]
enum Arguments {
    Offset(i16, i16),
    Points(u16, u16),
}

#[derive(Clone, Copy, Debug)]
enum Transform {
    None,
    Scale(f32),
    XYScale(f32, f32),
    TwoByTwo([f32; 4]),
}

#[derive(Clone, Copy, Debug)]
struct ComponentRecord {
    glyph_id: u16,
    flags: u16,
    arguments: Arguments,
    transform: Transform,
}

/// Encodes a glyph made of references to other glyphs
#[derive(Clone, Debug, Default)]
pub struct CompositeGlyphBuilder {
    components: Vec<ComponentRecord>,
    bbox: (i16, i16, i16, i16),
}

impl CompositeGlyphBuilder {
    fn push(mut self, glyph_id: u16, arguments: Arguments, transform: Transform) -> Self {
        self.components.push(ComponentRecord {
            glyph_id,
            flags: 0,
            arguments,
            transform,
        });
        self
    }

    /// Reference `glyph_id`, moved by `offset`
    pub fn component(self, glyph_id: u16, offset: (i16, i16)) -> Self {
        self.push(glyph_id, Arguments::Offset(offset.0, offset.1), Transform::None)
    }

    pub fn scaled_component(self, glyph_id: u16, offset: (i16, i16), scale: f32) -> Self {
        self.push(
            glyph_id,
            Arguments::Offset(offset.0, offset.1),
            Transform::Scale(scale),
        )
    }

    pub fn xy_scaled_component(
        self,
        glyph_id: u16,
        offset: (i16, i16),
        x_scale: f32,
        y_scale: f32,
    ) -> Self {
        self.push(
            glyph_id,
            Arguments::Offset(offset.0, offset.1),
            Transform::XYScale(x_scale, y_scale),
        )
    }

    /// `matrix` is stored as `[xscale, scale01, scale10, yscale]`
    pub fn transformed_component(self, glyph_id: u16, offset: (i16, i16), matrix: [f32; 4]) -> Self {
        self.push(
            glyph_id,
            Arguments::Offset(offset.0, offset.1),
            Transform::TwoByTwo(matrix),
        )
    }

    /// Reference `glyph_id`, moved such that its point `child_point` lies on
    /// point `parent_point` of the components before it
    pub fn matched_component(self, glyph_id: u16, parent_point: u16, child_point: u16) -> Self {
        self.push(
            glyph_id,
            Arguments::Points(parent_point, child_point),
            Transform::None,
        )
    }

    /// Use the metrics of the most recently added component for the whole glyph
    pub fn use_my_metrics(mut self) -> Self {
        if let Some(component) = self.components.last_mut() {
            component.flags |= USE_MY_METRICS;
        }
        self
    }

    /// Transform the offset of the most recently added component along with its points
    pub fn scaled_offset(mut self) -> Self {
        if let Some(component) = self.components.last_mut() {
            component.flags |= SCALED_COMPONENT_OFFSET;
        }
        self
    }

    pub fn bbox(mut self, min_x: i16, min_y: i16, max_x: i16, max_y: i16) -> Self {
        self.bbox = (min_x, min_y, max_x, max_y);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (min_x, min_y, max_x, max_y) = self.bbox;
        let mut buffer = be_buffer! {
            -1_i16,
            min_x,
            min_y,
            max_x,
            max_y,
        };

        for (i, component) in self.components.iter().enumerate() {
            let mut flags = component.flags;
            if i + 1 != self.components.len() {
                flags |= MORE_COMPONENTS;
            }

            let fits_in_bytes = match component.arguments {
                Arguments::Offset(x, y) => i8::try_from(x).is_ok() && i8::try_from(y).is_ok(),
                Arguments::Points(parent, child) => parent < 256 && child < 256,
            };
            if !fits_in_bytes {
                flags |= ARG_1_AND_2_ARE_WORDS;
            }
            if matches!(component.arguments, Arguments::Offset(..)) {
                flags |= ARGS_ARE_XY_VALUES;
            }
            flags |= match component.transform {
                Transform::None => 0,
                Transform::Scale(_) => WE_HAVE_A_SCALE,
                Transform::XYScale(..) => WE_HAVE_AN_X_AND_Y_SCALE,
                Transform::TwoByTwo(_) => WE_HAVE_A_TWO_BY_TWO,
            };

            buffer = buffer.push(flags).push(component.glyph_id);

            buffer = match (component.arguments, fits_in_bytes) {
                (Arguments::Offset(x, y), true) => buffer.push(x as i8).push(y as i8),
                (Arguments::Offset(x, y), false) => buffer.push(x).push(y),
                (Arguments::Points(parent, child), true) => {
                    buffer.push(parent as u8).push(child as u8)
                },
                (Arguments::Points(parent, child), false) => buffer.push(parent).push(child),
            };

            buffer = match component.transform {
                Transform::None => buffer,
                Transform::Scale(scale) => buffer.push(f2dot14(scale)),
                Transform::XYScale(x_scale, y_scale) => {
                    buffer.push(f2dot14(x_scale)).push(f2dot14(y_scale))
                },
                Transform::TwoByTwo(matrix) => buffer.extend(matrix.map(f2dot14)),
            };
        }

        buffer.into_inner()
    }
}
