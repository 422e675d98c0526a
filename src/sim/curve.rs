//! Piecewise cubic Bézier curves used as ground terrain
//!
//! A curve is built once from SVG path data and then only queried. Queries are
//! by arc length, mirroring how a browser walks an SVG path:
//! - `total_length` / `point_at_length` go through a flattened length table
//! - `sample_y` narrows over arc length to find the point under a given x

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use glam::Vec2;

/// Narrowing iterations used by `sample_y`
pub const SAMPLE_ITERATIONS: usize = 18;

/// Chords per segment in the arc-length table
const ARC_SUBDIVISIONS: usize = 64;

/// A single cubic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl CubicSegment {
    pub fn new(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight line expressed as a cubic (controls at the thirds)
    pub fn line(from: Vec2, to: Vec2) -> Self {
        Self {
            p0: from,
            p1: toward(from, to, 1.0 / 3.0),
            p2: toward(from, to, 2.0 / 3.0),
            p3: to,
        }
    }

    /// Point at parameter `t` in [0, 1] (de Casteljau, exact on flat runs)
    #[inline]
    pub fn point(&self, t: f32) -> Vec2 {
        let a = toward(self.p0, self.p1, t);
        let b = toward(self.p1, self.p2, t);
        let c = toward(self.p2, self.p3, t);
        let ab = toward(a, b, t);
        let bc = toward(b, c, t);
        toward(ab, bc, t)
    }

    /// First derivative at parameter `t`
    #[inline]
    pub fn derivative(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Tight axis-aligned bounds of the drawn segment
    ///
    /// Endpoints plus every interior extremum, found where a component of
    /// the derivative crosses zero.
    pub fn extent(&self) -> (Vec2, Vec2) {
        let mut min = self.p0.min(self.p3);
        let mut max = self.p0.max(self.p3);
        let a = self.p1 - self.p0;
        let b = self.p2 - self.p1;
        let c = self.p3 - self.p2;
        for axis in 0..2 {
            for t in derivative_roots(a[axis], b[axis], c[axis]).into_iter().flatten() {
                let p = self.point(t);
                min = min.min(p);
                max = max.max(p);
            }
        }
        (min, max)
    }
}

/// Roots in (0, 1) of `a(1-t)² + 2b(1-t)t + ct²`, the derivative of one
/// cubic component up to a factor of 3
fn derivative_roots(a: f32, b: f32, c: f32) -> [Option<f32>; 2] {
    let inside = |t: f32| (t > 0.0 && t < 1.0).then_some(t);
    let qa = a - 2.0 * b + c;
    let qb = 2.0 * (b - a);
    if qa.abs() <= f32::EPSILON {
        if qb.abs() <= f32::EPSILON {
            return [None, None];
        }
        return [inside(-a / qb), None];
    }
    let disc = qb * qb - 4.0 * qa * a;
    if disc < 0.0 {
        return [None, None];
    }
    let sq = disc.sqrt();
    [inside((-qb + sq) / (2.0 * qa)), inside((-qb - sq) / (2.0 * qa))]
}

/// `a + (b - a) * t`, which keeps equal components exactly equal
#[inline]
fn toward(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// One entry of the flattened length table
#[derive(Debug, Clone, Copy)]
struct ArcSample {
    /// Cumulative length from the curve start
    length: f32,
    segment: usize,
    t: f32,
}

/// A continuous open path of cubic segments
#[derive(Debug, Clone)]
pub struct Curve {
    segments: Vec<CubicSegment>,
    table: Vec<ArcSample>,
    length: f32,
}

impl Curve {
    /// Build a curve from connected segments (each starts where the last ended)
    pub fn from_segments(segments: Vec<CubicSegment>) -> Self {
        let mut table = Vec::with_capacity(segments.len() * ARC_SUBDIVISIONS + 1);
        let mut length = 0.0;

        if let Some(first) = segments.first() {
            table.push(ArcSample { length: 0.0, segment: 0, t: 0.0 });
            let mut prev = first.p0;
            for (index, segment) in segments.iter().enumerate() {
                for i in 1..=ARC_SUBDIVISIONS {
                    let t = i as f32 / ARC_SUBDIVISIONS as f32;
                    let p = segment.point(t);
                    length += prev.distance(p);
                    prev = p;
                    table.push(ArcSample { length, segment: index, t });
                }
            }
        }

        Self { segments, table, length }
    }

    /// Parse SVG path data (`M`, `L`, `H`, `V`, `C` and relative forms)
    pub fn parse(data: &str) -> Result<Self, PathError> {
        parse_path(data).map(Self::from_segments)
    }

    pub fn segments(&self) -> &[CubicSegment] {
        &self.segments
    }

    /// Total arc length
    #[inline]
    pub fn total_length(&self) -> f32 {
        self.length
    }

    /// True when no y can be determined (no segments or zero length)
    pub fn is_degenerate(&self) -> bool {
        self.segments.is_empty() || self.length <= f32::EPSILON
    }

    /// Map an arc length to (segment, t)
    fn locate(&self, distance: f32) -> Option<(usize, f32)> {
        let last = self.table.last()?;
        let d = distance.clamp(0.0, self.length);

        let idx = self.table.partition_point(|s| s.length < d);
        if idx == 0 {
            return Some((0, 0.0));
        }
        if idx >= self.table.len() {
            return Some((last.segment, last.t));
        }

        let hi = self.table[idx];
        let lo = self.table[idx - 1];
        // The entry before a segment's first chord belongs to the previous segment
        let lo_t = if lo.segment == hi.segment { lo.t } else { 0.0 };
        let span = hi.length - lo.length;
        let frac = if span > 0.0 { (d - lo.length) / span } else { 0.0 };
        Some((hi.segment, lo_t + (hi.t - lo_t) * frac))
    }

    /// Point at the given arc length (clamped to the curve)
    pub fn point_at_length(&self, distance: f32) -> Option<Vec2> {
        let (segment, t) = self.locate(distance)?;
        Some(self.segments[segment].point(t))
    }

    /// Direction of travel at the given arc length, in radians
    pub fn tangent_angle_at(&self, distance: f32) -> Option<f32> {
        let (segment, t) = self.locate(distance)?;
        let d = self.segments[segment].derivative(t);
        if d.length_squared() <= f32::EPSILON {
            let seg = &self.segments[segment];
            let chord = seg.p3 - seg.p0;
            return Some(chord.y.atan2(chord.x));
        }
        Some(d.y.atan2(d.x))
    }

    /// Bounds of the drawn curve
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.segments
            .iter()
            .map(CubicSegment::extent)
            .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)))
    }

    pub fn x_range(&self) -> Option<(f32, f32)> {
        self.bounds().map(|(min, max)| (min.x, max.x))
    }

    pub fn y_range(&self) -> Option<(f32, f32)> {
        self.bounds().map(|(min, max)| (min.y, max.y))
    }
}

impl FromStr for Curve {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Memoized `sample_y` results keyed by rounded x
///
/// Curves never change, so entries are never invalidated.
#[derive(Debug, Clone, Default)]
pub struct SampleCache {
    entries: HashMap<i32, f32>,
}

impl SampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, key: i32) -> Option<f32> {
        self.entries.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for a horizontal coordinate
#[inline]
pub fn cache_key(x: f32) -> i32 {
    x.round() as i32
}

/// Vertical coordinate of the curve at `x_target`
///
/// Ternary narrowing over arc length toward the point whose x is closest to
/// the target. Returns `None` only for a degenerate curve.
pub fn sample_y(curve: &Curve, x_target: f32, cache: &mut SampleCache) -> Option<f32> {
    let key = cache_key(x_target);
    if let Some(y) = cache.get(key) {
        return Some(y);
    }
    if curve.is_degenerate() {
        return None;
    }

    let mut lo = 0.0;
    let mut hi = curve.total_length();
    let mut best_y = f32::INFINITY;

    for _ in 0..SAMPLE_ITERATIONS {
        let m1 = lo + (hi - lo) / 3.0;
        let m2 = hi - (hi - lo) / 3.0;
        let p1 = curve.point_at_length(m1)?;
        let p2 = curve.point_at_length(m2)?;
        let d1 = (p1.x - x_target).abs();
        let d2 = (p2.x - x_target).abs();
        if d1 < d2 {
            hi = m2;
            best_y = p1.y;
        } else {
            lo = m1;
            best_y = p2.y;
        }
    }

    cache.entries.insert(key, best_y);
    Some(best_y)
}

/// Errors from parsing SVG path data
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// No drawing commands at all
    Empty,
    /// Path data must begin with a move command
    MissingMoveTo,
    /// A command this parser does not model (arcs, closepath, ...)
    UnsupportedCommand(char),
    /// Character that is neither a command, number nor separator
    UnexpectedChar { ch: char, offset: usize },
    /// A command ran out of coordinates
    MissingNumber { command: char },
    /// Numeric token that failed to parse
    BadNumber { text: String, offset: usize },
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "path data is empty"),
            Self::MissingMoveTo => write!(f, "path data must start with `M` or `m`"),
            Self::UnsupportedCommand(c) => write!(f, "unsupported path command `{c}`"),
            Self::UnexpectedChar { ch, offset } => {
                write!(f, "unexpected character `{ch}` at offset {offset}")
            }
            Self::MissingNumber { command } => {
                write!(f, "command `{command}` is missing coordinates")
            }
            Self::BadNumber { text, offset } => {
                write!(f, "invalid number `{text}` at offset {offset}")
            }
        }
    }
}

impl Error for PathError {}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f32),
}

fn tokenize(data: &str) -> Result<Vec<Token>, PathError> {
    let bytes = data.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;
        if c.is_ascii_whitespace() || c == ',' {
            i += 1;
        } else if c.is_ascii_alphabetic() && c != 'e' && c != 'E' {
            tokens.push(Token::Command(c));
            i += 1;
        } else if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' {
            let start = i;
            i += 1;
            let mut seen_dot = c == '.';
            while i < bytes.len() {
                let n = bytes[i] as char;
                if n.is_ascii_digit() {
                    i += 1;
                } else if n == '.' && !seen_dot {
                    seen_dot = true;
                    i += 1;
                } else if (n == 'e' || n == 'E') && i + 1 < bytes.len() {
                    i += 1;
                    if matches!(bytes[i] as char, '-' | '+') {
                        i += 1;
                    }
                } else {
                    break;
                }
            }
            let text = &data[start..i];
            let value = text.parse::<f32>().map_err(|_| PathError::BadNumber {
                text: text.to_string(),
                offset: start,
            })?;
            tokens.push(Token::Number(value));
        } else {
            return Err(PathError::UnexpectedChar { ch: c, offset: i });
        }
    }

    Ok(tokens)
}

/// Cursor over tokens that hands out coordinates for one command
struct Args<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Args<'_> {
    fn has_number(&self) -> bool {
        matches!(self.tokens.get(self.pos), Some(Token::Number(_)))
    }

    fn number(&mut self, command: char) -> Result<f32, PathError> {
        match self.tokens.get(self.pos) {
            Some(Token::Number(v)) => {
                self.pos += 1;
                Ok(*v)
            }
            _ => Err(PathError::MissingNumber { command }),
        }
    }

    fn point(&mut self, command: char) -> Result<Vec2, PathError> {
        let x = self.number(command)?;
        let y = self.number(command)?;
        Ok(Vec2::new(x, y))
    }
}

fn parse_path(data: &str) -> Result<Vec<CubicSegment>, PathError> {
    let tokens = tokenize(data)?;
    if tokens.is_empty() {
        return Err(PathError::Empty);
    }
    if !matches!(tokens[0], Token::Command('M' | 'm')) {
        return Err(PathError::MissingMoveTo);
    }

    let mut args = Args { tokens: &tokens, pos: 0 };
    let mut segments = Vec::new();
    let mut current = Vec2::ZERO;

    while let Some(token) = args.tokens.get(args.pos).copied() {
        let Token::Command(command) = token else {
            // Numbers are consumed by their command; a stray one has no owner
            return Err(PathError::MissingNumber { command: '?' });
        };
        args.pos += 1;
        let relative = command.is_ascii_lowercase();
        let base = |current: Vec2| if relative { current } else { Vec2::ZERO };

        match command.to_ascii_uppercase() {
            'M' => {
                current = base(current) + args.point(command)?;
                // Extra pairs after a move are implicit line-tos
                while args.has_number() {
                    let to = base(current) + args.point(command)?;
                    segments.push(CubicSegment::line(current, to));
                    current = to;
                }
            }
            'L' => loop {
                let to = base(current) + args.point(command)?;
                segments.push(CubicSegment::line(current, to));
                current = to;
                if !args.has_number() {
                    break;
                }
            },
            'H' => loop {
                let x = args.number(command)?;
                let to = Vec2::new(if relative { current.x + x } else { x }, current.y);
                segments.push(CubicSegment::line(current, to));
                current = to;
                if !args.has_number() {
                    break;
                }
            },
            'V' => loop {
                let y = args.number(command)?;
                let to = Vec2::new(current.x, if relative { current.y + y } else { y });
                segments.push(CubicSegment::line(current, to));
                current = to;
                if !args.has_number() {
                    break;
                }
            },
            'C' => loop {
                let origin = base(current);
                let c1 = origin + args.point(command)?;
                let c2 = origin + args.point(command)?;
                let to = origin + args.point(command)?;
                segments.push(CubicSegment::new(current, c1, c2, to));
                current = to;
                if !args.has_number() {
                    break;
                }
            },
            _ => return Err(PathError::UnsupportedCommand(command)),
        }
    }

    Ok(segments)
}
