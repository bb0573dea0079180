//! Vector paths with length and sampling.
//!
//! [`PathData`] holds absolute segments. Paths are parsed from SVG path
//! syntax (`M L H V C Q Z`, absolute and relative), written back with
//! [`Display`](fmt::Display), and flattened to polylines for measurement.

use std::{fmt, str::FromStr};

use winnow::{
    Parser as _,
    ascii::float,
    combinator::{preceded, repeat, terminated},
    error::ModalResult,
    token::{one_of, take_while},
};

use super::{Bounds, Line, Matrix, Point};
use crate::error::GeometryError;

/// Upper bound on the samples [`PathData::sample`] produces, end point
/// excluded.
pub const MAX_SAMPLES: usize = 10_000;

/// One absolute path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic curve: first control, second control, end.
    CurveTo(Point, Point, Point),
    Close,
}

/// A point on a path together with its distance from the path start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub point: Point,
    pub distance: f32,
}

/// A sequence of absolute path segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathData {
    segments: Vec<Segment>,
}

impl PathData {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// A polyline path through the given points.
    pub fn from_polyline(points: &[Point]) -> Self {
        let segments = points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if i == 0 {
                    Segment::MoveTo(*p)
                } else {
                    Segment::LineTo(*p)
                }
            })
            .collect();
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_point(&self) -> Option<Point> {
        self.segments.iter().find_map(|s| match s {
            Segment::MoveTo(p) | Segment::LineTo(p) | Segment::CurveTo(_, _, p) => Some(*p),
            Segment::Close => None,
        })
    }

    pub fn last_point(&self) -> Option<Point> {
        self.polyline().last().copied()
    }

    /// Flattens the path into drawn straight pieces.
    ///
    /// Moves start a new subpath and contribute no piece; curves are
    /// subdivided uniformly in their parameter.
    fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut current: Option<Point> = None;
        let mut subpath_start = Point::default();

        for segment in &self.segments {
            match *segment {
                Segment::MoveTo(p) => {
                    current = Some(p);
                    subpath_start = p;
                }
                Segment::LineTo(p) => {
                    let from = current.unwrap_or(p);
                    lines.push(Line::new(from, p));
                    current = Some(p);
                }
                Segment::CurveTo(c1, c2, end) => {
                    let from = current.unwrap_or(end);
                    let hull = from.distance(c1) + c1.distance(c2) + c2.distance(end);
                    let steps = ((hull / 2.0).ceil() as usize).clamp(8, 128);
                    let mut prev = from;
                    for step in 1..=steps {
                        let t = step as f32 / steps as f32;
                        let next = cubic_point(from, c1, c2, end, t);
                        lines.push(Line::new(prev, next));
                        prev = next;
                    }
                    current = Some(end);
                }
                Segment::Close => {
                    if let Some(from) = current {
                        lines.push(Line::new(from, subpath_start));
                    }
                    current = Some(subpath_start);
                }
            }
        }
        lines
    }

    /// The flattened path as a list of points.
    pub fn polyline(&self) -> Vec<Point> {
        let lines = self.lines();
        match lines.first() {
            Some(first) => std::iter::once(first.start())
                .chain(lines.iter().map(|l| l.end()))
                .collect(),
            None => self.first_point().into_iter().collect(),
        }
    }

    /// Total drawn length.
    pub fn length(&self) -> f32 {
        self.lines().iter().map(|l| l.length()).sum()
    }

    /// The point at `distance` from the start, clamped to the path.
    pub fn point_at_length(&self, distance: f32) -> Option<Point> {
        let lines = self.lines();
        let Some(last) = lines.last() else {
            return self.first_point();
        };
        let mut walked = 0.0;
        for line in &lines {
            let len = line.length();
            if walked + len >= distance && len > 0.0 {
                let t = ((distance - walked) / len).clamp(0.0, 1.0);
                return Some(line.point_at(t));
            }
            walked += len;
        }
        Some(last.end())
    }

    /// The straight piece of the path at `distance`, oriented along the path.
    pub fn tangent_at_length(&self, distance: f32) -> Option<Line> {
        let lines = self.lines();
        let mut walked = 0.0;
        let mut tangent = None;
        for line in lines.into_iter().filter(|l| l.length() > 0.0) {
            walked += line.length();
            tangent = Some(line);
            if walked >= distance {
                break;
            }
        }
        tangent
    }

    /// Points spaced `interval` apart along the path, always ending at the end.
    ///
    /// Non-positive intervals fall back to a spacing of one unit. The
    /// spacing widens on paths too long to fit [`MAX_SAMPLES`] samples.
    pub fn sample(&self, interval: f32) -> Vec<Sample> {
        let lines = self.lines();
        if lines.is_empty() {
            return self
                .first_point()
                .map(|point| Sample {
                    point,
                    distance: 0.0,
                })
                .into_iter()
                .collect();
        }

        let total: f32 = lines.iter().map(|l| l.length()).sum();
        let interval = if interval > 0.0 { interval } else { 1.0 };
        let interval = interval.max(total / MAX_SAMPLES as f32);
        let steps = ((total / interval).ceil() as usize).min(MAX_SAMPLES);
        let mut samples = Vec::with_capacity(steps + 1);
        let mut walked = 0.0;
        let mut index = 0;

        for step in 0..steps {
            let distance = step as f32 * interval;
            if distance >= total {
                break;
            }
            while index < lines.len() - 1 && walked + lines[index].length() < distance {
                walked += lines[index].length();
                index += 1;
            }
            let line = lines[index];
            let len = line.length();
            let t = if len > 0.0 {
                ((distance - walked) / len).clamp(0.0, 1.0)
            } else {
                0.0
            };
            samples.push(Sample {
                point: line.point_at(t),
                distance,
            });
        }
        if let Some(last) = lines.last() {
            samples.push(Sample {
                point: last.end(),
                distance: total,
            });
        }
        samples
    }

    /// Shortest distance from `p` to the drawn path.
    pub fn distance_to_point(&self, p: Point) -> Option<f32> {
        let lines = self.lines();
        if lines.is_empty() {
            return self.first_point().map(|start| start.distance(p));
        }
        lines
            .iter()
            .map(|l| l.closest_point(p).distance(p))
            .reduce(f32::min)
    }

    /// Bounds of the flattened path.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.polyline())
    }

    /// The path with every point transformed by `matrix`.
    pub fn transform(&self, matrix: &Matrix) -> Self {
        let map = |p: Point| matrix.transform_point(p);
        let segments = self
            .segments
            .iter()
            .map(|segment| match *segment {
                Segment::MoveTo(p) => Segment::MoveTo(map(p)),
                Segment::LineTo(p) => Segment::LineTo(map(p)),
                Segment::CurveTo(c1, c2, end) => Segment::CurveTo(map(c1), map(c2), map(end)),
                Segment::Close => Segment::Close,
            })
            .collect();
        Self { segments }
    }
}

fn cubic_point(p0: Point, c1: Point, c2: Point, p3: Point, t: f32) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x() + b * c1.x() + c * c2.x() + d * p3.x(),
        a * p0.y() + b * c1.y() + c * c2.y() + d * p3.y(),
    )
}

/// Formats a coordinate, writing negative zero as `0`.
pub fn format_number(value: f32) -> String {
    format!("{}", value + 0.0)
}

impl fmt::Display for PathData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let point = |p: Point| format!("{} {}", format_number(p.x()), format_number(p.y()));
        let parts: Vec<String> = self
            .segments
            .iter()
            .map(|segment| match *segment {
                Segment::MoveTo(p) => format!("M {}", point(p)),
                Segment::LineTo(p) => format!("L {}", point(p)),
                Segment::CurveTo(c1, c2, end) => {
                    format!("C {} {} {}", point(c1), point(c2), point(end))
                }
                Segment::Close => "Z".to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

impl FromStr for PathData {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let commands = commands
            .parse(s)
            .map_err(|e| GeometryError::InvalidPath(e.to_string()))?;
        build_segments(&commands)
    }
}

fn separator(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace() || c == ',')
        .void()
        .parse_next(input)
}

fn number(input: &mut &str) -> ModalResult<f32> {
    preceded(separator, float).parse_next(input)
}

fn command(input: &mut &str) -> ModalResult<(char, Vec<f32>)> {
    (
        preceded(
            separator,
            one_of(|c: char| "MmLlHhVvCcQqZz".contains(c)),
        ),
        repeat(0.., number),
    )
        .parse_next(input)
}

fn commands(input: &mut &str) -> ModalResult<Vec<(char, Vec<f32>)>> {
    terminated(repeat(0.., command), separator).parse_next(input)
}

fn arity(command: char) -> usize {
    match command.to_ascii_uppercase() {
        'M' | 'L' => 2,
        'H' | 'V' => 1,
        'C' => 6,
        'Q' => 4,
        _ => 0,
    }
}

/// Resolves parsed commands into absolute segments.
///
/// Extra coordinate groups after a move are treated as line-tos; quadratic
/// curves are raised to cubic ones.
fn build_segments(commands: &[(char, Vec<f32>)]) -> Result<PathData, GeometryError> {
    let mut segments = Vec::new();
    let mut current = Point::default();
    let mut subpath_start = Point::default();

    for (index, (command, args)) in commands.iter().enumerate() {
        let n = arity(*command);
        if index == 0 && !matches!(command, 'M' | 'm') {
            return Err(GeometryError::InvalidPath(format!(
                "path must start with a move command, found `{command}`"
            )));
        }
        if n == 0 {
            if !args.is_empty() {
                return Err(GeometryError::InvalidPath(format!(
                    "`{command}` takes no arguments"
                )));
            }
            segments.push(Segment::Close);
            current = subpath_start;
            continue;
        }
        if args.is_empty() || args.len() % n != 0 {
            return Err(GeometryError::InvalidPath(format!(
                "`{command}` expects a multiple of {n} numbers, found {}",
                args.len()
            )));
        }

        let relative = command.is_ascii_lowercase();
        let resolve = |origin: Point, x: f32, y: f32| {
            if relative {
                origin.offset(x, y)
            } else {
                Point::new(x, y)
            }
        };

        for (group, chunk) in args.chunks(n).enumerate() {
            let segment = match command.to_ascii_uppercase() {
                'M' => {
                    let p = resolve(current, chunk[0], chunk[1]);
                    if group == 0 {
                        subpath_start = p;
                        Segment::MoveTo(p)
                    } else {
                        Segment::LineTo(p)
                    }
                }
                'L' => Segment::LineTo(resolve(current, chunk[0], chunk[1])),
                'H' => {
                    let x = if relative { current.x() + chunk[0] } else { chunk[0] };
                    Segment::LineTo(current.with_x(x))
                }
                'V' => {
                    let y = if relative { current.y() + chunk[0] } else { chunk[0] };
                    Segment::LineTo(current.with_y(y))
                }
                'C' => Segment::CurveTo(
                    resolve(current, chunk[0], chunk[1]),
                    resolve(current, chunk[2], chunk[3]),
                    resolve(current, chunk[4], chunk[5]),
                ),
                'Q' => {
                    let control = resolve(current, chunk[0], chunk[1]);
                    let end = resolve(current, chunk[2], chunk[3]);
                    Segment::CurveTo(
                        control.scale(2.0).add_point(current).scale(1.0 / 3.0),
                        control.scale(2.0).add_point(end).scale(1.0 / 3.0),
                        end,
                    )
                }
                other => {
                    return Err(GeometryError::InvalidPath(format!(
                        "unsupported command `{other}`"
                    )));
                }
            };
            current = match segment {
                Segment::MoveTo(p) | Segment::LineTo(p) | Segment::CurveTo(_, _, p) => p,
                Segment::Close => subpath_start,
            };
            segments.push(segment);
        }
    }

    Ok(PathData::new(segments))
}
