//! Parsing of SVG `transform` attribute lists.

use log::warn;
use winnow::{
    Parser as _,
    ascii::{alpha1, float},
    combinator::{delimited, preceded, repeat, terminated},
    error::ModalResult,
    token::take_while,
};

use super::{Matrix, Point};
use crate::error::GeometryError;

fn separator(input: &mut &str) -> ModalResult<()> {
    take_while(0.., |c: char| c.is_whitespace() || c == ',')
        .void()
        .parse_next(input)
}

fn function<'a>(input: &mut &'a str) -> ModalResult<(&'a str, Vec<f32>)> {
    (
        preceded(separator, alpha1),
        delimited(
            (separator, '('),
            repeat(0.., preceded(separator, float::<_, f32, _>)),
            (separator, ')'),
        ),
    )
        .parse_next(input)
}

fn functions<'a>(input: &mut &'a str) -> ModalResult<Vec<(&'a str, Vec<f32>)>> {
    terminated(repeat(0.., function), separator).parse_next(input)
}

fn to_matrix(name: &str, args: &[f32]) -> Result<Matrix, GeometryError> {
    let invalid = || {
        GeometryError::InvalidTransform(format!(
            "`{name}` does not accept {} argument(s)",
            args.len()
        ))
    };
    let matrix = match (name, args) {
        ("matrix", &[a, b, c, d, e, f]) => Matrix::new(a, b, c, d, e, f),
        ("translate", &[tx]) => Matrix::translate(tx, 0.0),
        ("translate", &[tx, ty]) => Matrix::translate(tx, ty),
        ("scale", &[s]) => Matrix::scale(s, s),
        ("scale", &[sx, sy]) => Matrix::scale(sx, sy),
        ("rotate", &[angle]) => Matrix::rotate(angle),
        ("rotate", &[angle, cx, cy]) => Matrix::rotate_about(angle, Point::new(cx, cy)),
        ("skewX", &[angle]) => Matrix::skew_x(angle),
        ("skewY", &[angle]) => Matrix::skew_y(angle),
        ("matrix" | "translate" | "scale" | "rotate" | "skewX" | "skewY", _) => {
            return Err(invalid());
        }
        _ => {
            return Err(GeometryError::InvalidTransform(format!(
                "unknown transform function `{name}`"
            )));
        }
    };
    Ok(matrix)
}

/// Parses a transform list such as `translate(10 20) rotate(45)`.
///
/// Functions compose left to right, as in SVG. An empty string is the
/// identity.
///
/// # Examples
///
/// ```
/// # use plexus_core::geometry::{Point, transform::parse_transform};
/// let m = parse_transform("translate(10, 0) scale(2)").unwrap();
/// assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
/// ```
pub fn parse_transform(source: &str) -> Result<Matrix, GeometryError> {
    let parsed = functions
        .parse(source)
        .map_err(|e| GeometryError::InvalidTransform(e.to_string()))?;
    parsed
        .iter()
        .try_fold(Matrix::identity(), |acc, (name, args)| {
            Ok(acc.multiply(&to_matrix(name, args)?))
        })
}

/// Like [`parse_transform`], but falls back to the identity on malformed input.
pub fn parse_transform_or_identity(source: &str) -> Matrix {
    parse_transform(source).unwrap_or_else(|err| {
        warn!(source, err:%; "Ignoring invalid transform");
        Matrix::identity()
    })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_empty_is_identity() {
        assert!(parse_transform("").unwrap().is_identity());
        assert!(parse_transform("   ").unwrap().is_identity());
    }

    #[test]
    fn test_single_functions() {
        let p = Point::new(1.0, 2.0);
        assert_eq!(
            parse_transform("translate(5)").unwrap().transform_point(p),
            Point::new(6.0, 2.0)
        );
        assert_eq!(
            parse_transform("scale(2,3)").unwrap().transform_point(p),
            Point::new(2.0, 6.0)
        );
        assert_eq!(
            parse_transform("matrix(1 0 0 1 7 8)").unwrap().transform_point(p),
            Point::new(8.0, 10.0)
        );
    }

    #[test]
    fn test_rotate_about_point() {
        let m = parse_transform("rotate(90 10 10)").unwrap();
        let p = m.transform_point(Point::new(20.0, 10.0));
        assert_approx_eq!(f32, p.x(), 10.0, epsilon = 1e-4);
        assert_approx_eq!(f32, p.y(), 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_composition_order() {
        let m = parse_transform("translate(10, 0) scale(2)").unwrap();
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));
    }

    #[test]
    fn test_scale_is_recovered_by_decomposition() {
        let m = parse_transform("rotate(30) scale(1.5)").unwrap();
        assert_approx_eq!(f32, m.decompose().scale_x, 1.5, epsilon = 1e-4);
    }

    #[test]
    fn test_errors() {
        assert!(parse_transform("translate(1,2,3)").is_err());
        assert!(parse_transform("wobble(1)").is_err());
        assert!(parse_transform("scale(2").is_err());
        assert!(parse_transform_or_identity("scale(2").is_identity());
    }
}
