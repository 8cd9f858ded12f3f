//! SVG path-data parsing into tiny-skia paths.
//!
//! Supports the `m/l/h/v/c/s/q/t/z` commands (and their uppercase forms).
//! Elliptical arcs are rejected; the built-in icons and shape layers are
//! authored without them.

use thiserror::Error;
use tiny_skia::{Path, PathBuilder};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathDataError {
    #[error("Unsupported path command '{0}'")]
    Unsupported(char),

    #[error("Invalid number {0:?} in path data")]
    InvalidNumber(String),

    #[error("Path data contains no drawable segments")]
    Empty,
}

/// Parse SVG path data into a path in the same coordinate space.
pub fn parse(data: &str) -> Result<Path, PathDataError> {
    let tokens = tokenize(data);
    let mut pb = PathBuilder::new();

    let mut current = (0.0f32, 0.0f32);
    let mut start = (0.0f32, 0.0f32);
    let mut prev_cubic_ctrl: Option<(f32, f32)> = None;
    let mut prev_quad_ctrl: Option<(f32, f32)> = None;
    let mut i = 0usize;

    fn is_cmd(s: &str) -> bool {
        s.len() == 1 && s.chars().all(|c| c.is_ascii_alphabetic())
    }

    fn num(tokens: &[String], i: usize) -> Result<f32, PathDataError> {
        tokens[i]
            .parse::<f32>()
            .map_err(|_| PathDataError::InvalidNumber(tokens[i].clone()))
    }

    fn reflect(p: (f32, f32), around: (f32, f32)) -> (f32, f32) {
        (2.0 * around.0 - p.0, 2.0 * around.1 - p.1)
    }

    // Number of operands available before the next command token.
    fn operands(tokens: &[String], i: usize, n: usize) -> bool {
        i + n <= tokens.len() && tokens[i..i + n].iter().all(|t| !is_cmd(t))
    }

    while i < tokens.len() {
        if !is_cmd(&tokens[i]) {
            return Err(PathDataError::InvalidNumber(tokens[i].clone()));
        }
        let cmd = tokens[i].chars().next().unwrap_or('Z');
        let rel = cmd.is_ascii_lowercase();
        i += 1;

        let abs = |cur: (f32, f32), x: f32, y: f32| {
            if rel {
                (cur.0 + x, cur.1 + y)
            } else {
                (x, y)
            }
        };

        match cmd.to_ascii_uppercase() {
            'M' => {
                let mut first = true;
                while operands(&tokens, i, 2) {
                    let p = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    i += 2;
                    if first {
                        pb.move_to(p.0, p.1);
                        start = p;
                        first = false;
                    } else {
                        pb.line_to(p.0, p.1);
                    }
                    current = p;
                }
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            'L' => {
                while operands(&tokens, i, 2) {
                    let p = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    i += 2;
                    pb.line_to(p.0, p.1);
                    current = p;
                }
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            'H' => {
                while operands(&tokens, i, 1) {
                    let x = num(&tokens, i)?;
                    i += 1;
                    let nx = if rel { current.0 + x } else { x };
                    pb.line_to(nx, current.1);
                    current.0 = nx;
                }
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            'V' => {
                while operands(&tokens, i, 1) {
                    let y = num(&tokens, i)?;
                    i += 1;
                    let ny = if rel { current.1 + y } else { y };
                    pb.line_to(current.0, ny);
                    current.1 = ny;
                }
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            'C' => {
                while operands(&tokens, i, 6) {
                    let c1 = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    let c2 = abs(current, num(&tokens, i + 2)?, num(&tokens, i + 3)?);
                    let p = abs(current, num(&tokens, i + 4)?, num(&tokens, i + 5)?);
                    i += 6;
                    pb.cubic_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
                    prev_cubic_ctrl = Some(c2);
                    current = p;
                }
                prev_quad_ctrl = None;
            }
            'S' => {
                while operands(&tokens, i, 4) {
                    let c1 = prev_cubic_ctrl
                        .map(|c| reflect(c, current))
                        .unwrap_or(current);
                    let c2 = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    let p = abs(current, num(&tokens, i + 2)?, num(&tokens, i + 3)?);
                    i += 4;
                    pb.cubic_to(c1.0, c1.1, c2.0, c2.1, p.0, p.1);
                    prev_cubic_ctrl = Some(c2);
                    current = p;
                }
                prev_quad_ctrl = None;
            }
            'Q' => {
                while operands(&tokens, i, 4) {
                    let c = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    let p = abs(current, num(&tokens, i + 2)?, num(&tokens, i + 3)?);
                    i += 4;
                    pb.quad_to(c.0, c.1, p.0, p.1);
                    prev_quad_ctrl = Some(c);
                    current = p;
                }
                prev_cubic_ctrl = None;
            }
            'T' => {
                while operands(&tokens, i, 2) {
                    let c = prev_quad_ctrl
                        .map(|c| reflect(c, current))
                        .unwrap_or(current);
                    let p = abs(current, num(&tokens, i)?, num(&tokens, i + 1)?);
                    i += 2;
                    pb.quad_to(c.0, c.1, p.0, p.1);
                    prev_quad_ctrl = Some(c);
                    current = p;
                }
                prev_cubic_ctrl = None;
            }
            'Z' => {
                pb.close();
                current = start;
                prev_cubic_ctrl = None;
                prev_quad_ctrl = None;
            }
            other => return Err(PathDataError::Unsupported(other)),
        }
    }

    pb.finish().ok_or(PathDataError::Empty)
}

/// Split path data into command letters and numeric strings.
///
/// Handles commas/whitespace, signs that begin a new number (`10-5`) and
/// repeated decimal points (`.5.5`), while preserving scientific notation.
fn tokenize(path_data: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in path_data.chars() {
        match ch {
            c if c.is_ascii_alphabetic() && c != 'e' && c != 'E' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(c.to_string());
            }
            ' ' | ',' | '\n' | '\r' | '\t' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '-' | '+' => {
                if !current.is_empty() && !matches!(current.chars().last(), Some('e' | 'E')) {
                    tokens.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            '.' => {
                if current.contains('.') && !current.contains(['e', 'E']) {
                    tokens.push(std::mem::take(&mut current));
                }
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_compact_numbers() {
        assert_eq!(
            tokenize("M10-5l.5.5 1e-2,3"),
            vec!["M", "10", "-5", "l", ".5", ".5", "1e-2", "3"]
        );
    }

    #[test]
    fn test_parse_square() {
        let path = parse("M0 0H10V10H0Z").unwrap();
        let b = path.bounds();
        assert_eq!((b.left(), b.top(), b.right(), b.bottom()), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_parse_relative_curves() {
        let path = parse("m2 2c0 4 4 4 4 0s4-4 4 0q2 2 4 0t4 0z").unwrap();
        assert!(path.bounds().right() >= 18.0);
    }

    #[test]
    fn test_rejects_arcs_and_garbage() {
        assert_eq!(
            parse("M0 0A5 5 0 0 1 10 10"),
            Err(PathDataError::Unsupported('A'))
        );
        assert!(matches!(parse("0 0 L 1 1"), Err(PathDataError::InvalidNumber(_))));
        assert_eq!(parse(""), Err(PathDataError::Empty));
    }
}
