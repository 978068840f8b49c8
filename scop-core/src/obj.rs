/// Wavefront OBJ parser for positions, texture coordinates, normals and faces
use std::fs;
use std::path::Path;

use log::{debug, info, trace};
use nalgebra::{Point3, Vector3};
use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{pair, preceded},
    IResult,
};

use crate::error::{ParseError, Result};
use crate::geometry::{Face, FaceVertex, Model, TexCoord};

/// Read and parse an OBJ file. The path becomes the model's object name.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)?;

    let mut model = parse_obj(&source)?;
    model.object_name = path.display().to_string();

    info!(
        "Loaded {}: {} vertices, {} faces",
        model.object_name,
        model.vertices.len(),
        model.faces.len()
    );
    Ok(model)
}

/// Parse OBJ source text.
///
/// Unknown directives are ignored. The first malformed record aborts the
/// whole parse; a partially filled model is never returned.
pub fn parse_obj(input: &str) -> Result<Model> {
    let mut model = Model::new();
    let mut ignored = 0usize;

    for (index, line) in input.lines().enumerate() {
        if !parse_line(line, index + 1, &mut model)? {
            ignored += 1;
        }
    }

    debug!(
        "Parsed OBJ: {} vertices, {} texture coordinates, {} normals, {} faces ({} lines skipped)",
        model.vertices.len(),
        model.tex_coords.len(),
        model.normals.len(),
        model.faces.len(),
        ignored
    );
    Ok(model)
}

/// Dispatch one line on its prefix. Returns `false` for lines that carry no
/// geometry (blank, comment, or unhandled directive).
fn parse_line(line: &str, line_no: usize, model: &mut Model) -> Result<bool> {
    // Strip trailing comment
    let content = line.split('#').next().unwrap_or_default();
    let mut fields = content.split_whitespace();

    let Some(prefix) = fields.next() else {
        return Ok(false);
    };
    let fields: Vec<&str> = fields.collect();

    match prefix {
        "v" => {
            let [x, y, z] = parse_numbers::<3>(&fields, "v", line_no)?;
            model.vertices.push(Point3::new(x, y, z));
        }
        "vt" => {
            let [u, v] = parse_numbers::<2>(&fields, "vt", line_no)?;
            let w = match fields.get(2) {
                Some(token) => parse_number(token, line_no)?,
                None => 0.0,
            };
            model.tex_coords.push(TexCoord::new(u, v, w));
        }
        "vn" => {
            let [x, y, z] = parse_numbers::<3>(&fields, "vn", line_no)?;
            model.normals.push(Vector3::new(x, y, z));
        }
        "f" => {
            let corners = fields
                .iter()
                .map(|token| parse_face_vertex(token, line_no))
                .collect::<Result<Vec<_>>>()?;
            model.faces.push(Face::new(corners));
        }
        other => {
            trace!("line {}: ignoring `{}` directive", line_no, other);
            return Ok(false);
        }
    }

    Ok(true)
}

/// Parse the first `N` fields as floats; extra fields are ignored.
fn parse_numbers<const N: usize>(
    fields: &[&str],
    record: &'static str,
    line_no: usize,
) -> Result<[f32; N]> {
    if fields.len() < N {
        return Err(ParseError::MissingField {
            line: line_no,
            record,
            expected: N,
            found: fields.len(),
        });
    }

    let mut values = [0.0; N];
    for (value, token) in values.iter_mut().zip(fields) {
        *value = parse_number(token, line_no)?;
    }
    Ok(values)
}

fn parse_number(token: &str, line_no: usize) -> Result<f32> {
    number(token)
        .map(|(_, value)| value)
        .map_err(|_| ParseError::InvalidNumber {
            line: line_no,
            token: token.to_string(),
        })
}

fn number(input: &str) -> IResult<&str, f32> {
    all_consuming(float)(input)
}

/// Raw 1-based indices of a face corner: vertex, texture, normal
type RawFaceVertex = (i64, Option<i64>, Option<i64>);

/// `v`, `v/t`, `v//n` or `v/t/n`. Empty texture or normal slots are absent.
fn face_vertex(input: &str) -> IResult<&str, RawFaceVertex> {
    type Slots = (Option<i64>, Option<Option<i64>>);
    let parsed: IResult<&str, (i64, Option<Slots>)> = all_consuming(pair(
        integer,
        opt(preceded(
            char('/'),
            pair(opt(integer), opt(preceded(char('/'), opt(integer)))),
        )),
    ))(input);
    let (rest, (vertex, tail)) = parsed?;

    let (tex_coord, normal) = match tail {
        Some((tex_coord, normal)) => (tex_coord, normal.flatten()),
        None => (None, None),
    };
    Ok((rest, (vertex, tex_coord, normal)))
}

fn parse_face_vertex(token: &str, line_no: usize) -> Result<FaceVertex> {
    let (_, (vertex, tex_coord, normal)) =
        face_vertex(token).map_err(|_| ParseError::InvalidFaceRef {
            line: line_no,
            token: token.to_string(),
        })?;

    let to_zero_based = |index: i64| -> Result<usize> {
        if index < 1 {
            return Err(ParseError::UnsupportedIndex {
                line: line_no,
                token: token.to_string(),
                index,
            });
        }
        usize::try_from(index - 1).map_err(|_| ParseError::InvalidFaceRef {
            line: line_no,
            token: token.to_string(),
        })
    };

    Ok(FaceVertex::new(
        to_zero_based(vertex)?,
        tex_coord.map(to_zero_based).transpose()?,
        normal.map(to_zero_based).transpose()?,
    ))
}
