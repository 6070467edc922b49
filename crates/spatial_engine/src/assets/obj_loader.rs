//! Wavefront OBJ model loader
//!
//! Parses the OBJ subset the engine consumes: `v`, `vn`, `vt`, `f`
//! (triangles only), `mtllib`, and `usemtl`. Each unique
//! `(vertex, texture, normal)` corner combination is deduplicated into one
//! shared attribute slot so a vertex reused with the same normal and UV
//! across faces occupies one render vertex, while the same vertex at a
//! hard edge (different normal) gets its own slot. Bounding extents
//! accumulate as vertices are parsed and feed the collision system.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::foundation::math::{Vec2, Vec3, Vec4};

/// Homogeneous W for 3-component vertex directives.
const W_DEFAULT: f32 = 1.0;

/// Components of a position slot in the flattened stream (x, y, z, w).
pub const VERTEX_SIZE: usize = 4;

/// Components of a normal slot in the flattened stream.
pub const NORMAL_SIZE: usize = 3;

/// Components of a texture-coordinate slot in the flattened stream.
pub const TEX_COORD_SIZE: usize = 2;

/// Material group used for faces appearing before any `usemtl`.
const DEFAULT_MATERIAL: &str = "default";

/// OBJ parse errors
#[derive(Error, Debug)]
pub enum ObjError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A directive carried a token that does not parse as a float.
    #[error("invalid {directive} definition: '{token}' is not a float")]
    InvalidFloat {
        /// Directive name (`v`, `vn`, `vt`).
        directive: &'static str,
        /// The offending token.
        token: String,
    },

    /// A directive had the wrong number of components.
    #[error("invalid {directive} definition: expected {expected} components, you gave {found}")]
    ComponentCount {
        /// Directive name.
        directive: &'static str,
        /// Accepted component counts, e.g. `"3 or 4"`.
        expected: &'static str,
        /// Number of components found.
        found: usize,
    },

    /// A face had a corner count other than three.
    #[error("invalid face definition: a face has 3 corners, you gave {0}")]
    FaceCornerCount(usize),

    /// A face corner descriptor did not parse as 1-based indices.
    #[error("invalid face definition: '{0}' is not a valid corner descriptor")]
    InvalidCorner(String),

    /// A face corner referenced an attribute that was never declared.
    #[error("face corner '{0}' references an undeclared attribute")]
    IndexOutOfRange(String),

    /// A `mtllib` or `usemtl` directive was missing its name.
    #[error("{0} directive missing a name")]
    MissingName(&'static str),
}

/// One deduplicated `(vertex, texture, normal)` attribute combination.
///
/// Indices are 0-based into [`Model::vertices`], [`Model::tex_coords`],
/// and [`Model::normals`]; `None` marks a component the corner descriptor
/// omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    /// Position index.
    pub vertex: usize,
    /// Texture-coordinate index, when the corner carried one.
    pub texture: Option<usize>,
    /// Normal index, when the corner carried one.
    pub normal: Option<usize>,
}

/// Triangles sharing one material.
#[derive(Debug, Clone)]
pub struct FaceGroup {
    /// Material name from `usemtl` (or `"default"`).
    pub material: String,
    /// Triangles as triples of indices into the attribute table.
    pub faces: Vec<[u32; 3]>,
}

/// A parsed model: deduplicated attribute streams plus per-material
/// face groups and accumulated bounding extents.
#[derive(Debug, Clone, Default)]
pub struct Model {
    /// Positions as parsed from `v` directives (homogeneous).
    pub vertices: Vec<Vec4>,
    /// Normals as parsed from `vn` directives.
    pub normals: Vec<Vec3>,
    /// Texture coordinates as parsed from `vt` directives.
    pub tex_coords: Vec<Vec2>,
    /// The dedup table; no two entries share the same triple.
    pub attribute_keys: Vec<AttributeKey>,
    /// Face groups in first-use material order.
    pub groups: Vec<FaceGroup>,
    /// Material library names referenced by `mtllib` directives.
    pub material_libraries: Vec<String>,
    bounds: Option<(Vec3, Vec3)>,
}

impl Model {
    /// Parse OBJ text into a model.
    ///
    /// # Errors
    ///
    /// Any malformed directive aborts the load with a descriptive
    /// [`ObjError`]; no partially parsed model is produced.
    pub fn parse(text: &str) -> Result<Self, ObjError> {
        let mut model = Self::default();
        let mut slots: HashMap<AttributeKey, u32> = HashMap::new();
        let mut current_group: Option<usize> = None;

        for line in text.lines() {
            // A token starting with '#' comments out the rest of the line
            let tokens: Vec<&str> = line
                .split_whitespace()
                .take_while(|token| !token.starts_with('#'))
                .collect();
            let Some((&directive, args)) = tokens.split_first() else {
                continue;
            };

            match directive {
                "v" => model.add_vertex(args)?,
                "vn" => model.add_normal(args)?,
                "vt" => model.add_tex_coord(args)?,
                "f" => {
                    let group = model.group_for(&mut current_group, None);
                    let face = Self::parse_face(
                        args,
                        &mut slots,
                        &mut model.attribute_keys,
                        model.vertices.len(),
                        model.tex_coords.len(),
                        model.normals.len(),
                    )?;
                    model.groups[group].faces.push(face);
                }
                "usemtl" => {
                    let name = args
                        .first()
                        .ok_or(ObjError::MissingName("usemtl"))?;
                    model.group_for(&mut current_group, Some(name));
                }
                "mtllib" => {
                    let name = args
                        .first()
                        .ok_or(ObjError::MissingName("mtllib"))?;
                    model.material_libraries.push((*name).to_string());
                }
                // Unrecognized directives are silently skipped
                _ => {}
            }
        }

        Ok(model)
    }

    /// Read and parse an OBJ file.
    ///
    /// # Errors
    ///
    /// [`ObjError::Io`] when the file cannot be read, otherwise any parse
    /// error from [`Self::parse`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ObjError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Accumulated `(min, max)` over all parsed vertex positions, or
    /// `None` for a model with no vertices.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds
    }

    /// Number of deduplicated render-vertex slots.
    pub fn attribute_count(&self) -> usize {
        self.attribute_keys.len()
    }

    /// Total triangle count across all face groups.
    pub fn face_count(&self) -> usize {
        self.groups.iter().map(|group| group.faces.len()).sum()
    }

    /// Flattened positions, [`VERTEX_SIZE`] floats per attribute slot.
    pub fn position_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.attribute_keys.len() * VERTEX_SIZE);
        for key in &self.attribute_keys {
            let vertex = self.vertices[key.vertex];
            data.extend_from_slice(&[vertex.x, vertex.y, vertex.z, vertex.w]);
        }
        data
    }

    /// Flattened normals, [`NORMAL_SIZE`] floats per attribute slot.
    /// Slots whose corner omitted a normal are zero-filled.
    pub fn normal_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.attribute_keys.len() * NORMAL_SIZE);
        for key in &self.attribute_keys {
            match key.normal {
                Some(index) => {
                    let normal = self.normals[index];
                    data.extend_from_slice(&[normal.x, normal.y, normal.z]);
                }
                None => data.extend_from_slice(&[0.0; NORMAL_SIZE]),
            }
        }
        data
    }

    /// Flattened texture coordinates, [`TEX_COORD_SIZE`] floats per
    /// attribute slot, zero-filled where omitted.
    pub fn tex_coord_data(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.attribute_keys.len() * TEX_COORD_SIZE);
        for key in &self.attribute_keys {
            match key.texture {
                Some(index) => {
                    let uv = self.tex_coords[index];
                    data.extend_from_slice(&[uv.x, uv.y]);
                }
                None => data.extend_from_slice(&[0.0; TEX_COORD_SIZE]),
            }
        }
        data
    }

    /// Flattened triangle indices across all face groups, in group order.
    pub fn index_data(&self) -> Vec<u32> {
        let mut data = Vec::with_capacity(self.face_count() * 3);
        for group in &self.groups {
            for face in &group.faces {
                data.extend_from_slice(face);
            }
        }
        data
    }

    fn add_vertex(&mut self, args: &[&str]) -> Result<(), ObjError> {
        if args.len() != 3 && args.len() != 4 {
            return Err(ObjError::ComponentCount {
                directive: "v",
                expected: "3 or 4",
                found: args.len(),
            });
        }
        let mut vertex = Vec4::new(0.0, 0.0, 0.0, W_DEFAULT);
        for (i, token) in args.iter().enumerate() {
            vertex[i] = Self::parse_float("v", token)?;
        }
        self.accumulate_bounds(vertex.xyz());
        self.vertices.push(vertex);
        Ok(())
    }

    fn add_normal(&mut self, args: &[&str]) -> Result<(), ObjError> {
        if args.len() != 3 {
            return Err(ObjError::ComponentCount {
                directive: "vn",
                expected: "3",
                found: args.len(),
            });
        }
        self.normals.push(Vec3::new(
            Self::parse_float("vn", args[0])?,
            Self::parse_float("vn", args[1])?,
            Self::parse_float("vn", args[2])?,
        ));
        Ok(())
    }

    fn add_tex_coord(&mut self, args: &[&str]) -> Result<(), ObjError> {
        if args.len() != 2 {
            return Err(ObjError::ComponentCount {
                directive: "vt",
                expected: "2",
                found: args.len(),
            });
        }
        self.tex_coords.push(Vec2::new(
            Self::parse_float("vt", args[0])?,
            Self::parse_float("vt", args[1])?,
        ));
        Ok(())
    }

    fn parse_float(directive: &'static str, token: &str) -> Result<f32, ObjError> {
        token.parse().map_err(|_| ObjError::InvalidFloat {
            directive,
            token: token.to_string(),
        })
    }

    /// Index of the active face group, creating the group on first use.
    /// `switch_to` starts a group for a newly selected material.
    fn group_for(&mut self, current: &mut Option<usize>, switch_to: Option<&str>) -> usize {
        if let Some(name) = switch_to {
            if let Some(index) = self.groups.iter().position(|g| g.material == name) {
                *current = Some(index);
            } else {
                self.groups.push(FaceGroup {
                    material: name.to_string(),
                    faces: Vec::new(),
                });
                *current = Some(self.groups.len() - 1);
            }
        } else if current.is_none() {
            self.groups.push(FaceGroup {
                material: DEFAULT_MATERIAL.to_string(),
                faces: Vec::new(),
            });
            *current = Some(self.groups.len() - 1);
        }
        // current is always Some here
        current.unwrap_or(0)
    }

    fn parse_face(
        args: &[&str],
        slots: &mut HashMap<AttributeKey, u32>,
        keys: &mut Vec<AttributeKey>,
        vertex_count: usize,
        tex_coord_count: usize,
        normal_count: usize,
    ) -> Result<[u32; 3], ObjError> {
        if args.len() != 3 {
            return Err(ObjError::FaceCornerCount(args.len()));
        }
        let mut face = [0u32; 3];
        for (slot, corner) in face.iter_mut().zip(args) {
            let key = Self::parse_corner(corner)?;
            if key.vertex >= vertex_count
                || key.texture.is_some_and(|t| t >= tex_coord_count)
                || key.normal.is_some_and(|n| n >= normal_count)
            {
                return Err(ObjError::IndexOutOfRange((*corner).to_string()));
            }
            *slot = match slots.get(&key) {
                Some(&index) => index,
                None => {
                    let index =
                        u32::try_from(keys.len()).map_err(|_| {
                            ObjError::IndexOutOfRange((*corner).to_string())
                        })?;
                    keys.push(key);
                    slots.insert(key, index);
                    index
                }
            };
        }
        Ok(face)
    }

    /// Parse one `v`, `v/t`, `v//n`, or `v/t/n` corner descriptor into
    /// 0-based indices.
    fn parse_corner(corner: &str) -> Result<AttributeKey, ObjError> {
        let bad = || ObjError::InvalidCorner(corner.to_string());
        let mut fields = corner.split('/');

        let vertex = fields
            .next()
            .and_then(|t| Self::parse_index(t))
            .ok_or_else(bad)?;
        let texture = match fields.next() {
            None | Some("") => None,
            Some(t) => Some(Self::parse_index(t).ok_or_else(bad)?),
        };
        let normal = match fields.next() {
            None | Some("") => None,
            Some(t) => Some(Self::parse_index(t).ok_or_else(bad)?),
        };
        if fields.next().is_some() {
            return Err(bad());
        }

        Ok(AttributeKey {
            vertex,
            texture,
            normal,
        })
    }

    /// 1-based OBJ index to 0-based, rejecting zero.
    fn parse_index(token: &str) -> Option<usize> {
        token.parse::<usize>().ok()?.checked_sub(1)
    }

    fn accumulate_bounds(&mut self, point: Vec3) {
        self.bounds = Some(match self.bounds {
            None => (point, point),
            Some((min, max)) => (min.inf(&point), max.sup(&point)),
        });
    }
}
