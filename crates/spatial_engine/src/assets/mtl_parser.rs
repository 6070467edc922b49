//! MTL (Material Template Library) file parser
//!
//! Parses the MTL subset referenced by OBJ `mtllib` directives: Phong
//! color terms, shininess, and the diffuse texture path.

use std::collections::HashMap;

use thiserror::Error;

use crate::foundation::math::Vec3;

/// MTL parse errors
#[derive(Error, Debug)]
pub enum MtlError {
    /// A directive appeared before any `newmtl`.
    #[error("line {line}: '{directive}' before any newmtl")]
    NoCurrentMaterial {
        /// 1-based line number.
        line: usize,
        /// The offending directive.
        directive: String,
    },

    /// A directive was missing a value.
    #[error("line {line}: {directive} missing value")]
    MissingValue {
        /// 1-based line number.
        line: usize,
        /// The offending directive.
        directive: String,
    },

    /// A directive carried a non-numeric token.
    #[error("line {line}: {directive} invalid value '{token}'")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// The offending directive.
        directive: String,
        /// The bad token.
        token: String,
    },
}

/// Parsed material data (Wavefront Phong model)
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    /// Material name from `newmtl`.
    pub name: String,
    /// Ambient color (Ka).
    pub ambient: Vec3,
    /// Diffuse color (Kd).
    pub diffuse: Vec3,
    /// Specular color (Ks).
    pub specular: Vec3,
    /// Emission color (Ke).
    pub emission: Vec3,
    /// Specular exponent (Ns).
    pub shininess: f32,
    /// Diffuse texture path (map_Ka).
    pub texture: Option<String>,
}

impl Default for MtlMaterial {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::new(1.0, 1.0, 1.0),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(0.5, 0.5, 0.5),
            emission: Vec3::new(0.0, 0.0, 0.0),
            shininess: 0.0,
            texture: None,
        }
    }
}

/// MTL file parser
pub struct MtlParser;

impl MtlParser {
    /// Parse MTL text into a map of material name to material data.
    /// Unknown directives and comments are silently skipped.
    ///
    /// # Errors
    ///
    /// [`MtlError`] identifying the line and directive that failed.
    pub fn parse(contents: &str) -> Result<HashMap<String, MtlMaterial>, MtlError> {
        let mut materials = HashMap::new();
        let mut current: Option<MtlMaterial> = None;

        for (index, line) in contents.lines().enumerate() {
            let line_num = index + 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let Some(directive) = tokens.next() else {
                continue;
            };

            match directive {
                "newmtl" => {
                    if let Some(material) = current.take() {
                        materials.insert(material.name.clone(), material);
                    }
                    let name = tokens.next().ok_or_else(|| MtlError::MissingValue {
                        line: line_num,
                        directive: directive.to_string(),
                    })?;
                    current = Some(MtlMaterial {
                        name: name.to_string(),
                        ..Default::default()
                    });
                }
                "Ka" => {
                    let value = Self::parse_vec3(&mut tokens, line_num, directive)?;
                    Self::current_mut(&mut current, line_num, directive)?.ambient = value;
                }
                "Kd" => {
                    let value = Self::parse_vec3(&mut tokens, line_num, directive)?;
                    Self::current_mut(&mut current, line_num, directive)?.diffuse = value;
                }
                "Ks" => {
                    let value = Self::parse_vec3(&mut tokens, line_num, directive)?;
                    Self::current_mut(&mut current, line_num, directive)?.specular = value;
                }
                "Ke" => {
                    let value = Self::parse_vec3(&mut tokens, line_num, directive)?;
                    Self::current_mut(&mut current, line_num, directive)?.emission = value;
                }
                "Ns" => {
                    let value = Self::parse_f32(&mut tokens, line_num, directive)?;
                    Self::current_mut(&mut current, line_num, directive)?.shininess = value;
                }
                "map_Ka" => {
                    let path: Vec<&str> = tokens.collect();
                    if path.is_empty() {
                        return Err(MtlError::MissingValue {
                            line: line_num,
                            directive: directive.to_string(),
                        });
                    }
                    Self::current_mut(&mut current, line_num, directive)?.texture =
                        Some(path.join(" "));
                }
                _ => {}
            }
        }

        if let Some(material) = current {
            materials.insert(material.name.clone(), material);
        }

        Ok(materials)
    }

    fn current_mut<'a>(
        current: &'a mut Option<MtlMaterial>,
        line: usize,
        directive: &str,
    ) -> Result<&'a mut MtlMaterial, MtlError> {
        current.as_mut().ok_or_else(|| MtlError::NoCurrentMaterial {
            line,
            directive: directive.to_string(),
        })
    }

    fn parse_vec3<'a, I>(tokens: &mut I, line: usize, directive: &str) -> Result<Vec3, MtlError>
    where
        I: Iterator<Item = &'a str>,
    {
        let r = Self::parse_f32(tokens, line, directive)?;
        let g = Self::parse_f32(tokens, line, directive)?;
        let b = Self::parse_f32(tokens, line, directive)?;
        Ok(Vec3::new(r, g, b))
    }

    fn parse_f32<'a, I>(tokens: &mut I, line: usize, directive: &str) -> Result<f32, MtlError>
    where
        I: Iterator<Item = &'a str>,
    {
        let token = tokens.next().ok_or_else(|| MtlError::MissingValue {
            line,
            directive: directive.to_string(),
        })?;
        token.parse().map_err(|_| MtlError::InvalidValue {
            line,
            directive: directive.to_string(),
            token: token.to_string(),
        })
    }
}
