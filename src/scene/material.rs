use crate::math::Color;
use crate::traits::SurfaceMaterial;

/// Shading model of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Flat color, ignores lights
    Basic,
    /// Diffuse only
    Lambert,
    /// Diffuse plus Blinn-Phong specular
    Phong,
    /// Metal/roughness physically based model
    Standard,
}

impl MaterialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialKind::Basic => "basic",
            MaterialKind::Lambert => "lambert",
            MaterialKind::Phong => "phong",
            MaterialKind::Standard => "standard",
        }
    }
}

/// Surface response to light
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub kind: MaterialKind,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl Material {
    /// Unlit material
    pub fn basic(color: Color) -> Self {
        Self {
            name: None,
            kind: MaterialKind::Basic,
            color,
            roughness: 1.0,
            metalness: 0.0,
        }
    }

    pub fn lambert(color: Color) -> Self {
        Self {
            kind: MaterialKind::Lambert,
            ..Self::basic(color)
        }
    }

    pub fn phong(color: Color) -> Self {
        Self {
            kind: MaterialKind::Phong,
            roughness: 0.3,
            ..Self::basic(color)
        }
    }

    /// Physically based material; roughness and metalness are clamped to 0..1
    pub fn standard(color: Color, roughness: f32, metalness: f32) -> Self {
        Self {
            name: None,
            kind: MaterialKind::Standard,
            color,
            roughness: roughness.clamp(0.0, 1.0),
            metalness: metalness.clamp(0.0, 1.0),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_standard(&self) -> bool {
        self.kind == MaterialKind::Standard
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::standard(Color::WHITE, 1.0, 0.0)
    }
}

impl SurfaceMaterial for Material {
    fn is_light_reactive(&self) -> bool {
        self.is_standard()
    }

    fn base_color(&self) -> Color {
        self.color
    }

    fn light_reactive(color: Color, roughness: f32, metalness: f32) -> Self {
        Self::standard(color, roughness, metalness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_standard_is_light_reactive() {
        assert!(!Material::basic(Color::RED).is_light_reactive());
        assert!(!Material::lambert(Color::RED).is_light_reactive());
        assert!(!Material::phong(Color::RED).is_light_reactive());
        assert!(Material::standard(Color::RED, 0.2, 0.8).is_light_reactive());
    }

    #[test]
    fn test_standard_clamps_factors() {
        let material = Material::standard(Color::WHITE, 1.5, -0.25);
        assert_eq!(material.roughness, 1.0);
        assert_eq!(material.metalness, 0.0);
    }

    #[test]
    fn test_light_reactive_constructor() {
        let material = Material::light_reactive(Color::RED, 0.5, 0.5);
        assert_eq!(material.kind, MaterialKind::Standard);
        assert_eq!(material.base_color(), Color::RED);
        assert_eq!(material.roughness, 0.5);
        assert_eq!(material.metalness, 0.5);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(MaterialKind::Basic.as_str(), "basic");
        assert_eq!(MaterialKind::Standard.as_str(), "standard");
    }
}
