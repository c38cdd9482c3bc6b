/// 24-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xffffff);

    pub fn r(self) -> u8 {
        ((self.0 >> 16) & 0xff) as u8
    }

    pub fn g(self) -> u8 {
        ((self.0 >> 8) & 0xff) as u8
    }

    pub fn b(self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// CSS-style `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0 & 0xffffff)
    }
}

/// Static image inputs of the Earth layers. Resolved to paths by the caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    DayMap,
    NightMap,
    BumpMap,
    Clouds,
    CloudAlpha,
    Specular,
}

impl TextureSlot {
    pub const ALL: [TextureSlot; 6] = [
        TextureSlot::DayMap,
        TextureSlot::NightMap,
        TextureSlot::BumpMap,
        TextureSlot::Clouds,
        TextureSlot::CloudAlpha,
        TextureSlot::Specular,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            TextureSlot::DayMap => "earth-daymap.jpg",
            TextureSlot::NightMap => "earth-nightmap.jpg",
            TextureSlot::BumpMap => "earth-bump.jpg",
            TextureSlot::Clouds => "earth-cloud.jpg",
            TextureSlot::CloudAlpha => "earthcloudmaptrans.jpg",
            TextureSlot::Specular => "earthspecs.jpg",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Blending {
    Normal,
    Additive,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Material {
    /// Unlit flat color; used by markers and planets.
    Basic { color: Color },
    /// Lit Earth surface.
    Phong {
        map: TextureSlot,
        specular_map: TextureSlot,
        bump_map: TextureSlot,
        bump_scale: f32,
    },
    /// Day/night blend driven by the sun direction.
    NightLights {
        day_map: TextureSlot,
        night_map: TextureSlot,
        sun_direction: [f64; 3],
    },
    Clouds {
        map: TextureSlot,
        alpha_map: TextureSlot,
        opacity: f32,
    },
    /// Rim glow around the limb.
    Fresnel { color: Color },
    Stars { size: f32 },
}

impl Material {
    pub fn blending(&self) -> Blending {
        match self {
            Material::NightLights { .. } | Material::Clouds { .. } | Material::Fresnel { .. } => {
                Blending::Additive
            }
            _ => Blending::Normal,
        }
    }

    pub fn transparent(&self) -> bool {
        self.blending() == Blending::Additive
    }

    /// The flat color, for materials that carry one.
    pub fn color(&self) -> Option<Color> {
        match self {
            Material::Basic { color } | Material::Fresnel { color } => Some(*color),
            _ => None,
        }
    }
}
