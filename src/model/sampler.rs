use std::fmt;

/// Semantic role of a texture on a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
    Normal,
    Height,
}

impl TextureKind {
    pub const ALL: [TextureKind; 4] = [TextureKind::Diffuse, TextureKind::Specular, TextureKind::Normal, TextureKind::Height];

    /// Sampler-name prefix shaders expect for this kind
    pub fn uniform_prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
            TextureKind::Normal => "texture_normal",
            TextureKind::Height => "texture_height",
        }
    }

    fn index(self) -> usize {
        match self {
            TextureKind::Diffuse => 0,
            TextureKind::Specular => 1,
            TextureKind::Normal => 2,
            TextureKind::Height => 3,
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uniform_prefix())
    }
}

/// Turns the sequence of texture kinds bound by one draw into sampler
/// uniform names. A fresh resolver is used for every draw.
pub trait SamplerNameResolver {
    fn next_name(&mut self, kind: TextureKind) -> String;
}

/// `texture_<kind><n>`, with `n` counted per kind from 1.
#[derive(Debug, Default, Clone)]
pub struct PerKindCounter {
    counts: [u32; 4],
}

impl PerKindCounter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SamplerNameResolver for PerKindCounter {
    fn next_name(&mut self, kind: TextureKind) -> String {
        let count = &mut self.counts[kind.index()];
        *count += 1;
        format!("{}{}", kind.uniform_prefix(), count)
    }
}
