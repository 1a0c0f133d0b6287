//! Type definitions and enums.

/// Tag of a [`Variant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Bool,
    Int,
    Int2,
    Int3,
    Int4,
    Float,
    Float2,
    Float3,
    Float4,
    String,
    Transform,
}

/// A tagged parameter value.
///
/// Values are stored as given; lookups never coerce between tags.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Bool(bool),
    Int(i32),
    Int2([i32; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Float(f32),
    Float2([f32; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    String(String),
    /// Affine 3x4 matrix, row-major.
    Transform([f32; 12]),
}

impl Variant {
    /// The tag of this value.
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Bool(_) => VariantKind::Bool,
            Variant::Int(_) => VariantKind::Int,
            Variant::Int2(_) => VariantKind::Int2,
            Variant::Int3(_) => VariantKind::Int3,
            Variant::Int4(_) => VariantKind::Int4,
            Variant::Float(_) => VariantKind::Float,
            Variant::Float2(_) => VariantKind::Float2,
            Variant::Float3(_) => VariantKind::Float3,
            Variant::Float4(_) => VariantKind::Float4,
            Variant::String(_) => VariantKind::String,
            Variant::Transform(_) => VariantKind::Transform,
        }
    }
}

macro_rules! variant_from {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Variant::$tag(v)
                }
            }
        )*
    };
}

variant_from! {
    bool => Bool,
    i32 => Int,
    [i32; 2] => Int2,
    [i32; 3] => Int3,
    [i32; 4] => Int4,
    f32 => Float,
    [f32; 2] => Float2,
    [f32; 3] => Float3,
    [f32; 4] => Float4,
    String => String,
    [f32; 12] => Transform,
}

impl From<&str> for Variant {
    fn from(v: &str) -> Self {
        Variant::String(v.to_owned())
    }
}

/// Options for creating a [`Device`](crate::Device).
#[derive(Debug, Clone)]
pub struct DeviceOptions {
    /// Label attached to every log event of the device (default: "default").
    pub name: String,
    /// Maximum number of live handles (None for no limit).
    pub handle_limit: Option<usize>,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            handle_limit: None,
        }
    }
}
