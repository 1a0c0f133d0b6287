//! Buffered construction parameters.

use std::collections::hash_map::{self, HashMap};

use crate::types::Variant;

/// Parameter container of a handle.
///
/// Maps parameter names to tagged values. Adding a name twice keeps only
/// the last value. The typed getters return the supplied default when the
/// name is missing or holds a value of another tag.
#[derive(Debug, Clone, Default)]
pub struct Parms {
    entries: HashMap<String, Variant>,
}

macro_rules! typed_getter {
    ($(#[$meta:meta])* $fn:ident, $tag:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn(&self, name: &str, default: $ty) -> $ty {
            match self.entries.get(name) {
                Some(Variant::$tag(v)) => *v,
                _ => default,
            }
        }
    };
}

impl Parms {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, overwriting any previous value of the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<Variant>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Remove every parameter.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Raw lookup.
    pub fn get(&self, name: &str) -> Option<&Variant> {
        self.entries.get(name)
    }

    /// Whether a parameter of this name is buffered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of distinct parameter names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameter is buffered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all parameters in unspecified order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Variant> {
        self.entries.iter()
    }

    typed_getter!(get_bool, Bool, bool);
    typed_getter!(get_int, Int, i32);
    typed_getter!(get_int2, Int2, [i32; 2]);
    typed_getter!(get_int3, Int3, [i32; 3]);
    typed_getter!(get_int4, Int4, [i32; 4]);
    typed_getter!(get_float, Float, f32);
    typed_getter!(get_float2, Float2, [f32; 2]);
    typed_getter!(get_float3, Float3, [f32; 3]);
    typed_getter!(get_float4, Float4, [f32; 4]);
    typed_getter!(
        /// Affine 3x4 transform, row-major.
        get_transform,
        Transform,
        [f32; 12]
    );

    /// String lookup. Returns `default` for a missing or non-string value.
    pub fn get_string<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        match self.entries.get(name) {
            Some(Variant::String(s)) => s.as_str(),
            _ => default,
        }
    }
}

impl<'a> IntoIterator for &'a Parms {
    type Item = (&'a String, &'a Variant);
    type IntoIter = hash_map::Iter<'a, String, Variant>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
