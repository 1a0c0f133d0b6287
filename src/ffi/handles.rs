//! Opaque handle tokens.
//!
//! A token is a pointer-sized value that names a handle inside a
//! [`Device`](crate::Device). It carries no type information; the only way
//! back to the concrete handle is typed recovery on the device.

use std::fmt;

/// Opaque reference to a handle.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RTHandle {
    _h: u64,
}

impl RTHandle {
    /// Create an invalid (null) handle.
    #[inline]
    pub const fn invalid() -> Self {
        Self { _h: 0 }
    }

    /// Check if this handle is valid (non-zero).
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self._h != 0
    }

    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self { _h: raw }
    }

    /// The raw token value.
    #[inline]
    pub const fn as_raw(&self) -> u64 {
        self._h
    }
}

impl Default for RTHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Debug for RTHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RTHandle({:#x})", self._h)
    }
}

impl fmt::Display for RTHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self._h)
    }
}
