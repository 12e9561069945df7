//! Build mode.

/// Which kind of build is running; consulted by the `enabled` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    /// Production-like build (minified, deployable output).
    pub production: bool,
}

impl BuildMode {
    pub const PRODUCTION: Self = Self { production: true };

    pub const DEVELOPMENT: Self = Self { production: false };

    #[inline]
    pub const fn is_dev(&self) -> bool {
        !self.production
    }
}
