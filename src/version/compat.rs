//! Compatibility range evaluation
//!
//! Add-on versions declare, per application, the `min`/`max` application
//! versions they run on. A target application version is compatible when
//! `min <= target <= max`.

use tracing::warn;

use crate::version::error::{CompatibilityError, ParseError};
use crate::version::parse::Version;

/// Inclusive `{min, max}` range of application versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompatibilityRange {
    pub min: Version,
    pub max: Version,
}

impl CompatibilityRange {
    pub fn new(min: Version, max: Version) -> Self {
        Self { min, max }
    }

    /// Parse both bounds (wildcards allowed)
    pub fn parse(min: &str, max: &str) -> Result<Self, ParseError> {
        Ok(Self::new(Version::parse(min)?, Version::parse(max)?))
    }

    pub fn contains(&self, target: &Version) -> bool {
        self.min <= *target && self.max >= *target
    }
}

/// Check whether `target` falls inside `range`
pub fn is_compatible(target: &Version, range: &CompatibilityRange) -> bool {
    range.contains(target)
}

/// Something that may declare per-application compatibility bounds
pub trait VersionEntry {
    /// Raw `(min, max)` bounds declared for `app`, if any
    fn compatibility(&self, app: &str) -> Option<(&str, &str)>;
}

/// Compatibility checks bound to one application key (e.g. `thunderbird`)
#[derive(Debug, Clone)]
pub struct CompatibilityEvaluator {
    app: String,
}

impl CompatibilityEvaluator {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// Resolve the range an entry declares for this application
    pub fn range_for<E: VersionEntry + ?Sized>(
        &self,
        entry: &E,
    ) -> Result<CompatibilityRange, CompatibilityError> {
        let (min, max) = entry
            .compatibility(&self.app)
            .ok_or_else(|| CompatibilityError::Missing {
                app: self.app.clone(),
            })?;
        Ok(CompatibilityRange::parse(min, max)?)
    }

    /// Whether the entry is compatible with `target`.
    ///
    /// Entries without data for this application, or with unparseable
    /// bounds, are not compatible.
    pub fn is_compatible<E: VersionEntry + ?Sized>(&self, target: &Version, entry: &E) -> bool {
        match self.range_for(entry) {
            Ok(range) => range.contains(target),
            Err(CompatibilityError::Missing { .. }) => false,
            Err(e) => {
                warn!("Skipping compatibility check: {}", e);
                false
            }
        }
    }

    /// Whether `target` is compatible with the current version or with any
    /// historical version that declares data for this application.
    ///
    /// A record without qualifying history is judged on its current version
    /// alone.
    pub fn is_compatible_with_any<C, H>(&self, target: &Version, current: &C, history: &[H]) -> bool
    where
        C: VersionEntry + ?Sized,
        H: VersionEntry,
    {
        self.is_compatible(target, current)
            || history
                .iter()
                .filter(|entry| entry.compatibility(&self.app).is_some())
                .any(|entry| self.is_compatible(target, entry))
    }
}

/// An application version the reports check add-ons against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVersion {
    pub version: Version,
    /// Version string as published
    pub raw: String,
    /// Human readable channel name, e.g. `Release`
    pub name: String,
}

impl TargetVersion {
    pub fn parse(raw: &str, name: &str) -> Result<Self, ParseError> {
        Ok(Self {
            version: Version::parse(raw)?,
            raw: raw.to_string(),
            name: name.to_string(),
        })
    }
}
