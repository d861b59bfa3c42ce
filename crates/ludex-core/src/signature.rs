//! Filter signatures for staleness detection.

use std::fmt;
use std::sync::Arc;

/// Identifies one combination of filter/sort/search criteria.
///
/// The filtering subsystem derives a signature whenever the criteria change;
/// the windowing engine only ever compares signatures for equality. A fetch
/// result is applied only when the signature captured at fetch start still
/// matches the current one, which is the engine's entire cancellation model.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FilterSignature(Arc<str>);

impl FilterSignature {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::from(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FilterSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FilterSignature {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_is_by_value() {
        let a = FilterSignature::new("platform=snes|sort=title");
        let b = FilterSignature::from("platform=snes|sort=title");
        let c = FilterSignature::new("platform=psx|sort=title");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_clone_is_cheap_and_equal() {
        let a = FilterSignature::new("q=zelda");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.as_str(), "q=zelda");
    }
}
