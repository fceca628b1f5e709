use std::ops::RangeInclusive;

/// Default bound for the depth guard
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Tuning knobs for document generation
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Nesting depth at which generation is aborted as an internal error
    pub max_depth: usize,
    /// Range the ceiling for `maxOccurs="unbounded"` is drawn from
    pub unbounded_ceiling: RangeInclusive<usize>,
    /// Probability of emitting an attribute that is not required
    pub optional_attribute_probability: f64,
    /// Length free text is cut to when no `maxLength` applies
    pub default_max_length: usize,
    /// Integer range used when no bounds are declared
    pub integer_range: RangeInclusive<i64>,
    /// Upper bound on the instances emitted for one particle, whatever the
    /// schema declares
    pub max_occurrences: usize,
    /// Upper bound on generated literals, applied to pattern digit counts and
    /// minimum lengths
    pub max_literal_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            unbounded_ceiling: 2..=4,
            optional_attribute_probability: 0.5,
            default_max_length: 50,
            integer_range: 1..=1000,
            max_occurrences: 1000,
            max_literal_length: 4096,
        }
    }
}

impl GeneratorConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_unbounded_ceiling(mut self, ceiling: RangeInclusive<usize>) -> Self {
        self.unbounded_ceiling = ceiling;
        self
    }

    /// Clamped to `0.0..=1.0`
    #[must_use]
    pub fn with_optional_attribute_probability(mut self, probability: f64) -> Self {
        self.optional_attribute_probability = if probability.is_nan() {
            0.5
        } else {
            probability.clamp(0.0, 1.0)
        };
        self
    }

    #[must_use]
    pub fn with_default_max_length(mut self, length: usize) -> Self {
        self.default_max_length = length;
        self
    }

    #[must_use]
    pub fn with_integer_range(mut self, range: RangeInclusive<i64>) -> Self {
        self.integer_range = range;
        self
    }

    #[must_use]
    pub fn with_max_occurrences(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = max_occurrences;
        self
    }

    #[must_use]
    pub fn with_max_literal_length(mut self, length: usize) -> Self {
        self.max_literal_length = length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.unbounded_ceiling, 2..=4);
        assert_eq!(config.default_max_length, 50);
        assert_eq!(config.integer_range, 1..=1000);
        assert_eq!(config.max_occurrences, 1000);
        assert_eq!(config.max_literal_length, 4096);
    }

    #[test]
    fn test_probability_clamped() {
        let config = GeneratorConfig::default().with_optional_attribute_probability(3.0);
        assert_eq!(config.optional_attribute_probability, 1.0);

        let config = GeneratorConfig::default().with_optional_attribute_probability(f64::NAN);
        assert_eq!(config.optional_attribute_probability, 0.5);
    }
}
