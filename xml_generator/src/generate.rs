//! Value resolution: built-in type plus constraints to one literal.

use crate::config::GeneratorConfig;
use crate::fake_values::ValueSynthesizer;
use crate::restriction::ConstraintRecord;
use once_cell::sync::Lazy;
use rand::Rng;
use rand::seq::IndexedRandom;
use regex::Regex;
use tracing::warn;

/// XML Schema built-in datatypes with a generation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    String,
    NormalizedString,
    Token,
    Name,
    NCName,
    NMToken,
    Id,
    IdRef,
    Entity,
    QName,
    AnyUri,
    Language,
    Integer,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    NonPositiveInteger,
    NegativeInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    Decimal,
    Float,
    Double,
    Boolean,
    Date,
    DateTime,
    Time,
    GYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Text,
    Token,
    Uri,
    Language,
    Integer,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Time,
    GYear,
}

impl BuiltinType {
    /// Look up a type name, with or without a namespace prefix
    pub fn from_name(name: &str) -> Option<BuiltinType> {
        let local = match name.split_once(':') {
            Some((_, local)) => local,
            None => name,
        };

        BuiltinType::from_local_name(local.trim())
    }

    pub fn from_local_name(local: &str) -> Option<BuiltinType> {
        let builtin = match local {
            "string" => BuiltinType::String,
            "normalizedString" => BuiltinType::NormalizedString,
            "token" => BuiltinType::Token,
            "Name" => BuiltinType::Name,
            "NCName" => BuiltinType::NCName,
            "NMTOKEN" => BuiltinType::NMToken,
            "ID" => BuiltinType::Id,
            "IDREF" => BuiltinType::IdRef,
            "ENTITY" => BuiltinType::Entity,
            "QName" => BuiltinType::QName,
            "anyURI" => BuiltinType::AnyUri,
            "language" => BuiltinType::Language,
            "integer" => BuiltinType::Integer,
            "long" => BuiltinType::Long,
            "int" => BuiltinType::Int,
            "short" => BuiltinType::Short,
            "byte" => BuiltinType::Byte,
            "nonNegativeInteger" => BuiltinType::NonNegativeInteger,
            "positiveInteger" => BuiltinType::PositiveInteger,
            "nonPositiveInteger" => BuiltinType::NonPositiveInteger,
            "negativeInteger" => BuiltinType::NegativeInteger,
            "unsignedLong" => BuiltinType::UnsignedLong,
            "unsignedInt" => BuiltinType::UnsignedInt,
            "unsignedShort" => BuiltinType::UnsignedShort,
            "unsignedByte" => BuiltinType::UnsignedByte,
            "decimal" => BuiltinType::Decimal,
            "float" => BuiltinType::Float,
            "double" => BuiltinType::Double,
            "boolean" => BuiltinType::Boolean,
            "date" => BuiltinType::Date,
            "dateTime" => BuiltinType::DateTime,
            "time" => BuiltinType::Time,
            "gYear" => BuiltinType::GYear,
            _ => return None,
        };

        Some(builtin)
    }

    fn family(self) -> Family {
        match self {
            BuiltinType::String | BuiltinType::NormalizedString | BuiltinType::Token => {
                Family::Text
            }
            BuiltinType::Name
            | BuiltinType::NCName
            | BuiltinType::NMToken
            | BuiltinType::Id
            | BuiltinType::IdRef
            | BuiltinType::Entity
            | BuiltinType::QName => Family::Token,
            BuiltinType::AnyUri => Family::Uri,
            BuiltinType::Language => Family::Language,
            BuiltinType::Integer
            | BuiltinType::Long
            | BuiltinType::Int
            | BuiltinType::Short
            | BuiltinType::Byte
            | BuiltinType::NonNegativeInteger
            | BuiltinType::PositiveInteger
            | BuiltinType::NonPositiveInteger
            | BuiltinType::NegativeInteger
            | BuiltinType::UnsignedLong
            | BuiltinType::UnsignedInt
            | BuiltinType::UnsignedShort
            | BuiltinType::UnsignedByte => Family::Integer,
            BuiltinType::Decimal | BuiltinType::Float | BuiltinType::Double => Family::Decimal,
            BuiltinType::Boolean => Family::Boolean,
            BuiltinType::Date => Family::Date,
            BuiltinType::DateTime => Family::DateTime,
            BuiltinType::Time => Family::Time,
            BuiltinType::GYear => Family::GYear,
        }
    }

    /// Value space of the integer types
    fn natural_range(self) -> (i64, i64) {
        match self {
            BuiltinType::Int => (i32::MIN.into(), i32::MAX.into()),
            BuiltinType::Short => (i16::MIN.into(), i16::MAX.into()),
            BuiltinType::Byte => (i8::MIN.into(), i8::MAX.into()),
            BuiltinType::NonNegativeInteger | BuiltinType::UnsignedLong => (0, i64::MAX),
            BuiltinType::PositiveInteger => (1, i64::MAX),
            BuiltinType::NonPositiveInteger => (i64::MIN, 0),
            BuiltinType::NegativeInteger => (i64::MIN, -1),
            BuiltinType::UnsignedInt => (0, u32::MAX.into()),
            BuiltinType::UnsignedShort => (0, u16::MAX.into()),
            BuiltinType::UnsignedByte => (0, u8::MAX.into()),
            _ => (i64::MIN, i64::MAX),
        }
    }
}

// A pattern that is nothing but a fixed number of digits, e.g. `\d{5}` or `[0-9]{4}`
static FIXED_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\^?(?:\\d|\[0-9\])\{(\d+)\}\$?$").unwrap());

// Span used when only one side of an integer range is known
const INTEGER_SPAN: i64 = 999;

/// Resolve a type name to a literal; unknown names produce a generic word
pub fn resolve_value<R: Rng, S: ValueSynthesizer>(
    type_name: &str,
    constraints: &ConstraintRecord,
    config: &GeneratorConfig,
    synthesizer: &S,
    rng: &mut R,
) -> String {
    match BuiltinType::from_name(type_name) {
        Some(builtin) => resolve_builtin(builtin, constraints, config, synthesizer, rng),
        None => synthesizer.word(rng),
    }
}

/// Generate one literal of `builtin` within `constraints`
///
/// An enumeration always wins. Decimal types ignore declared bounds and stay
/// within `1.0..=1000.0`.
pub fn resolve_builtin<R: Rng, S: ValueSynthesizer>(
    builtin: BuiltinType,
    constraints: &ConstraintRecord,
    config: &GeneratorConfig,
    synthesizer: &S,
    rng: &mut R,
) -> String {
    if let Some(value) = constraints.enumeration.choose(rng) {
        return value.clone();
    }

    match builtin.family() {
        Family::Text => text_value(constraints, config, synthesizer, rng),
        Family::Token => token_value(builtin, constraints, config, synthesizer, rng),
        Family::Uri => synthesizer.url(rng),
        Family::Language => "en".to_string(),
        Family::Integer => integer_value(builtin, constraints, config, rng).to_string(),
        Family::Decimal => format!("{:.2}", rng.random_range(1.0..=1000.0_f64)),
        Family::Boolean => rng.random_bool(0.5).to_string(),
        Family::Date => synthesizer.date(rng),
        Family::DateTime => synthesizer.date_time(rng),
        Family::Time => synthesizer.time(rng),
        Family::GYear => synthesizer.date(rng).chars().take(4).collect(),
    }
}

/// Best-effort literal for a `pattern` facet
///
/// Only fixed-length digit patterns are honoured exactly; any other pattern
/// mentioning digits yields a number, everything else a word. The digit count
/// is capped at `max_literal_length`.
pub fn pattern_value<R: Rng, S: ValueSynthesizer>(
    pattern: &str,
    config: &GeneratorConfig,
    synthesizer: &S,
    rng: &mut R,
) -> String {
    if let Some(captures) = FIXED_DIGITS.captures(pattern.trim()) {
        let count = capped_length(
            captures[1].parse::<usize>().unwrap_or(usize::MAX),
            config,
        );
        return (0..count)
            .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
            .collect();
    }

    if pattern.contains("\\d") || pattern.contains("[0-9]") {
        return rng.random_range(1..=9999).to_string();
    }

    synthesizer.word(rng)
}

fn text_value<R: Rng, S: ValueSynthesizer>(
    constraints: &ConstraintRecord,
    config: &GeneratorConfig,
    synthesizer: &S,
    rng: &mut R,
) -> String {
    if let Some(pattern) = &constraints.pattern {
        return pattern_value(pattern, config, synthesizer, rng);
    }

    let max = constraints
        .length
        .or(constraints.max_length)
        .unwrap_or(config.default_max_length);
    let min = constraints
        .length
        .or(constraints.min_length)
        .map(|min| capped_length(min, config))
        .unwrap_or(0)
        .min(max);

    let mut text = synthesizer.sentence(rng, max);
    pad(&mut text, min, " ", synthesizer, rng);

    text.chars().take(max).collect()
}

fn token_value<R: Rng, S: ValueSynthesizer>(
    builtin: BuiltinType,
    constraints: &ConstraintRecord,
    config: &GeneratorConfig,
    synthesizer: &S,
    rng: &mut R,
) -> String {
    if let Some(pattern) = &constraints.pattern {
        return pattern_value(pattern, config, synthesizer, rng);
    }

    let mut token = synthesizer.word(rng);
    if builtin == BuiltinType::Id {
        token.push_str(&rng.random_range(0..100_000).to_string());
    }

    let max = constraints.length.or(constraints.max_length);
    let min = constraints
        .length
        .or(constraints.min_length)
        .map(|min| capped_length(min, config))
        .unwrap_or(0);
    pad(&mut token, min, "", synthesizer, rng);

    match max {
        Some(max) => token.chars().take(max).collect(),
        None => token,
    }
}

fn capped_length(length: usize, config: &GeneratorConfig) -> usize {
    let limit = config.max_literal_length;
    if length > limit {
        warn!(length, limit, "length facet above the literal limit, capping");
        return limit;
    }

    length
}

fn pad<R: Rng, S: ValueSynthesizer>(
    text: &mut String,
    min: usize,
    separator: &str,
    synthesizer: &S,
    rng: &mut R,
) {
    while text.chars().count() < min {
        let word = synthesizer.word(rng);
        if !text.is_empty() {
            text.push_str(separator);
        }
        if word.is_empty() {
            text.push('x');
        } else {
            text.push_str(&word);
        }
    }
}

fn parse_bound(value: &Option<String>) -> Option<i64> {
    value.as_deref().and_then(|value| value.trim().parse::<i64>().ok())
}

fn integer_value<R: Rng>(
    builtin: BuiltinType,
    constraints: &ConstraintRecord,
    config: &GeneratorConfig,
    rng: &mut R,
) -> i64 {
    let (type_min, type_max) = builtin.natural_range();

    let (start, end) = (*config.integer_range.start(), *config.integer_range.end());
    // The configured range may lie entirely outside the type, e.g. negativeInteger
    let (default_min, default_max) = if start <= type_max && end >= type_min {
        (start.max(type_min), end.min(type_max))
    } else if end < type_min {
        (type_min, type_min.saturating_add(INTEGER_SPAN).min(type_max))
    } else {
        (type_max.saturating_sub(INTEGER_SPAN).max(type_min), type_max)
    };

    let declared_min = parse_bound(&constraints.min_inclusive)
        .or_else(|| parse_bound(&constraints.min_exclusive).map(|value| value.saturating_add(1)))
        .map(|value| value.clamp(type_min, type_max));
    let declared_max = parse_bound(&constraints.max_inclusive)
        .or_else(|| parse_bound(&constraints.max_exclusive).map(|value| value.saturating_sub(1)))
        .map(|value| value.clamp(type_min, type_max));

    let mut low = declared_min.unwrap_or(default_min);
    let mut high = declared_max.unwrap_or(default_max);

    if low > high {
        match (declared_min, declared_max) {
            (Some(_), None) => high = low.saturating_add(INTEGER_SPAN).min(type_max),
            (None, Some(_)) => low = high.saturating_sub(INTEGER_SPAN).max(type_min),
            _ => high = low,
        }
    }

    rng.random_range(low..=high)
}
