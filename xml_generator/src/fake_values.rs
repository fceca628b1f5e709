use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use fake::Fake;
use fake::faker::internet::en::DomainSuffix;
use fake::faker::lorem::en::{Sentence, Word};
use rand::Rng;

/// Source of realistic-looking literals
///
/// The generator only decides which kind of value a leaf needs; the literal
/// itself comes from here. Implementations must not keep state between calls.
pub trait ValueSynthesizer {
    fn word<R: Rng>(&self, rng: &mut R) -> String;

    /// Free text of at most `max_chars` characters
    fn sentence<R: Rng>(&self, rng: &mut R, max_chars: usize) -> String;

    /// `YYYY-MM-DD`
    fn date<R: Rng>(&self, rng: &mut R) -> String;

    /// `YYYY-MM-DDThh:mm:ss`
    fn date_time<R: Rng>(&self, rng: &mut R) -> String;

    /// `hh:mm:ss`
    fn time<R: Rng>(&self, rng: &mut R) -> String;

    fn url<R: Rng>(&self, rng: &mut R) -> String;
}

/// [`ValueSynthesizer`] backed by the `fake` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeSynthesizer;

fn random_date<R: Rng>(rng: &mut R) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
        rng.random_range(1970..=2030),
        rng.random_range(1..=12),
        rng.random_range(1..=28),
    )
}

fn random_time<R: Rng>(rng: &mut R) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(
        rng.random_range(0..24),
        rng.random_range(0..60),
        rng.random_range(0..60),
    )
}

impl ValueSynthesizer for FakeSynthesizer {
    fn word<R: Rng>(&self, rng: &mut R) -> String {
        Word().fake_with_rng(rng)
    }

    fn sentence<R: Rng>(&self, rng: &mut R, max_chars: usize) -> String {
        let sentence: String = Sentence(3..10).fake_with_rng(rng);
        let truncated: String = sentence.chars().take(max_chars).collect();

        truncated.trim_end().to_string()
    }

    fn date<R: Rng>(&self, rng: &mut R) -> String {
        random_date(rng)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "1970-01-01".to_string())
    }

    fn date_time<R: Rng>(&self, rng: &mut R) -> String {
        match (random_date(rng), random_time(rng)) {
            (Some(date), Some(time)) => NaiveDateTime::new(date, time)
                .format("%Y-%m-%dT%H:%M:%S")
                .to_string(),
            _ => "1970-01-01T00:00:00".to_string(),
        }
    }

    fn time<R: Rng>(&self, rng: &mut R) -> String {
        random_time(rng)
            .map(|time| time.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "00:00:00".to_string())
    }

    fn url<R: Rng>(&self, rng: &mut R) -> String {
        let host: String = Word().fake_with_rng(rng);
        let suffix: String = DomainSuffix().fake_with_rng(rng);

        format!("https://www.{host}.{suffix}")
    }
}
