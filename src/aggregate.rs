//! Daily aggregation of 3-hour forecast samples
//!
//! Samples are bucketed by calendar date in a given time zone. The bucket for
//! "today" is dropped because the provider only reports its remaining hours.
//! Buckets live in a `BTreeMap`, so summaries come out in ascending date order.

use chrono::{Local, NaiveDate, TimeZone};
use std::collections::BTreeMap;
use tracing::debug;

use crate::hazards;
use crate::models::forecast::round_to_tenth;
use crate::models::weather::ms_to_kmh;
use crate::models::{DailySummary, RawForecastSample};

/// Frequency counter that remembers first-seen order
#[derive(Debug, Default)]
struct FrequencyCounter {
    counts: Vec<(String, usize)>,
}

impl FrequencyCounter {
    fn add(&mut self, value: &str) {
        match self.counts.iter_mut().find(|(seen, _)| seen == value) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((value.to_string(), 1)),
        }
    }

    /// Highest count wins; ties go to the value seen first
    fn dominant(&self) -> String {
        let mut best: Option<&(String, usize)> = None;
        for entry in &self.counts {
            if best.is_none_or(|(_, count)| entry.1 > *count) {
                best = Some(entry);
            }
        }
        best.map(|(value, _)| value.clone()).unwrap_or_default()
    }
}

/// Running totals for one date
#[derive(Debug)]
struct DayBucket {
    day_name: String,
    count: usize,
    temp_sum: f64,
    temp_max: f64,
    temp_min: f64,
    feels_sum: f64,
    humidity_sum: f64,
    wind_sum_kmh: f64,
    rain_sum: f64,
    visibility_km: f64,
    descriptions: FrequencyCounter,
    icons: FrequencyCounter,
}

impl DayBucket {
    fn open(date: NaiveDate, first: &RawForecastSample) -> Self {
        Self {
            day_name: date.format("%A").to_string(),
            count: 0,
            temp_sum: 0.0,
            temp_max: f64::NEG_INFINITY,
            temp_min: f64::INFINITY,
            feels_sum: 0.0,
            humidity_sum: 0.0,
            wind_sum_kmh: 0.0,
            rain_sum: 0.0,
            visibility_km: first.visibility_m / 1000.0,
            descriptions: FrequencyCounter::default(),
            icons: FrequencyCounter::default(),
        }
    }

    fn add(&mut self, sample: &RawForecastSample) {
        self.count += 1;
        self.temp_sum += sample.temperature;
        self.temp_max = self.temp_max.max(sample.temperature);
        self.temp_min = self.temp_min.min(sample.temperature);
        self.feels_sum += sample.feels_like.unwrap_or(sample.temperature);
        self.humidity_sum += sample.humidity;
        self.wind_sum_kmh += ms_to_kmh(sample.wind_speed_ms);
        self.rain_sum += sample.precipitation_probability * 100.0;
        self.descriptions.add(&sample.description);
        self.icons.add(&sample.icon);
    }

    fn finish(self, date: NaiveDate) -> DailySummary {
        let n = self.count as f64;

        let mut summary = DailySummary {
            date,
            day_name: self.day_name,
            temperature: round_to_tenth(self.temp_sum / n),
            max_temp: round_to_tenth(self.temp_max),
            min_temp: round_to_tenth(self.temp_min),
            feels_like: round_to_tenth(self.feels_sum / n),
            description: self.descriptions.dominant(),
            icon: self.icons.dominant(),
            humidity: round_percent(self.humidity_sum / n),
            wind_speed: round_to_tenth(self.wind_sum_kmh / n),
            rain_chance: round_percent(self.rain_sum / n),
            visibility: self.visibility_km,
            warnings: Vec::new(),
        };
        summary.warnings = hazards::evaluate(&summary.reading(), &summary.day_name);
        summary
    }
}

fn round_percent(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 100.0) as u8
}

/// Aggregate samples into daily summaries using the local time zone and today's local date
#[must_use]
pub fn aggregate(samples: &[RawForecastSample]) -> Vec<DailySummary> {
    aggregate_in(samples, &Local, Local::now().date_naive())
}

/// Aggregate samples bucketed by calendar date in `tz`, skipping `today`
#[must_use]
pub fn aggregate_in<Tz: TimeZone>(
    samples: &[RawForecastSample],
    tz: &Tz,
    today: NaiveDate,
) -> Vec<DailySummary> {
    let mut buckets: BTreeMap<NaiveDate, DayBucket> = BTreeMap::new();
    let mut skipped = 0usize;

    for sample in samples {
        let date = sample.timestamp.with_timezone(tz).date_naive();
        if date == today {
            skipped += 1;
            continue;
        }

        buckets
            .entry(date)
            .or_insert_with(|| DayBucket::open(date, sample))
            .add(sample);
    }

    debug!(
        "Aggregated {} samples into {} days ({} from today skipped)",
        samples.len(),
        buckets.len(),
        skipped
    );

    buckets
        .into_iter()
        .map(|(date, bucket)| bucket.finish(date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
        date.and_hms_opt(hour, 0, 0).unwrap().and_utc()
    }

    fn sample(timestamp: DateTime<Utc>, temperature: f64) -> RawForecastSample {
        RawForecastSample {
            timestamp,
            temperature,
            feels_like: Some(temperature),
            humidity: 50.0,
            wind_speed_ms: 5.0,
            precipitation_probability: 0.2,
            description: "clear sky".to_string(),
            icon: "01d".to_string(),
            visibility_m: 10_000.0,
        }
    }

    fn described(timestamp: DateTime<Utc>, description: &str, icon: &str) -> RawForecastSample {
        RawForecastSample {
            description: description.to_string(),
            icon: icon.to_string(),
            ..sample(timestamp, 20.0)
        }
    }

    #[test]
    fn test_single_day_statistics() {
        let tomorrow = today() + Duration::days(1);
        let samples = vec![
            sample(at(tomorrow, 0), 10.0),
            sample(at(tomorrow, 3), 11.0),
            sample(at(tomorrow, 6), 15.5),
        ];

        let days = aggregate_in(&samples, &Utc, today());
        assert_eq!(days.len(), 1);

        let day = &days[0];
        assert_eq!(day.date, tomorrow);
        assert_eq!(day.day_name, "Tuesday");
        assert_eq!(day.temperature, 12.2);
        assert_eq!(day.max_temp, 15.5);
        assert_eq!(day.min_temp, 10.0);
        assert_eq!(day.humidity, 50);
        assert_eq!(day.wind_speed, 18.0);
        assert_eq!(day.rain_chance, 20);
        assert_eq!(day.visibility, 10.0);
        assert_eq!(day.warnings, vec!["Tuesday".to_string()]);
    }

    #[test]
    fn test_today_is_dropped() {
        let only_today = vec![sample(at(today(), 21), 18.0)];
        assert!(aggregate_in(&only_today, &Utc, today()).is_empty());

        let tomorrow = today() + Duration::days(1);
        let mixed = vec![
            sample(at(today(), 18), 30.0),
            sample(at(today(), 21), 30.0),
            sample(at(tomorrow, 0), 10.0),
        ];
        let days = aggregate_in(&mixed, &Utc, today());
        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temperature, 10.0);
    }

    #[test]
    fn test_days_sorted_ascending() {
        let day2 = today() + Duration::days(2);
        let day1 = today() + Duration::days(1);
        let samples = vec![sample(at(day2, 0), 5.0), sample(at(day1, 0), 6.0)];

        let days = aggregate_in(&samples, &Utc, today());
        let dates: Vec<NaiveDate> = days.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![day1, day2]);
    }

    #[test]
    fn test_dominant_description_majority() {
        let day = today() + Duration::days(1);
        let samples = vec![
            described(at(day, 0), "A", "a"),
            described(at(day, 3), "A", "a"),
            described(at(day, 6), "B", "b"),
        ];
        let days = aggregate_in(&samples, &Utc, today());
        assert_eq!(days[0].description, "A");
        assert_eq!(days[0].icon, "a");
    }

    #[test]
    fn test_dominant_description_tie_prefers_first_seen() {
        let day = today() + Duration::days(1);
        let samples = vec![
            described(at(day, 0), "B", "10n"),
            described(at(day, 3), "A", "01d"),
        ];
        let days = aggregate_in(&samples, &Utc, today());
        assert_eq!(days[0].description, "B");
        assert_eq!(days[0].icon, "10n");
    }

    #[test]
    fn test_visibility_from_first_sample_only() {
        let day = today() + Duration::days(1);
        let mut first = sample(at(day, 0), 10.0);
        first.visibility_m = 1_500.0;
        let later = sample(at(day, 3), 10.0);

        let days = aggregate_in(&[first, later], &Utc, today());
        assert_eq!(days[0].visibility, 1.5);
        assert!(days[0].warnings.iter().any(|w| w.contains("Poor visibility")));
    }

    #[test]
    fn test_feels_like_falls_back_to_temperature() {
        let day = today() + Duration::days(1);
        let mut no_feels = sample(at(day, 0), 20.0);
        no_feels.feels_like = None;
        let mut with_feels = sample(at(day, 3), 20.0);
        with_feels.feels_like = Some(25.0);

        let days = aggregate_in(&[no_feels, with_feels], &Utc, today());
        assert_eq!(days[0].feels_like, 22.5);
    }

    #[test]
    fn test_tenths_round_on_exact_decimal_value() {
        let day = today() + Duration::days(1);
        let days = aggregate_in(&[sample(at(day, 0), 10.0), sample(at(day, 3), 10.5)], &Utc, today());
        assert_eq!(days[0].temperature, 10.2);
        assert_eq!(days[0].max_temp, 10.5);

        let days = aggregate_in(&[sample(at(day, 0), 0.15)], &Utc, today());
        assert_eq!(days[0].max_temp, 0.1);
        assert_eq!(days[0].min_temp, 0.1);
        assert_eq!(days[0].temperature, 0.1);
    }

    #[test]
    fn test_percent_rounding_half_to_even() {
        assert_eq!(round_percent(62.5), 62);
        assert_eq!(round_percent(63.5), 64);
        assert_eq!(round_percent(70.4), 70);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_in(&[], &Utc, today()).is_empty());
    }
}
