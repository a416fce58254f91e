// 📊 Aggregation Engine - Yearly summaries without an index
//
// There is no index by year. A year's records are discovered by scanning
// the key space for the literal prefix "{prefix}_{year}-", decoding each
// match, and folding the survivors through the calculation rules.
// Nothing here fails: bad keys and bad values are skipped.

use crate::calculations::calculate_yearly_summary;
use crate::keys::{parse_record_key, year_prefix, RecordKind};
use crate::medium::KeyValueMedium;
use crate::models::{AppSettings, DailySchedule, Expense, Service, TimeSlot, YearlySummary};
use crate::store::RecordStore;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Every usable record of one year, keyed by ISO date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualData {
    pub year: i32,
    pub schedules: BTreeMap<String, DailySchedule>,
    pub expenses: BTreeMap<String, Vec<Expense>>,
}

impl AnnualData {
    pub fn summarize(&self, services: &[Service], tax_rate: f64) -> YearlySummary {
        calculate_yearly_summary(
            self.schedules.values(),
            self.expenses.values(),
            services,
            tax_rate,
        )
    }

    pub fn days_with_records(&self) -> usize {
        let mut dates: Vec<&String> = self.schedules.keys().chain(self.expenses.keys()).collect();
        dates.sort();
        dates.dedup();
        dates.len()
    }
}

pub fn collect_annual_data<M: KeyValueMedium>(medium: &M, key_prefix: &str, year: i32) -> AnnualData {
    let mut data = AnnualData {
        year,
        ..Default::default()
    };

    let prefix = year_prefix(key_prefix, year);
    let keys = match medium.keys_with_prefix(&prefix) {
        Ok(keys) => keys,
        Err(e) => {
            warn!(year, error = %e, "failed to enumerate keys, year treated as empty");
            return data;
        }
    };

    for key in keys {
        let Some(parsed) = parse_record_key(key_prefix, &key) else {
            warn!(key = %key, "malformed record key, skipping");
            continue;
        };

        match RecordKind::parse(parsed.kind) {
            Some(RecordKind::Schedule) => {
                if let Some(schedule) = decode_non_empty::<_, TimeSlot>(medium, &key) {
                    data.schedules.insert(parsed.date.to_string(), schedule);
                }
            }
            Some(RecordKind::Expenses) => {
                if let Some(expenses) = decode_non_empty::<_, Expense>(medium, &key) {
                    data.expenses.insert(parsed.date.to_string(), expenses);
                }
            }
            None => debug!(key = %key, "unknown record kind, skipping"),
        }
    }

    debug!(
        year,
        schedules = data.schedules.len(),
        expenses = data.expenses.len(),
        "annual data collected"
    );

    data
}

/// Absent, undecodable and empty collections all count as "no record"
fn decode_non_empty<M, T>(medium: &M, key: &str) -> Option<Vec<T>>
where
    M: KeyValueMedium,
    T: DeserializeOwned,
{
    let raw = match medium.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(key, error = %e, "failed to read record, skipping");
            return None;
        }
    };

    match serde_json::from_str::<Vec<T>>(&raw) {
        Ok(items) if !items.is_empty() => Some(items),
        Ok(_) => None,
        Err(e) => {
            warn!(key, error = %e, "failed to parse record, skipping");
            None
        }
    }
}

impl<M: KeyValueMedium> RecordStore<M> {
    pub fn annual_data(&self, year: i32) -> AnnualData {
        collect_annual_data(self.medium(), &self.config().key_prefix, year)
    }

    /// Summary priced with the stored catalog
    pub fn yearly_summary(&self, year: i32) -> YearlySummary {
        let settings = self.load_settings();
        self.yearly_summary_with(year, &settings)
    }

    pub fn yearly_summary_with(&self, year: i32, settings: &AppSettings) -> YearlySummary {
        self.annual_data(year)
            .summarize(&settings.services, self.config().tax_rate)
    }
}
