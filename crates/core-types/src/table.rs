use crate::error::CoreError;
use crate::series::PriceSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Closing prices for a set of instruments on one shared date index.
///
/// The first series inserted fixes the index; every later series must carry
/// exactly the same dates. Aligning ragged histories is the data source's job.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument: impl Into<String>, series: PriceSeries) -> Result<(), CoreError> {
        let instrument = instrument.into();
        if self.series.contains_key(&instrument) {
            return Err(CoreError::DuplicateInstrument(instrument));
        }
        if let Some(index) = self.dates() {
            if index != series.dates() {
                return Err(CoreError::MisalignedIndex(instrument));
            }
        }
        tracing::debug!(instrument = %instrument, points = series.len(), "Added price series to table.");
        self.series.insert(instrument, series);
        Ok(())
    }

    pub fn get(&self, instrument: &str) -> Option<&PriceSeries> {
        self.series.get(instrument)
    }

    /// The shared date index, or `None` for an empty table.
    pub fn dates(&self) -> Option<&[NaiveDate]> {
        self.series.values().next().map(PriceSeries::dates)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates().and_then(|d| d.last().copied())
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PriceSeries)> {
        self.series.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Direct access for callers that want to fan out over instruments.
    pub fn as_map(&self) -> &BTreeMap<String, PriceSeries> {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates() -> Vec<NaiveDate> {
        (1..=3).map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap()).collect()
    }

    #[test]
    fn insert_enforces_shared_index() {
        let mut table = PriceTable::new();
        table
            .insert("BMO.TO", PriceSeries::new(dates(), vec![1.0, 2.0, 3.0]).unwrap())
            .unwrap();

        let shorter = PriceSeries::new(dates()[..2].to_vec(), vec![1.0, 2.0]).unwrap();
        assert_eq!(
            table.insert("TD.TO", shorter),
            Err(CoreError::MisalignedIndex("TD.TO".to_string()))
        );

        let same = PriceSeries::new(dates(), vec![4.0, 5.0, 6.0]).unwrap();
        assert!(table.insert("TD.TO", same.clone()).is_ok());
        assert_eq!(
            table.insert("TD.TO", same),
            Err(CoreError::DuplicateInstrument("TD.TO".to_string()))
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.instruments().collect::<Vec<_>>(), vec!["BMO.TO", "TD.TO"]);
        assert_eq!(table.last_date(), NaiveDate::from_ymd_opt(2024, 1, 3));
    }

    #[test]
    fn empty_table_has_no_index() {
        let table = PriceTable::new();
        assert!(table.dates().is_none());
        assert!(table.last_date().is_none());
    }
}
