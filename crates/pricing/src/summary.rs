use serde::Serialize;

use crate::model::{MatchStatus, PricedRow, PricedTable};

/// Status counts for one pricing run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub total: usize,
    pub ok: usize,
    pub not_found: usize,
    pub incomplete: usize,
    /// First NOT_FOUND rows in input order, capped at the sample limit.
    pub not_found_sample: Vec<PricedRow>,
}

impl PriceSummary {
    pub fn all_ok(&self) -> bool {
        self.ok == self.total
    }
}

/// Count statuses and collect a bounded sample of unmatched rows.
pub fn summarize(priced: &PricedTable, sample_limit: usize) -> PriceSummary {
    let mut ok = 0;
    let mut not_found = 0;
    let mut incomplete = 0;
    let mut not_found_sample = Vec::new();

    for row in &priced.rows {
        match row.status {
            MatchStatus::Ok => ok += 1,
            MatchStatus::IncompletePrice => incomplete += 1,
            MatchStatus::NotFound => {
                not_found += 1;
                if not_found_sample.len() < sample_limit {
                    not_found_sample.push(row.clone());
                }
            }
        }
    }

    PriceSummary {
        total: priced.len(),
        ok,
        not_found,
        incomplete,
        not_found_sample,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConfigKey, NormalizedKey, PriceFields, PriceLayout};

    fn row(n: usize, status: MatchStatus) -> PricedRow {
        PricedRow {
            row_number: n,
            cells: Vec::new(),
            key: NormalizedKey::new(format!("M{n}"), ConfigKey::Empty),
            prices: PriceFields::default(),
            status,
        }
    }

    fn table(statuses: &[MatchStatus]) -> PricedTable {
        PricedTable {
            columns: Vec::new(),
            output_columns: Vec::new(),
            layout: PriceLayout::Split,
            rows: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| row(i + 2, *s))
                .collect(),
        }
    }

    #[test]
    fn counts_each_status() {
        let priced = table(&[
            MatchStatus::Ok,
            MatchStatus::NotFound,
            MatchStatus::IncompletePrice,
            MatchStatus::Ok,
            MatchStatus::NotFound,
        ]);
        let summary = summarize(&priced, 30);
        assert_eq!(summary.total, 5);
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.not_found, 2);
        assert_eq!(summary.incomplete, 1);
        assert!(!summary.all_ok());
        let numbers: Vec<usize> = summary.not_found_sample.iter().map(|r| r.row_number).collect();
        assert_eq!(numbers, vec![3, 6]);
    }

    #[test]
    fn sample_is_capped_in_input_order() {
        let priced = table(&[MatchStatus::NotFound; 40]);
        let summary = summarize(&priced, 30);
        assert_eq!(summary.not_found, 40);
        assert_eq!(summary.not_found_sample.len(), 30);
        assert_eq!(summary.not_found_sample[0].row_number, 2);
        assert_eq!(summary.not_found_sample[29].row_number, 31);
    }

    #[test]
    fn empty_input() {
        let summary = summarize(&table(&[]), 30);
        assert_eq!(summary.total, 0);
        assert!(summary.all_ok());
        assert!(summary.not_found_sample.is_empty());
    }
}
