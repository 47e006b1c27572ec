//! Ordering and aggregation of scan results

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Mover, PerformanceRecord, round2};

/// Rows kept by every ranking
pub const DEFAULT_TOP_N: usize = 5;

/// Top gainers and losers by percent change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketMovers {
    pub gainers: Vec<Mover>,
    pub losers: Vec<Mover>,
}

/// Trending view of a scanned universe
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendingReport {
    pub top_movers: Vec<PerformanceRecord>,
    pub most_active: Vec<PerformanceRecord>,
    pub sector_performance: BTreeMap<String, f64>,
}

/// Ranks performance records and movers
///
/// Every sort is stable, so ties keep scan order.
#[derive(Debug, Clone, Copy)]
pub struct RankingEngine {
    top_n: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_N)
    }
}

impl RankingEngine {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Largest absolute five-day moves first
    pub fn top_movers(&self, records: &[PerformanceRecord]) -> Vec<PerformanceRecord> {
        let mut ranked = records.to_vec();
        ranked.sort_by(|a, b| b.performance_5d.abs().total_cmp(&a.performance_5d.abs()));
        ranked.truncate(self.top_n);
        ranked
    }

    /// Highest average volume first, larger absolute moves first on equal volume
    pub fn most_active(&self, records: &[PerformanceRecord]) -> Vec<PerformanceRecord> {
        let mut ranked = records.to_vec();
        ranked.sort_by(|a, b| {
            b.avg_volume
                .cmp(&a.avg_volume)
                .then_with(|| b.performance_5d.abs().total_cmp(&a.performance_5d.abs()))
        });
        ranked.truncate(self.top_n);
        ranked
    }

    /// Best and worst percent changes; movers without one are left out
    pub fn gainers_and_losers(&self, movers: &[Mover]) -> MarketMovers {
        let mut valid: Vec<(f64, &Mover)> = movers
            .iter()
            .filter_map(|m| m.change_percent.map(|pct| (pct, m)))
            .collect();

        valid.sort_by(|a, b| b.0.total_cmp(&a.0));
        let gainers = valid
            .iter()
            .take(self.top_n)
            .map(|(_, m)| (*m).clone())
            .collect();

        valid.sort_by(|a, b| a.0.total_cmp(&b.0));
        let losers = valid
            .iter()
            .take(self.top_n)
            .map(|(_, m)| (*m).clone())
            .collect();

        MarketMovers { gainers, losers }
    }

    /// Mean five-day performance per sector, rounded to two decimals
    pub fn sector_performance(&self, records: &[PerformanceRecord]) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for record in records {
            let entry = totals.entry(record.sector.as_str()).or_default();
            entry.0 += record.performance_5d;
            entry.1 += 1;
        }

        totals
            .into_iter()
            .filter(|(_, (_, count))| *count > 0)
            .map(|(sector, (sum, count))| (sector.to_string(), round2(sum / count as f64)))
            .collect()
    }

    /// Every ranking of one scan
    pub fn trending(&self, records: &[PerformanceRecord]) -> TrendingReport {
        TrendingReport {
            top_movers: self.top_movers(records),
            most_active: self.most_active(records),
            sector_performance: self.sector_performance(records),
        }
    }
}
