// Per-user cellar digest: stock, drinking activity and how recommendations land.

pub mod handlers;

use serde::Serialize;

use crate::inventory::stats::CellarStats;

#[derive(Debug, Serialize, PartialEq)]
pub struct MetricsDigest {
    pub cellar: CellarStats,
    pub bottles_consumed_30_days: i64,
    pub recommendations_rated: i64,
    pub recommendations_accepted: i64,
    /// Share of rated recommendations that were accepted; null until one is rated.
    pub acceptance_rate: Option<f64>,
    pub unread_notifications: i64,
}

pub fn acceptance_rate(rated: i64, accepted: i64) -> Option<f64> {
    if rated <= 0 {
        return None;
    }
    let rate = accepted.clamp(0, rated) as f64 / rated as f64;
    Some((rate * 1000.0).round() / 1000.0)
}

impl MetricsDigest {
    pub fn assemble(cellar: CellarStats, feedback: (i64, i64), unread: i64) -> Self {
        let (rated, accepted) = feedback;
        MetricsDigest {
            bottles_consumed_30_days: cellar.consumed_last_30_days,
            cellar,
            recommendations_rated: rated,
            recommendations_accepted: accepted,
            acceptance_rate: acceptance_rate(rated, accepted),
            unread_notifications: unread,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_feedback_means_no_rate() {
        assert_eq!(acceptance_rate(0, 0), None);
    }

    #[test]
    fn test_rate_rounded_to_three_places() {
        assert_eq!(acceptance_rate(3, 1), Some(0.333));
        assert_eq!(acceptance_rate(4, 4), Some(1.0));
    }

    #[test]
    fn test_assemble_copies_consumption_from_stats() {
        let cellar = CellarStats {
            total_bottles: 12,
            consumed_last_30_days: 4,
            ..Default::default()
        };
        let digest = MetricsDigest::assemble(cellar, (2, 1), 3);
        assert_eq!(digest.bottles_consumed_30_days, 4);
        assert_eq!(digest.acceptance_rate, Some(0.5));
        assert_eq!(digest.unread_notifications, 3);
        assert_eq!(digest.cellar.total_bottles, 12);
    }
}
