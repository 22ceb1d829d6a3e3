use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::metrics::Ledger;
use crate::metrics::stats::{mean, round2};
use crate::metrics::types::BalanceMetrics;

pub(crate) fn balance_metrics(ledger: &Ledger<'_>) -> BalanceMetrics {
    let observed = ledger
        .all()
        .filter_map(|(transaction, _)| {
            transaction
                .running_balance
                .map(|balance| (transaction.date, balance))
        })
        .collect::<Vec<(NaiveDate, f64)>>();
    if observed.is_empty() {
        return BalanceMetrics::default();
    }

    let balances = observed.iter().map(|(_, balance)| *balance).collect::<Vec<f64>>();
    let minimum = balances.iter().copied().fold(f64::INFINITY, f64::min);

    // Later snapshots on the same date overwrite earlier ones.
    let end_of_day = observed.into_iter().collect::<BTreeMap<NaiveDate, f64>>();
    let (days_in_overdraft, overdraft_episodes) = overdraft_profile(&end_of_day);

    BalanceMetrics {
        average_balance: mean(&balances).map(round2),
        minimum_balance: Some(round2(minimum)),
        days_in_overdraft: Some(days_in_overdraft),
        overdraft_episodes: Some(overdraft_episodes),
    }
}

fn overdraft_profile(end_of_day: &BTreeMap<NaiveDate, f64>) -> (u32, u32) {
    let snapshots = end_of_day.iter().collect::<Vec<_>>();
    let mut days = 0_i64;
    let mut episodes = 0_u32;
    let mut previous_negative = false;

    for (position, (date, balance)) in snapshots.iter().enumerate() {
        let negative = **balance < 0.0;
        if negative {
            days += snapshots
                .get(position + 1)
                .map_or(1, |(next, _)| (**next - **date).num_days());
            if !previous_negative {
                episodes += 1;
            }
        }
        previous_negative = negative;
    }
    (u32::try_from(days).unwrap_or(u32::MAX), episodes)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::NaiveDate;

    use super::overdraft_profile;

    fn day(value: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, value).unwrap_or_default()
    }

    #[test]
    fn overdraft_days_span_until_next_snapshot() {
        let end_of_day = BTreeMap::from([
            (day(1), 120.0),
            (day(3), -40.0),
            (day(7), -10.0),
            (day(9), 15.0),
            (day(20), -5.0),
        ]);
        // 4 + 2 from the first run, 1 for the trailing snapshot.
        assert_eq!(overdraft_profile(&end_of_day), (7, 2));
    }

    #[test]
    fn no_overdraft_when_always_positive() {
        let end_of_day = BTreeMap::from([(day(1), 10.0), (day(2), 20.0)]);
        assert_eq!(overdraft_profile(&end_of_day), (0, 0));
    }
}
