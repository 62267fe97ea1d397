use proptest::prelude::*;

use nmr_disbursement::{DisbursementSchedule, DisbursementScheduler, WeeklySchedule};
use nmr_types::{NmrAmount, Timestamp, WEEK_SECS};

fn small_schedule() -> WeeklySchedule {
    WeeklySchedule::new(NmrAmount::new(1_000_000), NmrAmount::new(100_000))
}

proptest! {
    /// Within one period the remaining quota never increases and never goes negative.
    #[test]
    fn remaining_is_monotone_within_period(
        debits in prop::collection::vec((0u128..400_000, 0u64..WEEK_SECS), 0..32),
    ) {
        let mut s =
            DisbursementScheduler::new(small_schedule(), Timestamp::new(0), WEEK_SECS).unwrap();
        let mut times: Vec<_> = debits.iter().map(|(_, t)| *t).collect();
        times.sort_unstable();
        for ((raw, _), now) in debits.iter().zip(times) {
            let before = s.remaining();
            if let Ok(prepared) = s.prepare_debit(NmrAmount::new(*raw), Timestamp::new(now)) {
                s.commit(prepared);
                prop_assert_eq!(s.remaining(), before - NmrAmount::new(*raw));
            } else {
                prop_assert_eq!(s.remaining(), before);
            }
            prop_assert!(s.remaining() <= before);
        }
    }

    /// Total minted in a period never exceeds that period's quota.
    #[test]
    fn period_total_is_bounded_by_quota(
        debits in prop::collection::vec((0u128..300_000, 0u64..4 * WEEK_SECS), 0..64),
    ) {
        let schedule = small_schedule();
        let mut s =
            DisbursementScheduler::new(schedule.clone(), Timestamp::new(0), WEEK_SECS).unwrap();
        let mut ordered = debits;
        ordered.sort_by_key(|(_, t)| *t);
        let mut minted_per_period = [0u128; 4];
        for (raw, now) in ordered {
            if let Ok(prepared) = s.prepare_debit(NmrAmount::new(raw), Timestamp::new(now)) {
                s.commit(prepared);
                minted_per_period[(now / WEEK_SECS) as usize] += raw;
            }
        }
        for (period, minted) in minted_per_period.iter().enumerate() {
            prop_assert!(*minted <= schedule.quota_for(period as u64).raw());
        }
    }

    /// The projected quota equals what a rollover would install.
    #[test]
    fn projection_matches_rollover(offset in 0u64..20 * WEEK_SECS) {
        let mut s =
            DisbursementScheduler::new(small_schedule(), Timestamp::new(0), WEEK_SECS).unwrap();
        let now = Timestamp::new(offset);
        let projected = s.remaining_at(now);
        s.rollover(now);
        prop_assert_eq!(s.remaining(), projected);
        prop_assert_eq!(s.period_index(), offset / WEEK_SECS);
    }
}
