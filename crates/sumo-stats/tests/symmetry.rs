//! Property tests for the bout aggregation rules

use proptest::prelude::*;
use sumo_stats::{career_records, head_to_head, running_records, win_loss, BoutResult};

const ROSTER: [&str; 4] = ["Hoshoryu", "Kotozakura", "Onosato", "Takayasu"];

/// Recorded as a winner but never on the dohyo.
const OUTSIDER: &str = "Ura";

fn bout_strategy() -> impl Strategy<Value = BoutResult> {
    (0..ROSTER.len(), 1..ROSTER.len(), 1..=15i32, 0..4u8).prop_map(|(east, offset, day, outcome)| {
        let west = (east + offset) % ROSTER.len();
        let winner = match outcome {
            0 => Some(ROSTER[east]),
            1 => Some(ROSTER[west]),
            2 => Some(OUTSIDER),
            _ => None,
        };
        BoutResult::new("202401", day, ROSTER[east], ROSTER[west], winner)
    })
}

proptest! {
    #[test]
    fn head_to_head_is_symmetric(bouts in prop::collection::vec(bout_strategy(), 0..60)) {
        for a in ROSTER {
            for b in ROSTER {
                prop_assert_eq!(head_to_head(&bouts, a, b), head_to_head(&bouts, b, a).swap());
            }
        }
    }

    #[test]
    fn undecided_bouts_never_count(bouts in prop::collection::vec(bout_strategy(), 0..60)) {
        let decided: Vec<_> = bouts.iter().filter(|b| b.winner.is_some()).cloned().collect();
        for name in ROSTER {
            prop_assert_eq!(win_loss(&bouts, name), win_loss(&decided, name));
        }
    }

    #[test]
    fn wins_equal_losses_overall(bouts in prop::collection::vec(bout_strategy(), 0..60)) {
        let records = running_records(&bouts, 15);
        let wins: u32 = records.values().map(|r| r.wins).sum();
        let losses: u32 = records.values().map(|r| r.losses).sum();
        prop_assert_eq!(wins, losses);
        let decided = bouts
            .iter()
            .filter(|b| b.winner.as_deref().is_some_and(|w| w != OUTSIDER))
            .count();
        prop_assert_eq!(wins as usize, decided);
    }

    #[test]
    fn career_and_running_records_agree(bouts in prop::collection::vec(bout_strategy(), 0..60)) {
        let career = career_records(&bouts);
        let running = running_records(&bouts, 15);
        prop_assert!(!career.contains_key(OUTSIDER));
        for name in ROSTER {
            let expected = win_loss(&bouts, name);
            prop_assert_eq!(career.get(name).copied().unwrap_or_default(), expected);
            prop_assert_eq!(running.get(name).copied().unwrap_or_default(), expected);
        }
    }
}
