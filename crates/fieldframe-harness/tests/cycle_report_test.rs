//! Rate-limited change reporting across cycles.

use std::time::Duration;

use fieldframe_core::{NotifyPolicy, WcState};
use fieldframe_harness::CycleScenario;
use fieldframe_proto::Direction;

/// A bus that flaps every cycle reports batched counts, not one event per
/// flap.
#[test]
fn flapping_counters_are_batched_per_interval() {
    // 300 ms cycles against a 1 s notification interval: the first change
    // reports immediately, then four flaps accumulate until the interval
    // elapses.
    CycleScenario::new("flapping bus")
        .region(1, Direction::Output, 8)
        .region(2, Direction::Input, 8)
        .notify_policy(NotifyPolicy { interval: Duration::from_secs(1) })
        .cycle_period(Duration::from_millis(300))
        .healthy_cycle() // 0 -> X, immediate report
        .silent_cycle() // X -> 0, withheld
        .healthy_cycle() // 0 -> X, withheld
        .silent_cycle() // X -> 0, withheld
        .healthy_cycle() // 0 -> X, interval elapsed: batched report
        .oracle(Box::new(|world| {
            let notifications = world.notifications();
            if notifications.len() != 2 {
                return Err(format!("expected two reports, got {notifications:?}"));
            }
            if notifications[0].changes != 1 {
                return Err(format!("first report must be a single change: {notifications:?}"));
            }
            if notifications[1].changes != 4 {
                return Err(format!("second report must batch four flaps: {notifications:?}"));
            }

            let expected = world.image().expected_working_counter();
            if notifications[1].working_counter != expected {
                return Err(format!(
                    "batched report must carry the latest sum {expected}: {notifications:?}"
                ));
            }
            Ok(())
        }))
        .run()
        .unwrap();
}

/// A stable counter never notifies, however long the run.
#[test]
fn stable_counters_never_notify_after_the_first_report() {
    CycleScenario::new("stable bus")
        .region(1, Direction::Output, 8)
        .cycle_period(Duration::from_secs(2))
        .healthy_cycle()
        .healthy_cycle()
        .healthy_cycle()
        .healthy_cycle()
        .oracle(Box::new(|world| {
            // Cycles are farther apart than the rate limit, so nothing is
            // ever withheld; there is still only the one 0 -> X transition.
            let notifications = world.notifications();
            if notifications.len() != 1 {
                return Err(format!("expected exactly one report, got {notifications:?}"));
            }
            if world.image().state().wc_state != WcState::Complete {
                return Err("image must stay complete".into());
            }
            Ok(())
        }))
        .run()
        .unwrap();
}

/// Degradation and recovery inside one interval produce one batched report.
#[test]
fn dropout_and_recovery_report_the_final_sum() {
    CycleScenario::new("brief dropout")
        .region(1, Direction::Output, 8)
        .region(2, Direction::Output, 8)
        .notify_policy(NotifyPolicy { interval: Duration::from_secs(3600) })
        .cycle_period(Duration::from_millis(1))
        .healthy_cycle() // 0 -> 2, immediate report
        .silent_cycle() // 2 -> 0
        .healthy_cycle() // 0 -> 2
        .oracle(Box::new(|world| {
            let notifications = world.notifications();
            if notifications.len() != 1 {
                return Err(format!("interval never elapsed, got {notifications:?}"));
            }

            // The two later transitions stay pending; the aggregate state is
            // nevertheless current.
            let state = world.image().state();
            if state.working_counter != 2 || state.wc_state != WcState::Complete {
                return Err(format!("expected a recovered image, got {state:?}"));
            }
            Ok(())
        }))
        .run()
        .unwrap();
}
