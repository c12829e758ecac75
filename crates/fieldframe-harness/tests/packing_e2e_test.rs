//! End-to-end packing and cycle scenarios.

use std::time::Instant;

use fieldframe_core::{ProcessImage, WcState};
use fieldframe_harness::{CycleScenario, SimTransport};
use fieldframe_proto::{DeviceId, Direction, FrameKind, MAX_FRAME_PAYLOAD, Path};

/// Three devices whose regions straddle one payload ceiling.
///
/// 600 + 900 bytes of outputs exceed the ceiling, so device B starts the
/// second window and shares it with device C's inputs.
fn build_image() -> ProcessImage {
    let mut image = ProcessImage::new(1);
    image.add_region(DeviceId(10), Direction::Output, 600).unwrap();
    image.add_region(DeviceId(20), Direction::Output, 900).unwrap();
    image.add_region(DeviceId(30), Direction::Input, 300).unwrap();
    image.finish(0x0800_0000).unwrap();
    image
}

#[test]
fn straddling_regions_split_into_write_then_read_write() {
    let image = build_image();
    let windows = image.windows();

    assert_eq!(windows.len(), 2);

    assert_eq!(windows[0].logical_address, 0x0800_0000);
    assert_eq!(windows[0].size, 600);
    assert_eq!(windows[0].kind, FrameKind::WriteOnly);
    assert_eq!(windows[0].expected_working_counter, 1);

    assert_eq!(windows[1].logical_address, 0x0800_0000 + 600);
    assert_eq!(windows[1].size, 1200);
    assert!(windows[1].size <= MAX_FRAME_PAYLOAD);
    assert_eq!(windows[1].kind, FrameKind::ReadWrite);
    // one output device counted twice, one input device counted once
    assert_eq!(windows[1].expected_working_counter, 3);

    assert_eq!(image.expected_working_counter(), 4);
}

#[test]
fn every_pair_is_submitted_once_per_cycle_in_packing_order() {
    let image = build_image();
    let mut transport = SimTransport::new();

    image.queue(&mut transport);

    let frames = transport.submissions();
    assert_eq!(frames.len(), 4);

    // main then backup per window, windows in packing order
    assert_eq!(frames[0].path, Path::Main);
    assert_eq!(frames[0].logical_address, 0x0800_0000);
    assert_eq!(frames[1].path, Path::Backup);
    assert_eq!(frames[1].logical_address, 0x0800_0000);
    assert_eq!(frames[2].path, Path::Main);
    assert_eq!(frames[2].logical_address, 0x0800_0000 + 600);
    assert_eq!(frames[3].path, Path::Backup);
    assert_eq!(frames[3].logical_address, 0x0800_0000 + 600);

    assert_eq!(frames[0].label, "image1-134217728-main");
    assert_eq!(frames[1].label, "image1-134217728-backup");
}

#[test]
fn fully_acknowledged_cycle_reaches_complete() {
    let image = build_image();
    let mut transport = SimTransport::new();

    image.queue(&mut transport);

    // Each window's main frame returns its own expectation.
    let windows = image.windows();
    let main_tokens: Vec<_> = transport
        .submissions()
        .iter()
        .filter(|frame| frame.path == Path::Main)
        .map(|frame| frame.token)
        .collect();
    for (token, window) in main_tokens.into_iter().zip(&windows) {
        transport.complete(token, window.expected_working_counter);
    }

    image.process(&transport, Instant::now());

    let state = image.state();
    assert_eq!(state.working_counter, 4);
    assert_eq!(state.expected_working_counter, 4);
    assert_eq!(state.wc_state, WcState::Complete);
}

#[test]
fn healthy_scenario_completes_and_notifies_once() {
    CycleScenario::new("healthy bus")
        .region(10, Direction::Output, 600)
        .region(20, Direction::Output, 900)
        .region(30, Direction::Input, 300)
        .base_address(0x0800_0000)
        .healthy_cycle()
        .healthy_cycle()
        .healthy_cycle()
        .oracle(Box::new(|world| {
            let state = world.image().state();
            if state.wc_state != WcState::Complete {
                return Err(format!("expected a complete image, got {state:?}"));
            }

            // One transition (0 -> 4) across three cycles.
            let notifications = world.notifications();
            if notifications.len() != 1 || notifications[0].changes != 1 {
                return Err(format!("expected one single-change report, got {notifications:?}"));
            }
            Ok(())
        }))
        .run()
        .unwrap();
}

#[test]
fn silent_scenario_stays_at_zero_without_notifications() {
    CycleScenario::new("dead bus")
        .region(10, Direction::Output, 8)
        .silent_cycle()
        .silent_cycle()
        .oracle(Box::new(|world| {
            let state = world.image().state();
            if state.wc_state != WcState::Zero {
                return Err(format!("expected a zero image, got {state:?}"));
            }
            if !world.notifications().is_empty() {
                return Err("a never-changing counter must not notify".into());
            }
            Ok(())
        }))
        .run()
        .unwrap();
}
