//! Buffer-swap serialization against the cyclic task.
//!
//! Installing external memory must hold the image's cycle lock, so a swap
//! can never interleave with a cycle that is referencing the buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use fieldframe_core::ProcessImage;
use fieldframe_harness::SimTransport;
use fieldframe_proto::{DeviceId, Direction};

fn build_image() -> ProcessImage {
    let mut image = ProcessImage::new(0);
    image.add_region(DeviceId(1), Direction::Output, 8).unwrap();
    image.finish(0).unwrap();
    image
}

#[test]
fn external_memory_blocks_while_the_cycle_lock_is_held() {
    let image = Arc::new(build_image());
    let swapped = Arc::new(AtomicBool::new(false));

    // Holding the data guard holds the same lock queue/process take.
    let guard = image.data();

    let swapper = {
        let image = Arc::clone(&image);
        let swapped = Arc::clone(&swapped);
        thread::spawn(move || {
            image.external_memory(vec![0u8; 8].into_boxed_slice()).unwrap();
            swapped.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(100));
    assert!(!swapped.load(Ordering::SeqCst), "swap must wait for the cycle lock");

    drop(guard);
    swapper.join().unwrap();
    assert!(swapped.load(Ordering::SeqCst));
}

#[test]
fn concurrent_swaps_never_disturb_running_cycles() {
    let image = Arc::new(build_image());
    let stop = Arc::new(AtomicBool::new(false));

    let cyclic = {
        let image = Arc::clone(&image);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            let mut transport = SimTransport::new();
            let mut cycles = 0u32;
            while !stop.load(Ordering::SeqCst) {
                transport.clear_submissions();
                image.queue(&mut transport);
                assert_eq!(transport.submissions().len(), 2);
                transport.complete_all(1);
                image.process(&transport, Instant::now());
                cycles += 1;
            }
            cycles
        })
    };

    for round in 0..200u8 {
        image.external_memory(vec![round; 16].into_boxed_slice()).unwrap();
    }

    stop.store(true, Ordering::SeqCst);
    let cycles = cyclic.join().unwrap();
    assert!(cycles > 0);
}
