//! One-time initialization of a runtime-probed vector width.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use vx::{backend, lane_width, LaneWidthCell};

const THREADS: usize = 16;

/// All first callers race on the cell; the probe must run exactly once.
#[test]
fn test_concurrent_first_calls_probe_once() {
    static CELL: LaneWidthCell = LaneWidthCell::new();
    static HARDWARE_QUERIES: AtomicUsize = AtomicUsize::new(0);

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                CELL.get_or_probe(|| {
                    HARDWARE_QUERIES.fetch_add(1, Ordering::SeqCst);
                    // keep the probe slow enough for the others to pile up
                    thread::sleep(Duration::from_millis(20));
                    16
                })
            })
        })
        .collect();

    let widths: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(widths.iter().all(|&w| w == 16), "{widths:?}");
    assert_eq!(HARDWARE_QUERIES.load(Ordering::SeqCst), 1);
    assert_eq!(CELL.probe_count(), 1);
    assert_eq!(CELL.get(), Some(16));
}

#[test]
fn test_active_width_is_shared_across_threads() {
    let expected = lane_width();

    let widths: Vec<usize> = (0..THREADS)
        .map(|_| thread::spawn(lane_width))
        .map(|h| h.join().unwrap())
        .collect();

    assert!(widths.iter().all(|&w| w == expected));
    assert_eq!(backend().lane_width, expected);
}

#[cfg(sve)]
#[test]
fn test_sve_width_is_probed_once_across_threads() {
    let widths: Vec<usize> = (0..THREADS)
        .map(|_| thread::spawn(lane_width))
        .map(|h| h.join().unwrap())
        .collect();

    assert!(widths.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(vx::simd::sve::probe_count(), 1);
}
