//! Layout guarantees of the aligned allocator.
//!
//! Every buffer must be a whole number of lanes long, start on an aligned
//! address and carry a zeroed tail, for any requested size.

use vx::{allocate, alignment, copy, free, lane_width, padded_len, AlignedBuf, VxError};

#[test]
fn test_padded_length_and_zero_tail() {
    let lanes = lane_width();

    for size in 0..=4 * lanes + 1 {
        let buf = allocate(size).unwrap();
        assert_eq!(buf.len(), size.div_ceil(lanes) * lanes, "size {size}");
        assert_eq!(buf.len(), padded_len(size));
        assert_eq!(buf.logical_len(), size);
        assert!(buf[size..].iter().all(|&v| v == 0.0), "size {size}");
        free(buf);
    }
}

#[test]
fn test_base_address_alignment() {
    assert_eq!(alignment(), lane_width() * std::mem::size_of::<f32>());

    // allocate a few at once so they are not all recycled from the same slot
    let bufs: Vec<AlignedBuf> = [1, 5, 17, 63, 1024, 4097]
        .iter()
        .map(|&size| allocate(size).unwrap())
        .collect();

    for buf in &bufs {
        assert_eq!(
            buf.as_ptr() as usize % alignment(),
            0,
            "buffer of {} elements is misaligned",
            buf.logical_len()
        );
    }
}

#[test]
fn test_copy_round_trip() {
    let data: Vec<f32> = (0..37).map(|i| i as f32 * 0.25 - 3.0).collect();
    let src = AlignedBuf::from_slice(&data).unwrap();
    let mut dst = allocate(data.len()).unwrap();

    copy(&mut dst, &src, data.len()).unwrap();
    assert_eq!(dst.logical(), data.as_slice());
    assert!(dst[data.len()..].iter().all(|&v| v == 0.0));
}

#[test]
fn test_copy_between_plain_slices() {
    let src = [1.0f32, 2.0, 3.0, 4.0];
    let mut dst = [0.0f32; 6];

    copy(&mut dst, &src, 3).unwrap();
    assert_eq!(dst, [1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_oversized_request_is_an_error_not_a_panic() {
    match allocate(usize::MAX / 4) {
        Err(VxError::Layout { .. }) | Err(VxError::Allocation { .. }) => {}
        other => panic!("expected an allocation error, got {other:?}"),
    }
}

#[test]
fn test_buffers_move_across_threads() {
    let mut buf = AlignedBuf::from_slice(&[1.0, 2.0, 3.0]).unwrap();

    let handle = std::thread::spawn(move || {
        buf.logical_mut()[0] = 42.0;
        buf
    });
    let buf = handle.join().unwrap();

    assert_eq!(buf.logical(), &[42.0, 2.0, 3.0]);
}
