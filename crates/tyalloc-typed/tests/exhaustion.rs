//! Integration test: primitive exhaustion surfaces as `OutOfMemory`.

use tyalloc_core::{AllocConfig, AllocError};
use tyalloc_test_utils::{BoundedAlloc, FailingAlloc};
use tyalloc_typed::{Instrumented, TypedAllocator};

#[test]
fn budget_exhaustion_is_out_of_memory_and_recoverable() {
    let primitive = BoundedAlloc::new(64);
    let alloc = TypedAllocator::<u64, _>::with_primitive(&primitive);

    let full = alloc.allocate(8).unwrap();
    let err = alloc.allocate(1).unwrap_err();
    assert_eq!(err, AllocError::OutOfMemory { bytes: 8, align: 8 });
    assert!(err.is_retryable());

    unsafe { alloc.deallocate(full, 8).unwrap() };
    let again = alloc.allocate(1).unwrap();
    unsafe { alloc.deallocate(again, 1).unwrap() };
}

#[test]
fn exhaustion_is_not_recorded_in_ledger() {
    let primitive = BoundedAlloc::new(16);
    let alloc = TypedAllocator::<u32, _>::with_config(&primitive, AllocConfig::tracked()).unwrap();

    let h = alloc.allocate(4).unwrap();
    assert!(matches!(
        alloc.allocate(1),
        Err(AllocError::OutOfMemory { .. })
    ));
    assert_eq!(alloc.ledger().unwrap().live_count(), 1);
    unsafe { alloc.deallocate(h, 4).unwrap() };
    assert_eq!(alloc.ledger().unwrap().live_count(), 0);
}

#[test]
fn too_large_is_permanent_and_skips_primitive() {
    let primitive = BoundedAlloc::unbounded();
    let alloc = TypedAllocator::<u8, _>::with_primitive(&primitive);

    let err = alloc.allocate(usize::MAX).unwrap_err();
    assert!(matches!(err, AllocError::AllocationTooLarge { .. }));
    assert!(!err.is_retryable());
    assert_eq!(primitive.allocate_calls(), 0);
}

#[test]
fn failing_primitive_counts_failures() {
    let primitive = Instrumented::new(FailingAlloc);
    let alloc = TypedAllocator::<u16, _>::with_primitive(&primitive);

    for n in 1..=5 {
        assert_eq!(
            alloc.allocate(n).unwrap_err(),
            AllocError::OutOfMemory {
                bytes: n * 2,
                align: 2,
            }
        );
    }
    // Zero-byte requests never reach the primitive.
    let h = alloc.allocate(0).unwrap();
    unsafe { alloc.deallocate(h, 0).unwrap() };

    assert_eq!(primitive.stats().failures, 5);
    assert_eq!(primitive.stats().allocations, 0);
}
