//! Shared holders coordinating release through the reference delta.

use std::sync::Arc;
use std::thread;

use bytebuf::{Buffer, BufferPool};
use bytepool::SizeClassPool;

#[test]
fn exactly_one_holder_releases() {
    let bytes = Arc::new(SizeClassPool::new(2, 8192));
    let buffers = Arc::new(BufferPool::new(Arc::clone(&bytes)));

    for _ in 0..50 {
        let mut buf = buffers.make(256);
        buf.write_string("broadcast frame");
        let holders = 4;
        buf.ref_add(holders - 1);
        let shared = Arc::new(buf);

        let handles: Vec<_> = (0..holders)
            .map(|_| {
                let mine = Arc::clone(&shared);
                thread::spawn(move || {
                    assert_eq!(mine.bytes(), b"broadcast frame");
                    mine.ref_swap_dec() <= 0
                })
            })
            .collect();
        drop(shared);

        let last: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(last.iter().filter(|&&l| l).count(), 1);
    }
}

#[test]
fn release_shared_returns_memory_once() {
    let bytes = Arc::new(SizeClassPool::new(2, 8192));
    let buffers = Arc::new(BufferPool::new(Arc::clone(&bytes)));
    let buf = buffers.make(512);
    buf.ref_inc();
    let a = Arc::new(buf);
    let b = Arc::clone(&a);

    let t = thread::spawn(move || Buffer::release_shared(b));
    let first = t.join().unwrap();
    let second = Buffer::release_shared(a);

    assert!(!first);
    assert!(second);
    assert_eq!(bytes.pooled_in_class(512), 1);
    assert_eq!(buffers.idle(), 1);
}

#[test]
fn guard_scopes_a_reference() {
    let buffers = Arc::new(BufferPool::new(Arc::new(SizeClassPool::default())));
    let buf = buffers.get();
    thread::scope(|s| {
        let guard = buf.ref_guard();
        s.spawn(move || {
            assert!(guard.ref_load() >= 1);
        });
    });
    assert_eq!(buf.ref_load(), 0);
    assert!(buf.release());
}
