#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use bytebuf::BufferPool;
use bytepool::SizeClassPool;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let pool = Arc::new(BufferPool::new(Arc::new(SizeClassPool::new(
        usize::from(data[0] % 16),
        usize::from(data[1]) * 32,
    ))));

    // Mirror every operation on a plain Vec and compare.
    let mut buf = pool.get();
    let mut model: Vec<u8> = Vec::new();
    for chunk in data[2..].chunks(3) {
        let arg = usize::from(*chunk.get(1).unwrap_or(&0)) * 7;
        match chunk[0] % 7 {
            0 => {
                buf.write_bytes(chunk);
                model.extend_from_slice(chunk);
            }
            1 => {
                buf.write_byte(chunk[0]);
                model.push(chunk[0]);
            }
            2 => {
                let n = arg.min(model.len());
                buf.truncate(n);
                model.truncate(n);
            }
            3 => {
                buf.guarantee(arg);
                assert!(buf.capacity() >= model.len() + arg);
            }
            4 => {
                buf.grow(arg);
                buf.bytes_mut()[model.len()..].fill(0xAB);
                model.resize(model.len() + arg, 0xAB);
            }
            5 => {
                let copy = buf.clone();
                assert_eq!(copy.bytes(), model.as_slice());
                copy.put();
            }
            _ => {
                buf.put();
                buf = pool.get();
                model.clear();
            }
        }
        assert_eq!(buf.bytes(), model.as_slice());
    }
});
