use std::collections::BTreeMap;

use perf_block::{PerfEvent, PerfEventBlock};

fn main() {
    // Open counter errors are reported through the log crate.
    env_logger::init();

    let mut perf = PerfEvent::new();
    if perf.is_empty() {
        eprintln!("no counters available, check /proc/sys/kernel/perf_event_paranoid");
    }

    let n = 1_000_000u64;
    for &map_size in &[1_000u64, 100_000] {
        perf.set_param("map_size", map_size);

        let mut map = BTreeMap::new();
        for i in 0..map_size {
            map.insert(i, i);
        }

        // Dropping the block stops the counters and prints one report row,
        // normalised to events per lookup.
        let _block = PerfEventBlock::new(&mut perf, n);
        let mut hits = 0u64;
        for i in 0..n {
            let key = i.wrapping_mul(2654435761) % map_size;
            if map.contains_key(&key) {
                hits += 1;
            }
        }
        assert_eq!(hits, n);
    }
}
