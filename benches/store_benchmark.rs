use cachestore::{BoundedTimedMap, Store, StoreKey};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_put_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("put_sequential");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("bounded", size), size, |b, &size| {
            b.iter(|| {
                let mut map: BoundedTimedMap<i32> = BoundedTimedMap::new(size, 60_000);
                for i in 0..(size * 2) {
                    map.put(StoreKey::single(format!("key{}", i)), black_box(i as i32));
                }
                map.len()
            })
        });
    }

    group.finish();
}

fn bench_get_hit_miss_mix(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_miss_mix");

    for size in [100, 1000].iter() {
        group.bench_with_input(BenchmarkId::new("bounded", size), size, |b, &size| {
            let mut map: BoundedTimedMap<i32> = BoundedTimedMap::new(size, 60_000);
            for i in 0..size {
                map.put(StoreKey::single(format!("key{}", i)), i as i32);
            }
            b.iter(|| {
                let mut found = 0;
                for i in 0..size {
                    // Every other lookup misses
                    if map.get(&StoreKey::single(format!("key{}", i * 2))).is_some() {
                        found += 1;
                    }
                }
                black_box(found)
            })
        });
    }

    group.finish();
}

fn bench_store_locked_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_locked_ops");

    group.bench_function("put_get_through_lock", |b| {
        let store: Store<i32> = Store::new(None, "bench", 1000, 60);
        for i in 0..1000 {
            store.put_str(&format!("key{}", i), Some(i));
        }
        b.iter(|| {
            store.put_str("hot", Some(1));
            black_box(store.get_str("hot"))
        })
    });

    group.bench_function("multi_part_key_lookup", |b| {
        let store: Store<i32> = Store::new(None, "bench", 1000, 60);
        for i in 0..1000 {
            store.put(StoreKey::pair("user", format!("{}", i)), Some(i));
        }
        b.iter(|| black_box(store.get(&StoreKey::pair("user", "500"))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_put_sequential,
    bench_get_hit_miss_mix,
    bench_store_locked_ops
);
criterion_main!(benches);
