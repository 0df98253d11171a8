use std::{cell::RefCell, rc::Rc};

use asset_tracker::domain::{CashAccountInput, HoldingInput};
use asset_tracker::storage::{load_store_from_path, save_store_to_path, JsonAssetStore};
use asset_tracker::sync::{
    CashAccounts, Collaborators, CollectionController, Holdings, RemoteCollection, SubmitTicket,
};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::tempdir;

fn build_sample_store(count: usize) -> JsonAssetStore {
    let mut store = JsonAssetStore::in_memory();
    for idx in 0..count {
        let holding = HoldingInput::new(format!("SYM{idx:05}"), format!("Security {idx}"), 10.0);
        RemoteCollection::<Holdings>::create(&mut store, &holding).expect("seed holding");
        let account = CashAccountInput::new(format!("Account {idx}"), "Bank", 100.0 + idx as f64);
        RemoteCollection::<CashAccounts>::create(&mut store, &account).expect("seed account");
    }
    store
}

fn bench_refresh(c: &mut Criterion) {
    let store = Rc::new(RefCell::new(build_sample_store(black_box(5_000))));

    c.bench_function("refresh_holdings_5k", |b| {
        let mut controller =
            CollectionController::<Holdings>::new(Collaborators::backed_by(Rc::clone(&store)));
        b.iter(|| {
            assert!(controller.refresh());
            black_box(controller.items().len());
        })
    });

    c.bench_function("refresh_with_pending_edits_5k", |b| {
        b.iter_batched(
            || {
                let mut controller = CollectionController::<CashAccounts>::new(
                    Collaborators::backed_by(Rc::clone(&store)),
                );
                controller.refresh();
                let targets: Vec<_> = controller.items().iter().take(200).cloned().collect();
                let mut tickets: Vec<SubmitTicket> = Vec::with_capacity(targets.len());
                for record in targets {
                    controller.open_edit(&record);
                    let input = CashAccountInput::new(record.name.clone(), "Broker", 1.0);
                    if let Some(ticket) = controller.begin_submit(&input) {
                        tickets.push(ticket);
                    }
                }
                (controller, tickets)
            },
            |(mut controller, tickets)| {
                assert!(controller.refresh());
                black_box((controller.items().len(), tickets.len()));
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_store_io(c: &mut Criterion) {
    let store = build_sample_store(black_box(5_000));
    let dir = tempdir().expect("tempdir");
    let file_path = dir.path().join("assets.json");

    c.bench_function("store_save_5k", |b| {
        b.iter(|| {
            save_store_to_path(store.data(), &file_path).expect("save store");
        })
    });

    save_store_to_path(store.data(), &file_path).expect("seed");

    c.bench_function("store_load_5k", |b| {
        b.iter(|| {
            let loaded = load_store_from_path(&file_path).expect("load store");
            black_box(loaded);
        })
    });
}

criterion_group!(benches, bench_refresh, bench_store_io);
criterion_main!(benches);
