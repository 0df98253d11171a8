mod common;

use asset_tracker::{
    domain::{CashAccountInput, HoldingInput, LiabilityCurrency, LiabilityInput, OtherAssetInput},
    storage::JsonAssetStore,
    sync::{CashAccounts, EditorState, Holdings, RemoteCollection, RemoteError},
};

use common::setup_store;

#[test]
fn created_records_survive_a_reopen() {
    let (_store, mut portfolio, path) = setup_store();

    portfolio.cash_accounts.open_create();
    assert!(portfolio
        .cash_accounts
        .submit(&CashAccountInput::new("Wallet", "Alipay", 88.0)));
    portfolio.other_assets.open_create();
    let mut lent = OtherAssetInput::new("Loan to Sam", 500.0);
    lent.original_value_cny = Some(400.0);
    assert!(portfolio.other_assets.submit(&lent));

    let reopened = JsonAssetStore::open(&path).expect("reopen store");
    assert_eq!(reopened.records::<CashAccounts>()[0].name, "Wallet");
    assert_eq!(reopened.data().other_assets.records[0].return_pct, Some(25.0));
}

#[test]
fn store_rejection_rolls_the_controller_back() {
    let (_store, mut portfolio, _path) = setup_store();

    portfolio.holdings.open_create();
    assert!(!portfolio
        .holdings
        .submit(&HoldingInput::new("0700.hk", "Tencent", 2.5)));

    assert!(portfolio.holdings.items().is_empty());
    assert_eq!(portfolio.holdings.editor(), EditorState::Creating);
    let message = portfolio.holdings.error_message().expect("error reported");
    assert!(message.contains("whole units"), "{message}");
}

#[test]
fn stale_edit_after_external_delete_reports_not_found() {
    let (store, mut portfolio, _path) = setup_store();

    portfolio.liabilities.open_create();
    assert!(portfolio
        .liabilities
        .submit(&LiabilityInput::new("Mortgage", 1000.0)));
    let record = portfolio.liabilities.items()[0].clone();

    RemoteCollection::<asset_tracker::sync::Liabilities>::delete(
        &mut *store.borrow_mut(),
        record.id,
    )
    .expect("external delete");

    assert!(portfolio.liabilities.open_edit(&record));
    let mut input = LiabilityInput::new("Mortgage", 900.0);
    input.currency = LiabilityCurrency::Usd;
    assert!(!portfolio.liabilities.submit(&input));
    assert_eq!(portfolio.liabilities.items()[0], record);
    assert_eq!(
        portfolio.liabilities.error_message(),
        Some(format!("liability {} not found.", record.id).as_str())
    );

    assert!(portfolio.liabilities.refresh());
    assert!(portfolio.liabilities.items().is_empty());
}

#[test]
fn two_phase_create_against_the_store() {
    let (store, mut portfolio, _path) = setup_store();
    let input = CashAccountInput::new("Salary", "ICBC", 3000.0);

    portfolio.cash_accounts.open_create();
    let ticket = portfolio
        .cash_accounts
        .begin_submit(&input)
        .expect("editor is open");
    let provisional = portfolio.cash_accounts.items()[0].id;
    assert!(portfolio.cash_accounts.is_provisional(provisional));
    assert!(portfolio.cash_accounts.is_submitting());

    let outcome = RemoteCollection::<CashAccounts>::create(&mut *store.borrow_mut(), &input);
    assert!(portfolio.cash_accounts.finish_submit(ticket, outcome));

    let durable = portfolio.cash_accounts.items()[0].id;
    assert!(!portfolio.cash_accounts.is_provisional(durable));
    assert!(!portfolio.cash_accounts.is_submitting());
    assert_eq!(portfolio.cash_accounts.items()[0].value_cny, Some(3000.0));
}

#[test]
fn refresh_keeps_a_pending_delete_hidden() {
    let (store, mut portfolio, _path) = setup_store();
    portfolio.holdings.open_create();
    assert!(portfolio
        .holdings
        .submit(&HoldingInput::new("AAPL", "Apple", 3.0)));
    let record = portfolio.holdings.items()[0].clone();

    let ticket = portfolio.holdings.begin_remove(&record);
    assert!(portfolio.holdings.refresh());
    assert!(portfolio.holdings.items().is_empty());

    assert!(!portfolio
        .holdings
        .finish_remove(ticket, Err(RemoteError::new("offline"))));
    assert_eq!(portfolio.holdings.items(), &[record]);
    assert_eq!(portfolio.holdings.error_message(), Some("offline"));
    assert_eq!(
        RemoteCollection::<Holdings>::list(&mut *store.borrow_mut())
            .expect("list")
            .len(),
        1
    );
}
