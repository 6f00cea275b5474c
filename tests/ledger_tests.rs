// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use moneytrack::commands::doctor;
use moneytrack::db::{Store, Table};
use moneytrack::ledger::{
    AddBitcoinTransaction, AddTransaction, BitcoinTrade, DeleteTransaction, RemoveTransaction,
};
use moneytrack::models::{NewTransaction, TransactionType};
use moneytrack::repo::{accounts, categories, holdings, transactions};
use moneytrack::seed::seed_if_empty;
use rust_decimal::Decimal;

async fn setup(balance: i64) -> (Store, i64) {
    let store = Store::open_in_memory().unwrap();
    seed_if_empty(&store).await.unwrap();
    let id = store
        .write(&[Table::Accounts], move |tx| {
            Ok(accounts::insert(tx, "Banco", Decimal::from(balance), "BANK")?.id)
        })
        .await
        .unwrap();
    (store, id)
}

async fn balance(store: &Store, id: i64) -> Decimal {
    store
        .read(move |c| Ok(accounts::get(c, id)?.unwrap().current_balance))
        .await
        .unwrap()
}

async fn total_sats(store: &Store) -> i64 {
    store.read(holdings::total_sats).await.unwrap()
}

fn expense(account_id: i64, amount: Decimal) -> NewTransaction {
    NewTransaction {
        account_id,
        category_id: None,
        amount,
        date: 1_740_000_000_000,
        note: None,
    }
}

#[tokio::test]
async fn expense_to_zero_and_back() {
    let (store, id) = setup(100).await;
    let stored = AddTransaction::new(store.clone())
        .execute(expense(id, Decimal::from(100)), true)
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::ZERO);

    DeleteTransaction::new(store.clone())
        .execute(stored, true)
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(100));
    assert!(store.read(transactions::list).await.unwrap().is_empty());
}

#[tokio::test]
async fn overdrawn_expense_changes_nothing() {
    let (store, id) = setup(50).await;
    let err = AddTransaction::new(store.clone())
        .execute(expense(id, Decimal::from(60)), true)
        .await
        .unwrap_err();
    assert!(err.is_insufficient_balance());
    assert_eq!(err.to_string(), "Saldo insuficiente en la cuenta");
    assert_eq!(balance(&store, id).await, Decimal::from(50));
    assert!(store.read(transactions::list).await.unwrap().is_empty());

    // income is never limited by the balance
    AddTransaction::new(store.clone())
        .execute(expense(id, Decimal::from(60)), false)
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(110));
}

#[tokio::test]
async fn buy_links_both_legs() {
    let (store, id) = setup(5000).await;
    let tx_id = AddBitcoinTransaction::new(store.clone())
        .execute(BitcoinTrade::buy(
            id,
            100_000,
            Decimal::from(50),
            Decimal::from(50_000),
        ))
        .await
        .unwrap();

    assert_eq!(balance(&store, id).await, Decimal::from(4950));
    assert_eq!(total_sats(&store).await, 100_000);

    let (row, holding) = store
        .read(move |c| {
            Ok((
                transactions::get_with_category(c, tx_id)?.unwrap(),
                holdings::by_transaction_id(c, tx_id)?.unwrap(),
            ))
        })
        .await
        .unwrap();
    assert_eq!(row.transaction.amount, Decimal::from(-50));
    assert_eq!(row.transaction.note.as_deref(), Some("Compra Bitcoin (100000 sats)"));
    assert_eq!(
        row.category.map(|c| c.transaction_type),
        Some(TransactionType::Bitcoin)
    );
    assert_eq!(holding.sats_amount, 100_000);
    assert_eq!(holding.last_fiat_price, Decimal::from(50_000));
}

#[tokio::test]
async fn oversized_sell_is_rejected() {
    let (store, id) = setup(5000).await;
    let trades = AddBitcoinTransaction::new(store.clone());
    trades
        .execute(BitcoinTrade::buy(id, 50_000, Decimal::from(25), Decimal::from(50_000)))
        .await
        .unwrap();

    let err = trades
        .execute(BitcoinTrade::sell(id, 100_000, Decimal::from(50), Decimal::from(50_000)))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Saldo insuficiente de Bitcoin");
    assert_eq!(total_sats(&store).await, 50_000);
    assert_eq!(balance(&store, id).await, Decimal::from(4975));
    assert_eq!(store.read(transactions::list).await.unwrap().len(), 1);
}

#[tokio::test]
async fn removing_a_sell_restores_balance_and_sats() {
    let (store, id) = setup(1000).await;
    let trades = AddBitcoinTransaction::new(store.clone());
    trades
        .execute(BitcoinTrade::buy(id, 200_000, Decimal::from(100), Decimal::from(50_000)))
        .await
        .unwrap();
    let sell_id = trades
        .execute(BitcoinTrade::sell(id, 50_000, Decimal::from(30), Decimal::from(60_000)))
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(930));
    assert_eq!(total_sats(&store).await, 150_000);

    RemoveTransaction::new(store.clone())
        .execute(sell_id)
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(900));
    assert_eq!(total_sats(&store).await, 200_000);

    let err = RemoveTransaction::new(store.clone())
        .execute(sell_id)
        .await
        .unwrap_err();
    assert!(err.to_string().contains(&sell_id.to_string()));
}

#[tokio::test]
async fn removing_by_id_uses_the_category_type() {
    let (store, id) = setup(100).await;
    let (food, salary) = store
        .read(|c| {
            Ok((
                categories::find_by_name(c, "Comida")?.unwrap().id,
                categories::find_by_name(c, "Salario")?.unwrap().id,
            ))
        })
        .await
        .unwrap();
    let add = AddTransaction::new(store.clone());
    let spent = add
        .execute(
            NewTransaction { category_id: Some(food), ..expense(id, Decimal::from(40)) },
            true,
        )
        .await
        .unwrap();
    let earned = add
        .execute(
            NewTransaction { category_id: Some(salary), ..expense(id, Decimal::from(500)) },
            false,
        )
        .await
        .unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(560));

    let remove = RemoveTransaction::new(store.clone());
    remove.execute(spent.id).await.unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(600));
    remove.execute(earned.id).await.unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(100));
}

#[tokio::test]
async fn concurrent_expenses_never_lose_updates() {
    let (store, id) = setup(500).await;
    let mut handles = Vec::new();
    for _ in 0..100 {
        let add = AddTransaction::new(store.clone());
        handles.push(tokio::spawn(async move {
            add.execute(expense(id, Decimal::from(10)), true).await
        }));
    }
    let mut ok = 0;
    for h in handles {
        match h.await.unwrap() {
            Ok(_) => ok += 1,
            Err(e) => assert!(e.is_insufficient_balance()),
        }
    }
    assert_eq!(ok, 50);
    assert_eq!(balance(&store, id).await, Decimal::ZERO);
    assert_eq!(store.read(transactions::list).await.unwrap().len(), 50);
}

#[tokio::test]
async fn doctor_reports_fiat_leg_without_holding() {
    let (store, id) = setup(1000).await;
    assert!(doctor::diagnose(&store).await.unwrap().is_empty());

    let tx_id = AddBitcoinTransaction::new(store.clone())
        .execute(BitcoinTrade::buy(id, 10_000, Decimal::from(6), Decimal::from(60_000)))
        .await
        .unwrap();
    store
        .write(&[Table::BitcoinHoldings], move |tx| {
            let h = holdings::by_transaction_id(tx, tx_id)?.unwrap();
            holdings::delete(tx, h.id)
        })
        .await
        .unwrap();

    let issues = doctor::diagnose(&store).await.unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].0, "bitcoin_transaction_without_holding");

    // the unlinked leg is reversed as a signed amount
    RemoveTransaction::new(store.clone()).execute(tx_id).await.unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(1000));
}

#[tokio::test]
async fn expense_with_deleted_category_is_credited_back() {
    let (store, id) = setup(100).await;
    let food = store
        .read(|c| Ok(categories::find_by_name(c, "Comida")?.unwrap().id))
        .await
        .unwrap();
    let spent = AddTransaction::new(store.clone())
        .execute(
            NewTransaction { category_id: Some(food), ..expense(id, Decimal::from(30)) },
            true,
        )
        .await
        .unwrap();
    store
        .write(&[Table::Categories, Table::Transactions], move |tx| {
            categories::delete(tx, food)
        })
        .await
        .unwrap();

    RemoveTransaction::new(store.clone()).execute(spent.id).await.unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(100));
}

#[tokio::test]
async fn linked_leg_without_category_still_removes_its_holding() {
    let (store, id) = setup(1000).await;
    let tx_id = AddBitcoinTransaction::new(store.clone())
        .execute(BitcoinTrade::buy(id, 20_000, Decimal::from(12), Decimal::from(60_000)))
        .await
        .unwrap();
    store
        .write(&[Table::Categories, Table::Transactions], |tx| {
            let btc = categories::by_transaction_type(tx, TransactionType::Bitcoin)?.unwrap();
            categories::delete(tx, btc.id)
        })
        .await
        .unwrap();
    let leg = store
        .read(move |c| Ok(transactions::get_with_category(c, tx_id)?.unwrap()))
        .await
        .unwrap();
    assert!(leg.category.is_none());

    RemoveTransaction::new(store.clone()).execute(tx_id).await.unwrap();
    assert_eq!(balance(&store, id).await, Decimal::from(1000));
    assert_eq!(total_sats(&store).await, 0);
    assert!(store.read(holdings::list).await.unwrap().is_empty());
}
