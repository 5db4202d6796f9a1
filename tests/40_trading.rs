mod common;

use anyhow::Result;
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;

use finboard::records::TradeStatus;
use finboard::views::trading::TradingView;
use finboard::views::SubmitError;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_symbols(view: &TradingView) -> Vec<&str> {
    view.trades.iter().map(|t| t.symbol.as_str()).collect()
}

#[tokio::test]
async fn missing_trades_relation_serves_the_sample_dataset() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    // no trades table seeded: reads fail with a relation-missing error

    let mut view = TradingView::new();
    view.refresh(&gateway, None, Uuid::new_v4()).await;

    assert!(view.using_samples);
    assert_eq!(sample_symbols(&view), ["PTT", "CPALL", "KBANK"]);
    Ok(())
}

#[tokio::test]
async fn failed_trade_read_serves_the_sample_dataset() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    mock.seed_table("trades", vec![]);
    mock.fail_reads("trades");

    let mut view = TradingView::new();
    view.refresh(&gateway, None, Uuid::new_v4()).await;

    assert!(view.using_samples);
    assert_eq!(view.trades.len(), 3);
    Ok(())
}

#[tokio::test]
async fn empty_trade_list_serves_the_sample_dataset() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    mock.seed_table("trades", vec![]);

    let mut view = TradingView::new();
    view.refresh(&gateway, None, Uuid::new_v4()).await;

    assert!(view.using_samples);
    assert_eq!(sample_symbols(&view), ["PTT", "CPALL", "KBANK"]);
    Ok(())
}

#[tokio::test]
async fn real_rows_replace_the_samples() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    let user_id = Uuid::new_v4();

    mock.seed_table(
        "trades",
        vec![json!({
            "id": Uuid::new_v4(),
            "user_id": user_id,
            "symbol": "AOT",
            "type": "buy",
            "quantity": 200,
            "entry_price": 61.25,
            "exit_price": null,
            "entry_date": "2024-03-01",
            "exit_date": null,
            "strategy": "Breakout",
            "notes": null,
            "status": "open",
            "profit_loss": null,
            "profit_loss_percentage": null
        })],
    );

    let mut view = TradingView::new();
    view.refresh(&gateway, None, user_id).await;

    assert!(!view.using_samples);
    assert_eq!(sample_symbols(&view), ["AOT"]);
    assert_eq!(view.trades[0].status, TradeStatus::Open);
    Ok(())
}

#[tokio::test]
async fn submit_derives_profit_loss_for_closed_trades() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    let user_id = Uuid::new_v4();
    mock.seed_table("trades", vec![]);

    let mut view = TradingView::new();
    view.draft.symbol = "ptt".into();
    view.draft.quantity = "1000".into();
    view.draft.entry_price = "35.50".into();
    view.draft.exit_price = "38.75".into();
    view.draft.entry_date = "2024-01-15".into();
    view.draft.exit_date = "2024-01-20".into();
    view.draft.status = TradeStatus::Closed;

    view.submit(&gateway, None, user_id).await?;

    let rows = mock.rows("trades");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["symbol"], "PTT");
    assert_eq!(rows[0]["profit_loss"], "3250.00");
    assert_eq!(rows[0]["profit_loss_percentage"], "9.15");

    // the re-read shows the stored trade, not the samples
    assert!(!view.using_samples);
    assert_eq!(view.trades.len(), 1);
    assert_eq!(view.trades[0].profit_loss, Some(dec("3250.00")));

    // draft reset for the next entry
    assert!(view.draft.symbol.is_empty());
    assert_eq!(view.draft.status, TradeStatus::Open);
    Ok(())
}

#[tokio::test]
async fn failed_trade_insert_keeps_the_draft() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();
    mock.seed_table("trades", vec![]);
    mock.fail_inserts("trades");

    let mut view = TradingView::new();
    view.draft.symbol = "PTT".into();
    view.draft.quantity = "100".into();
    view.draft.entry_price = "35.50".into();

    let result = view.submit(&gateway, None, Uuid::new_v4()).await;

    assert!(matches!(result, Err(SubmitError::Gateway(_))));
    assert_eq!(view.draft.symbol, "PTT");
    assert_eq!(view.draft.quantity, "100");
    assert!(mock.rows("trades").is_empty());
    Ok(())
}

#[tokio::test]
async fn stats_over_sample_fallback_match_the_fixture() -> Result<()> {
    let mock = common::MockGateway::start().await?;
    let gateway = mock.client();

    let mut view = TradingView::new();
    view.refresh(&gateway, None, Uuid::new_v4()).await;

    let stats = view.stats();
    assert_eq!(stats.total_profit, dec("5000"));
    assert_eq!(stats.win_rate, dec("100.00"));
    assert_eq!(stats.open_count, 1);

    let top = view.top_symbols(5);
    assert_eq!(top.len(), 3);
    assert!(top.iter().all(|s| s.count == 1));
    Ok(())
}
