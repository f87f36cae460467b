/// json state - snapshot serialization for persistence and debugging
use installment_engine_rs::{
    Actor, EngineConfig, InstallmentLedger, Money, PaymentMethod, PaymentProcessor,
    PaymentRequest, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let config = EngineConfig::default();
    let ledger = InstallmentLedger::new();

    let user_id = Uuid::new_v4();
    let (purchase, installments) = ledger.register_purchase(
        user_id,
        Money::from_major(600),
        3,
        time.now().date_naive(),
        dec!(10),
        &config,
        &time,
    )?;

    println!("stage 1: plan materialized");
    println!("--------------------------");
    println!("{}\n", ledger.to_json()?);

    // pay one installment early
    controller.advance(Duration::days(10));
    let processor = PaymentProcessor::new(&ledger, config);
    let quote = processor.quote_now(installments[0].id, &time)?;
    processor.apply_payment_now(
        &PaymentRequest::new(installments[0].id, quote.amount_due, PaymentMethod::Card, Actor::User(user_id)),
        &time,
    )?;

    println!("stage 2: first installment paid early");
    println!("-------------------------------------");
    println!("{}\n", ledger.to_json()?);

    // round-trip through json and keep working against the restored ledger
    let restored = InstallmentLedger::from_json(&ledger.to_json()?)?;
    println!(
        "restored ledger: purchase {} has {} installments, {} payment(s)",
        purchase.id,
        restored.installments_for_purchase(purchase.id).len(),
        restored.payment_count(),
    );

    Ok(())
}
