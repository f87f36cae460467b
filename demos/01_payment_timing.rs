/// payment timing - early discount, on-time, and late surcharge pricing
use installment_engine_rs::{
    Actor, EngineConfig, InstallmentLedger, Money, PaymentMethod, PaymentProcessor,
    PaymentRequest, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== payment timing ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let config = EngineConfig::default();
    let ledger = InstallmentLedger::new();

    // three installments of $100, due at 30-day intervals
    let user_id = Uuid::new_v4();
    let (_, installments) = ledger.register_purchase(
        user_id,
        Money::from_major(300),
        3,
        time.now().date_naive(),
        dec!(0),
        &config,
        &time,
    )?;
    let processor = PaymentProcessor::new(&ledger, config);

    // installment 1: pay 10 days early, 5% discount
    controller.advance(Duration::days(20));
    let quote = processor.quote_now(installments[0].id, &time)?;
    println!("installment 1 on {}: {:?}, due {}", time.now().date_naive(), quote.timing, quote.amount_due);
    processor.apply_payment_now(
        &PaymentRequest::new(installments[0].id, quote.amount_due, PaymentMethod::Card, Actor::User(user_id)),
        &time,
    )?;

    // installment 2: pay exactly on the due date, no adjustment
    controller.advance(Duration::days(40));
    assert_eq!(time.now().date_naive(), installments[1].due_date);
    let quote = processor.quote_now(installments[1].id, &time)?;
    println!("installment 2 on {}: {:?}, due {}", time.now().date_naive(), quote.timing, quote.amount_due);
    processor.apply_payment_now(
        &PaymentRequest::new(installments[1].id, quote.amount_due, PaymentMethod::Transfer, Actor::User(user_id)),
        &time,
    )?;

    // installment 3: pay 15 days late, 8% surcharge
    controller.advance(Duration::days(45));
    let quote = processor.quote_now(installments[2].id, &time)?;
    println!("installment 3 on {}: {:?}, due {}", time.now().date_naive(), quote.timing, quote.amount_due);
    processor.apply_payment_now(
        &PaymentRequest::new(installments[2].id, quote.amount_due, PaymentMethod::Cash, Actor::User(user_id)),
        &time,
    )?;

    // the purchase rolled up to paid with the last settlement
    for event in ledger.take_events() {
        println!("event: {:?}", event);
    }

    Ok(())
}
