/// overdue lifecycle - the sweep, mora notifications, and late settlement
use installment_engine_rs::{
    Actor, EngineConfig, Event, InstallmentLedger, Money, OverdueSweep, PaymentMethod,
    PaymentProcessor, PaymentRequest, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== overdue lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();
    let config = EngineConfig::default();
    let ledger = InstallmentLedger::new();

    let user_id = Uuid::new_v4();
    let (_, installments) = ledger.register_purchase(
        user_id,
        Money::from_major(1_200),
        4,
        time.now().date_naive(),
        dec!(0),
        &config,
        &time,
    )?;
    ledger.take_events();

    // two due dates pass without payment
    controller.advance(Duration::days(70));

    // the nightly sweep flips them to overdue, one commit per row
    let sweep = OverdueSweep::new(&ledger);
    let flipped = sweep.run(&time)?;
    println!("sweep on {} flipped {} installments", time.now().date_naive(), flipped);

    // observers (a notifier, a cache invalidator) consume the event stream
    for event in ledger.take_events() {
        if let Event::InstallmentOverdue { installment_id, days_overdue, .. } = event {
            println!("  notify: installment {} is {} days overdue", installment_id, days_overdue);
        }
    }

    // re-running the sweep is a no-op
    assert_eq!(sweep.run(&time)?, 0);

    // settling an overdue installment pays the 8% surcharge
    let processor = PaymentProcessor::new(&ledger, config);
    let quote = processor.quote_now(installments[0].id, &time)?;
    let payment = processor.apply_payment_now(
        &PaymentRequest::new(installments[0].id, quote.amount_due, PaymentMethod::Card, Actor::User(user_id))
            .with_external_ref("gateway-7741"),
        &time,
    )?;
    println!("\nsettled late: {} (surcharge {})", payment.amount, payment.adjustment);

    // the audit trail shows the full pending -> overdue -> paid history
    println!("\naudit history:");
    for entry in ledger.history(installments[0].id) {
        println!("  {} -> {} by {} ({})", entry.previous_state, entry.new_state, entry.actor, entry.reason);
    }

    Ok(())
}
