/// quick start - minimal example to get started
use installment_engine_rs::{
    Actor, EngineConfig, InstallmentLedger, Money, PaymentMethod, PaymentProcessor,
    PaymentRequest, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);
    let config = EngineConfig::default();
    let ledger = InstallmentLedger::new();

    // a $1,200 purchase split into 8 installments (15% plan surcharge)
    let user_id = Uuid::new_v4();
    let (purchase, installments) = ledger.register_purchase(
        user_id,
        Money::from_major(1_200),
        8,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        dec!(0),
        &config,
        &time,
    )?;

    println!("purchase {} split into {} installments:", purchase.id, installments.len());
    for installment in &installments {
        println!("  #{} {} due {}", installment.sequence, installment.amount, installment.due_date);
    }

    // pay the first installment
    let processor = PaymentProcessor::new(&ledger, config);
    let quote = processor.quote_now(installments[0].id, &time)?;
    let payment = processor.apply_payment_now(
        &PaymentRequest::new(
            installments[0].id,
            quote.amount_due,
            PaymentMethod::Card,
            Actor::User(user_id),
        ),
        &time,
    )?;

    println!("paid {} (adjustment {})", payment.amount, payment.adjustment);

    Ok(())
}
