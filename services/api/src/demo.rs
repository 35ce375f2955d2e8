use crate::infra::{InMemoryClaimStore, InMemoryItemStore};
use chrono::{Duration, Local, NaiveDateTime};
use clap::Args;
use mealbridge::error::AppError;
use mealbridge::lifecycle::{
    parse_need_by, ActingIdentity, ItemKind, ItemStatus, LifecycleService, TransitionIntent,
    TransitionRequest,
};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Need-by / consume-by time (YYYY-MM-DDTHH:MM). Defaults to three days out.
    #[arg(long, value_parser = parse_need_by)]
    pub(crate) need_by: Option<NaiveDateTime>,
    /// Delivery location disclosed when the beneficiary accepts.
    #[arg(long, default_value = "12 Depot Road")]
    pub(crate) delivery_location: String,
    /// Skip the request-side walk and only demo a donation.
    #[arg(long)]
    pub(crate) skip_request: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        need_by,
        delivery_location,
        skip_request,
    } = args;

    let need_by = need_by.unwrap_or_else(|| Local::now().naive_local() + Duration::days(3));
    let items = Arc::new(InMemoryItemStore::default());
    let claims = Arc::new(InMemoryClaimStore::default());
    let service = LifecycleService::new(items, claims);

    let beneficiary = ActingIdentity("beneficiary@shelter.example".to_string());
    let donor = ActingIdentity("donor@bakery.example".to_string());
    let dispatcher = ActingIdentity("dispatch@mealbridge.example".to_string());

    println!("MealBridge lifecycle demo");

    println!("\nDonation side");
    let donation = service.create(ItemKind::Donation, None)?;
    println!(
        "- Created {} ({}) -> {}",
        donation.id,
        donation.kind.label(),
        donation.status.label()
    );

    let accept = TransitionRequest {
        current_status: ItemStatus::New,
        intent: TransitionIntent::AcceptConfirm,
        delivery_location: Some(delivery_location.clone()),
        need_by: Some(need_by),
    };
    let outcome = service.transition(&beneficiary, &donation.id, &accept)?;
    println!(
        "- Beneficiary accepted -> {} (deliver to {}, needed by {})",
        outcome.status.label(),
        delivery_location,
        need_by.format("%Y-%m-%d %H:%M")
    );

    let plain = |claimed: ItemStatus| TransitionRequest {
        current_status: claimed,
        ..TransitionRequest::default()
    };

    let outcome = service.transition(&dispatcher, &donation.id, &plain(ItemStatus::Matched))?;
    println!("- Warehouse intake -> {}", outcome.status.label());

    let outcome = service.transition(&dispatcher, &donation.id, &plain(ItemStatus::InWarehouse))?;
    println!(
        "- {} claimed the delivery -> {}",
        dispatcher,
        outcome.status.label()
    );
    let claimed = service.claims_for(&dispatcher)?;
    println!("  Claim set for {}: {} item(s)", dispatcher, claimed.len());

    let outcome =
        service.transition(&dispatcher, &donation.id, &plain(ItemStatus::AwaitingDelivery))?;
    println!("- Delivery confirmed -> {}", outcome.status.label());

    match service.transition(&dispatcher, &donation.id, &plain(ItemStatus::Delivered)) {
        Err(err) => println!("- Further transitions rejected: {}", err),
        Ok(outcome) => println!("- Unexpectedly advanced -> {}", outcome.status.label()),
    }

    if skip_request {
        return Ok(());
    }

    println!("\nRequest side");
    let request = service.create(ItemKind::Request, Some(beneficiary.0.clone()))?;
    println!(
        "- Created {} ({}) -> {}",
        request.id,
        request.kind.label(),
        request.status.label()
    );

    let donate = TransitionRequest {
        current_status: ItemStatus::New,
        intent: TransitionIntent::DonateConfirm,
        delivery_location: None,
        need_by: Some(need_by),
    };
    let outcome = service.transition(&donor, &request.id, &donate)?;
    println!(
        "- {} pledged the donation -> {} (consume by {})",
        donor,
        outcome.status.label(),
        need_by.format("%Y-%m-%d %H:%M")
    );

    match service.transition(&donor, &request.id, &donate) {
        Err(err) => println!("- Stale replay rejected: {}", err),
        Ok(outcome) => println!("- Unexpectedly advanced -> {}", outcome.status.label()),
    }

    Ok(())
}
