use std::sync::Arc;

use clap::Args;

use listing_desk::error::AppError;
use listing_desk::workflows::approval::table::InMemoryRowTable;
use listing_desk::workflows::approval::{
    format_man_yen, ApprovalError, ApprovalService, NoopPacer, TableRecipientDirectory,
    TableStore,
};

use crate::infra::{seed_demo_rows, ConsoleTransport};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Customer whose pending listings the demo walks through
    #[arg(long, default_value = "山田太郎")]
    pub(crate) customer: String,
    /// Approve without attaching any images
    #[arg(long)]
    pub(crate) imageless: bool,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let table = Arc::new(InMemoryRowTable::default());
    seed_demo_rows(&table, &args.customer).map_err(ApprovalError::from)?;

    let service = Arc::new(ApprovalService::new(
        Arc::new(TableStore::new(table.clone())),
        Arc::new(TableRecipientDirectory::new(table)),
        Arc::new(ConsoleTransport),
        Arc::new(NoopPacer),
        "http://127.0.0.1:3000/approval",
    ));

    println!("Listing approval demo for {}", args.customer);

    let cards = service.preview_all(&args.customer)?;
    println!("{} pending listing(s):", cards.len());
    for card in &cards {
        println!(
            "- room {}: {} {} | {}万円 | 画像{}枚",
            card.listing.room_id,
            card.listing.building_name,
            card.listing.room_number,
            format_man_yen(card.listing.rent),
            card.listing.image_urls.len()
        );
    }

    let first = cards
        .first()
        .map(|card| card.listing.clone())
        .ok_or(ApprovalError::NotFoundOrProcessed)?;
    let selected_csv = if args.imageless {
        String::new()
    } else {
        (0..first.image_urls.len())
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let outcome = service
        .confirm(&args.customer, &first.room_id, !args.imageless, &selected_csv)
        .await?;
    println!(
        "approved room {} ({} image(s) attached)",
        outcome.room_id, outcome.image_count
    );

    if let Some(card) = cards.get(1) {
        let skipped = service.skip(&args.customer, &card.listing.room_id)?;
        println!("skipped room {skipped}");
    }

    let view = service.customer_view(&args.customer, &first.room_id)?;
    println!(
        "customer view:\n{}",
        serde_json::to_string_pretty(&view).unwrap_or_default()
    );

    Ok(())
}
