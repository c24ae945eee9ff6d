use anyhow::{bail, Context};
use clap::Parser;
use plastfinder_client::cli::{Cli, Commands};
use plastfinder_client::render::{
    history_lines, price_chart, record_line, source_lines, summary_table,
};
use plastfinder_client::{init_tracing, FileHistoryStore, SearchClient};
use plastfinder_core::{SearchCriteria, SearchHistory, SortOrder, SupplierRecord};
use plastfinder_streaming::{SearchController, SearchUpdate};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    let config = cli.config();
    let store = FileHistoryStore::new(&config.history_path);
    let mut history = SearchHistory::load(&store)
        .await
        .with_context(|| format!("loading history from {}", store.path().display()))?;

    let (criteria, order) = match cli.command {
        Commands::History => {
            if history.is_empty() {
                println!("No saved searches.");
            }
            for line in history_lines(&history) {
                println!("{line}");
            }
            return Ok(());
        }
        Commands::Search(args) => (args.criteria(), SortOrder::from(args.sort)),
        Commands::Rerun { index, sort } => {
            let Some(criteria) = history.get(index as usize - 1) else {
                bail!("no saved search #{index}; see `plastfinder history`");
            };
            (criteria.clone(), SortOrder::from(sort))
        }
    };

    if history.record(&criteria) {
        if let Err(e) = history.save(&store).await {
            tracing::warn!(error = %e, "Could not save search history");
        }
    }

    let client = SearchClient::new(&config)?;
    run_search(&client, criteria, order).await
}

async fn run_search(
    client: &SearchClient,
    criteria: SearchCriteria,
    order: SortOrder,
) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    println!("Searching: {}", criteria.summary());
    let mut controller =
        SearchController::new().with_featured(SupplierRecord::featured_house_listing());
    let result = client
        .search(&mut controller, criteria, &cancel, print_update)
        .await;
    ctrl_c.abort();

    match result {
        Ok(()) => {
            print_report(&controller, order);
            Ok(())
        }
        Err(e) if e.is_cancelled() => {
            println!("Search cancelled after {} result(s).", controller.results().len());
            Ok(())
        }
        Err(e) => {
            let shown = controller.results().len();
            if shown > 0 {
                eprintln!("Search stopped early; {shown} result(s) shown above.");
            }
            Err(e).context("search failed")
        }
    }
}

fn print_update(controller: &SearchController, update: &SearchUpdate) {
    match update {
        SearchUpdate::Started => {
            for (i, record) in controller.results().iter().enumerate() {
                println!("{}", record_line(i, record));
            }
        }
        SearchUpdate::RecordAdded { index } => {
            if let Some(record) = controller.results().get(*index) {
                println!("{}", record_line(*index, record));
            }
        }
        SearchUpdate::MetadataReplaced => {
            tracing::debug!("Sources updated");
        }
        SearchUpdate::Completed | SearchUpdate::Failed(_) | SearchUpdate::Cancelled => {}
    }
}

fn print_report(controller: &SearchController, order: SortOrder) {
    let table = summary_table(controller.results(), order);
    if table.is_empty() {
        println!("\nNo suppliers found.");
        return;
    }

    println!("\nSummary");
    for row in table {
        println!("{row}");
    }

    let chart = price_chart(controller.results());
    if !chart.is_empty() {
        println!("\nMinimum price per unit");
        for row in chart {
            println!("{row}");
        }
    }

    if let Some(metadata) = controller.metadata() {
        let sources = source_lines(metadata);
        if !sources.is_empty() {
            println!("\nSources");
            for source in sources {
                println!("  {source}");
            }
        }
    }
}
