use clap::Parser;

use agentplug_cli::{contoso_search, format_citations, init_tracing};
use agentplug_core::config::Config;

#[derive(Parser)]
#[command(name = "agentplug-search", version, about = "Query the document index the way the assistant does")]
struct Args {
    /// Search text; multiple words are joined with spaces.
    #[arg(required = true)]
    query: Vec<String>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = Config::load()?.app()?;
    let search = contoso_search(&app)?;

    let query = args.query.join(" ");
    let results = search.search(&query).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results above the relevance threshold for \"{query}\".");
    } else {
        println!("{}", format_citations(&results));
    }
    Ok(())
}
