use clap::Parser;

use agentplug_cli::{bootstrap, init_tracing};
use agentplug_core::config::Config;

#[derive(Parser)]
#[command(name = "agentplug-tools", version, about = "List the functions offered to the chat model")]
struct Args {
    /// Print full descriptors as JSON.
    #[arg(long)]
    json: bool,

    /// Only list built-in plugins.
    #[arg(long)]
    builtin_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = Config::load()?.app()?;
    let runtime = bootstrap(&app, !args.builtin_only).await?;

    let descriptors = runtime.registry.descriptors();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }
    let width = descriptors.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for d in descriptors {
        println!("{:width$}  {}", d.name, d.description.lines().next().unwrap_or(""));
    }
    Ok(())
}
