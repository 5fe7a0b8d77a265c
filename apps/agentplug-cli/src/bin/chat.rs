use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::error;

use agentplug_chat::{Agent, ChatClient, Conversation};
use agentplug_cli::{bootstrap, init_tracing, Runtime};
use agentplug_core::config::Config;

#[derive(Parser)]
#[command(name = "agentplug", version, about = "Chat with the assistant and its plugins")]
struct Args {
    /// Do not start or connect to external tool servers.
    #[arg(long)]
    no_tool_servers: bool,

    /// System prompt for this session, overriding `chat.system_prompt`.
    #[arg(long)]
    system_prompt: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = Config::load()?;
    let app = config.app()?;

    let Runtime { registry, servers: _servers } = bootstrap(&app, !args.no_tool_servers).await?;
    let client = ChatClient::new(&app.chat)?;
    let agent = Agent::new(Arc::new(client), Arc::new(registry), app.chat.max_tool_rounds);
    let system_prompt = args.system_prompt.or_else(|| app.chat.system_prompt.clone());
    let mut conversation = Conversation::new(system_prompt.as_deref());

    println!("agentplug ({} functions). Type 'exit' to quit, '/reset' to start over.", agent.registry().len());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("User > ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "/reset" => {
                conversation.clear();
                println!("(conversation cleared)");
                continue;
            }
            _ => {}
        }
        match agent.run_turn(&mut conversation, line).await {
            Ok(answer) => println!("Assistant > {answer}\n"),
            Err(e) => {
                error!("chat turn failed: {e}");
                eprintln!("Error: {e}");
            }
        }
    }
    Ok(())
}
