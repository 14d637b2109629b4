use clap::Parser;
use tracing::debug;

use redlink::client::Client;
use redlink::cmd::Command;
use redlink::{Error, Result};

const ADDR: &str = "127.0.0.1:6379";

#[derive(Parser, Debug)]
struct Args {
    /// Address of the Redis server
    #[arg(short, long, default_value = ADDR)]
    addr: String,

    /// Command keyword, e.g. GET
    command: String,

    /// Command arguments
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let args = Args::parse();

    let mut client = Client::connect(args.addr.as_str()).await?;
    let command = Command::new(args.command).args(args.args);

    match client.execute(command).await {
        Ok(reply) => println!("{reply}"),
        Err(Error::NotFound) => println!("(nil)"),
        Err(err) => {
            eprintln!("(error) {err}");
            std::process::exit(1);
        }
    }

    client.close().await
}
