//! Answers 4DIAC management requests with canned responses.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fordiac::{Server, FORTE_PORT};

#[derive(Parser, Debug)]
#[clap(about = "Request stub for the 4DIAC management protocol")]
struct Args {
    /// address to listen on
    #[clap(long, default_value = "127.0.0.1")]
    host: String,

    /// port to listen on (the FORTE default is 61499, some setups use 5000)
    #[clap(long, default_value_t = FORTE_PORT)]
    port: u16,

    /// serve every connection on its own thread instead of one at a time
    #[clap(long)]
    concurrent: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env()
                         .unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(e) = main_inner(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn main_inner(args: Args) -> fordiac::Result<()> {
    let server = Server::bind((args.host.as_str(), args.port))?;
    if args.concurrent {
        server.serve_concurrent()
    } else {
        server.serve()
    }
}
