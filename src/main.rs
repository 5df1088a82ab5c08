// ProjCom - Projector control over serial, ESC/VP.net and HTTP
use clap::Parser;
use projcom::cli::{execute_command, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = execute_command(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
