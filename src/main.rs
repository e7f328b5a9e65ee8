use clap::{
    Parser,
    Subcommand,
};
use color_eyre::eyre::Error;
use mopeka_level::{
    api::Api,
    examples::EXAMPLE_PAYLOADS,
    process::process,
    types::TankHeight,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Error> {
    let _ = dotenvy::dotenv();
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Command::Decode {
            hex_string,
            tank_height,
            pretty,
        } => {
            let result = process(&hex_string, tank_height)?;
            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            }
            else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
        Command::Serve {
            address,
            tank_height,
        } => {
            let api = Api {
                default_tank_height: tank_height,
            };
            let listener = TcpListener::bind(&address).await?;
            tracing::info!(%address, %tank_height, "listening");
            axum::serve(listener, api.router()).await?;
        }
        Command::Examples => {
            for example in EXAMPLE_PAYLOADS {
                println!("{}: {}", example.label, example.hex_string);
            }
        }
    }

    Ok(())
}

#[derive(Debug, Parser)]
pub struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a single payload and print the result as JSON
    Decode {
        /// Payload as hex, may contain spaces
        hex_string: String,

        /// Tank height in meters
        #[clap(short, long, default_value_t = TankHeight::DEFAULT)]
        tank_height: TankHeight,

        #[clap(short, long)]
        pretty: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[clap(short, long, env = "MOPEKA_LEVEL_ADDRESS", default_value = "localhost:5000")]
        address: String,

        /// Tank height in meters, used when a request doesn't specify one
        #[clap(short, long, env = "TANK_HEIGHT", default_value_t = TankHeight::DEFAULT)]
        tank_height: TankHeight,
    },
    /// List example payloads
    Examples,
}
