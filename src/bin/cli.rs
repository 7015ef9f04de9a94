//! Pet Store CLI Client
//!
//! Command-line interface for interacting with the pet store server.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use petstore::network::Client;
use petstore::protocol::{decode_record, Response, Status};
use petstore::Pet;

/// Pet Store CLI
#[derive(Parser, Debug)]
#[command(name = "petstore-cli")]
#[command(about = "CLI for the pet store server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a pet (an id is assigned when omitted)
    Create {
        /// The pet's name
        name: String,

        /// Explicit id
        #[arg(long)]
        id: Option<i64>,

        /// Status label
        #[arg(long)]
        status: Option<String>,
    },

    /// Get a pet by id
    Get {
        /// The id to fetch
        id: i64,
    },

    /// Replace a pet
    Put {
        /// The id to replace
        id: i64,

        /// The new name
        name: String,

        /// The new status label
        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a pet
    Del {
        /// The id to delete
        id: i64,
    },

    /// Ping the server
    Ping,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut client = match Client::connect(&args.server) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Create { name, id, status } => {
            let pet = Pet {
                id,
                name: Some(name),
                status,
            };
            client.create(&pet)
        }
        Commands::Get { id } => client.fetch(id),
        Commands::Put { id, name, status } => {
            let pet = Pet {
                id: Some(id),
                name: Some(name),
                status,
            };
            client.replace(id, &pet)
        }
        Commands::Del { id } => client.remove(id),
        Commands::Ping => client.ping(),
    };

    match result {
        Ok(response) => print_response(&response),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_response(response: &Response) -> ExitCode {
    if response.status != Status::Ok {
        eprintln!(
            "{:?}: {}",
            response.status,
            response.message().unwrap_or_default()
        );
        return ExitCode::FAILURE;
    }

    let Some(payload) = &response.payload else {
        println!("OK");
        return ExitCode::SUCCESS;
    };

    if payload.as_slice() == b"PONG" {
        println!("PONG");
        return ExitCode::SUCCESS;
    }

    match decode_record::<Pet>(payload) {
        Ok(pet) => {
            println!(
                "id={} name={} status={}",
                pet.id.map_or_else(|| "-".to_string(), |id| id.to_string()),
                pet.name.as_deref().unwrap_or("-"),
                pet.status.as_deref().unwrap_or("-"),
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: undecodable record: {}", e);
            ExitCode::FAILURE
        }
    }
}
