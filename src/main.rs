use clap::{Parser, Subcommand};
use ip_subnet_set::config::Config;
use ip_subnet_set::output;
use ip_subnet_set::{bogons, range_to_subnets, Address, Subnet, SubnetSet};
use std::error::Error;

#[derive(Parser)]
#[command(name = "ip-subnet-set")]
#[command(about = "IPv4/IPv6 subnet arithmetic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge CIDRs into a minimal set of non-overlapping subnets
    Normalize {
        #[arg(required = true)]
        cidrs: Vec<String>,
    },
    /// Minimal CIDR blocks covering an inclusive address range
    Range { start: String, end: String },
    /// Remove one subnet from another
    Subtract { from: String, remove: String },
    /// Split a subnet into equal pieces of a longer prefix
    Split { cidr: String, prefix: u8 },
    /// Describe one subnet
    Info { cidr: String },
    /// Check addresses against the bogon list
    Bogon {
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.init_logging()?;
    log::info!("#Start main()");

    let cli = Cli::parse();
    let color = config.color;
    let rows: Box<dyn Iterator<Item = String>> = match cli.command {
        Commands::Normalize { cidrs } => {
            let set = cidrs
                .iter()
                .map(|c| c.parse::<Subnet>())
                .collect::<Result<SubnetSet, _>>()?;
            Box::new(output::render_set(&set, color).into_iter())
        }
        Commands::Range { start, end } => {
            let start: Address = start.parse()?;
            let end: Address = end.parse()?;
            let blocks = range_to_subnets(start, end)?;
            Box::new(output::render_subnets(&blocks, color).into_iter())
        }
        Commands::Subtract { from, remove } => {
            let from: Subnet = from.parse()?;
            let remove: Subnet = remove.parse()?;
            let pieces = from.subtract(&remove)?;
            Box::new(output::render_subnets(&pieces, color).into_iter())
        }
        Commands::Split { cidr, prefix } => {
            let cidr: Subnet = cidr.parse()?;
            // lazy: a short prefix can split into more pieces than fit in memory
            Box::new(
                cidr.split(prefix)?
                    .map(move |s| output::render_subnet_row(&s, color)),
            )
        }
        Commands::Info { cidr } => {
            let cidr: Subnet = cidr.parse()?;
            Box::new(output::render_info(&cidr).into_iter())
        }
        Commands::Bogon { addresses } => {
            let mut rows = Vec::with_capacity(addresses.len());
            for a in &addresses {
                let address: Address = a.parse()?;
                rows.push(output::render_bogon(
                    &address,
                    bogons().contains(&address),
                    color,
                ));
            }
            Box::new(rows.into_iter())
        }
    };
    for row in rows {
        println!("{row}");
    }

    Ok(())
}
