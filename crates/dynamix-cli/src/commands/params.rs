//! Parameter listing command.

use clap::Args;
use dynamix_config::EngineConfig;
use dynamix_dynamics::{Flavor, flavor_parameters};

use super::common::header;

#[derive(Args)]
pub struct ParamsArgs {
    /// Flavor to list (defaults to every flavor)
    #[arg(short, long)]
    flavor: Option<Flavor>,

    /// Only the configured flavor
    #[arg(long, conflicts_with = "flavor")]
    configured: bool,
}

pub fn run(args: ParamsArgs, config: &EngineConfig) -> anyhow::Result<()> {
    let flavors: Vec<Flavor> = match (args.flavor, args.configured) {
        (Some(flavor), _) => vec![flavor],
        (None, true) => vec![config.flavor],
        (None, false) => Flavor::ALL.to_vec(),
    };

    for flavor in flavors {
        header(&format!("{} ({})", flavor.name(), flavor.id()));
        println!("  {}\n", flavor.description());
        println!(
            "  {:<20} {:<22} {:>12} {:>12} {:>12}",
            "ID", "Name", "Min", "Max", "Default"
        );
        for (key, desc) in flavor_parameters(flavor) {
            println!(
                "  {:<20} {:<22} {:>12} {:>12} {:>12}",
                key.id(),
                desc.name,
                desc.format_value(desc.min),
                desc.format_value(desc.max),
                desc.format_value(desc.default)
            );
        }
        println!();
    }
    Ok(())
}
