//! Registry listing command.

use clap::Args;
use dynamix_registry::ProcessorRegistry;

use super::common::header;

#[derive(Args)]
pub struct FlavorsArgs {
    /// Also list factory presets registered as processors
    #[arg(long)]
    presets: bool,
}

pub fn run(args: FlavorsArgs) -> anyhow::Result<()> {
    let registry = if args.presets {
        ProcessorRegistry::with_factory_presets()
    } else {
        ProcessorRegistry::new()
    };

    header("Available Processors");
    println!();
    for descriptor in registry.all() {
        println!(
            "  {:20} {:10} {:>3} params  {}",
            descriptor.id,
            descriptor.flavor.id(),
            descriptor.param_count,
            descriptor.description
        );
    }
    println!("\n{} registered.", registry.len());
    Ok(())
}
