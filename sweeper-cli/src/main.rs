use anyhow::Result;

fn main() -> Result<()> {
    sweeper_cli::run_cli()
}
