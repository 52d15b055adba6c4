use anyhow::{bail, Result};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ValidateArgs) -> Result<()> {
    let report = zsjgeo::validate_file(&args.input)?;
    println!("{report}");

    if !report.is_valid() {
        bail!("{} features have coordinates outside lon/lat range", report.invalid.len());
    }
    Ok(())
}
