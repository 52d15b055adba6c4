use anyhow::Result;
use zsjgeo::MergeOptions;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::MergeArgs) -> Result<()> {
    let options = MergeOptions {
        geometry_column: args.geom_column.clone(),
        id_column: args.id_column.clone(),
        key_width: args.key_width,
        source_epsg: args.source_epsg,
        source_proj4: args.source_proj.clone(),
        ..MergeOptions::default()
    };

    let summary = zsjgeo::merge(&args.geometry_csv, &args.population_csv, args.output.as_deref(), &options)?;
    println!("{summary}");

    Ok(())
}
