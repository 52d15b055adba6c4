use anyhow::Result;
use zsjgeo::ConvertOptions;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::ConvertArgs) -> Result<()> {
    if args.preview {
        let head = zsjgeo::preview(&args.input, &args.geom_column)?;
        println!("{head}");
        return Ok(());
    }

    let base = if args.simple { ConvertOptions::simple(args.columns.clone()) } else { ConvertOptions::default() };
    let options = ConvertOptions {
        geometry_column: args.geom_column.clone(),
        source_epsg: args.source_epsg,
        source_proj4: args.source_proj.clone(),
        target_epsg: args.target_epsg,
        ..base
    };

    let summary = zsjgeo::convert(&args.input, args.output.as_deref(), &options)?;
    println!("{summary}");

    Ok(())
}
