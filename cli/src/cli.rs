use std::path::PathBuf;

/// ZSJ geometry + census GeoJSON toolkit
#[derive(clap::Parser, Debug)]
#[command(name = "zsjgeo", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Join ZSJ geometries with census population and write WGS84 GeoJSON
    Merge(MergeArgs),

    /// Convert a CSV with WKT geometries to GeoJSON
    Convert(ConvertArgs),

    /// Check that every coordinate of a GeoJSON file is a valid lon/lat
    Validate(ValidateArgs),
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// CSV with WKT geometries and a ZSJ identifier column
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geometry_csv: PathBuf,

    /// Census CSV with "Základná sídelná jednotka - kód" and resident counts
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub population_csv: PathBuf,

    /// Output GeoJSON, defaults to <geometry_csv>_with_population.geojson
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Name of the WKT geometry column
    #[arg(long, default_value = "geom")]
    pub geom_column: String,

    /// Name of the identifier column (auto-detected if omitted)
    #[arg(long)]
    pub id_column: Option<String>,

    /// Trailing identifier characters that form the join key
    #[arg(long, default_value_t = zsjgeo::DEFAULT_KEY_WIDTH)]
    pub key_width: usize,

    /// Source EPSG code (5514 = S-JTSK Krovak East North)
    #[arg(long, default_value_t = zsjgeo::SJTSK_KROVAK_EN)]
    pub source_epsg: u32,

    /// Explicit PROJ.4 definition of the source CRS
    #[arg(long)]
    pub source_proj: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ConvertArgs {
    /// CSV with a WKT geometry column
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output GeoJSON, defaults to <input>.geojson
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Name of the WKT geometry column
    #[arg(long, default_value = "geom")]
    pub geom_column: String,

    /// Source EPSG code (5514 = S-JTSK Krovak East North)
    #[arg(long, default_value_t = zsjgeo::SJTSK_KROVAK_EN)]
    pub source_epsg: u32,

    /// Explicit PROJ.4 definition of the source CRS
    #[arg(long)]
    pub source_proj: Option<String>,

    /// Target EPSG code (4326 = WGS84)
    #[arg(long, default_value_t = zsjgeo::WGS84)]
    pub target_epsg: u32,

    /// Keep only a few basic columns as properties
    #[arg(long)]
    pub simple: bool,

    /// Comma-separated columns to keep (with --simple)
    #[arg(long, value_delimiter = ',', requires = "simple")]
    pub columns: Option<Vec<String>>,

    /// Print the first rows without converting
    #[arg(long)]
    pub preview: bool,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// GeoJSON FeatureCollection to check
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,
}
