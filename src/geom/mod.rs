mod proj;
mod wkt;

pub use proj::{proj4_for_epsg, Crs, Reprojector, SJTSK_KROVAK_EN, WGS84};
pub use wkt::parse_wkt;
