use anyhow::{Context, Result};
use geo::{Coord, Geometry, MapCoords};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::PipelineError;

/// EPSG code of S-JTSK / Krovak East North, the planar system of Slovak cadastral exports.
pub const SJTSK_KROVAK_EN: u32 = 5514;

/// EPSG code of WGS84 lon/lat.
pub const WGS84: u32 = 4326;

/// Built-in PROJ.4 definition for an EPSG code.
pub fn proj4_for_epsg(epsg: u32) -> Result<&'static str> {
    let proj4 = match epsg {
        4326 => "+proj=longlat +datum=WGS84 +no_defs +type=crs",
        4258 => "+proj=longlat +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +no_defs +type=crs",
        4269 => "+proj=longlat +datum=NAD83 +no_defs +type=crs",
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs +type=crs",
        3035 => "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs +type=crs",
        5514 => "+proj=krovak +lat_0=49.5 +lon_0=24.8333333333333 +alpha=30.2881397527778 +k=0.9999 +x_0=0 +y_0=0 +ellps=bessel +towgs84=589,76,480,0,0,0,0 +units=m +no_defs +type=crs",
        32633 => "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs +type=crs",
        32634 => "+proj=utm +zone=34 +datum=WGS84 +units=m +no_defs +type=crs",
        other => return Err(PipelineError::UnknownEpsg(other).into()),
    };
    Ok(proj4)
}

/// A coordinate reference system: its EPSG tag and the PROJ.4 string that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crs {
    epsg: u32,
    proj4: String,
}

impl Crs {
    /// Look up a CRS in the built-in registry.
    pub fn from_epsg(epsg: u32) -> Result<Self> {
        Ok(Self { epsg, proj4: proj4_for_epsg(epsg)?.to_string() })
    }

    /// Use an explicit PROJ.4 definition, tagged with `epsg` for output metadata.
    pub fn from_proj4(epsg: u32, proj4: impl Into<String>) -> Self {
        Self { epsg, proj4: proj4.into() }
    }

    #[inline] pub fn epsg(&self) -> u32 { self.epsg }

    #[inline] pub fn proj4(&self) -> &str { &self.proj4 }

    /// Whether coordinates in this CRS are lon/lat degrees.
    pub fn is_geographic(&self) -> bool {
        self.proj4.split_whitespace()
            .any(|token| matches!(token, "+proj=longlat" | "+proj=latlong" | "+proj=lonlat" | "+proj=latlon"))
    }

    /// OGC URN used in the GeoJSON `crs` member.
    pub fn urn(&self) -> String {
        format!("urn:ogc:def:crs:EPSG::{}", self.epsg)
    }
}

/// Always-xy transform between two CRSs.
pub struct Reprojector {
    source: Crs,
    target: Crs,
    from: Proj4,
    to: Proj4,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source.epsg)
            .field("target", &self.target.epsg)
            .finish()
    }
}

impl Reprojector {
    pub fn new(source: Crs, target: Crs) -> Result<Self> {
        let from = Proj4::from_proj_string(source.proj4())
            .with_context(|| format!("[geom::proj] failed to build source PROJ.4: {}", source.proj4()))?;
        let to = Proj4::from_proj_string(target.proj4())
            .with_context(|| format!("[geom::proj] failed to build target PROJ.4: {}", target.proj4()))?;
        Ok(Self { source, target, from, to })
    }

    pub fn from_epsg(source: u32, target: u32) -> Result<Self> {
        Self::new(Crs::from_epsg(source)?, Crs::from_epsg(target)?)
    }

    /// The transform in the opposite direction.
    pub fn inverse(&self) -> Result<Self> {
        Self::new(self.target.clone(), self.source.clone())
    }

    #[inline] pub fn source(&self) -> &Crs { &self.source }

    #[inline] pub fn target(&self) -> &Crs { &self.target }

    /// Transform one x/y (lon/lat for geographic CRSs, in degrees) coordinate.
    pub fn transform_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        // proj4rs works in radians on the geographic side.
        let mut point = if self.source.is_geographic() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(&self.from, &self.to, &mut point)
            .with_context(|| format!("[geom::proj] transform EPSG:{} -> EPSG:{} failed for ({}, {})",
                self.source.epsg, self.target.epsg, coord.x, coord.y))?;

        let (x, y) = if self.target.is_geographic() {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };

        if !x.is_finite() || !y.is_finite() {
            return Err(PipelineError::NonFiniteCoordinate { x, y }.into());
        }

        Ok(Coord { x, y })
    }

    /// Transform every coordinate of a geometry; the first failure aborts the geometry.
    pub fn transform_geometry(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.transform_coord(coord))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};

    fn assert_close(a: Coord<f64>, b: Coord<f64>, tol: f64) {
        assert!((a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol, "{a:?} != {b:?} (tol {tol})");
    }

    #[test]
    fn registry_knows_defaults() {
        assert!(proj4_for_epsg(SJTSK_KROVAK_EN).unwrap().contains("+proj=krovak"));
        assert!(Crs::from_epsg(WGS84).unwrap().is_geographic());
        assert!(!Crs::from_epsg(SJTSK_KROVAK_EN).unwrap().is_geographic());
    }

    #[test]
    fn unknown_epsg_is_typed_error() {
        let err = Crs::from_epsg(99999).unwrap_err();
        assert!(matches!(err.downcast_ref::<PipelineError>(), Some(PipelineError::UnknownEpsg(99999))));
    }

    #[test]
    fn urn_uses_epsg_tag() {
        assert_eq!(Crs::from_epsg(WGS84).unwrap().urn(), "urn:ogc:def:crs:EPSG::4326");
    }

    #[test]
    fn krovak_point_lands_in_slovakia() {
        let reprojector = Reprojector::from_epsg(SJTSK_KROVAK_EN, WGS84).unwrap();
        // Bratislava old town, S-JTSK East North.
        let lonlat = reprojector.transform_coord(Coord { x: -577_000.0, y: -1_276_000.0 }).unwrap();
        assert!((16.5..18.5).contains(&lonlat.x), "lon {}", lonlat.x);
        assert!((47.5..48.8).contains(&lonlat.y), "lat {}", lonlat.y);
    }

    #[test]
    fn krovak_round_trip() {
        let forward = Reprojector::from_epsg(SJTSK_KROVAK_EN, WGS84).unwrap();
        let back = forward.inverse().unwrap();

        let origin = Coord { x: 17.1077, y: 48.1486 };
        let planar = back.transform_coord(origin).unwrap();
        let again = forward.transform_coord(planar).unwrap();
        assert_close(origin, again, 1e-6);
    }

    #[test]
    fn default_merge_transform_builds() {
        assert!(Reprojector::from_epsg(SJTSK_KROVAK_EN, WGS84).is_ok());
    }

    #[test]
    fn krovak_planar_round_trip() {
        let forward = Reprojector::from_epsg(SJTSK_KROVAK_EN, WGS84).unwrap();
        let back = forward.inverse().unwrap();

        let planar = Coord { x: -577_000.0, y: -1_276_000.0 };
        let lonlat = forward.transform_coord(planar).unwrap();
        assert!((lonlat.x - 17.0574).abs() < 1e-3 && (lonlat.y - 48.1843).abs() < 1e-3, "{lonlat:?}");
        assert_close(back.transform_coord(lonlat).unwrap(), planar, 1e-2);
    }

    #[test]
    fn utm_round_trip() {
        let forward = Reprojector::from_epsg(32634, WGS84).unwrap();
        let back = forward.inverse().unwrap();

        let origin = Coord { x: 500_000.0, y: 5_400_000.0 };
        let lonlat = forward.transform_coord(origin).unwrap();
        assert_close(lonlat, Coord { x: 21.0, y: lonlat.y }, 1e-6);
        assert_close(back.transform_coord(lonlat).unwrap(), origin, 1e-3);
    }

    #[test]
    fn geometry_transform_preserves_shape() {
        let reprojector = Reprojector::from_epsg(32634, WGS84).unwrap();
        let square: Geometry<f64> = polygon![
            (x: 500_000.0, y: 5_400_000.0),
            (x: 501_000.0, y: 5_400_000.0),
            (x: 501_000.0, y: 5_401_000.0),
            (x: 500_000.0, y: 5_400_000.0),
        ].into();

        let Geometry::Polygon(projected) = reprojector.transform_geometry(&square).unwrap() else {
            panic!("expected polygon");
        };
        assert_eq!(projected.exterior().0.len(), 4);
        assert!(projected.exterior().0.iter().all(|c| (20.0..22.0).contains(&c.x)));

        let point: Geometry<f64> = point!(x: 500_000.0, y: 5_400_000.0).into();
        assert!(matches!(reprojector.transform_geometry(&point).unwrap(), Geometry::Point(_)));
    }
}
