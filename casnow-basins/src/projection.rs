//! Coordinate transforms used by click hit-testing.
//!
//! Map clicks arrive in spherical Web Mercator meters (EPSG:3857). Basin
//! outlines are stored in WGS84 lon/lat. Both are brought into UTM zone 42N
//! (EPSG:32642) before containment tests so that high-latitude stretch of
//! the web projection does not distort the result.
//!
//! The heavy lifting is done by `proj4rs`. Geographic coordinates cross the
//! `proj4rs` boundary in radians.

use casnow_utils::error::{DashboardError, Result};
use geo::{Coord, LineString, Polygon};
use proj4rs::Proj;

/// WGS84 semi-major axis, also the Web Mercator sphere radius.
pub const WGS84_A: f64 = 6_378_137.0;
/// Half the Web Mercator world width in meters.
pub const WEB_MERCATOR_MAX: f64 = std::f64::consts::PI * WGS84_A;

/// UTM scale factor on the central meridian.
pub const UTM_K0: f64 = 0.9996;
/// UTM false easting in meters.
pub const UTM_FALSE_EASTING: f64 = 500_000.0;
/// Zone used for Central Asia (central meridian 69°E).
pub const CENTRAL_ASIA_UTM_ZONE: u8 = 42;

/// EPSG:3857 on its own sphere.
const WEB_MERCATOR: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs";
/// Lon/lat on the Web Mercator sphere. Pairing it with `WEB_MERCATOR` keeps
/// the inverse free of any datum shift.
const WEB_MERCATOR_GEOGRAPHIC: &str = "+proj=longlat +a=6378137 +b=6378137 +no_defs";
const WGS84: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn proj(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| {
        DashboardError::Projection(format!("cannot build `{}`: {:?}", definition, e))
    })
}

fn transform(src: &Proj, dst: &Proj, x: f64, y: f64) -> Result<(f64, f64)> {
    let mut point = (x, y, 0.0);
    proj4rs::transform::transform(src, dst, &mut point)
        .map_err(|e| DashboardError::Projection(format!("({}, {}): {:?}", x, y, e)))?;
    if !point.0.is_finite() || !point.1.is_finite() {
        return Err(DashboardError::Projection(format!(
            "({}, {}) has no finite image",
            x, y
        )));
    }
    Ok((point.0, point.1))
}

fn check_lon_lat(lon: f64, lat: f64) -> Result<()> {
    if !lon.is_finite() || !lat.is_finite() || lat.abs() > 90.0 {
        return Err(DashboardError::Projection(format!(
            "invalid geographic coordinate ({}, {})",
            lon, lat
        )));
    }
    Ok(())
}

fn check_web_mercator(x: f64, y: f64) -> Result<()> {
    if !x.is_finite() || !y.is_finite() {
        return Err(DashboardError::Projection(format!(
            "non-finite Web Mercator coordinate ({}, {})",
            x, y
        )));
    }
    if x.abs() > WEB_MERCATOR_MAX {
        return Err(DashboardError::Projection(format!(
            "x = {} lies outside the Web Mercator world",
            x
        )));
    }
    Ok(())
}

/// Forward spherical Web Mercator: (lon, lat) degrees to meters.
pub fn lon_lat_to_web_mercator(lon: f64, lat: f64) -> Result<Coord<f64>> {
    check_lon_lat(lon, lat)?;
    if lat.abs() >= 90.0 {
        return Err(DashboardError::Projection(format!(
            "latitude {} has no Web Mercator image",
            lat
        )));
    }
    let (x, y) = transform(
        &proj(WEB_MERCATOR_GEOGRAPHIC)?,
        &proj(WEB_MERCATOR)?,
        lon.to_radians(),
        lat.to_radians(),
    )?;
    Ok(Coord { x, y })
}

/// Reprojects Web Mercator clicks and WGS84 outlines into one UTM zone.
pub struct UtmProjection {
    zone: u8,
    web_mercator: Proj,
    web_geographic: Proj,
    wgs84: Proj,
    utm: Proj,
}

impl UtmProjection {
    /// UTM north zone on the WGS84 ellipsoid.
    pub fn utm_north(zone: u8) -> Result<Self> {
        let utm = format!("+proj=utm +zone={} +datum=WGS84 +units=m +no_defs", zone);
        Ok(Self {
            zone,
            web_mercator: proj(WEB_MERCATOR)?,
            web_geographic: proj(WEB_MERCATOR_GEOGRAPHIC)?,
            wgs84: proj(WGS84)?,
            utm: proj(&utm)?,
        })
    }

    pub fn central_meridian(&self) -> f64 {
        -183.0 + 6.0 * f64::from(self.zone)
    }

    /// Inverse Web Mercator: meters to (lon, lat) degrees.
    pub fn web_mercator_to_lon_lat(&self, x: f64, y: f64) -> Result<Coord<f64>> {
        check_web_mercator(x, y)?;
        let (lon, lat) = transform(&self.web_mercator, &self.web_geographic, x, y)?;
        Ok(Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        })
    }

    /// Project (lon, lat) degrees to (easting, northing) meters.
    pub fn forward(&self, lon: f64, lat: f64) -> Result<Coord<f64>> {
        check_lon_lat(lon, lat)?;
        let (x, y) = transform(&self.wgs84, &self.utm, lon.to_radians(), lat.to_radians())?;
        Ok(Coord { x, y })
    }

    /// Project a Web Mercator point straight into this zone.
    pub fn from_web_mercator(&self, x: f64, y: f64) -> Result<Coord<f64>> {
        let geographic = self.web_mercator_to_lon_lat(x, y)?;
        self.forward(geographic.x, geographic.y)
    }

    /// Project every vertex of a lon/lat polygon.
    pub fn project_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        let exterior = self.project_ring(polygon.exterior())?;
        let interiors = polygon
            .interiors()
            .iter()
            .map(|ring| self.project_ring(ring))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon::new(exterior, interiors))
    }

    fn project_ring(&self, ring: &LineString<f64>) -> Result<LineString<f64>> {
        let coords = ring
            .coords()
            .map(|c| self.forward(c.x, c.y))
            .collect::<Result<Vec<_>>>()?;
        Ok(LineString::from(coords))
    }
}
