//! Precomputed pairwise distance table.

use super::types::{DistanceModel, GeoPoint};

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres between two coordinates (degrees).
///
/// # Examples
///
/// ```
/// use u_tour::distance::haversine_m;
///
/// // 1 degree of longitude at the equator is about 111 km
/// let d = haversine_m(0.0, 0.0, 0.0, 1.0);
/// assert!(d > 110_000.0 && d < 112_000.0);
/// ```
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    // Rounding can push `a` marginally past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_M * c
}

/// How pairwise distances are computed from coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceMetric {
    /// Great-circle distance in metres. The right choice for raw GPS input.
    #[default]
    Haversine,

    /// Straight-line distance treating (latitude, longitude) as planar
    /// (y, x) coordinates. Intended for already-projected inputs.
    Euclidean,
}

/// Dense `n × n` distance table stored row-major.
///
/// Built once per optimization run, read-only afterwards. Construction
/// computes the upper triangle only and mirrors it, so the table is
/// symmetric by construction; the diagonal is zero and negative or NaN
/// inputs from a custom function are stored as zero.
///
/// # Examples
///
/// ```
/// use u_tour::distance::{DistanceMatrix, DistanceModel, Location};
///
/// let stops = vec![
///     Location::new("a", 0.0, 0.0),
///     Location::new("b", 0.0, 1.0),
///     Location::new("c", 1.0, 1.0),
/// ];
/// let matrix = DistanceMatrix::haversine(&stops);
/// assert_eq!(matrix.len(), 3);
/// assert_eq!(matrix.distance(1, 1), 0.0);
/// assert_eq!(matrix.distance(0, 2), matrix.distance(2, 0));
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds the table with the given metric.
    pub fn build<L: GeoPoint>(locations: &[L], metric: DistanceMetric) -> Self {
        match metric {
            DistanceMetric::Haversine => Self::haversine(locations),
            DistanceMetric::Euclidean => Self::euclidean(locations),
        }
    }

    /// Great-circle distances in metres.
    pub fn haversine<L: GeoPoint>(locations: &[L]) -> Self {
        Self::from_fn(locations.len(), |i, j| {
            let (a, b) = (&locations[i], &locations[j]);
            haversine_m(a.latitude(), a.longitude(), b.latitude(), b.longitude())
        })
    }

    /// Planar distances in coordinate units.
    pub fn euclidean<L: GeoPoint>(locations: &[L]) -> Self {
        Self::from_fn(locations.len(), |i, j| {
            let (a, b) = (&locations[i], &locations[j]);
            (a.latitude() - b.latitude()).hypot(a.longitude() - b.longitude())
        })
    }

    /// Builds an `n × n` table from `f(i, j)`, evaluated for `i < j` only.
    pub fn from_fn<F>(n: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = f(i, j);
                let d = if d.is_nan() { 0.0 } else { d.max(0.0) };
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Row `i` of the table.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

impl DistanceModel for DistanceMatrix {
    fn len(&self) -> usize {
        self.n
    }

    #[inline]
    fn distance(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.n + to]
    }
}
