//! Location records and the distance backend trait.

/// Read access to a location's coordinates.
///
/// Implemented by [`Location`]; callers with their own record type can
/// implement it directly and get the same records back, reordered.
pub trait GeoPoint {
    /// Latitude in degrees (-90 to 90).
    fn latitude(&self) -> f64;

    /// Longitude in degrees (-180 to 180).
    fn longitude(&self) -> f64;
}

/// A visit location as supplied by the caller.
///
/// The optimizer only reads it. The identifier is opaque and is returned
/// untouched in the optimized order.
///
/// # Examples
///
/// ```
/// use u_tour::distance::{GeoPoint, Location};
///
/// let depot = Location::new("depot", 37.5665, 126.9780);
/// assert_eq!(depot.id, "depot");
/// assert!((depot.latitude() - 37.5665).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Caller-defined identifier.
    pub id: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl Location {
    /// Creates a new location.
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }
}

impl GeoPoint for Location {
    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl<T: GeoPoint + ?Sized> GeoPoint for &T {
    fn latitude(&self) -> f64 {
        (**self).latitude()
    }

    fn longitude(&self) -> f64 {
        (**self).longitude()
    }
}

/// Pairwise distance backend over location indices `0..len()`.
///
/// Implementations must be symmetric, return `0.0` on the diagonal and
/// never return negative values. They are shared read-only across worker
/// threads, hence `Send + Sync`.
///
/// The default [`tour_distance`](DistanceModel::tour_distance) sums
/// consecutive lookups and closes the loop back to the first index.
/// Backends with a faster whole-tour evaluation may override it.
pub trait DistanceModel: Send + Sync {
    /// Number of locations covered by the model.
    fn len(&self) -> usize;

    /// Returns `true` if the model covers no locations.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Distance between locations `from` and `to`.
    fn distance(&self, from: usize, to: usize) -> f64;

    /// Total length of the closed tour visiting `order` in sequence.
    ///
    /// Tours with fewer than two stops have length zero.
    fn tour_distance(&self, order: &[usize]) -> f64 {
        let n = order.len();
        if n < 2 {
            return 0.0;
        }
        let open: f64 = order
            .windows(2)
            .map(|w| self.distance(w[0], w[1]))
            .sum();
        open + self.distance(order[n - 1], order[0])
    }
}
