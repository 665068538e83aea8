//! Toroidal geometry helpers. Opposite edges of the world are adjacent, so
//! positions wrap modulo the world size and distances take the short way round.

/// Wraps `v` into `[0, size)`.
#[inline]
#[must_use]
pub fn wrap(v: f64, size: f64) -> f64 {
    let r = v.rem_euclid(size);
    // rem_euclid can round up to `size` for tiny negative inputs.
    if r >= size {
        0.0
    } else {
        r
    }
}

/// Signed shortest displacement from `from` to `to` on a ring of length `size`.
#[inline]
#[must_use]
pub fn delta(from: f64, to: f64, size: f64) -> f64 {
    let mut d = to - from;
    let half = size * 0.5;
    if d > half {
        d -= size;
    } else if d < -half {
        d += size;
    }
    d
}

/// Squared toroidal distance between two points.
#[inline]
#[must_use]
pub fn distance_sq(ax: f64, ay: f64, bx: f64, by: f64, size: f64) -> f64 {
    let dx = delta(ax, bx, size);
    let dy = delta(ay, by, size);
    dx * dx + dy * dy
}

/// Scales `(vx, vy)` down so its magnitude does not exceed `max`.
#[inline]
pub fn clamp_magnitude(vx: &mut f64, vy: &mut f64, max: f64) {
    let mag_sq = *vx * *vx + *vy * *vy;
    if mag_sq <= max * max || mag_sq == 0.0 {
        return;
    }
    let scale = max.max(0.0) / mag_sq.sqrt();
    *vx *= scale;
    *vy *= scale;
}
