//! Interactive editing of a transform's parallelogram
//!
//! Every gesture takes a point in model coordinates and rewrites the
//! coefficients so the parallelogram follows it. Vector-changing gestures can
//! be norm limited, keeping both basis vectors strictly inside the unit disk
//! so a linear transform stays contracting.

use crate::system::transform::Transform;
use serde::{Deserialize, Serialize};

/// Keeps a clamped vector just inside the unit circle despite rounding
const NORM_MARGIN: f64 = 0.999_999;

/// Editing gesture applied to a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Translate the center by the given offset
    MoveCenter,
    /// Replace the basis vector whose tip is closest to the point, center fixed
    Vector,
    /// Like `Vector` but the center follows so the base corner stays in place
    Edge,
    /// Rotate around the center so the base corner points at the target
    Rotation,
    /// Scale around the center so the base corner reaches the target distance
    Dilation,
}

impl Gesture {
    /// Whether the gesture changes the area of the parallelogram
    pub const fn changes_geometry(self) -> bool {
        !matches!(self, Self::MoveCenter)
    }
}

impl Transform {
    /// Apply `gesture` with target `(mx, my)`
    ///
    /// For `MoveCenter` the target is an offset, for every other gesture a
    /// point in model coordinates.
    pub fn apply_gesture(&mut self, gesture: Gesture, mx: f64, my: f64, norm_limited: bool) {
        match gesture {
            Gesture::MoveCenter => self.move_center(mx, my),
            Gesture::Vector => self.drag_vector(mx, my, norm_limited),
            Gesture::Edge => self.drag_edge(mx, my, norm_limited),
            Gesture::Rotation => self.rotate_towards(mx, my),
            Gesture::Dilation => self.dilate_towards(mx, my, norm_limited),
        }
    }

    /// Translate the center by `(dx, dy)`
    pub fn move_center(&mut self, dx: f64, dy: f64) {
        self.e += dx;
        self.f += dy;
    }

    /// Rotate by the angle between center→base corner and center→target
    pub fn rotate_towards(&mut self, mx: f64, my: f64) {
        let (base_x, base_y) = self.base_corner();
        let base_angle = (base_y - self.f).atan2(base_x - self.e);
        let target_angle = (my - self.f).atan2(mx - self.e);
        self.rotate(target_angle - base_angle);
    }

    /// Scale both vectors by |center→target| / |center→base corner|
    ///
    /// When `norm_limited`, the longer vector is capped at unit length.
    pub fn dilate_towards(&mut self, mx: f64, my: f64, norm_limited: bool) {
        let (base_x, base_y) = self.base_corner();
        let candidate = (mx - self.e).hypot(my - self.f) / (base_x - self.e).hypot(base_y - self.f);
        let longest = self.a.hypot(self.b).max(self.c.hypot(self.d));
        let dilation = if norm_limited && longest * candidate > 1.0 {
            1.0 / longest
        } else {
            candidate
        };
        self.a *= dilation;
        self.b *= dilation;
        self.c *= dilation;
        self.d *= dilation;
    }

    /// Point the nearest basis vector from the base corner to the target
    ///
    /// The center is left in place. When `norm_limited`, a target farther
    /// than 1 from the base corner is pulled back just inside the unit circle.
    pub fn drag_vector(&mut self, mx: f64, my: f64, norm_limited: bool) {
        let (base_x, base_y) = self.base_corner();
        let norm2 = (mx - base_x).powi(2) + (my - base_y).powi(2);
        let (kx, ky) = if norm_limited && norm2 > 1.0 {
            let lambda = NORM_MARGIN / norm2.sqrt();
            (
                lambda.mul_add(mx, (1.0 - lambda) * base_x),
                lambda.mul_add(my, (1.0 - lambda) * base_y),
            )
        } else {
            (mx, my)
        };

        // Nearest tip decided on the unclamped target
        let to_first = (mx - (base_x + self.a)).powi(2) + (my - (base_y + self.b)).powi(2);
        let to_second = (mx - (base_x + self.c)).powi(2) + (my - (base_y + self.d)).powi(2);
        if to_first < to_second {
            self.a = kx - base_x;
            self.b = ky - base_y;
        } else {
            self.c = kx - base_x;
            self.d = ky - base_y;
        }
    }

    /// Drag a vector tip, then recenter so the base corner is unchanged
    pub fn drag_edge(&mut self, mx: f64, my: f64, norm_limited: bool) {
        let (base_x, base_y) = self.base_corner();
        self.drag_vector(mx, my, norm_limited);
        self.e = (self.a + self.c).mul_add(0.5, base_x);
        self.f = (self.b + self.d).mul_add(0.5, base_y);
    }
}
