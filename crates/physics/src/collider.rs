//! Colliders, manifolds and the narrow phase.
//!
//! Two collider shapes exist: axis-aligned boxes and circles. The pair
//! dispatch is a tagged enum match, no virtual dispatch involved.

use glam::Vec2;
use wallball_core::Entity;

use crate::body::Transform;

/// Axis-aligned box collider, offset from the body by `center`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AabbCollider {
    pub half_width: f32,
    pub half_height: f32,
    pub center: Vec2,
}

/// Circle collider, offset from the body by `center`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircleCollider {
    pub radius: f32,
    pub center: Vec2,
}

/// Tagged collider variant used for pairwise dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    Aabb(AabbCollider),
    Circle(CircleCollider),
}

/// Geometric result of one collision test.
///
/// `normal` points from the first body to the second; `depth >= 0`
/// whenever `has_collision`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    pub has_collision: bool,
    /// Contact point on the first collider.
    pub a: Vec2,
    /// Contact point on the second collider.
    pub b: Vec2,
    pub normal: Vec2,
    pub depth: f32,
}

impl Manifold {
    pub fn none() -> Self {
        Self {
            has_collision: false,
            a: Vec2::ZERO,
            b: Vec2::ZERO,
            normal: Vec2::ZERO,
            depth: 0.0,
        }
    }

    fn new(a: Vec2, b: Vec2, normal: Vec2, depth: f32) -> Self {
        Self {
            has_collision: true,
            a,
            b,
            normal,
            depth,
        }
    }

    /// Same contact seen from the other body.
    pub fn swapped(self) -> Self {
        Self {
            has_collision: self.has_collision,
            a: self.b,
            b: self.a,
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// A detected contact between two entities. A/B ordering preserves the
/// broad-phase pairing.
#[derive(Debug, Clone, Copy)]
pub struct Collision {
    pub entity_a: Entity,
    pub entity_b: Entity,
    pub manifold: Manifold,
}

impl Collider {
    /// Test this collider against another, both placed by their body
    /// transforms.
    pub fn test_collision(
        &self,
        transform: &Transform,
        other: &Collider,
        other_transform: &Transform,
    ) -> Manifold {
        match (self, other) {
            (Collider::Circle(a), Collider::Circle(b)) => {
                circle_circle(a, transform, b, other_transform)
            }
            (Collider::Circle(a), Collider::Aabb(b)) => {
                circle_aabb(a, transform, b, other_transform)
            }
            (Collider::Aabb(a), Collider::Circle(b)) => {
                circle_aabb(b, other_transform, a, transform).swapped()
            }
            (Collider::Aabb(a), Collider::Aabb(b)) => aabb_aabb(a, transform, b, other_transform),
        }
    }

    /// Support point: the collider point furthest along `direction`.
    pub fn find_furthest_point(&self, transform: &Transform, direction: Vec2) -> Vec2 {
        match self {
            Collider::Circle(circle) => {
                let center = transform.position + circle.center;
                let dir = direction.normalize_or_zero();
                center + dir * circle.radius
            }
            Collider::Aabb(aabb) => {
                let center = transform.position + aabb.center;
                let x = if direction.x < 0.0 {
                    -aabb.half_width
                } else {
                    aabb.half_width
                };
                let y = if direction.y < 0.0 {
                    -aabb.half_height
                } else {
                    aabb.half_height
                };
                center + Vec2::new(x, y)
            }
        }
    }

    /// Full size of the box surrounding the collider, used by the broad
    /// phase.
    pub fn bounding_box_size(&self) -> Vec2 {
        match self {
            Collider::Circle(circle) => Vec2::splat(circle.radius * 2.0),
            Collider::Aabb(aabb) => Vec2::new(aabb.half_width * 2.0, aabb.half_height * 2.0),
        }
    }

    /// Offset of the collider from its body.
    pub fn center(&self) -> Vec2 {
        match self {
            Collider::Circle(circle) => circle.center,
            Collider::Aabb(aabb) => aabb.center,
        }
    }
}

fn circle_circle(
    a: &CircleCollider,
    ta: &Transform,
    b: &CircleCollider,
    tb: &Transform,
) -> Manifold {
    let center_a = ta.position + a.center;
    let center_b = tb.position + b.center;

    let delta = center_b - center_a;
    let distance = delta.length();
    let radius_sum = a.radius + b.radius;

    // Coincident centers have no usable normal.
    if distance == 0.0 || distance >= radius_sum {
        return Manifold::none();
    }

    let normal = delta / distance;
    Manifold::new(
        center_a + normal * a.radius,
        center_b - normal * b.radius,
        normal,
        radius_sum - distance,
    )
}

fn aabb_aabb(a: &AabbCollider, ta: &Transform, b: &AabbCollider, tb: &Transform) -> Manifold {
    let center_a = ta.position + a.center;
    let center_b = tb.position + b.center;

    let delta = center_b - center_a;
    let overlap_x = a.half_width + b.half_width - delta.x.abs();
    if overlap_x <= 0.0 {
        return Manifold::none();
    }
    let overlap_y = a.half_height + b.half_height - delta.y.abs();
    if overlap_y <= 0.0 {
        return Manifold::none();
    }

    // Axis of minimum penetration picks the normal.
    if overlap_x < overlap_y {
        let sign = if delta.x < 0.0 { -1.0 } else { 1.0 };
        let normal = Vec2::new(sign, 0.0);
        Manifold::new(
            center_a + normal * a.half_width,
            center_b - normal * b.half_width,
            normal,
            overlap_x,
        )
    } else {
        let sign = if delta.y < 0.0 { -1.0 } else { 1.0 };
        let normal = Vec2::new(0.0, sign);
        Manifold::new(
            center_a + normal * a.half_height,
            center_b - normal * b.half_height,
            normal,
            overlap_y,
        )
    }
}

/// Circle is the first body, box the second.
fn circle_aabb(
    circle: &CircleCollider,
    tc: &Transform,
    aabb: &AabbCollider,
    tb: &Transform,
) -> Manifold {
    let circle_center = tc.position + circle.center;
    let box_center = tb.position + aabb.center;

    let clamped = Vec2::new(
        circle_center
            .x
            .clamp(box_center.x - aabb.half_width, box_center.x + aabb.half_width),
        circle_center.y.clamp(
            box_center.y - aabb.half_height,
            box_center.y + aabb.half_height,
        ),
    );

    let delta = circle_center - clamped;
    let distance = delta.length();
    if distance >= circle.radius {
        return Manifold::none();
    }

    if distance == 0.0 {
        // Center on or inside the box: resolve through the nearest
        // face instead of a zero-length normal.
        let to_center = circle_center - box_center;
        let face_x = aabb.half_width - to_center.x.abs();
        let face_y = aabb.half_height - to_center.y.abs();
        let (towards_circle, face_depth) = if face_x < face_y {
            let sign = if to_center.x < 0.0 { -1.0 } else { 1.0 };
            (Vec2::new(sign, 0.0), face_x)
        } else {
            let sign = if to_center.y < 0.0 { -1.0 } else { 1.0 };
            (Vec2::new(0.0, sign), face_y)
        };
        let normal = -towards_circle;
        return Manifold::new(
            circle_center + normal * circle.radius,
            clamped,
            normal,
            circle.radius + face_depth,
        );
    }

    // Points from the circle towards the box.
    let normal = -delta / distance;
    Manifold::new(
        circle_center + normal * circle.radius,
        clamped,
        normal,
        circle.radius - distance,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f32, y: f32) -> Transform {
        Transform {
            position: Vec2::new(x, y),
            ..Transform::default()
        }
    }

    fn circle(radius: f32) -> Collider {
        Collider::Circle(CircleCollider {
            radius,
            center: Vec2::ZERO,
        })
    }

    fn aabb(half_width: f32, half_height: f32) -> Collider {
        Collider::Aabb(AabbCollider {
            half_width,
            half_height,
            center: Vec2::ZERO,
        })
    }

    #[test]
    fn circle_circle_overlap() {
        let manifold = circle(1.0).test_collision(&at(0.0, 0.0), &circle(1.0), &at(1.5, 0.0));
        assert!(manifold.has_collision);
        assert_eq!(manifold.normal, Vec2::new(1.0, 0.0));
        assert!((manifold.depth - 0.5).abs() < 1e-6);
        assert_eq!(manifold.a, Vec2::new(1.0, 0.0));
        assert_eq!(manifold.b, Vec2::new(0.5, 0.0));
    }

    #[test]
    fn circle_circle_separated() {
        let manifold = circle(1.0).test_collision(&at(0.0, 0.0), &circle(1.0), &at(2.5, 0.0));
        assert!(!manifold.has_collision);
    }

    #[test]
    fn circle_circle_coincident_is_degenerate() {
        let manifold = circle(1.0).test_collision(&at(0.0, 0.0), &circle(1.0), &at(0.0, 0.0));
        assert!(!manifold.has_collision);
    }

    #[test]
    fn aabb_aabb_min_axis_normal() {
        // Deep y-overlap, shallow x-overlap: the normal must be +-x.
        let manifold =
            aabb(1.0, 1.0).test_collision(&at(0.0, 0.0), &aabb(1.0, 1.0), &at(1.8, 0.2));
        assert!(manifold.has_collision);
        assert_eq!(manifold.normal, Vec2::new(1.0, 0.0));
        assert!((manifold.depth - 0.2).abs() < 1e-6);
    }

    #[test]
    fn aabb_aabb_disjoint() {
        let manifold =
            aabb(1.0, 1.0).test_collision(&at(0.0, 0.0), &aabb(1.0, 1.0), &at(3.0, 0.0));
        assert!(!manifold.has_collision);
    }

    #[test]
    fn circle_aabb_side_contact() {
        // Circle to the right of a unit box, overlapping its face.
        let manifold = circle(0.5).test_collision(&at(1.3, 0.0), &aabb(1.0, 1.0), &at(0.0, 0.0));
        assert!(manifold.has_collision);
        // First body is the circle; the normal points towards the box.
        assert_eq!(manifold.normal, Vec2::new(-1.0, 0.0));
        assert!((manifold.depth - 0.2).abs() < 1e-6);
    }

    #[test]
    fn aabb_circle_flips_normal() {
        let manifold = aabb(1.0, 1.0).test_collision(&at(0.0, 0.0), &circle(0.5), &at(1.3, 0.0));
        assert!(manifold.has_collision);
        // First body is the box; the normal points towards the circle.
        assert_eq!(manifold.normal, Vec2::new(1.0, 0.0));
        assert!((manifold.depth - 0.2).abs() < 1e-6);
    }

    #[test]
    fn circle_center_inside_box_resolves_nearest_face() {
        // Center well inside the box: the contact pushes out through the
        // closest face rather than vanishing.
        let manifold = circle(0.3).test_collision(&at(0.7, 0.1), &aabb(1.0, 1.0), &at(0.0, 0.0));
        assert!(manifold.has_collision);
        assert_eq!(manifold.normal, Vec2::new(-1.0, 0.0));
        assert!((manifold.depth - (0.3 + 0.3)).abs() < 1e-6);
    }

    #[test]
    fn furthest_point_supports() {
        let t = at(1.0, 1.0);
        let p = circle(2.0).find_furthest_point(&t, Vec2::new(1.0, 0.0));
        assert_eq!(p, Vec2::new(3.0, 1.0));

        let p = aabb(1.0, 0.5).find_furthest_point(&t, Vec2::new(-1.0, 1.0));
        assert_eq!(p, Vec2::new(0.0, 1.5));
    }

    #[test]
    fn bounding_boxes() {
        assert_eq!(circle(1.5).bounding_box_size(), Vec2::splat(3.0));
        assert_eq!(aabb(1.0, 2.0).bounding_box_size(), Vec2::new(2.0, 4.0));
    }
}
