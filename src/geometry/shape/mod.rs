mod builder;

use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::sync::OnceLock;

use crate::error::{OperationError, Result};
use crate::geometry::{Bounds2, Ray2, RayIntersection, Segment, Subpath};
use crate::math::{polar, Matrix3, Point2, Vector2};
use crate::render::PathSink;
use crate::tessellation::{
    LineStyles, PiecewiseLinearOptions, TessellateDash, TessellatePiecewise, TessellateStroke,
};

/// Per-corner radii for [`Shape::rounded_rectangle_with_radii`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl CornerRadii {
    /// The same radius at every corner.
    #[must_use]
    pub fn uniform(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }
}

/// A path: an ordered list of subpaths.
///
/// Build one with the canvas-style drawing calls, or with one of the
/// associated constructors such as [`Shape::rectangle`]. The aggregate
/// bounds are computed on first use and cleared by every drawing call.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    subpaths: Vec<Subpath>,
    bounds: OnceLock<Bounds2>,
}

impl Shape {
    /// Creates an empty shape.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_subpaths(subpaths: Vec<Subpath>) -> Self {
        Self {
            subpaths,
            bounds: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn subpaths(&self) -> &[Subpath] {
        &self.subpaths
    }

    #[must_use]
    pub fn has_subpaths(&self) -> bool {
        !self.subpaths.is_empty()
    }

    pub fn add_subpath(&mut self, subpath: Subpath) -> &mut Self {
        self.invalidate();
        self.subpaths.push(subpath);
        self
    }

    /// The current point: the last point of the last subpath.
    #[must_use]
    pub fn last_point(&self) -> Option<Point2> {
        self.subpaths.last().and_then(Subpath::last_point)
    }

    #[must_use]
    pub fn last_segment(&self) -> Option<&Segment> {
        self.subpaths.last().and_then(Subpath::last_segment)
    }

    fn invalidate(&mut self) {
        self.bounds.take();
    }

    fn current_subpath_mut(&mut self) -> &mut Subpath {
        if self.subpaths.is_empty() {
            self.subpaths.push(Subpath::new());
        }
        let last = self.subpaths.len() - 1;
        &mut self.subpaths[last]
    }

    // --- Associated constructors ---

    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        let mut shape = Self::new();
        shape.rect(x, y, width, height);
        shape
    }

    #[must_use]
    pub fn round_rectangle(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        arc_width: f64,
        arc_height: f64,
    ) -> Self {
        let mut shape = Self::new();
        shape.round_rect(x, y, width, height, arc_width, arc_height);
        shape
    }

    /// Rectangle with an independent circular radius at each corner.
    ///
    /// Zero radii give square corners.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if a radius is negative or
    /// if two radii along one side sum to more than that side's length.
    pub fn rounded_rectangle_with_radii(
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radii: &CornerRadii,
    ) -> Result<Self> {
        let CornerRadii {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        } = *radii;
        if [top_left, top_right, bottom_right, bottom_left]
            .iter()
            .any(|radius| radius.is_nan() || *radius < 0.0)
        {
            return Err(OperationError::InvalidInput(format!(
                "corner radii must be non-negative: {radii:?}"
            ))
            .into());
        }
        if top_left + top_right > width
            || bottom_left + bottom_right > width
            || top_left + bottom_left > height
            || top_right + bottom_right > height
        {
            return Err(OperationError::InvalidInput(format!(
                "corner radii {radii:?} overlap in a {width} x {height} rectangle"
            ))
            .into());
        }

        let (right, bottom) = (x + width, y + height);
        let mut shape = Self::new();
        shape.move_to(x + top_left, y).line_to(right - top_right, y);
        if top_right > 0.0 {
            shape.arc(right - top_right, y + top_right, top_right, -FRAC_PI_2, 0.0, false);
        }
        shape.line_to(right, bottom - bottom_right);
        if bottom_right > 0.0 {
            shape.arc(
                right - bottom_right,
                bottom - bottom_right,
                bottom_right,
                0.0,
                FRAC_PI_2,
                false,
            );
        }
        shape.line_to(x + bottom_left, bottom);
        if bottom_left > 0.0 {
            shape.arc(
                x + bottom_left,
                bottom - bottom_left,
                bottom_left,
                FRAC_PI_2,
                PI,
                false,
            );
        }
        shape.line_to(x, y + top_left);
        if top_left > 0.0 {
            shape.arc(
                x + top_left,
                y + top_left,
                top_left,
                PI,
                PI + FRAC_PI_2,
                false,
            );
        }
        shape.close();
        Ok(shape)
    }

    #[must_use]
    pub fn polygon(vertices: &[Point2]) -> Self {
        let mut shape = Self::new();
        shape.add_polygon(vertices);
        shape
    }

    /// Regular polygon centred on the origin with its first vertex on +x.
    #[must_use]
    pub fn regular_polygon(sides: usize, radius: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let vertices: Vec<Point2> = (0..sides)
            .map(|k| Point2::from(polar(radius, TAU * k as f64 / sides as f64)))
            .collect();
        Self::polygon(&vertices)
    }

    #[must_use]
    pub fn circle(cx: f64, cy: f64, radius: f64) -> Self {
        let mut shape = Self::new();
        shape.add_circle(cx, cy, radius);
        shape
    }

    #[must_use]
    pub fn ellipse(cx: f64, cy: f64, radius_x: f64, radius_y: f64, rotation: f64) -> Self {
        let mut shape = Self::new();
        shape.add_ellipse(cx, cy, radius_x, radius_y, rotation);
        shape
    }

    #[must_use]
    pub fn line_segment(start: Point2, end: Point2) -> Self {
        let mut shape = Self::new();
        shape.move_to_point(start).line_to_point(end);
        shape
    }

    // --- Queries ---

    /// Union of all subpath bounds.
    #[must_use]
    pub fn bounds(&self) -> Bounds2 {
        *self.bounds.get_or_init(|| {
            self.subpaths
                .iter()
                .fold(Bounds2::EMPTY, |acc, subpath| acc.union(&subpath.bounds()))
        })
    }

    /// Nonzero-rule containment, tested with a ray toward +x.
    #[must_use]
    pub fn contains_point(&self, point: &Point2) -> bool {
        if !self.bounds().contains_point(point) {
            return false;
        }
        match Ray2::new(*point, Vector2::new(1.0, 0.0)) {
            Ok(ray) => self.winding_intersection(&ray) != 0,
            Err(_) => false,
        }
    }

    /// Summed winding contribution of every subpath, closing segments of
    /// closed subpaths included.
    #[must_use]
    pub fn winding_intersection(&self, ray: &Ray2) -> i32 {
        self.subpaths
            .iter()
            .map(|subpath| subpath.winding_intersection(ray))
            .sum()
    }

    /// Every ray crossing, sorted by ascending distance.
    #[must_use]
    pub fn intersection(&self, ray: &Ray2) -> Vec<RayIntersection> {
        let mut hits: Vec<RayIntersection> = self
            .subpaths
            .iter()
            .flat_map(|subpath| subpath.intersection(ray))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Approximate overlap test between the filled shape and `bounds`.
    ///
    /// True when `bounds` contains the whole shape, when the shape contains
    /// the centre of `bounds`, or when a ray cast along one of the four box
    /// edges hits the shape within that edge. A shape lying strictly inside
    /// the box away from its centre and edges is still reported through the
    /// containment check; thin geometry crossing the interior without
    /// touching an edge or the centre is missed.
    #[must_use]
    pub fn intersects_bounds(&self, bounds: &Bounds2) -> bool {
        let shape_bounds = self.bounds();
        if bounds.is_empty() || !bounds.intersects_bounds(&shape_bounds) {
            return false;
        }
        if bounds.contains_bounds(&shape_bounds) || self.contains_point(&bounds.center()) {
            return true;
        }
        let corners = [
            Point2::new(bounds.min_x(), bounds.min_y()),
            Point2::new(bounds.max_x(), bounds.min_y()),
            Point2::new(bounds.max_x(), bounds.max_y()),
            Point2::new(bounds.min_x(), bounds.max_y()),
        ];
        (0..4).any(|i| {
            let (from, to) = (corners[i], corners[(i + 1) % 4]);
            let length = (to - from).norm();
            Ray2::new(from, to - from).is_ok_and(|ray| {
                self.intersection(&ray)
                    .iter()
                    .any(|hit| hit.distance <= length)
            })
        })
    }

    /// The shape mapped through an affine transform.
    #[must_use]
    pub fn transformed(&self, matrix: &Matrix3) -> Self {
        Self::from_subpaths(
            self.subpaths
                .iter()
                .map(|subpath| subpath.transformed(matrix))
                .collect(),
        )
    }

    /// The same geometry with every subpath walked backwards.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self::from_subpaths(self.subpaths.iter().map(Subpath::reversed).collect())
    }

    /// Signed filled area, positive for paths turning toward increasing
    /// angles.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        self.subpaths.iter().map(Subpath::signed_area).sum()
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.subpaths.iter().map(Subpath::arc_length).sum()
    }

    /// Outline of the stroked path as a fillable shape.
    #[must_use]
    pub fn stroked(&self, styles: &LineStyles) -> Self {
        TessellateStroke::new(self, styles).execute()
    }

    #[must_use]
    pub fn stroked_bounds(&self, styles: &LineStyles) -> Bounds2 {
        self.stroked(styles).bounds()
    }

    /// Cuts the shape into dashes.
    ///
    /// # Errors
    ///
    /// Returns an error if the dash array contains a negative or non-finite
    /// entry.
    pub fn dashed(&self, line_dash: &[f64], line_dash_offset: f64) -> Result<Self> {
        TessellateDash::new(self, line_dash, line_dash_offset).execute()
    }

    /// Adaptive subdivision into lines, with an optional nonlinear point map.
    #[must_use]
    pub fn nonlinear_transformed(&self, options: &PiecewiseLinearOptions) -> Self {
        TessellatePiecewise::new(self, options).execute()
    }

    /// Adaptive subdivision into lines without a point map.
    #[must_use]
    pub fn to_piecewise_linear(&self, options: &PiecewiseLinearOptions) -> Self {
        let options = options.clone().without_point_map();
        TessellatePiecewise::new(self, &options).execute()
    }

    /// Reads `x` as an angle and `y` as a radius and maps the shape into
    /// cartesian space.
    #[must_use]
    pub fn polar_to_cartesian(&self, options: &PiecewiseLinearOptions) -> Self {
        let options = options.clone().polar_to_cartesian();
        TessellatePiecewise::new(self, &options).execute()
    }

    /// SVG path data for every drawable subpath.
    #[must_use]
    pub fn svg_path(&self) -> String {
        self.subpaths.iter().map(Subpath::svg_path).collect()
    }

    pub fn write_to_context(&self, sink: &mut dyn PathSink) {
        for subpath in &self.subpaths {
            subpath.write_to_context(sink);
        }
    }

    /// All segments of all subpaths, excluding implicit closing lines.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.subpaths.iter().flat_map(|subpath| subpath.segments())
    }
}

impl From<Subpath> for Shape {
    fn from(subpath: Subpath) -> Self {
        Self::from_subpaths(vec![subpath])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::transform_2d::{rotation, scaling, translation};
    use approx::assert_abs_diff_eq;

    fn triangle() -> Shape {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0).close();
        shape
    }

    #[test]
    fn triangle_svg_path() {
        assert_eq!(triangle().svg_path(), "M 0 0 L 10 0 L 10 10 Z ");
    }

    #[test]
    fn regular_square_bounds_and_containment() {
        let square = Shape::regular_polygon(4, 1.0);
        assert!(square
            .bounds()
            .equals_epsilon(&Bounds2::new(-1.0, -1.0, 1.0, 1.0), 1e-12));
        assert!(square.contains_point(&Point2::origin()));
        assert!(!square.contains_point(&Point2::new(0.9, 0.9)));
    }

    #[test]
    fn circle_bounds() {
        let circle = Shape::circle(0.0, 0.0, 5.0);
        assert!(circle
            .bounds()
            .equals_epsilon(&Bounds2::new(-5.0, -5.0, 5.0, 5.0), 1e-12));
    }

    #[test]
    fn ray_through_circle_hits_twice() {
        let circle = Shape::circle(0.0, 0.0, 5.0);
        let ray = Ray2::new(Point2::new(-10.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let hits = circle.intersection(&ray);
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].distance, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(hits[1].distance, 15.0, epsilon = 1e-9);
        assert!((hits[0].point - Point2::new(-5.0, 0.0)).norm() < 1e-9);
        assert!((hits[1].point - Point2::new(5.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn rectangle_containment() {
        let rectangle = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(rectangle.contains_point(&Point2::new(0.5, 0.5)));
        assert!(!rectangle.contains_point(&Point2::new(2.0, 2.0)));
        assert!(!rectangle.contains_point(&Point2::new(-0.5, 0.5)));
    }

    #[test]
    fn winding_sign_is_consistent_across_directions() {
        let rectangle = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        let point = Point2::new(0.3, 0.6);
        let windings: Vec<i32> = [0.1_f64, 1.3, 2.9, 4.0, 5.5]
            .iter()
            .map(|angle| {
                let ray = Ray2::new(point, polar(1.0, *angle)).unwrap();
                rectangle.winding_intersection(&ray)
            })
            .collect();
        assert!(windings.iter().all(|w| w.abs() == 1));
        assert!(windings.windows(2).all(|pair| pair[0] == pair[1]));
        let reversed = rectangle.reversed();
        let ray = Ray2::new(point, polar(1.0, 0.1)).unwrap();
        assert_eq!(reversed.winding_intersection(&ray), -windings[0]);
    }

    #[test]
    fn holes_cancel_by_orientation() {
        let mut shape = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let hole = Shape::rectangle(3.0, 3.0, 4.0, 4.0).reversed();
        for subpath in hole.subpaths() {
            shape.add_subpath(subpath.clone());
        }
        assert!(shape.contains_point(&Point2::new(1.0, 1.0)));
        assert!(!shape.contains_point(&Point2::new(5.0, 5.0)));
    }

    #[test]
    fn bounds_cache_is_invalidated() {
        let mut shape = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        assert!(shape
            .bounds()
            .equals_epsilon(&Bounds2::new(0.0, 0.0, 1.0, 1.0), 1e-12));
        shape.move_to(5.0, 5.0).line_to(6.0, 7.0);
        assert!(shape
            .bounds()
            .equals_epsilon(&Bounds2::new(0.0, 0.0, 6.0, 7.0), 1e-12));
    }

    #[test]
    fn intersects_bounds_heuristic() {
        let circle = Shape::circle(0.0, 0.0, 5.0);
        // Crosses an edge.
        assert!(circle.intersects_bounds(&Bounds2::new(4.0, -1.0, 6.0, 1.0)));
        // Entirely inside the circle.
        assert!(circle.intersects_bounds(&Bounds2::new(-1.0, -1.0, 1.0, 1.0)));
        // Contains the circle.
        assert!(circle.intersects_bounds(&Bounds2::new(-6.0, -6.0, 6.0, 6.0)));
        // Inside the bounding box corner but outside the circle.
        assert!(!circle.intersects_bounds(&Bounds2::new(4.0, 4.0, 4.9, 4.9)));
        assert!(!circle.intersects_bounds(&Bounds2::new(10.0, 10.0, 11.0, 11.0)));
    }

    #[test]
    fn rounded_rectangle_radii_are_validated() {
        let radii = CornerRadii {
            top_left: 1.0,
            top_right: 2.0,
            bottom_right: 0.0,
            bottom_left: 0.5,
        };
        let shape = Shape::rounded_rectangle_with_radii(0.0, 0.0, 10.0, 5.0, &radii).unwrap();
        assert!(shape
            .bounds()
            .equals_epsilon(&Bounds2::new(0.0, 0.0, 10.0, 5.0), 1e-9));
        assert!(shape.contains_point(&Point2::new(9.9, 4.9)));
        assert!(!shape.contains_point(&Point2::new(9.9, 0.1)));

        let negative = CornerRadii::uniform(-1.0);
        assert!(Shape::rounded_rectangle_with_radii(0.0, 0.0, 10.0, 5.0, &negative).is_err());
        let overlapping = CornerRadii::uniform(3.0);
        assert!(Shape::rounded_rectangle_with_radii(0.0, 0.0, 10.0, 5.0, &overlapping).is_err());
    }

    #[test]
    fn area_of_basic_shapes() {
        assert_abs_diff_eq!(triangle().area(), 50.0, epsilon = 1e-9);
        assert_abs_diff_eq!(Shape::circle(1.0, 2.0, 3.0).area(), 9.0 * PI, epsilon = 1e-9);
        assert_abs_diff_eq!(
            Shape::ellipse(0.0, 0.0, 3.0, 2.0, 0.7).area(),
            6.0 * PI,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(
            Shape::rectangle(0.0, 0.0, 2.0, 3.0).reversed().signed_area(),
            -6.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn arc_length_of_circle() {
        assert_abs_diff_eq!(
            Shape::circle(0.0, 0.0, 2.0).arc_length(),
            4.0 * PI,
            epsilon = 1e-9
        );
    }

    #[test]
    fn transformed_keeps_containment() {
        let matrix = translation(5.0, 1.0) * rotation(0.3) * scaling(2.0, 0.5);
        let circle = Shape::circle(0.0, 0.0, 1.0).transformed(&matrix);
        assert!(circle.contains_point(&Point2::new(5.0, 1.0)));
        assert!(!circle.contains_point(&Point2::new(5.0, 2.5)));
        assert_abs_diff_eq!(circle.area(), PI, epsilon = 1e-9);
    }

    #[test]
    fn cubic_with_three_close_crossings_is_wound_correctly() {
        // y(t) = 100 (t - 0.4)(t - 0.5)(t - 0.6), x(t) = 10 t: crosses y = 0
        // three times at x = 4, 5 and 6.
        let mut shape = Shape::new();
        shape
            .move_to(0.0, -12.0)
            .cubic_curve_to(10.0 / 3.0, 38.0 / 3.0, 20.0 / 3.0, -38.0 / 3.0, 10.0, 12.0)
            .line_to(10.0, -20.0)
            .line_to(0.0, -20.0)
            .close();

        let ray = Ray2::new(Point2::new(-1.0, 0.0), Vector2::new(1.0, 0.0)).unwrap();
        let curve_hits: Vec<f64> = shape
            .intersection(&ray)
            .iter()
            .filter(|hit| hit.point.x < 9.0)
            .map(|hit| hit.point.x)
            .collect();
        assert_eq!(curve_hits.len(), 3, "{curve_hits:?}");
        for (x, expected) in curve_hits.iter().zip([4.0, 5.0, 6.0]) {
            assert_abs_diff_eq!(*x, expected, epsilon = 1e-6);
        }

        // The curve is at y = -6 when x = 1, so (1, 0) lies above the region.
        assert!(!shape.contains_point(&Point2::new(1.0, 0.0)));
        assert!(shape.contains_point(&Point2::new(5.0, -15.0)));
        assert!(shape.contains_point(&Point2::new(1.0, -10.0)));
    }

    #[test]
    fn open_subpath_is_not_closed_for_winding() {
        let mut shape = Shape::new();
        shape.move_to(0.0, 0.0).line_to(10.0, 0.0).line_to(10.0, 10.0);
        let ray = Ray2::new(Point2::new(2.0, 5.0), Vector2::new(1.0, 0.0)).unwrap();
        assert_eq!(shape.winding_intersection(&ray), 1);
        assert_eq!(shape.intersection(&ray).len(), 1);
        // Area still treats the open path as filled.
        assert_abs_diff_eq!(shape.area(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn line_segment_has_no_area() {
        let shape = Shape::line_segment(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert_abs_diff_eq!(shape.arc_length(), 5.0, epsilon = 1e-12);
        assert!(!shape.contains_point(&Point2::new(1.5, 2.0)));
        assert_abs_diff_eq!(shape.signed_area(), 0.0, epsilon = 1e-12);
    }
}
