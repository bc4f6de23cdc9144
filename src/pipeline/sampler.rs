use crate::shared::CurvePoint;

/// A finished gesture: x-monotonic points in canvas pixels.
pub type Curve = Vec<CurvePoint>;

/// Collects pointer samples for one drag. Lives for a single gesture and is
/// consumed by `into_curve` on commit.
#[derive(Clone, Debug)]
pub struct CurveSampler {
    width: f32,
    height: f32,
    margin: f32,
    last: Option<CurvePoint>, // cursor for the one-y-per-x rule
    points: Curve,
    drawing: bool,
}

impl CurveSampler {
    pub fn new(width: f32, height: f32, margin: f32) -> Self {
        Self {
            width,
            height,
            margin,
            last: None,
            points: Vec::new(),
            drawing: false,
        }
    }

    fn clamp(&self, p: CurvePoint) -> CurvePoint {
        CurvePoint {
            x: p.x.clamp(0.0, (self.width - self.margin).max(0.0)),
            y: p.y.clamp(0.0, (self.height - self.margin).max(0.0)),
        }
    }

    /// Pointer down. Starts a new stroke at `point`, replacing whatever was
    /// drawn before. The x cursor survives, so a press left of it is ignored
    /// and the old stroke stays.
    pub fn begin(&mut self, point: CurvePoint) {
        self.drawing = true;
        let p = self.clamp(point);
        if self.last.is_some_and(|last| p.x < last.x) {
            return;
        }
        self.points.clear();
        self.last = Some(p);
        self.points.push(p);
    }

    /// Pointer move. Ignored unless a gesture is in progress.
    pub fn extend(&mut self, point: CurvePoint) {
        if self.drawing {
            self.push(point);
        }
    }

    pub fn end(&mut self) {
        self.drawing = false;
    }

    fn push(&mut self, point: CurvePoint) {
        let p = self.clamp(point);
        if let Some(last) = self.last {
            if p.x < last.x {
                return;
            }
        }
        self.last = Some(p);
        self.points.push(p);
    }

    #[cfg(test)]
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    #[cfg(test)]
    pub fn last_point(&self) -> Option<CurvePoint> {
        self.last
    }

    /// Hand the curve off for commit, closing it out to the canvas edge.
    ///
    /// An empty gesture becomes a flat baseline. A stroke that got as far as
    /// the margin has reached the edge and is carried across it at its last
    /// height; one that stopped short gets a trailing segment back to
    /// half-height so the whole cycle is covered.
    pub fn into_curve(self) -> Curve {
        let baseline = self.height / 2.0;
        let edge = (self.width - self.margin).max(0.0);
        let mut points = self.points;
        match points.last().copied() {
            None => {
                log::warn!("committing an empty curve, substituting a flat line");
                points.push(CurvePoint::new(0.0, baseline));
                points.push(CurvePoint::new(self.width, baseline));
            }
            Some(last) if last.x >= self.width => {}
            Some(last) if last.x >= edge => {
                points.push(CurvePoint::new(self.width, last.y));
            }
            Some(_) => {
                points.push(CurvePoint::new(self.width, baseline));
            }
        }
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sampler() -> CurveSampler {
        CurveSampler::new(400.0, 200.0, 10.0)
    }

    #[test]
    fn drops_points_that_move_left() {
        let mut s = sampler();
        s.begin(CurvePoint::new(10.0, 50.0));
        s.extend(CurvePoint::new(20.0, 60.0));
        s.extend(CurvePoint::new(15.0, 70.0));
        s.extend(CurvePoint::new(20.0, 80.0)); // same x is allowed
        s.extend(CurvePoint::new(30.0, 90.0));
        let xs: Vec<f32> = s.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 20.0, 20.0, 30.0]);
        assert_eq!(s.last_point(), Some(CurvePoint::new(30.0, 90.0)));
    }

    #[test]
    fn clamps_into_canvas() {
        let mut s = sampler();
        s.begin(CurvePoint::new(-5.0, -20.0));
        s.extend(CurvePoint::new(1000.0, 1000.0));
        assert_eq!(s.points()[0], CurvePoint::new(0.0, 0.0));
        assert_eq!(s.points()[1], CurvePoint::new(390.0, 190.0));
    }

    #[test]
    fn moves_without_a_gesture_are_ignored() {
        let mut s = sampler();
        s.extend(CurvePoint::new(10.0, 10.0));
        assert!(s.points().is_empty());
        s.begin(CurvePoint::new(10.0, 10.0));
        s.end();
        assert!(!s.is_drawing());
        s.extend(CurvePoint::new(20.0, 10.0));
        assert_eq!(s.points().len(), 1);
    }

    #[test]
    fn second_press_starts_a_new_stroke() {
        let mut s = sampler();
        s.begin(CurvePoint::new(50.0, 0.0));
        s.extend(CurvePoint::new(100.0, 0.0));
        s.end();
        s.begin(CurvePoint::new(200.0, 190.0));
        s.extend(CurvePoint::new(300.0, 190.0));
        assert_eq!(
            s.points(),
            &[CurvePoint::new(200.0, 190.0), CurvePoint::new(300.0, 190.0)]
        );
    }

    #[test]
    fn press_left_of_the_cursor_keeps_the_old_stroke() {
        let mut s = sampler();
        s.begin(CurvePoint::new(100.0, 10.0));
        s.end();
        s.begin(CurvePoint::new(50.0, 10.0));
        assert!(s.is_drawing());
        assert_eq!(s.points(), &[CurvePoint::new(100.0, 10.0)]);
        s.extend(CurvePoint::new(150.0, 30.0));
        assert_eq!(s.points().len(), 2);
    }

    #[test]
    fn empty_commit_is_flat() {
        let curve = sampler().into_curve();
        assert_eq!(
            curve,
            vec![CurvePoint::new(0.0, 100.0), CurvePoint::new(400.0, 100.0)]
        );
    }

    #[test]
    fn short_curve_returns_to_baseline() {
        let mut s = sampler();
        s.begin(CurvePoint::new(0.0, 0.0));
        s.extend(CurvePoint::new(200.0, 50.0));
        let curve = s.into_curve();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[2], CurvePoint::new(400.0, 100.0));
    }

    #[test]
    fn stroke_into_the_margin_is_carried_to_the_edge() {
        let mut s = sampler();
        s.begin(CurvePoint::new(0.0, 0.0));
        s.extend(CurvePoint::new(1000.0, 1000.0)); // clamped to (390, 190)
        let curve = s.into_curve();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[2], CurvePoint::new(400.0, 190.0));
    }

    #[test]
    fn stroke_on_the_edge_is_left_alone() {
        let mut s = CurveSampler::new(400.0, 200.0, 0.0);
        s.begin(CurvePoint::new(0.0, 0.0));
        s.extend(CurvePoint::new(400.0, 200.0));
        assert_eq!(s.into_curve().len(), 2);
    }
}
