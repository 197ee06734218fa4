//! A scene: one geometry context and the shapes that live in it.
//!
//! The context (tolerance and origin) is owned by the scene and handed to every
//! constructor and operation, so independent scenes never share state.
//! `set_origin` re-expresses every member in the new frame in place.

use tracing::debug;

use crate::cfg::{GeomCfg, Origin};
use crate::conic::{Conic, ConicParams};
use crate::duality::{self, Entity};
use crate::error::{GeomError, Result};
use crate::primitives::{Line, Point};

/// Closed union of everything a scene can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Point),
    Line(Line),
    Conic(Conic),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "Point",
            Shape::Line(_) => "Line",
            Shape::Conic(_) => "Conic",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Shape::Point(p) => p.name(),
            Shape::Line(l) => l.name(),
            Shape::Conic(c) => c.name(),
        }
    }

    pub fn update_origin(&mut self, origin: Origin) {
        match self {
            Shape::Point(p) => p.update_origin(origin),
            Shape::Line(l) => l.update_origin(origin),
            Shape::Conic(c) => c.update_origin(origin),
        }
    }
}

impl From<Point> for Shape {
    fn from(p: Point) -> Self {
        Shape::Point(p)
    }
}

impl From<Line> for Shape {
    fn from(l: Line) -> Self {
        Shape::Line(l)
    }
}

impl From<Conic> for Shape {
    fn from(c: Conic) -> Self {
        Shape::Conic(c)
    }
}

impl From<Entity> for Shape {
    fn from(e: Entity) -> Self {
        match e {
            Entity::Point(p) => Shape::Point(p),
            Entity::Line(l) => Shape::Line(l),
        }
    }
}

impl TryFrom<Shape> for Entity {
    type Error = GeomError;

    fn try_from(shape: Shape) -> Result<Self> {
        match shape {
            Shape::Point(p) => Ok(Entity::Point(p)),
            Shape::Line(l) => Ok(Entity::Line(l)),
            Shape::Conic(_) => Err(GeomError::OperandType {
                op: "duality",
                kind: "Conic",
            }),
        }
    }
}

fn operand(shape: &Shape) -> Result<Entity> {
    Entity::try_from(shape.clone())
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    cfg: GeomCfg,
    shapes: Vec<Shape>,
}

impl Scene {
    pub fn new(cfg: GeomCfg) -> Self {
        Self {
            cfg,
            shapes: Vec::new(),
        }
    }

    #[inline]
    pub fn cfg(&self) -> GeomCfg {
        self.cfg
    }

    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Adds a shape, re-expressed in the scene's frame; returns its index.
    pub fn add(&mut self, shape: impl Into<Shape>) -> usize {
        let mut shape = shape.into();
        shape.update_origin(self.cfg.origin);
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    /// Point from canonical coordinates, using the scene's context.
    pub fn point(&mut self, name: &str, coords: &[f64]) -> Result<usize> {
        let p = Point::new(coords, self.cfg)?.with_name(name);
        Ok(self.add(p))
    }

    pub fn line(&mut self, name: &str, coeffs: &[f64]) -> Result<usize> {
        let l = Line::new(coeffs, self.cfg)?.with_name(name);
        Ok(self.add(l))
    }

    pub fn conic(&mut self, params: &ConicParams) -> Result<usize> {
        let c = Conic::new(params, self.cfg)?;
        Ok(self.add(c))
    }

    pub fn get(&self, idx: usize) -> Option<&Shape> {
        self.shapes.get(idx)
    }

    /// First shape called `name`.
    pub fn find(&self, name: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.name() == name)
    }

    pub fn set_origin(&mut self, origin: Origin) {
        debug!(x = origin.x, y = origin.y, shapes = self.shapes.len(), "scene origin");
        self.cfg.origin = origin;
        for s in &mut self.shapes {
            s.update_origin(origin);
        }
    }

    #[inline]
    pub fn reset_origin(&mut self) {
        self.set_origin(Origin::default());
    }

    /// Duality cross product of two member shapes; conics are rejected.
    pub fn cross(&self, a: &Shape, b: &Shape) -> Result<Entity> {
        Ok(duality::cross(&operand(a)?, &operand(b)?, self.cfg))
    }

    pub fn dot(&self, a: &Shape, b: &Shape) -> Result<f64> {
        duality::dot(&operand(a)?, &operand(b)?)
    }

    pub fn distance(&self, a: &Shape, b: &Shape) -> Result<f64> {
        Ok(duality::distance(&operand(a)?, &operand(b)?, self.cfg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn shape<'a>(scene: &'a Scene, name: &str) -> &'a Shape {
        scene.find(name).unwrap()
    }

    #[test]
    fn cross_products_by_name() {
        let mut scene = Scene::default();
        scene.point("p1", &[1.0, 1.0]).unwrap();
        scene.point("p2", &[-1.0, -1.0]).unwrap();
        scene.line("l1", &[1.0, -1.0, 1.0]).unwrap();
        scene.line("l3", &[-1.0, -1.0, 1.0]).unwrap();
        let tol = scene.cfg().tol;

        let l = scene.cross(shape(&scene, "p1"), shape(&scene, "p2")).unwrap();
        let diag = Line::new(&[1.0, -1.0, 0.0], scene.cfg()).unwrap();
        assert!(l.as_line().unwrap().approx_eq(&diag, tol));

        let p = scene.cross(shape(&scene, "l1"), shape(&scene, "l3")).unwrap();
        assert!(p.as_point().unwrap().approx_eq(&Point::xy(0.0, 1.0, scene.cfg()), tol));

        let idx = scene.add(p.clone());
        assert_eq!(scene.get(idx).map(Shape::kind), Some("Point"));
        assert_eq!(scene.len(), 5);
    }

    #[test]
    fn conics_are_not_duality_operands() {
        let mut scene = Scene::default();
        scene.conic(&ConicParams::default().named("C")).unwrap();
        scene.point("p", &[1.0, 0.0]).unwrap();
        let (c, p) = (shape(&scene, "C"), shape(&scene, "p"));
        assert!(matches!(
            scene.cross(c, p),
            Err(GeomError::OperandType { kind: "Conic", .. })
        ));
        assert!(scene.distance(p, c).is_err());
        assert!(matches!(
            Entity::try_from(c.clone()),
            Err(GeomError::OperandType { .. })
        ));
        assert!(matches!(
            scene.dot(p, p),
            Err(GeomError::ArgumentCombination { .. })
        ));
    }

    #[test]
    fn origin_changes_reach_every_member() {
        let mut scene = Scene::default();
        scene.point("p", &[1.0, 1.0]).unwrap();
        scene.line("l", &[1.0, -1.0, 1.0]).unwrap();
        scene.conic(&ConicParams::default().named("C")).unwrap();

        scene.set_origin(Origin::new(2.0, 2.0));
        match shape(&scene, "p") {
            Shape::Point(p) => assert_eq!(*p.coords(), vector![-1.0, -1.0, 1.0]),
            other => panic!("unexpected {}", other.kind()),
        }
        match shape(&scene, "l") {
            Shape::Line(l) => assert_eq!(*l.coeffs(), vector![1.0, -1.0, 1.0]),
            other => panic!("unexpected {}", other.kind()),
        }
        match shape(&scene, "C") {
            Shape::Conic(c) => {
                let on = Point::xy(1.0, 0.0, scene.cfg());
                assert!(c.contains(&on, scene.cfg().tol));
            }
            other => panic!("unexpected {}", other.kind()),
        }

        // shapes added later land in the same frame
        let q = scene.point("q", &[2.0, 2.0]).unwrap();
        match scene.get(q) {
            Some(Shape::Point(p)) => assert_eq!(*p.coords(), vector![0.0, 0.0, 1.0]),
            _ => panic!("missing q"),
        }

        let d = scene.distance(shape(&scene, "p"), shape(&scene, "q")).unwrap();
        assert!((d - 2f64.sqrt()).abs() < 1e-12);

        scene.reset_origin();
        match shape(&scene, "p") {
            Shape::Point(p) => assert_eq!(*p.coords(), vector![1.0, 1.0, 1.0]),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn scenes_keep_separate_contexts() {
        let mut a = Scene::default();
        let b = Scene::new(GeomCfg::default().with_origin(Origin::new(5.0, 0.0)));
        a.set_origin(Origin::new(-1.0, 0.0));
        assert_eq!(a.cfg().origin, Origin::new(-1.0, 0.0));
        assert_eq!(b.cfg().origin, Origin::new(5.0, 0.0));
    }
}
