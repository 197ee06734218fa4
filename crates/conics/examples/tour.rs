//! Walk through points, lines and conics in one scene.
//!
//! Run with `RUST_LOG=debug` to see construction and factorization decisions.

use conics::prelude::*;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

fn main() -> conics::Result<()> {
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let mut scene = Scene::default();
    let cfg = scene.cfg();
    let p1 = Point::new(&[1.0, 1.0], cfg)?.with_name("p1");
    let p2 = Point::new(&[-1.0, -1.0], cfg)?.with_name("p2");
    let l1 = Line::new(&[1.0, -1.0, 1.0], cfg)?.with_name("l1");
    let l3 = Line::new(&[-1.0, -1.0, 1.0], cfg)?.with_name("l3");

    println!("{p1}\n{p2}\n{l1}\n{l3}");
    println!("p1 x p2 = {}", p1.join(&p2, cfg));
    println!("l1 x l3 = {}", l1.meet(&l3, cfg));
    println!("l1 x p1 = {}", l1.perpendicular_through(&p1, cfg));

    let ellipse = Conic::new(
        &ConicParams::with_foci(Point::xy(-3.0, 0.0, cfg), Point::xy(3.0, 0.0, cfg), 5.0)
            .named("E"),
        cfg,
    )?;
    println!("{ellipse}\narea = {:.6}", ellipse.area());

    let pair = Conic::from_lines(&l1, &l3, cfg)?.with_name("L");
    println!("{pair}");
    let pencil = ellipse.pencil(&pair, cfg)?.with_name("E+L");
    println!("{pencil}");

    let xs: Vec<f64> = (0..=120).map(|k| -6.0 + 0.1 * k as f64).collect();
    let curves = ellipse.sequence(&xs, None, &MarchingSquares, cfg);
    println!("E traced as {} polyline(s), {} vertices", curves.len(), curves[0].len());

    scene.add(p1);
    scene.add(ellipse);
    scene.set_origin(Origin::new(2.0, 2.0));
    for shape in scene.shapes() {
        match shape {
            Shape::Point(p) => println!("{p}"),
            Shape::Line(l) => println!("{l}"),
            Shape::Conic(c) => println!("{c}"),
        }
    }
    Ok(())
}
