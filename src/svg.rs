use crate::geometry::{Cell, Color, Mirror};
use crate::judge::{Solution, replay};
use crate::problem::Problem;
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Path, Rectangle, Text};

const CELL: f64 = 24.0;

fn fill(color: Color) -> &'static str {
    match color.code() {
        1 => "#4060ff",
        2 => "#f0d000",
        3 => "#40c040",
        4 => "#ff4040",
        5 => "#a040ff",
        6 => "#ff9020",
        7 => "#ffffff",
        _ => "#f8f8f8",
    }
}

/// Draws the board with `solution` applied. Lit cells are tinted with the
/// colors reaching them; an invalid solution is drawn without light.
pub fn render(problem: &Problem, solution: &Solution) -> String {
    let g = problem.geometry;
    let (cells, light) = match replay(problem, solution) {
        Ok(replay) => (replay.cells, replay.light),
        Err(_) => (problem.cells.clone(), vec![Color::EMPTY; problem.cells.len()]),
    };
    let width = g.width as f64 * CELL;
    let height = g.height as f64 * CELL;
    let mut document = Document::new()
        .set("width", width + 20.0)
        .set("height", height + 20.0)
        .set("viewBox", (-10.0, -10.0, width + 20.0, height + 20.0));

    for (i, (&cell, &lit)) in cells.iter().zip(&light).enumerate() {
        let pos = g.pos(i);
        let (x, y) = (pos.x as f64 * CELL, pos.y as f64 * CELL);
        let rect = Rectangle::new()
            .set("x", x)
            .set("y", y)
            .set("width", CELL)
            .set("height", CELL)
            .set("fill", fill(lit))
            .set("fill-opacity", if lit.is_empty() { 1.0 } else { 0.35 })
            .set("stroke", "#c0c0c0")
            .set("stroke-width", 1)
            .set("title", format!("({}, {})", pos.y, pos.x));
        document = document.add(rect);

        let (cx, cy) = (x + CELL / 2.0, y + CELL / 2.0);
        match cell {
            Cell::Empty => {}
            Cell::Obstacle => {
                let block = Rectangle::new()
                    .set("x", x + 2.0)
                    .set("y", y + 2.0)
                    .set("width", CELL - 4.0)
                    .set("height", CELL - 4.0)
                    .set("fill", "#404040");
                document = document.add(block);
            }
            Cell::Crystal(color) => {
                let data = Data::new()
                    .move_to((cx, y + 2.0))
                    .line_to((x + CELL - 2.0, cy))
                    .line_to((cx, y + CELL - 2.0))
                    .line_to((x + 2.0, cy))
                    .close();
                let diamond = Path::new()
                    .set("d", data)
                    .set("fill", fill(color))
                    .set("stroke", "black")
                    .set("stroke-width", 1);
                document = document.add(diamond);
            }
            Cell::Lantern(color) => {
                let circle = Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", CELL * 0.35)
                    .set("fill", fill(color))
                    .set("stroke", "black")
                    .set("stroke-width", if lit.is_empty() { 1 } else { 3 });
                document = document.add(circle);
            }
            Cell::Mirror(mirror) => {
                let data = match mirror {
                    Mirror::Slash => Data::new().move_to((x + 2.0, y + CELL - 2.0)).line_to((x + CELL - 2.0, y + 2.0)),
                    Mirror::Backslash => Data::new().move_to((x + 2.0, y + 2.0)).line_to((x + CELL - 2.0, y + CELL - 2.0)),
                };
                let line = Path::new().set("d", data).set("stroke", "black").set("stroke-width", 3);
                document = document.add(line);
            }
        }
    }

    if let Ok(eval) = crate::judge::evaluate(problem, solution) {
        let text = Text::new(format!("score {}", eval.score))
            .set("x", 0.0)
            .set("y", -2.0)
            .set("font-size", "8px");
        document = document.add(text);
    }

    document.to_string()
}
