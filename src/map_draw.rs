use crate::binder::{RenderPoint, ViewBounds};
use ratatui::layout::Rect as TuiRect;
use ratatui::style::Color;
use ratatui::text::Line as TextLine;
use ratatui::widgets::canvas::{Canvas, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

/// Address points plotted inside the current view bounds
pub struct MapView<'a> {
    points: &'a [RenderPoint],
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl<'a> MapView<'a> {
    pub fn new(points: &'a [RenderPoint], bounds: ViewBounds) -> Self {
        Self {
            points,
            x_bounds: [bounds.min().x, bounds.max().x],
            y_bounds: [bounds.min().y, bounds.max().y],
        }
    }

    /// Points that fall inside the view, split into (others, highlighted).
    fn visible(&self, highlight: Option<&str>) -> (Vec<(f64, f64)>, Vec<&'a RenderPoint>) {
        let inside = |p: &RenderPoint| {
            (self.x_bounds[0]..=self.x_bounds[1]).contains(&p.x)
                && (self.y_bounds[0]..=self.y_bounds[1]).contains(&p.y)
        };
        let points: &'a [RenderPoint] = self.points;
        let mut others = Vec::new();
        let mut selected = Vec::new();
        for p in points.iter().filter(|p| inside(*p)) {
            if highlight == Some(p.label.as_str()) {
                selected.push(p);
            } else {
                others.push((p.x, p.y));
            }
        }
        (others, selected)
    }

    /// Draws all addresses in blue, then the highlighted one in red with its label
    pub fn render(&self, f: &mut Frame, area: TuiRect, title: &str, highlight: Option<&str>) {
        let (others, selected) = self.visible(highlight);
        let canvas = Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                ctx.draw(&Points { coords: &others, color: Color::Blue });
                for p in &selected {
                    ctx.draw(&Points { coords: &[(p.x, p.y)], color: Color::Red });
                    ctx.print(p.x, p.y, TextLine::styled(format!(" {}", p.label), Color::Red));
                }
            });
        f.render_widget(canvas, area);
    }
}
