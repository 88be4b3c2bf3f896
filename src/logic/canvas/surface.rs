//! Drawing Surface - freehand strokes rasterized into an RGBA canvas
//!
//! White round brush on a transparent black background. The stroke history
//! is kept so the toolbar actions (undo, clear) can re-rasterize.

use serde::{Deserialize, Serialize};

use super::raw::{RawCanvasImage, INK};
use crate::logic::config::PipelineConfig;

/// Ordered canvas points of one freehand stroke
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub points: Vec<(f32, f32)>,
}

impl Stroke {
    pub fn new(points: Vec<(f32, f32)>) -> Self {
        Self { points }
    }

    /// Straight line between two points
    pub fn line(from: (f32, f32), to: (f32, f32)) -> Self {
        Self::new(vec![from, to])
    }

    /// Single dot
    pub fn dot(at: (f32, f32)) -> Self {
        Self::new(vec![at])
    }
}

/// Toolbar / pen actions on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasAction {
    Stroke(Stroke),
    Undo,
    Clear,
}

#[derive(Debug, Clone)]
pub struct DrawingSurface {
    width: usize,
    height: usize,
    stroke_width: f32,
    background: Option<RawCanvasImage>,
    strokes: Vec<Stroke>,
    image: RawCanvasImage,
}

impl DrawingSurface {
    pub fn new(width: usize, height: usize, stroke_width: f32) -> Self {
        Self {
            width,
            height,
            stroke_width,
            background: None,
            strokes: Vec::new(),
            image: RawCanvasImage::new(width, height),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.canvas_size, config.canvas_size, config.stroke_width)
    }

    pub fn image(&self) -> &RawCanvasImage {
        &self.image
    }

    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }

    /// Nothing drawn and no image loaded
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty() && self.background.is_none()
    }

    /// Returns false for a stroke with no points
    pub fn draw(&mut self, stroke: Stroke) -> bool {
        if stroke.points.is_empty() {
            return false;
        }
        paint_stroke(&mut self.image, &stroke, self.stroke_width / 2.0);
        self.strokes.push(stroke);
        true
    }

    /// Remove the last stroke, false if there was none
    pub fn undo(&mut self) -> bool {
        if self.strokes.pop().is_none() {
            return false;
        }
        self.redraw();
        true
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.background = None;
        self.image = RawCanvasImage::new(self.width, self.height);
    }

    /// Replace the canvas with an existing drawing; strokes are dropped.
    /// Clearing goes back to a blank canvas of the original size.
    pub fn replace(&mut self, image: RawCanvasImage) {
        self.strokes.clear();
        self.image = image.clone();
        self.background = Some(image);
    }

    pub fn apply(&mut self, action: CanvasAction) -> bool {
        match action {
            CanvasAction::Stroke(stroke) => self.draw(stroke),
            CanvasAction::Undo => self.undo(),
            CanvasAction::Clear => {
                self.clear();
                true
            }
        }
    }

    fn redraw(&mut self) {
        self.image = match &self.background {
            Some(background) => background.clone(),
            None => RawCanvasImage::new(self.width, self.height),
        };
        let radius = self.stroke_width / 2.0;
        for stroke in &self.strokes {
            paint_stroke(&mut self.image, stroke, radius);
        }
    }
}

fn paint_stroke(image: &mut RawCanvasImage, stroke: &Stroke, radius: f32) {
    match stroke.points.as_slice() {
        [] => {}
        [only] => paint_segment(image, *only, *only, radius),
        points => {
            for pair in points.windows(2) {
                paint_segment(image, pair[0], pair[1], radius);
            }
        }
    }
}

/// Fill every pixel whose center lies within `radius` of the segment
fn paint_segment(image: &mut RawCanvasImage, a: (f32, f32), b: (f32, f32), radius: f32) {
    let (width, height) = (image.width() as f32, image.height() as f32);
    let min_x = (a.0.min(b.0) - radius).floor().max(0.0);
    let max_x = (a.0.max(b.0) + radius).ceil().min(width - 1.0);
    let min_y = (a.1.min(b.1) - radius).floor().max(0.0);
    let max_y = (a.1.max(b.1) + radius).ceil().min(height - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    let radius_sq = radius * radius;
    for y in min_y as usize..=max_y as usize {
        for x in min_x as usize..=max_x as usize {
            let center = (x as f32 + 0.5, y as f32 + 0.5);
            if distance_sq_to_segment(center, a, b) <= radius_sq {
                image.set_pixel(x, y, INK);
            }
        }
    }
}

fn distance_sq_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    (p.0 - cx).powi(2) + (p.1 - cy).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_paints_disc() {
        let mut surface = DrawingSurface::new(280, 280, 20.0);
        assert!(surface.is_empty());

        assert!(surface.draw(Stroke::dot((140.0, 140.0))));
        let image = surface.image();

        assert_eq!(image.pixel(140, 140), Some(INK));
        assert_eq!(image.pixel(148, 140), Some(INK));
        assert_eq!(image.pixel(152, 140), Some([0, 0, 0, 0]));
        assert_eq!(image.pixel(147, 147), Some([0, 0, 0, 0]));
        assert!(!surface.is_empty());
    }

    #[test]
    fn test_line_covers_path() {
        let mut surface = DrawingSurface::new(280, 280, 20.0);
        surface.draw(Stroke::line((20.0, 100.0), (260.0, 100.0)));

        for x in (20..260).step_by(10) {
            assert_eq!(surface.image().pixel(x, 100), Some(INK), "x = {}", x);
        }
        assert_eq!(surface.image().pixel(140, 130), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_empty_stroke_ignored() {
        let mut surface = DrawingSurface::new(28, 28, 4.0);
        assert!(!surface.draw(Stroke::new(vec![])));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_stroke_off_canvas_is_clipped() {
        let mut surface = DrawingSurface::new(28, 28, 4.0);
        surface.draw(Stroke::dot((-100.0, -100.0)));
        assert!(surface.image().is_blank());

        surface.draw(Stroke::dot((0.0, 0.0)));
        assert_eq!(surface.image().pixel(0, 0), Some(INK));
    }

    #[test]
    fn test_undo_and_clear() {
        let mut surface = DrawingSurface::new(100, 100, 10.0);
        surface.draw(Stroke::dot((20.0, 20.0)));
        surface.draw(Stroke::dot((80.0, 80.0)));
        assert_eq!(surface.stroke_count(), 2);

        assert!(surface.undo());
        assert_eq!(surface.image().pixel(20, 20), Some(INK));
        assert_eq!(surface.image().pixel(80, 80), Some([0, 0, 0, 0]));

        surface.clear();
        assert!(surface.is_empty());
        assert!(surface.image().is_blank());
        assert!(!surface.undo());
    }

    #[test]
    fn test_replace_keeps_background_on_undo() {
        let mut background = RawCanvasImage::new(56, 56);
        background.set_pixel(1, 1, INK);

        let mut surface = DrawingSurface::new(280, 280, 20.0);
        surface.replace(background.clone());
        assert!(!surface.is_empty());
        assert_eq!(surface.image().width(), 56);

        surface.draw(Stroke::dot((40.0, 40.0)));
        surface.undo();
        assert_eq!(surface.image(), &background);
    }

    #[test]
    fn test_action_json() {
        let actions: Vec<CanvasAction> = serde_json::from_str(
            r#"[{"type":"stroke","points":[[1.0,2.0],[3.0,4.0]]},{"type":"undo"},{"type":"clear"}]"#,
        )
        .unwrap();

        assert_eq!(
            actions,
            vec![
                CanvasAction::Stroke(Stroke::line((1.0, 2.0), (3.0, 4.0))),
                CanvasAction::Undo,
                CanvasAction::Clear,
            ]
        );
    }

    #[test]
    fn test_clear_after_replace_restores_canvas_size() {
        let mut surface = DrawingSurface::new(280, 280, 20.0);
        surface.replace(RawCanvasImage::filled(560, 560, INK));
        assert_eq!(surface.image().width(), 560);

        surface.clear();
        assert_eq!((surface.image().width(), surface.image().height()), (280, 280));
        assert!(surface.image().is_blank());

        surface.draw(Stroke::dot((10.0, 10.0)));
        surface.undo();
        assert_eq!((surface.image().width(), surface.image().height()), (280, 280));
    }

    #[test]
    fn test_stroke_action_roundtrips_flat_json() {
        let action = CanvasAction::Stroke(Stroke::dot((5.0, 6.0)));
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, serde_json::json!({"type": "stroke", "points": [[5.0, 6.0]]}));
    }
}
