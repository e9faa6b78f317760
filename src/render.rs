use crate::error::Result;
use crate::geometry::{Polygon, Scenario, Vec2};
use crate::trajectory::TrajectoryData;

use image::gif::GifEncoder;
use image::{Delay, Frame, Rgba, RgbaImage};
use std::fs::File;
use std::path::Path;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const WALKABLE: Rgba<u8> = Rgba([245, 245, 245, 255]);
const OUTLINE: Rgba<u8> = Rgba([40, 40, 40, 255]);
const SPAWN: Rgba<u8> = Rgba([211, 211, 211, 255]);
const EXIT: Rgba<u8> = Rgba([205, 92, 92, 255]);
const AGENT: Rgba<u8> = Rgba([70, 130, 180, 255]);

#[derive(Debug, Clone, Copy)]
pub struct RenderConfig {
    /// Pixels per meter.
    pub scale: f64,
    /// World-space margin around the walkable area, in meters.
    pub margin: f64,
    /// Keep every n-th recorded frame when animating.
    pub every_nth_frame: usize,
    pub frame_delay_ms: u32,
    pub agent_radius: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            scale: 40.0,
            margin: 0.5,
            every_nth_frame: 5,
            frame_delay_ms: 50,
            agent_radius: 0.2,
        }
    }
}

/// A raster canvas over the scenario's world coordinates. The y axis is
/// flipped so world "up" renders up.
struct Canvas {
    image: RgbaImage,
    origin: Vec2,
    scale: f64,
    height_px: u32,
}

impl Canvas {
    fn new(scenario: &Scenario, config: &RenderConfig) -> Self {
        let (min, max) = scenario.walkable_area.bounding_box();
        let origin = Vec2::new(min.x - config.margin, min.y - config.margin);
        let width_px = ((max.x - min.x + 2.0 * config.margin) * config.scale).ceil() as u32;
        let height_px = ((max.y - min.y + 2.0 * config.margin) * config.scale).ceil() as u32;
        Canvas {
            image: RgbaImage::from_pixel(width_px, height_px, BACKGROUND),
            origin,
            scale: config.scale,
            height_px,
        }
    }

    fn world_at(&self, px: u32, py: u32) -> Vec2 {
        Vec2::new(
            self.origin.x + (px as f64 + 0.5) / self.scale,
            self.origin.y + (self.height_px - 1 - py) as f64 / self.scale,
        )
    }

    fn fill_polygon(&mut self, polygon: &Polygon, color: Rgba<u8>) {
        for py in 0..self.image.height() {
            for px in 0..self.image.width() {
                if polygon.contains(self.world_at(px, py)) {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }

    fn outline_polygon(&mut self, polygon: &Polygon, color: Rgba<u8>) {
        let line_width = 1.5 / self.scale;
        for py in 0..self.image.height() {
            for px in 0..self.image.width() {
                if polygon.distance_to_boundary(self.world_at(px, py)) < line_width {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f64, color: Rgba<u8>) {
        let min_px = (((center.x - radius - self.origin.x) * self.scale).floor()).max(0.0) as u32;
        let max_px = (((center.x + radius - self.origin.x) * self.scale).ceil())
            .min(self.image.width() as f64 - 1.0) as u32;
        let min_py = ((self.height_px as f64 - 1.0
            - (center.y + radius - self.origin.y) * self.scale)
            .floor())
        .max(0.0) as u32;
        let max_py = ((self.height_px as f64 - 1.0
            - (center.y - radius - self.origin.y) * self.scale)
            .ceil())
        .min(self.image.height() as f64 - 1.0) as u32;
        for py in min_py..=max_py {
            for px in min_px..=max_px {
                if self.world_at(px, py).distance(center) <= radius {
                    self.image.put_pixel(px, py, color);
                }
            }
        }
    }

    fn base_layout(scenario: &Scenario, config: &RenderConfig) -> Self {
        let mut canvas = Canvas::new(scenario, config);
        canvas.fill_polygon(&scenario.walkable_area, WALKABLE);
        canvas.fill_polygon(&scenario.spawn_area, SPAWN);
        canvas.fill_polygon(&scenario.exit_area, EXIT);
        canvas.outline_polygon(&scenario.walkable_area, OUTLINE);
        canvas
    }
}

/// Static figure of the initial configuration: walkable outline, spawn and
/// exit fills, and the starting positions.
pub fn render_layout<P: AsRef<Path>>(
    scenario: &Scenario,
    positions: &[Vec2],
    config: &RenderConfig,
    path: P,
) -> Result<()> {
    let mut canvas = Canvas::base_layout(scenario, config);
    for &position in positions {
        canvas.fill_circle(position, config.agent_radius, AGENT);
    }
    canvas.image.save(path)?;
    Ok(())
}

/// Animated GIF of a recorded run, decimated by `every_nth_frame`. Reads only
/// the persisted trajectory; never touches live simulation state.
pub fn animate<P: AsRef<Path>>(
    data: &TrajectoryData,
    scenario: &Scenario,
    config: &RenderConfig,
    path: P,
) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = GifEncoder::new(file);
    let stride = config.every_nth_frame.max(1) as u64;

    for (frame_no, rows) in data.by_frame() {
        if frame_no % stride != 0 {
            continue;
        }
        let mut canvas = Canvas::base_layout(scenario, config);
        for row in rows {
            canvas.fill_circle(Vec2::new(row.x, row.y), config.agent_radius, AGENT);
        }
        let delay = Delay::from_numer_denom_ms(config.frame_delay_ms, 1);
        encoder.encode_frame(Frame::from_parts(canvas.image, 0, 0, delay))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::{TrajectoryRow, TrajectoryWriter};

    #[test]
    fn test_layout_renders_scenario_regions() {
        let scenario = Scenario::corner();
        let config = RenderConfig::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.png");

        render_layout(&scenario, &[Vec2::new(1.0, 1.0)], &config, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        let canvas = Canvas::new(&scenario, &config);
        // Probe one pixel per region through the same transform.
        let probe = |x: f64, y: f64| {
            let px = ((x - canvas.origin.x) * canvas.scale) as u32;
            let py = canvas.height_px - 1 - ((y - canvas.origin.y) * canvas.scale) as u32;
            *img.get_pixel(px, py)
        };
        assert_eq!(probe(11.0, 11.5), EXIT);
        assert_eq!(probe(4.0, 1.0), SPAWN);
        assert_eq!(probe(11.0, 5.0), WALKABLE);
        assert_eq!(probe(1.0, 1.0), AGENT);
        // The notch of the L stays background.
        assert_eq!(probe(5.0, 8.0), BACKGROUND);
    }

    #[test]
    fn test_animation_produces_gif() {
        let scenario = Scenario::corner();
        let dir = tempfile::tempdir().unwrap();
        let trajectory_path = dir.path().join("run.jsonl");
        let gif_path = dir.path().join("run.gif");

        let mut writer = TrajectoryWriter::create(&trajectory_path).unwrap();
        for frame in 0..10 {
            writer
                .write_row(&TrajectoryRow {
                    frame,
                    id: 0,
                    x: 1.0 + frame as f64 * 0.1,
                    y: 1.0,
                })
                .unwrap();
        }
        writer.finish().unwrap();

        let data = TrajectoryData::read_file(&trajectory_path).unwrap();
        let config = RenderConfig {
            scale: 10.0,
            ..RenderConfig::default()
        };
        animate(&data, &scenario, &config, &gif_path).unwrap();

        let metadata = std::fs::metadata(&gif_path).unwrap();
        assert!(metadata.len() > 0);
    }
}
