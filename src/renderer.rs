//! # Chart Rendering Sinks
//!
//! Two [`RenderSink`] implementations:
//! - [`TextSink`]: character-cell chart for terminals, used by the CLI
//! - [`DrawTargetSink`]: draws labelled bar outlines and text onto any monochrome
//!   `embedded-graphics` [`DrawTarget`] (e-ink buffers, simulators, mock displays)
//!
//! Both keep what they placed so a later run can remove its own bars by name
//! and overwrite the caption and summary in place.

use crate::chart::RenderSink;
use crate::{BarDescriptor, Rectangle, Result, TideChartError};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle as PixelRect},
    text::{Baseline, Text},
};
use std::fmt::Debug;

const BAR_CELL: char = '█';

/// Terminal sink: one character cell per layout unit.
#[derive(Debug, Clone)]
pub struct TextSink {
    columns: u16,
    rows: u16,
    caption: String,
    summary: String,
    bars: Vec<BarDescriptor>,
}

impl TextSink {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            columns,
            rows,
            caption: String::new(),
            summary: String::new(),
            bars: Vec::new(),
        }
    }

    /// Caption, bar grid, a time row every sixth bar, then the summary.
    pub fn render(&self) -> String {
        let columns = usize::from(self.columns);
        let rows = usize::from(self.rows);
        let mut grid = vec![vec![' '; columns]; rows];

        for bar in &self.bars {
            let (x0, x1) = cell_span(bar.rectangle.left, bar.rectangle.right, columns);
            // Leave the last column of wide bars blank so neighbours stay distinct
            let x1 = if x1 - x0 >= 2 { x1 - 1 } else { x1 };
            let (y0, y1) = cell_span(bar.rectangle.top, bar.rectangle.bottom, rows);
            for row in grid.iter_mut().take(y1).skip(y0) {
                for cell in row.iter_mut().take(x1).skip(x0) {
                    *cell = BAR_CELL;
                }
            }
        }

        let mut time_row = vec![' '; columns];
        for bar in self.bars.iter().filter(|b| bar_index(&b.name) % 6 == 0) {
            let time = bar.label.lines().next().unwrap_or_default();
            let start = cell_span(bar.rectangle.left, bar.rectangle.right, columns).0;
            for (offset, ch) in time.chars().enumerate() {
                if let Some(cell) = time_row.get_mut(start + offset) {
                    *cell = ch;
                }
            }
        }

        let mut out = String::new();
        out.push_str(&self.caption);
        out.push('\n');
        for row in grid {
            out.push_str(row.into_iter().collect::<String>().trim_end());
            out.push('\n');
        }
        out.push_str(time_row.into_iter().collect::<String>().trim_end());
        out.push_str("\n\n");
        out.push_str(&self.summary.replace('\t', " "));
        out.push('\n');
        out
    }
}

impl RenderSink for TextSink {
    fn area_template(&self) -> Result<Rectangle> {
        Ok(Rectangle::new(
            0.0,
            0.0,
            f64::from(self.rows),
            f64::from(self.columns),
        ))
    }

    fn bar_names(&self) -> Vec<String> {
        self.bars.iter().map(|b| b.name.clone()).collect()
    }

    fn remove_element(&mut self, name: &str) -> Result<()> {
        self.bars.retain(|b| b.name != name);
        Ok(())
    }

    fn set_caption(&mut self, text: &str) -> Result<()> {
        self.caption = text.to_string();
        Ok(())
    }

    fn set_summary(&mut self, text: &str) -> Result<()> {
        self.summary = text.to_string();
        Ok(())
    }

    fn place_bars(&mut self, bars: &[BarDescriptor]) -> Result<()> {
        self.bars.extend_from_slice(bars);
        Ok(())
    }
}

/// Sink drawing onto a monochrome `embedded-graphics` target.
///
/// The caption is drawn just above the area template and the summary just
/// below it, so the configured area should leave room on both sides. Each bar
/// gets its label drawn inside the outline, clipped to the bar.
pub struct DrawTargetSink<D> {
    display: D,
    area: Rectangle,
    placed: Vec<BarDescriptor>,
    caption_box: Option<PixelRect>,
    summary_box: Option<PixelRect>,
}

impl<D> DrawTargetSink<D>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
{
    pub fn new(display: D, area: Rectangle) -> Self {
        Self {
            display,
            area,
            placed: Vec::new(),
            caption_box: None,
            summary_box: None,
        }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Blank the box of the text drawn before, draw `text` and return its box.
    fn replace_text(
        &mut self,
        previous: Option<PixelRect>,
        text: &str,
        origin: Point,
        baseline: Baseline,
    ) -> Result<PixelRect> {
        if let Some(stale) = previous {
            self.display
                .fill_solid(&stale, BinaryColor::Off)
                .map_err(render_error)?;
        }
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let text = text.replace('\t', " ");
        let drawable = Text::with_baseline(&text, origin, style, baseline);
        drawable.draw(&mut self.display).map_err(render_error)?;
        Ok(drawable.bounding_box())
    }
}

impl<D> RenderSink for DrawTargetSink<D>
where
    D: DrawTarget<Color = BinaryColor>,
    D::Error: Debug,
{
    fn area_template(&self) -> Result<Rectangle> {
        Ok(self.area)
    }

    fn bar_names(&self) -> Vec<String> {
        self.placed.iter().map(|b| b.name.clone()).collect()
    }

    fn remove_element(&mut self, name: &str) -> Result<()> {
        let Some(position) = self.placed.iter().position(|b| b.name == name) else {
            return Ok(());
        };
        let bar = self.placed.remove(position);
        self.display
            .fill_solid(&pixel_rect(&bar.rectangle), BinaryColor::Off)
            .map_err(render_error)
    }

    fn set_caption(&mut self, text: &str) -> Result<()> {
        let origin = Point::new(self.area.left.round() as i32, self.area.top.round() as i32);
        let previous = self.caption_box.take();
        self.caption_box = Some(self.replace_text(previous, text, origin, Baseline::Bottom)?);
        Ok(())
    }

    fn set_summary(&mut self, text: &str) -> Result<()> {
        let origin = Point::new(
            self.area.left.round() as i32,
            self.area.bottom.round() as i32 + 2,
        );
        let previous = self.summary_box.take();
        self.summary_box = Some(self.replace_text(previous, text, origin, Baseline::Top)?);
        Ok(())
    }

    fn place_bars(&mut self, bars: &[BarDescriptor]) -> Result<()> {
        let outline = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        let label_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        for bar in bars {
            let rect = pixel_rect(&bar.rectangle);
            rect.into_styled(outline)
                .draw(&mut self.display)
                .map_err(render_error)?;
            Text::with_baseline(
                &bar.label,
                rect.top_left + Point::new(1, 1),
                label_style,
                Baseline::Top,
            )
            .draw(&mut self.display.clipped(&rect))
            .map_err(render_error)?;
            self.placed.push(bar.clone());
        }
        Ok(())
    }
}

fn pixel_rect(rect: &Rectangle) -> PixelRect {
    let left = rect.left.round();
    let top = rect.top.round();
    let width = (rect.right.round() - left).max(0.0);
    let height = (rect.bottom.round() - top).max(0.0);
    PixelRect::new(
        Point::new(left as i32, top as i32),
        Size::new(width as u32, height as u32),
    )
}

fn render_error<E: Debug>(error: E) -> TideChartError {
    TideChartError::Render(format!("{error:?}"))
}

/// Round a continuous span to cell indices, clamped to `limit`.
fn cell_span(start: f64, end: f64, limit: usize) -> (usize, usize) {
    let clamp = |v: f64| (v.round().max(0.0) as usize).min(limit);
    (clamp(start), clamp(end))
}

fn bar_index(name: &str) -> usize {
    name.rsplit('-')
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(usize::MAX)
}
