use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;
use std::ops::Range;
use std::sync::Once;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::build::{category_label, Cartesian, Chart, ChartBody, ChartKind, Sector, Slice};
use crate::color::Rgb;
use crate::error::{InsightError, Result};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Family every caption and label is drawn with.
const FONT: &str = "sans-serif";

static REGISTER_FONT: Once = Once::new();

/// Text goes through ab_glyph, which only knows fonts registered here.
fn ensure_font() {
    REGISTER_FONT.call_once(|| {
        let bytes = include_bytes!("../../assets/DejaVuSans.ttf");
        if plotters::style::register_font(FONT, FontStyle::Normal, bytes).is_err() {
            log::warn!("embedded chart font could not be parsed");
        }
    });
}

fn render_err(e: impl std::fmt::Display) -> InsightError {
    InsightError::Render(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Rasterise `chart` into a packed RGB8 buffer of `width * height * 3` bytes.
pub fn render_rgb(chart: &Chart, width: u32, height: u32) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(InsightError::validation(format!(
            "chart size {width}x{height} has no pixels"
        )));
    }
    ensure_font();
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;
        match &chart.body {
            ChartBody::Cartesian(c) => draw_cartesian(&root, chart.kind, &chart.title, c)?,
            ChartBody::Pie(slices) => draw_pie(&root, &chart.title, slices)?,
            ChartBody::Sunburst(sectors) => draw_sunburst(&root, &chart.title, sectors)?,
        }
        root.present().map_err(render_err)?;
    }
    Ok(buffer)
}

/// Rasterise `chart` and encode it as PNG.
pub fn render_png(chart: &Chart, width: u32, height: u32) -> Result<Vec<u8>> {
    let buffer = render_rgb(chart, width, height)?;
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| InsightError::Render("pixel buffer size mismatch".into()))?;
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(render_err)?;
    log::info!(
        "encoded {} as {width}x{height} PNG ({} bytes)",
        chart.file_name(),
        bytes.len()
    );
    Ok(bytes)
}

// ---------------------------------------------------------------------------
// Line / bar / scatter
// ---------------------------------------------------------------------------

fn padded(min: f64, max: f64) -> Range<f64> {
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    if (max - min).abs() < f64::EPSILON {
        return (min - 0.5)..(max + 0.5);
    }
    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}

/// Smallest gap between distinct x positions, for bar widths.
fn min_gap(xs: &mut Vec<f64>) -> f64 {
    xs.sort_by(f64::total_cmp);
    xs.dedup();
    let gap = xs
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);
    if gap.is_finite() {
        gap
    } else {
        1.0
    }
}

fn draw_cartesian(root: &Area<'_>, kind: ChartKind, title: &str, c: &Cartesian) -> Result<()> {
    let points = c.series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max, mut y_min, mut y_max) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if kind == ChartKind::Bar && y_min.is_finite() {
        y_min = y_min.min(0.0);
        y_max = y_max.max(0.0);
    }

    let category_range = |n: usize| -0.5..(n.max(1) as f64 - 0.5);
    let x_range = match &c.x_categories {
        Some(cats) => category_range(cats.len()),
        None => padded(x_min, x_max),
    };
    let y_range = match &c.y_categories {
        Some(cats) => category_range(cats.len()),
        None => padded(y_min, y_max),
    };

    let mut ctx = ChartBuilder::on(root)
        .caption(title, (FONT, 24).into_font())
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(render_err)?;

    let x_categories = c.x_categories.clone().unwrap_or_default();
    let y_categories = c.y_categories.clone().unwrap_or_default();
    let x_label = |v: &f64| category_label(&x_categories, *v);
    let y_label = |v: &f64| category_label(&y_categories, *v);
    let mut mesh = ctx.configure_mesh();
    mesh.x_desc(c.x_label.as_str()).y_desc(c.y_label.as_str());
    if c.x_categories.is_some() {
        mesh.x_labels(x_categories.len().max(1)).x_label_formatter(&x_label);
    }
    if c.y_categories.is_some() {
        mesh.y_labels(y_categories.len().max(1)).y_label_formatter(&y_label);
    }
    mesh.draw().map_err(render_err)?;

    let n_series = c.series.len().max(1) as f64;
    let mut xs: Vec<f64> = c
        .series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.0))
        .collect();
    let slot = min_gap(&mut xs) * 0.8;

    for (i, series) in c.series.iter().enumerate() {
        let color = rgb(series.color);
        match kind {
            ChartKind::Bar => {
                let width = slot / n_series;
                let offset = -slot / 2.0 + width * i as f64;
                ctx.draw_series(series.points.iter().map(|&(x, y)| {
                    Rectangle::new([(x + offset, 0.0), (x + offset + width, y)], color.filled())
                }))
                .map_err(render_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
            }
            ChartKind::Line => {
                ctx.draw_series(LineSeries::new(series.points.iter().copied(), color.stroke_width(2)))
                    .map_err(render_err)?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 15, y)], color));
                ctx.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&p| Circle::new(p, 3, color.filled())),
                )
                .map_err(render_err)?;
            }
            _ => {
                ctx.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&p| Circle::new(p, 4, color.filled())),
                )
                .map_err(render_err)?
                .label(series.name.as_str())
                .legend(move |(x, y)| Circle::new((x + 5, y), 4, color.filled()));
            }
        }
    }

    if c.series.len() > 1 {
        ctx.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Pie / sunburst (drawn in pixel space)
// ---------------------------------------------------------------------------

struct Disc {
    cx: f64,
    cy: f64,
    radius: f64,
}

fn disc(root: &Area<'_>, title: &str) -> Result<Disc> {
    let (w, h) = root.dim_in_pixel();
    root.draw(&Text::new(
        title.to_string(),
        (20, 10),
        (FONT, 24).into_font(),
    ))
    .map_err(render_err)?;
    Ok(Disc {
        cx: w as f64 / 2.0,
        cy: h as f64 / 2.0 + 15.0,
        radius: (w.min(h) as f64 / 2.0 - 40.0).max(10.0),
    })
}

impl Disc {
    fn at(&self, turn: f64, r: f64) -> (i32, i32) {
        let angle = turn * TAU - FRAC_PI_2;
        (
            (self.cx + r * angle.cos()).round() as i32,
            (self.cy + r * angle.sin()).round() as i32,
        )
    }

    /// Outline of an annular sector between two radii and two turn fractions.
    fn sector(&self, start: f64, end: f64, inner: f64, outer: f64) -> Vec<(i32, i32)> {
        let steps = (((end - start) * 180.0).ceil() as usize).max(2);
        let arc = |r: f64| -> Vec<(i32, i32)> {
            (0..=steps)
                .map(|i| self.at(start + (end - start) * i as f64 / steps as f64, r))
                .collect()
        };
        let mut outline = arc(outer);
        if inner > 0.0 {
            let mut back = arc(inner);
            back.reverse();
            outline.extend(back);
        } else {
            outline.push((self.cx.round() as i32, self.cy.round() as i32));
        }
        outline
    }

    fn fill(&self, root: &Area<'_>, outline: Vec<(i32, i32)>, color: Rgb) -> Result<()> {
        let mut closed = outline.clone();
        if let Some(first) = outline.first() {
            closed.push(*first);
        }
        root.draw(&Polygon::new(outline, rgb(color).filled()))
            .map_err(render_err)?;
        root.draw(&PathElement::new(closed, WHITE.stroke_width(1)))
            .map_err(render_err)?;
        Ok(())
    }

    fn label(&self, root: &Area<'_>, text: &str, turn: f64, r: f64) -> Result<()> {
        root.draw(&Text::new(
            text.to_string(),
            self.at(turn, r),
            (FONT, 14).into_font().color(&BLACK),
        ))
        .map_err(render_err)
    }
}

fn draw_pie(root: &Area<'_>, title: &str, slices: &[Slice]) -> Result<()> {
    let d = disc(root, title)?;
    let total: f64 = slices.iter().map(|s| s.value).sum();
    let mut start = 0.0;
    for slice in slices {
        let span = slice.value / total;
        d.fill(root, d.sector(start, start + span, 0.0, d.radius), slice.color)?;
        if span > 0.04 {
            let pct = format!("{} ({:.1}%)", slice.label, span * 100.0);
            d.label(root, &pct, start + span / 2.0, d.radius * 0.6)?;
        }
        start += span;
    }
    Ok(())
}

fn draw_sunburst(root: &Area<'_>, title: &str, sectors: &[Sector]) -> Result<()> {
    let d = disc(root, title)?;
    let depth = sectors.iter().map(|s| s.depth).max().unwrap_or(1) as f64;
    let ring = d.radius / depth;
    for sector in sectors {
        let inner = ring * (sector.depth as f64 - 1.0);
        let outer = ring * sector.depth as f64;
        d.fill(root, d.sector(sector.start, sector.end, inner, outer), sector.color)?;
        if sector.end - sector.start > 0.04 {
            let mid = (sector.start + sector.end) / 2.0;
            d.label(root, &sector.label, mid, (inner + outer) / 2.0)?;
        }
    }
    Ok(())
}
