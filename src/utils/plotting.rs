use crate::error::{OptionsError, Result};
use crate::models::PayoffCurve;
use chrono::NaiveDate;
use image::ImageFormat;
use plotters::backend::BitMapBackend;
use plotters::prelude::*;
use std::path::Path;

const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 700;
const GOLD: RGBColor = RGBColor(212, 175, 55);
const GREY: RGBColor = RGBColor(128, 128, 128);

/// Rendered chart as tightly packed RGB8 pixels
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub fn payoff_chart_title(ticker: &str, strike: f64, expiry: NaiveDate) -> String {
    format!(
        "P/L Chart for {} ${} Call Expiring {}",
        ticker,
        strike,
        expiry.format("%Y-%m-%d")
    )
}

/// Write the P/L chart of `curve` as a PNG
pub fn plot_payoff_chart<P: AsRef<Path>>(
    curve: &PayoffCurve,
    breakeven: f64,
    title: &str,
    output_path: P,
) -> Result<()> {
    let output_path = output_path.as_ref();

    let img = plot_payoff_chart_in_memory(curve, breakeven, title)?;
    image::save_buffer_with_format(
        output_path,
        &img.pixels,
        img.width,
        img.height,
        image::ColorType::Rgb8,
        ImageFormat::Png,
    )?;

    Ok(())
}

/// Y bounds padded by 10%, widened around flat curves so the axis is never empty
fn padded_profit_range(min: f64, max: f64) -> (f64, f64) {
    let range = max - min;
    if range > 0.0 {
        (min - 0.1 * range, max + 0.1 * range)
    } else {
        let pad = (min.abs() * 0.1).max(1.0);
        (min - pad, max + pad)
    }
}

pub fn plot_payoff_chart_in_memory(
    curve: &PayoffCurve,
    breakeven: f64,
    title: &str,
) -> Result<ChartImage> {
    let (price_min, price_max) = curve.price_range().ok_or_else(|| {
        OptionsError::PlotError("No data points for payoff chart".to_string())
    })?;
    if price_max <= price_min {
        return Err(OptionsError::PlotError(format!(
            "Payoff chart needs an increasing price range, got {:.2}..{:.2}",
            price_min, price_max
        )));
    }
    let (profit_min, profit_max) = curve
        .profit_range()
        .ok_or_else(|| OptionsError::PlotError("No data points for payoff chart".to_string()))?;
    // keep the zero line in view
    let (y_min, y_max) = padded_profit_range(profit_min.min(0.0), profit_max.max(0.0));

    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT))
            .into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 28).into_font())
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(80)
            .build_cartesian_2d(price_min..price_max, y_min..y_max)
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        chart
            .configure_mesh()
            .x_desc("Stock Price")
            .y_desc("Profit / Loss ($)")
            .axis_desc_style(("sans-serif", 16))
            .draw()
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        chart
            .draw_series(
                AreaSeries::new(
                    curve.iter().map(|p| (p.underlying_price, p.profit_loss)),
                    0.0,
                    GOLD.mix(0.3),
                )
                .border_style(ShapeStyle::from(&GOLD).stroke_width(3)),
            )
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                vec![(price_min, 0.0), (price_max, 0.0)],
                &GREY,
            ))
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        if breakeven >= price_min && breakeven <= price_max {
            chart
                .draw_series(DashedLineSeries::new(
                    vec![(breakeven, y_min), (breakeven, y_max)],
                    8,
                    6,
                    ShapeStyle::from(&BLACK).stroke_width(1),
                ))
                .map_err(|e| OptionsError::PlotError(e.to_string()))?;

            chart
                .draw_series(std::iter::once(Text::new(
                    "Breakeven".to_string(),
                    (breakeven, y_max),
                    ("sans-serif", 15).into_font(),
                )))
                .map_err(|e| OptionsError::PlotError(e.to_string()))?;
        }

        root.draw_text(
            &format!(
                "Generated: {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            ),
            &TextStyle::from(("sans-serif", 13)).color(&BLACK),
            (10, CHART_HEIGHT as i32 - 20),
        )
        .map_err(|e| OptionsError::PlotError(e.to_string()))?;

        root.present()
            .map_err(|e| OptionsError::PlotError(e.to_string()))?;
    }

    Ok(ChartImage {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        pixels: buffer,
    })
}
