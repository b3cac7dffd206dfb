use plotters::prelude::*;

use super::error::PlanError;
use super::types::SeriesPoint;

pub trait ChartRenderer: Send + Sync {
    fn mime_type(&self) -> &'static str;

    /// Empty series render an empty chart, not an error.
    fn render(&self, series: &[SeriesPoint]) -> Result<Vec<u8>, PlanError>;
}

/// Invested line, value line and the gain band between them, x-axis in years.
#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

const LIGHT_GREEN: RGBColor = RGBColor(144, 238, 144);

fn years(point: &SeriesPoint) -> f64 {
    f64::from(point.month_index) / 12.0
}

impl SvgChartRenderer {
    fn draw(
        &self,
        series: &[SeriesPoint],
        svg: &mut String,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let max_years = series.last().map(years).unwrap_or(0.0).max(1.0 / 12.0);
        let max_amount = series
            .iter()
            .map(|point| point.value.max(point.invested))
            .fold(0.0_f64, f64::max)
            .max(1.0);

        let root = SVGBackend::with_string(svg, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("SIP Growth Projection", ("sans-serif", 24).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(90)
            .build_cartesian_2d(0.0..max_years, 0.0..max_amount * 1.05)?;

        chart
            .configure_mesh()
            .x_desc("Years")
            .y_desc("Amount")
            .draw()?;

        if series.is_empty() {
            root.present()?;
            return Ok(());
        }

        let band: Vec<(f64, f64)> = series
            .iter()
            .map(|point| (years(point), point.invested))
            .chain(series.iter().rev().map(|point| (years(point), point.value)))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(
            band,
            LIGHT_GREEN.mix(0.5).filled(),
        )))?;

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|point| (years(point), point.invested)),
                BLUE.stroke_width(2),
            ))?
            .label("Invested Amount")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

        chart
            .draw_series(LineSeries::new(
                series.iter().map(|point| (years(point), point.value)),
                GREEN.stroke_width(2),
            ))?
            .label("SIP Value")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn render(&self, series: &[SeriesPoint]) -> Result<Vec<u8>, PlanError> {
        let mut svg = String::new();
        self.draw(series, &mut svg)
            .map_err(|err| PlanError::Chart(err.to_string()))?;
        Ok(svg.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::{ProjectionInputs, growth_series};

    fn render_to_string(renderer: SvgChartRenderer, series: &[SeriesPoint]) -> String {
        let bytes = renderer.render(series).expect("chart renders");
        String::from_utf8(bytes).expect("svg is utf-8")
    }

    #[test]
    fn renders_both_lines_and_gain_band() {
        let series = growth_series(&ProjectionInputs {
            monthly_amount: 1_000.0,
            horizon_years: 2,
            annual_rate: 12.0,
        })
        .expect("valid inputs");
        let svg = render_to_string(SvgChartRenderer::default(), &series);

        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("SIP Growth Projection"));
        assert!(svg.contains("Invested Amount"));
        assert!(svg.contains("SIP Value"));
        assert!(svg.contains("Years"));
        assert!(svg.contains("<polygon"));
        assert!(svg.matches("<polyline").count() >= 2);
    }

    #[test]
    fn empty_series_still_renders_axes() {
        let svg = render_to_string(SvgChartRenderer::default(), &[]);
        assert!(svg.contains("SIP Growth Projection"));
        assert!(svg.contains("Amount"));
        assert!(!svg.contains("<polygon"));
        assert!(!svg.contains("SIP Value"));
    }

    #[test]
    fn canvas_follows_configured_size() {
        let series = growth_series(&ProjectionInputs {
            monthly_amount: 50_000.0,
            horizon_years: 30,
            annual_rate: 15.0,
        })
        .expect("valid inputs");
        let renderer = SvgChartRenderer {
            width: 640,
            height: 480,
        };
        let svg = render_to_string(renderer, &series);

        assert!(svg.contains(r#"width="640""#));
        assert!(svg.contains(r#"height="480""#));
        assert_eq!(renderer.mime_type(), "image/svg+xml");
    }
}
