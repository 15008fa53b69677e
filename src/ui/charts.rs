//! Central panel UI: rainfall, temperature and power charts.

use crate::journal::aggregate::{
    daily_temperatures, daily_values, days_in_month, monthly_temperature_averages, monthly_totals,
};
use crate::journal::{NumericSeries, WeatherRecord};
use crate::state::{AppState, ChartPeriod};
use chrono::{Datelike, NaiveDate};
use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Rect, RichText, ScrollArea, Sense, Stroke, StrokeKind,
    Vec2,
};

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const RAIN_COLOR: Color32 = Color32::from_rgb(84, 160, 230);
const MORNING_COLOR: Color32 = Color32::from_rgb(255, 159, 64);
const AFTERNOON_COLOR: Color32 = Color32::from_rgb(255, 99, 132);
const WATTS_COLOR: Color32 = Color32::from_rgb(240, 200, 60);

const CHART_HEIGHT: f32 = 180.0;

/// One line or bar series of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: &'static str,
    pub color: Color32,
    pub values: Vec<Option<f64>>,
}

/// Labels along the x axis plus the series drawn against them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartData {
    fn value_range(&self) -> Option<(f64, f64)> {
        let mut values = self.series.iter().flat_map(|s| s.values.iter().flatten());
        let first = *values.next()?;
        Some(values.fold((first, first), |(lo, hi), v| (lo.min(*v), hi.max(*v))))
    }
}

fn period_labels(period: ChartPeriod, today: NaiveDate) -> Vec<String> {
    match period {
        ChartPeriod::Month => (1..=days_in_month(today.year(), today.month()))
            .map(|day| day.to_string())
            .collect(),
        ChartPeriod::Year => MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
    }
}

/// Daily amounts for the current month, or monthly totals for the current year.
pub fn amount_chart(
    record: &WeatherRecord,
    series: NumericSeries,
    period: ChartPeriod,
    today: NaiveDate,
) -> ChartData {
    let values = match period {
        ChartPeriod::Month => daily_values(record, series, today.year(), today.month()),
        ChartPeriod::Year => monthly_totals(record, series, today.year())
            .iter()
            .map(|total| Some(*total))
            .collect(),
    };

    let (name, color) = match series {
        NumericSeries::Rainfall => ("Rainfall (mm)", RAIN_COLOR),
        NumericSeries::Watts => ("Power (W)", WATTS_COLOR),
    };

    ChartData {
        labels: period_labels(period, today),
        series: vec![ChartSeries {
            name,
            color,
            values,
        }],
    }
}

/// Daily readings for the current month, or monthly averages for the year.
pub fn temperature_chart(
    record: &WeatherRecord,
    period: ChartPeriod,
    today: NaiveDate,
) -> ChartData {
    let (morning, afternoon): (Vec<_>, Vec<_>) = match period {
        ChartPeriod::Month => daily_temperatures(record, today.year(), today.month())
            .into_iter()
            .map(|r| (r.morning, r.afternoon))
            .unzip(),
        ChartPeriod::Year => monthly_temperature_averages(record, today.year())
            .into_iter()
            .map(|a| (a.morning, a.afternoon))
            .unzip(),
    };

    ChartData {
        labels: period_labels(period, today),
        series: vec![
            ChartSeries {
                name: "Morning (°C)",
                color: MORNING_COLOR,
                values: morning,
            },
            ChartSeries {
                name: "Afternoon (°C)",
                color: AFTERNOON_COLOR,
                values: afternoon,
            },
        ],
    }
}

pub fn render_charts(ctx: &egui::Context, state: &mut AppState, record: &WeatherRecord) {
    let today = crate::state::today();

    egui::CentralPanel::default().show(ctx, |ui| {
        ScrollArea::vertical().show(ui, |ui| {
            period_header(ui, "Rainfall", "rain_period", &mut state.rainfall_period);
            let data = amount_chart(record, NumericSeries::Rainfall, state.rainfall_period, today);
            draw_bars(ui, &data);
            ui.add_space(12.0);

            period_header(ui, "Temperature", "temp_period", &mut state.temperature_period);
            let data = temperature_chart(record, state.temperature_period, today);
            draw_lines(ui, &data);
            ui.add_space(12.0);

            period_header(ui, "Power", "watts_period", &mut state.watts_period);
            let data = amount_chart(record, NumericSeries::Watts, state.watts_period, today);
            draw_bars(ui, &data);
        });
    });
}

fn period_header(ui: &mut egui::Ui, title: &str, id: &str, period: &mut ChartPeriod) {
    ui.horizontal(|ui| {
        ui.heading(title);
        ui.add_space(10.0);
        ui.push_id(id, |ui| {
            for option in ChartPeriod::all() {
                ui.selectable_value(period, *option, option.label());
            }
        });
    });
}

/// Allocates the plot area and draws the frame; returns the inner rect.
fn chart_frame(ui: &mut egui::Ui) -> (egui::Painter, Rect) {
    let width = ui.available_width();
    let (response, painter) = ui.allocate_painter(Vec2::new(width, CHART_HEIGHT), Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 2.0, Color32::from_rgb(30, 30, 40));
    painter.rect_stroke(
        rect,
        2.0,
        Stroke::new(1.0, Color32::from_rgb(60, 60, 80)),
        StrokeKind::Outside,
    );

    // Leave room for axis labels
    let inner = Rect::from_min_max(
        rect.min + Vec2::new(36.0, 8.0),
        rect.max - Vec2::new(8.0, 18.0),
    );
    (painter, inner)
}

fn draw_axes(painter: &egui::Painter, rect: Rect, labels: &[String], lo: f64, hi: f64) {
    let font = FontId::proportional(10.0);
    let color = Color32::GRAY;

    painter.text(
        Pos2::new(rect.left() - 4.0, rect.top()),
        Align2::RIGHT_TOP,
        format!("{:.0}", hi),
        font.clone(),
        color,
    );
    painter.text(
        Pos2::new(rect.left() - 4.0, rect.bottom()),
        Align2::RIGHT_BOTTOM,
        format!("{:.0}", lo),
        font.clone(),
        color,
    );

    // Thin out labels when there are many (days of a month)
    let step = if labels.len() > 12 { 5 } else { 1 };
    let slot = rect.width() / labels.len().max(1) as f32;
    for (i, label) in labels.iter().enumerate() {
        if i % step != 0 && i + 1 != labels.len() {
            continue;
        }
        let x = rect.left() + slot * (i as f32 + 0.5);
        painter.text(
            Pos2::new(x, rect.bottom() + 3.0),
            Align2::CENTER_TOP,
            label,
            font.clone(),
            color,
        );
    }
}

fn draw_legend(ui: &mut egui::Ui, data: &ChartData) {
    ui.horizontal(|ui| {
        for series in &data.series {
            ui.label(RichText::new("\u{25A0}").color(series.color));
            ui.label(RichText::new(series.name).small());
        }
    });
}

fn draw_bars(ui: &mut egui::Ui, data: &ChartData) {
    draw_legend(ui, data);
    let (painter, rect) = chart_frame(ui);

    let hi = data.value_range().map(|(_, hi)| hi).unwrap_or(0.0).max(1.0);
    draw_axes(&painter, rect, &data.labels, 0.0, hi);

    let slot = rect.width() / data.labels.len().max(1) as f32;
    for series in &data.series {
        for (i, value) in series.values.iter().copied().enumerate() {
            let Some(value) = value.filter(|v| *v > 0.0) else {
                continue;
            };
            let height = (value / hi) as f32 * rect.height();
            let left = rect.left() + slot * i as f32 + slot * 0.15;
            let bar = Rect::from_min_max(
                Pos2::new(left, rect.bottom() - height),
                Pos2::new(left + slot * 0.7, rect.bottom()),
            );
            painter.rect_filled(bar, 1.0, series.color);
        }
    }
}

fn draw_lines(ui: &mut egui::Ui, data: &ChartData) {
    draw_legend(ui, data);
    let (painter, rect) = chart_frame(ui);

    let Some((lo, hi)) = data.value_range() else {
        draw_axes(&painter, rect, &data.labels, 0.0, 0.0);
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "No readings",
            FontId::proportional(12.0),
            Color32::GRAY,
        );
        return;
    };
    let (lo, hi) = if hi - lo < 1.0 {
        (lo - 1.0, hi + 1.0)
    } else {
        (lo, hi)
    };
    draw_axes(&painter, rect, &data.labels, lo, hi);

    let slot = rect.width() / data.labels.len().max(1) as f32;
    let to_pos = |i: usize, v: f64| {
        Pos2::new(
            rect.left() + slot * (i as f32 + 0.5),
            rect.bottom() - ((v - lo) / (hi - lo)) as f32 * rect.height(),
        )
    };

    for series in &data.series {
        let stroke = Stroke::new(2.0, series.color);
        let mut previous: Option<Pos2> = None;
        for (i, value) in series.values.iter().enumerate() {
            // Missing readings break the line
            let Some(value) = value else {
                previous = None;
                continue;
            };
            let pos = to_pos(i, *value);
            if let Some(prev) = previous {
                painter.line_segment([prev, pos], stroke);
            }
            painter.circle_filled(pos, 2.5, series.color);
            previous = Some(pos);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::TemperatureReading;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_amount_chart_periods() {
        let mut record = WeatherRecord::new();
        record.rainfall.insert(date("2024-04-03"), 6.0);
        record.rainfall.insert(date("2024-04-20"), 2.0);
        let today = date("2024-04-21");

        let month = amount_chart(&record, NumericSeries::Rainfall, ChartPeriod::Month, today);
        assert_eq!(month.labels.len(), 30);
        assert_eq!(month.series[0].values[2], Some(6.0));
        assert_eq!(month.series[0].values[3], None);

        let year = amount_chart(&record, NumericSeries::Rainfall, ChartPeriod::Year, today);
        assert_eq!(year.labels[3], "Apr");
        assert_eq!(year.series[0].values[3], Some(8.0));
        assert_eq!(year.series[0].values[0], Some(0.0));
    }

    #[test]
    fn test_temperature_chart_year_keeps_gaps() {
        let mut record = WeatherRecord::new();
        record
            .temperature
            .insert(date("2024-01-10"), TemperatureReading::new(Some(2.0), None));
        let chart = temperature_chart(&record, ChartPeriod::Year, date("2024-06-01"));

        assert_eq!(chart.series[0].values[0], Some(2.0));
        assert_eq!(chart.series[1].values[0], None);
        assert_eq!(chart.series[0].values[1], None);
        assert_eq!(chart.value_range(), Some((2.0, 2.0)));
    }
}
