//! Ratatui-based terminal dashboard.
//!
//! Layout: a header with the headline signal, four metric cards, a 2x2 grid of
//! charts and a side panel with alerts, commentary and pivot levels.
//! `←/→` switch the lookback and re-run the cycle, `r` refreshes, `q` quits.

use std::io;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::app::Sources;
use crate::app::pipeline::{self, CycleOutput};
use crate::config::DashboardConfig;
use crate::domain::{Field, Lookback, Series};
use crate::error::AppError;
use crate::report;

mod plotters_chart;

use plotters_chart::{ChartSeries, LineChart};

/// Rows shown on the dollar-index chart.
const DXY_ROWS: usize = 30;

/// Start the TUI.
pub fn run(config: DashboardConfig, lookback: Lookback, as_of: Option<NaiveDate>, sources: Sources) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, lookback, as_of, sources);
    terminal
        .draw(|f| app.draw(f))
        .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
    app.refresh();
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: DashboardConfig,
    lookback: Lookback,
    as_of: Option<NaiveDate>,
    sources: Sources,
    status: String,
    output: Option<CycleOutput>,
}

impl App {
    fn new(config: DashboardConfig, lookback: Lookback, as_of: Option<NaiveDate>, sources: Sources) -> Self {
        Self {
            config,
            lookback,
            as_of,
            sources,
            status: "Fetching data...".to_string(),
            output: None,
        }
    }

    /// Run a fresh cycle. A failed cycle keeps the previous output on screen.
    fn refresh(&mut self) {
        let today = self.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());
        match pipeline::run_cycle(
            &self.config,
            self.lookback,
            today,
            self.sources.market.as_ref(),
            self.sources.macro_source.as_ref(),
        ) {
            Ok(output) => {
                self.status = match output.fetch_failures.len() {
                    0 => format!("Updated {today} ({})", self.sources.label()),
                    n => format!("Updated {today} ({}), {n} series unavailable", self.sources.label()),
                };
                self.output = Some(output);
            }
            Err(err) => {
                tracing::error!(error = %err, "cycle failed");
                self.status = format!("Cycle failed: {err}");
            }
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100)).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => {
                self.lookback = self.lookback.prev();
                self.refresh();
            }
            KeyCode::Right => {
                self.lookback = self.lookback.next();
                self.refresh();
            }
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_cards(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut spans = vec![
            Span::styled("gd", Style::default().fg(Color::Yellow)),
            Span::raw(format!(" | lookback: {}", self.lookback.label())),
        ];
        if let Some(signal) = self.output.as_ref().and_then(|o| o.signal.as_ref()) {
            spans.push(Span::raw(format!(" | as-of: {} | ", signal.as_of)));
            spans.push(Span::styled(
                report::headline(signal),
                Style::default().fg(headline_color(signal)).add_modifier(Modifier::BOLD),
            ));
        }

        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_cards(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let Some((output, signal)) = self.output.as_ref().and_then(|o| o.signal.as_ref().map(|s| (o, s))) else {
            return;
        };
        let cards = report::build_cards(&output.table, signal, &self.config.thresholds);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
            .split(area);

        for (card, rect) in cards.iter().zip(cols.iter()) {
            let value = card.value.as_deref().unwrap_or("no data");
            let delta_style = if card.warn {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Gray)
            };
            let text = Line::from(vec![
                Span::styled(value.to_string(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(card.delta.clone().unwrap_or_default(), delta_style),
            ]);
            let p = Paragraph::new(text).block(Block::default().title(card.title).borders(Borders::ALL));
            frame.render_widget(p, *rect);
        }
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(48)])
            .split(area);

        let Some(output) = &self.output else {
            let msg = Paragraph::new("Waiting for data...").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, cols[0]);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(cols[0]);
        let top = halves(rows[0]);
        let bottom = halves(rows[1]);

        let table = &output.table;
        let dates = table.dates();
        let fmt_x: fn(f64) -> String = if self.lookback.days() >= 365 {
            plotters_chart::fmt_year_month
        } else {
            plotters_chart::fmt_month_day
        };

        // Gold vs moving average.
        let gold = xy(dates, &table.anchor_values().into_iter().map(Some).collect::<Vec<_>>());
        let ma = xy(dates, table.derived(Field::MovingAverage).unwrap_or_default());
        draw_chart(
            frame,
            top[0],
            "Gold vs Moving Average",
            &[
                ChartSeries { points: &ma, color: plotters_chart::GREY },
                ChartSeries { points: &gold, color: plotters_chart::GOLD },
            ],
            fmt_x,
            fmt_price,
        );

        // Real yield: Fisher estimate, with the published TIPS yield behind it when fetched.
        let fisher = table.has(Series::Nominal10y) && table.has(Series::Breakeven10y);
        if fisher || table.has(Series::Real10y) {
            let real = if fisher {
                xy(dates, table.derived(Field::RealYield).unwrap_or_default())
            } else {
                Vec::new()
            };
            let tips = xy(dates, table.column(Series::Real10y).unwrap_or_default());
            draw_chart(
                frame,
                top[1],
                "10Y Real Yield (%)",
                &[
                    ChartSeries { points: &tips, color: plotters_chart::GREY },
                    ChartSeries { points: &real, color: plotters_chart::CYAN },
                ],
                fmt_x,
                fmt_rate,
            );
        } else {
            draw_missing(frame, top[1], "10Y Real Yield (%)");
        }

        // Liquidity spread with the alert band.
        if table.has(Series::Sofr) && table.has(Series::FedFunds) {
            let spread = xy(dates, table.derived(Field::LiquiditySpread).unwrap_or_default());
            let band = self.config.thresholds.liquidity_alert;
            let (upper, lower) = match (spread.first(), spread.last()) {
                (Some(&(x0, _)), Some(&(x1, _))) => (vec![(x0, band), (x1, band)], vec![(x0, -band), (x1, -band)]),
                _ => (Vec::new(), Vec::new()),
            };
            draw_chart(
                frame,
                bottom[0],
                "Liquidity Spread SOFR-FF (%)",
                &[
                    ChartSeries { points: &upper, color: plotters_chart::ORANGE },
                    ChartSeries { points: &lower, color: plotters_chart::ORANGE },
                    ChartSeries { points: &spread, color: plotters_chart::RED },
                ],
                fmt_x,
                fmt_rate,
            );
        } else {
            draw_missing(frame, bottom[0], "Liquidity Spread SOFR-FF (%)");
        }

        // Dollar index, last rows only.
        match table.column(Series::Dxy) {
            Some(col) => {
                let start = dates.len().saturating_sub(DXY_ROWS);
                let dxy = xy(&dates[start..], &col[start..]);
                draw_chart(
                    frame,
                    bottom[1],
                    "Dollar Index (last 30)",
                    &[ChartSeries { points: &dxy, color: plotters_chart::GREY }],
                    plotters_chart::fmt_month_day,
                    fmt_price,
                );
            }
            None => draw_missing(frame, bottom[1], "Dollar Index (last 30)"),
        }

        self.draw_signal_panel(frame, cols[1], output);
    }

    fn draw_signal_panel(&self, frame: &mut ratatui::Frame<'_>, area: Rect, output: &CycleOutput) {
        let mut lines: Vec<Line> = Vec::new();

        if let Some(signal) = &output.signal {
            lines.push(Line::from(vec![
                Span::raw("Regime: "),
                Span::styled(report::regime_label(signal.regime), Style::default().add_modifier(Modifier::BOLD)),
            ]));
            if let Some(c) = signal.caution {
                lines.push(Line::from(Span::styled(
                    format!("Caution: {}", report::caution_label(c)),
                    Style::default().fg(Color::Red),
                )));
            }
            for alert in &signal.alerts {
                lines.push(Line::from(Span::styled(
                    format!("! {}", report::alert_label(*alert)),
                    Style::default().fg(Color::Yellow),
                )));
            }
            lines.push(Line::raw(""));
            for sentence in report::commentary(signal, &self.config.thresholds) {
                lines.push(Line::raw(format!("- {sentence}")));
            }
        }

        if let Some(p) = &output.pivots {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled(
                report::format::format_pivots(p).trim_end().to_string(),
                Style::default().fg(Color::Gray),
            )));
        }

        if !output.fetch_failures.is_empty() {
            lines.push(Line::raw(""));
            for f in &output.fetch_failures {
                lines.push(Line::from(Span::styled(
                    format!("unavailable: {} ({})", f.series.key(), f.symbol),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Signal").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ lookback  r refresh  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn headline_color(signal: &crate::domain::RegimeSignal) -> Color {
    use crate::domain::Regime;
    if signal.caution.is_some() {
        return Color::Red;
    }
    match signal.regime {
        Regime::MacroHeadwind | Regime::DivergenceAlert => Color::Red,
        Regime::StrongTailwind => Color::Green,
        Regime::Neutral => Color::White,
    }
}

fn halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

/// Pair dates with observed values, skipping gaps.
fn xy(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<(f64, f64)> {
    dates
        .iter()
        .zip(values)
        .filter_map(|(d, v)| v.filter(|v| v.is_finite()).map(|v| (plotters_chart::date_x(*d), v)))
        .collect()
}

fn draw_chart(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    series: &[ChartSeries<'_>],
    fmt_x: fn(f64) -> String,
    fmt_y: fn(f64) -> String,
) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let Some((x_bounds, y_bounds)) = plotters_chart::bounds(series) else {
        frame.render_widget(Paragraph::new("no data").style(Style::default().fg(Color::DarkGray)), inner);
        return;
    };

    let widget = LineChart {
        series,
        x_bounds,
        y_bounds,
        fmt_x,
        fmt_y,
    };
    frame.render_widget(widget, inner);
}

fn draw_missing(frame: &mut ratatui::Frame<'_>, area: Rect, title: &str) {
    let p = Paragraph::new("insufficient data")
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().title(title.to_string()).borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn fmt_price(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_rate(v: f64) -> String {
    format!("{v:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xy_skips_gaps() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let pts = xy(&[d(1), d(2), d(3)], &[Some(1.0), None, Some(f64::NAN)]);
        assert_eq!(pts, vec![(plotters_chart::date_x(d(1)), 1.0)]);
    }
}
