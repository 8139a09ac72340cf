//! Ratatui-based chart window.
//!
//! Shows one fitted run: a header with the fit statistics and projection, the
//! chart (time view or fit view, toggled with `v`), and the fitted parameters.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
};

use crate::app::pipeline::RunOutput;
use crate::error::AppError;
use crate::plot::{ChartView, chart_series};

mod plotters_chart;

use plotters_chart::FactorPlottersChart;

/// Open the chart window for `run` and block until the user quits.
pub fn run(run: RunOutput) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(run);
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
    run: RunOutput,
    view: ChartView,
}

impl App {
    fn new(run: RunOutput) -> Self {
        Self {
            run,
            view: ChartView::Time,
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

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('v') | KeyCode::Tab => self.view = self.view.toggle(),
            _ => {}
        }
        false
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let summary = &self.run.fit.summary;
        let lines = vec![
            Line::from(vec![
                Span::styled("mf", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    " macro factor model | target: {} | n={} | k={}",
                    self.run.dataset.target.name, summary.n_obs, summary.n_factors
                )),
            ]),
            Line::from(Span::styled(
                format!(
                    "R²={:.4} | adj R²={:.4} | σ={:.3} | projected return={:.4}",
                    summary.r_squared, summary.adj_r_squared, summary.sigma, self.run.projected_return
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_params(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title(self.view.title()).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let series = chart_series(&self.run.rows, self.view, &self.run.dataset.target.name);
        let fmt_x = match self.view {
            ChartView::Time => fmt_axis_year,
            ChartView::Fit => fmt_axis_value,
        };
        let widget = FactorPlottersChart {
            line: &series.line,
            points: &series.points,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_label: &series.x_label,
            y_label: &series.y_label,
            fmt_x,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_params(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let params = &self.run.fit.params;
        let current = &self.run.dataset.current_factors;

        let mut items = vec![ListItem::new(format!("{:<10} {:>10.4}", "const", params.intercept))];
        for (name, b) in params.factor_names.iter().zip(&params.loadings) {
            let f = current.get(name).map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".to_string());
            items.push(ListItem::new(format!("{name:<10} {b:>10.4}  F={f}")));
        }
        items.push(ListItem::new(format!("{:<10} {:>10.4}", "ε(last)", params.last_residual)));

        let list = List::new(items).block(Block::default().title("Loadings").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let legend = match self.view {
            ChartView::Time => "cyan: observed  red: fitted",
            ChartView::Fit => "cyan: years  red: 45° line",
        };
        let line = Line::from(vec![
            Span::styled("v toggle view  q quit", Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(legend, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fmt_axis_year(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}
