//! Panels of the terminal interface

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table};
use ratatui::Frame;
use std::collections::VecDeque;

use super::{Phase, Progress};
use crate::loader::LoadStats;

const MAX_LOG_ENTRIES: usize = 200;

fn phase_symbol(phase: &Phase) -> &'static str {
    match phase {
        Phase::Checking => "◐",
        Phase::Scraping => "⌕",
        Phase::Downloading => "↓",
        Phase::Extracting => "⤷",
        Phase::Loading => "⚙",
        Phase::Complete => "✓",
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Blue))
}

/// Current phase plus one line of detail (release, table being loaded)
pub struct StatusPanel {
    phase: Phase,
    info: String,
}

impl StatusPanel {
    pub fn new() -> Self {
        Self {
            phase: Phase::Checking,
            info: String::new(),
        }
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = info.into();
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let color = if self.phase == Phase::Complete {
            Color::Green
        } else {
            Color::Cyan
        };
        let style = Style::default().fg(color).add_modifier(Modifier::BOLD);

        let lines = vec![
            Line::from(vec![
                Span::styled(format!(" {} ", phase_symbol(&self.phase)), style),
                Span::styled(self.phase.to_string(), style),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("   {}", self.info),
                Style::default().fg(Color::Gray),
            )),
        ];

        frame.render_widget(
            Paragraph::new(lines).block(panel(" UN/LOCODE to SQLite ")),
            area,
        );
    }
}

/// Gauge for the download or the rows of the current dataset
pub struct ProgressPanel {
    progress: Option<Progress>,
}

impl ProgressPanel {
    pub fn new() -> Self {
        Self { progress: None }
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = Some(progress);
    }

    pub fn clear(&mut self) {
        self.progress = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue));

        let Some(progress) = &self.progress else {
            frame.render_widget(block, area);
            return;
        };

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::default().fg(Color::Cyan).bg(Color::DarkGray))
            .ratio(progress.ratio().min(1.0))
            .label(gauge_label(progress));
        frame.render_widget(gauge, area);
    }
}

fn gauge_label(progress: &Progress) -> String {
    if progress.total == 0 {
        return progress.label.clone();
    }
    format!(
        "{}: {}/{} ({:.0}%)",
        progress.label,
        progress.current,
        progress.total,
        progress.ratio() * 100.0
    )
}

/// Running row counters, one line per table in load order
pub struct StatsPanel {
    tables: Vec<(String, LoadStats)>,
}

impl StatsPanel {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn update(&mut self, table: &str, stats: &LoadStats) {
        match self.tables.iter_mut().find(|(name, _)| name == table) {
            Some((_, current)) => *current = *stats,
            None => self.tables.push((table.to_string(), *stats)),
        }
    }

    /// Rows needed to show every table, borders and header included
    pub fn height(&self) -> u16 {
        self.tables.len() as u16 + 3
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(["table", "read", "inserted", "existing", "rejected", "unresolved", "failed"])
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));

        let rows = self.tables.iter().map(|(name, stats)| {
            let failed = if stats.failed > 0 {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(name.as_str()),
                Cell::from(stats.read.to_string()),
                Cell::from(stats.inserted.to_string()).style(Style::default().fg(Color::Green)),
                Cell::from(stats.existing.to_string()),
                Cell::from(stats.rejected.to_string()).style(Style::default().fg(Color::Yellow)),
                Cell::from(stats.unresolved.to_string()),
                Cell::from(stats.failed.to_string()).style(failed),
            ])
        });

        let widths = [Constraint::Length(10)]
            .into_iter()
            .chain([Constraint::Length(11); 6]);
        let table = Table::new(rows, widths)
            .header(header)
            .block(panel(" Rows "));
        frame.render_widget(table, area);
    }
}

/// Most recent activity, newest entry highlighted
pub struct LogPanel {
    entries: VecDeque<String>,
}

impl LogPanel {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_ENTRIES),
        }
    }

    pub fn add(&mut self, message: impl Into<String>) {
        if self.entries.len() == MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(message.into());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = area.height.saturating_sub(2) as usize;
        let skip = self.entries.len().saturating_sub(visible);
        let newest = self.entries.len().saturating_sub(1);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .skip(skip)
            .map(|(i, entry)| {
                let color = if i == newest { Color::White } else { Color::DarkGray };
                ListItem::new(Span::styled(format!(" {}", entry), Style::default().fg(color)))
            })
            .collect();

        frame.render_widget(List::new(items).block(panel(" Activity ")), area);
    }
}
