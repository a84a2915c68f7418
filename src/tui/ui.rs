//! Screen layout for the debugger.
//!
//! ```text
//! +-------------------- machine --------------------+
//! | A=.. C=.. I=..  steps  state                    |
//! +------- code -------+-------- memory ------------+
//! |                    |                            |
//! +--------------------+----------------------------+
//! | status                               key hints  |
//! +-------------------------------------------------+
//! ```

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use crate::cpu::{CpuState, MEMORY_SIZE};
use super::app::{DebuggerApp, BYTES_PER_ROW};

const KEY_HINTS: &[(&str, &str)] = &[
    ("s", "step"),
    ("r", "run"),
    ("p", "pause"),
    ("b", "break"),
    ("x", "reset"),
    ("↑↓", "scroll"),
    ("q", "quit"),
];

pub fn draw(frame: &mut Frame, app: &DebuggerApp) {
    let [machine, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    // Memory rows are a fixed width; code takes what is left.
    let memory_width = (4 + 3 * BYTES_PER_ROW + 2) as u16;
    let [code, memory] = Layout::horizontal([
        Constraint::Min(20),
        Constraint::Length(memory_width),
    ])
    .areas(body);

    frame.render_widget(machine_line(app), machine);
    frame.render_widget(code_list(app, inner_rows(code)), code);
    frame.render_widget(memory_list(app, inner_rows(memory)), memory);
    frame.render_widget(footer_line(app), footer);
}

fn panel(title: &str, color: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::new().fg(color))
}

fn inner_rows(area: Rect) -> usize {
    area.height.saturating_sub(2) as usize
}

fn state_style(state: CpuState) -> Style {
    match state {
        CpuState::Running => Style::new().green(),
        CpuState::Halted => Style::new().blue(),
        CpuState::Trapped(_) => Style::new().red().bold(),
        CpuState::Stopped => Style::new().dark_gray(),
    }
}

fn machine_line(app: &DebuggerApp) -> Paragraph<'static> {
    let regs = &app.cpu.regs;
    let field = |name: &'static str, value: String| {
        [Span::raw(name), Span::styled(value, Style::new().bold()), Span::raw("  ")]
    };

    let mut spans = Vec::new();
    spans.extend(field("A=", format!("{:3} {:#04x}", regs.a, regs.a)));
    spans.extend(field("C=", format!("{:03}", regs.c)));
    spans.extend(field("I=", format!("{:#04x}", regs.i)));
    spans.extend(field("steps=", app.cpu.steps.to_string()));
    spans.push(Span::styled(format!("{:?}", app.cpu.state), state_style(app.cpu.state)));

    Paragraph::new(Line::from(spans)).block(panel("machine", Color::Green))
}

fn code_list(app: &DebuggerApp, rows: usize) -> List<'static> {
    let items: Vec<ListItem> = app
        .get_disassembly(rows)
        .into_iter()
        .map(|(addr, text, current)| {
            let marker = match (current, app.breakpoints.contains(&addr)) {
                (true, _) => ">",
                (false, true) => "*",
                (false, false) => " ",
            };
            let style = if current {
                Style::new().yellow().bold()
            } else if app.breakpoints.contains(&addr) {
                Style::new().red()
            } else {
                Style::new()
            };
            ListItem::new(format!("{} {:03}  {}", marker, addr, text)).style(style)
        })
        .collect();

    List::new(items).block(panel("code", Color::Cyan))
}

fn memory_row(app: &DebuggerApp, row: usize) -> Line<'static> {
    let base = row * BYTES_PER_ROW;
    let pc = app.cpu.program_counter() as usize;

    let cells = app.cpu.mem.dump(base, BYTES_PER_ROW).iter().enumerate().map(|(i, &byte)| {
        let style = match (base + i == pc, byte) {
            (true, _) => Style::new().black().on_yellow(),
            (false, 0) => Style::new().dark_gray(),
            (false, _) => Style::new(),
        };
        Span::styled(format!(" {:02x}", byte), style)
    });

    let mut spans = vec![Span::styled(format!("{:03}", base), Style::new().magenta())];
    spans.extend(cells);
    Line::from(spans)
}

fn memory_list(app: &DebuggerApp, rows: usize) -> List<'static> {
    let last = MEMORY_SIZE / BYTES_PER_ROW;
    let first = app.mem_scroll.min(last);
    let items: Vec<ListItem> = (first..last)
        .take(rows)
        .map(|row| ListItem::new(memory_row(app, row)))
        .collect();

    List::new(items).block(panel("memory", Color::Magenta))
}

fn footer_line(app: &DebuggerApp) -> Paragraph<'static> {
    let mut spans = vec![Span::raw(app.status.clone()), Span::raw("   ")];
    for (key, action) in KEY_HINTS {
        spans.push(Span::styled(*key, Style::new().bold()));
        spans.push(Span::styled(format!(" {}  ", action), Style::new().dark_gray()));
    }

    Paragraph::new(Line::from(spans)).block(panel("status", Color::White))
}
