//! Debugger application state and logic.

use crate::asm::disasm::disassemble_instruction;
use crate::cpu::{Cpu, EventLog, MEMORY_SIZE};
use std::collections::HashSet;

/// Bytes shown per memory row.
pub const BYTES_PER_ROW: usize = 8;

/// Debugger application state.
pub struct DebuggerApp {
    /// The CPU being debugged.
    pub cpu: Cpu<EventLog>,
    /// Original program for reference.
    pub program: Vec<u8>,
    /// Cells written after each load, as (address, value).
    pub seeds: Vec<(usize, u8)>,
    /// Breakpoints (by address).
    pub breakpoints: HashSet<u8>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
    /// Memory view scroll offset, in rows.
    pub mem_scroll: usize,
}

impl DebuggerApp {
    /// Create a new debugger with a loaded program.
    pub fn new(program: Vec<u8>, seeds: &[(usize, u8)]) -> Self {
        let mut app = Self {
            cpu: Cpu::with_observer(EventLog::new()),
            program,
            seeds: seeds.to_vec(),
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: String::new(),
            mem_scroll: 0,
        };
        app.reset();
        app.status = "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into();
        app
    }

    /// Step one instruction.
    pub fn step(&mut self) {
        if !self.cpu.is_running() {
            self.status = format!("CPU stopped: {:?}", self.cpu.state);
            self.running = false;
            return;
        }

        let pc = self.cpu.program_counter();
        if let Some(instr) = self.cpu.step() {
            self.status = format!("PC={:03}: {}", pc, instr);
        }

        if !self.cpu.is_running() {
            self.running = false;
            if let Some(event) = self.cpu.observer().last() {
                self.status = format!("PC={:03}: {}", pc, event);
            }
        }
    }

    /// Run until halt, breakpoint, or trap.
    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        if !self.cpu.is_running() {
            self.running = false;
            self.status = format!("Stopped after {} steps", self.cpu.steps);
            return;
        }

        self.step();

        // Check for breakpoint
        let pc = self.cpu.program_counter();
        if self.running && self.breakpoints.contains(&pc) {
            self.running = false;
            self.status = format!("Breakpoint at PC={}", pc);
        }
    }

    /// Toggle breakpoint at current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.cpu.program_counter();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={}", pc);
        }
    }

    /// Reload the program into a fresh CPU.
    pub fn reset(&mut self) {
        self.cpu = Cpu::with_observer(EventLog::new());
        self.cpu.load_program(&self.program);
        for &(addr, value) in &self.seeds {
            self.cpu.set_memory(addr, value);
        }
        self.cpu.reset();
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Scroll the memory view by `delta` rows.
    pub fn scroll_memory(&mut self, delta: isize) {
        let max = MEMORY_SIZE / BYTES_PER_ROW - 1;
        self.mem_scroll = self.mem_scroll.saturating_add_signed(delta).min(max);
    }

    /// Get disassembly around current PC as (address, text, is_current).
    ///
    /// Rows before PC follow instruction boundaries from address 0; rows
    /// from PC on are decoded starting at PC, so the current instruction is
    /// always listed even if a jump landed mid-instruction.
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u8, String, bool)> {
        let memory = self.cpu.mem.as_slice();
        let pc = self.cpu.program_counter() as usize;

        let mut before = Vec::new();
        let mut addr = 0;
        while addr < pc {
            let (text, size) = disassemble_instruction(memory, addr);
            before.push((addr as u8, text, false));
            addr += size.max(1);
        }

        let mut after = Vec::new();
        let mut addr = pc;
        while addr < MEMORY_SIZE && after.len() < lines {
            let (text, size) = disassemble_instruction(memory, addr);
            after.push((addr as u8, text, addr == pc));
            addr += size.max(1);
        }

        let keep_before = (lines / 2).min(before.len());
        let mut rows: Vec<_> = before.split_off(before.len() - keep_before);
        rows.extend(after);
        rows.truncate(lines);
        rows
    }
}

/// Run the debugger with a program.
pub fn run_debugger(program: Vec<u8>, seeds: &[(usize, u8)]) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(program, seeds);

    // Main loop
    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_memory(-1),
                        KeyCode::Down => app.scroll_memory(1),
                        _ => {}
                    }
                }
            }
        }

        // Tick for continuous running
        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> DebuggerApp {
        DebuggerApp::new(vec![0x01, 10, 0x03, 11, 0x02, 13, 0x00], &[(10, 5), (11, 3)])
    }

    #[test]
    fn test_step_updates_status() {
        let mut app = app();
        app.step();
        assert_eq!(app.status, "PC=000: LDA 10");
        assert_eq!(app.cpu.accumulator(), 5);
    }

    #[test]
    fn test_run_to_halt() {
        let mut app = app();
        app.run();
        while app.running {
            app.tick();
        }
        assert!(app.cpu.is_halted());
        assert_eq!(app.cpu.get_memory(13), 8);
        assert_eq!(app.status, "PC=006: Processor halted");
    }

    #[test]
    fn test_breakpoint_pauses() {
        let mut app = app();
        app.cpu.regs.c = 4;
        app.toggle_breakpoint();
        app.cpu.regs.c = 0;

        app.run();
        while app.running {
            app.tick();
        }

        assert_eq!(app.cpu.program_counter(), 4);
        assert!(app.cpu.is_running());
        assert_eq!(app.status, "Breakpoint at PC=4");
    }

    #[test]
    fn test_reset_restores_seeds() {
        let mut app = app();
        app.cpu.set_memory(10, 0);
        app.reset();
        assert_eq!(app.cpu.get_memory(10), 5);
        assert!(app.cpu.is_running());
    }

    #[test]
    fn test_disassembly_marks_pc() {
        let mut app = app();
        app.step();
        let rows = app.get_disassembly(4);
        assert_eq!(rows[0], (0, "LDA 10".to_string(), false));
        assert_eq!(rows[1], (2, "ADD 11".to_string(), true));
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut app = app();
        app.scroll_memory(-3);
        assert_eq!(app.mem_scroll, 0);
        app.scroll_memory(1000);
        assert_eq!(app.mem_scroll, MEMORY_SIZE / BYTES_PER_ROW - 1);
    }
}
