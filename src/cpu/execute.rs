//! CPU execution engine for the AL1.
//!
//! Implements the fetch-decode-execute cycle and all instruction behaviors.
//! All address and arithmetic updates wrap modulo 256.

use crate::cpu::{Memory, Registers};
use crate::cpu::decode::Instruction;
use crate::cpu::memory::MEMORY_SIZE;
use crate::cpu::observer::{ConsoleObserver, Event, Observer};
use crate::isa::{InstructionSet, Opcode, AL1};
use log::{debug, trace};
use serde::{Serialize, Deserialize};
use std::fmt;

/// Number of memory bytes shown in a state dump.
pub const DUMP_BYTES: usize = 16;

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// Freshly constructed; `reset` has not been called yet.
    Stopped,
    /// CPU is running normally.
    Running,
    /// CPU has halted (executed HLT instruction).
    Halted,
    /// CPU fetched a byte that is not an opcode.
    Trapped(u8),
}

/// The AL1 CPU.
///
/// `O` receives halt and trap notifications. The default prints them to
/// stdout.
#[derive(Clone)]
pub struct Cpu<O = ConsoleObserver> {
    /// CPU registers.
    pub regs: Registers,
    /// Main memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Instructions executed since the last reset.
    pub steps: u64,
    isa: &'static InstructionSet,
    observer: O,
    last_instr: Option<Instruction>,
}

impl Cpu {
    /// Create a new CPU with zeroed memory, reporting to stdout.
    pub fn new() -> Self {
        Self::with_observer(ConsoleObserver)
    }
}

impl<O: Observer> Cpu<O> {
    /// Create a new CPU using the standard instruction set.
    pub fn with_observer(observer: O) -> Self {
        Self::with_isa(&AL1, observer)
    }

    /// Create a new CPU decoding through `isa`.
    pub fn with_isa(isa: &'static InstructionSet, observer: O) -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Stopped,
            steps: 0,
            isa,
            observer,
            last_instr: None,
        }
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Reset registers and mark the CPU as running. Memory is kept.
    pub fn reset(&mut self) {
        debug!("reset");
        self.regs.reset();
        self.state = CpuState::Running;
        self.steps = 0;
        self.last_instr = None;
    }

    /// Copy a program into memory at address 0.
    ///
    /// Programs longer than memory are truncated. Returns the number of
    /// bytes copied.
    pub fn load_program(&mut self, program: &[u8]) -> usize {
        let copied = self.mem.load_program(program);
        if copied < program.len() {
            debug!("program truncated from {} to {} bytes", program.len(), copied);
        } else {
            debug!("loaded {} bytes", copied);
        }
        copied
    }

    /// Write one byte. Addresses past the end of memory are ignored.
    pub fn set_memory(&mut self, address: usize, value: u8) {
        self.mem.set(address, value);
    }

    /// Read one byte. Addresses past the end of memory read as 0.
    pub fn get_memory(&self, address: usize) -> u8 {
        self.mem.get(address)
    }

    /// Execute a single instruction.
    ///
    /// Does nothing unless the CPU is running. Returns the instruction that
    /// was executed, or `None` if nothing ran or the fetched byte was not an
    /// opcode.
    pub fn step(&mut self) -> Option<Instruction> {
        if !self.is_running() {
            return None;
        }

        // Fetch
        let pc = self.regs.c;
        let byte = self.fetch();
        self.regs.i = byte;

        // Decode
        let Some(opcode) = self.isa.decode(byte) else {
            self.state = CpuState::Trapped(byte);
            self.observer.notify(Event::UnknownInstruction(byte));
            return None;
        };

        // Execute
        let instr = self.execute(opcode);
        trace!("{:03}: {}  A={}", pc, instr, self.regs.a);

        self.steps += 1;
        self.last_instr = Some(instr);

        Some(instr)
    }

    /// Reset, then run until the CPU stops.
    ///
    /// There is no step limit; a program that never halts never returns.
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> u64 {
        self.reset();

        while self.is_running() {
            self.step();
        }

        self.steps
    }

    /// Run for at most `max_steps` instructions without resetting first.
    ///
    /// Returns the number of instructions executed by this call.
    pub fn run_limited(&mut self, max_steps: u64) -> u64 {
        self.run_traced(max_steps, |_, _, _| {})
    }

    /// Like [`Cpu::run_limited`], calling `on_step` after every executed
    /// instruction with the address it was fetched from.
    pub fn run_traced<F>(&mut self, max_steps: u64, mut on_step: F) -> u64
    where
        F: FnMut(u8, Instruction, &Self),
    {
        let start_steps = self.steps;
        let limit = self.steps.saturating_add(max_steps);

        while self.is_running() && self.steps < limit {
            let pc = self.regs.c;
            if let Some(instr) = self.step() {
                on_step(pc, instr, self);
            }
        }

        self.steps - start_steps
    }

    /// Read the byte at C and advance C.
    fn fetch(&mut self) -> u8 {
        let addr = self.regs.advance_pc();
        self.mem.read(addr)
    }

    /// Execute a decoded opcode, fetching its operand as needed.
    fn execute(&mut self, opcode: Opcode) -> Instruction {
        match opcode {
            Opcode::Hlt => {
                self.state = CpuState::Halted;
                self.observer.notify(Event::Halted);
                Instruction::Hlt
            }

            Opcode::Lda => {
                let addr = self.fetch();
                self.regs.a = self.mem.read(addr);
                Instruction::Lda(addr)
            }

            Opcode::Sta => {
                let addr = self.fetch();
                self.mem.write(addr, self.regs.a);
                Instruction::Sta(addr)
            }

            Opcode::Add => {
                let addr = self.fetch();
                self.regs.a = self.regs.a.wrapping_add(self.mem.read(addr));
                Instruction::Add(addr)
            }

            Opcode::Sub => {
                let addr = self.fetch();
                self.regs.a = self.regs.a.wrapping_sub(self.mem.read(addr));
                Instruction::Sub(addr)
            }

            // C already points past the opcode; the byte there is the target.
            // C is not advanced past it before the jump.
            Opcode::Jmp => {
                let target = self.mem.read(self.regs.c);
                self.regs.jump(target);
                Instruction::Jmp(target)
            }
        }
    }

    /// Get the last executed instruction.
    pub fn last_instruction(&self) -> Option<Instruction> {
        self.last_instr
    }

    /// Check if the CPU has halted via `HLT`.
    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// Check if the CPU is running.
    pub fn is_running(&self) -> bool {
        self.state == CpuState::Running
    }

    pub fn accumulator(&self) -> u8 {
        self.regs.a
    }

    pub fn program_counter(&self) -> u8 {
        self.regs.c
    }

    pub fn instruction_register(&self) -> u8 {
        self.regs.i
    }

    /// Final-state report: registers and the first 16 bytes of memory.
    ///
    /// Same text as the `Display` impl.
    pub fn dump(&self) -> String {
        self.to_string()
    }

    /// A serializable copy of the machine state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.regs.clone(),
            state: self.state,
            steps: self.steps,
            memory: self.mem.as_slice().to_vec(),
        }
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Display for Cpu<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "A: {} PC: {} IR: {}", self.regs.a, self.regs.c, self.regs.i)?;
        writeln!(f, "Memory dump (first {} bytes):", DUMP_BYTES)?;
        for (i, byte) in self.mem.dump(0, DUMP_BYTES).iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", byte)?;
        }
        Ok(())
    }
}

impl<O> fmt::Debug for Cpu<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("steps", &self.steps)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Machine state at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub registers: Registers,
    pub state: CpuState,
    pub steps: u64,
    pub memory: Vec<u8>,
}

impl Snapshot {
    /// Render as JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Restore this snapshot into a CPU.
    pub fn restore<O: Observer>(&self, cpu: &mut Cpu<O>) {
        cpu.regs = self.registers.clone();
        cpu.state = self.state;
        cpu.steps = self.steps;
        cpu.mem.clear();
        cpu.mem.load_program(&self.memory[..self.memory.len().min(MEMORY_SIZE)]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::decode::encode;
    use crate::cpu::observer::EventLog;

    fn make_program(instructions: &[Instruction]) -> Vec<u8> {
        instructions.iter().flat_map(encode).collect()
    }

    fn quiet_cpu() -> Cpu<EventLog> {
        Cpu::with_observer(EventLog::new())
    }

    #[test]
    fn test_cpu_starts_stopped() {
        let mut cpu = quiet_cpu();
        assert!(!cpu.is_running());
        assert_eq!(cpu.step(), None);
        assert_eq!(cpu.regs.c, 0);
    }

    #[test]
    fn test_cpu_halt() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&make_program(&[Instruction::Hlt]));

        let executed = cpu.run();

        assert_eq!(executed, 1);
        assert!(cpu.is_halted());
        assert_eq!(cpu.observer().events(), &[Event::Halted]);
    }

    #[test]
    fn test_reset_then_step_on_halt() {
        let mut cpu = quiet_cpu();
        cpu.reset();

        assert_eq!(cpu.step(), Some(Instruction::Hlt));

        assert!(!cpu.is_running());
        assert_eq!(cpu.accumulator(), 0);
        assert_eq!(cpu.program_counter(), 1);
        assert_eq!(cpu.instruction_register(), 0);
    }

    #[test]
    fn test_step_after_halt_is_noop() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x00, 0x01, 10]);
        cpu.run();

        assert_eq!(cpu.step(), None);
        assert_eq!(cpu.program_counter(), 1);
        assert_eq!(cpu.observer().events().len(), 1);
    }

    #[test]
    fn test_reset_keeps_memory() {
        let mut cpu = quiet_cpu();
        cpu.set_memory(20, 7);
        cpu.regs.a = 3;
        cpu.reset();

        assert_eq!(cpu.get_memory(20), 7);
        assert_eq!(cpu.accumulator(), 0);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_cpu_load_store() {
        let mut cpu = quiet_cpu();
        cpu.set_memory(10, 42);

        let program = make_program(&[
            Instruction::Lda(10),
            Instruction::Sta(20),
            Instruction::Hlt,
        ]);
        cpu.load_program(&program);
        cpu.run();

        assert_eq!(cpu.accumulator(), 42);
        assert_eq!(cpu.get_memory(20), 42);
    }

    #[test]
    fn test_add_wraps() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&make_program(&[Instruction::Add(10), Instruction::Hlt]));
        cpu.set_memory(10, 10);
        cpu.reset();
        cpu.regs.a = 250;

        cpu.step();

        assert_eq!(cpu.accumulator(), 4);
    }

    #[test]
    fn test_sub_wraps() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&make_program(&[Instruction::Sub(10), Instruction::Hlt]));
        cpu.set_memory(10, 5);
        cpu.reset();
        cpu.regs.a = 2;

        cpu.step();

        assert_eq!(cpu.accumulator(), 253);
    }

    #[test]
    fn test_end_to_end_addition() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0x03, 11, 0x02, 13, 0x00]);
        cpu.set_memory(10, 5);
        cpu.set_memory(11, 3);

        let executed = cpu.run();

        assert_eq!(executed, 4);
        assert_eq!(cpu.accumulator(), 8);
        assert_eq!(cpu.get_memory(13), 8);
        assert!(!cpu.is_running());
        assert_eq!(cpu.program_counter(), 7);
    }

    #[test]
    fn test_jmp_targets_byte_after_opcode() {
        // 0: JMP 6 ; 2: LDA 10 ; 4: HLT ; 6: LDA 11 ; 8: HLT
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x05, 6, 0x01, 10, 0x00, 0x00, 0x01, 11, 0x00]);
        cpu.set_memory(10, 1);
        cpu.set_memory(11, 2);

        cpu.reset();
        assert_eq!(cpu.step(), Some(Instruction::Jmp(6)));
        assert_eq!(cpu.program_counter(), 6);

        cpu.run_limited(10);
        assert_eq!(cpu.accumulator(), 2);
        assert!(cpu.is_halted());
    }

    #[test]
    fn test_unknown_opcode_traps() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0xAB, 0x00]);

        let executed = cpu.run();

        assert_eq!(executed, 1);
        assert_eq!(cpu.state, CpuState::Trapped(0xAB));
        assert!(!cpu.is_running());
        assert!(!cpu.is_halted());
        assert_eq!(cpu.instruction_register(), 0xAB);
        assert_eq!(cpu.program_counter(), 3);
        assert_eq!(cpu.observer().events(), &[Event::UnknownInstruction(0xAB)]);
    }

    #[test]
    fn test_pc_wraps_at_end_of_memory() {
        let mut cpu = quiet_cpu();
        cpu.set_memory(255, 0x01);
        cpu.set_memory(0, 0x00);
        cpu.reset();
        cpu.regs.c = 255;

        cpu.step();

        // Operand fetched from address 0, then C wraps to 1.
        assert_eq!(cpu.last_instruction(), Some(Instruction::Lda(0)));
        assert_eq!(cpu.program_counter(), 1);
    }

    #[test]
    fn test_run_limited_bounds_infinite_loop() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x05, 0x00]);
        cpu.reset();

        let executed = cpu.run_limited(100);

        assert_eq!(executed, 100);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_dump_format() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0x03, 11, 0x02, 13, 0x00]);
        cpu.set_memory(10, 5);
        cpu.set_memory(11, 3);
        cpu.run();

        assert_eq!(
            cpu.dump(),
            "A: 8 PC: 7 IR: 0\nMemory dump (first 16 bytes):\n1 10 3 11 2 13 0 0 0 0 5 3 0 8 0 0"
        );
    }

    #[test]
    fn test_display_matches_dump() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0x00]);
        cpu.set_memory(10, 9);
        cpu.run();

        assert_eq!(format!("{}", cpu), cpu.dump());
        assert!(cpu.to_string().starts_with("A: 9 PC: 3 IR: 0\n"));
    }

    #[test]
    fn test_run_traced_reports_each_step() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0x03, 11, 0x02, 13, 0x00]);
        cpu.set_memory(10, 5);
        cpu.set_memory(11, 3);
        cpu.reset();

        let mut seen = Vec::new();
        let executed = cpu.run_traced(u64::MAX, |pc, instr, cpu| {
            seen.push((pc, instr, cpu.accumulator()));
        });

        assert_eq!(executed, 4);
        assert_eq!(
            seen,
            vec![
                (0, Instruction::Lda(10), 5),
                (2, Instruction::Add(11), 8),
                (4, Instruction::Sta(13), 8),
                (6, Instruction::Hlt, 8),
            ]
        );
    }

    #[test]
    fn test_run_traced_respects_limit() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x05, 0x00]);
        cpu.reset();

        let mut calls = 0;
        let executed = cpu.run_traced(7, |_, _, _| calls += 1);

        assert_eq!(executed, 7);
        assert_eq!(calls, 7);
        assert!(cpu.is_running());
    }

    #[test]
    fn test_snapshot_json() {
        let mut cpu = quiet_cpu();
        cpu.load_program(&[0x01, 10, 0x00]);
        cpu.set_memory(10, 9);
        cpu.run();

        let json = cpu.snapshot().to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(restored, cpu.snapshot());

        let mut other = quiet_cpu();
        restored.restore(&mut other);
        assert_eq!(other.accumulator(), 9);
        assert!(other.is_halted());
        assert_eq!(other.get_memory(10), 9);
    }
}
