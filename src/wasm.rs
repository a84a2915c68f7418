//! WebAssembly bindings for the AL1 emulator.
//!
//! This module provides JavaScript-friendly wrappers around the core emulator.

use js_sys::Uint8Array;
use wasm_bindgen::prelude::*;
use crate::{Cpu, EventLog};
use crate::asm::assembler::assemble;
use crate::asm::disasm::disassemble_instruction;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WebAssembly-friendly CPU wrapper.
#[wasm_bindgen]
pub struct WasmCpu {
    cpu: Cpu<EventLog>,
    program: Vec<u8>,
}

#[wasm_bindgen]
impl WasmCpu {
    /// Create a new CPU instance.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            cpu: Cpu::with_observer(EventLog::new()),
            program: Vec::new(),
        }
    }

    /// Load a program from assembly source code. Returns its size in bytes.
    #[wasm_bindgen]
    pub fn load_asm(&mut self, source: &str) -> Result<usize, JsError> {
        let program = assemble(source)
            .map_err(|e| JsError::new(&format!("{}", e)))?;

        self.load_bytes(&program);
        Ok(program.len())
    }

    /// Load a raw byte program and reset.
    #[wasm_bindgen]
    pub fn load_bytes(&mut self, program: &[u8]) {
        self.program = program.to_vec();
        self.reset();
    }

    /// Step one instruction. Returns the disassembled instruction.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        if !self.cpu.is_running() {
            return Err(JsError::new("CPU is stopped"));
        }

        match self.cpu.step() {
            Some(instr) => Ok(instr.to_string()),
            None => Err(JsError::new(&self.last_event())),
        }
    }

    /// Run until stopped or max steps.
    #[wasm_bindgen]
    pub fn run(&mut self, max_steps: u32) -> u64 {
        self.cpu.run_limited(max_steps as u64);
        self.cpu.steps
    }

    /// Reload the program into a fresh CPU and reset it.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.cpu = Cpu::with_observer(EventLog::new());
        self.cpu.load_program(&self.program);
        self.cpu.reset();
    }

    /// Write one memory cell. Out-of-range addresses are ignored.
    #[wasm_bindgen]
    pub fn set_memory(&mut self, address: usize, value: u8) {
        self.cpu.set_memory(address, value);
    }

    /// Read one memory cell. Out-of-range addresses read as 0.
    #[wasm_bindgen]
    pub fn memory_at(&self, address: usize) -> u8 {
        self.cpu.get_memory(address)
    }

    /// Get all memory as a typed array.
    #[wasm_bindgen]
    pub fn memory_all(&self) -> Uint8Array {
        Uint8Array::from(self.cpu.mem.as_slice())
    }

    #[wasm_bindgen]
    pub fn is_running(&self) -> bool {
        self.cpu.is_running()
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    #[wasm_bindgen]
    pub fn steps(&self) -> u64 {
        self.cpu.steps
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u8 {
        self.cpu.program_counter()
    }

    #[wasm_bindgen]
    pub fn accumulator(&self) -> u8 {
        self.cpu.accumulator()
    }

    #[wasm_bindgen]
    pub fn instruction_register(&self) -> u8 {
        self.cpu.instruction_register()
    }

    /// Get state as string.
    #[wasm_bindgen]
    pub fn state(&self) -> String {
        format!("{:?}", self.cpu.state)
    }

    /// Most recent halt or trap message, or an empty string.
    #[wasm_bindgen]
    pub fn last_event(&self) -> String {
        self.cpu
            .observer()
            .last()
            .map(|event| event.to_string())
            .unwrap_or_default()
    }

    /// Get the machine state as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        self.cpu
            .snapshot()
            .to_json()
            .map_err(|e| JsError::new(&format!("{}", e)))
    }
}

impl Default for WasmCpu {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble source code to bytes.
#[wasm_bindgen]
pub fn wasm_assemble(source: &str) -> Result<Vec<u8>, JsError> {
    assemble(source).map_err(|e| JsError::new(&format!("{}", e)))
}

/// Disassemble the instruction at `addr` in `bytes`.
#[wasm_bindgen]
pub fn wasm_disassemble(bytes: &[u8], addr: usize) -> String {
    disassemble_instruction(bytes, addr).0
}
