use core::convert::TryFrom;
use core::fmt;
use core::ops::Range;

use heapless::{consts::U16, Vec};
use log::{debug, trace, warn};
use nanorand::{rand::pcg64::Pcg64, RNG};

use crate::error::Error;
use crate::frame::{Frame, FrameView};
use crate::opcode::OpCode;
use crate::timer::{Timer, TimerState};

pub const MEMORY_SIZE: usize = 4096;
/// Address the program is loaded at and execution starts from
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const STACK_DEPTH: usize = 16;

const FONT_GLYPH_SIZE: u16 = 5;
pub(crate) const DEFAULT_SEED: u128 = 0x6b69_7769_38c0_ffee;

#[rustfmt::skip]
const FONTSET: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// CHIP-8 virtual machine state
///
/// One call to `cycle` executes exactly one instruction. Everything outside of
/// the instruction set (rendering, keypad polling, the 60 Hz timer clock) is left
/// to the caller, either directly or through a `Driver`.
#[derive(Clone)]
pub struct Kiwi8 {
    v: [u8; 16],
    i: u16,
    pc: u16,
    stack: Vec<u16, U16>,
    memory: [u8; MEMORY_SIZE],
    frame: Frame,
    delay_timer: Timer,
    sound_timer: Timer,
    keys: u16,
    awaiting_key: Option<u8>,
    clear_requested: bool,
    draw_requested: bool,
    rng: Pcg64,
}

impl fmt::Debug for Kiwi8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kiwi8")
            .field("v", &self.v)
            .field("i", &self.i)
            .field("pc", &self.pc)
            .field("stack", &self.stack)
            .field("delay_timer", &self.delay_timer.load())
            .field("sound_timer", &self.sound_timer.load())
            .field("keys", &self.keys)
            .field("awaiting_key", &self.awaiting_key)
            .field("clear_requested", &self.clear_requested)
            .field("draw_requested", &self.draw_requested)
            .finish()
    }
}

impl Kiwi8 {
    /// Create a machine with the fontset in place and no program
    pub fn new() -> Result<Self, Error> {
        Self::with_seed(DEFAULT_SEED)
    }

    /// Same as `new`, seeding the generator used by `CXKK`
    pub fn with_seed(seed: u128) -> Result<Self, Error> {
        let mut memory = [0u8; MEMORY_SIZE];
        memory
            .get_mut(..FONTSET.len())
            .ok_or(Error::InitError)?
            .copy_from_slice(&FONTSET);
        Ok(Self {
            v: [0; 16],
            i: 0,
            pc: PROGRAM_START,
            stack: Vec::new(),
            memory,
            frame: Frame::new(),
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            keys: 0,
            awaiting_key: None,
            clear_requested: false,
            draw_requested: false,
            rng: Pcg64::new_seed(seed),
        })
    }

    /// Load program from slice of bytes to memory from 0x200 (_start address)
    ///
    /// Registers are left as they are, so loading twice overwrites the program
    /// without resetting the machine.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), Error> {
        if program.len() > MAX_PROGRAM_SIZE {
            warn!("rejecting program of {} bytes", program.len());
            return Err(Error::ProgramTooLarge {
                size: program.len(),
            });
        }
        let start = usize::from(PROGRAM_START);
        self.memory[start..start + program.len()].copy_from_slice(program);
        debug!("loaded {} bytes at {:#05x}", program.len(), PROGRAM_START);
        Ok(())
    }

    /// Fetch, decode and execute a single instruction
    ///
    /// While the machine waits for a key (`FX0A`) no instruction is executed:
    /// the call yields `WouldBlock` until a key is down, then stores it and
    /// returns `Ok`. Failures leave the machine untouched.
    pub fn cycle(&mut self) -> nb::Result<(), Error> {
        if let Some(x) = self.awaiting_key {
            return self.capture_key(x);
        }

        let pc = self.pc;
        let opcode = self.fetch().and_then(OpCode::try_from).map_err(|err| {
            warn!("{:#05x}: {}", pc, err);
            err
        })?;
        trace!("{:#05x}: {:?}", pc, opcode);

        self.execute(opcode).map_err(|err| {
            if let nb::Error::Other(ref err) = err {
                warn!("{:#05x}: {:?} failed, {}", pc, opcode, err);
            }
            err
        })
    }

    fn fetch(&self) -> Result<u16, Error> {
        let pc = usize::from(self.pc);
        match self.memory.get(pc..pc + 2) {
            Some(&[hi, lo]) => Ok(u16::from_be_bytes([hi, lo])),
            _ => Err(Error::OutOfBounds(self.pc)),
        }
    }

    #[inline]
    fn pc_increment(&mut self) {
        self.pc = self.pc.wrapping_add(2);
    }

    /// Range of `len` bytes of memory starting at I
    fn memory_at_i(&self, len: usize) -> Result<Range<usize>, Error> {
        let start = usize::from(self.i);
        if start + len <= MEMORY_SIZE {
            Ok(start..start + len)
        } else {
            Err(Error::OutOfBounds(self.i))
        }
    }

    fn lowest_key_down(&self) -> Option<u8> {
        if self.keys == 0 {
            None
        } else {
            Some(self.keys.trailing_zeros() as u8)
        }
    }

    fn capture_key(&mut self, x: u8) -> nb::Result<(), Error> {
        let key = self.lowest_key_down().ok_or(nb::Error::WouldBlock)?;
        debug!("captured key {:X} into V{:X}", key, x);
        self.v[x as usize] = key;
        self.awaiting_key = None;
        Ok(())
    }
}

// Keypad
impl Kiwi8 {
    /// Mark key as held, keys above 0xF are ignored
    pub fn press_key(&mut self, key: u8) {
        if key < 16 {
            self.keys |= 1 << key;
        } else {
            warn!("ignoring press of nonexistent key {:#x}", key);
        }
    }

    pub fn release_key(&mut self, key: u8) {
        if key < 16 {
            self.keys &= !(1 << key);
        }
    }

    /// Replace the whole keypad state, bit k set iff key k is held
    pub fn set_key_mask(&mut self, mask: u16) {
        self.keys = mask;
    }

    pub fn key_mask(&self) -> u16 {
        self.keys
    }

    pub fn is_key_down(&self, key: u8) -> bool {
        key < 16 && self.keys & (1 << key) != 0
    }
}

// Timers
impl Kiwi8 {
    pub fn delay_timer(&self) -> u8 {
        self.delay_timer.load()
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer.load()
    }

    pub fn decrement_delay_timer(&mut self) -> TimerState {
        self.delay_timer.decrement()
    }

    pub fn decrement_sound_timer(&mut self) -> TimerState {
        self.sound_timer.decrement()
    }

    /// Decrement both timers by a single 60 Hz tick
    pub fn tick_timers(&mut self) {
        self.decrement_delay_timer();
        if self.decrement_sound_timer() == TimerState::Finished {
            debug!("sound timer finished");
        }
    }
}

// Inspection and presentation
impl Kiwi8 {
    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    /// V0 to VF
    pub fn registers(&self) -> &[u8; 16] {
        &self.v
    }

    /// Number of return addresses on the stack
    pub fn sp(&self) -> u8 {
        self.stack.len() as u8
    }

    pub fn stack(&self) -> &[u16] {
        &self.stack
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn frame(&self) -> FrameView<'_> {
        self.frame.view()
    }

    /// Register the machine stores the next key press into, if it waits for one
    pub fn awaiting_key(&self) -> Option<u8> {
        self.awaiting_key
    }

    pub fn clear_requested(&self) -> bool {
        self.clear_requested
    }

    pub fn draw_requested(&self) -> bool {
        self.draw_requested
    }

    pub fn ack_clear(&mut self) {
        self.clear_requested = false;
    }

    pub fn ack_draw(&mut self) {
        self.draw_requested = false;
    }

    /// Zero every cell of the framebuffer
    pub fn clear_frame(&mut self) {
        self.frame.clear();
    }
}

// OpCodes impls
impl Kiwi8 {
    #[rustfmt::skip]
    fn execute(&mut self, opcode: OpCode) -> nb::Result<(), Error> {
        match opcode {
            OpCode::_00E0             => self.clear_screen(),
            OpCode::_00EE             => return self.subroutine_return().map_err(nb::Error::Other),
            OpCode::_1NNN { nnn }     => return self.jump_to(nnn).map_err(nb::Error::Other),
            OpCode::_2NNN { nnn }     => return self.exec_subroutine_at(nnn).map_err(nb::Error::Other),
            OpCode::_3XKK { x, kk }   => self.skip_if_vx_eq_kk(x, kk),
            OpCode::_4XKK { x, kk }   => self.skip_if_vx_ne_kk(x, kk),
            OpCode::_5XY0 { x, y }    => self.skip_if_vx_eq_vy(x, y),
            OpCode::_6XKK { x, kk }   => self.assign_vx_kk(x, kk),
            OpCode::_7XKK { x, kk }   => self.assign_add_vx_kk(x, kk),
            OpCode::_8XY0 { x, y }    => self.assign_vx_vy(x, y),
            OpCode::_8XY1 { x, y }    => self.assign_or_vx_vy(x, y),
            OpCode::_8XY2 { x, y }    => self.assign_and_vx_vy(x, y),
            OpCode::_8XY3 { x, y }    => self.assign_xor_vx_vy(x, y),
            OpCode::_8XY4 { x, y }    => self.assign_add_vx_vy(x, y),
            OpCode::_8XY5 { x, y }    => self.assign_sub_vx_vy(x, y),
            OpCode::_8XY6 { x, .. }   => self.assign_vx_shifted_r(x),
            OpCode::_8XY7 { x, y }    => self.assign_vx_vy_sub_vx(x, y),
            OpCode::_8XYE { x, .. }   => self.assign_vx_shifted_l(x),
            OpCode::_9XY0 { x, y }    => self.skip_if_vx_ne_vy(x, y),
            OpCode::_ANNN { nnn }     => self.assign_i_nnn(nnn),
            OpCode::_BNNN { nnn }     => return self.jump_to_nnn_add_v0(nnn).map_err(nb::Error::Other),
            OpCode::_CXKK { x, kk }   => self.assign_vx_random_and_kk(x, kk),
            OpCode::_DXYN { x, y, n } => self.draw_n_at_vx_vy(x, y, n),
            OpCode::_EX9E { x }       => self.skip_if_vx_in_keys(x),
            OpCode::_EXA1 { x }       => self.skip_if_vx_not_in_keys(x),
            OpCode::_FX07 { x }       => self.assign_vx_delay_t(x),
            OpCode::_FX0A { x }       => return self.assign_vx_wait_for_key(x),
            OpCode::_FX15 { x }       => self.assign_delay_t_vx(x),
            OpCode::_FX18 { x }       => self.assign_sound_t_vx(x),
            OpCode::_FX1E { x }       => self.assign_add_i_vx(x),
            OpCode::_FX29 { x }       => self.assign_i_addr_of_sprite_vx(x),
            OpCode::_FX33 { x }       => self.assign_mem_at_i_bcd_of_vx(x),
            OpCode::_FX55 { x }       => self.assign_mem_at_i_v0_to_vx(x),
            OpCode::_FX65 { x }       => self.assign_v0_to_vx_mem_at_i(x),
        }
        .map(|()| self.pc_increment())
        .map_err(nb::Error::Other)
    }

    /// Clear the screen
    /// 00E0,
    fn clear_screen(&mut self) -> Result<(), Error> {
        self.clear_requested = true;
        Ok(())
    }

    /// Return from a subroutine
    /// 00EE,
    fn subroutine_return(&mut self) -> Result<(), Error> {
        let call_site = self.stack.pop().ok_or(Error::StackUnderflow)?;
        self.pc = call_site.wrapping_add(2);
        Ok(())
    }

    /// Jump to address NNN
    /// 1NNN { nnn: u16 },
    fn jump_to(&mut self, nnn: u16) -> Result<(), Error> {
        self.pc = nnn;
        Ok(())
    }

    /// Execute subroutine starting at address NNN
    /// 2NNN { nnn: u16 },
    fn exec_subroutine_at(&mut self, nnn: u16) -> Result<(), Error> {
        self.stack
            .push(self.pc)
            .map_err(|_| Error::StackOverflow)?;
        self.pc = nnn;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX equals KK
    /// 3XKK { x: u8, kk: u8 },
    fn skip_if_vx_eq_kk(&mut self, x: u8, kk: u8) -> Result<(), Error> {
        if self.v[x as usize] == kk {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to KK
    /// 4XKK { x: u8, kk: u8 },
    fn skip_if_vx_ne_kk(&mut self, x: u8, kk: u8) -> Result<(), Error> {
        if self.v[x as usize] != kk {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    /// 5XY0 { x: u8, y: u8 },
    fn skip_if_vx_eq_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        if self.v[x as usize] == self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store number KK in register VX
    /// 6XKK { x: u8, kk: u8 },
    fn assign_vx_kk(&mut self, x: u8, kk: u8) -> Result<(), Error> {
        self.v[x as usize] = kk;
        Ok(())
    }

    /// Add the value KK to register VX
    /// 7XKK { x: u8, kk: u8 },
    fn assign_add_vx_kk(&mut self, x: u8, kk: u8) -> Result<(), Error> {
        self.v[x as usize] = self.v[x as usize].wrapping_add(kk);
        Ok(())
    }

    /// Store the value of register VY in register VX
    /// 8XY0 { x: u8, y: u8 },
    fn assign_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        self.v[x as usize] = self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX OR VY
    /// 8XY1 { x: u8, y: u8 },
    fn assign_or_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        self.v[x as usize] |= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX AND VY
    /// 8XY2 { x: u8, y: u8 },
    fn assign_and_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        self.v[x as usize] &= self.v[y as usize];
        Ok(())
    }

    /// Set VX to VX XOR VY
    /// 8XY3 { x: u8, y: u8 },
    fn assign_xor_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        self.v[x as usize] ^= self.v[y as usize];
        Ok(())
    }

    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, Set VF to 00 if a carry does not occur
    /// 8XY4 { x: u8, y: u8 },
    fn assign_add_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        let (value, carry) = self.v[x as usize].overflowing_add(self.v[y as usize]);
        self.v[x as usize] = value;
        self.v[0xF] = carry as u8;
        Ok(())
    }

    /// Subtract the value of register VY from register VX, Set VF to 01 if VX was greater than VY, 00 otherwise
    /// 8XY5 { x: u8, y: u8 },
    fn assign_sub_vx_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vx.wrapping_sub(vy);
        self.v[0xF] = (vx > vy) as u8;
        Ok(())
    }

    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    /// 8XY6 { x: u8, .. },
    fn assign_vx_shifted_r(&mut self, x: u8) -> Result<(), Error> {
        let lsb = self.v[x as usize] & 1u8;
        self.v[x as usize] = self.v[x as usize].wrapping_shr(1);
        self.v[0xF] = lsb;
        Ok(())
    }

    /// Set register VX to the value of VY minus VX, Set VF to 01 if VY was greater than VX, 00 otherwise
    /// 8XY7 { x: u8, y: u8 },
    fn assign_vx_vy_sub_vx(&mut self, x: u8, y: u8) -> Result<(), Error> {
        let (vx, vy) = (self.v[x as usize], self.v[y as usize]);
        self.v[x as usize] = vy.wrapping_sub(vx);
        self.v[0xF] = (vy > vx) as u8;
        Ok(())
    }

    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    /// 8XYE { x: u8, .. },
    fn assign_vx_shifted_l(&mut self, x: u8) -> Result<(), Error> {
        let msb = self.v[x as usize] >> 7;
        self.v[x as usize] = self.v[x as usize].wrapping_shl(1);
        self.v[0xF] = msb;
        Ok(())
    }

    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    /// 9XY0 { x: u8, y: u8 },
    fn skip_if_vx_ne_vy(&mut self, x: u8, y: u8) -> Result<(), Error> {
        if self.v[x as usize] != self.v[y as usize] {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store memory address NNN in register I
    /// ANNN { nnn: u16 },
    fn assign_i_nnn(&mut self, nnn: u16) -> Result<(), Error> {
        self.i = nnn;
        Ok(())
    }

    /// Jump to address NNN + V0
    /// BNNN { nnn: u16 },
    fn jump_to_nnn_add_v0(&mut self, nnn: u16) -> Result<(), Error> {
        let addr = nnn + u16::from(self.v[0]);
        if usize::from(addr) < MEMORY_SIZE {
            self.pc = addr;
            Ok(())
        } else {
            Err(Error::OutOfBounds(addr))
        }
    }

    /// Set VX to a random number with a mask of KK
    /// CXKK { x: u8, kk: u8 },
    fn assign_vx_random_and_kk(&mut self, x: u8, kk: u8) -> Result<(), Error> {
        self.v[x as usize] = self.rng.generate::<u8>() & kk;
        Ok(())
    }

    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    /// DXYN { x: u8, y: u8, n: u8 },
    fn draw_n_at_vx_vy(&mut self, x: u8, y: u8, n: u8) -> Result<(), Error> {
        let sprite = self.memory_at_i(usize::from(n))?;
        let (ox, oy) = (usize::from(self.v[x as usize]), usize::from(self.v[y as usize]));
        let mut collision = false;
        for (row, &byte) in self.memory[sprite].iter().enumerate() {
            for col in 0..8 {
                let bit = (byte >> (7 - col)) & 1;
                collision |= self.frame.xor_pixel(ox + col, oy + row, bit);
            }
        }
        self.v[0xF] = collision as u8;
        self.draw_requested = true;
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    /// EX9E { x: u8 },
    fn skip_if_vx_in_keys(&mut self, x: u8) -> Result<(), Error> {
        if self.is_key_down(self.v[x as usize]) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    /// EXA1 { x: u8 },
    fn skip_if_vx_not_in_keys(&mut self, x: u8) -> Result<(), Error> {
        if !self.is_key_down(self.v[x as usize]) {
            self.pc_increment();
        }
        Ok(())
    }

    /// Store the current value of the delay timer in register VX
    /// FX07 { x: u8 },
    fn assign_vx_delay_t(&mut self, x: u8) -> Result<(), Error> {
        self.v[x as usize] = self.delay_timer.load();
        Ok(())
    }

    /// Wait for a keypress and store the result in register VX
    /// FX0A { x: u8 },
    fn assign_vx_wait_for_key(&mut self, x: u8) -> nb::Result<(), Error> {
        self.pc_increment();
        self.awaiting_key = Some(x);
        self.capture_key(x)
    }

    /// Set the delay timer to the value of register VX
    /// FX15 { x: u8 },
    fn assign_delay_t_vx(&mut self, x: u8) -> Result<(), Error> {
        self.delay_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Set the sound timer to the value of register VX
    /// FX18 { x: u8 },
    fn assign_sound_t_vx(&mut self, x: u8) -> Result<(), Error> {
        self.sound_timer.store(self.v[x as usize]);
        Ok(())
    }

    /// Add the value stored in register VX to register I
    /// FX1E { x: u8 },
    fn assign_add_i_vx(&mut self, x: u8) -> Result<(), Error> {
        self.i = self.i.wrapping_add(u16::from(self.v[x as usize]));
        Ok(())
    }

    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    /// FX29 { x: u8 },
    fn assign_i_addr_of_sprite_vx(&mut self, x: u8) -> Result<(), Error> {
        self.i = u16::from(self.v[x as usize]) * FONT_GLYPH_SIZE;
        Ok(())
    }

    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    /// FX33 { x: u8 },
    fn assign_mem_at_i_bcd_of_vx(&mut self, x: u8) -> Result<(), Error> {
        let digits = self.memory_at_i(3)?;
        let value = self.v[x as usize];
        self.memory[digits].copy_from_slice(&[value / 100, value / 10 % 10, value % 10]);
        Ok(())
    }

    /// Store the values of registers V0 to VX inclusive in memory starting at address I, I is left unchanged
    /// FX55 { x: u8 },
    fn assign_mem_at_i_v0_to_vx(&mut self, x: u8) -> Result<(), Error> {
        let count = usize::from(x) + 1;
        let target = self.memory_at_i(count)?;
        self.memory[target].copy_from_slice(&self.v[..count]);
        Ok(())
    }

    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I, I is left unchanged
    /// FX65 { x: u8 },
    fn assign_v0_to_vx_mem_at_i(&mut self, x: u8) -> Result<(), Error> {
        let count = usize::from(x) + 1;
        let source = self.memory_at_i(count)?;
        self.v[..count].copy_from_slice(&self.memory[source]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(super) fn assert_untouched(before: &Kiwi8, after: &Kiwi8) {
        assert_eq!(before.v, after.v);
        assert_eq!(before.i, after.i);
        assert_eq!(before.pc, after.pc);
        assert_eq!(before.stack, after.stack);
        assert!(before.memory[..] == after.memory[..]);
        assert_eq!(before.frame, after.frame);
        assert_eq!(before.delay_timer, after.delay_timer);
        assert_eq!(before.sound_timer, after.sound_timer);
        assert_eq!(before.awaiting_key, after.awaiting_key);
        assert_eq!(before.clear_requested, after.clear_requested);
        assert_eq!(before.draw_requested, after.draw_requested);
    }

    pub(super) fn load_words(chip: &mut Kiwi8, words: &[u16]) {
        let bytes: std::vec::Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes().to_vec()).collect();
        chip.load_program(&bytes).unwrap();
    }

    #[test]
    fn new_chip() {
        let chip = Kiwi8::new().unwrap();
        assert_eq!(chip.pc(), 0x200u16);
        assert_eq!(chip.sp(), 0);
        assert_eq!(chip.i(), 0);
        assert_eq!(chip.registers(), &[0u8; 16]);
        assert_eq!(&chip.memory()[..80], &FONTSET[..]);
        assert!(chip.memory()[80..].iter().all(|&b| b == 0));
        assert_eq!(chip.frame().count_set(), 0);
        assert_eq!(chip.awaiting_key(), None);
        assert!(!chip.clear_requested() && !chip.draw_requested());
    }

    #[test]
    fn load_program() {
        let mut chip = Kiwi8::new().unwrap();
        chip.load_program(&[0x12, 0x34, 0x56]).unwrap();
        assert_eq!(&chip.memory()[0x200..0x204], &[0x12, 0x34, 0x56, 0x00]);
        assert_eq!(&chip.memory()[..80], &FONTSET[..]);

        chip.v[3] = 0x42;
        chip.load_program(&[0xAB]).unwrap();
        assert_eq!(&chip.memory()[0x200..0x203], &[0xAB, 0x34, 0x56]);
        assert_eq!(chip.registers()[3], 0x42);
    }

    #[test]
    fn load_program_size_limit() {
        let mut chip = Kiwi8::new().unwrap();
        let program = [0xFFu8; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            chip.load_program(&program),
            Err(Error::ProgramTooLarge { size: MAX_PROGRAM_SIZE + 1 }),
        );
        assert!(chip.memory()[0x200..].iter().all(|&b| b == 0));

        chip.load_program(&program[..MAX_PROGRAM_SIZE]).unwrap();
        assert_eq!(chip.memory()[MEMORY_SIZE - 1], 0xFF);
    }

    #[test]
    fn cycle_executes_and_advances() {
        let mut chip = Kiwi8::new().unwrap();
        load_words(&mut chip, &[0x6A2B, 0x7A01, 0x1200]);
        chip.cycle().unwrap();
        assert_eq!((chip.pc(), chip.registers()[0xA]), (0x202, 0x2B));
        chip.cycle().unwrap();
        assert_eq!((chip.pc(), chip.registers()[0xA]), (0x204, 0x2C));
        chip.cycle().unwrap();
        assert_eq!(chip.pc(), 0x200);
    }

    #[test]
    fn cycle_unknown_opcode_leaves_state() {
        let mut chip = Kiwi8::new().unwrap();
        load_words(&mut chip, &[0x5001]);
        let before = chip.clone();
        assert_eq!(chip.cycle(), Err(nb::Error::Other(Error::UnknownOpcode(0x5001))));
        assert_untouched(&before, &chip);
    }

    #[test]
    fn cycle_fetch_out_of_bounds() {
        let mut chip = Kiwi8::new().unwrap();
        chip.pc = 0x0FFF;
        assert_eq!(chip.cycle(), Err(nb::Error::Other(Error::OutOfBounds(0x0FFF))));
        chip.pc = 0x1000;
        assert_eq!(chip.cycle(), Err(nb::Error::Other(Error::OutOfBounds(0x1000))));
        chip.pc = 0x0FFE;
        chip.memory[0xFFE..].copy_from_slice(&[0x00, 0xE0]);
        assert_eq!(chip.cycle(), Ok(()));
        assert_eq!(chip.pc(), 0x1000);
    }

    #[test]
    fn key_helpers() {
        let mut chip = Kiwi8::new().unwrap();
        chip.press_key(0x3);
        chip.press_key(0xF);
        chip.press_key(0x10);
        assert_eq!(chip.key_mask(), 0b1000_0000_0000_1000);
        assert!(chip.is_key_down(0x3) && chip.is_key_down(0xF));
        assert!(!chip.is_key_down(0x4) && !chip.is_key_down(0x13));

        chip.release_key(0x3);
        chip.release_key(0x3);
        assert_eq!(chip.key_mask(), 0b1000_0000_0000_0000);

        chip.set_key_mask(0x00FF);
        assert!((0..8).all(|k| chip.is_key_down(k)));
        assert!((8..16).all(|k| !chip.is_key_down(k)));
    }

    #[test]
    fn timers_clamp_at_zero() {
        let mut chip = Kiwi8::new().unwrap();
        chip.delay_timer.store(2);
        chip.sound_timer.store(1);
        chip.tick_timers();
        assert_eq!((chip.delay_timer(), chip.sound_timer()), (1, 0));
        chip.tick_timers();
        chip.tick_timers();
        assert_eq!((chip.delay_timer(), chip.sound_timer()), (0, 0));
        assert_eq!(chip.decrement_delay_timer(), TimerState::Off);
        assert_eq!(chip.decrement_sound_timer(), TimerState::Off);
    }

    #[test]
    fn presentation_flags() {
        let mut chip = Kiwi8::new().unwrap();
        load_words(&mut chip, &[0x00E0, 0xD005]);
        chip.cycle().unwrap();
        assert!(chip.clear_requested());
        chip.ack_clear();
        assert!(!chip.clear_requested());

        chip.cycle().unwrap();
        assert!(chip.draw_requested());
        assert!(chip.frame().count_set() > 0);
        chip.ack_draw();
        chip.clear_frame();
        assert!(!chip.draw_requested());
        assert_eq!(chip.frame().count_set(), 0);
    }

    #[test]
    fn same_seed_same_randoms() {
        let mut lhs = Kiwi8::with_seed(7).unwrap();
        let mut rhs = Kiwi8::with_seed(7).unwrap();
        for _ in 0..32 {
            lhs.execute(OpCode::_CXKK { x: 0, kk: 0xFF }).unwrap();
            rhs.execute(OpCode::_CXKK { x: 0, kk: 0xFF }).unwrap();
            assert_eq!(lhs.registers()[0], rhs.registers()[0]);
        }
    }
}
