use core::convert::TryFrom;

use crate::error::Error;

/// An enum representing the instructions of the original chip-8 architecture
///
/// Machine language calls (`0NNN`) are not part of the supported set and decode
/// as unknown, as does every other word that matches no pattern.
///
/// Examples:
/// ```
/// use core::convert::TryFrom;
/// use kiwi8::{Error, OpCode};
///
/// assert_eq!(
///     OpCode::try_from(0xD125),
///     Ok(OpCode::_DXYN { x: 0x1, y: 0x2, n: 0x5 }),
/// );
/// assert_eq!(OpCode::try_from(0x5001), Err(Error::UnknownOpcode(0x5001)));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OpCode {
    /// Clear the screen
    _00E0,
    /// Return from a subroutine
    _00EE,
    /// Jump to address NNN
    _1NNN { nnn: u16 },
    /// Execute subroutine starting at address NNN
    _2NNN { nnn: u16 },
    /// Skip the following instruction if the value of register VX equals KK
    _3XKK { x: u8, kk: u8 },
    /// Skip the following instruction if the value of register VX is not equal to KK
    _4XKK { x: u8, kk: u8 },
    /// Skip the following instruction if the value of register VX is equal to the value of register VY
    _5XY0 { x: u8, y: u8 },
    /// Store number KK in register VX
    _6XKK { x: u8, kk: u8 },
    /// Add the value KK to register VX
    _7XKK { x: u8, kk: u8 },
    /// Store the value of register VY in register VX
    _8XY0 { x: u8, y: u8 },
    /// Set VX to VX OR VY
    _8XY1 { x: u8, y: u8 },
    /// Set VX to VX AND VY
    _8XY2 { x: u8, y: u8 },
    /// Set VX to VX XOR VY
    _8XY3 { x: u8, y: u8 },
    /// Add the value of register VY to register VX, Set VF to 01 if a carry occurs, 00 otherwise
    _8XY4 { x: u8, y: u8 },
    /// Subtract the value of register VY from register VX, Set VF to 01 if VX was greater than VY, 00 otherwise
    _8XY5 { x: u8, y: u8 },
    /// Shift VX right by one bit, Set register VF to the least significant bit prior to the shift
    ///
    /// VY is decoded but never read.
    _8XY6 { x: u8, y: u8 },
    /// Set register VX to the value of VY minus VX, Set VF to 01 if VY was greater than VX, 00 otherwise
    _8XY7 { x: u8, y: u8 },
    /// Shift VX left by one bit, Set register VF to the most significant bit prior to the shift
    ///
    /// VY is decoded but never read.
    _8XYE { x: u8, y: u8 },
    /// Skip the following instruction if the value of register VX is not equal to the value of register VY
    _9XY0 { x: u8, y: u8 },
    /// Store memory address NNN in register I
    _ANNN { nnn: u16 },
    /// Jump to address NNN + V0
    _BNNN { nnn: u16 },
    /// Set VX to a random number with a mask of KK
    _CXKK { x: u8, kk: u8 },
    /// Draw a sprite at position VX, VY with N bytes of sprite data starting at the address stored in I, Set VF to 01 if any set pixels are changed to unset, and 00 otherwise
    _DXYN { x: u8, y: u8, n: u8 },
    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is pressed
    _EX9E { x: u8 },
    /// Skip the following instruction if the key corresponding to the hex value currently stored in register VX is not pressed
    _EXA1 { x: u8 },
    /// Store the current value of the delay timer in register VX
    _FX07 { x: u8 },
    /// Wait for a keypress and store the result in register VX
    _FX0A { x: u8 },
    /// Set the delay timer to the value of register VX
    _FX15 { x: u8 },
    /// Set the sound timer to the value of register VX
    _FX18 { x: u8 },
    /// Add the value stored in register VX to register I
    _FX1E { x: u8 },
    /// Set I to the memory address of the sprite data corresponding to the hexadecimal digit stored in register VX
    _FX29 { x: u8 },
    /// Store the binary-coded decimal equivalent of the value stored in register VX at addresses I, I+1, and I+2
    _FX33 { x: u8 },
    /// Store the values of registers V0 to VX inclusive in memory starting at address I
    _FX55 { x: u8 },
    /// Fill registers V0 to VX inclusive with the values stored in memory starting at address I
    _FX65 { x: u8 },
}

impl OpCode {
    fn read_first(raw: u16) -> u8 {
        (raw >> 12 & 0x000Fu16) as u8
    }

    fn read_n(raw: u16) -> u8 {
        (raw & 0x000Fu16) as u8
    }

    fn read_x(raw: u16) -> u8 {
        (raw >> 8 & 0x000Fu16) as u8
    }

    fn read_y(raw: u16) -> u8 {
        (raw >> 4 & 0x000Fu16) as u8
    }

    fn read_kk(raw: u16) -> u8 {
        (raw & 0x00FFu16) as u8
    }

    fn read_nnn(raw: u16) -> u16 {
        raw & 0x0FFFu16
    }
}

impl TryFrom<u16> for OpCode {
    type Error = Error;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        let x = Self::read_x(raw);
        let y = Self::read_y(raw);
        let n = Self::read_n(raw);
        let kk = Self::read_kk(raw);
        let nnn = Self::read_nnn(raw);

        let opcode = match Self::read_first(raw) {
            0x0u8 => match nnn {
                0x0E0u16 => OpCode::_00E0,
                0x0EEu16 => OpCode::_00EE,
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0x1u8 => OpCode::_1NNN { nnn },
            0x2u8 => OpCode::_2NNN { nnn },
            0x3u8 => OpCode::_3XKK { x, kk },
            0x4u8 => OpCode::_4XKK { x, kk },
            0x5u8 if n == 0x0u8 => OpCode::_5XY0 { x, y },
            0x6u8 => OpCode::_6XKK { x, kk },
            0x7u8 => OpCode::_7XKK { x, kk },
            0x8u8 => match n {
                0x0u8 => OpCode::_8XY0 { x, y },
                0x1u8 => OpCode::_8XY1 { x, y },
                0x2u8 => OpCode::_8XY2 { x, y },
                0x3u8 => OpCode::_8XY3 { x, y },
                0x4u8 => OpCode::_8XY4 { x, y },
                0x5u8 => OpCode::_8XY5 { x, y },
                0x6u8 => OpCode::_8XY6 { x, y },
                0x7u8 => OpCode::_8XY7 { x, y },
                0xEu8 => OpCode::_8XYE { x, y },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0x9u8 if n == 0x0u8 => OpCode::_9XY0 { x, y },
            0xAu8 => OpCode::_ANNN { nnn },
            0xBu8 => OpCode::_BNNN { nnn },
            0xCu8 => OpCode::_CXKK { x, kk },
            // a sprite is at least one row high
            0xDu8 if n != 0x0u8 => OpCode::_DXYN { x, y, n },
            0xEu8 => match kk {
                0x9Eu8 => OpCode::_EX9E { x },
                0xA1u8 => OpCode::_EXA1 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            0xFu8 => match kk {
                0x07u8 => OpCode::_FX07 { x },
                0x0Au8 => OpCode::_FX0A { x },
                0x15u8 => OpCode::_FX15 { x },
                0x18u8 => OpCode::_FX18 { x },
                0x1Eu8 => OpCode::_FX1E { x },
                0x29u8 => OpCode::_FX29 { x },
                0x33u8 => OpCode::_FX33 { x },
                0x55u8 => OpCode::_FX55 { x },
                0x65u8 => OpCode::_FX65 { x },
                _ => return Err(Error::UnknownOpcode(raw)),
            },
            _ => return Err(Error::UnknownOpcode(raw)),
        };
        Ok(opcode)
    }
}
