use core::fmt;

/// Failures reported by the virtual machine
///
/// None of these are recovered from inside the core. Decode and access
/// failures leave the machine state exactly as it was before the failing
/// cycle, so a driver may inspect it before deciding to halt.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The fontset could not be placed in memory during construction
    InitError,
    /// Program does not fit between 0x200 and the end of memory
    ProgramTooLarge { size: usize },
    /// Fetched word does not encode any supported instruction
    UnknownOpcode(u16),
    /// Fetch or memory access at an address outside of the 4 KB address space
    OutOfBounds(u16),
    /// Subroutine call with all 16 stack slots in use
    StackOverflow,
    /// Return executed outside of any subroutine
    StackUnderflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::InitError => write!(f, "failed to copy fontset into memory"),
            Error::ProgramTooLarge { size } => {
                write!(f, "program of {} bytes exceeds the maximum size", size)
            }
            Error::UnknownOpcode(raw) => write!(f, "unknown opcode: {:04X}", raw),
            Error::OutOfBounds(addr) => write!(f, "address {:#06x} is out of address space", addr),
            Error::StackOverflow => write!(f, "cannot enter subroutine, stack is full"),
            Error::StackUnderflow => write!(f, "cannot return, not in subroutine"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
