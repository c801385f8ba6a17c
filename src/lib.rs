//! CHIP-8 virtual machine core.
//!
//! `Kiwi8` executes one instruction per `cycle` and keeps everything else
//! (rendering, keypad, the 60 Hz timer clock) outside of itself. `Driver` glues
//! a machine to a platform `Context` for a single step of the platform's loop.
#![no_std]

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod builder;
pub mod context;
pub mod driver;
pub mod error;
pub mod frame;
pub mod kiwi;
pub mod opcode;
pub mod timer;
pub mod utils;

pub use builder::{BuildError, Builder};
pub use context::{Context, Display, InputSource};
pub use driver::Driver;
pub use error::Error;
pub use frame::{Frame, FrameView, PackedFrame, HEIGHT, WIDTH};
pub use kiwi::{Kiwi8, MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, STACK_DEPTH};
pub use opcode::OpCode;
pub use timer::{TimerClock, TimerState, TIMER_PERIOD};

#[cfg(feature = "embedded-graphics")]
pub use embedded_graphics;
