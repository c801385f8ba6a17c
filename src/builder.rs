use core::fmt;

use crate::context::Context;
use crate::driver::Driver;
use crate::error::Error;
use crate::kiwi::{Kiwi8, DEFAULT_SEED};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BuildError {
    ProgramNotProvided,
    Vm(Error),
}

impl From<Error> for BuildError {
    fn from(err: Error) -> Self {
        BuildError::Vm(err)
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::ProgramNotProvided => write!(f, "program not provided"),
            BuildError::Vm(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BuildError {}

pub struct Builder<'a> {
    program: Option<&'a [u8]>,
    seed: Option<u128>,
}

impl<'a> Builder<'a> {
    pub fn new() -> Self {
        Self {
            program: None,
            seed: None,
        }
    }

    pub fn with_program(mut self, prog: &'a [u8]) -> Self {
        self.program = Some(prog);
        self
    }

    /// Seed of the generator behind `CXKK`, a fixed one is used otherwise
    pub fn with_seed(mut self, seed: u128) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<Kiwi8, BuildError> {
        let program = self.program.ok_or(BuildError::ProgramNotProvided)?;
        let mut chip = Kiwi8::with_seed(self.seed.unwrap_or(DEFAULT_SEED))?;
        chip.load_program(program)?;
        Ok(chip)
    }

    /// Build the machine and hand it to a `Driver` together with `ctx`
    pub fn build_driver<C: Context>(self, ctx: C) -> Result<Driver<C>, BuildError> {
        self.build().map(|chip| Driver::new(chip, ctx))
    }
}

impl Default for Builder<'_> {
    fn default() -> Self {
        Self::new()
    }
}
