//! The no-op "playground" kernel.
//!
//! A playground image does whatever its author wants for `iterations`
//! rounds and touches no service-provided buffers. Its real purpose is
//! calibration: submitting a kernel that returns immediately characterises
//! the measurement loop's own residue.

use super::{parse_u64, Arguments, Kernel, ParameterError, Parameters};

/// The `playground` kernel.
pub struct Playground;

impl Kernel for Playground {
    fn name(&self) -> &'static str {
        "playground"
    }

    fn symbol(&self) -> &'static str {
        "playground"
    }

    fn parameters(&self) -> Box<dyn Parameters> {
        Box::new(PlaygroundParameters { iterations: 1 })
    }
}

struct PlaygroundParameters {
    iterations: u64,
}

impl Parameters for PlaygroundParameters {
    fn set(&mut self, name: &[u8], value: &[u8]) -> Result<(), ParameterError> {
        match name {
            b"iterations" => {
                self.iterations = parse_u64("iterations", value)?;
                Ok(())
            }
            _ => Err(ParameterError::UnknownName(
                String::from_utf8_lossy(name).into_owned(),
            )),
        }
    }

    fn arguments(&self) -> Result<Box<dyn Arguments>, super::ArgumentError> {
        Ok(Box::new(PlaygroundArguments {
            record: PlaygroundRecord {
                iterations: self.iterations,
            },
        }))
    }
}

/// What the kernel's prologue reads: the iteration count and nothing else.
#[repr(C)]
struct PlaygroundRecord {
    iterations: u64,
}

struct PlaygroundArguments {
    record: PlaygroundRecord,
}

impl Arguments for PlaygroundArguments {
    fn record(&self) -> *const u8 {
        &self.record as *const PlaygroundRecord as *const u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterations_reach_the_record() {
        let mut parameters = Playground.parameters();
        parameters.set(b"iterations", b"12345").unwrap();
        let arguments = parameters.arguments().unwrap();

        let iterations = unsafe { *(arguments.record() as *const u64) };
        assert_eq!(iterations, 12345);
    }

    #[test]
    fn zero_iterations_are_allowed() {
        // iterations is a repetition count, not a dimension; zero is how a
        // calibration run asks for an immediate return.
        let mut parameters = Playground.parameters();
        parameters.set(b"iterations", b"0").unwrap();
        assert!(parameters.arguments().is_ok());
    }
}
