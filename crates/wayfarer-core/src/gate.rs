//! Capability checks run before any handler is invoked.

use crate::error::Unavailable;
use crate::subsystem::{Subsystem, Subsystems};

/// Confirms that every subsystem in `required` is loaded.
///
/// # Errors
///
/// Returns [`Unavailable`] naming all missing subsystems, not just the first.
pub fn check(required: &[Subsystem], available: Subsystems) -> Result<(), Unavailable> {
    let missing: Subsystems = required
        .iter()
        .copied()
        .filter(|subsystem| !available.contains(*subsystem))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Unavailable::new(missing))
    }
}
