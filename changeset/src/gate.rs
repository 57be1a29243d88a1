use {
    crate::{ChangesetUnit, Environment, OrchestrationError},
    tracing::{debug, warn},
};

/// Verifies every unit in order against `env` and stops at the first failure.
///
/// No unit is applied, so a failure here leaves every chain untouched.
pub fn verify_all(env: &Environment, units: &[ChangesetUnit]) -> Result<(), OrchestrationError> {
    for (index, unit) in units.iter().enumerate() {
        if let Err(source) = unit.verify(env) {
            warn!(index, changeset = unit.name(), error = %source, "Precondition failed");
            return Err(OrchestrationError::Precondition {
                index,
                name: unit.name().to_owned(),
                source,
            });
        }
        debug!(index, changeset = unit.name(), "Precondition passed");
    }

    Ok(())
}
