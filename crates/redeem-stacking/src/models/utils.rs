use crate::error::{Result, StackError};

/// Fail with a shape error when a fitted component sees a different feature count.
pub fn check_n_features(name: &str, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(StackError::Shape(format!(
            "{} was fitted on {} features but received {}",
            name, expected, got
        )));
    }
    Ok(())
}

/// Fail when `x` and `y` disagree on the number of samples.
pub fn check_n_samples(name: &str, n_rows: usize, n_targets: usize) -> Result<()> {
    if n_rows != n_targets {
        return Err(StackError::Shape(format!(
            "{} received {} feature rows but {} targets",
            name, n_rows, n_targets
        )));
    }
    Ok(())
}
