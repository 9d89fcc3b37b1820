//! # Pipeline
//!
//! A chain of stages declared as a sealed family. Each stage decides whether the
//! run stops at it, transforms the value otherwise, and names its successor.
//!
//! ```rust
//! use sealed_pipeline::{Value, run};
//!
//! assert_eq!(run(Some("12346")).unwrap(), Value::Flag(true));
//! assert_eq!(run(Some("-8989")).unwrap(), Value::Integer(-8989));
//! assert_eq!(run(None).unwrap(), Value::Absent);
//! ```

pub mod config;
mod error;
mod stage;
mod value;

pub use error::{PipelineError, PipelineErrorExt, PipelineErrorKind};
pub use stage::{End, Pipeline, Stage, Start};
pub use value::Value;

use tracing::{debug, instrument};

/// Runs `input` from [`Start`] until a stage stops or the chain ends.
///
/// # Errors
/// * [`PipelineError::Registry`] if the stage family cannot be registered.
/// * [`PipelineError::Parse`] if text reaching `Start` is not an integer.
#[instrument(level = "debug")]
pub fn run(input: Option<&str>) -> Result<Value, PipelineError> {
    let pipeline = sealed_enum::family::<Pipeline>().context("registering pipeline stages")?;

    let mut value = Value::from(input);
    let mut stage = Some(pipeline.variant::<Start>()?);
    while let Some(current) = stage {
        if current.stop(&value) {
            debug!(stage = %current, %value, "Stage stopped the run");
            break;
        }
        value = current.apply(value)?;
        debug!(stage = %current, %value, "Stage applied");
        stage = current.next();
    }

    Ok(value)
}
