//! The `Pipeline` family: `End` (ordinal 0) and `Start` (ordinal 1).
//!
//! A run begins at `Start` and follows [`Stage::next`] until a stage refuses
//! the current value or there is no successor.

use crate::error::PipelineError;
use crate::value::Value;
use sealed_enum::{Family, Seal, Variant, VariantRef};

/// One step of the pipeline.
pub trait Stage: Send + Sync {
    /// Whether the run ends here, leaving `value` untouched.
    fn stop(&self, value: &Value) -> bool;

    /// Transforms the value for the next stage.
    ///
    /// # Errors
    /// [`PipelineError`] when the value cannot be transformed.
    fn apply(&self, value: Value) -> Result<Value, PipelineError>;

    fn next(&self) -> Option<VariantRef<Pipeline>>;
}

#[derive(Debug, Family)]
#[family(member = dyn Stage, variants(End, Start))]
pub struct Pipeline {
    seal: Seal<Self>,
}

/// Final stage: negative integers pass through, others become "is even".
#[derive(Debug, Variant)]
#[variant(family = Pipeline)]
pub struct End {
    seal: Seal<Pipeline>,
}

/// Entry stage: parses text of at least five characters into an integer.
#[derive(Debug, Variant)]
#[variant(family = Pipeline)]
pub struct Start {
    seal: Seal<Pipeline>,
}

const MIN_PARSED_LEN: usize = 5;

impl Stage for End {
    fn stop(&self, value: &Value) -> bool {
        matches!(value, Value::Integer(n) if *n < 0)
    }

    fn apply(&self, value: Value) -> Result<Value, PipelineError> {
        match value {
            Value::Integer(n) => Ok(Value::Flag(n % 2 == 0)),
            other => Err(unexpected("End", &other)),
        }
    }

    fn next(&self) -> Option<VariantRef<Pipeline>> {
        None
    }
}

impl Stage for Start {
    fn stop(&self, value: &Value) -> bool {
        match value {
            Value::Absent => true,
            Value::Text(text) => text.chars().count() < MIN_PARSED_LEN,
            _ => false,
        }
    }

    fn apply(&self, value: Value) -> Result<Value, PipelineError> {
        match value {
            Value::Text(text) => Ok(Value::Integer(text.parse()?)),
            other => Err(unexpected("Start", &other)),
        }
    }

    fn next(&self) -> Option<VariantRef<Pipeline>> {
        sealed_enum::values::<Pipeline>().ok()?.iter().find(|stage| stage.is::<End>()).copied()
    }
}

fn unexpected(stage: &'static str, value: &Value) -> PipelineError {
    PipelineError::UnexpectedValue { stage: stage.into(), found: value.kind().into(), context: None }
}
