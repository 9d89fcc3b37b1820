use sealed_enum::SealedError;
use std::borrow::Cow;
use std::num::ParseIntError;

/// Failures while running a value through the pipeline.
#[sealed_derive::sealed_error]
pub enum PipelineError {
    /// The stage family could not be registered or resolved.
    #[error("Registry error{}: {source}", format_context(.context))]
    Registry { source: SealedError, context: Option<Cow<'static, str>> },

    /// Text reaching `Start` is not an integer.
    #[error("Parse error{}: {source}", format_context(.context))]
    Parse { source: ParseIntError, context: Option<Cow<'static, str>> },

    /// A stage received a value of the wrong shape.
    #[error("Stage `{stage}` cannot apply to {found}{}", format_context(.context))]
    UnexpectedValue {
        stage: Cow<'static, str>,
        found: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}
