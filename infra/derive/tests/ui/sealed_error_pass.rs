use sealed_derive::sealed_error;
use std::borrow::Cow;

#[sealed_error]
pub enum DemoError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Lookup of `{key}` failed{}", format_context(.context))]
    Missing { key: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), DemoError> {
    Err(std::io::Error::other("disk"))?;
    Ok(())
}

fn main() {
    let err = read().unwrap_err();
    assert_eq!(err.kind(), DemoErrorKind::Io);

    let err: Result<(), std::io::Error> = Err(std::io::Error::other("disk"));
    let err = err.context("reading").unwrap_err();
    assert_eq!(err.context(), Some("reading"));

    assert_eq!(DemoError::from("boom").kind(), DemoErrorKind::Internal);
}
