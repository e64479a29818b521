//! Defines the crate error types.

/// Result alias for `fordiac::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// A collection of different errors that can happen while probing or serving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An IO error occurred.
    #[error("{0}: {1}")]
    Io(&'static str, std::io::Error),

    /// A socket operation was attempted without an open connection.
    #[error("not connected to 4DIAC runtime")]
    NotConnected,

    /// The request text is not well-formed XML.
    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    /// The request is well-formed on the token level, but is not a single
    /// XML document.
    #[error("{0}")]
    Document(&'static str),

    /// A request lacks an element its action requires.
    #[error("request has no {0} element")]
    MissingElement(&'static str),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(e.into())
    }
}

pub(crate) trait ErrContext {
    type Success;
    fn ctx(self, context: &'static str) -> Result<Self::Success>;
}

impl<T> ErrContext for std::result::Result<T, std::io::Error> {
    type Success = T;
    fn ctx(self, context: &'static str) -> Result<Self::Success> {
        self.map_err(|e| Error::Io(context, e))
    }
}
