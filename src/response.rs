//! Canned responses of the request stub.

use std::fmt::{self, Display};

use quick_xml::escape::escape;

use crate::request::{clean_text, xml_fragment, Request};
use crate::{Error, Result};

/// Name and type of the single resource the stub reports on discovery.
pub const RESOURCE_NAME: &str = "EMB_RES";

/// A response document.  `Display` renders the exact wire text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Answer to a wildcard `QUERY`: the embedded resource.
    Resources { id: String },
    /// Answer to a `QUERY` for a specific function block: echoes it back.
    FunctionBlock { id: String, name: String, fb_type: String },
    /// Acknowledgement of a `READ`; no values are stored.
    Read { id: String },
    /// Any other action.
    Unsupported { id: String, action: String },
    /// The request could not be processed at all.  Carries neither ID nor
    /// action, since they may not be known.
    Failure { message: String },
}

impl Response {
    /// Pick the response for a parsed request.
    ///
    /// Absent attributes are treated as empty strings.  A `QUERY` without an
    /// `FB` element is an error.
    pub fn for_request(request: &Request) -> Result<Self> {
        let id = request.id.clone().unwrap_or_default();
        Ok(match request.action.as_deref() {
            Some("QUERY") => {
                let fb = request.fb.as_ref().ok_or(Error::MissingElement("FB"))?;
                if fb.is_wildcard() {
                    Response::Resources { id }
                } else {
                    Response::FunctionBlock {
                        id,
                        name: fb.name.clone().unwrap_or_default(),
                        fb_type: fb.fb_type.clone().unwrap_or_default(),
                    }
                }
            }
            Some("READ") => Response::Read { id },
            other => Response::Unsupported {
                id,
                action: other.unwrap_or_default().into(),
            },
        })
    }

    /// Whether this is one of the error responses.
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Unsupported { .. } | Response::Failure { .. })
    }
}

impl From<Error> for Response {
    fn from(e: Error) -> Self {
        Response::Failure { message: e.to_string() }
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Response::Resources { id } => write!(
                f, r#"<Response ID="{}" Action="QUERY"><Resource Name="{res}" Type="{res}"/></Response>"#,
                escape(id), res = RESOURCE_NAME),
            Response::FunctionBlock { id, name, fb_type } => write!(
                f, r#"<Response ID="{}" Action="QUERY"><FB Name="{}" Type="{}"/></Response>"#,
                escape(id), escape(name), escape(fb_type)),
            Response::Read { id } => write!(
                f, r#"<Response ID="{}" Action="READ"></Response>"#, escape(id)),
            Response::Unsupported { id, action } => write!(
                f, r#"<Response ID="{}" Action="{}" Status="error"><Error>Unsupported action</Error></Response>"#,
                escape(id), escape(action)),
            Response::Failure { message } => write!(
                f, r#"<Response Status="error"><Error>{}</Error></Response>"#, escape(message)),
        }
    }
}

/// Answer one piece of request text.
///
/// Anything before the first `<` is dropped, the rest is parsed as one XML
/// document.  Every failure turns into a [`Response::Failure`].
pub fn dispatch(text: &str) -> Response {
    Request::parse(xml_fragment(text))
        .and_then(|request| Response::for_request(&request))
        .unwrap_or_else(Response::from)
}

/// Answer one received chunk.  `Display` on the result gives the text to
/// send back.
pub fn respond(data: &[u8]) -> Response {
    dispatch(&clean_text(data))
}
