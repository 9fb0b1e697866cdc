use super::session::SessionRefresh;

/// What the request pipeline should do with an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Pass through untouched.
    Forward,
    /// Pass through and write the refreshed session cookies on the response.
    ForwardWithSession(SessionRefresh),
    /// Send the caller to the login entry point.
    Redirect { location: String },
}

impl GateDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::ForwardWithSession(_) => "forward_with_session",
            Self::Redirect { .. } => "redirect",
        }
    }

    pub fn is_forward(&self) -> bool {
        !matches!(self, Self::Redirect { .. })
    }
}
