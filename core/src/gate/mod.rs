pub mod decision;
pub mod evaluate;
pub mod routes;
pub mod session;

pub use decision::GateDecision;
pub use evaluate::AccessGate;
pub use routes::{normalize_path, RouteCategory, RouteClassification, RouteTable};
pub use session::{AuthProvider, Identity, SessionRefresh, SessionRequest, SetCookie};
