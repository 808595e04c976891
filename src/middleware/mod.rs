pub mod gate;
pub mod params;
pub mod payload;
pub mod response;

pub use gate::{edge_gate, GateContext, GateDecision, RouteClass};
pub use params::{PathParams, QueryParams};
pub use payload::{field_present, optional_body, require_fields, text_field, Payload};
pub use response::{ApiResponse, ApiResult};
