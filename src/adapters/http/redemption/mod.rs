//! HTTP adapter for redeeming codes.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, RedeemRequest, RedeemResponse};
pub use handlers::{redeem, AuthenticatedUser, RedemptionApiError, RedemptionAppState};
pub use routes::{redemption_router, redemption_routes};
