pub mod function;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod state;

pub use function::{FunctionEvent, FunctionName, FunctionResponse};
pub use handlers::{GenerateHandler, TaskHandler};
pub use http::{ApiRequest, ApiResponse, CorsPolicy};
pub use server::{build_router, ApiServer};
pub use state::AppState;
