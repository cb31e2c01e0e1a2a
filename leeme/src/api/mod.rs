mod extractors;
mod frontend;
mod handlers;
mod response;
mod routes;
mod state;

pub use extractors::IMAGE_FIELD;
pub use response::OcrResponse;
pub use routes::create_router;
pub use state::AppState;
