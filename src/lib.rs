//! Root crate facade for the Priggr paste server.

pub use priggr_core::{
    highlight, retrieval, service, sweeper, ExpirationSweeper, ExpiryMode, HighlightAdapter,
    PasteView, PygmentsHighlighter, RetrievalCoordinator, SupportedTags, SweepReport,
    SweeperHandle,
};
pub use priggr_server::{
    config, create_app, error, handlers, models, resolve_bind_address, serve_router, AppError,
    AppState, Config, Database, PasteService, DEFAULT_PORT,
};
