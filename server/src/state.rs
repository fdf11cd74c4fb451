//! Shared application state.

use std::sync::Arc;

use cambio_fx::{ConversionService, RateEngine, TransactionStore};

/// State handed to every handler.
pub struct AppState {
    pub rates: Arc<RateEngine>,
    pub conversions: ConversionService,
    pub transactions: Arc<dyn TransactionStore>,
}
