use crate::error::{ErrorType, Result};

/// An object whose fields are filled in asynchronously by the session.
///
/// Both queries are always safe to call; field accessors consult them before
/// trusting any native value.
pub trait Loadable {
    fn is_loaded(&self) -> bool;

    fn error(&self) -> ErrorType;

    /// Fails with the native error code unless it is `OK`.
    fn check_error(&self) -> Result<()> {
        self.error().check()
    }
}
