//! Remote session creation.
//!
//! A [`SessionFactory`] is the seam between the
//! [`SessionRegistry`](crate::SessionRegistry) and whatever actually launches
//! browsers. The registry decides *when* a session is created and who owns
//! it; the factory only knows *how*.

use std::sync::Arc;

use async_trait::async_trait;

use crate::browser::RemoteSession;
use crate::error::Result;
use crate::session::BrowserKind;

use super::options::LaunchOptions;

/// Creates remote sessions on demand.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Launches a new remote session of `kind`.
    ///
    /// # Errors
    ///
    /// Any error is reported to the caller of
    /// [`SessionRegistry::acquire`](crate::SessionRegistry::acquire) as
    /// [`Error::SessionInit`](crate::Error::SessionInit).
    async fn create(
        &self,
        kind: BrowserKind,
        options: &LaunchOptions,
    ) -> Result<Arc<dyn RemoteSession>>;
}
