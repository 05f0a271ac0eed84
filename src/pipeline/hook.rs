//! Post-build extension point (stage 6).

use crate::error::Result;
use std::path::Path;

/// Context handed to the post-build hook.
///
/// Everything the pipeline knows once the entry point is injected but before
/// the bundle is signed.
#[derive(Debug)]
pub struct PostBuildContext<'a> {
    /// Version identifier extracted in stage 1
    pub version: &'a str,
    /// Path to the (unsigned) bundle
    pub bundle_path: &'a Path,
}

/// Strategy invoked between entry-point injection and signing.
///
/// Runs while the bundle is still unsigned, so a hook may freely edit the
/// bundle tree. An error from the hook halts the pipeline like any other
/// stage failure. The default implementation is [`NoopHook`].
pub trait PostBuildHook: Send + Sync {
    /// Run the hook against the unsigned bundle
    fn run(&self, ctx: &PostBuildContext<'_>) -> Result<()>;
}

/// Default hook that does nothing
#[derive(Debug, Default)]
pub struct NoopHook;

impl PostBuildHook for NoopHook {
    fn run(&self, _ctx: &PostBuildContext<'_>) -> Result<()> {
        Ok(())
    }
}
