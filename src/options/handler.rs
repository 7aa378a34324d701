//! The capability every command-line option implements.

use crate::options::OptionDefinition;
use async_trait::async_trait;

/// One command-line option and its effect.
///
/// `Db` is the persistence handle passed through to [`execute`](Self::execute).
/// This trait never names its contract; concrete handlers add whatever bounds
/// they need (the `bo` binary's handlers require [`crate::db::EntryStore`]).
///
/// Handlers are plain values holding an [`OptionDefinition`]. Nothing in this
/// trait calls `execute`; invoking it is the job of an
/// [`OptionRegistry`](crate::options::OptionRegistry) or of the caller.
///
/// There is no base value to construct, only implementations. The bare trait
/// object is unsized, so it cannot even be bound to a local:
///
/// ```compile_fail
/// use bo_cli::options::OptionHandler;
///
/// let handler: dyn OptionHandler<()> = todo!();
/// ```
#[async_trait]
pub trait OptionHandler<Db: ?Sized + Sync>: Send + Sync {
    /// The definition this handler was built from.
    fn definition(&self) -> &OptionDefinition;

    /// Performs the option's effect.
    ///
    /// `args` is the complete argument vector as the process received it,
    /// program name included. Failure modes are up to each handler.
    async fn execute(&self, args: &[String], db: &Db) -> anyhow::Result<()>;
}
