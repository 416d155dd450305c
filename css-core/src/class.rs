//! The capability set an opaque combinatorial class must provide.
//!
//! `spec.md` §6 treats the combinatorial class as an external collaborator:
//! the core never inspects its structure, only calls through this trait.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::hash::Hash;

/// An opaque, hashable, content-equal combinatorial class.
///
/// Two classes that compare equal and hash equal are treated as the same
/// class and share a [`crate::label::Label`] — this is the only identity
/// notion [`crate::classdb::ClassDb`] relies on.
pub trait CombinatorialClass:
    Clone + Eq + Hash + Debug + Send + Sync + Serialize + DeserializeOwned
{
    /// The objects this class enumerates (used only for debug sanity checks
    /// and by downstream generating-function work — never by the core
    /// search/prune/extract algorithms).
    type Object;

    /// Whether this class contains no objects at any size.
    fn is_empty(&self) -> bool;

    /// A finite prefix of the objects of the given size.
    ///
    /// May be called with `n` larger than what the implementer can usefully
    /// enumerate; implementers are free to return a truncated or empty
    /// sequence rather than hang — the core only ever uses this for small
    /// sanity-check lengths.
    fn objects_of_length(&self, n: usize) -> Vec<Self::Object>;
}

/// Optional capability: classes that can produce a generating function.
///
/// This is the interface generating-function synthesis (an out-of-scope
/// downstream consumer per `spec.md` §1) is built against. The core never
/// calls this trait itself.
pub trait HasGeneratingFunction: CombinatorialClass {
    /// Parameters threaded through to the class's own generating-function
    /// machinery (e.g. a variable name or truncation order). Left as a
    /// simple string map since the core does not interpret these.
    fn get_genf(&self, params: &std::collections::BTreeMap<String, String>) -> GenfExpr;
}

/// An opaque symbolic generating-function expression.
///
/// The core never parses or simplifies this; it is a pass-through value
/// for the downstream generating-function consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct GenfExpr(pub String);
