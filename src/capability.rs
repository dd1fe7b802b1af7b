/// Capability granting permission to write to the cat collection.
///
/// This is a zero-sized proof that an authorization policy was satisfied.
/// Every mutating [`CatStore`](crate::store::CatStore) method takes a
/// `&WriteCap`. Only [`PolicyGate::build`](crate::PolicyGate::build) can
/// mint one, so no write path can skip the guard.
///
/// # Examples
///
/// ```compile_fail
/// # use cat_gateway::WriteCap;
/// // This does not compile - WriteCap cannot be constructed publicly:
/// let cap = WriteCap { _private: () };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WriteCap {
    // Private field prevents construction outside the crate
    _private: (),
}

impl WriteCap {
    /// Creates a new WriteCap.
    ///
    /// This is `pub(crate)` so only the gate (and tests) can create it.
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}
