//! Structural checks for assembled conversion data.

use crate::mesh_error::MeshConvertError;

/// Data whose internal consistency can be verified after assembly.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation found.
    fn validate_invariants(&self) -> Result<(), MeshConvertError>;

    /// Panic on a violated invariant in debug builds or with `strict-invariants`.
    fn debug_assert_invariants(&self) {
        if cfg!(any(debug_assertions, feature = "strict-invariants")) {
            if let Err(e) = self.validate_invariants() {
                panic!("[invariants] {}: {e}", std::any::type_name::<Self>());
            }
        }
    }
}
