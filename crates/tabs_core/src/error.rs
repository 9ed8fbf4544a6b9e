use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MountError {
    #[error("widget markup has no `.{missing}` element")]
    StructuralMismatch { missing: &'static str },
}
