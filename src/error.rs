use crate::{beam::BeamError, column::ColumnError, components::ComponentError};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the `components` module")]
    Component(#[from] ComponentError),
    #[error("Error in the `beam` module")]
    Beam(#[from] BeamError),
    #[error("Error in the `column` module")]
    Column(#[from] ColumnError),
}
pub type Result<T> = std::result::Result<T, Error>;
