use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not parse trip date range `{0}`")]
    DateRange(String),
}
