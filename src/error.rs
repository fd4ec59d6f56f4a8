use err_derive::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "Invalid argument: {}", _0)]
    InvalidArgument(String),

    #[error(display = "IO Error: {}", _0)]
    IoError(std::io::Error),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err)
    }
}
