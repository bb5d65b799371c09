#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("buffer is full (capacity {capacity})")]
    CapacityExceeded { capacity: usize },

    #[error("buffer is empty")]
    EmptyBuffer,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A bulk insert stopped part way. The first `inserted` items stay in the
    /// buffer; nothing is rolled back.
    #[error("bulk put stopped after {inserted} item(s): {source}")]
    PartialPut {
        inserted: usize,
        #[source]
        source: Box<BufferError>,
    },
}

impl BufferError {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Unwraps a [`BufferError::PartialPut`] to the error that stopped it.
    pub fn root_cause(&self) -> &BufferError {
        match self {
            Self::PartialPut { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            BufferError::CapacityExceeded { capacity: 3 }.to_string(),
            "buffer is full (capacity 3)"
        );
        assert_eq!(
            BufferError::IndexOutOfRange { index: 4, len: 2 }.to_string(),
            "index 4 out of range for length 2"
        );
        assert_eq!(BufferError::EmptyBuffer.to_string(), "buffer is empty");
    }

    #[test]
    fn partial_put_exposes_root_cause() {
        let err = BufferError::PartialPut {
            inserted: 2,
            source: Box::new(BufferError::CapacityExceeded { capacity: 2 }),
        };
        assert_eq!(
            err.root_cause(),
            &BufferError::CapacityExceeded { capacity: 2 }
        );
        assert!(err.to_string().starts_with("bulk put stopped after 2 item(s)"));
    }
}
