use google_cloud_gax::grpc::{Code, Status};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Status(#[from] Status),
    #[error("client error: {0}")]
    Client(#[from] google_cloud_pubsub::client::Error),
    #[error("authentication error: {0}")]
    Auth(String),
    #[error("could not start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

impl ServiceError {
    /// The gRPC status code, if the service answered at all.
    pub fn code(&self) -> Option<Code> {
        match self {
            ServiceError::Status(status) => Some(status.code()),
            _ => None,
        }
    }
}
