pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("graph contains no land nodes")]
    EmptyGraph,

    #[error("link {link} references a missing node index: {index}")]
    MissingEndpoint { link: usize, index: usize },

    #[error("link {link} connects node {index} to itself")]
    SelfLink { link: usize, index: usize },

    #[error("link {link} carries a non-positive shared perimeter: {perimeter}")]
    NonPositiveLinkPerimeter { link: usize, perimeter: f64 },

    #[error("node {index} ({code}) is linked but has a non-positive total perimeter: {perimeter}")]
    NonPositiveNodePerimeter {
        index: usize,
        code: String,
        perimeter: f64,
    },

    #[error("invalid tunable `{name}`: {value}")]
    InvalidTunable { name: &'static str, value: f64 },

    #[error("tunable `{name}` is fixed after construction")]
    FixedTunable { name: &'static str },
}
