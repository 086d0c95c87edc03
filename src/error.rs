use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    #[error("unknown router: {0}")]
    UnknownNode(String),
    #[error("router {0} cannot be linked to itself")]
    SelfLoop(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("a simulation is running; stop it before editing the topology")]
    Busy,
    #[error("the topology has no routers")]
    EmptyTopology,
    #[error("unknown source router: {0}")]
    UnknownSource(String),
    #[error("no completed link state run to answer path queries")]
    PathUnavailable,
    #[error("invalid iteration bound factor: {0}")]
    InvalidIterationBound(i64),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
