pub mod model_persistence;

pub use model_persistence::JsonModelRepository;
