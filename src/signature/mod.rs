// src/signature/mod.rs

mod model;
mod store;

pub use model::{
    GestureCategory, GestureSignature, Handedness, MetadataRecord, Motion, SignatureRecord,
    TrainingMetadata,
};
pub use store::{load_signature_dir, load_signature_file, SignatureStore};
