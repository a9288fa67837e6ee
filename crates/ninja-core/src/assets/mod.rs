pub mod manifest;

pub use manifest::AssetManifest;
