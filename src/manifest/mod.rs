//! Collection manifests and the publish metadata derived from them

pub mod model;
pub mod transformer;

pub use model::{CollectionInfo, GALAXY_FILE, GalaxyMetadata, License, MANIFEST_FILE, Manifest};
pub use transformer::{
    CERTIFIED_PUBLISH_PATH, CERTIFIED_TAG, ManifestTransformer, MetadataFile,
    VALIDATED_PUBLISH_PATH, publish_path_for,
};
