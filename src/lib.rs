pub mod aggregate;
pub mod case;
pub mod catalog;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod contract;
pub mod error;
pub mod generator;
pub mod load_config;
pub mod preprocess;
pub mod resolve;
pub mod schema;
pub mod typegen;
pub mod writer;

pub use aggregate::{aggregate, Fragment, GroupSettings, OutputFileList, OutputGroup, WeightVector};
pub use catalog::{CatalogCache, CatalogKey, HttpCatalogApi};
pub use config::GeneratorConfig;
pub use error::{GenerateError, Result};
pub use generator::Generator;
