//! # contract: seams between the generation pipeline and its collaborators
//!
//! The pipeline only talks to the outside world through the traits below:
//! - [`CatalogApi`]: the three YApi endpoints a catalog is built from.
//! - [`BackendAdapter`] / [`AdapterRegistry`]: bring a non-YApi backend up as a
//!   YApi-compatible endpoint for the duration of a run.
//! - [`TypeSynthesizer`]: turns a JSON schema into a type declaration.
//! - [`InterfaceHooks`]: user customisation of interfaces and generated names.
//!
//! ## Mocking & Testing
//! Every trait is annotated for `mockall` (behind the default
//! `test-export-mocks` feature) so integration tests can script fetches,
//! adapters and hooks deterministically.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use serde_json::Value;

use crate::case::ChangeCase;
use crate::catalog::{CatalogKey, CategoryMenuEntry, Interface, Project, RawCategory};
use crate::codegen::CommentTag;
use crate::config::{ServerConfig, SyntheticalConfig};
use crate::error::{HookError, Result};

/// Raw access to a YApi-compatible backend. Implementations return data as the
/// server sends it; normalisation happens in [`crate::catalog::CatalogCache`].
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /api/project/get`
    async fn fetch_project(&self, key: &CatalogKey) -> Result<Project>;

    /// `GET /api/interface/getCatMenu`
    async fn fetch_category_menu(
        &self,
        key: &CatalogKey,
        project_id: i64,
    ) -> Result<Vec<CategoryMenuEntry>>;

    /// `GET /api/plugin/export`
    async fn fetch_export(&self, key: &CatalogKey) -> Result<Vec<RawCategory>>;
}

/// A running translation layer in front of a non-YApi backend.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Starts serving and returns the YApi-compatible base URL.
    async fn start(&self) -> std::result::Result<String, HookError>;

    async fn stop(&self) -> std::result::Result<(), HookError>;
}

/// Chooses the adapter for a server. `None` means the server is spoken to directly.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait AdapterRegistry: Send + Sync {
    fn adapter_for(&self, server: &ServerConfig) -> Option<Box<dyn BackendAdapter>>;
}

/// Registry without adapters: only plain YApi servers are usable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAdapters;

impl AdapterRegistry for NoAdapters {
    fn adapter_for(&self, _server: &ServerConfig) -> Option<Box<dyn BackendAdapter>> {
        None
    }
}

/// JSON schema → type declaration source. Must be deterministic.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait TypeSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        schema: &Value,
        type_name: &str,
    ) -> std::result::Result<String, HookError>;
}

/// User customisation points. Every method has a default, so an implementor
/// overrides only what it needs; [`DefaultHooks`] overrides nothing.
///
/// Hooks receive owned clones or shared borrows; they cannot reach the cached
/// catalog.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait InterfaceHooks: Send + Sync {
    /// Return `None` to leave the interface out of the output.
    async fn preprocess_interface(
        &self,
        interface: Interface,
        _case: &ChangeCase,
        _config: &SyntheticalConfig,
    ) -> std::result::Result<Option<Interface>, HookError> {
        Ok(Some(interface))
    }

    /// Relative or absolute output path; `None` falls back to configuration.
    async fn output_file_path(
        &self,
        _interface: &Interface,
        _case: &ChangeCase,
    ) -> std::result::Result<Option<String>, HookError> {
        Ok(None)
    }

    async fn request_function_name(
        &self,
        interface: &Interface,
        case: &ChangeCase,
    ) -> std::result::Result<String, HookError> {
        Ok(crate::codegen::default_request_function_name(interface, case))
    }

    async fn request_data_type_name(
        &self,
        _interface: &Interface,
        function_name: &str,
        case: &ChangeCase,
    ) -> std::result::Result<String, HookError> {
        Ok(case.pascal_case(&format!("{function_name}Request")))
    }

    async fn response_data_type_name(
        &self,
        _interface: &Interface,
        function_name: &str,
        case: &ChangeCase,
    ) -> std::result::Result<String, HookError> {
        Ok(case.pascal_case(&format!("{function_name}Response")))
    }

    async fn request_hook_name(
        &self,
        _interface: &Interface,
        function_name: &str,
        case: &ChangeCase,
    ) -> std::result::Result<String, HookError> {
        Ok(format!("use{}", case.pascal_case(function_name)))
    }

    /// Extra `@name value` lines for the interface's doc comments. Tags with an
    /// empty value are left out.
    async fn extra_comment_tags(
        &self,
        _interface: &Interface,
    ) -> std::result::Result<Vec<CommentTag>, HookError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl InterfaceHooks for DefaultHooks {}
