//! Per-interface TypeScript fragment: doc comments, request/response types,
//! the request function and, optionally, its React hook.

use chrono::DateTime;
use tracing::debug;

use crate::case::ChangeCase;
use crate::catalog::Interface;
use crate::config::{CommentConfig, ServerType, SyntheticalConfig};
use crate::contract::{InterfaceHooks, TypeSynthesizer};
use crate::error::{GenerateError, Result};
use crate::schema::{request_data_schema, response_data_schema};

/// Interface path with the project base path removed.
pub fn relative_path(interface: &Interface) -> &str {
    let basepath = interface
        .project
        .as_ref()
        .map(|p| p.basepath.as_str())
        .unwrap_or("");
    if basepath.is_empty() {
        return &interface.path;
    }
    interface
        .path
        .strip_prefix(basepath)
        .unwrap_or(&interface.path)
}

pub fn default_request_function_name(interface: &Interface, case: &ChangeCase) -> String {
    case.camel_case(relative_path(interface))
}

/// `src/service/<first segment>/index.ts`, relative to the working directory.
pub fn default_output_file_path(interface: &Interface, case: &ChangeCase) -> String {
    let segment = relative_path(interface)
        .split('/')
        .map(|s| case.camel_case(s))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| "index".to_string());
    format!("src/service/{segment}/index.ts")
}

/// Names chosen for one interface's generated declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentNames {
    pub function_name: String,
    pub request_type_name: String,
    pub response_type_name: String,
    pub hook_name: Option<String>,
}

impl FragmentNames {
    pub async fn resolve(
        interface: &Interface,
        config: &SyntheticalConfig,
        hooks: &dyn InterfaceHooks,
        case: &ChangeCase,
    ) -> Result<Self> {
        let function_name = hooks
            .request_function_name(interface, case)
            .await
            .map_err(|e| GenerateError::hook("request_function_name", e))?;
        let request_type_name = hooks
            .request_data_type_name(interface, &function_name, case)
            .await
            .map_err(|e| GenerateError::hook("request_data_type_name", e))?;
        let response_type_name = hooks
            .response_data_type_name(interface, &function_name, case)
            .await
            .map_err(|e| GenerateError::hook("response_data_type_name", e))?;
        let hook_name = if config.react_hooks.enabled {
            Some(
                hooks
                    .request_hook_name(interface, &function_name, case)
                    .await
                    .map_err(|e| GenerateError::hook("request_hook_name", e))?,
            )
        } else {
            None
        };
        Ok(Self {
            function_name,
            request_type_name,
            response_type_name,
            hook_name,
        })
    }
}

/// Where an extra comment tag goes relative to the built-in summary lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagPosition {
    Start,
    #[default]
    End,
}

/// A user-supplied `@name value` line in the generated doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentTag {
    pub name: String,
    pub value: String,
    pub position: TagPosition,
}

impl CommentTag {
    pub fn new(name: impl Into<String>, value: impl Into<String>, position: TagPosition) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            position,
        }
    }
}

/// Builds the doc comment shared by every declaration of an interface.
pub struct CommentBuilder<'a> {
    interface: &'a Interface,
    settings: CommentConfig,
    extra_tags: Vec<CommentTag>,
}

impl<'a> CommentBuilder<'a> {
    pub fn new(interface: &'a Interface, config: &SyntheticalConfig) -> Self {
        let mut settings = config.comment.clone();
        if config.server_type == ServerType::Swagger {
            settings.tag = false;
            settings.update_time = false;
            settings.link = false;
        }
        Self {
            interface,
            settings,
            extra_tags: Vec::new(),
        }
    }

    pub fn with_extra_tags(mut self, tags: Vec<CommentTag>) -> Self {
        self.extra_tags = tags;
        self
    }

    pub fn render(&self, what: &str) -> String {
        if !self.settings.enabled {
            return String::new();
        }
        let interface = self.interface;
        let title = interface.title.replace('/', "\\/");
        let title = if self.settings.link {
            format!("[{title}↗]({})", interface.url)
        } else {
            title
        };

        let mut summary: Vec<(&str, String)> = self
            .extra_tags
            .iter()
            .filter(|t| t.position == TagPosition::Start)
            .map(|t| (t.name.as_str(), t.value.clone()))
            .collect();
        if self.settings.category {
            if let Some(category) = &interface.category {
                let value = if self.settings.link {
                    format!("[{}↗]({})", category.name, category.url)
                } else {
                    category.name.clone()
                };
                summary.push(("category", value));
            }
        }
        if self.settings.tag {
            let tags = interface
                .tag
                .iter()
                .map(|t| format!("`{t}`"))
                .collect::<Vec<_>>()
                .join(", ");
            summary.push(("tag", tags));
        }
        if self.settings.request_header {
            summary.push(("method", interface.method.to_uppercase()));
            summary.push(("path", interface.path.clone()));
        }
        if self.settings.update_time {
            if let Some(time) = DateTime::from_timestamp(interface.up_time, 0) {
                summary.push((
                    "updateTime",
                    format!("`{}`", time.format("%Y-%m-%d %H:%M:%S")),
                ));
            }
        }

        summary.extend(
            self.extra_tags
                .iter()
                .filter(|t| t.position == TagPosition::End)
                .map(|t| (t.name.as_str(), t.value.clone())),
        );

        let mut lines = Vec::new();
        if self.settings.title {
            lines.push(format!(" * @description {what} of interface {title}"));
            lines.push(" *".to_string());
        }
        lines.extend(
            summary
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(label, value)| format!(" * @{label} {value}")),
        );
        if lines.last().is_some_and(|l| l == " *") {
            lines.pop();
        }
        format!("/**\n{}\n */", lines.join("\n"))
    }
}

fn push_block(out: &mut Vec<String>, comment: String, body: String) {
    if comment.is_empty() {
        out.push(body);
    } else {
        out.push(format!("{comment}\n{body}"));
    }
}

/// Generates the TypeScript fragment for one interface.
pub async fn generate_fragment(
    interface: &Interface,
    config: &SyntheticalConfig,
    hooks: &dyn InterfaceHooks,
    synthesizer: &dyn TypeSynthesizer,
) -> Result<String> {
    let case = ChangeCase;
    let names = FragmentNames::resolve(interface, config, hooks, &case).await?;

    let request_schema = request_data_schema(interface, &config.custom_type_mapping);
    let response_schema = response_data_schema(
        interface,
        &config.custom_type_mapping,
        config.data_key.as_deref(),
    );
    let request_type = synthesizer
        .synthesize(&request_schema, &names.request_type_name)
        .await
        .map_err(|source| GenerateError::Synthesis {
            type_name: names.request_type_name.clone(),
            source,
        })?;
    let response_type = synthesizer
        .synthesize(&response_schema, &names.response_type_name)
        .await
        .map_err(|source| GenerateError::Synthesis {
            type_name: names.response_type_name.clone(),
            source,
        })?;

    let extra_tags = if config.comment.enabled {
        hooks
            .extra_comment_tags(interface)
            .await
            .map_err(|e| GenerateError::hook("extra_comment_tags", e))?
    } else {
        Vec::new()
    };
    let comments = CommentBuilder::new(interface, config).with_extra_tags(extra_tags);
    let mut blocks = Vec::new();
    push_block(
        &mut blocks,
        comments.render("Request type"),
        request_type.trim().to_string(),
    );
    push_block(
        &mut blocks,
        comments.render("Response type"),
        response_type.trim().to_string(),
    );

    if !config.types_only {
        let path = serde_json::to_string(&interface.path).map_err(|e| GenerateError::Decode {
            url: interface.url.clone(),
            message: e.to_string(),
        })?;
        push_block(
            &mut blocks,
            comments.render("Request function"),
            format!(
                "export const {fn_name} = (params: {req}) => {{\n  return request.{method}<{res}>({path}, params)\n}}",
                fn_name = names.function_name,
                req = names.request_type_name,
                res = names.response_type_name,
                method = interface.method.to_lowercase(),
            ),
        );
        if let Some(hook_name) = &names.hook_name {
            push_block(
                &mut blocks,
                comments.render("Request hook"),
                format!(
                    "export const {hook_name} = makeRequestHook({})",
                    names.function_name
                ),
            );
        }
    }

    debug!(
        interface_id = interface.id,
        function_name = %names.function_name,
        "[GEN] Fragment generated"
    );
    Ok(blocks.join("\n\n"))
}
