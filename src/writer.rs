//! Writes an [`OutputFileList`] to disk, plus the request-function and
//! request-hook-maker modules when they do not exist yet, and the
//! `src/service/index.ts` barrel that re-exports every generated directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::aggregate::{OutputFileList, OutputGroup};
use crate::error::Result;

const HEADER: &str = "/* tslint:disable */\n/* eslint-disable */\n\n/* This file is generated by api-power. Do not edit it directly. */";

const REQUEST_FUNCTION_STUB: &str = r#"export interface RequestOptions {
  /**
   * Server the request goes to: `prod`, `dev` or `mock`.
   *
   * @default prod
   */
  server?: 'prod' | 'dev' | 'mock'
}

function send<TResponseData>(
  method: string,
  path: string,
  params: unknown,
  options: RequestOptions,
): Promise<TResponseData> {
  return new Promise<TResponseData>((resolve, reject) => {
    // Send the request with the HTTP client of your choice and settle the promise.
    reject(new Error(`${method} ${path} is not implemented (server: ${options.server ?? 'prod'})`))
  })
}

const request = {
  get: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('GET', path, params, options),
  post: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('POST', path, params, options),
  put: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('PUT', path, params, options),
  patch: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('PATCH', path, params, options),
  delete: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('DELETE', path, params, options),
  head: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('HEAD', path, params, options),
  options: <T>(path: string, params?: unknown, options: RequestOptions = {}) => send<T>('OPTIONS', path, params, options),
}

export default request
"#;

const REQUEST_HOOK_MAKER_STUB: &str = r#"import { useState, useEffect } from 'react'

export default function makeRequestHook<TRequestData, TResponseData>(
  request: (params: TRequestData) => Promise<TResponseData>,
) {
  return function useRequest(requestData: TRequestData) {
    const [loading, setLoading] = useState(true)
    const [data, setData] = useState<TResponseData>()

    useEffect(() => {
      request(requestData).then(result => {
        setLoading(false)
        setData(result)
      })
    }, [JSON.stringify(requestData)])

    return { loading, data }
  }
}
"#;

/// Barrel location, relative to the working directory.
pub const INDEX_FILE_PATH: &str = "src/service/index.ts";

#[derive(Debug, Default, Clone)]
pub struct WriteReport {
    pub files: Vec<PathBuf>,
    pub stubs: Vec<PathBuf>,
    /// The barrel, unless a generated file already occupies its path.
    pub index: Option<PathBuf>,
}

/// `.js` → `.ts`, `.jsx` → `.tsx`; anything else is returned unchanged.
pub fn with_ts_extension(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some("js") => path.with_extension("ts"),
        Some("jsx") => path.with_extension("tsx"),
        _ => path.to_path_buf(),
    }
}

/// Import specifier for `to` as seen from the file `from`: forward slashes,
/// no script extension, always starting with `.`.
pub fn relative_import(from: &Path, to: &Path) -> String {
    let base: Vec<Component> = from.parent().map(|p| p.components().collect()).unwrap_or_default();
    let target: Vec<Component> = to.components().collect();
    let common = base
        .iter()
        .zip(target.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = std::iter::repeat("..".to_string())
        .take(base.len() - common)
        .collect();
    parts.extend(
        target[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    let mut joined = parts.join("/");
    for ext in [".tsx", ".ts", ".jsx", ".js"] {
        if let Some(stripped) = joined.strip_suffix(ext) {
            joined = stripped.to_string();
            break;
        }
    }
    if joined.starts_with('.') {
        joined
    } else {
        format!("./{joined}")
    }
}

fn js_string(value: String) -> String {
    serde_json::Value::String(value).to_string()
}

/// Full text of one generated file.
pub fn render_file(output_path: &Path, group: &OutputGroup) -> String {
    let output_path = with_ts_extension(output_path);
    let mut sections = vec![HEADER.to_string()];
    let mut preamble = vec!["// @ts-ignore\ntype FileData = File".to_string()];
    if !group.settings.types_only {
        let request = with_ts_extension(&group.settings.request_function_file_path);
        preamble.push(format!(
            "// @ts-ignore\nimport request from {}",
            js_string(relative_import(&output_path, &request))
        ));
        if let Some(maker) = &group.settings.request_hook_maker_file_path {
            preamble.push(format!(
                "// @ts-ignore\nimport makeRequestHook from {}",
                js_string(relative_import(&output_path, &with_ts_extension(maker)))
            ));
        }
    }
    sections.push(preamble.join("\n"));
    sections.push(group.content().trim().to_string());
    format!("{}\n", sections.join("\n\n"))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            error!(error = ?e, dir = %parent.display(), "[WRITE][ERROR] Failed to create directory");
            e
        })?;
    }
    fs::write(path, content).map_err(|e| {
        error!(error = ?e, path = %path.display(), "[WRITE][ERROR] Failed to write file");
        e
    })?;
    Ok(())
}

fn write_stub_if_absent(raw: &Path, content: &str, report: &mut WriteReport) -> Result<()> {
    let path = with_ts_extension(raw);
    if raw.exists() || path.exists() || report.stubs.contains(&path) {
        debug!(path = %path.display(), "[WRITE] Module exists, leaving it alone");
        return Ok(());
    }
    write_file(&path, content)?;
    info!(path = %path.display(), "[WRITE] Created module stub");
    report.stubs.push(path);
    Ok(())
}

/// Directories holding generated files that are not nested inside another
/// such directory.
pub fn root_directories<'a>(files: impl IntoIterator<Item = &'a Path>) -> Vec<PathBuf> {
    let dirs: BTreeSet<&Path> = files.into_iter().filter_map(Path::parent).collect();
    dirs.iter()
        .copied()
        .filter(|dir| !dirs.iter().any(|other| other != dir && dir.starts_with(other)))
        .map(Path::to_path_buf)
        .collect()
}

/// Barrel text re-exporting each root directory, as seen from `index_path`.
pub fn render_index(index_path: &Path, roots: &[PathBuf]) -> String {
    let index_dir = index_path.parent().unwrap_or(Path::new(""));
    let exports: Vec<String> = roots
        .iter()
        .filter(|dir| dir.as_path() != index_dir)
        .map(|dir| {
            format!(
                "export * from {}",
                js_string(relative_import(index_path, dir))
            )
        })
        .collect();
    format!("{HEADER}\n\n{}\n", exports.join("\n"))
}

/// Writes every group, then the barrel; generated files are always
/// overwritten.
pub fn write_output(cwd: &Path, files: &OutputFileList) -> Result<WriteReport> {
    let mut report = WriteReport::default();
    for (path, group) in files {
        if !group.settings.types_only {
            write_stub_if_absent(
                &group.settings.request_function_file_path,
                REQUEST_FUNCTION_STUB,
                &mut report,
            )?;
            if let Some(maker) = &group.settings.request_hook_maker_file_path {
                write_stub_if_absent(maker, REQUEST_HOOK_MAKER_STUB, &mut report)?;
            }
        }
        let target = with_ts_extension(path);
        write_file(&target, &render_file(path, group))?;
        info!(path = %target.display(), fragments = group.fragments.len(), "[WRITE] Wrote generated file");
        report.files.push(target);
    }

    if report.files.is_empty() {
        return Ok(report);
    }
    let index_path = cwd.join(INDEX_FILE_PATH);
    if report.files.contains(&index_path) {
        warn!(path = %index_path.display(), "[WRITE] Generated file occupies the index path, index skipped");
        return Ok(report);
    }
    let roots = root_directories(report.files.iter().map(PathBuf::as_path));
    write_file(&index_path, &render_index(&index_path, &roots))?;
    info!(path = %index_path.display(), exports = roots.len(), "[WRITE] Wrote index file");
    report.index = Some(index_path);
    Ok(report)
}
