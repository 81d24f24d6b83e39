#[cfg(feature = "napi")]
use napi_derive::napi;

mod ast;
mod emit;
mod mapping;
mod scope;
mod transform;
mod validate;

mod mapping_tests;
mod syntax_tests;
#[cfg(test)]
mod test_support;

pub use ast::*;
pub use mapping::{RangeEntry, RangeMap};
pub use scope::ScopeTracker;
pub use transform::{template_to_typescript, EmittedModule, TransformOptions, TransformResult};
pub use validate::{Directive, DirectiveKind, TransformError};

#[cfg(feature = "napi")]
#[napi]
pub fn transform_bridge() -> String {
    "Weft Native Transform Connected".to_string()
}

#[cfg(feature = "napi")]
#[napi(object)]
pub struct NativeTransformError {
    pub message: String,
    pub start: u32,
    pub end: u32,
}

#[cfg(feature = "napi")]
#[napi(object)]
pub struct NativeTransformOutput {
    pub code: Option<String>,
    pub errors: Vec<NativeTransformError>,
    /// JSON-serialized range-map entries; empty when no result was emitted.
    pub ranges_json: String,
    /// JSON-serialized directive records; empty when no result was emitted.
    pub directives_json: String,
}

/// Bridge entry for the host toolchain: the Handlebars parser runs on the
/// Node side and hands the AST across as JSON.
#[cfg(feature = "napi")]
#[napi]
pub fn transform_template_native(
    source: String,
    ast_json: String,
    options_json: String,
) -> napi::Result<NativeTransformOutput> {
    let template: Template = serde_json::from_str(&ast_json)
        .map_err(|e| napi::Error::from_reason(format!("Failed to parse template AST: {}", e)))?;
    let options: TransformOptions = serde_json::from_str(&options_json)
        .map_err(|e| napi::Error::from_reason(format!("Failed to parse options: {}", e)))?;

    let outcome = template_to_typescript(&source, &template, &options);

    let errors = outcome
        .errors
        .iter()
        .map(|e| NativeTransformError {
            message: e.message.clone(),
            start: e.location.start,
            end: e.location.end,
        })
        .collect();

    let (code, ranges_json, directives_json) = match &outcome.result {
        Some(module) => {
            let ranges = serde_json::to_string(&module.ranges)
                .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))?;
            let directives = serde_json::to_string(&module.directives)
                .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))?;
            (Some(module.code.clone()), ranges, directives)
        }
        None => (None, String::new(), String::new()),
    };

    Ok(NativeTransformOutput {
        code,
        errors,
        ranges_json,
        directives_json,
    })
}
